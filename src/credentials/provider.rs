//! Credential backends.

use super::{Credential, CredentialError};

/// A source of credentials keyed by host name.
pub trait CredentialsProvider {
  /// Credentials for `host`, or `Ok(None)` so the caller can fall back.
  ///
  /// # Errors
  /// Returns an error when the backend exists but cannot be read.
  fn get_credentials(&self, host: &str) -> Result<Option<Credential>, CredentialError>;
}
