//! Credential values and the errors raised while looking them up.

use std::fmt;
use std::path::PathBuf;

/// A username and API token (or password) for one Confluence host.
///
/// On Atlassian Cloud the username is the account email and the password is an
/// API token from <https://id.atlassian.com/manage-profile/security/api-tokens>.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
  pub username: String,
  pub password: String,
}

impl Credential {
  pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
    Self {
      username: username.into(),
      password: password.into(),
    }
  }

  /// The password with everything after its first four characters masked.
  pub fn masked_password(&self) -> String {
    let length = self.password.chars().count();
    if length > 8 {
      let visible: String = self.password.chars().take(4).collect();
      format!("{visible}{}", "*".repeat(length - 4))
    } else {
      "*".repeat(length)
    }
  }
}

impl fmt::Debug for Credential {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Credential")
      .field("username", &self.username)
      .field("password", &"<redacted>")
      .finish()
  }
}

/// Where a credential value was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
  /// `--user` / `--token` on the command line.
  Flag,
  /// `CONFLUENCE_USER` / `CONFLUENCE_TOKEN`.
  Environment,
  /// A `machine` (or `default`) entry in `.netrc`.
  Netrc,
}

impl fmt::Display for CredentialSource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Flag => "command-line flag",
      Self::Environment => "environment variable",
      Self::Netrc => ".netrc file",
    })
  }
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
  #[error("cannot locate .netrc: HOME is not set")]
  NoHomeDirectory,
  #[error("failed to read {}: {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("failed to parse .netrc: {0}")]
  Parse(String),
  #[error("no host in base URL {0}")]
  InvalidUrl(String),
}
