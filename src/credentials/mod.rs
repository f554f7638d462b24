//! Credentials for Confluence authentication.
//!
//! Explicit values (command-line flags or `CONFLUENCE_USER` /
//! `CONFLUENCE_TOKEN`) win; any half left unset is filled from a
//! [`CredentialsProvider`], normally `~/.netrc`:
//!
//! ```text
//! machine your-instance.atlassian.net
//!   login your.email@example.com
//!   password your-api-token-here
//! ```
//!
//! Atlassian Cloud expects the account email as the login and an API token,
//! not the account password.

mod netrc;
mod provider;
mod types;

pub use netrc::NetrcProvider;
pub use provider::CredentialsProvider;
pub use types::{Credential, CredentialError, CredentialSource};
use url::Url;

/// A credential plus where each half of it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCredential {
  pub credential: Credential,
  pub username_source: CredentialSource,
  pub password_source: CredentialSource,
}

/// A value supplied explicitly, tagged with its origin.
pub type Explicit<'a> = Option<(&'a str, CredentialSource)>;

/// Combine explicit values with the `fallback` entry for `base_url`'s host.
///
/// Returns `Ok(None)` when neither source yields both a username and a token.
///
/// # Errors
/// Fails when `base_url` has no host or the fallback cannot be read.
pub fn resolve_credentials(
  base_url: &str,
  username: Explicit<'_>,
  password: Explicit<'_>,
  fallback: &dyn CredentialsProvider,
) -> Result<Option<ResolvedCredential>, CredentialError> {
  if let (Some((user, user_source)), Some((token, token_source))) = (username, password) {
    return Ok(Some(ResolvedCredential {
      credential: Credential::new(user, token),
      username_source: user_source,
      password_source: token_source,
    }));
  }

  let host = host_of(base_url).ok_or_else(|| CredentialError::InvalidUrl(base_url.to_string()))?;
  let Some(found) = fallback.get_credentials(&host)? else {
    return Ok(None);
  };

  let (user, username_source) = match username {
    Some((user, source)) => (user.to_string(), source),
    None => (found.username, CredentialSource::Netrc),
  };
  let (token, password_source) = match password {
    Some((token, source)) => (token.to_string(), source),
    None => (found.password, CredentialSource::Netrc),
  };

  Ok(Some(ResolvedCredential {
    credential: Credential::new(user, token),
    username_source,
    password_source,
  }))
}

/// Host name of a base URL, accepting scheme-less input such as
/// `example.atlassian.net/wiki`.
pub fn host_of(base_url: &str) -> Option<String> {
  let trimmed = base_url.trim();
  let parsed = Url::parse(trimmed).or_else(|_| Url::parse(&format!("https://{trimmed}")));
  parsed.ok()?.host_str().map(str::to_string)
}

#[cfg(test)]
mod tests {
  use std::io::Write;

  use super::*;

  fn netrc_with(content: &str) -> (tempfile::NamedTempFile, NetrcProvider) {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{content}").unwrap();
    let provider = NetrcProvider::at(file.path());
    (file, provider)
  }

  #[test]
  fn explicit_pair_skips_fallback() {
    let (_file, netrc) = netrc_with("machine example.atlassian.net login n password p");
    let resolved = resolve_credentials(
      "https://example.atlassian.net/wiki",
      Some(("cli@example.com", CredentialSource::Flag)),
      Some(("tok", CredentialSource::Environment)),
      &netrc,
    )
    .unwrap()
    .unwrap();

    assert_eq!(resolved.credential, Credential::new("cli@example.com", "tok"));
    assert_eq!(resolved.username_source, CredentialSource::Flag);
    assert_eq!(resolved.password_source, CredentialSource::Environment);
  }

  #[test]
  fn missing_half_comes_from_netrc() {
    let (_file, netrc) = netrc_with("machine example.atlassian.net login netrc-user password netrc-token");
    let resolved = resolve_credentials(
      "https://example.atlassian.net/wiki",
      Some(("cli@example.com", CredentialSource::Flag)),
      None,
      &netrc,
    )
    .unwrap()
    .unwrap();

    assert_eq!(resolved.credential.username, "cli@example.com");
    assert_eq!(resolved.credential.password, "netrc-token");
    assert_eq!(resolved.password_source, CredentialSource::Netrc);
  }

  #[test]
  fn nothing_found_is_none() {
    let (_file, netrc) = netrc_with("machine other.example.com login a password b");
    let resolved = resolve_credentials("https://example.atlassian.net", None, None, &netrc).unwrap();
    assert!(resolved.is_none());
  }

  #[test]
  fn host_of_accepts_bare_hosts() {
    assert_eq!(host_of("https://example.atlassian.net/wiki").as_deref(), Some("example.atlassian.net"));
    assert_eq!(host_of("example.atlassian.net/wiki").as_deref(), Some("example.atlassian.net"));
    assert_eq!(host_of("http://localhost:8090").as_deref(), Some("localhost"));
  }

  #[test]
  fn masked_password_hides_the_tail() {
    assert_eq!(Credential::new("u", "abcdefghijk").masked_password(), "abcd*******");
    assert_eq!(Credential::new("u", "short").masked_password(), "*****");
  }

  #[test]
  fn debug_never_prints_the_password() {
    let debug = format!("{:?}", Credential::new("user", "hunter2"));
    assert!(debug.contains("user"));
    assert!(!debug.contains("hunter2"));
  }
}
