//! Connection context shared by every call a client issues.

use std::sync::OnceLock;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use tracing::debug;
use url::Url;

use super::error::ApiError;

/// Default `User-Agent` sent with every request.
pub fn default_user_agent() -> String {
  format!("confluence-api/{} ({})", env!("CARGO_PKG_VERSION"), env!("TARGET"))
}

/// Base URL, credentials, and the lazily created HTTP transport.
///
/// The reqwest client is built on the first call and reused afterwards; after
/// that point the session is read-only.
#[derive(Debug)]
pub struct Session {
  base_url: Url,
  username: String,
  password: String,
  user_agent: String,
  timeout: Option<Duration>,
  http: OnceLock<reqwest::Client>,
}

impl Session {
  /// Create a session for `base_url` (e.g. `https://example.atlassian.net/wiki`).
  ///
  /// # Errors
  /// Returns [`ApiError::InvalidUrl`] when `base_url` does not parse.
  pub fn new(
    base_url: &str,
    username: impl Into<String>,
    password: impl Into<String>,
    user_agent: impl Into<String>,
    timeout: Option<Duration>,
  ) -> Result<Self, ApiError> {
    Ok(Self {
      base_url: normalize_base_url(base_url)?,
      username: username.into(),
      password: password.into(),
      user_agent: user_agent.into(),
      timeout,
      http: OnceLock::new(),
    })
  }

  /// Base URL, always ending in `/`.
  pub fn base_url(&self) -> &Url {
    &self.base_url
  }

  pub fn username(&self) -> &str {
    &self.username
  }

  pub fn user_agent(&self) -> &str {
    &self.user_agent
  }

  /// `true` when requests carry basic authentication.
  pub fn uses_authentication(&self) -> bool {
    !self.username.is_empty() && !self.password.is_empty()
  }

  /// `Basic` authorization header, present only when both username and
  /// password are non-empty.
  pub fn auth_header(&self) -> Option<HeaderValue> {
    if !self.uses_authentication() {
      return None;
    }
    let credentials = format!("{}:{}", self.username, self.password);
    let mut value = HeaderValue::from_str(&format!("Basic {}", BASE64.encode(credentials.as_bytes()))).ok()?;
    value.set_sensitive(true);
    Some(value)
  }

  /// Return the shared HTTP client, creating it on first use.
  ///
  /// # Errors
  /// Returns [`ApiError::Transport`] when reqwest cannot build a client.
  pub fn http(&self) -> Result<&reqwest::Client, ApiError> {
    if let Some(client) = self.http.get() {
      return Ok(client);
    }

    let client = self.start_http_session()?;
    Ok(self.http.get_or_init(|| client))
  }

  fn start_http_session(&self) -> Result<reqwest::Client, ApiError> {
    debug!("Starting new HTTP session for {}", self.base_url);

    let mut headers = HeaderMap::new();
    if let Some(auth) = self.auth_header() {
      debug!("Requests will use basic authentication as {}", self.username);
      headers.insert(AUTHORIZATION, auth);
    }

    let mut builder = reqwest::Client::builder()
      .user_agent(self.user_agent.clone())
      .default_headers(headers);
    if let Some(timeout) = self.timeout {
      builder = builder.timeout(timeout);
    }

    Ok(builder.build()?)
  }
}

/// Parse `base_url` and make sure its path ends with `/`, so relative
/// endpoint paths are appended instead of replacing the last segment.
fn normalize_base_url(base_url: &str) -> Result<Url, ApiError> {
  let trimmed = base_url.trim();
  if trimmed.ends_with('/') {
    Ok(Url::parse(trimmed)?)
  } else {
    Ok(Url::parse(&format!("{trimmed}/"))?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn session(username: &str, password: &str) -> Session {
    Session::new(
      "https://example.atlassian.net/wiki",
      username,
      password,
      default_user_agent(),
      None,
    )
    .unwrap()
  }

  #[test]
  fn base_url_gains_trailing_slash() {
    let session = session("user@example.com", "token");
    assert_eq!(session.base_url().as_str(), "https://example.atlassian.net/wiki/");
    assert_eq!(
      session.base_url().join("rest/api/space").unwrap().as_str(),
      "https://example.atlassian.net/wiki/rest/api/space"
    );
  }

  #[test]
  fn base_url_with_slash_is_kept() {
    let session = Session::new("https://example.atlassian.net/wiki/", "", "", "agent", None).unwrap();
    assert_eq!(session.base_url().as_str(), "https://example.atlassian.net/wiki/");
  }

  #[test]
  fn invalid_base_url_is_rejected() {
    let result = Session::new("not a url", "user", "pass", "agent", None);
    assert!(matches!(result, Err(ApiError::InvalidUrl(_))));
  }

  #[test]
  fn auth_header_format() {
    let session = session("user@example.com", "test-token");
    let header = session.auth_header().unwrap();
    assert!(header.is_sensitive());

    let encoded = header.to_str().unwrap().strip_prefix("Basic ").unwrap();
    let decoded = String::from_utf8(BASE64.decode(encoded.as_bytes()).unwrap()).unwrap();
    assert_eq!(decoded, "user@example.com:test-token");
  }

  #[test]
  fn auth_requires_both_username_and_password() {
    assert!(session("", "").auth_header().is_none());
    assert!(session("user@example.com", "").auth_header().is_none());
    assert!(session("", "test-token").auth_header().is_none());
    assert!(!session("", "test-token").uses_authentication());
  }

  #[test]
  fn http_client_is_created_once() {
    let session = session("user@example.com", "test-token");
    let first = session.http().unwrap() as *const reqwest::Client;
    let second = session.http().unwrap() as *const reqwest::Client;
    assert_eq!(first, second);
  }

  #[test]
  fn default_user_agent_names_the_crate() {
    assert!(default_user_agent().starts_with("confluence-api/"));
  }
}
