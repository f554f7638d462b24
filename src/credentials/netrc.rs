//! `.netrc` credential lookup.
//!
//! ```text
//! machine your-instance.atlassian.net
//!   login your.email@example.com
//!   password your-api-token-here
//! ```
//!
//! Tokens may be spread over lines or share one line. `macdef` bodies are
//! skipped up to the next blank line, and a `default` entry applies to every
//! host that has no `machine` entry of its own.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::{Credential, CredentialError, CredentialsProvider};

/// Reads credentials from `~/.netrc`, or from an explicit file.
#[derive(Debug, Default, Clone)]
pub struct NetrcProvider {
  path: Option<PathBuf>,
}

impl NetrcProvider {
  /// A provider for `$HOME/.netrc`.
  pub fn new() -> Self {
    Self::default()
  }

  /// A provider for the netrc file at `path`.
  pub fn at(path: impl Into<PathBuf>) -> Self {
    Self {
      path: Some(path.into()),
    }
  }

  fn resolve_path(&self) -> Result<PathBuf, CredentialError> {
    match &self.path {
      Some(path) => Ok(path.clone()),
      None => {
        let home = std::env::var_os("HOME").ok_or(CredentialError::NoHomeDirectory)?;
        Ok(Path::new(&home).join(".netrc"))
      }
    }
  }
}

impl CredentialsProvider for NetrcProvider {
  /// A missing file is not an error: it simply has no entries.
  fn get_credentials(&self, host: &str) -> Result<Option<Credential>, CredentialError> {
    let path = self.resolve_path()?;
    if !path.exists() {
      debug!("No netrc file at {}", path.display());
      return Ok(None);
    }

    let content = std::fs::read_to_string(&path).map_err(|source| CredentialError::Read {
      path: path.clone(),
      source,
    })?;
    debug!("Looking up {host} in {}", path.display());
    parse_netrc(&content, host)
  }
}

#[derive(Debug, Default)]
struct Entry {
  login: Option<String>,
  password: Option<String>,
}

impl Entry {
  fn into_credential(self) -> Option<Credential> {
    Some(Credential::new(self.login?, self.password?))
  }
}

/// Find the entry for `host`, preferring its own `machine` over `default`.
fn parse_netrc(content: &str, host: &str) -> Result<Option<Credential>, CredentialError> {
  let mut matched: Option<Entry> = None;
  let mut fallback: Option<Entry> = None;
  // Which slot the tokens being read belong to: Some(true) for the host,
  // Some(false) for `default`, None for an unrelated machine.
  let mut current: Option<bool> = None;

  for line in skip_macros(content) {
    let mut tokens = line.split_whitespace();
    while let Some(token) = tokens.next() {
      match token {
        "machine" => {
          let name = tokens
            .next()
            .ok_or_else(|| CredentialError::Parse("`machine` without a host name".to_string()))?;
          current = if name == host && matched.is_none() {
            matched = Some(Entry::default());
            Some(true)
          } else {
            None
          };
        }
        "default" => {
          current = if fallback.is_none() {
            fallback = Some(Entry::default());
            Some(false)
          } else {
            None
          };
        }
        "login" | "password" | "account" => {
          let value = tokens
            .next()
            .ok_or_else(|| CredentialError::Parse(format!("`{token}` without a value")))?;
          let entry = match current {
            Some(true) => matched.as_mut(),
            Some(false) => fallback.as_mut(),
            None => None,
          };
          if let Some(entry) = entry {
            match token {
              "login" => entry.login = Some(value.to_string()),
              "password" => entry.password = Some(value.to_string()),
              _ => {}
            }
          }
        }
        _ => {}
      }
    }
  }

  Ok(
    matched
      .and_then(Entry::into_credential)
      .or_else(|| fallback.and_then(Entry::into_credential)),
  )
}

/// Lines outside `macdef` bodies, with `#` comments removed.
fn skip_macros(content: &str) -> impl Iterator<Item = &str> {
  let mut in_macro = false;
  content.lines().filter_map(move |line| {
    if in_macro {
      in_macro = !line.trim().is_empty();
      return None;
    }
    let line = line.split('#').next().unwrap_or_default();
    if line.split_whitespace().next() == Some("macdef") {
      in_macro = true;
      return None;
    }
    Some(line)
  })
}

#[cfg(test)]
mod tests {
  use std::io::Write;

  use super::*;

  #[test]
  fn finds_multiline_entry() {
    let content = "
machine example.atlassian.net
  login user@example.com
  password api-token-123
";
    let cred = parse_netrc(content, "example.atlassian.net").unwrap().unwrap();
    assert_eq!(cred, Credential::new("user@example.com", "api-token-123"));
  }

  #[test]
  fn accepts_single_line_entries() {
    let content = "machine a.com login one password p1 machine b.com login two password p2";
    assert_eq!(parse_netrc(content, "b.com").unwrap().unwrap().username, "two");
    assert_eq!(parse_netrc(content, "a.com").unwrap().unwrap().password, "p1");
  }

  #[test]
  fn machine_entry_wins_over_default_in_any_order() {
    let content = "
default login fallback password fb
machine docs.example.com login specific password sp
";
    assert_eq!(parse_netrc(content, "docs.example.com").unwrap().unwrap().username, "specific");
    assert_eq!(parse_netrc(content, "other.example.com").unwrap().unwrap().username, "fallback");
  }

  #[test]
  fn incomplete_entry_is_not_a_match() {
    let content = "machine example.com login only-user";
    assert!(parse_netrc(content, "example.com").unwrap().is_none());
  }

  #[test]
  fn comments_and_macros_are_ignored() {
    let content = "
# personal hosts
machine example.com login user # trailing note
  password secret
macdef init
machine example.com login macro-user password macro-pass

";
    let cred = parse_netrc(content, "example.com").unwrap().unwrap();
    assert_eq!(cred, Credential::new("user", "secret"));
  }

  #[test]
  fn dangling_keyword_is_a_parse_error() {
    assert!(matches!(
      parse_netrc("machine example.com login", "example.com"),
      Err(CredentialError::Parse(_))
    ));
  }

  #[test]
  fn host_match_is_exact() {
    let content = "machine Example.com login user password pass";
    assert!(parse_netrc(content, "example.com").unwrap().is_none());
  }

  #[test]
  fn provider_reads_explicit_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "machine wiki.example.com\n  login reader\n  password r34d").unwrap();

    let provider = NetrcProvider::at(file.path());
    let cred = provider.get_credentials("wiki.example.com").unwrap().unwrap();
    assert_eq!(cred.username, "reader");
    assert!(provider.get_credentials("elsewhere.example.com").unwrap().is_none());
  }

  #[test]
  fn missing_file_has_no_entries() {
    let dir = tempfile::tempdir().unwrap();
    let provider = NetrcProvider::at(dir.path().join("absent"));
    assert!(provider.get_credentials("example.com").unwrap().is_none());
  }
}
