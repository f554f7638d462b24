//! CLI subcommand handlers.
//!
//! Handlers print their own output and exit the process with a non-zero
//! status on failure: 1 for API errors, 2 for missing or rejected
//! credentials.

pub mod auth;
pub mod completions;
pub mod content;
pub mod request;
pub mod space;
pub mod version;

use std::process;
use std::time::Duration;

use crate::cli::Cli;
use crate::color::ColorScheme;
use crate::confluence::{ClientBuilder, ConfluenceClient, ConfluenceFuturesClient};

/// Print `error` under a headline and exit with `code`.
pub(crate) fn fail(colors: &ColorScheme, headline: &str, error: impl std::fmt::Display, code: i32) -> ! {
  eprintln!("{} {}", colors.error("✗"), colors.error(headline));
  eprintln!("  {error}");
  process::exit(code);
}

/// Client configuration resolved from the global options.
fn client_builder(cli: &Cli, colors: &ColorScheme) -> ClientBuilder {
  let Some(base_url) = cli.auth.url.as_deref() else {
    fail(
      colors,
      "Base URL not provided",
      "Pass --url https://your-instance.atlassian.net/wiki or set CONFLUENCE_URL",
      2,
    );
  };

  let resolved = match auth::load_credentials(base_url, cli) {
    Ok(resolved) => resolved,
    Err(e) => fail(colors, "Failed to load credentials", format!("{e:#}"), 2),
  };

  let mut builder = ClientBuilder::new(base_url);
  if let Some(resolved) = resolved {
    builder = builder.credentials(resolved.credential.username, resolved.credential.password);
  }
  if let Some(seconds) = cli.performance.timeout {
    builder = builder.timeout(Duration::from_secs(seconds));
  }
  builder
}

/// A blocking client for the configured instance.
pub(crate) fn blocking_client(cli: &Cli, colors: &ColorScheme) -> ConfluenceClient {
  match client_builder(cli, colors).build() {
    Ok(client) => client,
    Err(e) => fail(colors, "Failed to create API client", e, 1),
  }
}

/// A concurrent client with `--parallel` workers.
pub(crate) fn pooled_client(cli: &Cli, colors: &ColorScheme) -> ConfluenceFuturesClient {
  match client_builder(cli, colors).build_pooled(cli.performance.parallel) {
    Ok(client) => client,
    Err(e) => fail(colors, "Failed to create API client", e, 1),
  }
}
