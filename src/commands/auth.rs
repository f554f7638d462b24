//! Authentication subcommand handlers.
//!
//! `auth test` calls `rest/api/user/current` with the resolved credentials;
//! `auth show` prints where each credential value comes from.

use anyhow::Context;

use super::{blocking_client, fail};
use crate::cli::{AuthCommand, Cli};
use crate::color::ColorScheme;
use crate::confluence::{ApiError, UserInfo};
use crate::credentials::{CredentialSource, Explicit, NetrcProvider, ResolvedCredential, resolve_credentials};

/// Dispatch the authentication subcommands defined under `confluence-api auth`.
pub(crate) fn handle_auth_command(subcommand: &AuthCommand, cli: &Cli, colors: &ColorScheme) {
  match subcommand {
    AuthCommand::Test => test_auth(cli, colors),
    AuthCommand::Show => show_auth_config(cli, colors),
  }
}

fn test_auth(cli: &Cli, colors: &ColorScheme) {
  let client = blocking_client(cli, colors);

  println!("{} {}", colors.info("→"), colors.info("Testing authentication"));
  println!(
    "  {}: {}",
    colors.emphasis("URL"),
    colors.link(client.session().base_url())
  );
  if client.session().uses_authentication() {
    println!("  {}: {}", colors.emphasis("Username"), client.session().username());
  } else {
    println!("  {}: {}", colors.emphasis("Username"), colors.dimmed("(anonymous)"));
  }

  match client.get_current_user().json::<UserInfo>() {
    Ok(user_info) => {
      println!(
        "\n{} {}",
        colors.success("✓"),
        colors.success("Authentication successful!")
      );
      println!("\n{}", colors.emphasis("User Information:"));
      println!("  {}: {}", colors.emphasis("Display Name"), user_info.display_name);
      if let Some(account_id) = user_info.account_id {
        println!("  {}: {}", colors.emphasis("Account ID"), colors.dimmed(account_id));
      }
      if let Some(username) = user_info.username {
        println!("  {}: {}", colors.emphasis("Username"), username);
      }
      if let Some(email) = user_info.email {
        println!("  {}: {}", colors.emphasis("Email"), email);
      }
      if let Some(public_name) = user_info.public_name {
        println!("  {}: {}", colors.emphasis("Public Name"), public_name);
      }
    }
    Err(e) => {
      if let ApiError::Http { status, .. } = &e {
        eprintln!(
          "{} Confluence answered {}",
          colors.warning("⚠"),
          colors.number(status)
        );
        eprintln!("  Check that the login is your account email and the password an API token");
        eprintln!(
          "  {}",
          colors.dimmed("Run 'confluence-api auth show' to see your current configuration")
        );
      }
      fail(colors, "Authentication failed", e, 2);
    }
  }
}

/// Display the configured base URL and credentials together with their
/// sources.
fn show_auth_config(cli: &Cli, colors: &ColorScheme) {
  println!("{}\n", colors.emphasis("Authentication Configuration"));

  let url = cli.auth.url.as_deref();
  match url {
    Some(url_value) => {
      println!("{}: {}", colors.emphasis("Base URL"), colors.link(url_value));
      println!(
        "  {}: {}",
        colors.dimmed("Source"),
        colors.dimmed(source_of(url_value, "CONFLUENCE_URL"))
      );
    }
    None => println!("{}: {}", colors.emphasis("Base URL"), colors.dimmed("(not set)")),
  }

  let resolved = match url.map(|url| load_credentials(url, cli)).transpose() {
    Ok(resolved) => resolved.flatten(),
    Err(e) => {
      eprintln!("\n{} {:#}", colors.warning("⚠"), e);
      None
    }
  };

  match &resolved {
    Some(resolved) => {
      println!("\n{}: {}", colors.emphasis("Username"), resolved.credential.username);
      println!(
        "  {}: {}",
        colors.dimmed("Source"),
        colors.dimmed(resolved.username_source)
      );
      println!(
        "\n{}: {}",
        colors.emphasis("API Token"),
        colors.dimmed(resolved.credential.masked_password())
      );
      println!(
        "  {}: {} characters",
        colors.dimmed("Length"),
        colors.number(resolved.credential.password.chars().count())
      );
      println!(
        "  {}: {}",
        colors.dimmed("Source"),
        colors.dimmed(resolved.password_source)
      );
      println!("\n{} {}", colors.success("✓"), colors.success("Credentials configured"));
    }
    None => {
      println!(
        "\n{} {}",
        colors.warning("⚠"),
        colors.warning("No complete credentials; requests will be anonymous")
      );
      println!("  Provide --user and --token, set CONFLUENCE_USER and CONFLUENCE_TOKEN, or add to ~/.netrc:");
      if let Some(host) = url.and_then(crate::credentials::host_of) {
        println!("    machine {host}");
      }
      println!("      login your.email@example.com");
      println!("      password your-api-token");
    }
  }
}

/// Resolve credentials from flags, environment variables, then `~/.netrc`.
///
/// `Ok(None)` means nothing supplied a complete pair, so the client will send
/// anonymous requests.
///
/// # Errors
/// Fails when the base URL has no host or `~/.netrc` cannot be read.
pub(crate) fn load_credentials(base_url: &str, cli: &Cli) -> anyhow::Result<Option<ResolvedCredential>> {
  let user = explicit(cli.auth.user.as_deref(), "CONFLUENCE_USER");
  let token = explicit(cli.auth.token.as_deref(), "CONFLUENCE_TOKEN");
  resolve_credentials(base_url, user, token, &NetrcProvider::new()).context("Could not resolve credentials")
}

fn explicit<'a>(value: Option<&'a str>, env_var: &str) -> Explicit<'a> {
  value
    .filter(|value| !value.is_empty())
    .map(|value| (value, source_of(value, env_var)))
}

/// Clap prefers a flag over its env fallback, so a value equal to the
/// variable's content came from the environment.
fn source_of(value: &str, env_var: &str) -> CredentialSource {
  match std::env::var(env_var) {
    Ok(env_value) if env_value == value => CredentialSource::Environment,
    _ => CredentialSource::Flag,
  }
}
