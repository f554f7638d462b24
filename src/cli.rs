//! Command-line interface for confluence-api.
//!
//! A thin front-end over the library: every subcommand builds a
//! [`ConfluenceClient`](crate::confluence::ConfluenceClient) from the global
//! options and calls one or more endpoint wrappers.

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::Value;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;
use url::Url;

use crate::color::ColorScheme;
use crate::commands::auth::handle_auth_command;
use crate::commands::completions::handle_completions_command;
use crate::commands::content::handle_content_command;
use crate::commands::request::handle_request_command;
use crate::commands::space::handle_space_command;
use crate::commands::version::handle_version_command;
use crate::confluence::DEFAULT_MAX_WORKERS;

/// confluence-api - Talk to the Confluence REST API
#[derive(Debug, Parser)]
#[command(
  name = "confluence-api",
  version,
  about = "Query and update Confluence through its REST API",
  long_about = "A command-line client for the Confluence REST API.\n\
                Lists, searches, and creates content and spaces, and can send arbitrary API requests.",
  styles = get_clap_styles()
)]
pub struct Cli {
  /// Subcommand to execute
  #[command(subcommand)]
  pub command: Command,

  /// Authentication options
  #[command(flatten)]
  pub auth: AuthOptions,

  /// Behavior options
  #[command(flatten)]
  pub behavior: BehaviorOptions,

  /// Performance options
  #[command(flatten)]
  pub performance: PerformanceOptions,
}

#[derive(Debug, Subcommand)]
pub enum Command {
  /// Authentication testing and inspection
  Auth {
    #[command(subcommand)]
    subcommand: AuthCommand,
  },

  /// Pages, blog posts, and CQL search
  Content {
    #[command(subcommand)]
    subcommand: ContentCommand,
  },

  /// Spaces
  Space {
    #[command(subcommand)]
    subcommand: SpaceCommand,
  },

  /// Send an arbitrary request to the REST API
  Request(RequestArgs),

  /// Display version and build information
  Version {
    /// Output in JSON format
    #[arg(long)]
    json: bool,

    /// Show only version number
    #[arg(long)]
    short: bool,
  },

  /// Generate shell completion scripts
  Completions {
    /// Target shell for completions
    #[arg(value_enum)]
    shell: Shell,
  },
}

/// Authentication subcommands
#[derive(Debug, Subcommand)]
pub enum AuthCommand {
  /// Call the API as the configured user
  Test,
  /// Show which credentials would be used and where they come from
  Show,
}

#[derive(Debug, Subcommand)]
pub enum ContentCommand {
  /// List content, newest first
  List {
    /// Only content in this space
    #[arg(long, value_name = "KEY")]
    space: Option<String>,

    /// Content type (`page` or `blogpost`)
    #[arg(long = "type", value_name = "TYPE")]
    content_type: Option<String>,

    /// Stop after this many items
    #[arg(long, default_value_t = 25, value_name = "N")]
    limit: usize,

    /// Items requested per API call (server default when unset)
    #[arg(long, value_name = "N")]
    page_size: Option<u64>,
  },

  /// Fetch pages by ID, concurrently
  Get {
    /// Content IDs
    #[arg(required = true, value_name = "ID")]
    ids: Vec<String>,

    /// Properties to expand
    #[arg(long, default_value = "space,version,body.storage", value_name = "LIST")]
    expand: String,

    /// Print the full JSON documents
    #[arg(long)]
    json: bool,
  },

  /// Search with CQL
  Search {
    /// CQL query, e.g. `space=DOCS and type=page`
    cql: String,

    /// Stop after this many results
    #[arg(long, default_value_t = 25, value_name = "N")]
    limit: usize,

    /// Items requested per API call (server default when unset)
    #[arg(long, value_name = "N")]
    page_size: Option<u64>,
  },

  /// Create a page from storage-format markup
  Create {
    /// Space to create the page in
    #[arg(long, value_name = "KEY")]
    space: String,

    /// Page title
    #[arg(long)]
    title: String,

    /// Storage-format body
    #[arg(long, conflicts_with = "body_file", required_unless_present = "body_file")]
    body: Option<String>,

    /// Read the storage-format body from a file
    #[arg(long, value_name = "PATH")]
    body_file: Option<PathBuf>,

    /// ID of the parent page
    #[arg(long, value_name = "ID")]
    parent: Option<String>,
  },
}

#[derive(Debug, Subcommand)]
pub enum SpaceCommand {
  /// List spaces
  List {
    /// Stop after this many spaces
    #[arg(long, default_value_t = 50, value_name = "N")]
    limit: usize,

    /// Items requested per API call (server default when unset)
    #[arg(long, value_name = "N")]
    page_size: Option<u64>,
  },

  /// Create a space
  Create {
    /// Space key, e.g. `DOCS`
    key: String,

    /// Display name
    name: String,

    /// Plain-text description
    #[arg(long, default_value = "")]
    description: String,

    /// Make the space visible only to you
    #[arg(long)]
    private: bool,
  },
}

/// Arguments of `confluence-api request`
#[derive(Debug, Args)]
pub struct RequestArgs {
  /// HTTP method
  #[arg(value_enum, ignore_case = true)]
  pub method: HttpMethod,

  /// Path relative to the base URL, e.g. `rest/api/space`
  pub path: String,

  /// Query parameter (repeatable)
  #[arg(long = "query", value_name = "KEY=VALUE", value_parser = parse_key_value)]
  pub query: Vec<(String, String)>,

  /// JSON request body
  #[arg(short, long, value_name = "JSON", value_parser = parse_json)]
  pub data: Option<Value>,

  /// Print the response body as-is instead of pretty JSON
  #[arg(long)]
  pub raw: bool,

  /// Print error responses instead of failing
  #[arg(long)]
  pub no_fail: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum HttpMethod {
  Get,
  Post,
  Put,
  Delete,
}

impl HttpMethod {
  pub fn as_method(self) -> reqwest::Method {
    match self {
      Self::Get => reqwest::Method::GET,
      Self::Post => reqwest::Method::POST,
      Self::Put => reqwest::Method::PUT,
      Self::Delete => reqwest::Method::DELETE,
    }
  }
}

/// Shells supported by `confluence-api completions`
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
  Bash,
  Zsh,
  Fish,
  Powershell,
  Elvish,
}

/// Normalize a URL by adding https:// if no scheme is present
fn normalize_url(url: &str) -> Result<String, String> {
  let trimmed = url.trim();

  let parsed = match Url::parse(trimmed) {
    Ok(parsed) => parsed,
    // Likely a bare host such as `example.atlassian.net/wiki`
    Err(_) => Url::parse(&format!("https://{trimmed}")).map_err(|e| format!("Invalid URL: {e}"))?,
  };

  let mut url_str = parsed.to_string();
  if url_str.ends_with('/') && url_str.len() > 1 {
    url_str.pop();
  }

  Ok(url_str)
}

fn parse_key_value(input: &str) -> Result<(String, String), String> {
  match input.split_once('=') {
    Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
    _ => Err(format!("expected KEY=VALUE, got `{input}`")),
  }
}

fn parse_json(input: &str) -> Result<Value, String> {
  serde_json::from_str(input).map_err(|e| format!("invalid JSON: {e}"))
}

/// Authentication options
#[derive(Debug, Parser)]
pub struct AuthOptions {
  /// Confluence base URL, including `/wiki` on Atlassian Cloud
  #[arg(long, global = true, env = "CONFLUENCE_URL", value_name = "URL", value_parser = normalize_url)]
  pub url: Option<String>,

  /// Confluence user email
  #[arg(long, global = true, env = "CONFLUENCE_USER", value_name = "EMAIL")]
  pub user: Option<String>,

  /// Confluence API token
  #[arg(long, global = true, env = "CONFLUENCE_TOKEN", value_name = "TOKEN", hide_env_values = true)]
  pub token: Option<String>,
}

/// Behavior options
#[derive(Debug, Parser)]
pub struct BehaviorOptions {
  /// Increase verbosity (-v info, -vv debug, -vvv trace)
  #[arg(short, long, global = true, action = clap::ArgAction::Count)]
  pub verbose: u8,

  /// Suppress all output except errors
  #[arg(short, long, global = true, conflicts_with = "verbose")]
  pub quiet: bool,

  /// Colorize output
  #[arg(long, global = true, value_enum, default_value = "auto", value_name = "WHEN")]
  pub color: ColorOption,
}

/// Color output options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorOption {
  Auto,
  Always,
  Never,
}

/// Performance options
#[derive(Debug, Parser)]
pub struct PerformanceOptions {
  /// Maximum concurrent requests for commands that fan out
  #[arg(long, global = true, default_value_t = DEFAULT_MAX_WORKERS, value_name = "N")]
  pub parallel: usize,

  /// Request timeout in seconds (none by default)
  #[arg(long, global = true, value_name = "SECONDS")]
  pub timeout: Option<u64>,
}

impl Cli {
  /// Parse CLI arguments from the environment
  pub fn parse_args() -> Self {
    Self::parse()
  }

  /// Validate CLI arguments
  ///
  /// Returns an error if the CLI configuration is invalid.
  pub fn validate(&self) -> Result<(), String> {
    if self.performance.parallel == 0 {
      return Err("--parallel must be at least 1".to_string());
    }

    if self.performance.timeout == Some(0) {
      return Err("--timeout must be at least 1 second".to_string());
    }

    let limit = match &self.command {
      Command::Content {
        subcommand: ContentCommand::List { limit, .. } | ContentCommand::Search { limit, .. },
      }
      | Command::Space {
        subcommand: SpaceCommand::List { limit, .. },
      } => Some(*limit),
      _ => None,
    };
    if limit == Some(0) {
      return Err("--limit must be at least 1".to_string());
    }

    Ok(())
  }
}

/// Parse CLI arguments, initialize logging, and dispatch to the chosen command.
pub fn run() {
  let cli = Cli::parse_args();

  init_tracing(&cli.behavior);

  let colors = ColorScheme::new(cli.behavior.color);

  if let Err(e) = cli.validate() {
    eprintln!("{} {}", colors.error("Error:"), e);
    process::exit(4); // Invalid arguments exit code
  }

  match &cli.command {
    Command::Auth { subcommand } => handle_auth_command(subcommand, &cli, &colors),
    Command::Content { subcommand } => handle_content_command(subcommand, &cli, &colors),
    Command::Space { subcommand } => handle_space_command(subcommand, &cli, &colors),
    Command::Request(args) => handle_request_command(args, &cli, &colors),
    Command::Version { json, short } => handle_version_command(*json, *short, &colors),
    Command::Completions { shell } => handle_completions_command(*shell),
  }
}

fn init_tracing(behavior: &BehaviorOptions) {
  let level = if behavior.quiet {
    LevelFilter::ERROR
  } else {
    match behavior.verbose {
      0 => LevelFilter::WARN,
      1 => LevelFilter::INFO,
      2 => LevelFilter::DEBUG,
      _ => LevelFilter::TRACE,
    }
  };

  let env_filter = EnvFilter::builder()
    .with_default_directive(level.into())
    .from_env_lossy();

  let _ = tracing_subscriber::fmt()
    .with_env_filter(env_filter)
    .with_target(false)
    .with_writer(std::io::stderr)
    .try_init();
}

/// Get custom styles for clap help output
fn get_clap_styles() -> clap::builder::Styles {
  use clap::builder::styling::{AnsiColor, Effects};

  clap::builder::Styles::styled()
    .header(AnsiColor::BrightYellow.on_default() | Effects::BOLD)
    .usage(AnsiColor::BrightYellow.on_default() | Effects::BOLD)
    .literal(AnsiColor::BrightGreen.on_default())
    .placeholder(AnsiColor::BrightCyan.on_default())
    .error(AnsiColor::BrightRed.on_default() | Effects::BOLD)
    .valid(AnsiColor::BrightGreen.on_default())
    .invalid(AnsiColor::BrightRed.on_default())
}
