//! `confluence-api version`: build metadata embedded by `build.rs`.

use serde_json::json;

use crate::color::ColorScheme;

/// Build metadata captured at compile time.
struct BuildInfo {
  name: &'static str,
  version: &'static str,
  git_commit: &'static str,
  build_timestamp: &'static str,
  target: &'static str,
  rust_version: &'static str,
}

const BUILD: BuildInfo = BuildInfo {
  name: env!("CARGO_PKG_NAME"),
  version: env!("CARGO_PKG_VERSION"),
  git_commit: env!("GIT_HASH"),
  build_timestamp: env!("BUILD_TIMESTAMP"),
  target: env!("TARGET"),
  rust_version: env!("RUSTC_VERSION"),
};

/// Render version and build metadata in JSON or human-readable form.
pub(crate) fn handle_version_command(json: bool, short: bool, colors: &ColorScheme) {
  if short {
    println!("{}", BUILD.version);
    return;
  }

  if json {
    let document = json!({
      "name": BUILD.name,
      "version": BUILD.version,
      "git_commit": BUILD.git_commit,
      "build_timestamp": format_timestamp(BUILD.build_timestamp),
      "target": BUILD.target,
      "rust_version": BUILD.rust_version,
    });
    println!("{document:#}");
    return;
  }

  println!("{} {}", colors.emphasis(BUILD.name), colors.number(BUILD.version));
  println!("{}: {}", colors.emphasis("Git commit"), colors.code(BUILD.git_commit));
  println!(
    "{}: {}",
    colors.emphasis("Built"),
    colors.dimmed(format_timestamp(BUILD.build_timestamp))
  );
  println!("{}: {}", colors.emphasis("Target"), BUILD.target);
  println!("{}: {}", colors.emphasis("Rust version"), BUILD.rust_version);
}

/// Unix seconds as `YYYY-MM-DD HH:MM:SS UTC`, or the input unchanged.
fn format_timestamp(timestamp: &str) -> String {
  timestamp
    .parse::<i64>()
    .ok()
    .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
    .map(|datetime| datetime.format("%Y-%m-%d %H:%M:%S UTC").to_string())
    .unwrap_or_else(|| timestamp.to_string())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn formats_epoch_seconds() {
    assert_eq!(format_timestamp("0"), "1970-01-01 00:00:00 UTC");
    assert_eq!(format_timestamp("1700000000"), "2023-11-14 22:13:20 UTC");
  }

  #[test]
  fn passes_through_unknown_values() {
    assert_eq!(format_timestamp("unknown"), "unknown");
  }
}
