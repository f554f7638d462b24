//! Semantic terminal colors for CLI output.
//!
//! Every message type has one style, and `--color never` (or a non-TTY
//! stdout under `auto`) turns styling off. Icons such as ✓, ✗ and ⚠ carry
//! the meaning on their own when colors are off.

use std::fmt::Display;
use std::io::IsTerminal;

use owo_colors::{OwoColorize, Style};

use crate::cli::ColorOption;

/// Styles output by meaning (success, error, link, ...) rather than by color.
#[derive(Debug, Clone, Copy)]
pub struct ColorScheme {
  enabled: bool,
}

impl ColorScheme {
  /// Honor `--color`, detecting a terminal on stdout for `auto`.
  pub fn new(color_option: ColorOption) -> Self {
    let enabled = match color_option {
      ColorOption::Always => true,
      ColorOption::Never => false,
      ColorOption::Auto => std::io::stdout().is_terminal(),
    };

    Self { enabled }
  }

  pub fn is_enabled(&self) -> bool {
    self.enabled
  }

  fn paint<T: Display>(&self, text: T, style: Style) -> String {
    if self.enabled {
      text.style(style).to_string()
    } else {
      text.to_string()
    }
  }

  /// Green.
  pub fn success<T: Display>(&self, text: T) -> String {
    self.paint(text, Style::new().green())
  }

  /// Bold bright red.
  pub fn error<T: Display>(&self, text: T) -> String {
    self.paint(text, Style::new().bright_red().bold())
  }

  pub fn warning<T: Display>(&self, text: T) -> String {
    self.paint(text, Style::new().yellow())
  }

  /// Progress and informational lines.
  pub fn info<T: Display>(&self, text: T) -> String {
    self.paint(text, Style::new().cyan())
  }

  /// Labels and titles.
  pub fn emphasis<T: Display>(&self, text: T) -> String {
    self.paint(text, Style::new().bright_white().bold())
  }

  pub fn link<T: Display>(&self, text: T) -> String {
    self.paint(text, Style::new().blue().underline())
  }

  pub fn number<T: Display>(&self, text: T) -> String {
    self.paint(text, Style::new().bright_blue())
  }

  /// Identifiers such as space keys and commit hashes.
  pub fn code<T: Display>(&self, text: T) -> String {
    self.paint(text, Style::new().bright_green())
  }

  /// Secondary context.
  pub fn dimmed<T: Display>(&self, text: T) -> String {
    self.paint(text, Style::new().dimmed())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_color_scheme_disabled() {
    let scheme = ColorScheme::new(ColorOption::Never);
    assert!(!scheme.is_enabled());
    assert_eq!(scheme.success("test"), "test");
    assert_eq!(scheme.error("test"), "test");
    assert_eq!(scheme.number(42), "42");
  }

  #[test]
  fn test_color_scheme_enabled() {
    let scheme = ColorScheme::new(ColorOption::Always);
    assert!(scheme.is_enabled());
    assert_ne!(scheme.success("test"), "test");
    assert!(scheme.error("test").contains("test"));
    assert!(scheme.error("test").starts_with('\u{1b}'));
  }

  #[test]
  fn test_styles_differ_by_meaning() {
    let scheme = ColorScheme::new(ColorOption::Always);
    let styled = [
      scheme.success("x"),
      scheme.error("x"),
      scheme.warning("x"),
      scheme.info("x"),
      scheme.emphasis("x"),
      scheme.link("x"),
      scheme.number("x"),
      scheme.code("x"),
      scheme.dimmed("x"),
    ];
    for (i, a) in styled.iter().enumerate() {
      for b in &styled[i + 1..] {
        assert_ne!(a, b);
      }
    }
  }
}
