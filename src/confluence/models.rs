//! Typed views of Confluence API payloads.
//!
//! The dispatcher works on plain JSON; these types are for callers that want
//! structured data via [`Call::json`](super::Call::json), and for endpoint
//! arguments with a closed set of values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A piece of content (page, blog post, comment, attachment).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
  /// Unique numeric identifier assigned by Confluence.
  pub id: String,
  /// Human-readable title.
  pub title: String,
  /// Content type such as `"page"` or `"blogpost"`.
  #[serde(rename = "type")]
  pub content_type: String,
  /// Status such as `"current"`, `"draft"`, or `"trashed"`.
  pub status: Option<String>,
  pub space: Option<ContentSpace>,
  pub body: Option<ContentBody>,
  #[serde(rename = "_links")]
  pub links: Option<ContentLinks>,
}

/// Space reference embedded in content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentSpace {
  pub key: String,
  pub name: Option<String>,
}

/// Content body in whichever representations were expanded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentBody {
  pub storage: Option<BodyValue>,
  pub view: Option<BodyValue>,
}

/// A body rendering and the representation it is in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyValue {
  pub value: String,
  pub representation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentLinks {
  /// Path of the content within the web UI.
  #[serde(rename = "webui")]
  pub web_ui: Option<String>,
  #[serde(rename = "self")]
  pub self_link: Option<String>,
}

/// Space metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Space {
  pub id: Option<u64>,
  pub key: String,
  pub name: String,
  /// `"global"` or `"personal"`.
  #[serde(rename = "type")]
  pub space_type: Option<String>,
}

/// User information returned by `rest/api/user/current`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
  /// Stable Atlassian account identifier (Cloud only).
  #[serde(rename = "accountId")]
  pub account_id: Option<String>,
  /// Server and Data Center username.
  pub username: Option<String>,
  pub email: Option<String>,
  #[serde(rename = "displayName")]
  pub display_name: String,
  #[serde(rename = "publicName")]
  pub public_name: Option<String>,
}

/// A content label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
  /// `"global"`, `"my"`, or `"team"`.
  pub prefix: String,
  pub name: String,
}

impl Label {
  pub fn new(prefix: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      prefix: prefix.into(),
      name: name.into(),
    }
  }

  /// A label with the `global` prefix.
  pub fn global(name: impl Into<String>) -> Self {
    Self::new("global", name)
  }
}

/// Content body representations accepted by `contentbody/convert`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Representation {
  Storage,
  Editor,
  View,
  ExportView,
}

impl Representation {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Storage => "storage",
      Self::Editor => "editor",
      Self::View => "view",
      Self::ExportView => "export_view",
    }
  }
}

impl fmt::Display for Representation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Which comments `child/comment` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentDepth {
  /// Only top-level comments (the API's empty `depth`).
  Root,
  /// Every nested reply.
  All,
}

impl CommentDepth {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Root => "",
      Self::All => "all",
    }
  }
}

/// Which content `space/{key}/content` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpaceDepth {
  /// Only the space's root pages.
  Root,
  /// Every page in the space.
  All,
}

impl SpaceDepth {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Root => "root",
      Self::All => "all",
    }
  }
}
