//! Endpoint wrappers: one method per Confluence REST resource and verb.
//!
//! Each wrapper maps its arguments onto a [`Request`](super::Request) and
//! returns a [`Call`](super::Call). Wrappers that send a body check its
//! required keys first and return [`ApiError::Precondition`] without touching
//! the network when one is missing.

mod content;
mod misc;
mod space;

pub use content::{
  AttachmentsQuery, ChildrenQuery, CommentsQuery, ContentByIdQuery, ContentQuery, SearchQuery, storage_page,
};
pub use space::SpaceContentQuery;

use serde::Serialize;
use serde_json::Value;

use super::error::ApiError;

/// Keys a new piece of content must define.
pub const NEW_CONTENT_REQUIRED_KEYS: &[&str] = &["type", "title", "space", "body"];
/// Keys a content update must define.
pub const UPDATE_CONTENT_REQUIRED_KEYS: &[&str] = &["id", "version"];
/// Keys attachment metadata updates must define.
pub const ATTACHMENT_METADATA_KEYS: &[&str] = &["id", "type", "version", "title"];
/// Keys a new content property must define.
pub const NEW_PROPERTY_REQUIRED_KEYS: &[&str] = &["key", "value"];
/// Keys a content property update must define.
pub const UPDATE_PROPERTY_REQUIRED_KEYS: &[&str] = &["key", "value", "version"];
/// Keys a space definition must define.
pub const SPACE_REQUIRED_KEYS: &[&str] = &["key", "name", "description"];

/// Serialize `data` into a JSON object that contains every `required` key.
///
/// # Errors
/// Returns [`ApiError::Precondition`] when `data` does not serialize to an
/// object or lacks one of the keys.
pub fn json_body(data: impl Serialize, required: &[&str], what: &str) -> Result<Value, ApiError> {
  let value = serde_json::to_value(data)
    .map_err(|err| ApiError::precondition(format!("{what} is not serializable as JSON: {err}")))?;

  let Some(object) = value.as_object() else {
    return Err(ApiError::precondition(format!("{what} must be a JSON object")));
  };

  let missing: Vec<&str> = required
    .iter()
    .copied()
    .filter(|key| !object.contains_key(*key))
    .collect();
  if !missing.is_empty() {
    return Err(ApiError::precondition(format!(
      "{what} is missing required keys: {}",
      missing.join(", ")
    )));
  }

  Ok(value)
}
