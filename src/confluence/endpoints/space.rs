//! `rest/api/space` endpoints.

use serde::Serialize;

use super::{SPACE_REQUIRED_KEYS, json_body};
use crate::confluence::client::{Call, ConfluenceClient};
use crate::confluence::error::ApiError;
use crate::confluence::executor::Executor;
use crate::confluence::models::SpaceDepth;
use crate::confluence::pagination::Cursor;
use crate::confluence::request::{QueryParams, Request};

/// Options for listing the content of a space.
#[derive(Debug, Clone, Default)]
pub struct SpaceContentQuery {
  /// Root pages only, or everything.
  pub depth: Option<SpaceDepth>,
  pub expand: Option<String>,
}

impl SpaceContentQuery {
  fn params(&self, cursor: Cursor) -> QueryParams {
    QueryParams::new()
      .text("depth", self.depth.map(SpaceDepth::as_str))
      .text("expand", self.expand.as_deref())
      .cursor(cursor)
  }
}

impl<E: Executor> ConfluenceClient<E> {
  /// List spaces, optionally narrowed to one `space_key`.
  pub fn get_spaces(&self, space_key: Option<&str>, expand: Option<&str>, cursor: Cursor) -> Call<'_, E> {
    let params = QueryParams::new()
      .text("spaceKey", space_key)
      .text("expand", expand)
      .cursor(cursor);
    self.call(Request::get("rest/api/space").with_query(params))
  }

  pub fn get_space_information(&self, space_key: &str, expand: Option<&str>) -> Call<'_, E> {
    let params = QueryParams::new().text("expand", expand);
    self.call(Request::get(format!("rest/api/space/{space_key}")).with_query(params))
  }

  /// Content in a space, grouped by type.
  pub fn get_space_content(&self, space_key: &str, query: &SpaceContentQuery, cursor: Cursor) -> Call<'_, E> {
    self.call(Request::get(format!("rest/api/space/{space_key}/content")).with_query(query.params(cursor)))
  }

  /// Content of one type (`page` or `blogpost`) in a space.
  pub fn get_space_content_by_type(
    &self,
    space_key: &str,
    content_type: &str,
    query: &SpaceContentQuery,
    cursor: Cursor,
  ) -> Call<'_, E> {
    self.call(
      Request::get(format!("rest/api/space/{space_key}/content/{content_type}")).with_query(query.params(cursor)),
    )
  }

  /// # Errors
  /// Fails locally unless `space_definition` has `key`, `name`, and
  /// `description`.
  pub fn create_new_space(&self, space_definition: impl Serialize) -> Result<Call<'_, E>, ApiError> {
    let body = json_body(space_definition, SPACE_REQUIRED_KEYS, "space definition")?;
    Ok(self.call(Request::post("rest/api/space").with_json(body)))
  }

  /// Create a space visible only to its creator.
  ///
  /// # Errors
  /// Fails locally unless `space_definition` has `key`, `name`, and
  /// `description`.
  pub fn create_new_private_space(&self, space_definition: impl Serialize) -> Result<Call<'_, E>, ApiError> {
    let body = json_body(space_definition, SPACE_REQUIRED_KEYS, "space definition")?;
    Ok(self.call(Request::post("rest/api/space/_private").with_json(body)))
  }

  /// # Errors
  /// Fails locally unless `space_definition` has `key`, `name`, and
  /// `description`.
  pub fn update_space(&self, space_key: &str, space_definition: impl Serialize) -> Result<Call<'_, E>, ApiError> {
    let body = json_body(space_definition, SPACE_REQUIRED_KEYS, "space definition")?;
    Ok(self.call(Request::put(format!("rest/api/space/{space_key}")).with_json(body)))
  }

  /// Delete a space. Confluence answers with a long task to poll.
  pub fn delete_space(&self, space_key: &str) -> Call<'_, E> {
    self.call(Request::delete(format!("rest/api/space/{space_key}")))
  }
}
