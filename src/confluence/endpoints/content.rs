//! `rest/api/content` endpoints.

use serde::Serialize;
use serde_json::{Value, json};

use super::{
  ATTACHMENT_METADATA_KEYS, NEW_CONTENT_REQUIRED_KEYS, NEW_PROPERTY_REQUIRED_KEYS, UPDATE_CONTENT_REQUIRED_KEYS,
  UPDATE_PROPERTY_REQUIRED_KEYS, json_body,
};
use crate::confluence::client::{Call, ConfluenceClient};
use crate::confluence::error::ApiError;
use crate::confluence::executor::Executor;
use crate::confluence::models::{CommentDepth, Label};
use crate::confluence::pagination::Cursor;
use crate::confluence::request::{FileUpload, QueryParams, Request};

/// Filters for listing content.
#[derive(Debug, Clone, Default)]
pub struct ContentQuery {
  /// `"page"` or `"blogpost"`.
  pub content_type: Option<String>,
  pub space_key: Option<String>,
  pub title: Option<String>,
  /// `"current"`, `"trashed"`, or `"any"`.
  pub status: Option<String>,
  /// Blog post publication day, `yyyy-mm-dd`.
  pub posting_day: Option<String>,
  /// Comma-separated properties to expand, e.g. `space,body.view`.
  pub expand: Option<String>,
}

/// Options for fetching one piece of content.
#[derive(Debug, Clone, Default)]
pub struct ContentByIdQuery {
  pub status: Option<String>,
  /// Historical version to fetch instead of the latest.
  pub version: Option<u64>,
  pub expand: Option<String>,
}

/// A CQL search.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
  /// Confluence Query Language string, e.g. `space=DOCS and type=page`.
  pub cql: Option<String>,
  /// Search context, sent JSON-encoded as `cqlcontext`.
  pub cql_context: Option<Value>,
  pub expand: Option<String>,
}

/// Options for listing the children of a piece of content.
#[derive(Debug, Clone, Default)]
pub struct ChildrenQuery {
  pub expand: Option<String>,
  /// Version of the parent whose children to list.
  pub parent_version: Option<u64>,
}

/// Options for listing comments.
#[derive(Debug, Clone, Default)]
pub struct CommentsQuery {
  pub expand: Option<String>,
  pub parent_version: Option<u64>,
  /// `"inline"`, `"footer"`, or `"resolved"`.
  pub location: Option<String>,
  pub depth: Option<CommentDepth>,
}

/// Options for listing attachments.
#[derive(Debug, Clone, Default)]
pub struct AttachmentsQuery {
  pub expand: Option<String>,
  pub filename: Option<String>,
  pub media_type: Option<String>,
}

fn expand_only(expand: Option<&str>) -> QueryParams {
  QueryParams::new().text("expand", expand)
}

impl<E: Executor> ConfluenceClient<E> {
  /// List content, newest first unless filtered.
  pub fn get_content(&self, query: &ContentQuery, cursor: Cursor) -> Call<'_, E> {
    let params = QueryParams::new()
      .text("type", query.content_type.as_deref())
      .text("spaceKey", query.space_key.as_deref())
      .text("title", query.title.as_deref())
      .text("status", query.status.as_deref())
      .text("postingDay", query.posting_day.as_deref())
      .text("expand", query.expand.as_deref())
      .cursor(cursor);
    self.call(Request::get("rest/api/content").with_query(params))
  }

  pub fn get_content_by_id(&self, content_id: &str, query: &ContentByIdQuery) -> Call<'_, E> {
    let params = QueryParams::new()
      .text("status", query.status.as_deref())
      .number("version", query.version)
      .text("expand", query.expand.as_deref());
    self.call(Request::get(format!("rest/api/content/{content_id}")).with_query(params))
  }

  pub fn get_content_history_by_id(&self, content_id: &str, expand: Option<&str>) -> Call<'_, E> {
    self.call(Request::get(format!("rest/api/content/{content_id}/history")).with_query(expand_only(expand)))
  }

  /// Body of a macro, in storage format, identified by its render-time hash.
  pub fn get_content_macro_by_hash(&self, content_id: &str, version: u64, macro_hash: &str) -> Call<'_, E> {
    self.call(Request::get(format!(
      "rest/api/content/{content_id}/history/{version}/macro/hash/{macro_hash}"
    )))
  }

  /// Body of a macro, in storage format, identified by its macro id.
  pub fn get_content_macro_by_macro_id(&self, content_id: &str, version: u64, macro_id: &str) -> Call<'_, E> {
    self.call(Request::get(format!(
      "rest/api/content/{content_id}/history/{version}/macro/id/{macro_id}"
    )))
  }

  /// Search content with CQL.
  pub fn search_content(&self, query: &SearchQuery, cursor: Cursor) -> Call<'_, E> {
    let cql_context = query.cql_context.as_ref().map(Value::to_string);
    let params = QueryParams::new()
      .text("cql", query.cql.as_deref())
      .text("cqlcontext", cql_context.as_deref())
      .text("expand", query.expand.as_deref())
      .cursor(cursor);
    self.call(Request::get("rest/api/content/search").with_query(params))
  }

  /// Map of direct children by type; only types named in `expand` are filled.
  pub fn get_content_children(&self, content_id: &str, query: &ChildrenQuery) -> Call<'_, E> {
    let params = QueryParams::new()
      .text("expand", query.expand.as_deref())
      .number("parentVersion", query.parent_version);
    self.call(Request::get(format!("rest/api/content/{content_id}/child")).with_query(params))
  }

  pub fn get_content_children_by_type(
    &self,
    content_id: &str,
    child_type: &str,
    query: &ChildrenQuery,
    cursor: Cursor,
  ) -> Call<'_, E> {
    let params = QueryParams::new()
      .text("expand", query.expand.as_deref())
      .number("parentVersion", query.parent_version)
      .cursor(cursor);
    self.call(Request::get(format!("rest/api/content/{content_id}/child/{child_type}")).with_query(params))
  }

  pub fn get_content_descendants(&self, content_id: &str, expand: Option<&str>) -> Call<'_, E> {
    self.call(Request::get(format!("rest/api/content/{content_id}/descendant")).with_query(expand_only(expand)))
  }

  pub fn get_content_descendants_by_type(
    &self,
    content_id: &str,
    child_type: &str,
    expand: Option<&str>,
    cursor: Cursor,
  ) -> Call<'_, E> {
    self.call(
      Request::get(format!("rest/api/content/{content_id}/descendant/{child_type}"))
        .with_query(expand_only(expand).cursor(cursor)),
    )
  }

  pub fn get_content_labels(&self, content_id: &str, prefix: Option<&str>, cursor: Cursor) -> Call<'_, E> {
    let params = QueryParams::new().text("prefix", prefix).cursor(cursor);
    self.call(Request::get(format!("rest/api/content/{content_id}/label")).with_query(params))
  }

  pub fn get_content_comments(&self, content_id: &str, query: &CommentsQuery, cursor: Cursor) -> Call<'_, E> {
    let params = QueryParams::new()
      .text("expand", query.expand.as_deref())
      .number("parentVersion", query.parent_version)
      .cursor(cursor)
      .text("location", query.location.as_deref())
      .text("depth", query.depth.map(CommentDepth::as_str));
    self.call(Request::get(format!("rest/api/content/{content_id}/child/comment")).with_query(params))
  }

  pub fn get_content_attachments(&self, content_id: &str, query: &AttachmentsQuery, cursor: Cursor) -> Call<'_, E> {
    let params = QueryParams::new()
      .text("expand", query.expand.as_deref())
      .cursor(cursor)
      .text("filename", query.filename.as_deref())
      .text("mediaType", query.media_type.as_deref());
    self.call(Request::get(format!("rest/api/content/{content_id}/child/attachment")).with_query(params))
  }

  pub fn get_content_properties(&self, content_id: &str, expand: Option<&str>, cursor: Cursor) -> Call<'_, E> {
    self.call(
      Request::get(format!("rest/api/content/{content_id}/property")).with_query(expand_only(expand).cursor(cursor)),
    )
  }

  pub fn get_property_by_content_id(&self, content_id: &str, property_key: &str, expand: Option<&str>) -> Call<'_, E> {
    self.call(
      Request::get(format!("rest/api/content/{content_id}/property/{property_key}")).with_query(expand_only(expand)),
    )
  }

  /// Restrictions on a piece of content, grouped by operation.
  pub fn get_op_restrictions_for_content_id(&self, content_id: &str, expand: Option<&str>) -> Call<'_, E> {
    self.call(
      Request::get(format!("rest/api/content/{content_id}/restriction/byOperation")).with_query(expand_only(expand)),
    )
  }

  /// Restrictions for one operation (`read` or `update`).
  pub fn get_op_restrictions_by_content_operation(
    &self,
    content_id: &str,
    operation_key: &str,
    expand: Option<&str>,
    cursor: Cursor,
  ) -> Call<'_, E> {
    self.call(
      Request::get(format!(
        "rest/api/content/{content_id}/restriction/byOperation/{operation_key}"
      ))
      .with_query(expand_only(expand).cursor(cursor)),
    )
  }

  /// Create a page, blog post, or comment.
  ///
  /// # Errors
  /// Fails locally unless `content_data` has `type`, `title`, `space`, and
  /// `body`.
  pub fn create_new_content(&self, content_data: impl Serialize) -> Result<Call<'_, E>, ApiError> {
    let body = json_body(content_data, NEW_CONTENT_REQUIRED_KEYS, "new content")?;
    Ok(self.call(Request::post("rest/api/content").with_json(body)))
  }

  /// Upload one or more files as attachments.
  ///
  /// # Errors
  /// Fails locally when `attachments` is empty.
  pub fn create_new_attachment_by_content_id(
    &self,
    content_id: &str,
    attachments: Vec<FileUpload>,
  ) -> Result<Call<'_, E>, ApiError> {
    if attachments.is_empty() {
      return Err(ApiError::precondition("at least one file is required to create attachments"));
    }
    Ok(self.call(Request::post(format!("rest/api/content/{content_id}/child/attachment")).with_files(attachments)))
  }

  /// Add labels to a piece of content.
  ///
  /// # Errors
  /// Fails locally when `labels` is empty or a label has an empty name.
  pub fn create_new_label_by_content_id(&self, content_id: &str, labels: &[Label]) -> Result<Call<'_, E>, ApiError> {
    if labels.is_empty() {
      return Err(ApiError::precondition("at least one label is required"));
    }
    if labels.iter().any(|label| label.name.is_empty()) {
      return Err(ApiError::precondition("label names must not be empty"));
    }
    let body = serde_json::to_value(labels).map_err(|err| ApiError::precondition(err.to_string()))?;
    Ok(self.call(Request::post(format!("rest/api/content/{content_id}/label")).with_json(body)))
  }

  /// Create a property under an explicit key.
  ///
  /// # Errors
  /// Fails locally unless `property_data` has `key` and `value`.
  pub fn create_new_property(
    &self,
    content_id: &str,
    property_key: &str,
    property_data: impl Serialize,
  ) -> Result<Call<'_, E>, ApiError> {
    let body = json_body(property_data, NEW_PROPERTY_REQUIRED_KEYS, "new property")?;
    Ok(self.call(Request::post(format!("rest/api/content/{content_id}/property/{property_key}")).with_json(body)))
  }

  /// Create a property whose key is taken from the body.
  ///
  /// # Errors
  /// Fails locally unless `property_data` has `key` and `value`.
  pub fn create_new_content_property(
    &self,
    content_id: &str,
    property_data: impl Serialize,
  ) -> Result<Call<'_, E>, ApiError> {
    let body = json_body(property_data, NEW_PROPERTY_REQUIRED_KEYS, "new content property")?;
    Ok(self.call(Request::post(format!("rest/api/content/{content_id}/property")).with_json(body)))
  }

  /// Replace a piece of content. `content_data.version.number` must be the
  /// next version number.
  ///
  /// # Errors
  /// Fails locally unless `content_data` has `id` and `version`.
  pub fn update_content_by_id(&self, content_data: impl Serialize, content_id: &str) -> Result<Call<'_, E>, ApiError> {
    let body = json_body(content_data, UPDATE_CONTENT_REQUIRED_KEYS, "content update")?;
    Ok(self.call(Request::put(format!("rest/api/content/{content_id}")).with_json(body)))
  }

  /// Update the metadata (title, media type, comment) of an attachment.
  ///
  /// # Errors
  /// Fails locally unless `new_metadata` has `id`, `type`, `version`, and
  /// `title`.
  pub fn update_attachment_metadata(
    &self,
    content_id: &str,
    attachment_id: &str,
    new_metadata: impl Serialize,
  ) -> Result<Call<'_, E>, ApiError> {
    let body = json_body(new_metadata, ATTACHMENT_METADATA_KEYS, "attachment metadata")?;
    Ok(self.call(
      Request::put(format!("rest/api/content/{content_id}/child/attachment/{attachment_id}")).with_json(body),
    ))
  }

  /// Upload a new version of an attachment's file.
  pub fn update_attachment(&self, content_id: &str, attachment_id: &str, attachment: FileUpload) -> Call<'_, E> {
    self.call(
      Request::post(format!(
        "rest/api/content/{content_id}/child/attachment/{attachment_id}/data"
      ))
      .with_files(vec![attachment]),
    )
  }

  /// # Errors
  /// Fails locally unless `property_data` has `key`, `value`, and `version`.
  pub fn update_property(
    &self,
    content_id: &str,
    property_key: &str,
    property_data: impl Serialize,
  ) -> Result<Call<'_, E>, ApiError> {
    let body = json_body(property_data, UPDATE_PROPERTY_REQUIRED_KEYS, "property update")?;
    Ok(self.call(Request::put(format!("rest/api/content/{content_id}/property/{property_key}")).with_json(body)))
  }

  /// Trash a piece of content, or purge it when `status` is `"trashed"`.
  pub fn delete_content_by_id(&self, content_id: &str, status: Option<&str>) -> Call<'_, E> {
    let params = QueryParams::new().text("status", status);
    self.call(Request::delete(format!("rest/api/content/{content_id}")).with_query(params))
  }

  pub fn delete_label_by_id(&self, content_id: &str, label_name: &str) -> Call<'_, E> {
    let params = QueryParams::new().text("name", Some(label_name));
    self.call(Request::delete(format!("rest/api/content/{content_id}/label")).with_query(params))
  }

  pub fn delete_property(&self, content_id: &str, property_key: &str) -> Call<'_, E> {
    self.call(Request::delete(format!(
      "rest/api/content/{content_id}/property/{property_key}"
    )))
  }
}

/// Storage-format page body for [`ConfluenceClient::create_new_content`].
pub fn storage_page(space_key: &str, title: &str, storage_value: &str) -> Value {
  json!({
    "type": "page",
    "title": title,
    "space": {"key": space_key},
    "body": {"storage": {"value": storage_value, "representation": "storage"}},
  })
}

#[cfg(test)]
mod tests {
  use reqwest::Method;
  use serde_json::json;

  use super::*;
  use crate::confluence::ConfluenceClient;
  use crate::confluence::request::Body;

  fn client() -> ConfluenceClient {
    ConfluenceClient::new("user@example.com", "token", "https://example.atlassian.net/wiki").unwrap()
  }

  #[test]
  fn get_content_omits_unset_filters() {
    let client = client();
    let call = client.get_content(&ContentQuery::default(), Cursor::default());
    assert_eq!(call.request().path(), "rest/api/content");
    assert!(call.request().query().is_empty());
  }

  #[test]
  fn get_content_maps_filters_to_api_names() {
    let client = client();
    let query = ContentQuery {
      content_type: Some("blogpost".into()),
      space_key: Some("DOCS".into()),
      posting_day: Some("2013-02-13".into()),
      ..Default::default()
    };
    let call = client.get_content(&query, Cursor::with_limit(10));
    let params = call.request().query();

    assert_eq!(params.get("type"), Some("blogpost"));
    assert_eq!(params.get("spaceKey"), Some("DOCS"));
    assert_eq!(params.get("postingDay"), Some("2013-02-13"));
    assert_eq!(params.get("limit"), Some("10"));
    assert!(!params.contains_key("start"));
    assert!(!params.contains_key("title"));
  }

  #[test]
  fn search_encodes_cql_context_as_json() {
    let client = client();
    let query = SearchQuery {
      cql: Some("space=DOCS".into()),
      cql_context: Some(json!({"spaceKey": "DOCS"})),
      expand: None,
    };
    let call = client.search_content(&query, Cursor::default());
    assert_eq!(call.request().query().get("cqlcontext"), Some(r#"{"spaceKey":"DOCS"}"#));
    assert!(!call.request().query().contains_key("expand"));
  }

  #[test]
  fn root_comment_depth_is_omitted() {
    let client = client();
    let root = CommentsQuery {
      depth: Some(CommentDepth::Root),
      ..Default::default()
    };
    let all = CommentsQuery {
      depth: Some(CommentDepth::All),
      ..Default::default()
    };
    assert!(!client.get_content_comments("1", &root, Cursor::default()).request().query().contains_key("depth"));
    assert_eq!(
      client.get_content_comments("1", &all, Cursor::default()).request().query().get("depth"),
      Some("all")
    );
  }

  #[test]
  fn macro_paths_include_version() {
    let client = client();
    assert_eq!(
      client.get_content_macro_by_macro_id("42", 3, "abc").request().path(),
      "rest/api/content/42/history/3/macro/id/abc"
    );
    assert_eq!(
      client.get_content_macro_by_hash("42", 3, "f00").request().path(),
      "rest/api/content/42/history/3/macro/hash/f00"
    );
  }

  #[test]
  fn create_new_content_requires_keys() {
    let client = client();
    let err = client
      .create_new_content(json!({"type": "page", "title": "Missing space and body"}))
      .err()
      .unwrap();
    assert!(err.is_precondition());

    let call = client
      .create_new_content(storage_page("DOCS", "Landing", "<p>Hi</p>"))
      .unwrap();
    assert_eq!(call.request().method(), Method::POST);
    assert!(matches!(call.request().body(), Body::Json(_)));
  }

  #[test]
  fn update_content_uses_put_on_content_path() {
    let client = client();
    let call = client
      .update_content_by_id(json!({"id": "123", "version": {"number": 2}, "title": "New"}), "123")
      .unwrap();
    assert_eq!(call.request().method(), Method::PUT);
    assert_eq!(call.request().path(), "rest/api/content/123");
  }

  #[test]
  fn attachment_upload_requires_files() {
    let client = client();
    assert!(client.create_new_attachment_by_content_id("1", Vec::new()).err().unwrap().is_precondition());
  }

  #[test]
  fn labels_are_posted_as_json_array() {
    let client = client();
    let call = client
      .create_new_label_by_content_id("7", &[Label::global("docs"), Label::new("my", "favourite")])
      .unwrap();
    assert_eq!(call.request().method(), Method::POST);
    assert_eq!(
      call.request().body(),
      &Body::Json(json!([{"prefix": "global", "name": "docs"}, {"prefix": "my", "name": "favourite"}]))
    );
    assert!(client.create_new_label_by_content_id("7", &[]).err().unwrap().is_precondition());
  }

  #[test]
  fn property_update_requires_version() {
    let client = client();
    let err = client
      .update_property("1", "owner", json!({"key": "owner", "value": "docs"}))
      .err()
      .unwrap();
    assert!(err.to_string().contains("version"));
  }

  #[test]
  fn delete_label_sends_name_as_query() {
    let client = client();
    let call = client.delete_label_by_id("9", "obsolete");
    assert_eq!(call.request().method(), Method::DELETE);
    assert_eq!(call.request().query().get("name"), Some("obsolete"));
  }
}
