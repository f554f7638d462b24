//! Request descriptors handed to the dispatcher.

use bytes::Bytes;
use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use url::Url;

use super::error::ApiError;
use super::pagination::Cursor;

/// Header the API requires on multipart uploads to skip its XSRF check.
pub const ATLASSIAN_TOKEN_HEADER: &str = "x-atlassian-token";

/// Query parameters that only ever hold values the caller actually set.
///
/// `None` and empty strings are dropped on insertion, so an unset optional
/// never reaches the wire as `?key=` or `?key=None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add a string parameter, skipping `None` and empty values.
  pub fn text(mut self, key: impl Into<String>, value: Option<&str>) -> Self {
    if let Some(value) = value.filter(|value| !value.is_empty()) {
      self.insert(key.into(), value.to_string());
    }
    self
  }

  /// Add a numeric parameter, skipping `None`.
  pub fn number(mut self, key: impl Into<String>, value: Option<u64>) -> Self {
    if let Some(value) = value {
      self.insert(key.into(), value.to_string());
    }
    self
  }

  /// Add the `start`/`limit` pair of a pagination cursor.
  pub fn cursor(self, cursor: Cursor) -> Self {
    self.number("start", cursor.start).number("limit", cursor.limit)
  }

  /// Insert or replace a parameter. Empty values are ignored.
  pub fn insert(&mut self, key: String, value: String) {
    if value.is_empty() {
      return;
    }
    match self.0.iter_mut().find(|(existing, _)| *existing == key) {
      Some(entry) => entry.1 = value,
      None => self.0.push((key, value)),
    }
  }

  pub fn get(&self, key: &str) -> Option<&str> {
    self
      .0
      .iter()
      .find(|(existing, _)| existing == key)
      .map(|(_, value)| value.as_str())
  }

  pub fn contains_key(&self, key: &str) -> bool {
    self.get(key).is_some()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
  }
}

/// A file sent as one part of a multipart upload.
///
/// Every part is sent under the form field `file`, which is the field name the
/// attachment endpoints read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
  /// File name reported to Confluence; becomes the attachment title.
  pub file_name: String,
  /// MIME type of the payload, when known.
  pub content_type: Option<String>,
  /// Raw file contents.
  pub data: Bytes,
}

impl FileUpload {
  pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
    Self {
      file_name: file_name.into(),
      content_type: None,
      data: data.into(),
    }
  }

  pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
    self.content_type = Some(content_type.into());
    self
  }

  pub(crate) fn into_part(self) -> Result<reqwest::multipart::Part, ApiError> {
    let part = reqwest::multipart::Part::bytes(self.data.to_vec()).file_name(self.file_name);
    match self.content_type {
      Some(content_type) => Ok(part.mime_str(&content_type)?),
      None => Ok(part),
    }
  }
}

/// Request payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Body {
  #[default]
  Empty,
  /// JSON document sent with `Content-Type: application/json`.
  Json(Value),
  /// Files sent as `multipart/form-data`.
  Multipart(Vec<FileUpload>),
}

/// Verb, relative path, query, body, and headers of one API call.
///
/// Built with the consuming `with_*` methods and read-only afterwards.
#[derive(Debug, Clone)]
pub struct Request {
  method: Method,
  path: String,
  query: QueryParams,
  body: Body,
  headers: HeaderMap,
}

impl Request {
  pub fn new(method: Method, path: impl Into<String>) -> Self {
    Self {
      method,
      path: path.into(),
      query: QueryParams::new(),
      body: Body::Empty,
      headers: HeaderMap::new(),
    }
  }

  pub fn get(path: impl Into<String>) -> Self {
    Self::new(Method::GET, path)
  }

  pub fn post(path: impl Into<String>) -> Self {
    Self::new(Method::POST, path)
  }

  pub fn put(path: impl Into<String>) -> Self {
    Self::new(Method::PUT, path)
  }

  pub fn delete(path: impl Into<String>) -> Self {
    Self::new(Method::DELETE, path)
  }

  pub fn with_query(mut self, query: QueryParams) -> Self {
    self.query = query;
    self
  }

  /// Attach a JSON body and the matching `Content-Type` header.
  pub fn with_json(mut self, body: Value) -> Self {
    self
      .headers
      .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    self.body = Body::Json(body);
    self
  }

  /// Attach files as a multipart body together with the XSRF override token.
  pub fn with_files(mut self, files: Vec<FileUpload>) -> Self {
    self.headers.insert(
      HeaderName::from_static(ATLASSIAN_TOKEN_HEADER),
      HeaderValue::from_static("nocheck"),
    );
    self.body = Body::Multipart(files);
    self
  }

  pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
    self.headers.insert(name, value);
    self
  }

  pub fn method(&self) -> &Method {
    &self.method
  }

  pub fn path(&self) -> &str {
    &self.path
  }

  pub fn query(&self) -> &QueryParams {
    &self.query
  }

  pub fn body(&self) -> &Body {
    &self.body
  }

  pub fn headers(&self) -> &HeaderMap {
    &self.headers
  }

  /// Resolve the path against `base` and append the query string.
  pub fn url(&self, base: &Url) -> Result<Url, ApiError> {
    let mut url = base.join(&self.path)?;
    if !self.query.is_empty() {
      url.query_pairs_mut().extend_pairs(self.query.iter());
    }
    Ok(url)
  }

  pub(crate) fn into_parts(self) -> (Method, String, QueryParams, Body, HeaderMap) {
    (self.method, self.path, self.query, self.body, self.headers)
  }
}

/// Per-call switches for status checking and decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOptions {
  /// Fail with [`ApiError::Http`] on 4xx/5xx responses.
  pub raise_on_error: bool,
  /// Return the body as bytes instead of decoding JSON.
  pub raw: bool,
}

impl Default for DispatchOptions {
  fn default() -> Self {
    Self {
      raise_on_error: true,
      raw: false,
    }
  }
}
