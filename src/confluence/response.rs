//! Buffered responses and the decoded outcome of a call.

use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use super::error::ApiError;

/// A fully buffered HTTP response.
///
/// This is what response callbacks receive; the body has already been read
/// off the connection.
#[derive(Debug, Clone)]
pub struct ApiResponse {
  status: StatusCode,
  headers: HeaderMap,
  url: Url,
  body: Bytes,
}

impl ApiResponse {
  pub fn new(status: StatusCode, headers: HeaderMap, url: Url, body: Bytes) -> Self {
    Self {
      status,
      headers,
      url,
      body,
    }
  }

  /// Read the body of a reqwest response into memory.
  pub(crate) async fn read(response: reqwest::Response) -> Result<Self, ApiError> {
    let status = response.status();
    let headers = response.headers().clone();
    let url = response.url().clone();
    let body = response.bytes().await?;
    Ok(Self::new(status, headers, url, body))
  }

  pub fn status(&self) -> StatusCode {
    self.status
  }

  pub fn headers(&self) -> &HeaderMap {
    &self.headers
  }

  pub fn url(&self) -> &Url {
    &self.url
  }

  pub fn bytes(&self) -> &Bytes {
    &self.body
  }

  pub fn into_bytes(self) -> Bytes {
    self.body
  }

  /// Body decoded as UTF-8, replacing invalid sequences.
  pub fn text(&self) -> String {
    String::from_utf8_lossy(&self.body).into_owned()
  }

  pub fn is_empty(&self) -> bool {
    self.body.is_empty()
  }

  /// Deserialize the body as JSON.
  ///
  /// # Errors
  /// Returns [`ApiError::Decode`] when the body is not valid JSON for `T`.
  pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
    Ok(serde_json::from_slice(&self.body)?)
  }

  /// Turn a 4xx/5xx response into [`ApiError::Http`].
  pub fn error_for_status(self) -> Result<Self, ApiError> {
    if self.status.is_client_error() || self.status.is_server_error() {
      return Err(ApiError::Http {
        status: self.status,
        url: self.url,
        body: String::from_utf8_lossy(&self.body).into_owned(),
      });
    }
    Ok(self)
  }
}

/// Decoded result of a call made without a callback.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
  /// Body parsed as JSON.
  Json(Value),
  /// Body returned untouched because raw output was requested.
  Raw(Bytes),
  /// The server sent an empty body.
  NoContent,
}

impl Outcome {
  /// Decode `response`: empty bodies become [`Outcome::NoContent`], `raw`
  /// keeps the bytes, anything else is parsed as JSON.
  pub fn decode(response: ApiResponse, raw: bool) -> Result<Self, ApiError> {
    if response.is_empty() {
      return Ok(Self::NoContent);
    }
    if raw {
      return Ok(Self::Raw(response.into_bytes()));
    }
    Ok(Self::Json(response.json()?))
  }

  /// Convert into a JSON value: raw bytes are parsed, no content is `null`.
  pub fn into_json(self) -> Result<Value, ApiError> {
    match self {
      Self::Json(value) => Ok(value),
      Self::Raw(bytes) => Ok(serde_json::from_slice(&bytes)?),
      Self::NoContent => Ok(Value::Null),
    }
  }

  pub fn is_no_content(&self) -> bool {
    matches!(self, Self::NoContent)
  }

  pub fn as_json(&self) -> Option<&Value> {
    match self {
      Self::Json(value) => Some(value),
      _ => None,
    }
  }
}
