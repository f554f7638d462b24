//! Error type shared by every dispatched call.

use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

/// Failure of a Confluence API call.
///
/// `Precondition` is a caller fault detected before any network traffic. The
/// remaining variants come from the transport, the remote API, or the
/// executor running the call.
#[derive(Debug, Error)]
pub enum ApiError {
  /// The request was rejected locally (missing body keys, unsupported
  /// argument combination).
  #[error("invalid request: {0}")]
  Precondition(String),

  /// The base URL, or a path joined onto it, is not a valid URL.
  #[error("invalid URL: {0}")]
  InvalidUrl(#[from] url::ParseError),

  /// The connection could not be established, timed out, or broke mid-body.
  #[error("transport error: {0}")]
  Transport(#[from] reqwest::Error),

  /// The API answered with a 4xx or 5xx status.
  #[error("Confluence API returned {status} for {url}: {body}")]
  Http {
    /// Status code reported by the server.
    status: StatusCode,
    /// Fully resolved request URL.
    url: Url,
    /// Response body, lossily decoded as UTF-8.
    body: String,
  },

  /// JSON decoding was requested but the body is not valid JSON.
  #[error("failed to decode response: {0}")]
  Decode(#[from] serde_json::Error),

  /// A caller-supplied response callback failed.
  #[error(transparent)]
  Callback(anyhow::Error),

  /// The call was cancelled before a worker started it.
  #[error("request was cancelled before it started")]
  Cancelled,

  /// The worker running the call went away without reporting a result.
  #[error("worker dropped the request before completing it")]
  WorkerLost,

  /// The tokio runtime backing an executor could not be created.
  #[error("failed to start async runtime: {0}")]
  Runtime(#[source] std::io::Error),
}

impl ApiError {
  /// Build a precondition failure from any displayable message.
  pub fn precondition(message: impl Into<String>) -> Self {
    Self::Precondition(message.into())
  }

  /// HTTP status carried by this error, if it came from the server.
  pub fn status(&self) -> Option<StatusCode> {
    match self {
      Self::Http { status, .. } => Some(*status),
      Self::Transport(err) => err.status(),
      _ => None,
    }
  }

  /// `true` when the caller supplied an invalid request.
  pub fn is_precondition(&self) -> bool {
    matches!(self, Self::Precondition(_))
  }
}
