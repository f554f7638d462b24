//! The Confluence API client and its request dispatcher.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, trace};

use super::error::ApiError;
use super::executor::{BlockingExecutor, Executor, PooledExecutor};
use super::request::{Body, DispatchOptions, Request};
use super::response::{ApiResponse, Outcome};
use super::session::{Session, default_user_agent};

/// Confluence REST API client.
///
/// Every endpoint wrapper and the dispatcher are shared between the blocking
/// and the concurrent flavours; only the [`Executor`] differs:
///
/// * `ConfluenceClient<BlockingExecutor>` (the default) returns
///   `Result<T, ApiError>` from each call.
/// * `ConfluenceClient<PooledExecutor>` returns a
///   [`ResponseFuture`](super::ResponseFuture) immediately.
#[derive(Debug)]
pub struct ConfluenceClient<E: Executor = BlockingExecutor> {
  session: Arc<Session>,
  executor: E,
}

/// Concurrent client running calls on a worker pool.
pub type ConfluenceFuturesClient = ConfluenceClient<PooledExecutor>;

impl ConfluenceClient<BlockingExecutor> {
  /// Create a blocking client.
  ///
  /// # Arguments
  /// * `username` - Confluence username (the account email on Atlassian Cloud).
  /// * `password` - Password or API token.
  /// * `base_url` - Wiki base URL, e.g. `https://example.atlassian.net/wiki`.
  ///
  /// Authentication is only sent when both `username` and `password` are
  /// non-empty.
  ///
  /// # Errors
  /// Returns an error if `base_url` is invalid or the runtime cannot start.
  pub fn new(username: impl Into<String>, password: impl Into<String>, base_url: &str) -> Result<Self, ApiError> {
    ClientBuilder::new(base_url).credentials(username, password).build()
  }

  /// Start configuring a client for `base_url`.
  pub fn builder(base_url: impl Into<String>) -> ClientBuilder {
    ClientBuilder::new(base_url)
  }
}

impl ConfluenceClient<PooledExecutor> {
  /// Create a concurrent client with `max_workers` workers.
  pub fn pooled(
    username: impl Into<String>,
    password: impl Into<String>,
    base_url: &str,
    max_workers: usize,
  ) -> Result<Self, ApiError> {
    ClientBuilder::new(base_url)
      .credentials(username, password)
      .build_pooled(max_workers)
  }
}

impl<E: Executor> ConfluenceClient<E> {
  /// Assemble a client from an existing session and executor.
  pub fn from_parts(session: Session, executor: E) -> Self {
    Self {
      session: Arc::new(session),
      executor,
    }
  }

  pub fn session(&self) -> &Session {
    &self.session
  }

  pub fn executor(&self) -> &E {
    &self.executor
  }

  /// Start a fluent call for an arbitrary request.
  pub fn call(&self, request: Request) -> Call<'_, E> {
    Call {
      client: self,
      request,
      options: DispatchOptions::default(),
    }
  }

  /// Send `request` and decode the response into an [`Outcome`].
  ///
  /// With `raise_on_error`, a 4xx/5xx status fails the call with
  /// [`ApiError::Http`]. Otherwise the body is decoded whatever the status.
  /// An empty body yields [`Outcome::NoContent`].
  pub fn dispatch(&self, request: Request, options: DispatchOptions) -> E::Handle<Outcome> {
    self.run(request, options, move |response| Outcome::decode(response, options.raw))
  }

  /// Send `request` and hand the buffered response to `callback`.
  ///
  /// The callback's value is the call's result, with no further processing.
  /// It runs wherever the executor runs the call (a pool worker for the
  /// concurrent client) and is skipped when the status check fails.
  pub fn dispatch_with<T, F>(&self, request: Request, options: DispatchOptions, callback: F) -> E::Handle<T>
  where
    T: Send + 'static,
    F: FnOnce(ApiResponse) -> anyhow::Result<T> + Send + 'static,
  {
    self.run(request, options, |response| callback(response).map_err(ApiError::Callback))
  }

  /// Hand the executor one unit of work: exchange, status check, `finish`.
  fn run<T, F>(&self, request: Request, options: DispatchOptions, finish: F) -> E::Handle<T>
  where
    T: Send + 'static,
    F: FnOnce(ApiResponse) -> Result<T, ApiError> + Send + 'static,
  {
    debug!("Sending request: {} ({})", request.path(), request.method());
    let exchange = exchange(Arc::clone(&self.session), request, options.raise_on_error);
    self.executor.execute(async move { finish(exchange.await?) })
  }
}

/// Perform one HTTP exchange, lazily starting the session's transport.
async fn exchange(session: Arc<Session>, request: Request, raise_on_error: bool) -> Result<ApiResponse, ApiError> {
  let url = request.url(session.base_url())?;
  let http = session.http()?;
  let (method, _, _, body, headers) = request.into_parts();

  let mut builder = http.request(method, url).headers(headers);
  builder = match body {
    Body::Empty => builder,
    Body::Json(value) => builder.body(serde_json::to_vec(&value)?),
    Body::Multipart(files) => {
      let mut form = reqwest::multipart::Form::new();
      for file in files {
        form = form.part("file", file.into_part()?);
      }
      builder.multipart(form)
    }
  };

  let response = ApiResponse::read(builder.send().await?).await?;
  trace!("{} -> {}", response.url(), response.status());

  if raise_on_error {
    response.error_for_status()
  } else {
    Ok(response)
  }
}

/// Configuration for a [`ConfluenceClient`].
#[derive(Debug, Clone)]
pub struct ClientBuilder {
  base_url: String,
  username: String,
  password: String,
  user_agent: String,
  timeout: Option<Duration>,
}

impl ClientBuilder {
  pub fn new(base_url: impl Into<String>) -> Self {
    Self {
      base_url: base_url.into(),
      username: String::new(),
      password: String::new(),
      user_agent: default_user_agent(),
      timeout: None,
    }
  }

  /// Basic-auth credentials. Ignored unless both are non-empty.
  pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
    self.username = username.into();
    self.password = password.into();
    self
  }

  pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
    self.user_agent = user_agent.into();
    self
  }

  /// Per-request timeout applied by the transport. No timeout by default.
  pub fn timeout(mut self, timeout: Duration) -> Self {
    self.timeout = Some(timeout);
    self
  }

  fn session(self) -> Result<Session, ApiError> {
    Session::new(
      &self.base_url,
      self.username,
      self.password,
      self.user_agent,
      self.timeout,
    )
  }

  /// Build a blocking client.
  pub fn build(self) -> Result<ConfluenceClient<BlockingExecutor>, ApiError> {
    let session = self.session()?;
    Ok(ConfluenceClient::from_parts(session, BlockingExecutor::new()?))
  }

  /// Build a concurrent client backed by `max_workers` workers.
  pub fn build_pooled(self, max_workers: usize) -> Result<ConfluenceClient<PooledExecutor>, ApiError> {
    let session = self.session()?;
    Ok(ConfluenceClient::from_parts(session, PooledExecutor::new(max_workers)?))
  }

  /// Build a client around a caller-provided executor.
  pub fn build_with<E: Executor>(self, executor: E) -> Result<ConfluenceClient<E>, ApiError> {
    Ok(ConfluenceClient::from_parts(self.session()?, executor))
  }
}

/// A prepared call returned by the endpoint wrappers.
///
/// Adjust the dispatch options, then finish with [`Call::send`],
/// [`Call::send_with`], or [`Call::json`].
#[must_use = "a Call does nothing until it is sent"]
pub struct Call<'c, E: Executor> {
  client: &'c ConfluenceClient<E>,
  request: Request,
  options: DispatchOptions,
}

impl<'c, E: Executor> Call<'c, E> {
  /// Return the body as bytes instead of decoding it as JSON.
  pub fn raw(mut self) -> Self {
    self.options.raw = true;
    self
  }

  /// Do not fail on 4xx/5xx statuses.
  pub fn allow_error_status(mut self) -> Self {
    self.options.raise_on_error = false;
    self
  }

  pub fn with_options(mut self, options: DispatchOptions) -> Self {
    self.options = options;
    self
  }

  pub fn request(&self) -> &Request {
    &self.request
  }

  pub fn options(&self) -> DispatchOptions {
    self.options
  }

  pub fn send(self) -> E::Handle<Outcome> {
    self.client.dispatch(self.request, self.options)
  }

  /// Send and pass the response to `callback` instead of decoding it.
  pub fn send_with<T, F>(self, callback: F) -> E::Handle<T>
  where
    T: Send + 'static,
    F: FnOnce(ApiResponse) -> anyhow::Result<T> + Send + 'static,
  {
    self.client.dispatch_with(self.request, self.options, callback)
  }

  /// Send and deserialize the JSON body into `T`.
  pub fn json<T>(self) -> E::Handle<T>
  where
    T: DeserializeOwned + Send + 'static,
  {
    self.client.run(self.request, self.options, |response| response.json::<T>())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn builder_defaults() {
    let client = ConfluenceClient::builder("https://example.atlassian.net/wiki").build().unwrap();
    assert_eq!(client.session().base_url().as_str(), "https://example.atlassian.net/wiki/");
    assert!(!client.session().uses_authentication());
    assert!(client.session().user_agent().starts_with("confluence-api/"));
  }

  #[test]
  fn new_attaches_credentials() {
    let client = ConfluenceClient::new("user@example.com", "token", "https://example.atlassian.net/wiki").unwrap();
    assert!(client.session().uses_authentication());
    assert_eq!(client.session().username(), "user@example.com");
  }

  #[test]
  fn pooled_client_uses_requested_workers() {
    let client = ConfluenceClient::pooled("", "", "https://example.atlassian.net/wiki", 3).unwrap();
    assert_eq!(client.executor().max_workers(), 3);
  }

  #[test]
  fn invalid_base_url_fails_construction() {
    let err = ConfluenceClient::new("u", "p", "://missing-scheme").unwrap_err();
    assert!(matches!(err, ApiError::InvalidUrl(_)));
  }

  #[test]
  fn call_options_toggle() {
    let client = ConfluenceClient::builder("https://example.atlassian.net/wiki")
      .user_agent("tests/1.0")
      .build()
      .unwrap();
    let call = client.call(Request::get("rest/api/space")).raw().allow_error_status();
    assert_eq!(
      call.options(),
      DispatchOptions {
        raise_on_error: false,
        raw: true,
      }
    );
    assert_eq!(call.request().path(), "rest/api/space");
    assert_eq!(client.session().user_agent(), "tests/1.0");
  }
}
