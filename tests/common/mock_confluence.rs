//! A wiremock server standing in for a Confluence instance.
//!
//! The blocking client drives its own runtime and must not be called from
//! inside another one, so the server lives on a separate multi-thread runtime
//! and tests stay synchronous.

use confluence_api::confluence::{ConfluenceClient, ConfluenceFuturesClient};
use tokio::runtime::Runtime;
use wiremock::{Mock, MockServer, Request};

pub const USERNAME: &str = "tester@example.com";
pub const TOKEN: &str = "api-token-123";

pub struct MockConfluence {
  // Declared before `runtime` so the server shuts down first.
  server: MockServer,
  runtime: Runtime,
}

impl MockConfluence {
  pub fn start() -> Self {
    let runtime = tokio::runtime::Builder::new_multi_thread()
      .worker_threads(2)
      .enable_all()
      .build()
      .expect("test runtime");
    let server = runtime.block_on(MockServer::start());
    Self { server, runtime }
  }

  /// Base URL including the `/wiki` context path.
  pub fn base_url(&self) -> String {
    format!("{}/wiki", self.server.uri())
  }

  pub fn mount(&self, mock: Mock) {
    self.runtime.block_on(mock.mount(&self.server));
  }

  pub fn received(&self) -> Vec<Request> {
    self
      .runtime
      .block_on(self.server.received_requests())
      .unwrap_or_default()
  }

  pub fn client(&self) -> ConfluenceClient {
    ConfluenceClient::new(USERNAME, TOKEN, &self.base_url()).expect("client")
  }

  pub fn anonymous_client(&self) -> ConfluenceClient {
    ConfluenceClient::builder(self.base_url()).build().expect("client")
  }

  pub fn pooled_client(&self, max_workers: usize) -> ConfluenceFuturesClient {
    ConfluenceClient::pooled(USERNAME, TOKEN, &self.base_url(), max_workers).expect("client")
  }
}
