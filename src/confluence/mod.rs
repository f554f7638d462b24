//! Confluence REST API client: session, dispatcher, execution strategies,
//! pagination, and one wrapper per endpoint.
//!
//! ```no_run
//! use confluence_api::confluence::{ConfluenceClient, ContentQuery, Cursor, Outcome};
//!
//! # fn main() -> Result<(), confluence_api::confluence::ApiError> {
//! let client = ConfluenceClient::new("me@example.com", "api-token", "https://example.atlassian.net/wiki")?;
//! let query = ContentQuery {
//!   space_key: Some("DOCS".into()),
//!   ..Default::default()
//! };
//! if let Outcome::Json(page) = client.get_content(&query, Cursor::with_limit(5)).send()? {
//!   println!("{}", page["size"]);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod endpoints;
pub mod error;
pub mod executor;
pub mod models;
pub mod pagination;
pub mod request;
pub mod response;
pub mod session;

pub use client::{Call, ClientBuilder, ConfluenceClient, ConfluenceFuturesClient};
pub use endpoints::{
  AttachmentsQuery, ChildrenQuery, CommentsQuery, ContentByIdQuery, ContentQuery, SearchQuery, SpaceContentQuery,
  storage_page,
};
pub use error::ApiError;
pub use executor::{BlockingExecutor, DEFAULT_MAX_WORKERS, Executor, PooledExecutor, ResponseFuture};
pub use models::{
  BodyValue, CommentDepth, Content, ContentBody, ContentLinks, ContentSpace, Label, Representation, Space,
  SpaceDepth, UserInfo,
};
pub use pagination::{AllOf, Cursor, all_of, all_of_stream};
pub use request::{Body, DispatchOptions, FileUpload, QueryParams, Request};
pub use response::{ApiResponse, Outcome};
pub use session::Session;
