//! Client for the Confluence REST API.
//!
//! [`confluence::ConfluenceClient`] wraps the content, space, long-task, and
//! user endpoints. It runs calls either blocking on the caller's thread or
//! concurrently on a bounded worker pool, and walks paginated listings with
//! [`confluence::all_of`]. The `confluence-api` binary is a small CLI over the
//! same client.

pub mod cli;
pub mod color;
pub mod commands;
pub mod confluence;
pub mod credentials;
