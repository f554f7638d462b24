//! confluence-api - command-line client for the Confluence REST API

fn main() {
  confluence_api::cli::run();
}
