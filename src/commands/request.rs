//! `confluence-api request`: direct access to the dispatcher.

use std::io::Write;

use tracing::info;

use super::{blocking_client, fail};
use crate::cli::{Cli, RequestArgs};
use crate::color::ColorScheme;
use crate::confluence::{ApiResponse, DispatchOptions, Outcome, QueryParams, Request};

pub(crate) fn handle_request_command(args: &RequestArgs, cli: &Cli, colors: &ColorScheme) {
  let client = blocking_client(cli, colors);
  let options = DispatchOptions {
    raise_on_error: !args.no_fail,
    raw: args.raw,
  };

  let response = client
    .call(build_request(args))
    .with_options(options)
    .send_with(Ok::<ApiResponse, anyhow::Error>);
  let response = match response {
    Ok(response) => response,
    Err(e) => fail(colors, "Request failed", e, 1),
  };

  let status = response.status();
  info!("{} {}", status, response.url());
  if !status.is_success() {
    eprintln!("{} {}", colors.warning("⚠"), colors.warning(status));
  }

  match Outcome::decode(response, args.raw) {
    Ok(Outcome::Json(value)) => match serde_json::to_string_pretty(&value) {
      Ok(text) => println!("{text}"),
      Err(e) => fail(colors, "Failed to render JSON", e, 1),
    },
    Ok(Outcome::Raw(bytes)) => {
      let mut stdout = std::io::stdout().lock();
      if let Err(e) = stdout.write_all(&bytes).and_then(|()| stdout.flush()) {
        fail(colors, "Failed to write response", e, 1);
      }
    }
    Ok(Outcome::NoContent) => eprintln!("{}", colors.dimmed("(no content)")),
    Err(e) => fail(colors, "Failed to decode response", e, 1),
  }
}

fn build_request(args: &RequestArgs) -> Request {
  let mut query = QueryParams::new();
  for (key, value) in &args.query {
    query.insert(key.clone(), value.clone());
  }

  let path = args.path.trim_start_matches('/');
  let request = Request::new(args.method.as_method(), path).with_query(query);
  match &args.data {
    Some(data) => request.with_json(data.clone()),
    None => request,
  }
}

#[cfg(test)]
mod tests {
  use clap::Parser;
  use reqwest::Method;

  use super::*;
  use crate::cli::Command;
  use crate::confluence::Body;

  fn request_args(argv: &[&str]) -> RequestArgs {
    let mut full = vec!["confluence-api", "request"];
    full.extend_from_slice(argv);
    match Cli::try_parse_from(full).unwrap().command {
      Command::Request(args) => args,
      other => panic!("unexpected command: {other:?}"),
    }
  }

  #[test]
  fn builds_relative_request() {
    let args = request_args(&["get", "/rest/api/space", "--query", "limit=5", "--query", "limit=10"]);
    let request = build_request(&args);
    assert_eq!(request.method(), Method::GET);
    assert_eq!(request.path(), "rest/api/space");
    assert_eq!(request.query().get("limit"), Some("10"));
    assert_eq!(request.body(), &Body::Empty);
  }

  #[test]
  fn data_becomes_json_body() {
    let args = request_args(&["put", "rest/api/space/DOCS", "--data", r#"{"name": "Docs"}"#]);
    let request = build_request(&args);
    assert_eq!(request.method(), Method::PUT);
    assert!(matches!(request.body(), Body::Json(value) if value["name"] == "Docs"));
  }
}
