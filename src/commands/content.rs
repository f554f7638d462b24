//! `confluence-api content` handlers.

use anyhow::Context;
use serde_json::{Value, json};
use tracing::{debug, info};

use super::{blocking_client, fail, pooled_client};
use crate::cli::{Cli, ContentCommand};
use crate::color::ColorScheme;
use crate::confluence::{
  ApiError, Content, ContentByIdQuery, ContentQuery, Cursor, ResponseFuture, SearchQuery, all_of, storage_page,
};

/// Characters of body text shown under each listed item.
const PREVIEW_CHARS: usize = 80;

pub(crate) fn handle_content_command(subcommand: &ContentCommand, cli: &Cli, colors: &ColorScheme) {
  match subcommand {
    ContentCommand::List {
      space,
      content_type,
      limit,
      page_size,
    } => {
      let client = blocking_client(cli, colors);
      let query = ContentQuery {
        content_type: content_type.clone(),
        space_key: space.clone(),
        expand: Some("space,body.view".to_string()),
        ..Default::default()
      };
      let cursor = Cursor {
        start: None,
        limit: *page_size,
      };
      let items = all_of(|cursor| client.get_content(&query, cursor).send(), cursor, Some(*limit));
      print_listing(items, colors);
    }
    ContentCommand::Search { cql, limit, page_size } => {
      let client = blocking_client(cli, colors);
      let query = SearchQuery {
        cql: Some(cql.clone()),
        expand: Some("space".to_string()),
        ..Default::default()
      };
      let cursor = Cursor {
        start: None,
        limit: *page_size,
      };
      let items = all_of(|cursor| client.search_content(&query, cursor).send(), cursor, Some(*limit));
      print_listing(items, colors);
    }
    ContentCommand::Get { ids, expand, json } => get_many(ids, expand, *json, cli, colors),
    ContentCommand::Create {
      space,
      title,
      body,
      body_file,
      parent,
    } => {
      let storage = match (body, body_file) {
        (Some(body), _) => body.clone(),
        (None, Some(path)) => {
          match std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display())) {
            Ok(storage) => storage,
            Err(e) => fail(colors, "Failed to read page body", format!("{e:#}"), 1),
          }
        }
        (None, None) => fail(colors, "Missing page body", "Pass --body or --body-file", 4),
      };

      let client = blocking_client(cli, colors);
      let page = new_page(space, title, &storage, parent.as_deref());
      let created = client.create_new_content(page).and_then(|call| call.json::<Content>());
      match created {
        Ok(content) => {
          println!(
            "{} Created {} {}",
            colors.success("✓"),
            colors.emphasis(&content.title),
            colors.dimmed(format!("({})", content.id))
          );
          if let Some(web_ui) = content.links.and_then(|links| links.web_ui) {
            let base = client.session().base_url().as_str().trim_end_matches('/');
            println!("  {}", colors.link(format!("{base}{web_ui}")));
          }
        }
        Err(e) => fail(colors, "Failed to create page", e, 1),
      }
    }
  }
}

/// Page definition for `create_new_content`, optionally under `parent`.
fn new_page(space: &str, title: &str, storage: &str, parent: Option<&str>) -> Value {
  let mut page = storage_page(space, title, storage);
  if let Some(parent) = parent {
    page["ancestors"] = json!([{ "id": parent }]);
  }
  page
}

/// Print `SPACE - Title (id)` and a body preview for every item.
///
/// Returns how many items were printed; items that are not content are skipped.
fn print_listing(items: impl Iterator<Item = Result<Value, ApiError>>, colors: &ColorScheme) -> usize {
  let mut count = 0usize;
  for item in items {
    let item = match item {
      Ok(item) => item,
      Err(e) => fail(colors, "Listing failed", e, 1),
    };

    let content: Content = match serde_json::from_value(item) {
      Ok(content) => content,
      Err(e) => {
        debug!("Skipping item that is not content: {e}");
        continue;
      }
    };
    count += 1;
    let space = content.space.as_ref().map_or("?", |space| space.key.as_str());
    println!(
      "{} - {} {}",
      colors.code(space),
      colors.emphasis(&content.title),
      colors.dimmed(format!("({})", content.id))
    );
    if let Some(view) = content.body.as_ref().and_then(|body| body.view.as_ref()) {
      let preview = plain_preview(&view.value, PREVIEW_CHARS);
      if !preview.is_empty() {
        println!("    {}", colors.dimmed(preview));
      }
    }
  }
  info!("Listed {count} items");
  count
}

/// Fetch every id on the worker pool, then report in the order given.
fn get_many(ids: &[String], expand: &str, json: bool, cli: &Cli, colors: &ColorScheme) {
  let client = pooled_client(cli, colors);
  let query = ContentByIdQuery {
    expand: Some(expand.to_string()),
    ..Default::default()
  };

  let pending: Vec<(&String, ResponseFuture<Value>)> = ids
    .iter()
    .map(|id| (id, client.get_content_by_id(id, &query).json::<Value>()))
    .collect();
  debug!("Submitted {} requests", pending.len());

  let mut failures = 0usize;
  for (id, future) in pending {
    match future.result() {
      Ok(document) if json => match serde_json::to_string_pretty(&document) {
        Ok(text) => println!("{text}"),
        Err(e) => fail(colors, "Failed to render JSON", e, 1),
      },
      Ok(document) => match serde_json::from_value::<Content>(document) {
        Ok(content) => print_content(&content, colors),
        Err(e) => {
          failures += 1;
          eprintln!("{} {id}: unexpected response: {e}", colors.error("✗"));
        }
      },
      Err(e) => {
        failures += 1;
        eprintln!("{} {id}: {e}", colors.error("✗"));
      }
    }
  }

  if failures > 0 {
    fail(
      colors,
      "Some pages could not be fetched",
      format!("{failures} of {} failed", ids.len()),
      1,
    );
  }
}

fn print_content(content: &Content, colors: &ColorScheme) {
  println!(
    "{} {}",
    colors.emphasis(&content.title),
    colors.dimmed(format!("({} {})", content.content_type, content.id))
  );
  if let Some(space) = &content.space {
    println!("  {}: {}", colors.dimmed("Space"), space.key);
  }
  if let Some(storage) = content.body.as_ref().and_then(|body| body.storage.as_ref()) {
    println!("  {}: {}", colors.dimmed("Body"), plain_preview(&storage.value, PREVIEW_CHARS));
  }
}

/// Markup with tags removed, whitespace collapsed, and cut to `max` chars.
fn plain_preview(markup: &str, max: usize) -> String {
  let mut text = String::with_capacity(markup.len().min(max * 2));
  let mut in_tag = false;
  for ch in markup.chars() {
    match ch {
      '<' => in_tag = true,
      '>' if in_tag => {
        in_tag = false;
        text.push(' ');
      }
      _ if !in_tag => text.push(ch),
      _ => {}
    }
  }

  let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
  if collapsed.chars().count() > max {
    let cut: String = collapsed.chars().take(max).collect();
    format!("{}…", cut.trim_end())
  } else {
    collapsed
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn preview_strips_tags_and_truncates() {
    assert_eq!(plain_preview("<p>Hello <strong>world</strong></p>", 80), "Hello world");
    assert_eq!(plain_preview("<p>abcdef ghij</p>", 6), "abcdef…");
    assert_eq!(plain_preview("<ac:image/>", 10), "");
  }

  #[test]
  fn listing_counts_only_printed_content() {
    let colors = ColorScheme::new(crate::cli::ColorOption::Never);
    let items = vec![
      Ok(json!({"id": "1", "type": "page", "title": "First"})),
      Ok(json!({"unexpected": true})),
      Ok(json!({"id": "2", "type": "blogpost", "title": "Second"})),
    ];
    assert_eq!(print_listing(items.into_iter(), &colors), 2);
  }

  #[test]
  fn new_page_adds_parent_ancestor() {
    let page = new_page("DOCS", "Child", "<p>x</p>", Some("42"));
    assert_eq!(page["ancestors"], json!([{"id": "42"}]));
    assert_eq!(page["space"]["key"], "DOCS");
    assert_eq!(page["body"]["storage"]["representation"], "storage");

    assert!(new_page("DOCS", "Top", "", None).get("ancestors").is_none());
  }
}
