//! Response bodies shaped like the Confluence REST API's.

use serde_json::{Value, json};

pub fn page(id: &str, title: &str, space_key: &str) -> Value {
  json!({
    "id": id,
    "type": "page",
    "status": "current",
    "title": title,
    "space": {"key": space_key, "name": "Documentation", "type": "global"},
    "body": {
      "view": {"value": format!("<p>{title} body</p>"), "representation": "view"}
    },
    "_links": {
      "webui": format!("/spaces/{space_key}/pages/{id}"),
      "self": format!("https://example.atlassian.net/wiki/rest/api/content/{id}")
    }
  })
}

/// A listing page holding `results`, with a `next` link when `has_next`.
pub fn listing(results: Vec<Value>, start: u64, limit: u64, has_next: bool) -> Value {
  let size = results.len() as u64;
  let mut links = json!({
    "base": "https://example.atlassian.net/wiki",
    "context": "/wiki"
  });
  if has_next {
    links["next"] = json!(format!("/rest/api/content?limit={limit}&start={}", start + size));
  }
  json!({
    "results": results,
    "start": start,
    "limit": limit,
    "size": size,
    "_links": links
  })
}

pub fn pages(ids: std::ops::Range<u32>) -> Vec<Value> {
  ids
    .map(|id| page(&id.to_string(), &format!("Page {id}"), "DOCS"))
    .collect()
}

pub fn current_user() -> Value {
  json!({
    "type": "known",
    "accountId": "5b10ac8d82e05b22cc7d4ef5",
    "email": "tester@example.com",
    "publicName": "tester",
    "displayName": "Test User"
  })
}

pub fn space(key: &str, name: &str) -> Value {
  json!({"id": 98304, "key": key, "name": name, "type": "global"})
}
