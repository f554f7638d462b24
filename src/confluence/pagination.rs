//! Walking paginated listing endpoints.
//!
//! Listing endpoints answer with a page object:
//!
//! ```json
//! { "results": [...], "start": 0, "limit": 25, "size": 25,
//!   "_links": { "next": "/rest/api/content?start=25" } }
//! ```
//!
//! [`all_of`] and [`all_of_stream`] re-invoke a single-page call with an
//! advancing [`Cursor`] until the server stops sending a `next` link or the
//! caller's item cap is reached.

use std::collections::VecDeque;
use std::future::Future;

use futures::Stream;
use futures::stream;
use serde_json::Value;
use tracing::trace;

use super::error::ApiError;
use super::response::Outcome;

/// The `start`/`limit` pair selecting one page of a listing endpoint.
///
/// Unset fields are left out of the query, so the server applies its own
/// defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
  pub start: Option<u64>,
  pub limit: Option<u64>,
}

impl Cursor {
  pub fn new(start: u64, limit: u64) -> Self {
    Self {
      start: Some(start),
      limit: Some(limit),
    }
  }

  /// First page with an explicit page size.
  pub fn with_limit(limit: u64) -> Self {
    Self {
      start: None,
      limit: Some(limit),
    }
  }
}

/// One decoded page: its items and the cursor for the page after it.
#[derive(Debug, Clone, PartialEq)]
struct Page {
  results: Vec<Value>,
  next: Option<Cursor>,
}

impl Page {
  /// Split a page object into items and the follow-up cursor.
  ///
  /// The next start is the server-reported `start + size`, never the
  /// requested limit, because the server may return short pages.
  fn parse(page: Value, requested: Cursor) -> Self {
    let mut page = match page {
      Value::Object(map) => map,
      _ => {
        return Self {
          results: Vec::new(),
          next: None,
        };
      }
    };

    let results = match page.remove("results") {
      Some(Value::Array(items)) => items,
      _ => Vec::new(),
    };

    let has_next = page
      .get("_links")
      .and_then(|links| links.get("next"))
      .is_some_and(|next| !next.is_null());

    let start = page
      .get("start")
      .and_then(Value::as_u64)
      .or(requested.start)
      .unwrap_or(0);
    let size = page
      .get("size")
      .and_then(Value::as_u64)
      .filter(|size| *size > 0)
      .unwrap_or(results.len() as u64);
    let next_start = start.saturating_add(size);

    // A page that cannot move the cursor forward would be requested again.
    let advances = !results.is_empty() && next_start > start;
    let next = (has_next && advances).then(|| Cursor {
      start: Some(next_start),
      limit: page.get("limit").and_then(Value::as_u64).or(requested.limit),
    });

    Self { results, next }
  }
}

/// Call-local bookkeeping shared by the iterator and the stream.
#[derive(Debug)]
struct Walk {
  buffer: VecDeque<Value>,
  next: Option<Cursor>,
  yielded: usize,
  limit: Option<usize>,
}

impl Walk {
  fn new(cursor: Cursor, limit: Option<usize>) -> Self {
    Self {
      buffer: VecDeque::new(),
      next: Some(cursor),
      yielded: 0,
      limit,
    }
  }

  /// Next buffered item, or `Err(())` once the item cap is exceeded.
  fn pop(&mut self) -> Result<Option<Value>, ()> {
    let Some(item) = self.buffer.pop_front() else {
      return Ok(None);
    };
    self.yielded += 1;
    if self.limit.is_some_and(|limit| self.yielded > limit) {
      self.finish();
      return Err(());
    }
    Ok(Some(item))
  }

  fn absorb(&mut self, outcome: Outcome, requested: Cursor) -> Result<(), ApiError> {
    let page = Page::parse(outcome.into_json()?, requested);
    trace!(
      "Fetched page at {:?} with {} items (more: {})",
      requested.start,
      page.results.len(),
      page.next.is_some()
    );
    self.buffer.extend(page.results);
    self.next = page.next;
    Ok(())
  }

  fn finish(&mut self) {
    self.buffer.clear();
    self.next = None;
  }
}

/// Lazily yield every item of a paginated listing.
///
/// `call` fetches one page for a cursor, typically an endpoint wrapper on a
/// blocking client:
///
/// ```no_run
/// use confluence_api::confluence::{Cursor, ConfluenceClient, ContentQuery, all_of};
///
/// let client = ConfluenceClient::new("user", "token", "https://example.atlassian.net/wiki")?;
/// let query = ContentQuery { space_key: Some("DOCS".into()), ..Default::default() };
/// for page in all_of(|cursor| client.get_content(&query, cursor).send(), Cursor::default(), Some(100)) {
///   println!("{}", page?["title"]);
/// }
/// # Ok::<(), confluence_api::confluence::ApiError>(())
/// ```
///
/// Stops after `limit` items when a limit is given. `Some(0)` still fetches
/// the first page once and then yields nothing. An error from `call` is
/// yielded once and ends the sequence.
pub fn all_of<F>(call: F, cursor: Cursor, limit: Option<usize>) -> AllOf<F>
where
  F: FnMut(Cursor) -> Result<Outcome, ApiError>,
{
  AllOf {
    call,
    walk: Walk::new(cursor, limit),
  }
}

/// Iterator returned by [`all_of`].
pub struct AllOf<F> {
  call: F,
  walk: Walk,
}

impl<F> Iterator for AllOf<F>
where
  F: FnMut(Cursor) -> Result<Outcome, ApiError>,
{
  type Item = Result<Value, ApiError>;

  fn next(&mut self) -> Option<Self::Item> {
    loop {
      match self.walk.pop() {
        Ok(Some(item)) => return Some(Ok(item)),
        Ok(None) => {}
        Err(()) => return None,
      }

      let cursor = self.walk.next.take()?;
      let absorbed = (self.call)(cursor).and_then(|outcome| self.walk.absorb(outcome, cursor));
      if let Err(err) = absorbed {
        self.walk.finish();
        return Some(Err(err));
      }
    }
  }
}

impl<F> std::iter::FusedIterator for AllOf<F> where F: FnMut(Cursor) -> Result<Outcome, ApiError> {}

/// Asynchronous counterpart of [`all_of`].
///
/// `call` returns a future per page, e.g. the
/// [`ResponseFuture`](super::ResponseFuture) of a pooled client. Pages are
/// still fetched one after another, since each cursor depends on the
/// previous page.
pub fn all_of_stream<F, Fut>(call: F, cursor: Cursor, limit: Option<usize>) -> impl Stream<Item = Result<Value, ApiError>>
where
  F: FnMut(Cursor) -> Fut,
  Fut: Future<Output = Result<Outcome, ApiError>>,
{
  stream::unfold((call, Walk::new(cursor, limit)), |(mut call, mut walk)| async move {
    loop {
      match walk.pop() {
        Ok(Some(item)) => return Some((Ok(item), (call, walk))),
        Ok(None) => {}
        Err(()) => return None,
      }

      let cursor = walk.next.take()?;
      let absorbed = match call(cursor).await {
        Ok(outcome) => walk.absorb(outcome, cursor),
        Err(err) => Err(err),
      };
      if let Err(err) = absorbed {
        walk.finish();
        return Some((Err(err), (call, walk)));
      }
    }
  })
}

#[cfg(test)]
mod tests {
  use std::cell::RefCell;

  use futures::StreamExt;
  use serde_json::json;

  use super::*;

  fn page(ids: &[u32], start: u64, limit: u64, has_next: bool) -> Outcome {
    let results: Vec<Value> = ids.iter().map(|id| json!({"id": id.to_string()})).collect();
    let mut page = json!({
      "results": results,
      "start": start,
      "limit": limit,
      "size": ids.len(),
      "_links": {"base": "https://example.atlassian.net/wiki"},
    });
    if has_next {
      page["_links"]["next"] = json!(format!("/rest/api/content?start={}", start + ids.len() as u64));
    }
    Outcome::Json(page)
  }

  /// Three pages of 2/2/1 items, served according to the requested start.
  fn three_pages(cursor: Cursor) -> Result<Outcome, ApiError> {
    match cursor.start.unwrap_or(0) {
      0 => Ok(page(&[1, 2], 0, 2, true)),
      2 => Ok(page(&[3, 4], 2, 2, true)),
      4 => Ok(page(&[5], 4, 2, false)),
      other => panic!("unexpected start {other}"),
    }
  }

  fn ids(items: Vec<Result<Value, ApiError>>) -> Vec<String> {
    items
      .into_iter()
      .map(|item| item.unwrap()["id"].as_str().unwrap().to_string())
      .collect()
  }

  #[test]
  fn walks_every_page_in_order() {
    let calls = RefCell::new(Vec::new());
    let items: Vec<_> = all_of(
      |cursor| {
        calls.borrow_mut().push(cursor);
        three_pages(cursor)
      },
      Cursor::default(),
      None,
    )
    .collect();

    assert_eq!(ids(items), vec!["1", "2", "3", "4", "5"]);
    assert_eq!(
      calls.into_inner(),
      vec![Cursor::default(), Cursor::new(2, 2), Cursor::new(4, 2)]
    );
  }

  #[test]
  fn limit_stops_before_third_call() {
    let calls = RefCell::new(0);
    let items: Vec<_> = all_of(
      |cursor| {
        *calls.borrow_mut() += 1;
        three_pages(cursor)
      },
      Cursor::default(),
      Some(3),
    )
    .collect();

    assert_eq!(ids(items), vec!["1", "2", "3"]);
    assert_eq!(calls.into_inner(), 2);
  }

  #[test]
  fn zero_limit_fetches_once_and_yields_nothing() {
    let calls = RefCell::new(0);
    let mut items = all_of(
      |cursor| {
        *calls.borrow_mut() += 1;
        three_pages(cursor)
      },
      Cursor::default(),
      Some(0),
    );

    assert!(items.next().is_none());
    assert!(items.next().is_none());
    drop(items);
    assert_eq!(calls.into_inner(), 1);
  }

  #[test]
  fn nothing_is_fetched_until_iterated() {
    let calls = RefCell::new(0);
    let items = all_of(
      |cursor| {
        *calls.borrow_mut() += 1;
        three_pages(cursor)
      },
      Cursor::default(),
      None,
    );
    drop(items);
    assert_eq!(calls.into_inner(), 0);
  }

  #[test]
  fn empty_first_page_terminates() {
    let items: Vec<_> = all_of(|_| Ok(page(&[], 0, 25, false)), Cursor::default(), None).collect();
    assert!(items.is_empty());
  }

  #[test]
  fn next_cursor_uses_reported_size_not_requested_limit() {
    let calls = RefCell::new(Vec::new());
    let items: Vec<_> = all_of(
      |cursor| {
        calls.borrow_mut().push(cursor);
        match cursor.start {
          Some(10) => Ok(page(&[1, 2, 3], 10, 25, true)),
          Some(13) => Ok(page(&[4], 13, 25, false)),
          other => panic!("unexpected start {other:?}"),
        }
      },
      Cursor::new(10, 25),
      None,
    )
    .collect();

    assert_eq!(items.len(), 4);
    assert_eq!(calls.into_inner(), vec![Cursor::new(10, 25), Cursor::new(13, 25)]);
  }

  #[test]
  fn no_content_ends_the_walk() {
    let items: Vec<_> = all_of(|_| Ok(Outcome::NoContent), Cursor::default(), None).collect();
    assert!(items.is_empty());
  }

  #[test]
  fn errors_are_yielded_once() {
    let mut items = all_of(
      |cursor| match cursor.start {
        None => three_pages(cursor),
        Some(_) => Err(ApiError::precondition("boom")),
      },
      Cursor::default(),
      None,
    );

    assert!(items.next().unwrap().is_ok());
    assert!(items.next().unwrap().is_ok());
    assert!(items.next().unwrap().unwrap_err().is_precondition());
    assert!(items.next().is_none());
  }

  #[test]
  fn missing_start_and_size_fall_back_to_cursor_and_count() {
    let parsed = Page::parse(
      json!({"results": [{"id": "a"}, {"id": "b"}], "_links": {"next": "/more"}}),
      Cursor::new(40, 2),
    );
    assert_eq!(parsed.results.len(), 2);
    assert_eq!(parsed.next, Some(Cursor::new(42, 2)));
  }

  #[test]
  fn empty_page_with_next_link_ends_the_walk() {
    let calls = RefCell::new(0);
    let items: Vec<_> = all_of(
      |_| {
        *calls.borrow_mut() += 1;
        Ok(page(&[], 0, 25, true))
      },
      Cursor::default(),
      None,
    )
    .collect();

    assert!(items.is_empty());
    assert_eq!(calls.into_inner(), 1);
  }

  #[test]
  fn zero_size_falls_back_to_item_count() {
    let parsed = Page::parse(
      json!({"results": [{"id": "a"}], "start": 5, "size": 0, "_links": {"next": "/more"}}),
      Cursor::default(),
    );
    assert_eq!(parsed.next, Some(Cursor { start: Some(6), limit: None }));
  }

  #[test]
  fn huge_reported_offsets_do_not_overflow() {
    let parsed = Page::parse(
      json!({"results": [{"id": "a"}], "start": u64::MAX - 1, "size": 5, "_links": {"next": "/more"}}),
      Cursor::default(),
    );
    assert_eq!(parsed.next.and_then(|cursor| cursor.start), Some(u64::MAX));

    let stuck = Page::parse(
      json!({"results": [{"id": "a"}], "start": u64::MAX, "size": 5, "_links": {"next": "/more"}}),
      Cursor::default(),
    );
    assert_eq!(stuck.next, None);
  }

  #[test]
  fn stream_matches_iterator() {
    let items: Vec<_> = futures::executor::block_on(
      all_of_stream(|cursor| async move { three_pages(cursor) }, Cursor::default(), Some(4)).collect(),
    );
    assert_eq!(ids(items), vec!["1", "2", "3", "4"]);
  }

  #[test]
  fn stream_yields_error_then_ends() {
    let items: Vec<_> = futures::executor::block_on(
      all_of_stream(
        |_| async { Err::<Outcome, _>(ApiError::precondition("offline")) },
        Cursor::default(),
        None,
      )
      .collect(),
    );
    assert_eq!(items.len(), 1);
    assert!(items[0].as_ref().unwrap_err().is_precondition());
  }
}
