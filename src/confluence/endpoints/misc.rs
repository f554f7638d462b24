//! Long tasks, body conversion, and the current user.

use serde_json::json;

use crate::confluence::client::{Call, ConfluenceClient};
use crate::confluence::error::ApiError;
use crate::confluence::executor::Executor;
use crate::confluence::models::Representation;
use crate::confluence::pagination::Cursor;
use crate::confluence::request::{QueryParams, Request};

impl<E: Executor> ConfluenceClient<E> {
  /// Long-running tasks such as space deletion or export.
  pub fn get_long_tasks(&self, expand: Option<&str>, cursor: Cursor) -> Call<'_, E> {
    let params = QueryParams::new().text("expand", expand).cursor(cursor);
    self.call(Request::get("rest/api/longtask").with_query(params))
  }

  pub fn get_long_task_info(&self, task_id: &str, expand: Option<&str>) -> Call<'_, E> {
    let params = QueryParams::new().text("expand", expand);
    self.call(Request::get(format!("rest/api/longtask/{task_id}")).with_query(params))
  }

  /// Convert a body from one representation to another, e.g. storage markup
  /// into rendered `view` HTML.
  ///
  /// # Errors
  /// Fails locally when `from` and `to` are the same representation.
  pub fn convert_contentbody_to_new_type(
    &self,
    value: &str,
    from: Representation,
    to: Representation,
  ) -> Result<Call<'_, E>, ApiError> {
    if from == to {
      return Err(ApiError::precondition(format!(
        "cannot convert a {from} body to the same representation"
      )));
    }
    let body = json!({"value": value, "representation": from.as_str()});
    Ok(self.call(Request::post(format!("rest/api/contentbody/convert/{to}")).with_json(body)))
  }

  /// The user the client is authenticated as.
  pub fn get_current_user(&self) -> Call<'_, E> {
    self.call(Request::get("rest/api/user/current"))
  }
}
