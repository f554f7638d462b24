//! `confluence-api space` handlers.

use serde_json::{Value, json};

use super::{blocking_client, fail};
use crate::cli::{Cli, SpaceCommand};
use crate::color::ColorScheme;
use crate::confluence::{Cursor, Space, all_of};

pub(crate) fn handle_space_command(subcommand: &SpaceCommand, cli: &Cli, colors: &ColorScheme) {
  let client = blocking_client(cli, colors);

  match subcommand {
    SpaceCommand::List { limit, page_size } => {
      let cursor = Cursor {
        start: None,
        limit: *page_size,
      };
      let spaces = all_of(|cursor| client.get_spaces(None, None, cursor).send(), cursor, Some(*limit));
      for item in spaces {
        let space: Space = match item.map(serde_json::from_value) {
          Ok(Ok(space)) => space,
          Ok(Err(e)) => fail(colors, "Unexpected space listing", e, 1),
          Err(e) => fail(colors, "Listing spaces failed", e, 1),
        };
        let kind = space.space_type.as_deref().unwrap_or("global");
        println!(
          "{} - {} {}",
          colors.code(&space.key),
          colors.emphasis(&space.name),
          colors.dimmed(format!("({kind})"))
        );
      }
    }
    SpaceCommand::Create {
      key,
      name,
      description,
      private,
    } => {
      let definition = space_definition(key, name, description);
      let call = if *private {
        client.create_new_private_space(definition)
      } else {
        client.create_new_space(definition)
      };
      match call.and_then(|call| call.json::<Space>()) {
        Ok(space) => println!(
          "{} Created space {} {}",
          colors.success("✓"),
          colors.code(&space.key),
          colors.dimmed(format!("({})", space.name))
        ),
        Err(e) => fail(colors, "Failed to create space", e, 1),
      }
    }
  }
}

fn space_definition(key: &str, name: &str, description: &str) -> Value {
  json!({
    "key": key,
    "name": name,
    "description": {"plain": {"value": description, "representation": "plain"}},
  })
}
