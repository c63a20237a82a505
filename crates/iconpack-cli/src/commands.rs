//! Subcommand execution.

use crate::Command;
use anyhow::{bail, Result};
use iconpack_core::{parse_full_id, IconPackManager};
use serde_json::{json, Value};

/// Run a subcommand and return what it prints.
pub(crate) fn run(manager: &IconPackManager, command: &Command) -> Result<Value> {
    match command {
        Command::Packs { describe } => {
            let options = manager.list_pack_options(*describe)?;
            Ok(serde_json::to_value(options)?)
        }
        Command::Icons { packs } => {
            let allowed: Vec<&str> = packs.iter().map(String::as_str).collect();
            let filter = (!allowed.is_empty()).then_some(allowed.as_slice());
            let icons = manager.get_icons(filter)?;
            Ok(serde_json::to_value(icons)?)
        }
        Command::Icon { full_id } => {
            if parse_full_id(full_id).is_none() {
                bail!("'{}' is not a full icon id (expected pack_id:icon_id)", full_id);
            }
            match manager.get_icon(full_id)? {
                Some(icon) => Ok(serde_json::to_value(icon)?),
                None => bail!("No icon '{}'", full_id),
            }
        }
        Command::Defaults { pack_id } => {
            if manager.get_definition(pack_id)?.is_none() {
                bail!("No enabled icon pack '{}'", pack_id);
            }
            Ok(json!(manager.get_extractor_form_defaults(pack_id)?))
        }
    }
}
