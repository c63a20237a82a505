//! Data models for icon packs.
//!
//! `PackDefinition` mirrors one entry of a `*.icons.yml` file; `IconEntry` is
//! the value every extractor produces and every catalog query returns.

mod icon;
mod pack;

pub use icon::{humanize_label, parse_full_id, IconEntry, FULL_ID_SEPARATOR};
pub use pack::{is_valid_pack_id, PackConfig, PackDefinition, PackLicense, SettingSchema};
