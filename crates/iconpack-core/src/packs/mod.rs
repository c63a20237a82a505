//! Pack definitions: where they come from and how they are checked.

mod loader;
mod validator;

pub use loader::{PackDefinitionSource, RawPackDefinition, YamlPackDiscovery};
pub use validator::{JsonSchemaValidator, PackValidator, ICON_PACK_SCHEMA};
