//! Schema validation of raw pack declarations.

use crate::error::{IconPackError, Result};
use serde_json::Value;

/// Bundled schema for one pack declaration.
pub const ICON_PACK_SCHEMA: &str = include_str!("../../schema/icon_pack.schema.json");

/// Checks a raw declaration before it is deserialized.
pub trait PackValidator: Send + Sync {
    /// Validate the declaration of `pack_id` from `provider`.
    fn validate(&self, provider: &str, pack_id: &str, definition: &Value) -> Result<()>;
}

/// Validates against a JSON schema.
pub struct JsonSchemaValidator {
    validator: jsonschema::Validator,
}

impl JsonSchemaValidator {
    /// Compile the bundled icon pack schema.
    pub fn new() -> Result<Self> {
        let schema: Value = serde_json::from_str(ICON_PACK_SCHEMA)?;
        Self::from_schema(&schema)
    }

    /// Compile a custom schema.
    pub fn from_schema(schema: &Value) -> Result<Self> {
        let validator = jsonschema::validator_for(schema)
            .map_err(|e| IconPackError::Other(format!("Invalid icon pack schema: {}", e)))?;
        Ok(Self { validator })
    }
}

impl PackValidator for JsonSchemaValidator {
    fn validate(&self, provider: &str, pack_id: &str, definition: &Value) -> Result<()> {
        let errors: Vec<String> = self
            .validator
            .iter_errors(definition)
            .map(|e| {
                let path = e.instance_path.to_string();
                if path.is_empty() {
                    e.to_string()
                } else {
                    format!("{}: {}", path, e)
                }
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(IconPackError::Validation {
                provider: provider.to_string(),
                pack_id: pack_id.to_string(),
                errors,
            })
        }
    }
}

impl std::fmt::Debug for JsonSchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonSchemaValidator").finish_non_exhaustive()
    }
}
