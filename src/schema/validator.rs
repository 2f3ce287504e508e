//! Schema validation collaborator
//!
//! The engine only knows the [`DocumentValidator`] seam; the JSON Schema
//! implementation below is what the CLI wires in when a schema directory is
//! given. Schemas are compiled once at load time and keyed by version name.

use crate::core::{MigrateError, Result};
use jsonschema::JSONSchema;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::info;

/// Accepts or rejects a migrated document for a target version.
pub trait DocumentValidator: Send + Sync {
    fn validate(&self, version: &str, document: &JsonValue) -> Result<()>;
}

/// JSON Schema backed validator, one compiled schema per version.
pub struct SchemaValidator {
    schemas: HashMap<String, JSONSchema>,
}

impl SchemaValidator {
    pub fn new() -> Self {
        Self {
            schemas: HashMap::new(),
        }
    }

    /// Compile every `*.json` schema in `dir`, keyed by file stem
    /// (`v2.json` registers version "v2").
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut validator = Self::new();
        let mut paths: Vec<_> = fs::read_dir(dir)?
            .collect::<std::io::Result<Vec<_>>>()?
            .into_iter()
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();
        for path in paths {
            let version = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            let raw = fs::read_to_string(&path)?;
            let schema: JsonValue = serde_json::from_str(&raw).map_err(|err| {
                MigrateError::MalformedSchema(path.display().to_string(), err.to_string())
            })?;
            validator.add_schema(&version, &schema)?;
            info!(version = %version, "loaded schema");
        }
        Ok(validator)
    }

    /// Compile and register one schema under a version name, replacing any
    /// previous schema for that version.
    pub fn add_schema(&mut self, version: &str, schema: &JsonValue) -> Result<()> {
        let compiled = JSONSchema::compile(schema)
            .map_err(|err| MigrateError::MalformedSchema(version.to_string(), err.to_string()))?;
        self.schemas.insert(version.to_string(), compiled);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}

impl Default for SchemaValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentValidator for SchemaValidator {
    fn validate(&self, version: &str, document: &JsonValue) -> Result<()> {
        let schema = self
            .schemas
            .get(version)
            .ok_or_else(|| MigrateError::MissingSchema(version.to_string()))?;
        if let Err(errors) = schema.validate(document) {
            let detail = errors
                .map(|err| err.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(MigrateError::SchemaValidation(version.to_string(), detail));
        }
        Ok(())
    }
}
