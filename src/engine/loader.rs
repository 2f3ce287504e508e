//! Migration directory loading
//!
//! One migration per `*.json` file, loaded in filename order. Every loaded
//! migration gets a reverse-synthesis attempt; a failed synthesis only means
//! the migration stays one-directional.

use crate::core::{MigrateError, Migration, Result};
use crate::engine::reverse::generate_reverse;
use crate::engine::Engine;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

impl Engine {
    /// Load and register every migration definition in `dir`.
    pub fn load_dir(&mut self, dir: &Path) -> Result<()> {
        let mut paths: Vec<_> = fs::read_dir(dir)?
            .collect::<std::io::Result<Vec<_>>>()?
            .into_iter()
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        for path in paths {
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            let raw = fs::read_to_string(&path)?;
            let migration: Migration = serde_json::from_str(&raw)
                .map_err(|err| MigrateError::MalformedFile(file_name.clone(), err.to_string()))?;
            info!(
                file = %file_name,
                from = %migration.from,
                to = %migration.to,
                "loaded migration"
            );

            let reverse = generate_reverse(&migration);
            self.register(migration)?;
            match reverse {
                Ok(rev) => self.register_if_absent(rev)?,
                Err(err) => debug!(file = %file_name, error = %err, "no reverse synthesized"),
            }
        }
        Ok(())
    }
}
