//! Migration registry, version graph, and chain application
//!
//! The engine is built once at load time and is read-only during `apply`,
//! so a shared reference can serve any number of apply calls.

use crate::core::{MigrateError, Migration, Result};
use crate::schema::DocumentValidator;
use crate::step::apply_step;
use serde_json::Value as JsonValue;
use std::collections::{HashMap, HashSet, VecDeque};

pub struct Engine {
    migrations: HashMap<(String, String), Migration>,
    graph: HashMap<String, Vec<String>>,
    validator: Option<Box<dyn DocumentValidator>>,
}

impl Engine {
    pub fn new() -> Self {
        Self {
            migrations: HashMap::new(),
            graph: HashMap::new(),
            validator: None,
        }
    }

    /// Attach a validation collaborator, consulted once per `apply` with the
    /// target version and the fully migrated document.
    pub fn with_validator<V: DocumentValidator + 'static>(mut self, validator: V) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }

    /// Register a migration, overwriting any previous one for the same
    /// `(from, to)` pair.
    pub fn register(&mut self, migration: Migration) -> Result<()> {
        if migration.from.is_empty() || migration.to.is_empty() {
            return Err(MigrateError::MissingFromTo);
        }
        let edges = self.graph.entry(migration.from.clone()).or_default();
        if !edges.contains(&migration.to) {
            edges.push(migration.to.clone());
        }
        self.migrations
            .insert((migration.from.clone(), migration.to.clone()), migration);
        Ok(())
    }

    /// Register only when the `(from, to)` pair is still free. Synthesized
    /// reverse migrations go through here so authored ones take precedence.
    pub fn register_if_absent(&mut self, migration: Migration) -> Result<()> {
        let key = (migration.from.clone(), migration.to.clone());
        if self.migrations.contains_key(&key) {
            return Ok(());
        }
        self.register(migration)
    }

    pub fn migration(&self, from: &str, to: &str) -> Option<&Migration> {
        self.migrations.get(&(from.to_string(), to.to_string()))
    }

    pub fn migration_count(&self) -> usize {
        self.migrations.len()
    }

    /// Shortest version chain from `from` to `to`, inclusive on both ends.
    ///
    /// BFS over the version graph, so the hop count is minimal; among
    /// equal-length chains the choice is unspecified.
    pub fn resolve_chain(&self, from: &str, to: &str) -> Result<Vec<String>> {
        if from == to {
            return Ok(vec![from.to_string()]);
        }
        let mut queue = VecDeque::from([from.to_string()]);
        let mut seen: HashSet<String> = HashSet::from([from.to_string()]);
        let mut parent: HashMap<String, String> = HashMap::new();

        while let Some(current) = queue.pop_front() {
            if current == to {
                let mut chain = vec![current.clone()];
                let mut cursor = current;
                while let Some(prev) = parent.get(&cursor) {
                    chain.push(prev.clone());
                    cursor = prev.clone();
                }
                chain.reverse();
                return Ok(chain);
            }
            if let Some(next_versions) = self.graph.get(&current) {
                for next in next_versions {
                    if seen.insert(next.clone()) {
                        parent.insert(next.clone(), current.clone());
                        queue.push_back(next.clone());
                    }
                }
            }
        }
        Err(MigrateError::NoChainFound(from.to_string(), to.to_string()))
    }

    /// Migrate a document from `from` to `to`.
    ///
    /// The input is never mutated; the result is an independent copy. Any
    /// step failure aborts the whole chain and nothing is returned. When a
    /// validator is attached it sees the final document exactly once.
    pub fn apply(&self, document: &JsonValue, from: &str, to: &str) -> Result<JsonValue> {
        if from == to {
            return Ok(document.clone());
        }
        let chain = self.resolve_chain(from, to)?;
        let mut doc = document.clone();
        for hop in chain.windows(2) {
            let (a, b) = (&hop[0], &hop[1]);
            let migration = self
                .migration(a, b)
                .ok_or_else(|| MigrateError::MissingMigration(a.clone(), b.clone()))?;
            apply_migration(&mut doc, migration).map_err(|err| MigrateError::Hop {
                from: a.clone(),
                to: b.clone(),
                source: Box::new(err),
            })?;
        }
        if let Some(validator) = &self.validator {
            validator.validate(to, &doc)?;
        }
        Ok(doc)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

fn apply_migration(doc: &mut JsonValue, migration: &Migration) -> Result<()> {
    for (index, step) in migration.steps.iter().enumerate() {
        apply_step(doc, step).map_err(|err| MigrateError::Step {
            index,
            op: step.op.name(),
            source: Box::new(err),
        })?;
    }
    Ok(())
}
