// ============================================================================
// confmig Library
// ============================================================================
//
// Declarative, versioned migrations for configuration documents. Migrations
// are directed edges in a version graph; the engine resolves a shortest
// chain between two versions, applies each hop's steps to a copy of the
// document, and can synthesize best-effort reverse migrations from forward
// definitions.

pub mod core;
pub mod engine;
pub mod path;
pub mod schema;
pub mod step;

// Re-export main types for convenience
pub use crate::core::{MapRule, MigrateError, Migration, Result, Step, StepOp};
pub use crate::engine::{generate_reverse, Engine};
pub use crate::schema::{DocumentValidator, SchemaValidator};
pub use crate::step::apply_step;
