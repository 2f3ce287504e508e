pub mod error;
pub mod types;

pub use error::{MigrateError, Result};
pub use types::{MapRule, Migration, Step, StepOp};
