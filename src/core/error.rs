use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrateError {
    #[error("Malformed migration file '{0}': {1}")]
    MalformedFile(String, String),

    #[error("Migration is missing a from/to version")]
    MissingFromTo,

    #[error("No migration path from '{0}' to '{1}'")]
    NoChainFound(String, String),

    #[error("Missing migration {0}->{1}")]
    MissingMigration(String, String),

    #[error("Wildcards not allowed here: {0}")]
    WildcardNotAllowed(String),

    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Index out of range: {0}")]
    IndexOutOfRange(String),

    #[error("Array element deletion not supported: {0}")]
    UnsupportedDeletion(String),

    #[error("No reversible steps in migration {0}->{1}")]
    ReverseSynthesisFailed(String, String),

    #[error("Malformed schema '{0}': {1}")]
    MalformedSchema(String, String),

    #[error("No schema registered for version '{0}'")]
    MissingSchema(String),

    #[error("Schema validation failed for version '{0}': {1}")]
    SchemaValidation(String, String),

    #[error("Step {index} ({op}): {source}")]
    Step {
        index: usize,
        op: &'static str,
        source: Box<MigrateError>,
    },

    #[error("Apply {from}->{to}: {source}")]
    Hop {
        from: String,
        to: String,
        source: Box<MigrateError>,
    },

    #[error("I/O error: {0}")]
    IoError(String),
}

pub type Result<T> = std::result::Result<T, MigrateError>;

impl From<std::io::Error> for MigrateError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}
