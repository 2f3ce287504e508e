mod validator;

pub use validator::{DocumentValidator, SchemaValidator};
