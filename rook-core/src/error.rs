use crate::ModelId;

/// Typed failures raised by Rook itself.
///
/// They travel inside [`crate::Error`] and can be recovered with `error.downcast_ref::<RookError>()`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RookError {
    #[error("Driver `{0}` has no supported SQL dialect (expected mysql, postgres or sqlite)")]
    UnsupportedDialect(String),
    #[error("Relation alias `{0}` must name a table followed by `through`, like `clubThrough`")]
    RelationNaming(String),
    #[error("{operation} is not supported by {dialect}")]
    UnsupportedOperation {
        dialect: &'static str,
        operation: &'static str,
    },
    #[error("Identifier `{0}` is empty or contains the reserved quote character")]
    InvalidIdentifier(String),
    #[error("Table `{0}` declares more than one primary key column")]
    MultiplePrimaryKeys(String),
    #[error("Model {0} is not tracked by this unit of work")]
    UnknownModel(ModelId),
}
