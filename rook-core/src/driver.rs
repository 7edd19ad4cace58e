use crate::{CANONICAL_QUOTE, Connection, Dialect, Result};

pub trait Driver: Send + Sync {
    type Connection: Connection;

    /// Driver name, also used to pick the [`Dialect`].
    fn name(&self) -> &'static str;

    /// Identifier quote the canonical quote is replaced with before a statement is sent.
    fn identifier_quote(&self) -> char {
        CANONICAL_QUOTE
    }

    /// Whether `INSERT ... RETURNING` can hand back the generated key.
    fn supports_returning(&self) -> bool {
        false
    }

    fn dialect(&self) -> Result<Dialect> {
        Dialect::from_driver_name(self.name())
    }
}
