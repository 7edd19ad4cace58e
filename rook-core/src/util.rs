use crate::{CANONICAL_QUOTE, Error, Result, RookError};

pub fn separated_by<T, F>(
    out: &mut String,
    values: impl IntoIterator<Item = T>,
    mut f: F,
    separator: &str,
) where
    F: FnMut(&mut String, T),
{
    let mut len = out.len();
    for v in values {
        if out.len() > len {
            out.push_str(separator);
        }
        len = out.len();
        f(out, v);
    }
}

/// Rejects identifiers that cannot be safely wrapped in the canonical quote.
pub fn validate_identifier(value: &str) -> Result<&str> {
    if value.is_empty() || value.contains(CANONICAL_QUOTE) {
        let error = Error::new(RookError::InvalidIdentifier(value.to_owned()));
        log::error!("{:#}", error);
        return Err(error);
    }
    Ok(value)
}

#[macro_export]
macro_rules! truncate_long {
    ($query:expr) => {{
        let query: &str = &$query;
        match query.char_indices().nth(497) {
            Some((end, ..)) => format!("{}...", query[..end].trim_end()),
            None => query.trim_end().to_owned(),
        }
    }};
}
