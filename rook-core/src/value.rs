use rust_decimal::Decimal;
use std::fmt::{self, Display};
use time::PrimitiveDateTime;
use uuid::Uuid;

/// Dynamically typed SQL value.
///
/// Every query parameter, row cell and cached field goes through this type. Native Rust
/// values are converted with [`crate::AsValue`].
#[derive(Default, Debug, Clone, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    Text(String),
    Blob(Box<[u8]>),
    Timestamp(PrimitiveDateTime),
    Uuid(Uuid),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Boolean(v) => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            Value::Int(v) => Some(*v != 0),
            _ => None,
        }
    }

    /// Name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Boolean(..) => "BOOLEAN",
            Value::Int(..) => "INTEGER",
            Value::Float(..) => "FLOAT",
            Value::Decimal(..) => "DECIMAL",
            Value::Text(..) => "TEXT",
            Value::Blob(..) => "BLOB",
            Value::Timestamp(..) => "TIMESTAMP",
            Value::Uuid(..) => "UUID",
        }
    }
}

/// Plain textual rendering, no quoting. Cache keys are built from it.
impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Boolean(v) => write!(f, "{}", *v as u8),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Decimal(v) => write!(f, "{}", v),
            Value::Text(v) => f.write_str(v),
            Value::Blob(v) => f.write_str(&hex::encode_upper(v)),
            Value::Timestamp(v) => {
                write!(
                    f,
                    "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                    v.year(),
                    v.month() as u8,
                    v.day(),
                    v.hour(),
                    v.minute(),
                    v.second()
                )?;
                if v.nanosecond() != 0 {
                    write!(f, ".{:06}", v.microsecond())?;
                }
                Ok(())
            }
            Value::Uuid(v) => write!(f, "{}", v),
        }
    }
}
