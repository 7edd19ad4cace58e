use crate::{AsValue, Value};

/// Logical column type, mapped to a concrete type by each dialect.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Auto incrementing integer key.
    Primary,
    Integer,
    #[default]
    String,
    Boolean,
    Decimal,
    DateTime,
}

/// Abstract column description used by the schema writers.
///
/// `length` is the largest value (integers) or the longest text (strings) the column must
/// hold, dialects pick the smallest type tier that fits.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub column_type: ColumnType,
    pub length: Option<u64>,
    pub nullable: bool,
    /// `None` writes no `DEFAULT` clause, `Some(Value::Null)` writes `DEFAULT NULL`.
    pub default: Option<Value>,
    pub precision: u32,
    pub scale: u32,
}

impl Default for ColumnSpec {
    fn default() -> Self {
        Self {
            column_type: ColumnType::default(),
            length: None,
            nullable: true,
            default: None,
            precision: 0,
            scale: 0,
        }
    }
}

impl ColumnSpec {
    pub fn new(column_type: ColumnType) -> Self {
        Self {
            column_type,
            ..Default::default()
        }
    }
    pub fn primary() -> Self {
        Self::new(ColumnType::Primary)
    }
    pub fn integer() -> Self {
        Self::new(ColumnType::Integer)
    }
    pub fn string() -> Self {
        Self::new(ColumnType::String)
    }
    pub fn boolean() -> Self {
        Self::new(ColumnType::Boolean)
    }
    pub fn decimal(precision: u32, scale: u32) -> Self {
        Self {
            precision,
            scale,
            ..Self::new(ColumnType::Decimal)
        }
    }
    pub fn datetime() -> Self {
        Self::new(ColumnType::DateTime)
    }
    pub fn length(mut self, length: u64) -> Self {
        self.length = Some(length);
        self
    }
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }
    pub fn not_null(self) -> Self {
        self.nullable(false)
    }
    pub fn default_value(mut self, value: impl AsValue) -> Self {
        self.default = Some(value.as_value());
        self
    }
    pub fn is_primary(&self) -> bool {
        self.column_type == ColumnType::Primary
    }
    pub fn is_integer(&self) -> bool {
        matches!(self.column_type, ColumnType::Primary | ColumnType::Integer)
    }
}
