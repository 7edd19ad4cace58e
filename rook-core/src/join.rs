use crate::Column;

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub join_type: JoinType,
    pub table: String,
    pub left: Column,
    pub operator: String,
    pub right: Column,
}

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    #[default]
    Left,
    Right,
    Outer,
    Cross,
}

impl JoinType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinType::Inner => "INNER",
            JoinType::Left => "LEFT",
            JoinType::Right => "RIGHT",
            JoinType::Outer => "FULL OUTER",
            JoinType::Cross => "CROSS",
        }
    }
}
