use std::fmt::{self, Display};

/// The composed statement and the column names it produces, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnifiedQuery {
    pub sql: String,
    pub output_columns: Vec<String>,
}

impl Display for UnifiedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.sql)
    }
}
