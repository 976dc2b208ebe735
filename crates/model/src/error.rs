use std::fmt;

/// Input rejected before it reaches the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyName,
    NoRowsSelected,
    EmptyQuickLink(&'static str),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyName => write!(f, "table name must not be empty"),
            ValidationError::NoRowsSelected => write!(f, "at least one row must be selected"),
            ValidationError::EmptyQuickLink(field) => {
                write!(f, "quick link '{}' must not be empty", field)
            }
        }
    }
}

impl std::error::Error for ValidationError {}
