use crate::column_type::ColumnType;

/// Errors returned by column, filter and aggregate operations.
///
/// Every variant describes a caller contract violation detected at the point of
/// misuse. Nothing in this crate retries or substitutes a default on error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ColumnError {
    /// A row index outside `[0, size)`.
    #[error("row {row} is out of bounds for column of size {size}")]
    IndexOutOfBounds { row: usize, size: usize },

    /// An operation was applied to a column (or value) of an incompatible type.
    #[error(
        "type mismatch{column}: expected {expected}, got {actual}",
        column = column_display(.column)
    )]
    TypeMismatch {
        column: Option<String>,
        expected: String,
        actual: String,
    },

    /// A column reference could not be resolved.
    #[error("column not found: {name}")]
    ColumnNotFound { name: String },

    /// The operation is declared but not available for this input.
    #[error("not implemented: {operation}")]
    NotImplemented { operation: String },

    /// A reducer without an identity value was applied to zero rows.
    #[error("{operation} is undefined for an empty column")]
    EmptyColumn { operation: String },

    /// Integer arithmetic left the representable range.
    #[error("integer overflow in {operation}")]
    Overflow { operation: String },

    /// Row ids are 32-bit; a column cannot hold more rows than that.
    #[error("column cannot hold more than {max} rows")]
    CapacityExceeded { max: usize },

    /// Columns of one table must stay row-aligned.
    #[error("row count mismatch: expected {expected} rows, got {actual}")]
    RowCountMismatch { expected: usize, actual: usize },

    /// Two columns with the same name in one table.
    #[error("duplicate column: {name}")]
    DuplicateColumn { name: String },

    /// A configuration value was rejected.
    #[error("invalid configuration option '{option}': {message}")]
    InvalidConfig { option: String, message: String },
}

/// Result type used throughout this crate.
pub type Result<T> = std::result::Result<T, ColumnError>;

impl ColumnError {
    /// Create a type mismatch error with optional column context.
    pub fn type_mismatch(
        column: impl Into<Option<String>>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            column: column.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Type mismatch between a column and the type an operation requires.
    pub(crate) fn column_type_mismatch(
        column: &str,
        expected: impl Into<String>,
        actual: ColumnType,
    ) -> Self {
        Self::type_mismatch(Some(column.to_string()), expected, actual.name())
    }

    pub fn column_not_found(name: impl Into<String>) -> Self {
        Self::ColumnNotFound { name: name.into() }
    }

    pub fn not_implemented(operation: impl Into<String>) -> Self {
        Self::NotImplemented {
            operation: operation.into(),
        }
    }

    pub fn empty_column(operation: impl Into<String>) -> Self {
        Self::EmptyColumn {
            operation: operation.into(),
        }
    }

    pub fn overflow(operation: impl Into<String>) -> Self {
        Self::Overflow {
            operation: operation.into(),
        }
    }

    pub fn invalid_config(option: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            option: option.into(),
            message: message.into(),
        }
    }
}

fn column_display(column: &Option<String>) -> String {
    match column {
        Some(name) => format!(" in column '{name}'"),
        None => String::new(),
    }
}
