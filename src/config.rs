use crate::error::{ColumnError, Result};

/// Initial number of slots allocated for a new column.
pub const DEFAULT_INITIAL_CAPACITY: usize = 128;

/// Spare slots kept after [`crate::Column::compact`].
pub const DEFAULT_COMPACTION_SLACK: usize = 100;

/// Construction-time sizing parameters for a column.
///
/// A column keeps the config it was built with; `clear()` and `empty_copy()`
/// go back to `initial_capacity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnConfig {
    /// Slots allocated on creation and after `clear()`.
    pub initial_capacity: usize,
    /// Spare slots left after `compact()`.
    pub compaction_slack: usize,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            compaction_slack: DEFAULT_COMPACTION_SLACK,
        }
    }
}

impl ColumnConfig {
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    pub fn with_compaction_slack(mut self, compaction_slack: usize) -> Self {
        self.compaction_slack = compaction_slack;
        self
    }

    /// Checks that the config can drive the doubling growth policy.
    ///
    /// # Errors
    /// Returns [`ColumnError::InvalidConfig`] if `initial_capacity` is zero, since
    /// doubling a zero capacity never makes room.
    pub fn validate(&self) -> Result<()> {
        if self.initial_capacity == 0 {
            return Err(ColumnError::invalid_config(
                "initial_capacity",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}
