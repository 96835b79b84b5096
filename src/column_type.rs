use std::fmt;

/// The logical type of a column.
/// Every column stores values of exactly one of these types for its whole life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// A 64-bit signed integer.
    Integer,
    /// A 64-bit floating-point number.
    Float,
    /// A calendar date without time zone.
    LocalDate,
    /// A clock time without date or time zone.
    LocalTime,
    /// A calendar date and clock time without time zone.
    LocalDateTime,
    /// A UTF-8 string.
    String,
    /// A boolean value (true or false).
    Boolean,
}

impl ColumnType {
    /// Returns `true` for the types that support arithmetic aggregates.
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }

    /// Returns `true` for the date/time family, which supports `is_after`/`is_before`.
    pub fn is_temporal(self) -> bool {
        matches!(self, Self::LocalDate | Self::LocalTime | Self::LocalDateTime)
    }

    /// The upper-case tag used in messages and summaries.
    pub fn name(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Float => "FLOAT",
            Self::LocalDate => "LOCAL_DATE",
            Self::LocalTime => "LOCAL_TIME",
            Self::LocalDateTime => "LOCAL_DATE_TIME",
            Self::String => "STRING",
            Self::Boolean => "BOOLEAN",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
