//! Predicates over named columns that evaluate to a [RowSet].
//!
//! A filter holds [ColumnReference]s, not columns. References are resolved
//! against a [ColumnSource] each time the filter is applied, so a filter can be
//! built before any table exists and reused across tables.

use std::fmt;
use std::ops::Not;
use std::sync::Arc;

use crate::column::{Column, Comparison};
use crate::error::Result;
use crate::row_set::RowSet;
use crate::value::Value;

/// Anything that can look columns up by name.
pub trait ColumnSource {
    /// Resolves a column by name.
    ///
    /// # Errors
    /// Returns [`ColumnNotFound`](crate::ColumnError::ColumnNotFound) if no column has that name.
    fn column(&self, name: &str) -> Result<&Column>;

    /// Number of rows shared by every column of the source.
    fn row_count(&self) -> usize;
}

/// A by-name pointer to a column, resolved at filter-application time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnReference {
    column_name: String,
}

/// Shorthand for [ColumnReference::new].
pub fn col(name: impl Into<String>) -> ColumnReference {
    ColumnReference::new(name)
}

impl ColumnReference {
    pub fn new(column_name: impl Into<String>) -> Self {
        Self {
            column_name: column_name.into(),
        }
    }

    pub fn column_name(&self) -> &str {
        &self.column_name
    }

    /// Looks the referenced column up in `source`.
    pub fn resolve<'a, S: ColumnSource + ?Sized>(&self, source: &'a S) -> Result<&'a Column> {
        source.column(&self.column_name)
    }

    fn compare(self, op: Comparison, operand: impl Into<Value>) -> Filter {
        Filter::Column(ColumnFilter::new(
            self,
            Predicate::Compare {
                op,
                operand: operand.into(),
            },
        ))
    }

    fn with(self, predicate: Predicate) -> Filter {
        Filter::Column(ColumnFilter::new(self, predicate))
    }

    pub fn is_less_than(self, operand: impl Into<Value>) -> Filter {
        self.compare(Comparison::LessThan, operand)
    }

    pub fn is_less_than_or_equal_to(self, operand: impl Into<Value>) -> Filter {
        self.compare(Comparison::LessThanOrEqual, operand)
    }

    pub fn is_equal_to(self, operand: impl Into<Value>) -> Filter {
        self.compare(Comparison::Equal, operand)
    }

    pub fn is_not_equal_to(self, operand: impl Into<Value>) -> Filter {
        self.compare(Comparison::NotEqual, operand)
    }

    pub fn is_greater_than_or_equal_to(self, operand: impl Into<Value>) -> Filter {
        self.compare(Comparison::GreaterThanOrEqual, operand)
    }

    pub fn is_greater_than(self, operand: impl Into<Value>) -> Filter {
        self.compare(Comparison::GreaterThan, operand)
    }

    pub fn is_after(self, operand: impl Into<Value>) -> Filter {
        self.compare(Comparison::After, operand)
    }

    pub fn is_before(self, operand: impl Into<Value>) -> Filter {
        self.compare(Comparison::Before, operand)
    }

    pub fn is_between_inclusive(self, low: impl Into<Value>, high: impl Into<Value>) -> Filter {
        self.with(Predicate::Between {
            low: low.into(),
            high: high.into(),
        })
    }

    pub fn is_in(self, values: Vec<Value>) -> Filter {
        self.with(Predicate::In(values))
    }

    pub fn starts_with(self, prefix: &str) -> Filter {
        self.with(Predicate::StartsWith(Arc::from(prefix)))
    }

    pub fn ends_with(self, suffix: &str) -> Filter {
        self.with(Predicate::EndsWith(Arc::from(suffix)))
    }

    pub fn contains(self, needle: &str) -> Filter {
        self.with(Predicate::Contains(Arc::from(needle)))
    }

    pub fn is_true(self) -> Filter {
        self.with(Predicate::IsTrue)
    }

    pub fn is_false(self) -> Filter {
        self.with(Predicate::IsFalse)
    }
}

impl fmt::Display for ColumnReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.column_name)
    }
}

/// The test a [ColumnFilter] applies to every row of its column.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `row <op> operand`; the operand's type must match the column's.
    Compare { op: Comparison, operand: Value },
    /// `low <= row <= high`.
    Between { low: Value, high: Value },
    /// Row equals one of the values.
    In(Vec<Value>),
    StartsWith(Arc<str>),
    EndsWith(Arc<str>),
    Contains(Arc<str>),
    IsTrue,
    IsFalse,
}

impl Predicate {
    fn evaluate(&self, column: &Column) -> Result<RowSet> {
        match self {
            Self::Compare { op, operand } => column.compare(*op, operand),
            Self::Between { low, high } => {
                column.is_between_inclusive(low.clone(), high.clone())
            }
            Self::In(values) => column.is_in(values),
            Self::StartsWith(prefix) => column.starts_with(prefix),
            Self::EndsWith(suffix) => column.ends_with(suffix),
            Self::Contains(needle) => column.contains_str(needle),
            Self::IsTrue => column.is_true(),
            Self::IsFalse => column.is_false(),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compare { op, operand } => write!(f, "{op} {operand}"),
            Self::Between { low, high } => write!(f, "between {low} and {high}"),
            Self::In(values) => {
                f.write_str("in (")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str(")")
            }
            Self::StartsWith(prefix) => write!(f, "starts with '{prefix}'"),
            Self::EndsWith(suffix) => write!(f, "ends with '{suffix}'"),
            Self::Contains(needle) => write!(f, "contains '{needle}'"),
            Self::IsTrue => f.write_str("is true"),
            Self::IsFalse => f.write_str("is false"),
        }
    }
}

/// A single-column predicate: a reference plus the test to run on it.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFilter {
    reference: ColumnReference,
    predicate: Predicate,
}

impl ColumnFilter {
    pub fn new(reference: ColumnReference, predicate: Predicate) -> Self {
        Self {
            reference,
            predicate,
        }
    }

    pub fn column_reference(&self) -> &ColumnReference {
        &self.reference
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    /// Resolves the reference and evaluates the predicate on that column.
    ///
    /// # Errors
    /// - [`ColumnNotFound`](crate::ColumnError::ColumnNotFound) if the reference does not resolve.
    /// - [`TypeMismatch`](crate::ColumnError::TypeMismatch) if the column's type does not fit
    ///   the predicate.
    pub fn apply<S: ColumnSource + ?Sized>(&self, source: &S) -> Result<RowSet> {
        let column = self.reference.resolve(source)?;
        let rows = self.predicate.evaluate(column)?;
        tracing::debug!(
            column = self.reference.column_name(),
            predicate = %self.predicate,
            matched = rows.len(),
            "applied column filter"
        );
        Ok(rows)
    }
}

impl fmt::Display for ColumnFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.reference, self.predicate)
    }
}

/// A composable row-selection expression.
///
/// # Example
/// ```
/// # use columnar::{Column, ColumnType, Table, filter::col};
/// let mut table = Table::new("t");
/// let n = Column::from_values("n", ColumnType::Integer, [5, 2, 9, 2, 7]).unwrap();
/// table.add_column(n).unwrap();
///
/// let filter = col("n").is_greater_than(4).and(col("n").is_less_than(9));
/// assert_eq!(filter.apply(&table).unwrap().to_vec(), vec![0, 4]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Every row of the source.
    All,
    Column(ColumnFilter),
    /// Rows selected by every sub-filter. An empty list selects every row.
    And(Vec<Filter>),
    /// Rows selected by any sub-filter. An empty list selects no row.
    Or(Vec<Filter>),
    /// Rows of the source not selected by the sub-filter.
    Not(Box<Filter>),
}

impl Filter {
    /// Evaluates the filter against `source`.
    ///
    /// Sub-filters are evaluated left to right and combined with row-set algebra;
    /// the first error aborts the whole evaluation.
    pub fn apply<S: ColumnSource + ?Sized>(&self, source: &S) -> Result<RowSet> {
        match self {
            Self::All => Ok(RowSet::full(source.row_count())),
            Self::Column(filter) => filter.apply(source),
            Self::And(filters) => {
                let mut iter = filters.iter();
                let Some(first) = iter.next() else {
                    return Ok(RowSet::full(source.row_count()));
                };
                let mut rows = first.apply(source)?;
                for filter in iter {
                    if rows.is_empty() {
                        // Still resolve the rest so a bad reference is reported.
                        filter.apply(source)?;
                        continue;
                    }
                    rows = rows.and(&filter.apply(source)?);
                }
                Ok(rows)
            }
            Self::Or(filters) => {
                let mut rows = RowSet::empty();
                for filter in filters {
                    rows = rows.or(&filter.apply(source)?);
                }
                Ok(rows)
            }
            Self::Not(filter) => Ok(filter.apply(source)?.complement(source.row_count())),
        }
    }

    /// Conjunction with `other`, flattening nested ANDs.
    pub fn and(self, other: Filter) -> Filter {
        match self {
            Self::And(mut filters) => {
                filters.push(other);
                Self::And(filters)
            }
            first => Self::And(vec![first, other]),
        }
    }

    /// Disjunction with `other`, flattening nested ORs.
    pub fn or(self, other: Filter) -> Filter {
        match self {
            Self::Or(mut filters) => {
                filters.push(other);
                Self::Or(filters)
            }
            first => Self::Or(vec![first, other]),
        }
    }
}

impl Not for Filter {
    type Output = Filter;

    /// Negation of this filter.
    fn not(self) -> Filter {
        Filter::Not(Box::new(self))
    }
}

impl From<ColumnFilter> for Filter {
    fn from(filter: ColumnFilter) -> Self {
        Self::Column(filter)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join(f: &mut fmt::Formatter<'_>, filters: &[Filter], sep: &str) -> fmt::Result {
            f.write_str("(")?;
            for (i, filter) in filters.iter().enumerate() {
                if i > 0 {
                    write!(f, " {sep} ")?;
                }
                write!(f, "{filter}")?;
            }
            f.write_str(")")
        }

        match self {
            Self::All => f.write_str("all rows"),
            Self::Column(filter) => write!(f, "{filter}"),
            Self::And(filters) => join(f, filters, "AND"),
            Self::Or(filters) => join(f, filters, "OR"),
            Self::Not(filter) => write!(f, "NOT {filter}"),
        }
    }
}
