//! Type-gated reducers that fold a column into a single [Value].
//!
//! An aggregate declares the column types it accepts through
//! [AggregateFunction::is_compatible_with]; [AggregateFunction::summarize]
//! refuses any other type with [ColumnError::TypeMismatch] before reading a row.

use std::fmt;

use chrono::{NaiveTime, Timelike};

use crate::column::{Column, ColumnData};
use crate::column_type::ColumnType;
use crate::error::{ColumnError, Result};
use crate::value::Value;

/// A named reducer over the columns of the types it declares compatible.
pub trait AggregateFunction {
    /// Name used in summaries and logs.
    fn name(&self) -> &str;

    fn is_compatible_with(&self, column_type: ColumnType) -> bool;

    /// Folds the column into a scalar. Called by `summarize` once the column type
    /// has been checked.
    fn reduce(&self, column: &Column) -> Result<Value>;

    /// Checks compatibility, then reduces the column.
    ///
    /// # Errors
    /// - [ColumnError::TypeMismatch] if the column type is not compatible.
    /// - Whatever [AggregateFunction::reduce] reports (e.g. [ColumnError::EmptyColumn]).
    fn summarize(&self, column: &Column) -> Result<Value> {
        if !self.is_compatible_with(column.column_type()) {
            return Err(ColumnError::column_type_mismatch(
                column.name(),
                format!("a column type accepted by {}", self.name()),
                column.column_type(),
            ));
        }
        tracing::debug!(
            aggregate = self.name(),
            column = column.name(),
            rows = column.len(),
            "summarizing column"
        );
        self.reduce(column)
    }
}

/// Sum of a numeric column. The empty sum is zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sum;

impl AggregateFunction for Sum {
    fn name(&self) -> &str {
        "Sum"
    }

    fn is_compatible_with(&self, column_type: ColumnType) -> bool {
        column_type.is_numeric()
    }

    fn reduce(&self, column: &Column) -> Result<Value> {
        match column.data() {
            ColumnData::Integer(values) => values
                .iter()
                .try_fold(0i64, |acc, v| acc.checked_add(*v))
                .map(Value::Integer)
                .ok_or_else(|| ColumnError::overflow("Sum")),
            _ => Ok(Value::Float(column.as_floats()?.iter().sum())),
        }
    }
}

/// Arithmetic mean of a numeric column, as a FLOAT.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mean;

impl AggregateFunction for Mean {
    fn name(&self) -> &str {
        "Mean"
    }

    fn is_compatible_with(&self, column_type: ColumnType) -> bool {
        column_type.is_numeric()
    }

    fn reduce(&self, column: &Column) -> Result<Value> {
        if column.is_empty() {
            return Err(ColumnError::empty_column("Mean"));
        }
        let total: f64 = match column.data() {
            ColumnData::Integer(values) => values.iter().map(|v| *v as f64).sum(),
            _ => column.as_floats()?.iter().sum(),
        };
        Ok(Value::Float(total / column.len() as f64))
    }
}

/// Smallest value of a numeric or string column.
///
/// NaN is skipped unless every value is NaN.
#[derive(Debug, Clone, Copy, Default)]
pub struct Min;

impl AggregateFunction for Min {
    fn name(&self) -> &str {
        "Min"
    }

    fn is_compatible_with(&self, column_type: ColumnType) -> bool {
        column_type.is_numeric() || column_type == ColumnType::String
    }

    fn reduce(&self, column: &Column) -> Result<Value> {
        extreme(column, Extreme::Smallest, "Min")
    }
}

/// Largest value of a numeric or string column.
///
/// NaN is skipped unless every value is NaN.
#[derive(Debug, Clone, Copy, Default)]
pub struct Max;

impl AggregateFunction for Max {
    fn name(&self) -> &str {
        "Max"
    }

    fn is_compatible_with(&self, column_type: ColumnType) -> bool {
        column_type.is_numeric() || column_type == ColumnType::String
    }

    fn reduce(&self, column: &Column) -> Result<Value> {
        extreme(column, Extreme::Largest, "Max")
    }
}

/// Chronologically first value of a temporal column.
#[derive(Debug, Clone, Copy, Default)]
pub struct Earliest;

impl AggregateFunction for Earliest {
    fn name(&self) -> &str {
        "Earliest"
    }

    fn is_compatible_with(&self, column_type: ColumnType) -> bool {
        column_type.is_temporal()
    }

    fn reduce(&self, column: &Column) -> Result<Value> {
        extreme(column, Extreme::Smallest, "Earliest")
    }
}

/// Chronologically last value of a temporal column.
#[derive(Debug, Clone, Copy, Default)]
pub struct Latest;

impl AggregateFunction for Latest {
    fn name(&self) -> &str {
        "Latest"
    }

    fn is_compatible_with(&self, column_type: ColumnType) -> bool {
        column_type.is_temporal()
    }

    fn reduce(&self, column: &Column) -> Result<Value> {
        extreme(column, Extreme::Largest, "Latest")
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Extreme {
    Smallest,
    Largest,
}

fn pick<T: Ord + Copy>(values: &[T], extreme: Extreme) -> Option<T> {
    match extreme {
        Extreme::Smallest => values.iter().min().copied(),
        Extreme::Largest => values.iter().max().copied(),
    }
}

fn extreme(column: &Column, which: Extreme, operation: &str) -> Result<Value> {
    if column.is_empty() {
        return Err(ColumnError::empty_column(operation));
    }
    let value = match column.data() {
        ColumnData::Integer(v) => pick(v, which).map(Value::Integer),
        ColumnData::Float(v) => v
            .iter()
            .copied()
            .reduce(|a, b| match which {
                Extreme::Smallest => a.min(b),
                Extreme::Largest => a.max(b),
            })
            .map(Value::Float),
        ColumnData::LocalDate(v) => pick(v, which).map(Value::LocalDate),
        ColumnData::LocalTime(v) => pick(v, which).map(Value::LocalTime),
        ColumnData::LocalDateTime(v) => pick(v, which).map(Value::LocalDateTime),
        ColumnData::String(v) => match which {
            Extreme::Smallest => v.iter().min().cloned().map(Value::String),
            Extreme::Largest => v.iter().max().cloned().map(Value::String),
        },
        ColumnData::Boolean(_) => {
            return Err(ColumnError::column_type_mismatch(
                column.name(),
                "an ordered non-boolean type",
                ColumnType::Boolean,
            ));
        }
    };
    value.ok_or_else(|| ColumnError::empty_column(operation))
}

/// Number of rows, for any column type.
#[derive(Debug, Clone, Copy, Default)]
pub struct Count;

impl AggregateFunction for Count {
    fn name(&self) -> &str {
        "Count"
    }

    fn is_compatible_with(&self, _column_type: ColumnType) -> bool {
        true
    }

    fn reduce(&self, column: &Column) -> Result<Value> {
        Ok(Value::Integer(column.len() as i64))
    }
}

/// Number of distinct values, for any column type.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountUnique;

impl AggregateFunction for CountUnique {
    fn name(&self) -> &str {
        "Unique"
    }

    fn is_compatible_with(&self, _column_type: ColumnType) -> bool {
        true
    }

    fn reduce(&self, column: &Column) -> Result<Value> {
        Ok(Value::Integer(column.count_unique() as i64))
    }
}

/// Number of `true` rows in a BOOLEAN column.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountTrue;

impl AggregateFunction for CountTrue {
    fn name(&self) -> &str {
        "True"
    }

    fn is_compatible_with(&self, column_type: ColumnType) -> bool {
        column_type == ColumnType::Boolean
    }

    fn reduce(&self, column: &Column) -> Result<Value> {
        Ok(Value::Integer(column.as_booleans()?.count_ones() as i64))
    }
}

/// Share of `true` rows in a BOOLEAN column, as a FLOAT in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProportionTrue;

impl AggregateFunction for ProportionTrue {
    fn name(&self) -> &str {
        "Proportion True"
    }

    fn is_compatible_with(&self, column_type: ColumnType) -> bool {
        column_type == ColumnType::Boolean
    }

    fn reduce(&self, column: &Column) -> Result<Value> {
        let bits = column.as_booleans()?;
        if bits.is_empty() {
            return Err(ColumnError::empty_column("Proportion True"));
        }
        Ok(Value::Float(bits.count_ones() as f64 / bits.len() as f64))
    }
}

/// Counts the rows of a LOCAL_TIME column whose clock time satisfies a criterion.
#[derive(Clone)]
pub struct TimeCount {
    name: String,
    criterion: fn(NaiveTime) -> bool,
}

impl TimeCount {
    pub fn new(name: impl Into<String>, criterion: fn(NaiveTime) -> bool) -> Self {
        Self {
            name: name.into(),
            criterion,
        }
    }

    /// Times strictly before 12:00.
    pub fn before_noon() -> Self {
        Self::new("Before Noon", |t| t.hour() < 12)
    }

    /// Times at or after 12:00.
    pub fn after_noon() -> Self {
        Self::new("After Noon", |t| t.hour() >= 12)
    }

    /// Times exactly at 00:00:00.
    pub fn midnight() -> Self {
        Self::new("Midnight", |t| t.num_seconds_from_midnight() == 0 && t.nanosecond() == 0)
    }

    /// Times exactly at 12:00:00.
    pub fn noon() -> Self {
        Self::new("Noon", |t| {
            t.num_seconds_from_midnight() == 12 * 3600 && t.nanosecond() == 0
        })
    }
}

impl fmt::Debug for TimeCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeCount").field("name", &self.name).finish()
    }
}

impl AggregateFunction for TimeCount {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_compatible_with(&self, column_type: ColumnType) -> bool {
        column_type == ColumnType::LocalTime
    }

    fn reduce(&self, column: &Column) -> Result<Value> {
        let count = column
            .as_times()?
            .iter()
            .filter(|t| (self.criterion)(**t))
            .count();
        Ok(Value::Integer(count as i64))
    }
}

/// The statistics reported by [Column::summary], in order.
pub fn default_aggregates() -> Vec<Box<dyn AggregateFunction>> {
    vec![
        Box::new(Count),
        Box::new(CountUnique),
        Box::new(Sum),
        Box::new(Mean),
        Box::new(Min),
        Box::new(Max),
        Box::new(Earliest),
        Box::new(Latest),
        Box::new(CountTrue),
        Box::new(ProportionTrue),
    ]
}

/// Named statistics describing one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub column: String,
    pub column_type: ColumnType,
    pub stats: Vec<(String, Value)>,
}

impl ColumnSummary {
    /// Looks a statistic up by aggregate name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.stats
            .iter()
            .find(|(stat, _)| stat == name)
            .map(|(_, value)| value)
    }
}

impl fmt::Display for ColumnSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({})", self.column, self.column_type)?;
        for (stat, value) in &self.stats {
            writeln!(f, "{stat:<16} {value}")?;
        }
        Ok(())
    }
}

/// Applies every compatible default aggregate to `column`.
///
/// Statistics with no value on zero rows (mean, min, ...) are left out of an
/// empty column's summary, and an integer sum that overflows is left out too.
/// Any other error is returned.
pub(crate) fn summarize(column: &Column) -> Result<ColumnSummary> {
    let mut stats = Vec::new();
    for function in default_aggregates() {
        if !function.is_compatible_with(column.column_type()) {
            continue;
        }
        match function.summarize(column) {
            Ok(value) => stats.push((function.name().to_string(), value)),
            Err(ColumnError::EmptyColumn { .. }) => {}
            Err(err @ ColumnError::Overflow { .. }) => {
                tracing::debug!(column = column.name(), %err, "statistic left out of summary");
            }
            Err(err) => return Err(err),
        }
    }
    Ok(ColumnSummary {
        column: column.name().to_string(),
        column_type: column.column_type(),
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn ints(values: &[i64]) -> Column {
        Column::from_values("n", ColumnType::Integer, values.iter().copied()).unwrap()
    }

    #[test]
    fn test_sum() {
        assert_eq!(Sum.summarize(&ints(&[1, 2, 3])).unwrap(), Value::Integer(6));
        assert_eq!(Sum.summarize(&ints(&[])).unwrap(), Value::Integer(0));

        let floats = Column::from_values("f", ColumnType::Float, [0.5, 0.25]).unwrap();
        assert_eq!(Sum.summarize(&floats).unwrap(), Value::Float(0.75));
        let empty = Column::new("f", ColumnType::Float);
        assert_eq!(Sum.summarize(&empty).unwrap(), Value::Float(0.0));
    }

    #[test]
    fn test_sum_overflow() {
        let err = Sum.summarize(&ints(&[i64::MAX, 1])).unwrap_err();
        assert!(matches!(err, ColumnError::Overflow { .. }));
    }

    #[test]
    fn test_type_gating() {
        let strings = Column::from_values("s", ColumnType::String, ["a"]).unwrap();

        assert!(Sum.is_compatible_with(ColumnType::Integer));
        assert!(!Sum.is_compatible_with(ColumnType::String));
        let err = Sum.summarize(&strings).unwrap_err();
        assert!(matches!(err, ColumnError::TypeMismatch { .. }));

        let noon = TimeCount::noon();
        assert!(noon.is_compatible_with(ColumnType::LocalTime));
        assert!(!noon.is_compatible_with(ColumnType::LocalDateTime));
        assert!(noon.summarize(&ints(&[1])).is_err());
    }

    #[test]
    fn test_mean_min_max() {
        let col = ints(&[4, 1, 7]);
        assert_eq!(Mean.summarize(&col).unwrap(), Value::Float(4.0));
        assert_eq!(Min.summarize(&col).unwrap(), Value::Integer(1));
        assert_eq!(Max.summarize(&col).unwrap(), Value::Integer(7));

        assert!(matches!(
            Mean.summarize(&ints(&[])).unwrap_err(),
            ColumnError::EmptyColumn { .. }
        ));
        assert!(Min.summarize(&ints(&[])).is_err());
    }

    #[test]
    fn test_float_extremes_skip_nan() {
        let col = Column::from_values("f", ColumnType::Float, [2.0, f64::NAN, -1.0]).unwrap();
        assert_eq!(Min.summarize(&col).unwrap(), Value::Float(-1.0));
        assert_eq!(Max.summarize(&col).unwrap(), Value::Float(2.0));
    }

    #[test]
    fn test_time_counts() {
        let col = Column::from_values(
            "t",
            ColumnType::LocalTime,
            [time(0, 0), time(9, 30), time(12, 0), time(18, 15)],
        )
        .unwrap();

        assert_eq!(TimeCount::before_noon().summarize(&col).unwrap(), Value::Integer(2));
        assert_eq!(TimeCount::after_noon().summarize(&col).unwrap(), Value::Integer(2));
        assert_eq!(TimeCount::midnight().summarize(&col).unwrap(), Value::Integer(1));
        assert_eq!(TimeCount::noon().summarize(&col).unwrap(), Value::Integer(1));
        assert_eq!(Earliest.summarize(&col).unwrap(), Value::LocalTime(time(0, 0)));
        assert_eq!(Latest.summarize(&col).unwrap(), Value::LocalTime(time(18, 15)));
    }

    #[test]
    fn test_boolean_aggregates() {
        let col = Column::from_values("b", ColumnType::Boolean, [true, false, true, true]).unwrap();
        assert_eq!(CountTrue.summarize(&col).unwrap(), Value::Integer(3));
        assert_eq!(ProportionTrue.summarize(&col).unwrap(), Value::Float(0.75));
    }

    #[test]
    fn test_summary() {
        let summary = ints(&[3, 1, 3]).summary().unwrap();
        assert_eq!(summary.column, "n");
        assert_eq!(summary.get("Count"), Some(&Value::Integer(3)));
        assert_eq!(summary.get("Unique"), Some(&Value::Integer(2)));
        assert_eq!(summary.get("Sum"), Some(&Value::Integer(7)));
        assert_eq!(summary.get("Min"), Some(&Value::Integer(1)));
        assert_eq!(summary.get("Earliest"), None);
        assert!(summary.to_string().contains("Sum"));

        let empty = ints(&[]).summary().unwrap();
        assert_eq!(empty.get("Count"), Some(&Value::Integer(0)));
        assert_eq!(empty.get("Mean"), None);
    }

    #[test]
    fn test_summary_leaves_out_overflowing_sum() {
        let col = ints(&[i64::MAX, 1]);
        assert!(matches!(
            Sum.summarize(&col).unwrap_err(),
            ColumnError::Overflow { .. }
        ));

        let summary = col.summary().unwrap();
        assert_eq!(summary.get("Sum"), None);
        assert_eq!(summary.get("Count"), Some(&Value::Integer(2)));
        assert_eq!(summary.get("Min"), Some(&Value::Integer(1)));
        assert_eq!(summary.get("Max"), Some(&Value::Integer(i64::MAX)));
        assert!(summary.get("Mean").is_some());
    }
}
