use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::mem;
use std::sync::Arc;

use allocative::{Allocative, Key, Visitor};
use bitvec::prelude::*;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::aggregate::{self, AggregateFunction, ColumnSummary, Sum};
use crate::column_type::ColumnType;
use crate::config::ColumnConfig;
use crate::error::{ColumnError, Result};
use crate::row_set::{MAX_ROWS, RowSet};
use crate::sort::{self, SortDirection};
use crate::value::Value;

/// Physical storage for column data.
/// Each variant wraps a collection of a specific type to ensure contiguous memory
/// allocation (columnar storage).
#[derive(Debug, Clone)]
pub enum ColumnData {
    /// Vector of 64-bit integers.
    Integer(Vec<i64>),
    /// Vector of 64-bit floats.
    Float(Vec<f64>),
    LocalDate(Vec<NaiveDate>),
    LocalTime(Vec<NaiveTime>),
    LocalDateTime(Vec<NaiveDateTime>),
    /// Vector of thread-safe atomic reference-counted strings.
    String(Vec<Arc<str>>),
    /// Compact bit-vector for boolean values.
    Boolean(BitVec),
}

impl ColumnData {
    fn with_capacity(column_type: ColumnType, capacity: usize) -> Self {
        match column_type {
            ColumnType::Integer => Self::Integer(Vec::with_capacity(capacity)),
            ColumnType::Float => Self::Float(Vec::with_capacity(capacity)),
            ColumnType::LocalDate => Self::LocalDate(Vec::with_capacity(capacity)),
            ColumnType::LocalTime => Self::LocalTime(Vec::with_capacity(capacity)),
            ColumnType::LocalDateTime => Self::LocalDateTime(Vec::with_capacity(capacity)),
            ColumnType::String => Self::String(Vec::with_capacity(capacity)),
            ColumnType::Boolean => Self::Boolean(BitVec::with_capacity(capacity)),
        }
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            Self::Integer(_) => ColumnType::Integer,
            Self::Float(_) => ColumnType::Float,
            Self::LocalDate(_) => ColumnType::LocalDate,
            Self::LocalTime(_) => ColumnType::LocalTime,
            Self::LocalDateTime(_) => ColumnType::LocalDateTime,
            Self::String(_) => ColumnType::String,
            Self::Boolean(_) => ColumnType::Boolean,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Integer(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::LocalDate(v) => v.len(),
            Self::LocalTime(v) => v.len(),
            Self::LocalDateTime(v) => v.len(),
            Self::String(v) => v.len(),
            Self::Boolean(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads one row. The caller guarantees `row < len()`.
    fn value(&self, row: usize) -> Value {
        match self {
            Self::Integer(v) => Value::Integer(v[row]),
            Self::Float(v) => Value::Float(v[row]),
            Self::LocalDate(v) => Value::LocalDate(v[row]),
            Self::LocalTime(v) => Value::LocalTime(v[row]),
            Self::LocalDateTime(v) => Value::LocalDateTime(v[row]),
            Self::String(v) => Value::String(Arc::clone(&v[row])),
            Self::Boolean(v) => Value::Boolean(v[row]),
        }
    }

    fn push(&mut self, value: Value) -> Result<()> {
        match (self, value) {
            (Self::Integer(col), Value::Integer(v)) => col.push(v),
            (Self::Float(col), Value::Float(v)) => col.push(v),
            (Self::LocalDate(col), Value::LocalDate(v)) => col.push(v),
            (Self::LocalTime(col), Value::LocalTime(v)) => col.push(v),
            (Self::LocalDateTime(col), Value::LocalDateTime(v)) => col.push(v),
            (Self::String(col), Value::String(v)) => col.push(v),
            (Self::Boolean(col), Value::Boolean(v)) => col.push(v),
            (data, value) => {
                return Err(ColumnError::type_mismatch(
                    None,
                    data.column_type().name(),
                    value.column_type().name(),
                ));
            }
        }
        Ok(())
    }

    /// Appends `source[row]`. Both sides must hold the same variant.
    fn push_from(&mut self, source: &ColumnData, row: usize) -> Result<()> {
        match (self, source) {
            (Self::Integer(dst), Self::Integer(src)) => dst.push(src[row]),
            (Self::Float(dst), Self::Float(src)) => dst.push(src[row]),
            (Self::LocalDate(dst), Self::LocalDate(src)) => dst.push(src[row]),
            (Self::LocalTime(dst), Self::LocalTime(src)) => dst.push(src[row]),
            (Self::LocalDateTime(dst), Self::LocalDateTime(src)) => dst.push(src[row]),
            (Self::String(dst), Self::String(src)) => dst.push(Arc::clone(&src[row])),
            (Self::Boolean(dst), Self::Boolean(src)) => dst.push(src[row]),
            (dst, src) => {
                return Err(ColumnError::type_mismatch(
                    None,
                    dst.column_type().name(),
                    src.column_type().name(),
                ));
            }
        }
        Ok(())
    }

    /// Moves the live elements into a fresh allocation of `capacity` slots.
    ///
    /// The new buffer is fully populated before it replaces the old one.
    fn reallocate(&mut self, capacity: usize) {
        match self {
            Self::Integer(v) => move_into_new(v, capacity),
            Self::Float(v) => move_into_new(v, capacity),
            Self::LocalDate(v) => move_into_new(v, capacity),
            Self::LocalTime(v) => move_into_new(v, capacity),
            Self::LocalDateTime(v) => move_into_new(v, capacity),
            Self::String(v) => move_into_new(v, capacity),
            Self::Boolean(bits) => {
                let mut next = BitVec::with_capacity(capacity);
                next.extend_from_bitslice(bits);
                *bits = next;
            }
        }
    }

    /// Independent copy backed by an allocation of `capacity` slots.
    fn copy_with_capacity(&self, capacity: usize) -> Self {
        match self {
            Self::Integer(v) => Self::Integer(copy_into_new(v, capacity)),
            Self::Float(v) => Self::Float(copy_into_new(v, capacity)),
            Self::LocalDate(v) => Self::LocalDate(copy_into_new(v, capacity)),
            Self::LocalTime(v) => Self::LocalTime(copy_into_new(v, capacity)),
            Self::LocalDateTime(v) => Self::LocalDateTime(copy_into_new(v, capacity)),
            Self::String(v) => Self::String(copy_into_new(v, capacity)),
            Self::Boolean(bits) => {
                let mut next = BitVec::with_capacity(capacity);
                next.extend_from_bitslice(bits);
                Self::Boolean(next)
            }
        }
    }

    fn sort(&mut self, direction: SortDirection) {
        match self {
            Self::Integer(v) => sort::sort_slice(v, direction),
            Self::Float(v) => sort::sort_floats(v, direction),
            Self::LocalDate(v) => sort::sort_slice(v, direction),
            Self::LocalTime(v) => sort::sort_slice(v, direction),
            Self::LocalDateTime(v) => sort::sort_slice(v, direction),
            Self::String(v) => sort::sort_slice(v, direction),
            Self::Boolean(bits) => {
                // A sorted boolean column is a run of one value followed by the other.
                let ones = bits.count_ones();
                let zeros = bits.len() - ones;
                let (first, first_len, second_len) = match direction {
                    SortDirection::Asc => (false, zeros, ones),
                    SortDirection::Desc => (true, ones, zeros),
                };
                bits[..first_len].fill(first);
                bits[first_len..first_len + second_len].fill(!first);
            }
        }
    }

    fn order(&self, direction: SortDirection) -> Vec<usize> {
        match self {
            Self::Integer(v) => sort::order_by(v, direction, |a, b| a.cmp(b)),
            Self::Float(v) => sort::order_by(v, direction, |a, b| a.total_cmp(b)),
            Self::LocalDate(v) => sort::order_by(v, direction, |a, b| a.cmp(b)),
            Self::LocalTime(v) => sort::order_by(v, direction, |a, b| a.cmp(b)),
            Self::LocalDateTime(v) => sort::order_by(v, direction, |a, b| a.cmp(b)),
            Self::String(v) => sort::order_by(v, direction, |a, b| a.cmp(b)),
            Self::Boolean(bits) => {
                let values: Vec<bool> = bits.iter().by_vals().collect();
                sort::order_by(&values, direction, |a, b| a.cmp(b))
            }
        }
    }

    fn slot_bytes(&self, capacity: usize) -> usize {
        match self {
            Self::Integer(_) => capacity * mem::size_of::<i64>(),
            Self::Float(_) => capacity * mem::size_of::<f64>(),
            Self::LocalDate(_) => capacity * mem::size_of::<NaiveDate>(),
            Self::LocalTime(_) => capacity * mem::size_of::<NaiveTime>(),
            Self::LocalDateTime(_) => capacity * mem::size_of::<NaiveDateTime>(),
            Self::String(_) => capacity * mem::size_of::<Arc<str>>(),
            Self::Boolean(_) => capacity.div_ceil(8),
        }
    }

    fn string_bytes(&self) -> usize {
        match self {
            Self::String(v) => v.iter().map(|s| s.len()).sum(),
            _ => 0,
        }
    }
}

fn move_into_new<T>(values: &mut Vec<T>, capacity: usize) {
    let mut next = Vec::with_capacity(capacity);
    next.append(values);
    *values = next;
}

fn copy_into_new<T: Clone>(values: &[T], capacity: usize) -> Vec<T> {
    let mut next = Vec::with_capacity(capacity.max(values.len()));
    next.extend_from_slice(values);
    next
}

/// The comparison a predicate applies between each row and an operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    LessThan,
    LessThanOrEqual,
    Equal,
    NotEqual,
    GreaterThanOrEqual,
    GreaterThan,
    /// Strictly later; temporal columns only.
    After,
    /// Strictly earlier; temporal columns only.
    Before,
}

impl Comparison {
    /// Whether `row <op> operand` holds given `row.cmp(operand)`.
    pub fn matches(self, ord: Ordering) -> bool {
        match self {
            Self::LessThan | Self::Before => ord == Ordering::Less,
            Self::LessThanOrEqual => ord != Ordering::Greater,
            Self::Equal => ord == Ordering::Equal,
            Self::NotEqual => ord != Ordering::Equal,
            Self::GreaterThanOrEqual => ord != Ordering::Less,
            Self::GreaterThan | Self::After => ord == Ordering::Greater,
        }
    }

    pub fn is_temporal_only(self) -> bool {
        matches!(self, Self::After | Self::Before)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::GreaterThanOrEqual => ">=",
            Self::GreaterThan => ">",
            Self::After => "is after",
            Self::Before => "is before",
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A named, typed, growable column.
///
/// Storage grows by doubling its logical capacity whenever an append finds it
/// full, and only shrinks through [Column::compact] or [Column::clear].
///
/// Read operations (`get`, comparators, aggregates, sorts) scan by row index and
/// never mutate the column, so any number of readers may share a `&Column`.
/// Mutation needs `&mut Column`, which leaves a single writer with no readers.
#[derive(Debug)]
pub struct Column {
    name: String,
    data: ColumnData,
    capacity: usize,
    config: ColumnConfig,
    reallocations: usize,
}

impl Column {
    /// Creates a new, empty column with the default initial capacity of 128 slots.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        let config = ColumnConfig::default();
        Self {
            name: name.into(),
            data: ColumnData::with_capacity(column_type, config.initial_capacity),
            capacity: config.initial_capacity,
            config,
            reallocations: 0,
        }
    }

    /// Creates an empty column with room for `initial_capacity` values.
    ///
    /// # Errors
    /// Returns [ColumnError::InvalidConfig] if `initial_capacity` is zero.
    pub fn with_capacity(
        name: impl Into<String>,
        column_type: ColumnType,
        initial_capacity: usize,
    ) -> Result<Self> {
        let config = ColumnConfig::default().with_initial_capacity(initial_capacity);
        Self::with_config(name, column_type, config)
    }

    /// Creates an empty column sized by `config`.
    pub fn with_config(
        name: impl Into<String>,
        column_type: ColumnType,
        config: ColumnConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            name: name.into(),
            data: ColumnData::with_capacity(column_type, config.initial_capacity),
            capacity: config.initial_capacity,
            config,
            reallocations: 0,
        })
    }

    /// Builds a column by appending every value in order.
    ///
    /// # Example
    /// ```
    /// # use columnar::{Column, ColumnType};
    /// let col = Column::from_values("n", ColumnType::Integer, [5, 2, 9]).unwrap();
    /// assert_eq!(col.len(), 3);
    /// assert_eq!(col.get_string(2).unwrap(), "9");
    /// ```
    pub fn from_values<I, V>(
        name: impl Into<String>,
        column_type: ColumnType,
        values: I,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let mut column = Self::new(name, column_type);
        for value in values {
            column.add(value)?;
        }
        Ok(column)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn column_type(&self) -> ColumnType {
        self.data.column_type()
    }

    /// Returns the number of rows currently stored in the column.
    #[doc(alias = "size")]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if there is no row in the column, else false.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of allocated slots; always `>= len()`.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of growth events since creation or the last `clear()`.
    pub fn reallocations(&self) -> usize {
        self.reallocations
    }

    pub fn config(&self) -> ColumnConfig {
        self.config
    }

    /// Borrows the typed storage, for readers that want to match on the variant.
    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    /// Appends a new value to the end of the column.
    ///
    /// Doubles the capacity first when the column is full.
    ///
    /// # Errors
    /// - [ColumnError::TypeMismatch] if the value's type is not the column's type.
    /// - [ColumnError::CapacityExceeded] if the column already holds the maximum
    ///   number of addressable rows.
    ///
    /// # Example
    /// ```
    /// # use columnar::{Column, ColumnType, Value};
    /// let mut col = Column::new("age", ColumnType::Integer);
    /// col.add(30).unwrap();
    /// col.add(25).unwrap();
    ///
    /// assert_eq!(col.len(), 2);
    /// assert_eq!(col.get(1).unwrap(), Value::Integer(25));
    /// assert!(col.add("thirty").is_err());
    /// ```
    pub fn add(&mut self, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        if value.column_type() != self.column_type() {
            return Err(ColumnError::column_type_mismatch(
                &self.name,
                self.column_type().name(),
                value.column_type(),
            ));
        }
        self.reserve_one()?;
        self.data.push(value)
    }

    fn reserve_one(&mut self) -> Result<()> {
        let len = self.len();
        if len >= MAX_ROWS {
            return Err(ColumnError::CapacityExceeded { max: MAX_ROWS });
        }
        if len >= self.capacity {
            self.resize();
        }
        Ok(())
    }

    fn resize(&mut self) {
        let new_capacity = self.capacity.saturating_mul(2);
        tracing::trace!(
            column = %self.name,
            old_capacity = self.capacity,
            new_capacity,
            "growing column"
        );
        self.data.reallocate(new_capacity);
        self.capacity = new_capacity;
        self.reallocations += 1;
    }

    /// Removes (most) spare capacity, leaving `len() + compaction_slack` slots.
    ///
    /// Contents and order are unchanged. A column that already has no more than
    /// that many slots is left as is.
    pub fn compact(&mut self) {
        let target = self.len().saturating_add(self.config.compaction_slack);
        if target >= self.capacity {
            return;
        }
        tracing::debug!(
            column = %self.name,
            old_capacity = self.capacity,
            new_capacity = target,
            "compacting column"
        );
        self.data.reallocate(target);
        self.capacity = target;
    }

    /// Discards every value and returns to the initial capacity.
    pub fn clear(&mut self) {
        tracing::debug!(column = %self.name, rows = self.len(), "clearing column");
        self.data = ColumnData::with_capacity(self.column_type(), self.config.initial_capacity);
        self.capacity = self.config.initial_capacity;
        self.reallocations = 0;
    }

    fn check_row(&self, row: usize) -> Result<()> {
        if row >= self.len() {
            return Err(ColumnError::IndexOutOfBounds {
                row,
                size: self.len(),
            });
        }
        Ok(())
    }

    /// Retrieves the value at the specified row index.
    ///
    /// # Errors
    /// Returns [ColumnError::IndexOutOfBounds] if `row >= len()`.
    pub fn get(&self, row: usize) -> Result<Value> {
        self.check_row(row)?;
        Ok(self.data.value(row))
    }

    /// Canonical text rendering of one row (see [Value]'s `Display`).
    pub fn get_string(&self, row: usize) -> Result<String> {
        Ok(self.get(row)?.to_string())
    }

    /// Iterates over the values in row order.
    ///
    /// Each call returns an independent iterator; nothing is stored on the column.
    pub fn values(&self) -> impl Iterator<Item = Value> + '_ {
        (0..self.len()).map(|row| self.data.value(row))
    }

    fn mismatch(&self, expected: ColumnType) -> ColumnError {
        ColumnError::column_type_mismatch(&self.name, expected.name(), self.column_type())
    }

    pub fn as_integers(&self) -> Result<&[i64]> {
        match &self.data {
            ColumnData::Integer(v) => Ok(v.as_slice()),
            _ => Err(self.mismatch(ColumnType::Integer)),
        }
    }

    pub fn as_floats(&self) -> Result<&[f64]> {
        match &self.data {
            ColumnData::Float(v) => Ok(v.as_slice()),
            _ => Err(self.mismatch(ColumnType::Float)),
        }
    }

    pub fn as_dates(&self) -> Result<&[NaiveDate]> {
        match &self.data {
            ColumnData::LocalDate(v) => Ok(v.as_slice()),
            _ => Err(self.mismatch(ColumnType::LocalDate)),
        }
    }

    pub fn as_times(&self) -> Result<&[NaiveTime]> {
        match &self.data {
            ColumnData::LocalTime(v) => Ok(v.as_slice()),
            _ => Err(self.mismatch(ColumnType::LocalTime)),
        }
    }

    pub fn as_date_times(&self) -> Result<&[NaiveDateTime]> {
        match &self.data {
            ColumnData::LocalDateTime(v) => Ok(v.as_slice()),
            _ => Err(self.mismatch(ColumnType::LocalDateTime)),
        }
    }

    pub fn as_strings(&self) -> Result<&[Arc<str>]> {
        match &self.data {
            ColumnData::String(v) => Ok(v.as_slice()),
            _ => Err(self.mismatch(ColumnType::String)),
        }
    }

    pub fn as_booleans(&self) -> Result<&BitSlice> {
        match &self.data {
            ColumnData::Boolean(v) => Ok(v.as_bitslice()),
            _ => Err(self.mismatch(ColumnType::Boolean)),
        }
    }

    /// Returns the rows where `row <op> operand` holds, in a single index-based pass.
    ///
    /// Floats compare with IEEE semantics: a NaN row (or operand) matches only
    /// [Comparison::NotEqual].
    ///
    /// # Errors
    /// Returns [ColumnError::TypeMismatch] if the operand's type differs from the
    /// column's, or if `After`/`Before` is used on a non-temporal column.
    pub fn compare(&self, op: Comparison, operand: &Value) -> Result<RowSet> {
        if op.is_temporal_only() && !self.column_type().is_temporal() {
            return Err(ColumnError::column_type_mismatch(
                &self.name,
                "LOCAL_DATE, LOCAL_TIME or LOCAL_DATE_TIME",
                self.column_type(),
            ));
        }
        let rows = match (&self.data, operand) {
            (ColumnData::Integer(v), Value::Integer(t)) => scan(v, |x| op.matches(x.cmp(t))),
            (ColumnData::Float(v), Value::Float(t)) => scan(v, |x| match x.partial_cmp(t) {
                Some(ord) => op.matches(ord),
                None => op == Comparison::NotEqual,
            }),
            (ColumnData::LocalDate(v), Value::LocalDate(t)) => scan(v, |x| op.matches(x.cmp(t))),
            (ColumnData::LocalTime(v), Value::LocalTime(t)) => scan(v, |x| op.matches(x.cmp(t))),
            (ColumnData::LocalDateTime(v), Value::LocalDateTime(t)) => {
                scan(v, |x| op.matches(x.cmp(t)))
            }
            (ColumnData::String(v), Value::String(t)) => scan(v, |x| op.matches(x.cmp(t))),
            (ColumnData::Boolean(bits), Value::Boolean(t)) => {
                scan_bits(bits, |x| op.matches(x.cmp(t)))
            }
            _ => {
                return Err(ColumnError::column_type_mismatch(
                    &self.name,
                    operand.column_type().name(),
                    self.column_type(),
                ));
            }
        };
        Ok(rows)
    }

    pub fn is_less_than(&self, operand: impl Into<Value>) -> Result<RowSet> {
        self.compare(Comparison::LessThan, &operand.into())
    }

    pub fn is_less_than_or_equal_to(&self, operand: impl Into<Value>) -> Result<RowSet> {
        self.compare(Comparison::LessThanOrEqual, &operand.into())
    }

    pub fn is_equal_to(&self, operand: impl Into<Value>) -> Result<RowSet> {
        self.compare(Comparison::Equal, &operand.into())
    }

    pub fn is_not_equal_to(&self, operand: impl Into<Value>) -> Result<RowSet> {
        self.compare(Comparison::NotEqual, &operand.into())
    }

    pub fn is_greater_than_or_equal_to(&self, operand: impl Into<Value>) -> Result<RowSet> {
        self.compare(Comparison::GreaterThanOrEqual, &operand.into())
    }

    pub fn is_greater_than(&self, operand: impl Into<Value>) -> Result<RowSet> {
        self.compare(Comparison::GreaterThan, &operand.into())
    }

    /// Rows strictly later than `operand`. Temporal columns only.
    pub fn is_after(&self, operand: impl Into<Value>) -> Result<RowSet> {
        self.compare(Comparison::After, &operand.into())
    }

    /// Rows strictly earlier than `operand`. Temporal columns only.
    pub fn is_before(&self, operand: impl Into<Value>) -> Result<RowSet> {
        self.compare(Comparison::Before, &operand.into())
    }

    /// Rows equal to `operand`. Temporal columns only.
    pub fn is_on(&self, operand: impl Into<Value>) -> Result<RowSet> {
        if !self.column_type().is_temporal() {
            return Err(ColumnError::column_type_mismatch(
                &self.name,
                "LOCAL_DATE, LOCAL_TIME or LOCAL_DATE_TIME",
                self.column_type(),
            ));
        }
        self.compare(Comparison::Equal, &operand.into())
    }

    /// Rows with `low <= value <= high`.
    pub fn is_between_inclusive(
        &self,
        low: impl Into<Value>,
        high: impl Into<Value>,
    ) -> Result<RowSet> {
        let above = self.compare(Comparison::GreaterThanOrEqual, &low.into())?;
        let below = self.compare(Comparison::LessThanOrEqual, &high.into())?;
        Ok(above.and(&below))
    }

    /// Rows equal to any of `values`.
    pub fn is_in(&self, values: &[Value]) -> Result<RowSet> {
        let mut rows = RowSet::empty();
        for value in values {
            rows = rows.or(&self.compare(Comparison::Equal, value)?);
        }
        Ok(rows)
    }

    pub fn starts_with(&self, prefix: &str) -> Result<RowSet> {
        Ok(scan(self.as_strings()?, |s| s.starts_with(prefix)))
    }

    pub fn ends_with(&self, suffix: &str) -> Result<RowSet> {
        Ok(scan(self.as_strings()?, |s| s.ends_with(suffix)))
    }

    pub fn contains_str(&self, needle: &str) -> Result<RowSet> {
        Ok(scan(self.as_strings()?, |s| s.contains(needle)))
    }

    pub fn is_true(&self) -> Result<RowSet> {
        let bits = self.as_booleans()?;
        Ok(bits.iter_ones().map(|row| row as u32).collect())
    }

    pub fn is_false(&self) -> Result<RowSet> {
        let bits = self.as_booleans()?;
        Ok(bits.iter_zeros().map(|row| row as u32).collect())
    }

    /// An empty column with the same name, type and config, backed by new storage.
    pub fn empty_copy(&self) -> Column {
        Column {
            name: self.name.clone(),
            data: ColumnData::with_capacity(self.column_type(), self.config.initial_capacity),
            capacity: self.config.initial_capacity,
            config: self.config,
            reallocations: 0,
        }
    }

    /// An independent copy with the same contents and capacity.
    pub fn copy(&self) -> Column {
        Column {
            name: self.name.clone(),
            data: self.data.copy_with_capacity(self.capacity),
            capacity: self.capacity,
            config: self.config,
            reallocations: 0,
        }
    }

    /// A new column with the values in ascending order; `self` is untouched.
    pub fn sort_ascending(&self) -> Column {
        self.sorted(SortDirection::Asc)
    }

    /// A new column with the values in descending order; `self` is untouched.
    pub fn sort_descending(&self) -> Column {
        self.sorted(SortDirection::Desc)
    }

    pub fn sorted(&self, direction: SortDirection) -> Column {
        let mut sorted = self.copy();
        sorted.data.sort(direction);
        sorted
    }

    /// The stable row permutation that sorts this column.
    ///
    /// Re-applying it with [Column::take] to row-aligned columns keeps them aligned.
    pub fn sort_order(&self, direction: SortDirection) -> Vec<usize> {
        self.data.order(direction)
    }

    /// A new column holding `self[rows[0]], self[rows[1]], ...`.
    ///
    /// # Errors
    /// Returns [ColumnError::IndexOutOfBounds] for the first row outside the column.
    pub fn take(&self, rows: &[usize]) -> Result<Column> {
        let mut out = self.empty_copy();
        for &row in rows {
            self.check_row(row)?;
            out.reserve_one()?;
            out.data.push_from(&self.data, row)?;
        }
        Ok(out)
    }

    /// A new column holding the rows of `rows`, in ascending row order.
    pub fn select(&self, rows: &RowSet) -> Result<Column> {
        if let Some(max) = rows.max() {
            self.check_row(max)?;
        }
        let mut out = self.empty_copy();
        for row in rows.iter() {
            out.reserve_one()?;
            out.data.push_from(&self.data, row)?;
        }
        Ok(out)
    }

    /// Sum of an INTEGER or FLOAT column; zero for an empty column.
    pub fn sum(&self) -> Result<Value> {
        Sum.summarize(self)
    }

    /// Number of distinct values.
    ///
    /// Floats are distinct by bit pattern, matching the sort order: `0.0` and
    /// `-0.0` count twice and identical NaNs count once.
    pub fn count_unique(&self) -> usize {
        match &self.data {
            ColumnData::Integer(v) => distinct(v.iter()),
            ColumnData::Float(v) => distinct(v.iter().map(|f| f.to_bits())),
            ColumnData::LocalDate(v) => distinct(v.iter()),
            ColumnData::LocalTime(v) => distinct(v.iter()),
            ColumnData::LocalDateTime(v) => distinct(v.iter()),
            ColumnData::String(v) => distinct(v.iter()),
            ColumnData::Boolean(bits) => usize::from(bits.any()) + usize::from(bits.not_all()),
        }
    }

    /// Every default statistic that applies to this column's type.
    pub fn summary(&self) -> Result<ColumnSummary> {
        aggregate::summarize(self)
    }

    /// Bytes of heap owned by this column, including unused capacity.
    pub fn allocated_bytes(&self) -> usize {
        allocative::size_of_unique_allocated_data(self)
    }
}

impl Clone for Column {
    fn clone(&self) -> Self {
        self.copy()
    }
}

impl Allocative for Column {
    fn visit<'a, 'b: 'a>(&self, visitor: &'a mut Visitor<'b>) {
        let mut visitor = visitor.enter_self_sized::<Self>();
        visitor.visit_field(Key::new("name"), &self.name);
        {
            let mut data = visitor.enter_unique(Key::new("data"), mem::size_of::<usize>());
            data.visit_simple(Key::new("slots"), self.data.slot_bytes(self.capacity));
            data.visit_simple(Key::new("strings"), self.data.string_bytes());
            data.exit();
        }
        visitor.exit();
    }
}

fn scan<T, F>(values: &[T], mut matches: F) -> RowSet
where
    F: FnMut(&T) -> bool,
{
    let mut rows = RowSet::empty();
    for row in 0..values.len() {
        if matches(&values[row]) {
            // Row ids fit in u32: `add` refuses to grow past MAX_ROWS.
            rows.insert(row as u32);
        }
    }
    rows
}

fn scan_bits<F>(bits: &BitSlice, mut matches: F) -> RowSet
where
    F: FnMut(&bool) -> bool,
{
    let mut rows = RowSet::empty();
    for (row, bit) in bits.iter().by_vals().enumerate() {
        if matches(&bit) {
            rows.insert(row as u32);
        }
    }
    rows
}

fn distinct<T, I>(values: I) -> usize
where
    T: std::hash::Hash + Eq,
    I: Iterator<Item = T>,
{
    values.collect::<HashSet<T>>().len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> Column {
        Column::from_values("n", ColumnType::Integer, values.iter().copied()).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // ─────────────────────────────────────────────────────────────
    // Test 1 : Creation
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_column_new() {
        let col = Column::new("age", ColumnType::Integer);

        assert_eq!(col.name(), "age");
        assert_eq!(col.column_type(), ColumnType::Integer);
        assert_eq!(col.len(), 0);
        assert!(col.is_empty());
        assert_eq!(col.capacity(), 128);
        assert_eq!(col.reallocations(), 0);
    }

    #[test]
    fn test_with_capacity() {
        let col = Column::with_capacity("x", ColumnType::Float, 4).unwrap();
        assert_eq!(col.capacity(), 4);

        let err = Column::with_capacity("x", ColumnType::Float, 0).unwrap_err();
        assert!(matches!(err, ColumnError::InvalidConfig { .. }));
    }

    // ─────────────────────────────────────────────────────────────
    // Test 2 : Basic Add & Get
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_add_and_get() {
        let mut col = Column::new("test", ColumnType::Integer);
        col.add(42).unwrap();

        assert_eq!(col.len(), 1);
        assert_eq!(col.get(0).unwrap(), Value::Integer(42));
        assert_eq!(col.get_string(0).unwrap(), "42");
    }

    // ─────────────────────────────────────────────────────────────
    // Test 3 : Type mismatch
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_type_mismatch() {
        let mut col = Column::new("int_col", ColumnType::Integer);

        let err = col.add("hello").unwrap_err();

        assert!(matches!(err, ColumnError::TypeMismatch { .. }));
        assert_eq!(col.len(), 0);
    }

    // ─────────────────────────────────────────────────────────────
    // Test 4 : Out of bounds
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_out_of_bounds() {
        let col = ints(&[1, 2]);

        assert_eq!(
            col.get(2).unwrap_err(),
            ColumnError::IndexOutOfBounds { row: 2, size: 2 }
        );
        assert!(col.get_string(100).is_err());
    }

    // ─────────────────────────────────────────────────────────────
    // Test 5 : Growth doubles capacity
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_growth_doubles() {
        let mut col = Column::with_capacity("g", ColumnType::Integer, 2).unwrap();
        col.add(1).unwrap();
        col.add(2).unwrap();
        assert_eq!(col.capacity(), 2);
        assert_eq!(col.reallocations(), 0);

        col.add(3).unwrap();
        assert_eq!(col.capacity(), 4);
        assert_eq!(col.reallocations(), 1);

        col.add(4).unwrap();
        col.add(5).unwrap();
        assert_eq!(col.capacity(), 8);
        assert_eq!(col.reallocations(), 2);
        assert_eq!(col.as_integers().unwrap(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_large_column() {
        let mut col = Column::new("big", ColumnType::Integer);
        for i in 0..10_000 {
            col.add(i as i64).unwrap();
        }

        assert_eq!(col.len(), 10_000);
        assert_eq!(col.capacity(), 16_384);
        assert_eq!(col.reallocations(), 7);
        assert_eq!(col.get(5_000).unwrap(), Value::Integer(5_000));
        assert_eq!(col.get(9_999).unwrap(), Value::Integer(9_999));
    }

    // ─────────────────────────────────────────────────────────────
    // Test 6 : Compact & Clear
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_compact() {
        let mut col = Column::new("c", ColumnType::Integer);
        for i in 0..300 {
            col.add(i).unwrap();
        }
        assert_eq!(col.capacity(), 512);

        col.compact();
        assert_eq!(col.capacity(), 400);
        assert_eq!(col.len(), 300);
        assert_eq!(col.get(299).unwrap(), Value::Integer(299));

        // Already within slack: no change.
        col.compact();
        assert_eq!(col.capacity(), 400);
    }

    #[test]
    fn test_compact_reduces_allocated_bytes() {
        let mut col = Column::new("c", ColumnType::Integer);
        for i in 0..600 {
            col.add(i).unwrap();
        }
        let before = col.allocated_bytes();
        col.compact();
        assert!(col.allocated_bytes() < before);
    }

    #[test]
    fn test_clear() {
        let mut col = Column::new("c", ColumnType::String);
        for i in 0..200 {
            col.add(format!("v{i}")).unwrap();
        }
        col.clear();

        assert!(col.is_empty());
        assert_eq!(col.capacity(), 128);
        assert_eq!(col.reallocations(), 0);

        col.add("again").unwrap();
        assert_eq!(col.get_string(0).unwrap(), "again");
    }

    // ─────────────────────────────────────────────────────────────
    // Test 7 : Comparators
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_integer_comparators() {
        let col = ints(&[5, 2, 9, 2, 7]);

        assert_eq!(col.is_greater_than(4).unwrap().to_vec(), vec![0, 2, 4]);
        assert_eq!(col.is_less_than(5).unwrap().to_vec(), vec![1, 3]);
        assert_eq!(col.is_less_than_or_equal_to(5).unwrap().to_vec(), vec![0, 1, 3]);
        assert_eq!(col.is_greater_than_or_equal_to(7).unwrap().to_vec(), vec![2, 4]);
        assert_eq!(col.is_equal_to(2).unwrap().to_vec(), vec![1, 3]);
        assert_eq!(col.is_not_equal_to(2).unwrap().to_vec(), vec![0, 2, 4]);
        assert_eq!(col.is_between_inclusive(2, 5).unwrap().to_vec(), vec![0, 1, 3]);
        assert_eq!(
            col.is_in(&[Value::Integer(9), Value::Integer(7)]).unwrap().to_vec(),
            vec![2, 4]
        );
    }

    #[test]
    fn test_comparators_are_repeatable() {
        let col = ints(&[1, 2, 3]);
        let first = col.is_greater_than(1).unwrap();
        let second = col.is_greater_than(1).unwrap();
        assert_eq!(first, second);
        assert_eq!(col.sum().unwrap(), Value::Integer(6));
        assert_eq!(col.sum().unwrap(), Value::Integer(6));
    }

    #[test]
    fn test_comparator_operand_mismatch() {
        let col = ints(&[1, 2, 3]);
        let err = col.is_less_than(2.5).unwrap_err();
        assert!(matches!(err, ColumnError::TypeMismatch { .. }));
    }

    #[test]
    fn test_float_nan_comparisons() {
        let col = Column::from_values("f", ColumnType::Float, [1.0, f64::NAN, 3.0]).unwrap();

        assert_eq!(col.is_less_than(2.0).unwrap().to_vec(), vec![0]);
        assert_eq!(col.is_greater_than_or_equal_to(2.0).unwrap().to_vec(), vec![2]);
        assert_eq!(col.is_not_equal_to(1.0).unwrap().to_vec(), vec![1, 2]);
        assert!(col.is_equal_to(f64::NAN).unwrap().is_empty());
    }

    #[test]
    fn test_temporal_comparators() {
        let col = Column::from_values(
            "d",
            ColumnType::LocalDate,
            [date(2020, 1, 1), date(2021, 6, 1), date(2019, 12, 31)],
        )
        .unwrap();

        assert_eq!(col.is_after(date(2020, 1, 1)).unwrap().to_vec(), vec![1]);
        assert_eq!(col.is_before(date(2020, 1, 1)).unwrap().to_vec(), vec![2]);
        assert_eq!(col.is_on(date(2020, 1, 1)).unwrap().to_vec(), vec![0]);

        let numbers = ints(&[1]);
        assert!(matches!(
            numbers.is_after(1).unwrap_err(),
            ColumnError::TypeMismatch { .. }
        ));
        assert!(numbers.is_on(1).is_err());
    }

    #[test]
    fn test_string_comparators() {
        let col =
            Column::from_values("s", ColumnType::String, ["apple", "banana", "apricot"]).unwrap();

        assert_eq!(col.is_less_than("b").unwrap().to_vec(), vec![0, 2]);
        assert_eq!(col.starts_with("ap").unwrap().to_vec(), vec![0, 2]);
        assert_eq!(col.ends_with("na").unwrap().to_vec(), vec![1]);
        assert_eq!(col.contains_str("ric").unwrap().to_vec(), vec![2]);
        assert!(ints(&[1]).starts_with("a").is_err());
    }

    #[test]
    fn test_boolean_column() {
        let col = Column::from_values("b", ColumnType::Boolean, [true, false, true]).unwrap();

        assert_eq!(col.is_true().unwrap().to_vec(), vec![0, 2]);
        assert_eq!(col.is_false().unwrap().to_vec(), vec![1]);
        assert_eq!(col.is_equal_to(false).unwrap().to_vec(), vec![1]);
        assert_eq!(col.get_string(1).unwrap(), "false");
        assert_eq!(col.count_unique(), 2);

        let sorted = col.sort_ascending();
        assert_eq!(
            sorted.values().collect::<Vec<_>>(),
            vec![Value::Boolean(false), Value::Boolean(true), Value::Boolean(true)]
        );
        let sorted = col.sort_descending();
        assert_eq!(sorted.get(2).unwrap(), Value::Boolean(false));
    }

    // ─────────────────────────────────────────────────────────────
    // Test 8 : Sorting & derivation
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_sort_leaves_original() {
        let col = ints(&[5, 2, 9, 2, 7]);

        let asc = col.sort_ascending();
        assert_eq!(asc.as_integers().unwrap(), &[2, 2, 5, 7, 9]);
        let desc = col.sort_descending();
        assert_eq!(desc.as_integers().unwrap(), &[9, 7, 5, 2, 2]);

        assert_eq!(col.as_integers().unwrap(), &[5, 2, 9, 2, 7]);
        assert_eq!(asc.name(), "n");
        assert_eq!(asc.capacity(), col.capacity());
    }

    #[test]
    fn test_sort_temporal_and_string_columns() {
        let time = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
        let at = |d: NaiveDate, h| d.and_hms_opt(h, 0, 0).unwrap();

        let dates = [date(2019, 3, 1), date(2015, 7, 4), date(2017, 1, 1), date(2015, 7, 4)];
        let times = [time(23, 30), time(0, 0), time(12, 0), time(6, 15)];
        let date_times = [
            at(date(2016, 1, 1), 9),
            at(date(2016, 1, 1), 8),
            at(date(2014, 5, 5), 20),
            at(date(2020, 2, 29), 0),
        ];
        let strings = ["pear", "Apple", "apple", "banana"];

        let columns = [
            Column::from_values("d", ColumnType::LocalDate, dates).unwrap(),
            Column::from_values("t", ColumnType::LocalTime, times).unwrap(),
            Column::from_values("dt", ColumnType::LocalDateTime, date_times).unwrap(),
            Column::from_values("s", ColumnType::String, strings).unwrap(),
        ];

        for col in &columns {
            let before: Vec<Value> = col.values().collect();
            let asc: Vec<Value> = col.sort_ascending().values().collect();
            let desc: Vec<Value> = col.sort_descending().values().collect();

            let mut expected = before.clone();
            expected.sort_by(|a, b| match (a, b) {
                (Value::LocalDate(x), Value::LocalDate(y)) => x.cmp(y),
                (Value::LocalTime(x), Value::LocalTime(y)) => x.cmp(y),
                (Value::LocalDateTime(x), Value::LocalDateTime(y)) => x.cmp(y),
                (Value::String(x), Value::String(y)) => x.cmp(y),
                _ => unreachable!(),
            });
            assert_eq!(asc, expected, "ascending {}", col.column_type());
            expected.reverse();
            assert_eq!(desc, expected, "descending {}", col.column_type());

            assert_eq!(col.values().collect::<Vec<_>>(), before);
        }

        let sorted = columns[3].sort_ascending();
        assert_eq!(sorted.get_string(0).unwrap(), "Apple");
        assert_eq!(sorted.get_string(3).unwrap(), "pear");
        let sorted = columns[1].sort_descending();
        assert_eq!(sorted.get(0).unwrap(), Value::LocalTime(time(23, 30)));
        assert_eq!(sorted.get(3).unwrap(), Value::LocalTime(time(0, 0)));
    }

    #[test]
    fn test_sort_order_and_take() {
        let col = ints(&[5, 2, 9]);
        let order = col.sort_order(SortDirection::Asc);
        assert_eq!(order, vec![1, 0, 2]);

        let labels = Column::from_values("l", ColumnType::String, ["five", "two", "nine"]).unwrap();
        let aligned = labels.take(&order).unwrap();
        assert_eq!(aligned.get_string(0).unwrap(), "two");
        assert_eq!(aligned.get_string(2).unwrap(), "nine");

        assert!(labels.take(&[3]).is_err());
    }

    #[test]
    fn test_select() {
        let col = ints(&[10, 20, 30, 40]);
        let rows: RowSet = [0u32, 2].into_iter().collect();
        let picked = col.select(&rows).unwrap();
        assert_eq!(picked.as_integers().unwrap(), &[10, 30]);

        let beyond: RowSet = [9u32].into_iter().collect();
        assert!(col.select(&beyond).is_err());
    }

    #[test]
    fn test_empty_copy_and_copy() {
        let mut col = Column::with_capacity("x", ColumnType::Integer, 8).unwrap();
        col.add(1).unwrap();

        let empty = col.empty_copy();
        assert_eq!(empty.name(), "x");
        assert_eq!(empty.column_type(), ColumnType::Integer);
        assert!(empty.is_empty());
        assert_eq!(empty.capacity(), 8);

        let mut copy = col.copy();
        copy.add(2).unwrap();
        assert_eq!(col.len(), 1);
        assert_eq!(copy.len(), 2);
    }

    #[test]
    fn test_count_unique() {
        assert_eq!(ints(&[1, 2, 2, 3, 3, 3]).count_unique(), 3);
        assert_eq!(ints(&[]).count_unique(), 0);
        let floats = Column::from_values("f", ColumnType::Float, [0.0, -0.0, 1.0, 1.0]).unwrap();
        assert_eq!(floats.count_unique(), 3);
    }

    #[test]
    fn test_get_string_formats() {
        let time = NaiveTime::from_hms_opt(13, 45, 0).unwrap();
        let col = Column::from_values("t", ColumnType::LocalTime, [time]).unwrap();
        assert_eq!(col.get_string(0).unwrap(), "13:45:00");

        let col = Column::from_values(
            "dt",
            ColumnType::LocalDateTime,
            [date(2016, 2, 29).and_time(time)],
        )
        .unwrap();
        assert_eq!(col.get_string(0).unwrap(), "2016-02-29T13:45:00");
    }

    #[test]
    fn test_values_iterators_are_independent() {
        let col = ints(&[1, 2, 3]);
        let mut a = col.values();
        let mut b = col.values();
        assert_eq!(a.next(), Some(Value::Integer(1)));
        assert_eq!(a.next(), Some(Value::Integer(2)));
        assert_eq!(b.next(), Some(Value::Integer(1)));
    }
}
