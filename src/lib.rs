//! In-memory columnar storage: typed growable columns, bitmap row-sets,
//! composable filters, type-gated aggregates and sorting.

pub mod aggregate;
pub mod column;
pub mod column_type;
pub mod config;
pub mod error;
pub mod filter;
pub mod row_set;
pub mod sort;
pub mod table;
pub mod value;

pub use aggregate::{AggregateFunction, ColumnSummary};
pub use column::{Column, ColumnData, Comparison};
pub use column_type::ColumnType;
pub use config::ColumnConfig;
pub use error::{ColumnError, Result};
pub use filter::{ColumnFilter, ColumnReference, ColumnSource, Filter, col};
pub use row_set::RowSet;
pub use sort::SortDirection;
pub use table::Table;
pub use value::Value;
