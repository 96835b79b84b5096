use crate::column::Column;
use crate::error::{ColumnError, Result};
use crate::filter::{ColumnSource, Filter};
use crate::row_set::RowSet;
use crate::sort::SortDirection;
use crate::value::Value;

/// A named set of row-aligned columns.
///
/// Only what filters and sorts need: lookup by name, row-aligned selection and
/// re-applying one column's sort order to every column.
#[derive(Debug, Clone)]
pub struct Table {
    pub name: String,
    columns: Vec<Column>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Adds a column.
    ///
    /// # Errors
    /// - [ColumnError::DuplicateColumn] if a column with that name exists.
    /// - [ColumnError::RowCountMismatch] if its length differs from the table's.
    pub fn add_column(&mut self, column: Column) -> Result<()> {
        if self.columns.iter().any(|c| c.name() == column.name()) {
            return Err(ColumnError::DuplicateColumn {
                name: column.name().to_string(),
            });
        }
        if let Some(first) = self.columns.first() {
            if first.len() != column.len() {
                return Err(ColumnError::RowCountMismatch {
                    expected: first.len(),
                    actual: column.len(),
                });
            }
        }
        self.columns.push(column);
        Ok(())
    }

    /// Looks a column up by name.
    ///
    /// # Errors
    /// Returns [ColumnError::ColumnNotFound] if no column has that name.
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|col| col.name() == name)
            .ok_or_else(|| ColumnError::column_not_found(name))
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    pub fn get_row(&self, row: usize) -> Result<Vec<Value>> {
        self.columns.iter().map(|col| col.get(row)).collect()
    }

    /// A new table with only the rows in `rows`, in ascending row order.
    pub fn select_rows(&self, rows: &RowSet) -> Result<Table> {
        let columns = self
            .columns
            .iter()
            .map(|col| col.select(rows))
            .collect::<Result<Vec<_>>>()?;
        Ok(Table {
            name: self.name.clone(),
            columns,
        })
    }

    /// A new table with the rows matching `filter`.
    pub fn filter(&self, filter: &Filter) -> Result<Table> {
        let rows = filter.apply(self)?;
        self.select_rows(&rows)
    }

    /// A new table with every column reordered by the values of `column_name`.
    pub fn sort_on(&self, column_name: &str, direction: SortDirection) -> Result<Table> {
        let order = self.column(column_name)?.sort_order(direction);
        let columns = self
            .columns
            .iter()
            .map(|col| col.take(&order))
            .collect::<Result<Vec<_>>>()?;
        Ok(Table {
            name: self.name.clone(),
            columns,
        })
    }
}

impl ColumnSource for Table {
    fn column(&self, name: &str) -> Result<&Column> {
        Table::column(self, name)
    }

    fn row_count(&self) -> usize {
        Table::row_count(self)
    }
}
