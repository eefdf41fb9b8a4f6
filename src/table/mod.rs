//! In-memory tables with named, ordered columns
//!
//! A [`Dataset`] stores rows positionally against its column list. Rows are
//! otherwise opaque: every operation here keeps the cells it does not touch
//! exactly as loaded. Combining datasets widens the column set and fills the
//! gaps with [`Cell::Empty`], so every row stays uniformly shaped before a
//! write.

pub mod io;
pub mod schema;

pub use io::{read_table, write_table, TableFormat};
pub use schema::{ColumnNames, Records};

use chrono::{NaiveDateTime, NaiveTime};
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

/// A single spreadsheet value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl Cell {
    /// Whether the cell renders as an empty string
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Text rendering used for matching against labels and logins
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Cell::Empty => Cow::Borrowed(""),
            Cell::Text(s) => Cow::Borrowed(s.as_str()),
            other => Cow::Owned(other.to_string()),
        }
    }

    /// Whether a date cell carries no time of day
    pub fn is_date_only(&self) -> bool {
        matches!(self, Cell::DateTime(dt) if dt.time() == NaiveTime::MIN)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Text(s) => f.write_str(s),
            // Whole numbers print without a trailing ".0" so numeric logins match as text
            Cell::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Bool(b) => write!(f, "{}", b),
            Cell::DateTime(dt) if self.is_date_only() => {
                write!(f, "{}", dt.format("%Y-%m-%d"))
            }
            Cell::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value.to_string())
        }
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value)
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

/// An ordered sequence of rows sharing one column set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Dataset {
    /// Create an empty dataset with the given columns
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a dataset from positional rows.
    ///
    /// Short rows are padded with empty cells; cells past the last column are
    /// dropped.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let mut dataset = Self::new(columns);
        for row in rows {
            dataset.push_row(row);
        }
        dataset
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Value of a named column in a row, `None` if the column is absent
    pub fn value(&self, row: usize, column: &str) -> Option<&Cell> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        row.resize(self.columns.len(), Cell::Empty);
        self.rows.push(row);
    }

    /// Make sure a column exists, appending it with empty values if absent.
    /// Returns the column's index.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(idx) = self.column_index(name) {
            return idx;
        }
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(Cell::Empty);
        }
        self.columns.len() - 1
    }

    /// Overwrite one cell. Out-of-range positions are ignored.
    pub fn set_cell(&mut self, row: usize, column: usize, value: Cell) {
        if let Some(cell) = self.rows.get_mut(row).and_then(|r| r.get_mut(column)) {
            *cell = value;
        }
    }

    /// Copy the rows at `indices`, in the given order, into a new dataset
    pub fn select(&self, indices: &[usize]) -> Dataset {
        Dataset {
            columns: self.columns.clone(),
            rows: indices
                .iter()
                .filter_map(|&i| self.rows.get(i).cloned())
                .collect(),
        }
    }

    /// Concatenate datasets, widening the column set.
    ///
    /// Columns keep first-seen order across the inputs; cells for columns a
    /// source does not have are empty.
    pub fn concat<I>(datasets: I) -> Dataset
    where
        I: IntoIterator<Item = Dataset>,
    {
        let mut result = Dataset::default();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for dataset in datasets {
            let mapping: Vec<usize> = dataset
                .columns
                .iter()
                .map(|name| {
                    *positions.entry(name.clone()).or_insert_with(|| {
                        result.columns.push(name.clone());
                        result.columns.len() - 1
                    })
                })
                .collect();

            let width = result.columns.len();
            for row in &mut result.rows {
                row.resize(width, Cell::Empty);
            }

            for row in dataset.rows {
                let mut widened = vec![Cell::Empty; width];
                for (cell, &target) in row.into_iter().zip(&mapping) {
                    widened[target] = cell;
                }
                result.rows.push(widened);
            }
        }

        result
    }

    /// Return a copy with columns reordered alphabetically by name
    pub fn with_sorted_columns(&self) -> Dataset {
        let mut order: Vec<usize> = (0..self.columns.len()).collect();
        order.sort_by(|&a, &b| self.columns[a].cmp(&self.columns[b]));

        Dataset {
            columns: order.iter().map(|&i| self.columns[i].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|row| order.iter().map(|&i| row[i].clone()).collect())
                .collect(),
        }
    }
}
