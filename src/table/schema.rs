//! Schema normalization for task records

use super::{Cell, Dataset};
use crate::error::{Result, TaskShareError};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Names of the columns the distribution relies on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    /// Task-type label, matched exactly
    pub task_type: String,
    /// Login of the account that last returned the task, matched by substring
    pub login: String,
    /// Assigned-worker column, added when absent
    pub assignee: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            task_type: "TAREFA PENDENTE".to_string(),
            login: "LOGIN RETORNO EXIGÊNCIA".to_string(),
            assignee: "Responsavel".to_string(),
        }
    }
}

/// A dataset that passed schema normalization.
///
/// The task-type and login columns are known to exist and the assignee
/// column is present on every row. Derived subsets keep the same columns, so
/// the resolved indices stay valid for them.
#[derive(Debug, Clone, PartialEq)]
pub struct Records {
    dataset: Dataset,
    task_type: usize,
    login: usize,
    assignee: usize,
}

impl Records {
    /// Normalize a loaded dataset.
    ///
    /// Fails only when the task-type or login column is missing entirely.
    pub fn normalize(mut dataset: Dataset, columns: &ColumnNames) -> Result<Self> {
        let task_type = dataset
            .column_index(&columns.task_type)
            .ok_or_else(|| TaskShareError::missing_column(&columns.task_type))?;
        let login = dataset
            .column_index(&columns.login)
            .ok_or_else(|| TaskShareError::missing_column(&columns.login))?;
        let assignee = dataset.ensure_column(&columns.assignee);

        Ok(Self {
            dataset,
            task_type,
            login,
            assignee,
        })
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn len(&self) -> usize {
        self.dataset.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dataset.is_empty()
    }

    /// Task-type label of a row; empty when the cell is blank
    pub fn task_type(&self, row: usize) -> Cow<'_, str> {
        self.cell_text(row, self.task_type)
    }

    /// Login of a row; a blank or missing login reads as empty
    pub fn login(&self, row: usize) -> Cow<'_, str> {
        self.cell_text(row, self.login)
    }

    pub fn assignee(&self, row: usize) -> Cow<'_, str> {
        self.cell_text(row, self.assignee)
    }

    fn cell_text(&self, row: usize, column: usize) -> Cow<'_, str> {
        self.dataset
            .rows()
            .get(row)
            .and_then(|r| r.get(column))
            .map(Cell::as_text)
            .unwrap_or(Cow::Borrowed(""))
    }

    /// Copy the rows at `indices`, in order, keeping the schema
    pub fn select(&self, indices: &[usize]) -> Records {
        Records {
            dataset: self.dataset.select(indices),
            task_type: self.task_type,
            login: self.login,
            assignee: self.assignee,
        }
    }

    /// Indices of all rows whose task type equals `task_type`
    pub fn rows_with_task(&self, task_type: &str) -> Vec<usize> {
        (0..self.len())
            .filter(|&i| self.task_type(i) == task_type)
            .collect()
    }

    /// Write a worker name into the assignee column of one row
    pub fn assign(&mut self, row: usize, worker: &str) {
        self.dataset
            .set_cell(row, self.assignee, Cell::from(worker));
    }
}
