use thiserror::Error;

use crate::domain::ExpenseId;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Expense not found: {0}")]
    ExpenseNotFound(ExpenseId),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Category cannot be empty")]
    EmptyCategory,

    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}

impl AppError {
    /// True for errors caught by input validation before any persistence
    /// attempt, as opposed to missing records or storage failures.
    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::InvalidAmount(_) | AppError::EmptyCategory)
    }
}
