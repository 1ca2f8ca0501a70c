use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Category, Cents};

/// Row id assigned by the store on insert.
pub type ExpenseId = i64;

/// A persisted expense record. The id is immutable; every other field can
/// be replaced through an update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: ExpenseId,
    /// Calendar date the expense occurred (no time-of-day).
    pub date: NaiveDate,
    pub category: Category,
    /// Amount in cents, always positive.
    pub amount_cents: Cents,
    /// Optional free-text note.
    pub description: Option<String>,
}

/// An expense without an id: the input to add and update operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExpense {
    pub date: NaiveDate,
    pub category: Category,
    pub amount_cents: Cents,
    pub description: Option<String>,
}

impl NewExpense {
    pub fn new(date: NaiveDate, category: Category, amount_cents: Cents) -> Self {
        Self {
            date,
            category,
            amount_cents,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl ExpenseRecord {
    /// The record with its id stripped, e.g. as the starting point for an
    /// update that changes only some fields.
    pub fn to_new(&self) -> NewExpense {
        NewExpense {
            date: self.date,
            category: self.category.clone(),
            amount_cents: self.amount_cents,
            description: self.description.clone(),
        }
    }
}
