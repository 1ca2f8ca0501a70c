// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::NaiveDate;
use spendlog::application::ExpenseService;
use spendlog::domain::{Category, NewExpense};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(ExpenseService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = ExpenseService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Helper to parse a YYYY-MM-DD string into a NaiveDate
pub fn date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

/// Shorthand for an expense draft
pub fn expense(date_str: &str, category: &str, amount_cents: i64) -> NewExpense {
    NewExpense::new(
        date(date_str),
        Category::parse(category).unwrap(),
        amount_cents,
    )
}

/// Test fixture: a small set of expenses spanning two months
pub struct SampleExpenses;

impl SampleExpenses {
    /// The three records from the standard aggregation scenario:
    /// two Food expenses in January, one Rent expense in February.
    pub async fn create_basic(service: &ExpenseService) -> Result<()> {
        service
            .add_expense(expense("2024-01-05", "Food", 2000))
            .await?;
        service
            .add_expense(expense("2024-01-10", "Food", 1500))
            .await?;
        service
            .add_expense(expense("2024-02-01", "Rent", 50000))
            .await?;
        Ok(())
    }

    /// A wider mix including custom-labeled categories
    pub async fn create_mixed(service: &ExpenseService) -> Result<()> {
        Self::create_basic(service).await?;
        service
            .add_expense(expense("2024-01-07", "Transport", 350))
            .await?;
        service
            .add_expense(expense("2024-01-20", "Entertainment", 4500))
            .await?;
        service
            .add_expense(
                expense("2024-02-14", "Office Supplies", 1299).with_description("printer paper"),
            )
            .await?;
        Ok(())
    }
}
