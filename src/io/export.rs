use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::application::{ExpenseFilter, ExpenseService};
use crate::domain::{format_cents, ExpenseRecord};

/// Database snapshot for full export/import
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub expenses: Vec<ExpenseRecord>,
}

/// Exporter for converting expense data to various formats
pub struct Exporter<'a> {
    service: &'a ExpenseService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a ExpenseService) -> Self {
        Self { service }
    }

    /// Export all expenses to CSV format. Same column layout the importer
    /// reads, so an export can be fed straight back in. Store-assigned ids
    /// are omitted (only the JSON snapshot carries them).
    pub async fn export_expenses_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let expenses = self
            .service
            .list_expenses(&ExpenseFilter::default())
            .await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["date", "category", "amount", "description"])?;

        let mut count = 0;
        for expense in &expenses {
            csv_writer.write_record(&[
                expense.date.to_string(),
                expense.category.label().to_string(),
                format_cents(expense.amount_cents),
                expense.description.clone().unwrap_or_default(),
            ])?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export the full database as a JSON snapshot
    pub async fn export_full_json<W: Write>(&self, mut writer: W) -> Result<DatabaseSnapshot> {
        let expenses = self
            .service
            .list_expenses(&ExpenseFilter::default())
            .await?;

        let snapshot = DatabaseSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            expenses,
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }
}
