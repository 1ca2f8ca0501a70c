use anyhow::Result;
use chrono::NaiveDate;
use std::io::Read;

use crate::application::ExpenseService;
use crate::domain::{parse_cents, Category, NewExpense};

/// Result of an import operation
#[derive(Debug, Clone)]
pub struct ImportResult {
    pub imported: usize,
    pub errors: Vec<ImportError>,
}

/// Error that occurred on a single import line
#[derive(Debug, Clone)]
pub struct ImportError {
    pub line: usize,
    pub field: Option<String>,
    pub error: String,
}

/// Options for import operations
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Parse and validate everything but persist nothing.
    pub dry_run: bool,
}

/// Importer for loading expenses into the store.
///
/// Expected CSV columns: date,category,amount,description. Amounts are
/// decimal units ("20.00"), dates are YYYY-MM-DD, description is optional.
pub struct Importer<'a> {
    service: &'a ExpenseService,
}

impl<'a> Importer<'a> {
    pub fn new(service: &'a ExpenseService) -> Self {
        Self { service }
    }

    /// Import expenses from CSV. A bad line is reported and skipped, never
    /// aborting the rest of the file; storage failures abort immediately.
    pub async fn import_expenses_csv<R: Read>(
        &self,
        reader: R,
        options: ImportOptions,
    ) -> Result<ImportResult> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut imported = 0;
        let mut errors = Vec::new();

        for (line_num, result) in csv_reader.records().enumerate() {
            let line = line_num + 2; // +2 for header and 0-indexing

            let record = match result {
                Ok(r) => r,
                Err(e) => {
                    errors.push(ImportError {
                        line,
                        field: None,
                        error: format!("CSV parse error: {}", e),
                    });
                    continue;
                }
            };

            let date_str = record.get(0).unwrap_or("");
            let category_str = record.get(1).unwrap_or("");
            let amount_str = record.get(2).unwrap_or("");
            let description = record.get(3).and_then(|s| {
                if s.is_empty() {
                    None
                } else {
                    Some(s.to_string())
                }
            });

            let date = match NaiveDate::parse_from_str(date_str, "%Y-%m-%d") {
                Ok(d) => d,
                Err(e) => {
                    errors.push(ImportError {
                        line,
                        field: Some("date".to_string()),
                        error: format!("Invalid date: {}", e),
                    });
                    continue;
                }
            };

            let category = match Category::parse(category_str) {
                Ok(c) => c,
                Err(e) => {
                    errors.push(ImportError {
                        line,
                        field: Some("category".to_string()),
                        error: format!("Invalid category: {}", e),
                    });
                    continue;
                }
            };

            let amount_cents = match parse_cents(amount_str) {
                Ok(a) => a,
                Err(e) => {
                    errors.push(ImportError {
                        line,
                        field: Some("amount".to_string()),
                        error: format!("Invalid amount: {}", e),
                    });
                    continue;
                }
            };

            let mut expense = NewExpense::new(date, category, amount_cents);
            expense.description = description;

            if options.dry_run {
                imported += 1;
                continue;
            }

            match self.service.add_expense(expense).await {
                Ok(_) => imported += 1,
                Err(e) if e.is_validation() => {
                    errors.push(ImportError {
                        line,
                        field: None,
                        error: e.to_string(),
                    });
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(ImportResult { imported, errors })
    }
}
