use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Bucket, Cents};

/// Spending totals grouped by category over an optional date range.
/// Categories with no matching records are omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryReport {
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub categories: Vec<CategorySummary>,
    pub total: Cents,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: String,
    pub total: Cents,
    pub count: i64,
    pub average: Cents,
    pub percentage: f64,
}

/// Spending totals grouped by time bucket, chronologically ordered.
/// Buckets with no matching records are omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodReport {
    pub bucket: Bucket,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub periods: Vec<PeriodTotal>,
    pub total: Cents,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodTotal {
    /// Bucket label: "2024-01-05", "2024-01" or "2024".
    pub period: String,
    pub total: Cents,
    pub count: i64,
}
