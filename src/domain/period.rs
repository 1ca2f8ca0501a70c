use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Time-grouping unit for period reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Day,
    Month,
    Year,
}

impl Bucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::Day => "day",
            Bucket::Month => "month",
            Bucket::Year => "year",
        }
    }

    /// SQLite strftime pattern producing this bucket's label from an ISO
    /// date column. Labels sort lexicographically in chronological order.
    pub fn strftime_format(&self) -> &'static str {
        match self {
            Bucket::Day => "%Y-%m-%d",
            Bucket::Month => "%Y-%m",
            Bucket::Year => "%Y",
        }
    }

    /// The bucket label a given date falls into ("2024-01-05", "2024-01", "2024").
    pub fn label_for(&self, date: NaiveDate) -> String {
        match self {
            Bucket::Day => date.format("%Y-%m-%d").to_string(),
            Bucket::Month => format!("{:04}-{:02}", date.year(), date.month()),
            Bucket::Year => format!("{:04}", date.year()),
        }
    }
}

impl FromStr for Bucket {
    type Err = ParseBucketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "day" | "daily" => Ok(Bucket::Day),
            "month" | "monthly" => Ok(Bucket::Month),
            "year" | "yearly" => Ok(Bucket::Year),
            _ => Err(ParseBucketError(s.to_string())),
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseBucketError(pub String);

impl fmt::Display for ParseBucketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown bucket '{}' (expected day, month or year)", self.0)
    }
}

impl std::error::Error for ParseBucketError {}
