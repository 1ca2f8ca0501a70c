use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Expense category: a fixed set of well-known labels plus an escape
/// variant for anything else. User input is canonicalized onto the builtin
/// variants case-insensitively, so "food" and "FOOD" aggregate together
/// instead of fragmenting reports.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    Food,
    Transport,
    Utilities,
    Rent,
    Shopping,
    Entertainment,
    Salary,
    /// Any label outside the builtin set. Trimmed, never empty.
    Other(String),
}

/// Builtin categories in display order.
pub const BUILTIN_CATEGORIES: [Category; 7] = [
    Category::Food,
    Category::Transport,
    Category::Utilities,
    Category::Rent,
    Category::Shopping,
    Category::Entertainment,
    Category::Salary,
];

impl Category {
    /// The label as stored in the database and shown to the user.
    pub fn label(&self) -> &str {
        match self {
            Category::Food => "Food",
            Category::Transport => "Transport",
            Category::Utilities => "Utilities",
            Category::Rent => "Rent",
            Category::Shopping => "Shopping",
            Category::Entertainment => "Entertainment",
            Category::Salary => "Salary",
            Category::Other(label) => label,
        }
    }

    /// Parse a user- or storage-supplied label. Whitespace is trimmed,
    /// builtin labels match case-insensitively, anything else non-empty
    /// becomes `Other` with its original casing preserved.
    pub fn parse(label: &str) -> Result<Self, ParseCategoryError> {
        let label = label.trim();
        if label.is_empty() {
            return Err(ParseCategoryError::Empty);
        }

        for builtin in &BUILTIN_CATEGORIES {
            if builtin.label().eq_ignore_ascii_case(label) {
                return Ok(builtin.clone());
            }
        }

        Ok(Category::Other(label.to_string()))
    }

    pub fn is_builtin(&self) -> bool {
        !matches!(self, Category::Other(_))
    }
}

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::parse(s)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// Categories serialize as their bare label so exported JSON reads
// "category": "Food" rather than a tagged enum.
impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Category::parse(&label).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseCategoryError {
    Empty,
}

impl fmt::Display for ParseCategoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseCategoryError::Empty => write!(f, "category cannot be empty"),
        }
    }
}

impl std::error::Error for ParseCategoryError {}
