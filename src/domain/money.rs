use std::fmt;

/// Money is represented as integer cents to avoid floating-point precision issues.
/// 1 unit = 100 cents, so an expense of 50.00 = 5000 cents.
pub type Cents = i64;

/// Format cents as a human-readable decimal string.
/// Example: 5000 -> "50.00", 1 -> "0.01"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.abs();
    format!("{}{}.{:02}", sign, abs_cents / 100, abs_cents % 100)
}

/// Parse a decimal string into cents.
/// Example: "50.00" -> 5000, "12.5" -> 1250, "100" -> 10000
///
/// Strict on precision: more than two decimal places is an error rather
/// than a silent truncation, since these values come from user input.
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let input = input.trim();
    let (negative, input) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input),
    };
    if input.is_empty() {
        return Err(ParseCentsError::InvalidFormat);
    }

    let parts: Vec<&str> = input.split('.').collect();
    let cents = match parts.as_slice() {
        [units] => {
            let units: i64 = units.parse().map_err(|_| ParseCentsError::InvalidFormat)?;
            units * 100
        }
        [units, decimals] => {
            let units: i64 = if units.is_empty() {
                0
            } else {
                units.parse().map_err(|_| ParseCentsError::InvalidFormat)?
            };
            let decimal_cents: i64 = match decimals.len() {
                // "12.5" means 12.50
                1 => {
                    decimals
                        .parse::<i64>()
                        .map_err(|_| ParseCentsError::InvalidFormat)?
                        * 10
                }
                2 => decimals.parse().map_err(|_| ParseCentsError::InvalidFormat)?,
                _ => return Err(ParseCentsError::TooManyDecimals),
            };
            units * 100 + decimal_cents
        }
        _ => return Err(ParseCentsError::InvalidFormat),
    };

    Ok(if negative { -cents } else { cents })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseCentsError {
    InvalidFormat,
    TooManyDecimals,
}

impl fmt::Display for ParseCentsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseCentsError::InvalidFormat => write!(f, "invalid money format"),
            ParseCentsError::TooManyDecimals => {
                write!(f, "amounts support at most two decimal places")
            }
        }
    }
}

impl std::error::Error for ParseCentsError {}
