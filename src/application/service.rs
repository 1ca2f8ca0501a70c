use crate::domain::{Bucket, Category, ExpenseId, ExpenseRecord, NewExpense, BUILTIN_CATEGORIES};
use crate::storage::Repository;

use super::{AppError, CategoryReport, CategorySummary, PeriodReport, PeriodTotal};

/// Application service providing high-level operations over expense records.
/// This is the primary interface for any client (CLI, GUI, etc.).
pub struct ExpenseService {
    repo: Repository,
}

/// Predicate on the category of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryMatch {
    /// Exact match on the canonical category.
    Is(Category),
    /// Case-insensitive substring match on the label.
    Contains(String),
}

/// Filter for querying and aggregating expenses. Date bounds are inclusive.
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    pub from_date: Option<chrono::NaiveDate>,
    pub to_date: Option<chrono::NaiveDate>,
    pub category: Option<CategoryMatch>,
    pub limit: Option<usize>,
}

impl ExpenseFilter {
    /// Split the category predicate into the (exact, contains) pair the
    /// repository queries expect.
    fn category_parts(&self) -> (Option<&str>, Option<&str>) {
        match &self.category {
            Some(CategoryMatch::Is(category)) => (Some(category.label()), None),
            Some(CategoryMatch::Contains(fragment)) => (None, Some(fragment.as_str())),
            None => (None, None),
        }
    }
}

impl ExpenseService {
    /// Create a new expense service with the given repository.
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Initialize a new database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    // ========================
    // Record store operations
    // ========================

    /// Add a new expense. Validation runs before anything touches storage,
    /// so a rejected expense leaves no trace. Returns the record with the
    /// id assigned by the store.
    pub async fn add_expense(&self, expense: NewExpense) -> Result<ExpenseRecord, AppError> {
        validate(&expense)?;

        let id = self.repo.insert_expense(&expense).await?;
        Ok(ExpenseRecord {
            id,
            date: expense.date,
            category: expense.category,
            amount_cents: expense.amount_cents,
            description: expense.description,
        })
    }

    /// Get an expense by id.
    pub async fn get_expense(&self, id: ExpenseId) -> Result<ExpenseRecord, AppError> {
        self.repo
            .get_expense(id)
            .await?
            .ok_or(AppError::ExpenseNotFound(id))
    }

    /// Replace every field of an expense except its id. Validation failure
    /// leaves the stored record untouched; the update itself is a single
    /// statement, all-or-nothing.
    pub async fn update_expense(
        &self,
        id: ExpenseId,
        expense: NewExpense,
    ) -> Result<ExpenseRecord, AppError> {
        validate(&expense)?;

        if !self.repo.update_expense(id, &expense).await? {
            return Err(AppError::ExpenseNotFound(id));
        }
        Ok(ExpenseRecord {
            id,
            date: expense.date,
            category: expense.category,
            amount_cents: expense.amount_cents,
            description: expense.description,
        })
    }

    /// Delete an expense, returning the removed record.
    pub async fn delete_expense(&self, id: ExpenseId) -> Result<ExpenseRecord, AppError> {
        let record = self.get_expense(id).await?;
        if !self.repo.delete_expense(id).await? {
            return Err(AppError::ExpenseNotFound(id));
        }
        Ok(record)
    }

    /// List expenses matching the filter, ordered by date then id.
    pub async fn list_expenses(
        &self,
        filter: &ExpenseFilter,
    ) -> Result<Vec<ExpenseRecord>, AppError> {
        let (exact, contains) = filter.category_parts();
        Ok(self
            .repo
            .list_expenses_filtered(
                filter.from_date,
                filter.to_date,
                exact,
                contains,
                filter.limit,
            )
            .await?)
    }

    /// All category labels available for entry: the builtin set plus any
    /// custom labels already used in the store.
    pub async fn categories(&self) -> Result<Vec<String>, AppError> {
        let mut labels: Vec<String> = BUILTIN_CATEGORIES
            .iter()
            .map(|c| c.label().to_string())
            .collect();

        for used in self.repo.list_used_categories().await? {
            if !labels.iter().any(|l| l.eq_ignore_ascii_case(&used)) {
                labels.push(used);
            }
        }
        Ok(labels)
    }

    // ========================
    // Aggregation
    // ========================

    /// Total spending per category over the filtered records. An empty
    /// match produces an empty report, not an error.
    pub async fn totals_by_category(
        &self,
        filter: &ExpenseFilter,
    ) -> Result<CategoryReport, AppError> {
        let (exact, contains) = filter.category_parts();
        let aggregates = self
            .repo
            .sum_by_category(filter.from_date, filter.to_date, exact, contains)
            .await?;

        let total: i64 = aggregates.iter().map(|a| a.total).sum();
        let categories = aggregates
            .into_iter()
            .map(|a| CategorySummary {
                percentage: if total > 0 {
                    a.total as f64 / total as f64 * 100.0
                } else {
                    0.0
                },
                category: a.category,
                total: a.total,
                count: a.count,
                average: a.average,
            })
            .collect();

        Ok(CategoryReport {
            from_date: filter.from_date,
            to_date: filter.to_date,
            categories,
            total,
        })
    }

    /// Total spending per day/month/year bucket over the filtered records,
    /// chronologically ordered. An empty match produces an empty report.
    pub async fn totals_by_period(
        &self,
        filter: &ExpenseFilter,
        bucket: Bucket,
    ) -> Result<PeriodReport, AppError> {
        let (exact, contains) = filter.category_parts();
        let aggregates = self
            .repo
            .sum_by_period(bucket, filter.from_date, filter.to_date, exact, contains)
            .await?;

        let total: i64 = aggregates.iter().map(|a| a.total).sum();
        let periods = aggregates
            .into_iter()
            .map(|a| PeriodTotal {
                period: a.period,
                total: a.total,
                count: a.count,
            })
            .collect();

        Ok(PeriodReport {
            bucket,
            from_date: filter.from_date,
            to_date: filter.to_date,
            periods,
            total,
        })
    }
}

/// Invariant checks shared by add and update. Runs before any persistence.
fn validate(expense: &NewExpense) -> Result<(), AppError> {
    if expense.amount_cents <= 0 {
        return Err(AppError::InvalidAmount(format!(
            "amount must be positive, got {}",
            crate::domain::format_cents(expense.amount_cents)
        )));
    }
    if expense.category.label().trim().is_empty() {
        return Err(AppError::EmptyCategory);
    }
    Ok(())
}
