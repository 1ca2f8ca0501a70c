use anyhow::{Context, Result};
use chrono::NaiveDate;
use sqlx::{Row, SqlitePool};

use crate::domain::{Bucket, Category, Cents, ExpenseId, ExpenseRecord, NewExpense};

use super::MIGRATION_001_INITIAL;

/// Per-category aggregate produced by SQL grouping.
#[derive(Debug, Clone)]
pub struct CategoryAggregate {
    pub category: String,
    pub count: i64,
    pub total: Cents,
    pub average: Cents,
}

/// Per-bucket aggregate produced by SQL grouping.
#[derive(Debug, Clone)]
pub struct PeriodAggregate {
    pub period: String,
    pub count: i64,
    pub total: Cents,
}

/// Repository for persisting and querying expense records.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given path.
    /// Creates the database file if it doesn't exist.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::raw_sql(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    // ========================
    // Expense CRUD
    // ========================

    /// Insert a new expense and return the id assigned by the store.
    pub async fn insert_expense(&self, expense: &NewExpense) -> Result<ExpenseId> {
        let row = sqlx::query(
            r#"
            INSERT INTO expenses (date, category, amount_cents, description)
            VALUES (?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(expense.date.to_string())
        .bind(expense.category.label())
        .bind(expense.amount_cents)
        .bind(&expense.description)
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert expense")?;

        Ok(row.get("id"))
    }

    /// Get an expense by id.
    pub async fn get_expense(&self, id: ExpenseId) -> Result<Option<ExpenseRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, date, category, amount_cents, description
            FROM expenses
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch expense")?;

        match row {
            Some(row) => Ok(Some(Self::row_to_expense(&row)?)),
            None => Ok(None),
        }
    }

    /// Replace every field of an expense except its id. A single UPDATE
    /// statement, so the change is all-or-nothing. Returns false when the
    /// id does not exist.
    pub async fn update_expense(&self, id: ExpenseId, expense: &NewExpense) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE expenses
            SET date = ?, category = ?, amount_cents = ?, description = ?
            WHERE id = ?
            "#,
        )
        .bind(expense.date.to_string())
        .bind(expense.category.label())
        .bind(expense.amount_cents)
        .bind(&expense.description)
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update expense")?;

        Ok(result.rows_affected() > 0)
    }

    /// Hard-delete an expense. Returns false when the id does not exist.
    pub async fn delete_expense(&self, id: ExpenseId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete expense")?;

        Ok(result.rows_affected() > 0)
    }

    /// List expenses with optional filters, ordered by date ascending with
    /// id as the tie-break so repeated queries display identically.
    pub async fn list_expenses_filtered(
        &self,
        from_date: Option<NaiveDate>,
        to_date: Option<NaiveDate>,
        category_exact: Option<&str>,
        category_contains: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<ExpenseRecord>> {
        // Build query dynamically based on filters
        let mut query = String::from(
            "SELECT id, date, category, amount_cents, description FROM expenses WHERE 1=1",
        );
        Self::push_filter_conditions(
            &mut query,
            from_date.is_some(),
            to_date.is_some(),
            category_exact.is_some(),
            category_contains.is_some(),
        );
        query.push_str(" ORDER BY date, id");

        if let Some(lim) = limit {
            query.push_str(&format!(" LIMIT {}", lim));
        }

        let rows = Self::bind_filter(
            sqlx::query(&query),
            from_date,
            to_date,
            category_exact,
            category_contains,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list expenses")?;

        rows.iter().map(Self::row_to_expense).collect()
    }

    // ========================
    // Aggregation
    // ========================

    /// Sum matching expenses per category. Categories without matching
    /// records don't appear. Largest totals first, label as tie-break.
    pub async fn sum_by_category(
        &self,
        from_date: Option<NaiveDate>,
        to_date: Option<NaiveDate>,
        category_exact: Option<&str>,
        category_contains: Option<&str>,
    ) -> Result<Vec<CategoryAggregate>> {
        let mut query = String::from(
            r#"
            SELECT
                category,
                COUNT(*) as count,
                SUM(amount_cents) as total,
                SUM(amount_cents) / COUNT(*) as average
            FROM expenses
            WHERE 1=1
            "#,
        );
        Self::push_filter_conditions(
            &mut query,
            from_date.is_some(),
            to_date.is_some(),
            category_exact.is_some(),
            category_contains.is_some(),
        );
        query.push_str(" GROUP BY category ORDER BY total DESC, category");

        let rows = Self::bind_filter(
            sqlx::query(&query),
            from_date,
            to_date,
            category_exact,
            category_contains,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to sum expenses by category")?;

        Ok(rows
            .iter()
            .map(|row| CategoryAggregate {
                category: row.get("category"),
                count: row.get("count"),
                total: row.get("total"),
                average: row.get("average"),
            })
            .collect())
    }

    /// Sum matching expenses per time bucket, chronologically ordered.
    /// Buckets without matching records don't appear.
    pub async fn sum_by_period(
        &self,
        bucket: Bucket,
        from_date: Option<NaiveDate>,
        to_date: Option<NaiveDate>,
        category_exact: Option<&str>,
        category_contains: Option<&str>,
    ) -> Result<Vec<PeriodAggregate>> {
        let mut query = format!(
            r#"
            SELECT
                strftime('{}', date) as period,
                COUNT(*) as count,
                SUM(amount_cents) as total
            FROM expenses
            WHERE 1=1
            "#,
            bucket.strftime_format()
        );
        Self::push_filter_conditions(
            &mut query,
            from_date.is_some(),
            to_date.is_some(),
            category_exact.is_some(),
            category_contains.is_some(),
        );
        query.push_str(" GROUP BY period ORDER BY period");

        let rows = Self::bind_filter(
            sqlx::query(&query),
            from_date,
            to_date,
            category_exact,
            category_contains,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to sum expenses by period")?;

        Ok(rows
            .iter()
            .map(|row| PeriodAggregate {
                period: row.get("period"),
                count: row.get("count"),
                total: row.get("total"),
            })
            .collect())
    }

    /// Distinct category labels present in the store, alphabetical.
    pub async fn list_used_categories(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT DISTINCT category FROM expenses ORDER BY category")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list categories")?;

        Ok(rows.iter().map(|row| row.get("category")).collect())
    }

    // ========================
    // Helpers
    // ========================

    fn push_filter_conditions(
        query: &mut String,
        has_from: bool,
        has_to: bool,
        has_exact: bool,
        has_contains: bool,
    ) {
        if has_from {
            query.push_str(" AND date >= ?");
        }
        if has_to {
            query.push_str(" AND date <= ?");
        }
        if has_exact {
            query.push_str(" AND category = ?");
        }
        if has_contains {
            query.push_str(" AND lower(category) LIKE ?");
        }
    }

    fn bind_filter<'q>(
        mut sql_query: sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
        from_date: Option<NaiveDate>,
        to_date: Option<NaiveDate>,
        category_exact: Option<&'q str>,
        category_contains: Option<&str>,
    ) -> sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
        if let Some(from) = from_date {
            sql_query = sql_query.bind(from.to_string());
        }
        if let Some(to) = to_date {
            sql_query = sql_query.bind(to.to_string());
        }
        if let Some(exact) = category_exact {
            sql_query = sql_query.bind(exact);
        }
        if let Some(contains) = category_contains {
            sql_query = sql_query.bind(format!("%{}%", contains.to_lowercase()));
        }
        sql_query
    }

    fn row_to_expense(row: &sqlx::sqlite::SqliteRow) -> Result<ExpenseRecord> {
        let date_str: String = row.get("date");
        let category_str: String = row.get("category");

        Ok(ExpenseRecord {
            id: row.get("id"),
            date: NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
                .with_context(|| format!("Invalid stored date: {}", date_str))?,
            category: Category::parse(&category_str)
                .with_context(|| format!("Invalid stored category: {:?}", category_str))?,
            amount_cents: row.get("amount_cents"),
            description: row.get("description"),
        })
    }
}
