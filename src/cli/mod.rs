use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};

use crate::application::{CategoryMatch, ExpenseFilter, ExpenseService};
use crate::domain::{format_cents, parse_cents, Bucket, Category, ExpenseId, ExpenseRecord};

/// Spendlog - Expense Tracker
#[derive(Parser)]
#[command(name = "spendlog")]
#[command(about = "A local-first expense tracker backed by SQLite")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, default_value = "spendlog.db")]
    pub database: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Add an expense
    Add {
        /// Amount spent (e.g., "50.00" or "50")
        amount: String,

        /// Category (Food, Transport, Utilities, Rent, Shopping,
        /// Entertainment, Salary, or any custom label)
        #[arg(short, long)]
        category: String,

        /// Date of the expense (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Free-text note
        #[arg(long)]
        description: Option<String>,
    },

    /// List expenses
    List {
        /// Filter from date (YYYY-MM-DD, inclusive)
        #[arg(long)]
        from: Option<String>,

        /// Filter to date (YYYY-MM-DD, inclusive)
        #[arg(long)]
        to: Option<String>,

        /// Filter by exact category
        #[arg(short, long)]
        category: Option<String>,

        /// Filter by category label substring (case-insensitive)
        #[arg(long, conflicts_with = "category")]
        category_contains: Option<String>,

        /// Maximum number of expenses to show
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Show a single expense
    Show {
        /// Expense id
        id: ExpenseId,
    },

    /// Update an expense; omitted fields keep their stored value
    Update {
        /// Expense id
        id: ExpenseId,

        /// New amount (e.g., "50.00")
        #[arg(short, long)]
        amount: Option<String>,

        /// New category
        #[arg(short, long)]
        category: Option<String>,

        /// New date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,

        /// New note (pass an empty string to clear it)
        #[arg(long)]
        description: Option<String>,
    },

    /// Delete an expense
    Delete {
        /// Expense id
        id: ExpenseId,
    },

    /// List known category labels
    Categories,

    /// Generate spending reports
    #[command(subcommand)]
    Report(ReportCommands),

    /// Export data to CSV or JSON
    Export {
        /// What to export: expenses, full
        export_type: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Import expenses from CSV (columns: date,category,amount,description)
    Import {
        /// Input file (stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,

        /// Preview without importing
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Spending totals per category
    ByCategory {
        /// Start date (YYYY-MM-DD, inclusive)
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD, inclusive)
        #[arg(long)]
        to: Option<String>,

        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Spending totals per day, month or year
    ByPeriod {
        /// Bucket: day, month, year
        #[arg(short, long, default_value = "month")]
        bucket: String,

        /// Start date (YYYY-MM-DD, inclusive)
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD, inclusive)
        #[arg(long)]
        to: Option<String>,

        /// Output format: table, json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => {
                ExpenseService::init(&self.database).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Add {
                amount,
                category,
                date,
                description,
            } => {
                let service = ExpenseService::connect(&self.database).await?;
                let amount_cents =
                    parse_cents(&amount).context("Invalid amount format. Use '50.00' or '50'")?;
                let category: Category = category
                    .parse()
                    .context("Invalid category: the label cannot be empty")?;
                let date = match date {
                    Some(date_str) => parse_date(&date_str)?,
                    None => Utc::now().date_naive(),
                };

                let mut expense = crate::domain::NewExpense::new(date, category, amount_cents);
                expense.description = description;

                let record = service.add_expense(expense).await?;
                println!(
                    "Added expense #{}: {} {} on {}",
                    record.id,
                    format_cents(record.amount_cents),
                    record.category,
                    record.date
                );
            }

            Commands::List {
                from,
                to,
                category,
                category_contains,
                limit,
                format,
            } => {
                let service = ExpenseService::connect(&self.database).await?;
                let filter = build_filter(from, to, category, category_contains, limit)?;
                let expenses = service.list_expenses(&filter).await?;
                print_expenses(&expenses, &format)?;
            }

            Commands::Show { id } => {
                let service = ExpenseService::connect(&self.database).await?;
                let record = service.get_expense(id).await?;

                println!("Expense #{}", record.id);
                println!("  Date:        {}", record.date);
                println!("  Category:    {}", record.category);
                println!("  Amount:      {}", format_cents(record.amount_cents));
                if let Some(desc) = &record.description {
                    println!("  Description: {}", desc);
                }
            }

            Commands::Update {
                id,
                amount,
                category,
                date,
                description,
            } => {
                let service = ExpenseService::connect(&self.database).await?;

                // Start from the stored record and overlay the provided fields,
                // then replace it wholesale.
                let mut draft = service.get_expense(id).await?.to_new();

                if let Some(amount) = amount {
                    draft.amount_cents = parse_cents(&amount)
                        .context("Invalid amount format. Use '50.00' or '50'")?;
                }
                if let Some(category) = category {
                    draft.category = category
                        .parse()
                        .context("Invalid category: the label cannot be empty")?;
                }
                if let Some(date_str) = date {
                    draft.date = parse_date(&date_str)?;
                }
                if let Some(desc) = description {
                    draft.description = if desc.is_empty() { None } else { Some(desc) };
                }

                let record = service.update_expense(id, draft).await?;
                println!(
                    "Updated expense #{}: {} {} on {}",
                    record.id,
                    format_cents(record.amount_cents),
                    record.category,
                    record.date
                );
            }

            Commands::Delete { id } => {
                let service = ExpenseService::connect(&self.database).await?;
                let record = service.delete_expense(id).await?;
                println!(
                    "Deleted expense #{}: {} {} on {}",
                    record.id,
                    format_cents(record.amount_cents),
                    record.category,
                    record.date
                );
            }

            Commands::Categories => {
                let service = ExpenseService::connect(&self.database).await?;
                for label in service.categories().await? {
                    println!("{}", label);
                }
            }

            Commands::Report(report_cmd) => {
                let service = ExpenseService::connect(&self.database).await?;
                run_report_command(&service, report_cmd).await?;
            }

            Commands::Export {
                export_type,
                output,
            } => {
                let service = ExpenseService::connect(&self.database).await?;
                run_export_command(&service, &export_type, output.as_deref()).await?;
            }

            Commands::Import { input, dry_run } => {
                let service = ExpenseService::connect(&self.database).await?;
                run_import_command(&service, input.as_deref(), dry_run).await?;
            }
        }

        Ok(())
    }
}

fn build_filter(
    from: Option<String>,
    to: Option<String>,
    category: Option<String>,
    category_contains: Option<String>,
    limit: Option<usize>,
) -> Result<ExpenseFilter> {
    let category = match (category, category_contains) {
        (Some(label), _) => Some(CategoryMatch::Is(
            label
                .parse()
                .context("Invalid category: the label cannot be empty")?,
        )),
        (None, Some(fragment)) => Some(CategoryMatch::Contains(fragment)),
        (None, None) => None,
    };

    Ok(ExpenseFilter {
        from_date: from.as_deref().map(parse_date).transpose()?,
        to_date: to.as_deref().map(parse_date).transpose()?,
        category,
        limit,
    })
}

fn print_expenses(expenses: &[ExpenseRecord], format: &str) -> Result<()> {
    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(expenses)?);
        }
        "csv" => {
            println!("id,date,category,amount_cents,description");
            for e in expenses {
                println!(
                    "{},{},{},{},{}",
                    e.id,
                    e.date,
                    e.category,
                    e.amount_cents,
                    e.description.as_deref().unwrap_or("")
                );
            }
        }
        _ => {
            if expenses.is_empty() {
                println!("No expenses found.");
                return Ok(());
            }

            println!(
                "{:<6} {:<12} {:<16} {:>12}  {}",
                "ID", "DATE", "CATEGORY", "AMOUNT", "DESCRIPTION"
            );
            println!("{}", "-".repeat(72));
            let mut total = 0;
            for e in expenses {
                println!(
                    "{:<6} {:<12} {:<16} {:>12}  {}",
                    e.id,
                    e.date.to_string(),
                    truncate(e.category.label(), 16),
                    format_cents(e.amount_cents),
                    e.description.as_deref().unwrap_or("")
                );
                total += e.amount_cents;
            }
            println!("{}", "-".repeat(72));
            println!(
                "{:<6} {:<12} {:<16} {:>12}",
                "",
                "",
                "TOTAL",
                format_cents(total)
            );
        }
    }
    Ok(())
}

async fn run_report_command(service: &ExpenseService, cmd: ReportCommands) -> Result<()> {
    match cmd {
        ReportCommands::ByCategory { from, to, format } => {
            let filter = build_filter(from, to, None, None, None)?;
            let report = service.totals_by_category(&filter).await?;

            match format.as_str() {
                "json" => {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
                "csv" => {
                    println!("category,total,count,average,percentage");
                    for cat in &report.categories {
                        println!(
                            "{},{},{},{},{:.2}",
                            cat.category, cat.total, cat.count, cat.average, cat.percentage
                        );
                    }
                }
                _ => {
                    println!("Spending by Category");
                    print_date_range(report.from_date, report.to_date);
                    println!();
                    println!(
                        "{:<20} {:>12} {:>8} {:>12} {:>8}",
                        "CATEGORY", "TOTAL", "COUNT", "AVERAGE", "PERCENT"
                    );
                    println!("{}", "-".repeat(65));

                    for cat in &report.categories {
                        println!(
                            "{:<20} {:>12} {:>8} {:>12} {:>7.1}%",
                            truncate(&cat.category, 20),
                            format_cents(cat.total),
                            cat.count,
                            format_cents(cat.average),
                            cat.percentage
                        );
                    }

                    println!("{}", "-".repeat(65));
                    println!("{:<20} {:>12}", "TOTAL", format_cents(report.total));
                }
            }
        }

        ReportCommands::ByPeriod {
            bucket,
            from,
            to,
            format,
        } => {
            let bucket: Bucket = bucket.parse().map_err(|e| {
                anyhow::anyhow!("Invalid bucket '{}'. Valid: day, month, year. Error: {}", bucket, e)
            })?;
            let filter = build_filter(from, to, None, None, None)?;
            let report = service.totals_by_period(&filter, bucket).await?;

            match format.as_str() {
                "json" => {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
                "csv" => {
                    println!("period,total,count");
                    for period in &report.periods {
                        println!("{},{},{}", period.period, period.total, period.count);
                    }
                }
                _ => {
                    println!("Spending by {}", bucket);
                    print_date_range(report.from_date, report.to_date);
                    println!();
                    println!("{:<12} {:>12} {:>8}", "PERIOD", "TOTAL", "COUNT");
                    println!("{}", "-".repeat(34));

                    for period in &report.periods {
                        println!(
                            "{:<12} {:>12} {:>8}",
                            period.period,
                            format_cents(period.total),
                            period.count
                        );
                    }

                    println!("{}", "-".repeat(34));
                    println!("{:<12} {:>12}", "TOTAL", format_cents(report.total));
                }
            }
        }
    }

    Ok(())
}

async fn run_export_command(
    service: &ExpenseService,
    export_type: &str,
    output: Option<&str>,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{stdout, Write};

    let exporter = Exporter::new(service);

    let writer: Box<dyn Write> = match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    match export_type {
        "expenses" => {
            let count = exporter.export_expenses_csv(writer).await?;
            if output.is_some() {
                eprintln!("Exported {} expenses", count);
            }
        }
        "full" => {
            let snapshot = exporter.export_full_json(writer).await?;
            if output.is_some() {
                eprintln!("Exported full database: {} expenses", snapshot.expenses.len());
            }
        }
        other => {
            anyhow::bail!("Unknown export type '{}'. Valid: expenses, full", other);
        }
    }

    Ok(())
}

async fn run_import_command(
    service: &ExpenseService,
    input: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    use crate::io::{ImportOptions, Importer};
    use std::fs::File;
    use std::io::{stdin, Read};

    let reader: Box<dyn Read> = match input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open input file: {}", path))?;
            Box::new(file)
        }
        None => Box::new(stdin()),
    };

    let importer = Importer::new(service);
    let result = importer
        .import_expenses_csv(reader, ImportOptions { dry_run })
        .await?;

    if dry_run {
        println!("Dry run: {} expenses would be imported", result.imported);
    } else {
        println!("Imported {} expenses", result.imported);
    }

    if !result.errors.is_empty() {
        eprintln!("{} line(s) skipped:", result.errors.len());
        for err in &result.errors {
            match &err.field {
                Some(field) => eprintln!("  line {}: {} ({})", err.line, err.error, field),
                None => eprintln!("  line {}: {}", err.line, err.error),
            }
        }
    }

    Ok(())
}

fn print_date_range(from: Option<NaiveDate>, to: Option<NaiveDate>) {
    match (from, to) {
        (Some(from), Some(to)) => println!("Period: {} to {}", from, to),
        (Some(from), None) => println!("Period: from {}", from),
        (None, Some(to)) => println!("Period: until {}", to),
        (None, None) => println!("Period: all time"),
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let prefix: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", prefix)
    }
}

fn parse_date(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .context("Date must be in YYYY-MM-DD format")
}
