mod common;

use anyhow::Result;
use common::{date, expense, test_service, SampleExpenses};
use spendlog::application::{CategoryMatch, ExpenseFilter};
use spendlog::domain::{Bucket, Category};

#[tokio::test]
async fn test_totals_by_category_over_date_range() -> Result<()> {
    let (service, _temp) = test_service().await?;
    SampleExpenses::create_basic(&service).await?;

    // January only: the two Food expenses, Rent excluded.
    let january = ExpenseFilter {
        from_date: Some(date("2024-01-01")),
        to_date: Some(date("2024-01-31")),
        ..Default::default()
    };
    let report = service.totals_by_category(&january).await?;

    assert_eq!(report.categories.len(), 1);
    assert_eq!(report.categories[0].category, "Food");
    assert_eq!(report.categories[0].total, 3500);
    assert_eq!(report.categories[0].count, 2);
    assert_eq!(report.categories[0].average, 1750);
    assert!((report.categories[0].percentage - 100.0).abs() < f64::EPSILON);
    assert_eq!(report.total, 3500);

    Ok(())
}

#[tokio::test]
async fn test_totals_by_category_all_time() -> Result<()> {
    let (service, _temp) = test_service().await?;
    SampleExpenses::create_basic(&service).await?;

    let report = service.totals_by_category(&ExpenseFilter::default()).await?;

    // Largest total first.
    assert_eq!(report.categories.len(), 2);
    assert_eq!(report.categories[0].category, "Rent");
    assert_eq!(report.categories[0].total, 50000);
    assert_eq!(report.categories[1].category, "Food");
    assert_eq!(report.categories[1].total, 3500);
    assert_eq!(report.total, 53500);

    let rent_pct = report.categories[0].percentage;
    assert!((rent_pct - 93.46).abs() < 0.01);

    Ok(())
}

#[tokio::test]
async fn test_totals_by_period_monthly() -> Result<()> {
    let (service, _temp) = test_service().await?;
    SampleExpenses::create_basic(&service).await?;

    let report = service
        .totals_by_period(&ExpenseFilter::default(), Bucket::Month)
        .await?;

    // Chronological order; empty months are simply absent.
    assert_eq!(report.periods.len(), 2);
    assert_eq!(report.periods[0].period, "2024-01");
    assert_eq!(report.periods[0].total, 3500);
    assert_eq!(report.periods[0].count, 2);
    assert_eq!(report.periods[1].period, "2024-02");
    assert_eq!(report.periods[1].total, 50000);
    assert_eq!(report.periods[1].count, 1);
    assert_eq!(report.total, 53500);

    Ok(())
}

#[tokio::test]
async fn test_totals_by_period_daily_and_yearly() -> Result<()> {
    let (service, _temp) = test_service().await?;
    SampleExpenses::create_basic(&service).await?;
    service.add_expense(expense("2023-12-31", "Food", 1000)).await?;

    let daily = service
        .totals_by_period(&ExpenseFilter::default(), Bucket::Day)
        .await?;
    let labels: Vec<&str> = daily.periods.iter().map(|p| p.period.as_str()).collect();
    assert_eq!(
        labels,
        vec!["2023-12-31", "2024-01-05", "2024-01-10", "2024-02-01"]
    );

    let yearly = service
        .totals_by_period(&ExpenseFilter::default(), Bucket::Year)
        .await?;
    assert_eq!(yearly.periods.len(), 2);
    assert_eq!(yearly.periods[0].period, "2023");
    assert_eq!(yearly.periods[0].total, 1000);
    assert_eq!(yearly.periods[1].period, "2024");
    assert_eq!(yearly.periods[1].total, 53500);

    Ok(())
}

#[tokio::test]
async fn test_empty_filter_yields_empty_reports() -> Result<()> {
    let (service, _temp) = test_service().await?;
    SampleExpenses::create_basic(&service).await?;

    let nothing = ExpenseFilter {
        from_date: Some(date("2030-01-01")),
        ..Default::default()
    };

    let by_category = service.totals_by_category(&nothing).await?;
    assert!(by_category.categories.is_empty());
    assert_eq!(by_category.total, 0);

    let by_period = service.totals_by_period(&nothing, Bucket::Month).await?;
    assert!(by_period.periods.is_empty());
    assert_eq!(by_period.total, 0);

    Ok(())
}

#[tokio::test]
async fn test_reports_on_empty_store() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let by_category = service.totals_by_category(&ExpenseFilter::default()).await?;
    assert!(by_category.categories.is_empty());

    let by_period = service
        .totals_by_period(&ExpenseFilter::default(), Bucket::Month)
        .await?;
    assert!(by_period.periods.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_canonicalized_labels_aggregate_together() -> Result<()> {
    let (service, _temp) = test_service().await?;

    service.add_expense(expense("2024-01-05", "food", 2000)).await?;
    service.add_expense(expense("2024-01-10", "FOOD", 1500)).await?;

    let report = service.totals_by_category(&ExpenseFilter::default()).await?;

    // One row, not two: casing never fragments a category.
    assert_eq!(report.categories.len(), 1);
    assert_eq!(report.categories[0].category, "Food");
    assert_eq!(report.categories[0].total, 3500);

    Ok(())
}

#[tokio::test]
async fn test_period_report_respects_category_filter() -> Result<()> {
    let (service, _temp) = test_service().await?;
    SampleExpenses::create_basic(&service).await?;

    let food_only = ExpenseFilter {
        category: Some(CategoryMatch::Is(Category::Food)),
        ..Default::default()
    };
    let report = service.totals_by_period(&food_only, Bucket::Month).await?;

    assert_eq!(report.periods.len(), 1);
    assert_eq!(report.periods[0].period, "2024-01");
    assert_eq!(report.periods[0].total, 3500);

    Ok(())
}

#[tokio::test]
async fn test_aggregation_does_not_mutate_the_store() -> Result<()> {
    let (service, _temp) = test_service().await?;
    SampleExpenses::create_basic(&service).await?;

    let before = service.list_expenses(&ExpenseFilter::default()).await?;
    service.totals_by_category(&ExpenseFilter::default()).await?;
    service
        .totals_by_period(&ExpenseFilter::default(), Bucket::Year)
        .await?;
    let after = service.list_expenses(&ExpenseFilter::default()).await?;

    assert_eq!(before, after);

    Ok(())
}
