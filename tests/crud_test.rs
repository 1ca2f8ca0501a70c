mod common;

use anyhow::Result;
use common::{date, expense, test_service};
use spendlog::application::{AppError, ExpenseFilter, ExpenseService};
use spendlog::domain::Category;

#[tokio::test]
async fn test_add_round_trip() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let record = service
        .add_expense(expense("2024-01-05", "Food", 2000).with_description("team lunch"))
        .await?;

    assert!(record.id > 0);
    assert_eq!(record.amount_cents, 2000);
    assert_eq!(record.category, Category::Food);

    // The stored record matches what went in, with the assigned id.
    let listed = service.list_expenses(&ExpenseFilter::default()).await?;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, record.id);
    assert_eq!(listed[0].date, date("2024-01-05"));
    assert_eq!(listed[0].category, Category::Food);
    assert_eq!(listed[0].amount_cents, 2000);
    assert_eq!(listed[0].description, Some("team lunch".to_string()));

    Ok(())
}

#[tokio::test]
async fn test_ids_are_unique_and_increasing() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let first = service.add_expense(expense("2024-01-05", "Food", 100)).await?;
    let second = service.add_expense(expense("2024-01-05", "Food", 200)).await?;

    assert_ne!(first.id, second.id);
    assert!(second.id > first.id);

    Ok(())
}

#[tokio::test]
async fn test_get_expense_by_id() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let added = service
        .add_expense(expense("2024-03-02", "Transport", 350))
        .await?;
    let fetched = service.get_expense(added.id).await?;

    assert_eq!(fetched, added);

    Ok(())
}

#[tokio::test]
async fn test_get_unknown_id_is_not_found() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let err = service.get_expense(9999).await.unwrap_err();
    assert!(matches!(err, AppError::ExpenseNotFound(9999)));

    Ok(())
}

#[tokio::test]
async fn test_add_rejects_non_positive_amount() -> Result<()> {
    let (service, _temp) = test_service().await?;

    for bad_amount in [0, -500] {
        let err = service
            .add_expense(expense("2024-01-05", "Food", bad_amount))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidAmount(_)));
        assert!(err.is_validation());
    }

    // Nothing was persisted.
    let listed = service.list_expenses(&ExpenseFilter::default()).await?;
    assert!(listed.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_update_replaces_all_fields() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let added = service
        .add_expense(expense("2024-01-05", "Food", 2000))
        .await?;

    let updated = service
        .update_expense(
            added.id,
            expense("2024-01-06", "Entertainment", 2500).with_description("cinema"),
        )
        .await?;

    assert_eq!(updated.id, added.id);
    assert_eq!(updated.date, date("2024-01-06"));
    assert_eq!(updated.category, Category::Entertainment);
    assert_eq!(updated.amount_cents, 2500);

    // The change is visible on re-read.
    let fetched = service.get_expense(added.id).await?;
    assert_eq!(fetched, updated);

    Ok(())
}

#[tokio::test]
async fn test_update_with_invalid_amount_leaves_record_unchanged() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let added = service
        .add_expense(expense("2024-01-05", "Food", 2000))
        .await?;

    let err = service
        .update_expense(added.id, expense("2024-01-06", "Food", -500))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidAmount(_)));

    // Original record is untouched.
    let fetched = service.get_expense(added.id).await?;
    assert_eq!(fetched, added);

    Ok(())
}

#[tokio::test]
async fn test_update_unknown_id_is_not_found() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let err = service
        .update_expense(9999, expense("2024-01-05", "Food", 2000))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ExpenseNotFound(9999)));

    Ok(())
}

#[tokio::test]
async fn test_delete_removes_record_for_good() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let kept = service.add_expense(expense("2024-01-05", "Food", 2000)).await?;
    let doomed = service.add_expense(expense("2024-01-06", "Rent", 50000)).await?;

    let deleted = service.delete_expense(doomed.id).await?;
    assert_eq!(deleted, doomed);

    // Queries never return the deleted id again.
    let listed = service.list_expenses(&ExpenseFilter::default()).await?;
    assert_eq!(listed.len(), 1);
    assert!(listed.iter().all(|e| e.id != doomed.id));
    assert_eq!(listed[0].id, kept.id);

    let err = service.get_expense(doomed.id).await.unwrap_err();
    assert!(matches!(err, AppError::ExpenseNotFound(_)));

    Ok(())
}

#[tokio::test]
async fn test_delete_unknown_id_is_not_found_and_store_unchanged() -> Result<()> {
    let (service, _temp) = test_service().await?;

    service.add_expense(expense("2024-01-05", "Food", 2000)).await?;

    let err = service.delete_expense(9999).await.unwrap_err();
    assert!(matches!(err, AppError::ExpenseNotFound(9999)));

    let listed = service.list_expenses(&ExpenseFilter::default()).await?;
    assert_eq!(listed.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_records_persist_across_reconnect() -> Result<()> {
    let temp_dir = tempfile::TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let db_path = db_path.to_str().unwrap();

    let added = {
        let service = ExpenseService::init(db_path).await?;
        service
            .add_expense(expense("2024-01-05", "Food", 2000).with_description("persisted"))
            .await?
    };

    // A fresh connection sees the same data.
    let service = ExpenseService::connect(db_path).await?;
    let fetched = service.get_expense(added.id).await?;
    assert_eq!(fetched, added);

    Ok(())
}

#[tokio::test]
async fn test_custom_category_survives_round_trip() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let added = service
        .add_expense(expense("2024-02-14", "Office Supplies", 1299))
        .await?;

    let fetched = service.get_expense(added.id).await?;
    assert_eq!(
        fetched.category,
        Category::Other("Office Supplies".to_string())
    );

    Ok(())
}
