//! Database integration tests.
//!
//! These tests exercise the real schema against a running `PostgreSQL`
//! instance, in particular the referential actions the migrations declare.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Connection parameters come from the `TEST_DB_*` environment variables
//! (see `reportd_db::test_utils`).

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use reportd_db::entities::user::Role;
use reportd_db::repositories::{ReportRepository, UserRepository};
use reportd_db::test_utils::{
    TestDatabase, seed_attachment, seed_history, seed_report, seed_staff,
};

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_migrations_apply() {
    let db = TestDatabase::create().await.expect("Failed to create");
    db.drop_database().await.expect("Failed to drop");
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_report_round_trip() {
    let db = TestDatabase::create().await.expect("Failed to create");
    let conn = Arc::clone(&db.conn);

    let staff = seed_staff(db.connection(), "ext-mod", Role::Moderator).await.unwrap();
    let report = seed_report(db.connection(), Some("ext-100"), Some(staff.id))
        .await
        .unwrap();

    let repo = ReportRepository::new(conn);
    let found = repo.get(report.id).await.unwrap();
    assert_eq!(found.reporter_external_id.as_deref(), Some("ext-100"));
    assert_eq!(found.handled_by, Some(staff.id));

    db.drop_database().await.expect("Failed to drop");
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_history_and_attachments_cascade_with_report() {
    let db = TestDatabase::create().await.expect("Failed to create");
    let conn = Arc::clone(&db.conn);

    let report = seed_report(db.connection(), Some("ext-100"), None).await.unwrap();
    seed_history(db.connection(), report.id, None).await.unwrap();
    seed_attachment(db.connection(), report.id).await.unwrap();

    let repo = ReportRepository::new(conn);
    assert_eq!(repo.history_for(report.id).await.unwrap().len(), 1);
    assert_eq!(repo.attachments_for(report.id).await.unwrap().len(), 1);

    repo.delete(report.id).await.unwrap();

    // Child rows go with the report.
    assert!(repo.history_for(report.id).await.unwrap().is_empty());
    assert!(repo.attachments_for(report.id).await.unwrap().is_empty());

    db.drop_database().await.expect("Failed to drop");
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_user_delete_nulls_references() {
    let db = TestDatabase::create().await.expect("Failed to create");
    let conn = Arc::clone(&db.conn);

    let staff = seed_staff(db.connection(), "ext-mod", Role::Moderator).await.unwrap();
    let report = seed_report(db.connection(), Some("ext-100"), Some(staff.id))
        .await
        .unwrap();
    seed_history(db.connection(), report.id, Some(staff.id)).await.unwrap();

    let users = UserRepository::new(Arc::clone(&conn));
    users.delete(staff.id).await.unwrap();

    // The report and its history survive the handler's deletion with the
    // staff references nulled out.
    let reports = ReportRepository::new(conn);
    let survived = reports.get(report.id).await.unwrap();
    assert_eq!(survived.handled_by, None);

    let history = reports.history_for(report.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].changed_by, None);

    db.drop_database().await.expect("Failed to drop");
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_cleanup_empties_domain_tables() {
    let db = TestDatabase::create().await.expect("Failed to create");
    let conn = Arc::clone(&db.conn);

    seed_report(db.connection(), Some("ext-100"), None).await.unwrap();
    db.cleanup().await.unwrap();

    let repo = ReportRepository::new(conn);
    assert_eq!(repo.count_all().await.unwrap(), 0);

    db.drop_database().await.expect("Failed to drop");
}
