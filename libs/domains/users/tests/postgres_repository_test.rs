//! PgUserRepository against a real PostgreSQL (testcontainers).

#![cfg(feature = "postgres")]

mod common;

use std::sync::Arc;

use domain_users::PgUserRepository;
use test_utils::TestDatabase;

async fn repository(db: &TestDatabase) -> Arc<PgUserRepository> {
    db.truncate_users().await;
    Arc::new(PgUserRepository::new(db.connection()))
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_postgres_repository_contract() {
    let db = TestDatabase::new().await;

    common::register_and_lookup(repository(&db).await).await;
    common::register_duplicate_is_rejected(repository(&db).await).await;
    common::update_missing_user(repository(&db).await).await;
    common::update_persists_whole_aggregate(repository(&db).await).await;
    common::failed_update_rolls_back(repository(&db).await).await;
    common::username_change_respects_uniqueness(repository(&db).await).await;
    common::get_users_pages_by_join_date(repository(&db).await).await;
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_postgres_concurrent_updates_serialize_on_row_lock() {
    let db = TestDatabase::new().await;
    common::concurrent_updates_do_not_lose_writes(repository(&db).await).await;
}
