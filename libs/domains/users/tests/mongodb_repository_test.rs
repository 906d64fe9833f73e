//! MongoUserRepository against a single-node replica set (testcontainers).

#![cfg(feature = "mongodb")]

mod common;

use std::sync::Arc;

use domain_users::MongoUserRepository;
use test_utils::TestMongo;

/// Each scenario gets its own database so leftovers never leak between them.
async fn repository(mongo: &TestMongo, database: &str) -> Arc<MongoUserRepository> {
    let repository = MongoUserRepository::new(mongo.client(), database);
    repository.ensure_indexes().await.unwrap();
    Arc::new(repository)
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_mongodb_repository_contract() {
    let mongo = TestMongo::new().await;

    common::register_and_lookup(repository(&mongo, "lookup").await).await;
    common::register_duplicate_is_rejected(repository(&mongo, "duplicates").await).await;
    common::update_missing_user(repository(&mongo, "missing").await).await;
    common::update_persists_whole_aggregate(repository(&mongo, "aggregate").await).await;
    common::failed_update_rolls_back(repository(&mongo, "rollback").await).await;
    common::username_change_respects_uniqueness(repository(&mongo, "usernames").await).await;
    common::get_users_pages_by_join_date(repository(&mongo, "paging").await).await;
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_mongodb_concurrent_updates_retry_write_conflicts() {
    let mongo = TestMongo::new().await;
    common::concurrent_updates_do_not_lose_writes(repository(&mongo, "concurrency").await).await;
}
