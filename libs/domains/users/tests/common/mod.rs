//! Scenarios shared by the adapter integration tests.
//!
//! Each adapter test file starts its container and runs these against a
//! fresh repository, so every storage engine is held to the same contract.

use std::sync::Arc;
use std::time::Duration;

use domain_users::{
    GetUsersOptions, Role, SortDirection, User, UserError, UserReadModelRepository, UserRepository,
};
use test_utils::TestDataBuilder;
use test_utils::assertions::{assert_err, assert_some};

pub trait Store: UserRepository + UserReadModelRepository + 'static {}

impl<S: UserRepository + UserReadModelRepository + 'static> Store for S {}

fn user(data: &TestDataBuilder, n: u64, name: &str) -> User {
    User::new(data.user_id(n), data.email(name), data.username(name), Role::Regular).unwrap()
}

pub async fn register_and_lookup(store: Arc<impl Store>) {
    let data = TestDataBuilder::from_test_name("register_and_lookup");
    let alice = user(&data, 1, "alice");
    let id = alice.id().to_string();
    store.register(alice).await.unwrap();

    let by_id = store.get_by_id(&id).await.unwrap();
    assert_eq!(by_id.username, data.username("alice"));
    assert_eq!(by_id.role, Role::Regular);
    assert_eq!(by_id.reputation.score, 0);

    let by_email = store
        .get_by_email(&data.email("alice").to_uppercase())
        .await
        .unwrap();
    assert_eq!(by_email.id, id);

    let by_username = store.get_by_username(&data.username("alice")).await.unwrap();
    assert_eq!(by_username.email, data.email("alice"));

    let missing = assert_err(store.get_by_id(&data.user_id(99)).await, "unknown id");
    assert!(missing.is_not_found());
}

pub async fn register_duplicate_is_rejected(store: Arc<impl Store>) {
    let data = TestDataBuilder::from_test_name("register_duplicate_is_rejected");
    store.register(user(&data, 1, "bob")).await.unwrap();

    let same_email =
        User::new(data.user_id(2), data.email("bob"), "someone_else", Role::Regular).unwrap();
    assert_eq!(store.register(same_email).await, Err(UserError::AlreadyExists));

    let same_username =
        User::new(data.user_id(3), "other@example.com", data.username("bob"), Role::Regular)
            .unwrap();
    assert_eq!(
        store.register(same_username).await,
        Err(UserError::AlreadyExists)
    );
}

pub async fn update_missing_user(store: Arc<impl Store>) {
    let data = TestDataBuilder::from_test_name("update_missing_user");
    let id = data.user_id(1);

    let result = store.update(&id, Box::new(|u| u.award_badge("never"))).await;
    assert_eq!(result, Err(UserError::NotFound(id)));
}

pub async fn update_persists_whole_aggregate(store: Arc<impl Store>) {
    let data = TestDataBuilder::from_test_name("update_persists_whole_aggregate");
    let carol = user(&data, 1, "carol");
    let id = carol.id().to_string();
    store.register(carol).await.unwrap();

    store
        .update(
            &id,
            Box::new(|u| {
                u.make_moderator()?;
                u.award_badge("helper")?;
                u.increment_reputation_score_by(15)?;
                u.ban("spam", true, None)
            }),
        )
        .await
        .unwrap();

    let read = store.get_by_id(&id).await.unwrap();
    assert_eq!(read.role, Role::Moderator);
    assert_eq!(read.reputation.badges, ["helper".to_string()]);
    assert_eq!(read.reputation.score, 15);
    assert!(read.ban_status.is_banned);
    assert!(read.ban_status.is_indefinite);
    assert_eq!(read.ban_status.reason, "spam");
    assert!(read.ban_status.banned_at.is_some());
    assert!(read.updated_at >= read.joined_at);
}

pub async fn failed_update_rolls_back(store: Arc<impl Store>) {
    let data = TestDataBuilder::from_test_name("failed_update_rolls_back");
    let dave = user(&data, 1, "dave");
    let id = dave.id().to_string();
    store.register(dave).await.unwrap();

    let result = store
        .update(
            &id,
            Box::new(|u| {
                u.award_badge("partial")?;
                u.make_regular()
            }),
        )
        .await;
    assert!(matches!(result, Err(UserError::AlreadyHasRole { .. })));

    let read = store.get_by_id(&id).await.unwrap();
    assert!(read.reputation.badges.is_empty());
}

pub async fn username_change_respects_uniqueness(store: Arc<impl Store>) {
    let data = TestDataBuilder::from_test_name("username_change_respects_uniqueness");
    store.register(user(&data, 1, "erin")).await.unwrap();
    let frank = user(&data, 2, "frank");
    let frank_id = frank.id().to_string();
    store.register(frank).await.unwrap();

    let taken = data.username("erin");
    let result = store
        .update(&frank_id, Box::new(move |u| u.change_username(taken.clone())))
        .await;
    assert_eq!(result, Err(UserError::AlreadyExists));

    let read = store.get_by_id(&frank_id).await.unwrap();
    assert_eq!(read.username, data.username("frank"));
}

pub async fn concurrent_updates_do_not_lose_writes(store: Arc<impl Store>) {
    let data = TestDataBuilder::from_test_name("concurrent_updates_do_not_lose_writes");
    let grace = user(&data, 1, "grace");
    let id = grace.id().to_string();
    store.register(grace).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..8 {
        let store = store.clone();
        let id = id.clone();
        handles.push(tokio::spawn(async move {
            let badge = format!("badge-{i}");
            store
                .update(&id, Box::new(move |u| u.award_badge(badge.clone())))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let read = store.get_by_id(&id).await.unwrap();
    assert_eq!(read.reputation.badges.len(), 8);
}

pub async fn get_users_pages_by_join_date(store: Arc<impl Store>) {
    let data = TestDataBuilder::from_test_name("get_users_pages_by_join_date");
    for (n, name) in [(1, "u1"), (2, "u2"), (3, "u3")] {
        store.register(user(&data, n, name)).await.unwrap();
        // Distinct join dates even at millisecond storage precision.
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let (first, has_next) = store.get_users(&GetUsersOptions::new(2)).await.unwrap();
    assert!(has_next);
    let names: Vec<_> = first.iter().map(|u| u.username.clone()).collect();
    assert_eq!(names, [data.username("u3"), data.username("u2")]);

    let last = assert_some(first.last(), "first page");
    let (second, has_next) = store
        .get_users(&GetUsersOptions::new(2).after(Some(last.joined_at)))
        .await
        .unwrap();
    assert!(!has_next);
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].username, data.username("u1"));

    let (ascending, _) = store
        .get_users(&GetUsersOptions::new(10).sort(SortDirection::Asc))
        .await
        .unwrap();
    assert_eq!(ascending[0].username, data.username("u1"));

    let (everything, has_next) = store
        .get_users(&GetUsersOptions::new(u64::MAX))
        .await
        .unwrap();
    assert!(!has_next);
    assert_eq!(everything.len(), 3);

    let (single, has_next) = store.get_users(&GetUsersOptions::new(0)).await.unwrap();
    assert!(has_next);
    assert_eq!(single.len(), 1);
}
