//! Behavior every `Store` backend must share. Each backend's test module
//! instantiates the whole suite with `store_conformance_tests!`.

use chrono::{DateTime, Duration, Utc};

use parley_types::models::{Message, User};

use crate::error::StoreError;
use crate::store::Store;

/// Fixed base instant with sub-millisecond precision, so the round-trip
/// checks catch any truncation below microseconds.
pub(crate) fn at(offset_secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 123_456_000).unwrap() + Duration::seconds(offset_secs)
}

pub(crate) fn user(id: &str, email: &str) -> User {
    User {
        id: id.into(),
        email: email.into(),
        password_hash: format!("$argon2id$v=19$m=19456,t=2,p=1$salt${}", id),
        created_at: at(0),
        updated_at: at(0),
    }
}

pub(crate) fn message(id: &str, owner: &str, body: &str) -> Message {
    Message {
        id: id.into(),
        body: body.into(),
        owner_id: owner.into(),
        created_at: at(0),
        updated_at: at(0),
    }
}

macro_rules! store_conformance_tests {
    ($make:expr) => {
        $crate::conformance::store_conformance_tests!(@each $make;
            creates_and_reads_user,
            duplicate_email_conflicts_and_keeps_first,
            email_lookup_is_exact,
            missing_user_is_not_found,
            lists_users_in_creation_order,
            updates_user_credentials,
            update_to_taken_email_conflicts,
            deletes_user_physically,
            creates_and_reads_message,
            lists_messages_in_creation_order,
            owner_updates_message,
            other_owner_cannot_update_message,
            other_owner_cannot_delete_message,
            missing_message_is_not_found,
        );
    };
    (@each $make:expr; $($name:ident),* $(,)?) => {
        $(
            #[tokio::test]
            async fn $name() {
                let store = $make;
                $crate::conformance::$name(&store).await;
            }
        )*
    };
}
pub(crate) use store_conformance_tests;

// -- Users --

pub(crate) async fn creates_and_reads_user(store: &dyn Store) {
    let alice = user("u-1", "a@x.com");
    store.create_user(&alice).await.unwrap();

    assert_eq!(store.get_user("u-1").await.unwrap(), alice);
    assert_eq!(store.find_user_by_email("a@x.com").await.unwrap(), Some(alice));
}

pub(crate) async fn duplicate_email_conflicts_and_keeps_first(store: &dyn Store) {
    let first = user("u-1", "a@x.com");
    store.create_user(&first).await.unwrap();

    let err = store.create_user(&user("u-2", "a@x.com")).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)), "got {err:?}");

    assert_eq!(store.get_user("u-1").await.unwrap(), first);
    assert!(matches!(store.get_user("u-2").await, Err(StoreError::NotFound(_))));
    assert_eq!(store.list_users().await.unwrap().len(), 1);
}

pub(crate) async fn email_lookup_is_exact(store: &dyn Store) {
    store.create_user(&user("u-1", "a@x.com")).await.unwrap();

    assert!(store.find_user_by_email("A@x.com").await.unwrap().is_none());
    assert!(store.find_user_by_email("b@x.com").await.unwrap().is_none());

    // Emails are case-sensitive as stored, so this is a distinct account.
    store.create_user(&user("u-2", "A@x.com")).await.unwrap();
}

pub(crate) async fn missing_user_is_not_found(store: &dyn Store) {
    assert!(matches!(store.get_user("nope").await, Err(StoreError::NotFound(_))));
    assert!(matches!(
        store.update_user("nope", "a@x.com", "hash", at(5)).await,
        Err(StoreError::NotFound(_))
    ));
    assert!(matches!(store.delete_user("nope").await, Err(StoreError::NotFound(_))));
}

pub(crate) async fn lists_users_in_creation_order(store: &dyn Store) {
    assert!(store.list_users().await.unwrap().is_empty());

    let mut later = user("u-a", "later@x.com");
    later.created_at = at(60);
    let mut earlier = user("u-b", "earlier@x.com");
    earlier.created_at = at(-60);
    store.create_user(&later).await.unwrap();
    store.create_user(&earlier).await.unwrap();

    let ids: Vec<String> = store.list_users().await.unwrap().into_iter().map(|u| u.id).collect();
    assert_eq!(ids, ["u-b", "u-a"]);
}

pub(crate) async fn updates_user_credentials(store: &dyn Store) {
    store.create_user(&user("u-1", "a@x.com")).await.unwrap();

    let updated = store
        .update_user("u-1", "new@x.com", "new-hash", at(30))
        .await
        .unwrap();
    assert_eq!(updated.email, "new@x.com");
    assert_eq!(updated.password_hash, "new-hash");
    assert_eq!(updated.created_at, at(0));
    assert_eq!(updated.updated_at, at(30));

    assert_eq!(store.get_user("u-1").await.unwrap(), updated);
    assert!(store.find_user_by_email("a@x.com").await.unwrap().is_none());
}

pub(crate) async fn update_to_taken_email_conflicts(store: &dyn Store) {
    store.create_user(&user("u-1", "a@x.com")).await.unwrap();
    store.create_user(&user("u-2", "b@x.com")).await.unwrap();

    let err = store
        .update_user("u-2", "a@x.com", "hash", at(10))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)), "got {err:?}");
    assert_eq!(store.get_user("u-2").await.unwrap().email, "b@x.com");

    // Keeping your own email is not a conflict.
    store.update_user("u-2", "b@x.com", "hash", at(10)).await.unwrap();
}

pub(crate) async fn deletes_user_physically(store: &dyn Store) {
    store.create_user(&user("u-1", "a@x.com")).await.unwrap();
    store.delete_user("u-1").await.unwrap();

    assert!(matches!(store.get_user("u-1").await, Err(StoreError::NotFound(_))));
    assert!(matches!(store.delete_user("u-1").await, Err(StoreError::NotFound(_))));

    // The email is free again.
    store.create_user(&user("u-2", "a@x.com")).await.unwrap();
}

// -- Messages --

pub(crate) async fn creates_and_reads_message(store: &dyn Store) {
    let hi = message("m-1", "u-1", "hi");
    store.create_message(&hi).await.unwrap();

    assert_eq!(store.get_message("m-1").await.unwrap(), hi);
}

pub(crate) async fn lists_messages_in_creation_order(store: &dyn Store) {
    assert!(store.list_messages().await.unwrap().is_empty());

    let mut second = message("m-1", "u-1", "second");
    second.created_at = at(10);
    let mut first = message("m-2", "u-2", "first");
    first.created_at = at(-10);
    let mut tie = message("m-0", "u-1", "tie");
    tie.created_at = at(10);
    for m in [&second, &first, &tie] {
        store.create_message(m).await.unwrap();
    }

    let bodies: Vec<String> = store
        .list_messages()
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.body)
        .collect();
    assert_eq!(bodies, ["first", "tie", "second"]);
}

pub(crate) async fn owner_updates_message(store: &dyn Store) {
    store.create_message(&message("m-1", "u-1", "hi")).await.unwrap();

    let updated = store.update_message("m-1", "edited", "u-1", at(20)).await.unwrap();
    assert_eq!(updated.body, "edited");
    assert_eq!(updated.owner_id, "u-1");
    assert_eq!(updated.created_at, at(0));
    assert_eq!(updated.updated_at, at(20));
    assert_eq!(store.get_message("m-1").await.unwrap(), updated);
}

pub(crate) async fn other_owner_cannot_update_message(store: &dyn Store) {
    let original = message("m-1", "u-1", "hi");
    store.create_message(&original).await.unwrap();

    let err = store.update_message("m-1", "hijacked", "u-2", at(20)).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)), "got {err:?}");

    assert_eq!(store.get_message("m-1").await.unwrap(), original);
}

pub(crate) async fn other_owner_cannot_delete_message(store: &dyn Store) {
    store.create_message(&message("m-1", "u-1", "hi")).await.unwrap();

    let foreign = store.delete_message("m-1", "u-2").await.unwrap_err();
    let missing = store.delete_message("m-404", "u-1").await.unwrap_err();
    // Wrong owner and missing message are indistinguishable to the caller.
    assert!(matches!(foreign, StoreError::NotFound(_)));
    assert!(matches!(missing, StoreError::NotFound(_)));

    assert!(store.get_message("m-1").await.is_ok());
    store.delete_message("m-1", "u-1").await.unwrap();
    assert!(matches!(store.get_message("m-1").await, Err(StoreError::NotFound(_))));
}

pub(crate) async fn missing_message_is_not_found(store: &dyn Store) {
    assert!(matches!(store.get_message("nope").await, Err(StoreError::NotFound(_))));
    assert!(matches!(
        store.update_message("nope", "x", "u-1", at(1)).await,
        Err(StoreError::NotFound(_))
    ));
}
