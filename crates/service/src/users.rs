use tracing::debug;

use crate::errors::UserError;
use crate::storage::table::{StoreError, UserTable};
use models::user::User;

/// Fetch a single user by primary key. Absence surfaces as `NotFound`, never
/// as a zero-value record.
pub async fn fetch_user(table: &dyn UserTable, email: &str) -> Result<User, UserError> {
    let item = table.get_item(email).await.map_err(UserError::Fetch)?;
    let attrs = item.ok_or(UserError::NotFound)?;
    Ok(User::from_attributes(attrs)?)
}

/// Fetch every user, following the scan continuation key until the table is
/// exhausted. Results accumulate in page order.
pub async fn fetch_users(table: &dyn UserTable) -> Result<Vec<User>, UserError> {
    let mut users = Vec::new();
    let mut start_key: Option<String> = None;
    loop {
        let page = table
            .scan_page(start_key.as_deref())
            .await
            .map_err(UserError::Fetch)?;
        for attrs in page.items {
            users.push(User::from_attributes(attrs)?);
        }
        match page.last_evaluated_key {
            Some(key) => start_key = Some(key),
            None => break,
        }
    }
    debug!(count = users.len(), "scanned user table");
    Ok(users)
}

/// Create a user from a request body. The write succeeds only if no record
/// with that email exists yet.
pub async fn create_user(table: &dyn UserTable, body: &str) -> Result<User, UserError> {
    let user = User::parse(body)?;
    user.validate_email()?;
    let item = user.to_attributes()?;
    table
        .put_item_new(&user.email, item)
        .await
        .map_err(|e| match e {
            StoreError::ConditionFailed => UserError::AlreadyExists,
            other => UserError::Write(other),
        })?;
    Ok(user)
}

/// Update a user in place. Only the non-empty supplied fields overwrite
/// stored ones; the key attribute is never rewritten. The record must
/// already exist. Returns the post-update record as reported by the table.
pub async fn update_user(table: &dyn UserTable, body: &str) -> Result<User, UserError> {
    let user = User::parse(body)?;
    let mut changes = user.to_attributes()?;
    changes.remove("email");
    changes.retain(|_, value| value.as_str().map_or(true, |s| !s.is_empty()));

    let updated = table
        .update_item_existing(&user.email, changes)
        .await
        .map_err(|e| match e {
            StoreError::ConditionFailed => UserError::NotFound,
            other => UserError::Write(other),
        })?;
    Ok(User::from_attributes(updated)?)
}

/// Delete a user named by the request body. The record must exist.
pub async fn delete_user(table: &dyn UserTable, body: &str) -> Result<(), UserError> {
    let user = User::parse(body)?;
    table
        .delete_item_existing(&user.email)
        .await
        .map_err(|e| match e {
            StoreError::ConditionFailed => UserError::NotFound,
            other => UserError::Delete(other),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::JsonTableStore;
    use models::errors::ModelError;
    use std::sync::Arc;
    use uuid::Uuid;

    async fn table(page_size: usize) -> (Arc<JsonTableStore>, std::path::PathBuf) {
        let tmp = std::env::temp_dir().join(format!("users_svc_{}.json", Uuid::new_v4()));
        let store = JsonTableStore::new(&tmp, page_size).await.expect("store");
        (store, tmp)
    }

    #[tokio::test]
    async fn create_then_fetch_roundtrip() -> Result<(), anyhow::Error> {
        let (store, tmp) = table(100).await;

        let created = create_user(store.as_ref(), r#"{"email":"a@x.com","firstName":"A"}"#).await?;
        assert_eq!(created.email, "a@x.com");
        assert_eq!(created.first_name, "A");
        assert_eq!(created.last_name, "");

        let fetched = fetch_user(store.as_ref(), "a@x.com").await?;
        assert_eq!(fetched, created);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_create_rejected_and_first_record_kept() -> Result<(), anyhow::Error> {
        let (store, tmp) = table(100).await;

        create_user(store.as_ref(), r#"{"email":"a@x.com","firstName":"First"}"#).await?;
        let err = create_user(store.as_ref(), r#"{"email":"a@x.com","firstName":"Second"}"#).await;
        assert!(matches!(err, Err(UserError::AlreadyExists)));

        let kept = fetch_user(store.as_ref(), "a@x.com").await?;
        assert_eq!(kept.first_name, "First");

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn fetch_missing_user_is_not_found() -> Result<(), anyhow::Error> {
        let (store, tmp) = table(100).await;
        let err = fetch_user(store.as_ref(), "ghost@x.com").await;
        assert!(matches!(err, Err(UserError::NotFound)));
        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn update_missing_user_rejected_store_unchanged() -> Result<(), anyhow::Error> {
        let (store, tmp) = table(100).await;

        let err = update_user(store.as_ref(), r#"{"email":"ghost@x.com","firstName":"X"}"#).await;
        assert!(matches!(err, Err(UserError::NotFound)));
        assert!(fetch_users(store.as_ref()).await?.is_empty());

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn delete_missing_user_rejected_store_unchanged() -> Result<(), anyhow::Error> {
        let (store, tmp) = table(100).await;

        let err = delete_user(store.as_ref(), r#"{"email":"ghost@x.com"}"#).await;
        assert!(matches!(err, Err(UserError::NotFound)));
        assert!(fetch_users(store.as_ref()).await?.is_empty());

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn invalid_email_writes_nothing() -> Result<(), anyhow::Error> {
        let (store, tmp) = table(100).await;

        let err = create_user(store.as_ref(), r#"{"email":"not-an-email"}"#).await;
        assert!(matches!(err, Err(UserError::Model(ModelError::InvalidEmail))));
        assert!(fetch_users(store.as_ref()).await?.is_empty());

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn malformed_body_rejected() -> Result<(), anyhow::Error> {
        let (store, tmp) = table(100).await;

        for result in [
            create_user(store.as_ref(), "{oops").await.err(),
            update_user(store.as_ref(), "{oops").await.err(),
            delete_user(store.as_ref(), "{oops").await.err(),
        ] {
            assert!(matches!(
                result,
                Some(UserError::Model(ModelError::InvalidUserData(_)))
            ));
        }

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    // Pins the corrected update semantics: the change set is keyed by the
    // fields actually supplied, and empty fields never overwrite stored ones.
    #[tokio::test]
    async fn update_changes_only_supplied_fields() -> Result<(), anyhow::Error> {
        let (store, tmp) = table(100).await;

        create_user(
            store.as_ref(),
            r#"{"email":"a@x.com","firstName":"A","lastName":"Smith"}"#,
        )
        .await?;

        let updated = update_user(store.as_ref(), r#"{"email":"a@x.com","firstName":"B"}"#).await?;
        assert_eq!(updated.first_name, "B");
        assert_eq!(updated.last_name, "Smith");

        let stored = store.get_item("a@x.com").await?.unwrap();
        let mut keys: Vec<_> = stored.keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, ["email", "firstName", "lastName"]);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn empty_update_checks_existence_and_keeps_record() -> Result<(), anyhow::Error> {
        let (store, tmp) = table(100).await;

        create_user(
            store.as_ref(),
            r#"{"email":"a@x.com","firstName":"A","lastName":"Smith"}"#,
        )
        .await?;

        let unchanged = update_user(store.as_ref(), r#"{"email":"a@x.com"}"#).await?;
        assert_eq!(unchanged.first_name, "A");
        assert_eq!(unchanged.last_name, "Smith");

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn fetch_all_follows_continuation_across_pages() -> Result<(), anyhow::Error> {
        let (store, tmp) = table(2).await;

        for i in 0..5 {
            let body = format!(r#"{{"email":"user{i}@x.com","firstName":"U{i}"}}"#);
            create_user(store.as_ref(), &body).await?;
        }
        delete_user(store.as_ref(), r#"{"email":"user3@x.com"}"#).await?;

        let all = fetch_users(store.as_ref()).await?;
        let mut emails: Vec<_> = all.iter().map(|u| u.email.clone()).collect();
        emails.sort();
        emails.dedup();
        assert_eq!(
            emails,
            ["user0@x.com", "user1@x.com", "user2@x.com", "user4@x.com"]
        );

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }
}
