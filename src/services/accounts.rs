//! Identity store operations: registration, credential checks and tokens.

use thiserror::Error;
use tracing::{debug, info};

use crate::api::serializers::ProfileInput;
use crate::auth::{self, AuthError};
use crate::database::models::{NewUser, User, UserChanges};
use crate::database::store::{Store, EMAIL_TAKEN};
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::validation::{normalize_email, FieldErrors, REQUIRED};

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("invalid account data: {0:?}")]
    Invalid(FieldErrors),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<FieldErrors> for AccountError {
    fn from(errors: FieldErrors) -> Self {
        AccountError::Invalid(errors)
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::Invalid(errors) => ApiError::validation(errors),
            AccountError::Auth(e) => e.into(),
            AccountError::Database(e) => e.into(),
        }
    }
}

/// Reject an email that another account already holds
async fn ensure_email_free(store: &dyn Store, email: &str, except: Option<i64>) -> Result<(), AccountError> {
    match store.find_user_by_email(email).await? {
        Some(existing) if Some(existing.id) != except => {
            let mut errors = FieldErrors::new();
            errors.add("email", EMAIL_TAKEN);
            Err(AccountError::Invalid(errors))
        }
        _ => Ok(()),
    }
}

/// Argon2 is CPU-bound; keep it off the async workers
async fn hash_password(password: String) -> Result<String, AccountError> {
    let hashed = tokio::task::spawn_blocking(move || auth::hash_password(&password))
        .await
        .map_err(|e| AuthError::PasswordHash(e.to_string()))??;
    Ok(hashed)
}

async fn verify_password(password: &str, hash: &str) -> Result<bool, AccountError> {
    let (password, hash) = (password.to_string(), hash.to_string());
    let verified = tokio::task::spawn_blocking(move || auth::verify_password(&password, &hash))
        .await
        .map_err(|e| AuthError::PasswordHash(e.to_string()))?;
    Ok(verified)
}

/// Create an account from a fully validated profile input
pub async fn register(store: &dyn Store, input: ProfileInput, is_staff: bool) -> Result<User, AccountError> {
    let mut errors = FieldErrors::new();
    for (field, value) in [("email", &input.email), ("name", &input.name), ("password", &input.password)] {
        if value.is_none() {
            errors.add(field, REQUIRED);
        }
    }
    let (Some(email), Some(name), Some(password)) = (input.email, input.name, input.password) else {
        return Err(AccountError::Invalid(errors));
    };

    ensure_email_free(store, &email, None).await?;

    let user = store
        .insert_user(NewUser {
            email,
            name,
            password: hash_password(password).await?,
            is_staff,
        })
        .await?;

    info!(user_id = user.id, "Registered user");
    Ok(user)
}

/// Apply a (possibly partial) profile change, re-hashing any new password
pub async fn update_profile(store: &dyn Store, user_id: i64, input: ProfileInput) -> Result<User, AccountError> {
    if let Some(email) = input.email.as_deref() {
        ensure_email_free(store, email, Some(user_id)).await?;
    }

    let password = match input.password {
        Some(plain) => Some(hash_password(plain).await?),
        None => None,
    };

    let user = store
        .update_user(
            user_id,
            UserChanges {
                email: input.email,
                name: input.name,
                password,
            },
        )
        .await?;

    info!(user_id, "Updated profile");
    Ok(user)
}

/// Check an email/password pair. Inactive accounts never authenticate.
pub async fn authenticate(store: &dyn Store, email: &str, password: &str) -> Result<Option<User>, AccountError> {
    let email = normalize_email(email.trim());
    let Some(user) = store.find_user_by_email(&email).await? else {
        debug!("Login attempt for unknown email");
        return Ok(None);
    };

    if !user.is_active || !verify_password(password, &user.password).await? {
        debug!(user_id = user.id, "Login attempt rejected");
        return Ok(None);
    }

    Ok(Some(user))
}

/// Mint and persist a new token for `user`; the plaintext is returned once
pub async fn issue_token(store: &dyn Store, user: &User) -> Result<String, AccountError> {
    let token = auth::generate_token();
    store.insert_token(&auth::token_digest(&token), user.id).await?;
    info!(user_id = user.id, "Issued auth token");
    Ok(token)
}

/// Enable or disable an account by email. A disabled account cannot log in
/// and its existing tokens stop working.
pub async fn set_active(store: &dyn Store, email: &str, active: bool) -> Result<Option<User>, AccountError> {
    let email = normalize_email(email.trim());
    let Some(user) = store.find_user_by_email(&email).await? else {
        return Ok(None);
    };

    let user = store.set_active(user.id, active).await?;
    info!(user_id = user.id, active, "Changed account activity");
    Ok(Some(user))
}

/// Resolve a presented token to an active user
pub async fn resolve_token(store: &dyn Store, token: &str) -> Result<User, AuthError> {
    let user = store
        .user_for_token(&auth::token_digest(token))
        .await?
        .ok_or(AuthError::InvalidToken)?;

    if !user.is_active {
        return Err(AuthError::InactiveUser);
    }
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;

    fn input(email: &str, name: &str, password: &str) -> ProfileInput {
        ProfileInput {
            email: Some(email.to_string()),
            name: Some(name.to_string()),
            password: Some(password.to_string()),
        }
    }

    #[tokio::test]
    async fn register_hashes_password() {
        let store = MemoryStore::new();
        let user = register(&store, input("ada@example.com", "Ada", "pw"), false).await.unwrap();
        assert_ne!(user.password, "pw");
        assert!(auth::verify_password("pw", &user.password));
    }

    #[tokio::test]
    async fn register_rejects_taken_email() {
        let store = MemoryStore::new();
        register(&store, input("ada@example.com", "Ada", "pw"), false).await.unwrap();
        let err = register(&store, input("ada@example.com", "Imposter", "pw"), false)
            .await
            .unwrap_err();
        match err {
            AccountError::Invalid(errors) => {
                assert_eq!(errors.get("email").unwrap(), [EMAIL_TAKEN.to_string()])
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn register_requires_complete_input() {
        let store = MemoryStore::new();
        let partial = ProfileInput { name: Some("Ada".into()), ..Default::default() };
        assert!(matches!(
            register(&store, partial, false).await,
            Err(AccountError::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn authenticate_checks_password_and_activity() {
        let store = MemoryStore::new();
        register(&store, input("ada@example.com", "Ada", "pw"), false).await.unwrap();

        assert!(authenticate(&store, "ada@EXAMPLE.com", "pw").await.unwrap().is_some());
        assert!(authenticate(&store, "ada@example.com", "wrong").await.unwrap().is_none());
        assert!(authenticate(&store, "nobody@example.com", "pw").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn tokens_resolve_to_their_user() {
        let store = MemoryStore::new();
        let user = register(&store, input("ada@example.com", "Ada", "pw"), false).await.unwrap();
        let token = issue_token(&store, &user).await.unwrap();

        assert_eq!(resolve_token(&store, &token).await.unwrap().id, user.id);
        assert!(matches!(
            resolve_token(&store, "not-a-token").await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn update_profile_rehashes_password() {
        let store = MemoryStore::new();
        let user = register(&store, input("ada@example.com", "Ada", "pw"), false).await.unwrap();
        let changes = ProfileInput { password: Some("new-pw".into()), ..Default::default() };
        let updated = update_profile(&store, user.id, changes).await.unwrap();

        assert_eq!(updated.name, "Ada");
        assert!(auth::verify_password("new-pw", &updated.password));
        assert!(!auth::verify_password("pw", &updated.password));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn password_helpers_run_on_blocking_pool() {
        let hashed = hash_password("pw".to_string()).await.unwrap();
        assert!(auth::verify_password("pw", &hashed));
        assert!(verify_password("pw", &hashed).await.unwrap());
        assert!(!verify_password("other", &hashed).await.unwrap());
    }

    #[tokio::test]
    async fn deactivated_accounts_lose_access() {
        let store = MemoryStore::new();
        let user = register(&store, input("ada@example.com", "Ada", "pw"), false).await.unwrap();
        let token = issue_token(&store, &user).await.unwrap();

        let updated = set_active(&store, "ada@Example.com", false).await.unwrap().unwrap();
        assert!(!updated.is_active);

        assert!(authenticate(&store, "ada@example.com", "pw").await.unwrap().is_none());
        assert!(matches!(
            resolve_token(&store, &token).await,
            Err(AuthError::InactiveUser)
        ));

        set_active(&store, "ada@example.com", true).await.unwrap();
        assert!(authenticate(&store, "ada@example.com", "pw").await.unwrap().is_some());
        assert!(set_active(&store, "nobody@example.com", false).await.unwrap().is_none());
    }
}
