//! Startup seeding of the first admin account.

use storefront_core::roles::ROLE_ADMIN;
use storefront_core::validation::normalize_email;
use storefront_db::models::admin_user::NewAdminUser;
use storefront_db::store::UserStore;

use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::config::AdminSeed;
use crate::error::{AppError, AppResult};

/// Create the configured admin unless a user with that email exists.
/// Returns whether a user was created.
pub async fn ensure_admin(users: &dyn UserStore, seed: &AdminSeed) -> AppResult<bool> {
    let email = normalize_email(&seed.email)?;
    if users.find_user_by_email(&email).await?.is_some() {
        return Ok(false);
    }

    validate_password_strength(&seed.password, MIN_PASSWORD_LENGTH)
        .map_err(AppError::BadRequest)?;
    let password_hash = hash_password(&seed.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = users
        .insert_user(&NewAdminUser {
            email,
            name: seed.name.trim().to_string(),
            password_hash,
            role: ROLE_ADMIN.to_string(),
        })
        .await?;
    tracing::info!(user_id = user.id, email = %user.email, "Seeded admin user");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use storefront_db::store::MemoryStore;

    use super::*;

    fn seed(password: &str) -> AdminSeed {
        AdminSeed {
            email: " Admin@Shop.test ".into(),
            password: password.into(),
            name: "Admin".into(),
        }
    }

    #[tokio::test]
    async fn seeds_once() {
        let store = MemoryStore::new();
        assert!(ensure_admin(&store, &seed("long-enough-pw")).await.unwrap());
        assert!(!ensure_admin(&store, &seed("long-enough-pw")).await.unwrap());
        assert_eq!(store.count_users().await.unwrap(), 1);

        let user = store
            .find_user_by_email("admin@shop.test")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.role, ROLE_ADMIN);
    }

    #[tokio::test]
    async fn rejects_short_password() {
        let store = MemoryStore::new();
        assert_matches!(
            ensure_admin(&store, &seed("short")).await,
            Err(AppError::BadRequest(_))
        );
        assert_eq!(store.count_users().await.unwrap(), 0);
    }
}
