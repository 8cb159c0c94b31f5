use backoffice_application::{PasswordHasher, UserDirectory};
use backoffice_core::{AppResult, UserId};
use backoffice_domain::{AdminUser, EmailAddress};
use chrono::Utc;
use tracing::info;

use crate::api_services::ApiServices;

pub const DEV_SEED_ADMIN_EMAIL: &str = "admin@backoffice.local";
pub const DEV_SEED_EDITOR_EMAIL: &str = "editor@backoffice.local";
pub const DEV_SEED_PASSWORD: &str = "admin";

/// Creates the development accounts that do not exist yet.
pub async fn run(services: &ApiServices) -> AppResult<()> {
    let users = services.user_directory.as_ref();
    let hasher = services.password_hasher.as_ref();

    ensure_seed_user(users, hasher, DEV_SEED_ADMIN_EMAIL, "admin").await?;
    ensure_seed_user(users, hasher, DEV_SEED_EDITOR_EMAIL, "editor").await?;

    info!("development seed applied");
    Ok(())
}

async fn ensure_seed_user(
    users: &dyn UserDirectory,
    hasher: &dyn PasswordHasher,
    email: &str,
    role: &str,
) -> AppResult<()> {
    let email = EmailAddress::new(email)?;
    if users.find_by_email(&email).await?.is_some() {
        return Ok(());
    }

    let password_hash = hasher.hash_password(DEV_SEED_PASSWORD)?;
    let user = AdminUser::new(UserId::new(), email, role, password_hash, Utc::now());
    users.save(&user).await?;

    info!(email = %user.email().as_str(), role, "seeded admin user");
    Ok(())
}
