use axum::Router;
use tracing::{debug, info};

use crate::state::AppState;

mod dto;
pub(crate) mod extractors;
pub mod handlers;
pub(crate) mod jwt;
mod password;
pub mod repo;
mod repo_types;

pub use extractors::{AdminUser, CurrentUser};
pub use repo_types::Role;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}

/// Ensure the configured administrator exists. Never overwrites an
/// existing user with the same email.
pub async fn seed_admin(state: &AppState) -> anyhow::Result<()> {
    let Some(seed) = state.config.admin_seed.as_ref() else {
        return Ok(());
    };

    if repo_types::User::find_by_email(&state.db, &seed.email)
        .await?
        .is_some()
    {
        debug!(email = %seed.email, "admin user already present");
        return Ok(());
    }

    let hash = password::hash_password(&seed.password)?;
    let user =
        repo_types::User::create(&state.db, &seed.name, &seed.email, &hash, Role::Admin).await?;
    info!(user_id = %user.id, email = %user.email, "admin user seeded");
    Ok(())
}
