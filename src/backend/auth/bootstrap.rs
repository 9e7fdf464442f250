/**
 * Admin Bootstrap
 *
 * Creates the first admin account. Run from the `gogo-create-admin` binary,
 * never from a request handler. If any admin already exists the call does
 * nothing, so it is safe to run on every deploy.
 */

use crate::backend::auth::password::PasswordHasher;
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::server::config::AdminBootstrap;
use crate::backend::store::Store;
use crate::shared::models::{Role, User};
use crate::shared::validation::{validate_email, validate_password, validate_username};

#[derive(Debug, Clone, PartialEq)]
pub enum BootstrapOutcome {
    /// An admin already existed; nothing was written
    AlreadyPresent,
    Created(User),
}

pub async fn ensure_admin(
    store: &Store,
    passwords: &PasswordHasher,
    admin: &AdminBootstrap,
) -> BackendResult<BootstrapOutcome> {
    if store.admin_exists().await? {
        tracing::info!("Admin user already exists, skipping bootstrap");
        return Ok(BootstrapOutcome::AlreadyPresent);
    }

    let password = admin.password.as_deref().ok_or_else(|| {
        BackendError::invalid_argument("ADMIN_PASSWORD must be set to create the admin user")
    })?;
    validate_username(&admin.username)?;
    validate_email(&admin.email)?;
    validate_password(password)?;

    let hash = passwords.hash_blocking(password).await?;
    let user = User::new(admin.username.clone(), admin.email.clone(), hash, Role::Admin);
    let user = store.insert_user(&user).await?;

    tracing::info!("Admin user created: {} ({})", user.username, user.id);
    Ok(BootstrapOutcome::Created(user))
}
