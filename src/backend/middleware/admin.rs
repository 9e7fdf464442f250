/**
 * Admin Middleware
 *
 * Layered after `auth_middleware` on the admin routes. The role attached by
 * authentication is read from the stored user on every request, so a
 * demoted admin loses access immediately.
 */

use axum::{extract::Request, middleware::Next, response::Response};

use crate::backend::error::BackendError;
use crate::backend::middleware::auth::AuthenticatedUser;

/// Returns 403 Forbidden unless the authenticated user is an admin
pub async fn admin_middleware(request: Request, next: Next) -> Result<Response, BackendError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .ok_or_else(|| BackendError::unauthorized("Unauthorized"))?;

    if !user.is_admin() {
        tracing::warn!("Non-admin {} attempted an admin route", user.username);
        return Err(BackendError::forbidden("Admin access required"));
    }

    Ok(next.run(request).await)
}
