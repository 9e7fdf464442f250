/**
 * Authentication Middleware
 *
 * This module provides middleware for protecting routes that require
 * user authentication. Every protected route goes through the same check:
 *
 * 1. Take the token from `Authorization: Bearer <token>`, or failing that
 *    from the `accessToken` cookie
 * 2. Verify signature and expiry
 * 3. Load the user; a token for a deleted user is rejected
 * 4. Attach `AuthenticatedUser` to the request extensions
 *
 * Any failure ends the request with 401 before the handler runs.
 */

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
        HeaderMap,
    },
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::backend::auth::sessions::token_from_cookie_header;
use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;
use crate::backend::store::Store;
use crate::shared::models::{Role, User};

/// Identity attached to a request by `auth_middleware`
#[derive(Clone, Debug, PartialEq)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl From<&User> for AuthenticatedUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
        }
    }
}

/// Bearer token first, then the session cookie
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .find_map(token_from_cookie_header)
        .map(str::to_string)
}

/// Authentication middleware
///
/// Returns 401 Unauthorized if the token is missing or invalid, or if its
/// user no longer exists.
pub async fn auth_middleware(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    let token = extract_token(request.headers()).ok_or_else(|| {
        tracing::warn!("Missing session token");
        BackendError::unauthorized("Unauthorized - No token provided")
    })?;

    let claims = app_state.sessions.verify(&token).map_err(|e| {
        tracing::warn!("Invalid token: {:?}", e);
        BackendError::unauthorized("Unauthorized - Invalid token")
    })?;

    let user_id = claims.user_id().map_err(|e| {
        tracing::warn!("Invalid user ID in token: {:?}", e);
        BackendError::unauthorized("Unauthorized - Invalid token")
    })?;

    let user = verify_user_exists(&app_state.store, user_id).await?;

    request
        .extensions_mut()
        .insert(AuthenticatedUser::from(&user));

    Ok(next.run(request).await)
}

/// Load the token's user, rejecting tokens that outlived their account
async fn verify_user_exists(store: &Store, user_id: Uuid) -> Result<User, BackendError> {
    store.user_by_id(user_id).await?.ok_or_else(|| {
        tracing::warn!("Token refers to a missing user: {}", user_id);
        BackendError::unauthorized("Unauthorized - User not found")
    })
}

/// Axum extractor for authenticated user
///
/// Reads the identity `auth_middleware` attached. Used as a handler argument
/// on protected routes.
#[derive(Clone, Debug)]
pub struct AuthUser(pub AuthenticatedUser);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = BackendError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| {
                tracing::warn!("AuthenticatedUser not found in request extensions");
                BackendError::unauthorized("Unauthorized")
            })?;

        Ok(AuthUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_token_prefers_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        headers.insert(COOKIE, HeaderValue::from_static("accessToken=from-cookie"));
        assert_eq!(extract_token(&headers).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_extract_token_falls_back_to_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; accessToken=abc"));
        assert_eq!(extract_token(&headers).as_deref(), Some("abc"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic xyz"));
        assert_eq!(extract_token(&headers).as_deref(), Some("abc"));
    }

    #[test]
    fn test_extract_token_missing() {
        assert_eq!(extract_token(&HeaderMap::new()), None);
    }

    #[tokio::test]
    async fn test_verify_user_exists() {
        let store = Store::memory();
        let user = User::new("alice".into(), "a@x.io".into(), "h".into(), Role::User);
        store.insert_user(&user).await.unwrap();

        assert_eq!(verify_user_exists(&store, user.id).await.unwrap().id, user.id);
        assert!(verify_user_exists(&store, Uuid::new_v4()).await.is_err());
    }
}
