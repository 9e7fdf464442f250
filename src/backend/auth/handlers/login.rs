/**
 * Login and Logout Handlers
 *
 * POST /api/v1/users/login and POST /api/v1/users/logout
 *
 * # Authentication Process
 *
 * 1. Look up user by username
 * 2. Verify password using bcrypt
 * 3. Issue a JWT and set it as the `accessToken` cookie
 * 4. Return token and account info
 *
 * # Security
 *
 * - Unknown user and wrong password get the same 401 message
 * - An unknown user still costs one bcrypt verification
 * - The two cases are only distinguished in the server log
 * - Logout clears the cookie; tokens are stateless and stay valid until
 *   they expire
 */

use axum::{
    extract::State,
    http::header::SET_COOKIE,
    response::{IntoResponse, Json},
};

use crate::backend::auth::handlers::types::{AccountSummary, AuthResponse, LoginRequest};
use crate::backend::auth::password::PasswordHasher;
use crate::backend::auth::sessions::SessionManager;
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::extract::ApiJson;
use crate::backend::server::state::AppState;
use crate::backend::store::Store;
use crate::shared::models::User;
use crate::shared::ApiResponse;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// Check a username/password pair
pub async fn authenticate(
    store: &Store,
    passwords: &PasswordHasher,
    username: &str,
    password: &str,
) -> BackendResult<User> {
    let Some(user) = store.user_by_username(username.trim()).await? else {
        passwords.verify_dummy_blocking(password).await?;
        tracing::warn!("Login failed, user not found: {}", username);
        return Err(BackendError::unauthorized(INVALID_CREDENTIALS));
    };

    if !passwords.verify_blocking(password, &user.password_hash).await? {
        tracing::warn!("Login failed, invalid password for user: {}", username);
        return Err(BackendError::unauthorized(INVALID_CREDENTIALS));
    }

    Ok(user)
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> BackendResult<impl IntoResponse> {
    tracing::info!("Login request for: {}", request.username);

    let user = authenticate(&state.store, &state.passwords, &request.username, &request.password).await?;
    let token = state.sessions.issue(&user)?;
    let cookie = state.sessions.session_cookie(&token);

    tracing::info!("User logged in successfully: {} ({})", user.username, user.id);

    let body = ApiResponse::success(AuthResponse {
        token,
        user: AccountSummary::from(&user),
    })
    .with_message("Login successful");
    Ok(([(SET_COOKIE, cookie)], Json(body)))
}

pub async fn logout() -> impl IntoResponse {
    (
        [(SET_COOKIE, SessionManager::clear_cookie())],
        Json(ApiResponse::<()>::ok("Logout successful")),
    )
}
