/**
 * Signup Handler
 *
 * POST /api/v1/users/signup
 *
 * # Registration Process
 *
 * 1. Validate username, email and password
 * 2. Reject a taken username with 409
 * 3. Hash the password with bcrypt
 * 4. Store the user with role `user`
 *
 * The store's unique constraint backs up step 2 when two signups race for
 * the same name.
 */

use axum::{extract::State, http::StatusCode, response::Json};

use crate::backend::auth::handlers::types::{AccountSummary, SignupRequest};
use crate::backend::auth::password::PasswordHasher;
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::extract::ApiJson;
use crate::backend::server::state::AppState;
use crate::backend::store::Store;
use crate::shared::models::{Role, User};
use crate::shared::validation::{validate_email, validate_password, validate_username};
use crate::shared::ApiResponse;

/// Create a regular user account
pub async fn register(
    store: &Store,
    passwords: &PasswordHasher,
    request: SignupRequest,
) -> BackendResult<User> {
    let username = request.username.trim();
    let email = request.email.trim();
    validate_username(username)?;
    validate_email(email)?;
    validate_password(&request.password)?;

    if store.user_by_username(username).await?.is_some() {
        tracing::warn!("Signup rejected, username taken: {}", username);
        return Err(BackendError::conflict("Username already exists"));
    }

    let password_hash = passwords.hash_blocking(&request.password).await?;
    let user = User::new(username.to_string(), email.to_string(), password_hash, Role::User);
    let user = store.insert_user(&user).await?;

    tracing::info!("User created successfully: {} ({})", user.username, user.id);
    Ok(user)
}

pub async fn signup(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SignupRequest>,
) -> BackendResult<(StatusCode, Json<ApiResponse<AccountSummary>>)> {
    tracing::info!("Signup request for username: {}", request.username);
    let user = register(&state.store, &state.passwords, request).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(AccountSummary::from(&user)).with_message("User registered successfully")),
    ))
}
