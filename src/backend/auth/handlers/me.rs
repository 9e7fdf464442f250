/**
 * Get Current User Handler
 *
 * GET /api/v1/auth/me
 *
 * Returns the profile of the user whose token authenticated the request.
 * The password hash is never part of the response.
 */

use axum::{extract::State, response::Json};

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::views::UserProfile;
use crate::shared::ApiResponse;

pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(auth): AuthUser,
) -> BackendResult<Json<ApiResponse<UserProfile>>> {
    let user = state.store.user_by_id(auth.id).await?.ok_or_else(|| {
        tracing::warn!("User not found: {}", auth.id);
        BackendError::not_found("User not found")
    })?;

    Ok(Json(ApiResponse::success(UserProfile::new(&user, state.base_url()))))
}
