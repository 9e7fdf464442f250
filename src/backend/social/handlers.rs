/**
 * Follow Graph Handlers
 *
 * - `PUT /users/{username}/follow` (auth) - toggle the follow edge
 * - `GET /users/{username}/followers`
 * - `GET /users/{username}/followings`
 */

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};

use crate::backend::error::BackendResult;
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::backend::social::graph;
use crate::shared::models::Toggle;
use crate::shared::views::UserProfile;
use crate::shared::ApiResponse;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FollowAction {
    Followed,
    Unfollowed,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct FollowResult {
    pub action: FollowAction,
}

pub async fn follow_unfollow(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(username): Path<String>,
) -> BackendResult<Json<ApiResponse<FollowResult>>> {
    let (action, message) = match graph::follow_unfollow(&state.store, actor.id, &username).await? {
        Toggle::Added => (FollowAction::Followed, "User followed successfully"),
        Toggle::Removed => (FollowAction::Unfollowed, "User unfollowed successfully"),
    };
    Ok(Json(ApiResponse::success(FollowResult { action }).with_message(message)))
}

pub async fn get_followers(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> BackendResult<Json<ApiResponse<Vec<UserProfile>>>> {
    let users = graph::followers(&state.store, &username).await?;
    Ok(Json(ApiResponse::success(UserProfile::list(&users, state.base_url()))))
}

pub async fn get_followings(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> BackendResult<Json<ApiResponse<Vec<UserProfile>>>> {
    let users = graph::followings(&state.store, &username).await?;
    Ok(Json(ApiResponse::success(UserProfile::list(&users, state.base_url()))))
}
