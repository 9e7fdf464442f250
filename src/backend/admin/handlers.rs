/**
 * Admin Handlers
 *
 * Every route here sits behind `auth_middleware` and `admin_middleware`.
 * The handlers reuse the user, post and comment operations; for posts the
 * admin identity satisfies the owner-or-admin check, so admin deletes run
 * the same cascade as owner deletes.
 *
 * - `GET /admin/users`
 * - `GET|PUT|DELETE /admin/user/{id}`
 * - `GET /admin/user/{id}/posts`
 * - `PUT|DELETE /admin/post/{postId}`
 * - `GET|PUT|DELETE /admin/comment/{commentId}`
 *
 * Deleting a user removes only the user record.
 */

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Deserialize;

use crate::backend::content::{assemble, comments, posts};
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::extract::ApiJson;
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::backend::store::UserChanges;
use crate::backend::users::service;
use crate::shared::models::Role;
use crate::shared::validation::parse_id;
use crate::shared::views::{CommentView, PostDetail, PostView, UserProfile};
use crate::shared::ApiResponse;

/// Fields an admin may change on a user
#[derive(Debug, Default, Deserialize)]
pub struct AdminUserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize)]
pub struct CommentPatch {
    pub description: String,
}

pub async fn list_users(
    State(state): State<AppState>,
) -> BackendResult<Json<ApiResponse<Vec<UserProfile>>>> {
    let users = state.store.list_users().await?;
    Ok(Json(ApiResponse::success(UserProfile::list(&users, state.base_url()))))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> BackendResult<Json<ApiResponse<UserProfile>>> {
    let user = service::user_by_raw_id(&state.store, &id).await?;
    Ok(Json(ApiResponse::success(UserProfile::new(&user, state.base_url()))))
}

pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(admin): AuthUser,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<AdminUserPatch>,
) -> BackendResult<Json<ApiResponse<UserProfile>>> {
    let target = service::user_by_raw_id(&state.store, &id).await?;
    let changes = UserChanges {
        username: patch.username,
        email: patch.email,
        role: patch.role,
        profile_picture: None,
    };
    let user = service::apply_changes(&state.store, &target, changes).await?;
    tracing::info!("Admin {} updated user {}", admin.username, user.id);
    Ok(Json(
        ApiResponse::success(UserProfile::new(&user, state.base_url())).with_message("User updated successfully"),
    ))
}

pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(admin): AuthUser,
    Path(id): Path<String>,
) -> BackendResult<Json<ApiResponse<()>>> {
    let id = parse_id("user id", &id)?;
    if !state.store.delete_user(id).await? {
        return Err(BackendError::not_found("User not found"));
    }
    tracing::info!("Admin {} deleted user {}", admin.username, id);
    Ok(Json(ApiResponse::<()>::ok("User deleted successfully")))
}

pub async fn user_posts(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> BackendResult<Json<ApiResponse<Vec<PostDetail>>>> {
    let user = service::user_by_raw_id(&state.store, &id).await?;
    let user_posts = state.store.posts_by_authors(&[user.id], 0, None).await?;
    let threads = assemble::threads(&state.store, user_posts).await?;
    Ok(Json(ApiResponse::success(PostDetail::list(&threads, state.base_url()))))
}

pub async fn update_post(
    State(state): State<AppState>,
    AuthUser(admin): AuthUser,
    Path(post_id): Path<String>,
    ApiJson(patch): ApiJson<posts::PostPatch>,
) -> BackendResult<Json<ApiResponse<PostView>>> {
    let post = posts::update_post(&state.store, &admin, &post_id, patch).await?;
    Ok(Json(
        ApiResponse::success(PostView::new(&post, state.base_url())).with_message("Post updated successfully"),
    ))
}

pub async fn delete_post(
    State(state): State<AppState>,
    AuthUser(admin): AuthUser,
    Path(post_id): Path<String>,
) -> BackendResult<Json<ApiResponse<()>>> {
    posts::delete_post(&state.store, &state.media, &admin, &post_id).await?;
    Ok(Json(ApiResponse::<()>::ok("Post deleted successfully")))
}

pub async fn get_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
) -> BackendResult<Json<ApiResponse<CommentView>>> {
    let entry = comments::get_comment(&state.store, &comment_id).await?;
    Ok(Json(ApiResponse::success(CommentView::new(&entry, state.base_url()))))
}

pub async fn update_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
    ApiJson(patch): ApiJson<CommentPatch>,
) -> BackendResult<Json<ApiResponse<CommentView>>> {
    let comment = comments::update_comment(&state.store, &comment_id, &patch.description).await?;
    Ok(Json(
        ApiResponse::success(CommentView::bare(&comment)).with_message("Comment updated successfully"),
    ))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
) -> BackendResult<Json<ApiResponse<()>>> {
    comments::delete_comment(&state.store, &comment_id).await?;
    Ok(Json(ApiResponse::<()>::ok("Comment deleted successfully")))
}
