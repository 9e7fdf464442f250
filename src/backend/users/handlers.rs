/**
 * User Directory Handlers
 *
 * - `GET /users/search?query=` - `*` lists everyone
 * - `GET /users/{username}` and `GET /users/user/{id}`
 * - `GET /users/{username}/posts` - post count
 * - `GET /users/suggest/random`
 * - `PUT /users/user/{id}` - multipart profile update (auth)
 */

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};

use crate::backend::error::BackendResult;
use crate::backend::extract::{ApiQuery, MultipartForm};
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::backend::users::service::{self, ProfileUpdate};
use crate::shared::views::UserProfile;
use crate::shared::ApiResponse;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct PostsCount {
    pub posts_count: usize,
}

pub async fn search_users(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<SearchQuery>,
) -> BackendResult<Json<ApiResponse<Vec<UserProfile>>>> {
    let users = service::search(&state.store, params.query.as_deref()).await?;
    Ok(Json(ApiResponse::success(UserProfile::list(&users, state.base_url()))))
}

pub async fn get_user_by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> BackendResult<Json<ApiResponse<UserProfile>>> {
    let user = service::user_by_username(&state.store, &username).await?;
    Ok(Json(ApiResponse::success(UserProfile::new(&user, state.base_url()))))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> BackendResult<Json<ApiResponse<UserProfile>>> {
    let user = service::user_by_raw_id(&state.store, &id).await?;
    Ok(Json(ApiResponse::success(UserProfile::new(&user, state.base_url()))))
}

pub async fn get_posts_count(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> BackendResult<Json<ApiResponse<PostsCount>>> {
    let posts_count = service::posts_count(&state.store, &username).await?;
    Ok(Json(ApiResponse::success(PostsCount { posts_count })))
}

pub async fn suggest_random(
    State(state): State<AppState>,
) -> BackendResult<Json<ApiResponse<Vec<UserProfile>>>> {
    let users = service::suggest_random(&state.store).await?;
    Ok(Json(ApiResponse::success(UserProfile::list(&users, state.base_url()))))
}

pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<String>,
    mut form: MultipartForm,
) -> BackendResult<Json<ApiResponse<UserProfile>>> {
    let update = ProfileUpdate {
        username: form.text("username").map(str::to_string),
        email: form.text("email").map(str::to_string),
        profile_picture: form.take_file("profile_picture"),
    };

    let user = service::update_profile(&state.store, &state.media, &actor, &id, update).await?;
    Ok(Json(
        ApiResponse::success(UserProfile::new(&user, state.base_url()))
            .with_message("User updated successfully"),
    ))
}
