/**
 * Content Handlers
 *
 * Posts:
 * - `POST /posts` (auth, multipart `description` + `imgurl` file)
 * - `GET /posts/random?fetchedPostIds=` (auth)
 * - `GET /posts/timeline?page=&limit=` (auth)
 * - `GET /posts/user/{username}`, `GET /posts/{id}`
 * - `PUT /posts/{id}/like`, `PUT /posts/{id}`, `DELETE /posts/{id}` (auth)
 *
 * Comments:
 * - `POST /comments/{postId}/comments` (auth, JSON `{description}`)
 * - `GET /comments/{postId}/comments`
 */

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};

use crate::backend::content::{comments, feed, posts};
use crate::backend::error::BackendResult;
use crate::backend::extract::{ApiJson, ApiQuery, MultipartForm};
use crate::backend::middleware::AuthUser;
use crate::backend::server::state::AppState;
use crate::shared::models::Toggle;
use crate::shared::views::{CommentThread, CommentView, FeedPost, PostDetail, PostView, TimelinePage};
use crate::shared::ApiResponse;

/// Query key carrying ids the client already has
pub const FETCHED_POST_IDS: &str = "fetchedPostIds";

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct LikeResult {
    pub liked: bool,
    pub likes: usize,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub description: String,
}

pub async fn create_post(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    mut form: MultipartForm,
) -> BackendResult<(StatusCode, Json<ApiResponse<PostView>>)> {
    let description = form.text("description").map(str::to_string);
    let image = form.take_file("imgurl");

    let post = posts::create_post(&state.store, &state.media, actor.id, description, image).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(PostView::new(&post, state.base_url())).with_message("Post created successfully")),
    ))
}

pub async fn random_posts(
    State(state): State<AppState>,
    AuthUser(_actor): AuthUser,
    ApiQuery(params): ApiQuery<Vec<(String, String)>>,
) -> BackendResult<Json<ApiResponse<Vec<PostDetail>>>> {
    let excluded = feed::parse_excluded(
        params
            .iter()
            .filter(|(key, _)| key.trim_end_matches("[]") == FETCHED_POST_IDS)
            .map(|(_, value)| value.as_str()),
    );
    let threads = feed::random_posts(&state.store, &excluded).await?;
    Ok(Json(ApiResponse::success(PostDetail::list(&threads, state.base_url()))))
}

pub async fn timeline(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    ApiQuery(query): ApiQuery<feed::PageQuery>,
) -> BackendResult<Json<ApiResponse<TimelinePage>>> {
    let page = feed::Page::from_query(&query);
    let entries = feed::timeline(&state.store, actor.id, page).await?;
    let posts = FeedPost::list(&entries, state.base_url());
    Ok(Json(ApiResponse::success(TimelinePage {
        page: page.page,
        limit: page.limit,
        count: posts.len(),
        posts,
    })))
}

pub async fn posts_by_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> BackendResult<Json<ApiResponse<Vec<FeedPost>>>> {
    let entries = posts::posts_by_user(&state.store, &username).await?;
    Ok(Json(ApiResponse::success(FeedPost::list(&entries, state.base_url()))))
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> BackendResult<Json<ApiResponse<PostDetail>>> {
    let thread = posts::get_post(&state.store, &id).await?;
    Ok(Json(ApiResponse::success(PostDetail::new(&thread, state.base_url()))))
}

pub async fn like_unlike(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<String>,
) -> BackendResult<Json<ApiResponse<LikeResult>>> {
    let (toggle, post) = posts::like_unlike(&state.store, actor.id, &id).await?;
    let liked = toggle == Toggle::Added;
    let message = if liked { "Post liked" } else { "Post unliked" };
    Ok(Json(
        ApiResponse::success(LikeResult {
            liked,
            likes: post.likes.len(),
        })
        .with_message(message),
    ))
}

pub async fn update_post(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<posts::PostPatch>,
) -> BackendResult<Json<ApiResponse<PostView>>> {
    let post = posts::update_post(&state.store, &actor, &id, patch).await?;
    Ok(Json(
        ApiResponse::success(PostView::new(&post, state.base_url())).with_message("Post updated successfully"),
    ))
}

pub async fn delete_post(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<String>,
) -> BackendResult<Json<ApiResponse<()>>> {
    posts::delete_post(&state.store, &state.media, &actor, &id).await?;
    Ok(Json(ApiResponse::<()>::ok("Post deleted successfully")))
}

pub async fn add_comment(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(post_id): Path<String>,
    ApiJson(request): ApiJson<CommentRequest>,
) -> BackendResult<(StatusCode, Json<ApiResponse<CommentThread>>)> {
    let (post, entries) = comments::add_comment(&state.store, actor.id, &post_id, &request.description).await?;
    Ok((
        StatusCode::CREATED,
        Json(
            ApiResponse::success(CommentThread::new(&post, &entries, state.base_url()))
                .with_message("Comment added successfully"),
        ),
    ))
}

pub async fn get_comments(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> BackendResult<Json<ApiResponse<Vec<CommentView>>>> {
    let entries = comments::comments_for_post(&state.store, &post_id).await?;
    Ok(Json(ApiResponse::success(CommentView::list(&entries, state.base_url()))))
}
