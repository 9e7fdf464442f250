/**
 * API Route Handlers
 *
 * Public and authenticated routes of the `/api/v1` surface, except the
 * admin routes (see `admin_routes`).
 *
 * Routes that need a session are collected in their own router and wrapped
 * with `auth_middleware` through `route_layer`, so unmatched paths still
 * reach the 404 fallback instead of a 401. The two routers are merged; a
 * path may appear in both as long as the methods differ.
 *
 * ## Users
 * - `POST /users/signup`, `POST /users/login`, `POST /users/logout`
 * - `GET /users/search`, `GET /users/{username}`, `GET /users/user/{id}`
 * - `GET /users/{username}/followers`, `GET /users/{username}/followings`
 * - `GET /users/{username}/posts`, `GET /users/suggest/random`
 * - `PUT /users/user/{id}`, `PUT /users/{username}/follow` (auth)
 *
 * ## Posts and Comments
 * - `GET /posts/user/{username}`, `GET /posts/{id}`, `GET /comments/{postId}/comments`
 * - everything else under `/posts` and `/comments` (auth)
 *
 * ## Session and Realtime
 * - `GET /auth/me`, `GET /realtime/presence` (auth)
 */

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::backend::auth::handlers as auth;
use crate::backend::content::handlers as content;
use crate::backend::middleware::auth_middleware;
use crate::backend::realtime::presence_subscription;
use crate::backend::server::state::AppState;
use crate::backend::social::handlers as social;
use crate::backend::users::handlers as users;

/// Routes reachable without a session
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/users/signup", post(auth::signup))
        .route("/users/login", post(auth::login))
        .route("/users/logout", post(auth::logout))
        .route("/users/search", get(users::search_users))
        .route("/users/suggest/random", get(users::suggest_random))
        .route("/users/user/{id}", get(users::get_user))
        .route("/users/{username}", get(users::get_user_by_username))
        .route("/users/{username}/posts", get(users::get_posts_count))
        .route("/users/{username}/followers", get(social::get_followers))
        .route("/users/{username}/followings", get(social::get_followings))
        .route("/posts/user/{username}", get(content::posts_by_user))
        .route("/posts/{id}", get(content::get_post))
        .route("/comments/{post_id}/comments", get(content::get_comments))
}

/// Routes that require a valid session
pub fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/me", get(auth::get_me))
        .route("/users/user/{id}", put(users::update_user))
        .route("/users/{username}/follow", put(social::follow_unfollow))
        .route("/posts", post(content::create_post))
        .route("/posts/random", get(content::random_posts))
        .route("/posts/timeline", get(content::timeline))
        .route("/posts/{id}", put(content::update_post).delete(content::delete_post))
        .route("/posts/{id}/like", put(content::like_unlike))
        .route("/comments/{post_id}/comments", post(content::add_comment))
        .route("/realtime/presence", get(presence_subscription))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Public and protected routes merged, ready to nest under `/api/v1`
pub fn configure_api_routes(state: AppState) -> Router<AppState> {
    public_routes().merge(protected_routes(state))
}
