//! Admin routes, nested under `/api/v1/admin`.
//!
//! `auth_middleware` runs first (outer layer) and attaches the identity that
//! `admin_middleware` then checks for the admin role.

use axum::{
    middleware,
    routing::{get, put},
    Router,
};

use crate::backend::admin::handlers as admin;
use crate::backend::middleware::{admin_middleware, auth_middleware};
use crate::backend::server::state::AppState;

pub fn configure_admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::list_users))
        .route(
            "/user/{id}",
            get(admin::get_user).put(admin::update_user).delete(admin::delete_user),
        )
        .route("/user/{id}/posts", get(admin::user_posts))
        .route("/post/{post_id}", put(admin::update_post).delete(admin::delete_post))
        .route(
            "/comment/{comment_id}",
            get(admin::get_comment)
                .put(admin::update_comment)
                .delete(admin::delete_comment),
        )
        .route_layer(middleware::from_fn(admin_middleware))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
