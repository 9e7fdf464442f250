/**
 * Follow Graph
 *
 * A follow edge `A -> B` is stored on both users: `B` in `A.followings` and
 * `A` in `B.followers`. Both sides are always written by one store
 * operation, so the two lists never disagree.
 *
 * The acting user always comes from the verified session.
 */

use uuid::Uuid;

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::store::{order_by_ids, Store};
use crate::backend::users::service::{user_by_id, user_by_username};
use crate::shared::models::{Toggle, User};

/// Follow `target_username` if `actor` does not follow them yet, otherwise
/// unfollow. Returns what happened.
pub async fn follow_unfollow(
    store: &Store,
    actor: Uuid,
    target_username: &str,
) -> BackendResult<Toggle> {
    let target = user_by_username(store, target_username).await?;
    let acting = user_by_id(store, actor).await?;

    if acting.id == target.id {
        tracing::warn!("User {} attempted to follow themselves", acting.username);
        return Err(BackendError::invalid_operation("You cannot follow yourself"));
    }

    let toggle = store
        .toggle_follow(acting.id, target.id)
        .await?
        .ok_or_else(|| BackendError::not_found("User not found"))?;

    match toggle {
        Toggle::Added => tracing::info!("{} followed {}", acting.username, target.username),
        Toggle::Removed => tracing::info!("{} unfollowed {}", acting.username, target.username),
    }
    Ok(toggle)
}

/// Resolve ids to users in list order, skipping ids with no user
async fn resolve(store: &Store, ids: &[Uuid]) -> BackendResult<Vec<User>> {
    let users = store.users_by_ids(ids).await?;
    Ok(order_by_ids(ids, users, |u| u.id))
}

pub async fn followers(store: &Store, username: &str) -> BackendResult<Vec<User>> {
    let user = user_by_username(store, username).await?;
    resolve(store, &user.followers).await
}

pub async fn followings(store: &Store, username: &str) -> BackendResult<Vec<User>> {
    let user = user_by_username(store, username).await?;
    resolve(store, &user.followings).await
}
