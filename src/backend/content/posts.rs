/**
 * Post Operations
 *
 * Creation, likes, updates, deletion and lookups.
 *
 * # Permissions
 *
 * Update and delete are allowed for the post's owner and for admins. Anyone
 * else gets 401 and the post is untouched. The admin routes call the same
 * functions, so there is one cascade and one set of rules.
 *
 * # Identifier Validation
 *
 * Client-supplied post ids are parsed before the store is touched; a
 * malformed id is a 400.
 */

use serde::Deserialize;
use uuid::Uuid;

use crate::backend::content::assemble;
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::media::{MediaStore, Upload};
use crate::backend::middleware::AuthenticatedUser;
use crate::backend::store::Store;
use crate::backend::users::service::user_by_username;
use crate::shared::models::{FeedEntry, Post, PostThread, Toggle};
use crate::shared::validation::{parse_id, validate_description};

/// Fields a post update may change. Unknown fields in the request body are
/// ignored.
#[derive(Debug, Default, Deserialize)]
pub struct PostPatch {
    pub description: Option<String>,
}

pub fn parse_post_id(raw: &str) -> BackendResult<Uuid> {
    Ok(parse_id("post id", raw)?)
}

async fn load_post(store: &Store, id: Uuid) -> BackendResult<Post> {
    store
        .post_by_id(id)
        .await?
        .ok_or_else(|| BackendError::not_found("Post not found"))
}

fn ensure_owner_or_admin(actor: &AuthenticatedUser, post: &Post, action: &str) -> BackendResult<()> {
    if post.user == actor.id || actor.is_admin() {
        return Ok(());
    }
    tracing::warn!("{} attempted to {} post {} owned by {}", actor.username, action, post.id, post.user);
    Err(BackendError::unauthorized(format!("You can only {} your own posts", action)))
}

/// Create a post with a description, an image, or both
pub async fn create_post(
    store: &Store,
    media: &MediaStore,
    author: Uuid,
    description: Option<String>,
    image: Option<Upload>,
) -> BackendResult<Post> {
    let description = description.map(|d| d.trim().to_string()).unwrap_or_default();
    validate_description(&description, false)?;
    if description.is_empty() && image.is_none() {
        return Err(BackendError::invalid_argument(
            "Post must have a description or an image",
        ));
    }
    if let Some(upload) = &image {
        media.validate(upload)?;
    }
    if store.user_by_id(author).await?.is_none() {
        return Err(BackendError::not_found("User not found"));
    }

    let imgurl = match &image {
        Some(upload) => Some(media.save(upload).await?),
        None => None,
    };

    let post = Post::new(author, description, imgurl.clone());
    match store.insert_post(&post).await {
        Ok(Some(post)) => {
            tracing::info!("Post created: {} by {}", post.id, author);
            Ok(post)
        }
        result => {
            if let Some(stored) = &imgurl {
                media.remove(stored).await;
            }
            match result {
                Ok(_) => Err(BackendError::not_found("User not found")),
                Err(e) => Err(e.into()),
            }
        }
    }
}

/// Like the post if `actor` has not liked it yet, otherwise unlike it
pub async fn like_unlike(store: &Store, actor: Uuid, raw_post_id: &str) -> BackendResult<(Toggle, Post)> {
    let post_id = parse_post_id(raw_post_id)?;
    let (toggle, post) = store
        .toggle_like(post_id, actor)
        .await?
        .ok_or_else(|| BackendError::not_found("Post not found"))?;
    tracing::info!("User {} {:?} like on post {}", actor, toggle, post.id);
    Ok((toggle, post))
}

/// Delete a post with its comments. Owner or admin only.
pub async fn delete_post(
    store: &Store,
    media: &MediaStore,
    actor: &AuthenticatedUser,
    raw_post_id: &str,
) -> BackendResult<Post> {
    let post_id = parse_post_id(raw_post_id)?;
    let post = load_post(store, post_id).await?;
    ensure_owner_or_admin(actor, &post, "delete")?;

    let deleted = store
        .delete_post_cascade(post.id)
        .await?
        .ok_or_else(|| BackendError::not_found("Post not found"))?;
    if let Some(image) = &deleted.imgurl {
        media.remove(image).await;
    }

    tracing::info!("Post {} deleted by {}", deleted.id, actor.username);
    Ok(deleted)
}

/// Apply `patch` to a post. Owner or admin only.
pub async fn update_post(
    store: &Store,
    actor: &AuthenticatedUser,
    raw_post_id: &str,
    patch: PostPatch,
) -> BackendResult<Post> {
    let post_id = parse_post_id(raw_post_id)?;
    let post = load_post(store, post_id).await?;
    ensure_owner_or_admin(actor, &post, "update")?;

    let Some(description) = patch.description.map(|d| d.trim().to_string()) else {
        return Ok(post);
    };
    validate_description(&description, post.imgurl.is_none())?;

    let updated = store
        .update_post_description(post.id, &description)
        .await?
        .ok_or_else(|| BackendError::not_found("Post not found"))?;
    tracing::info!("Post {} updated by {}", updated.id, actor.username);
    Ok(updated)
}

/// A post with its owner and comments
pub async fn get_post(store: &Store, raw_post_id: &str) -> BackendResult<PostThread> {
    let post_id = parse_post_id(raw_post_id)?;
    let post = load_post(store, post_id).await?;
    assemble::threads(store, vec![post])
        .await?
        .pop()
        .ok_or_else(|| BackendError::not_found("Post owner not found"))
}

/// Every post of `username`, newest first
pub async fn posts_by_user(store: &Store, username: &str) -> BackendResult<Vec<FeedEntry>> {
    let user = user_by_username(store, username).await?;
    let posts = store.posts_by_authors(&[user.id], 0, None).await?;
    assemble::with_authors(store, posts).await
}
