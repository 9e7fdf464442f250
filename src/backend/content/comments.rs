/**
 * Comment Operations
 *
 * A comment and its entry in the parent post's `comments` list are written
 * by one store operation. If the post is gone by then, nothing is written
 * and the caller gets 404.
 */

use uuid::Uuid;

use crate::backend::content::assemble;
use crate::backend::content::posts::parse_post_id;
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::store::Store;
use crate::shared::models::{Comment, CommentEntry, Post};
use crate::shared::validation::{parse_id, validate_description};

/// Attach a comment to a post. Returns the post and its comments.
pub async fn add_comment(
    store: &Store,
    actor: Uuid,
    raw_post_id: &str,
    description: &str,
) -> BackendResult<(Post, Vec<CommentEntry>)> {
    let post_id = parse_post_id(raw_post_id)?;
    let description = description.trim();
    validate_description(description, true)?;

    let comment = Comment::new(actor, post_id, description.to_string());
    let comment = store
        .insert_comment(&comment)
        .await?
        .ok_or_else(|| BackendError::not_found("Post not found"))?;
    tracing::info!("Comment {} added to post {} by {}", comment.id, post_id, actor);

    let post = store
        .post_by_id(post_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Post not found"))?;
    let comments = assemble::comments_of(store, &post).await?;
    Ok((post, comments))
}

/// Comments of a post in posting order, with authors
pub async fn comments_for_post(store: &Store, raw_post_id: &str) -> BackendResult<Vec<CommentEntry>> {
    let post_id = parse_post_id(raw_post_id)?;
    let post = store
        .post_by_id(post_id)
        .await?
        .ok_or_else(|| BackendError::not_found("Post not found"))?;
    assemble::comments_of(store, &post).await
}

pub fn parse_comment_id(raw: &str) -> BackendResult<Uuid> {
    Ok(parse_id("comment id", raw)?)
}

pub async fn get_comment(store: &Store, raw_comment_id: &str) -> BackendResult<CommentEntry> {
    let id = parse_comment_id(raw_comment_id)?;
    let comment = store
        .comment_by_id(id)
        .await?
        .ok_or_else(|| BackendError::not_found("Comment not found"))?;
    assemble::comment_entries(store, vec![comment])
        .await?
        .pop()
        .ok_or_else(|| BackendError::not_found("Comment not found"))
}

pub async fn update_comment(store: &Store, raw_comment_id: &str, description: &str) -> BackendResult<Comment> {
    let id = parse_comment_id(raw_comment_id)?;
    let description = description.trim();
    validate_description(description, true)?;
    let comment = store
        .update_comment_description(id, description)
        .await?
        .ok_or_else(|| BackendError::not_found("Comment not found"))?;
    tracing::info!("Comment {} updated", comment.id);
    Ok(comment)
}

/// Delete a comment and pull it from its post
pub async fn delete_comment(store: &Store, raw_comment_id: &str) -> BackendResult<Comment> {
    let id = parse_comment_id(raw_comment_id)?;
    let comment = store
        .delete_comment(id)
        .await?
        .ok_or_else(|| BackendError::not_found("Comment not found"))?;
    tracing::info!("Comment {} deleted from post {}", comment.id, comment.post);
    Ok(comment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::{Role, User};
    use assert_matches::assert_matches;

    async fn setup() -> (Store, User, User, Post) {
        let store = Store::memory();
        let alice = store
            .insert_user(&User::new("alice".into(), "a@x.io".into(), "h".into(), Role::User))
            .await
            .unwrap();
        let bob = store
            .insert_user(&User::new("bob".into(), "b@x.io".into(), "h".into(), Role::User))
            .await
            .unwrap();
        let post = store
            .insert_post(&Post::new(alice.id, "P1".into(), None))
            .await
            .unwrap()
            .unwrap();
        (store, alice, bob, post)
    }

    #[tokio::test]
    async fn test_bob_comments_on_alices_post() {
        let (store, _alice, bob, post) = setup().await;

        let (updated, comments) = add_comment(&store, bob.id, &post.id.to_string(), "hi").await.unwrap();
        assert_eq!(updated.comments.len(), 1);
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].comment.description, "hi");
        assert_eq!(comments[0].author.as_ref().unwrap().id, bob.id);

        let listed = comments_for_post(&store, &post.id.to_string()).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].comment.user, bob.id);
        assert_eq!(listed[0].comment.description, "hi");
    }

    #[tokio::test]
    async fn test_comment_validation() {
        let (store, _alice, bob, post) = setup().await;
        let id = post.id.to_string();

        assert_matches!(add_comment(&store, bob.id, "bad-id", "hi").await, Err(BackendError::Validation(_)));
        assert_matches!(add_comment(&store, bob.id, &id, "   ").await, Err(BackendError::Validation(_)));
        assert_matches!(
            add_comment(&store, bob.id, &id, &"x".repeat(501)).await,
            Err(BackendError::Validation(_))
        );
        assert!(store.comments_by_post(post.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_comment_on_vanished_post_leaves_nothing() {
        let (store, _alice, bob, post) = setup().await;
        store.delete_post_cascade(post.id).await.unwrap();

        let result = add_comment(&store, bob.id, &post.id.to_string(), "late").await;
        assert_matches!(result, Err(BackendError::NotFound(_)));
        assert!(store.comments_by_post(post.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_and_delete_comment() {
        let (store, _alice, bob, post) = setup().await;
        let (_, comments) = add_comment(&store, bob.id, &post.id.to_string(), "hi").await.unwrap();
        let comment_id = comments[0].comment.id.to_string();

        let updated = update_comment(&store, &comment_id, "edited").await.unwrap();
        assert_eq!(updated.description, "edited");
        assert_eq!(get_comment(&store, &comment_id).await.unwrap().comment.description, "edited");

        delete_comment(&store, &comment_id).await.unwrap();
        let post = store.post_by_id(post.id).await.unwrap().unwrap();
        assert!(post.comments.is_empty());
        assert_matches!(get_comment(&store, &comment_id).await, Err(BackendError::NotFound(_)));
        assert_matches!(delete_comment(&store, &comment_id).await, Err(BackendError::NotFound(_)));
    }
}
