//! Joins posts and comments with the users they reference.
//!
//! Each helper resolves all referenced users with one batched lookup.

use std::collections::HashMap;
use uuid::Uuid;

use crate::backend::error::BackendResult;
use crate::backend::store::Store;
use crate::shared::models::{Comment, CommentEntry, FeedEntry, Post, PostThread, User};

async fn users_by_id(store: &Store, ids: impl Iterator<Item = Uuid>) -> BackendResult<HashMap<Uuid, User>> {
    let mut ids: Vec<Uuid> = ids.collect();
    ids.sort();
    ids.dedup();
    let users = store.users_by_ids(&ids).await?;
    Ok(users.into_iter().map(|u| (u.id, u)).collect())
}

/// Pair each post with its author, keeping order. Missing authors are `None`.
pub async fn with_authors(store: &Store, posts: Vec<Post>) -> BackendResult<Vec<FeedEntry>> {
    let authors = users_by_id(store, posts.iter().map(|p| p.user)).await?;
    Ok(posts
        .into_iter()
        .map(|post| {
            let author = authors.get(&post.user).cloned();
            FeedEntry { post, author }
        })
        .collect())
}

/// Pair each comment with its author, keeping order
pub async fn comment_entries(store: &Store, comments: Vec<Comment>) -> BackendResult<Vec<CommentEntry>> {
    let authors = users_by_id(store, comments.iter().map(|c| c.user)).await?;
    Ok(comments
        .into_iter()
        .map(|comment| {
            let author = authors.get(&comment.user).cloned();
            CommentEntry { comment, author }
        })
        .collect())
}

/// Comments of `post` in its `comments` order, with authors
pub async fn comments_of(store: &Store, post: &Post) -> BackendResult<Vec<CommentEntry>> {
    let comments = store.comments_by_ids(&post.comments).await?;
    comment_entries(store, comments).await
}

/// Attach owner and comments to each post. Posts whose owner no longer
/// exists are dropped.
pub async fn threads(store: &Store, posts: Vec<Post>) -> BackendResult<Vec<PostThread>> {
    let owners = users_by_id(store, posts.iter().map(|p| p.user)).await?;

    let comment_ids: Vec<Uuid> = posts.iter().flat_map(|p| p.comments.iter().copied()).collect();
    let comments = store.comments_by_ids(&comment_ids).await?;
    let mut comments: HashMap<Uuid, CommentEntry> = comment_entries(store, comments)
        .await?
        .into_iter()
        .map(|entry| (entry.comment.id, entry))
        .collect();

    let mut result = Vec::with_capacity(posts.len());
    for post in posts {
        let Some(owner) = owners.get(&post.user).cloned() else {
            tracing::debug!("Dropping post {} with missing owner {}", post.id, post.user);
            continue;
        };
        let post_comments = post
            .comments
            .iter()
            .filter_map(|id| comments.remove(id))
            .collect();
        result.push(PostThread {
            post,
            owner,
            comments: post_comments,
        });
    }
    Ok(result)
}
