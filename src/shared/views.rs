//! Client-facing shapes.
//!
//! Every view is built from a stored record plus the public base URL, so media
//! references stored as `/uploads/<file>` leave the server as absolute URLs.
//! None of these types carries a credential.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::models::{
    Comment, CommentEntry, FeedEntry, Post, PostThread, Role, User,
};

/// Rewrite a stored media reference into an absolute URL.
///
/// References that already carry a scheme are returned unchanged.
pub fn absolute_media_url(base: &str, stored: &str) -> String {
    if stored.starts_with("http://") || stored.starts_with("https://") {
        return stored.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        stored.trim_start_matches('/')
    )
}

fn absolute(base: &str, stored: &Option<String>) -> Option<String> {
    stored.as_deref().map(|s| absolute_media_url(base, s))
}

/// Full profile of a user, credential excluded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub profile_picture: Option<String>,
    pub followers: Vec<Uuid>,
    pub followings: Vec<Uuid>,
    pub posts: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(user: &User, base: &str) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
            profile_picture: absolute(base, &user.profile_picture),
            followers: user.followers.clone(),
            followings: user.followings.clone(),
            posts: user.posts.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }

    pub fn list(users: &[User], base: &str) -> Vec<Self> {
        users.iter().map(|u| Self::new(u, base)).collect()
    }
}

/// The handful of author fields shown next to posts and comments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthorSummary {
    pub id: Uuid,
    pub username: String,
    pub profile_picture: Option<String>,
}

impl AuthorSummary {
    pub fn new(user: &User, base: &str) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            profile_picture: absolute(base, &user.profile_picture),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostView {
    pub id: Uuid,
    pub user: Uuid,
    pub description: String,
    pub imgurl: Option<String>,
    pub likes: Vec<Uuid>,
    pub comments: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostView {
    pub fn new(post: &Post, base: &str) -> Self {
        Self {
            id: post.id,
            user: post.user,
            description: post.description.clone(),
            imgurl: absolute(base, &post.imgurl),
            likes: post.likes.clone(),
            comments: post.comments.clone(),
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// A post as listed in the timeline and per-user listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedPost {
    #[serde(flatten)]
    pub post: PostView,
    pub author: Option<AuthorSummary>,
}

impl FeedPost {
    pub fn new(entry: &FeedEntry, base: &str) -> Self {
        Self {
            post: PostView::new(&entry.post, base),
            author: entry.author.as_ref().map(|a| AuthorSummary::new(a, base)),
        }
    }

    pub fn list(entries: &[FeedEntry], base: &str) -> Vec<Self> {
        entries.iter().map(|e| Self::new(e, base)).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommentView {
    pub id: Uuid,
    pub post: Uuid,
    pub user: Uuid,
    pub author: Option<AuthorSummary>,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CommentView {
    pub fn new(entry: &CommentEntry, base: &str) -> Self {
        let mut view = Self::bare(&entry.comment);
        view.author = entry.author.as_ref().map(|a| AuthorSummary::new(a, base));
        view
    }

    /// A comment without its author resolved.
    pub fn bare(comment: &Comment) -> Self {
        Self {
            id: comment.id,
            post: comment.post,
            user: comment.user,
            author: None,
            description: comment.description.clone(),
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }

    pub fn list(entries: &[CommentEntry], base: &str) -> Vec<Self> {
        entries.iter().map(|e| Self::new(e, base)).collect()
    }
}

/// A post with its owner's profile and its comments inlined.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostDetail {
    pub id: Uuid,
    pub description: String,
    pub imgurl: Option<String>,
    pub likes: Vec<Uuid>,
    pub user: UserProfile,
    pub comments: Vec<CommentView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostDetail {
    pub fn new(thread: &PostThread, base: &str) -> Self {
        let post = &thread.post;
        Self {
            id: post.id,
            description: post.description.clone(),
            imgurl: absolute(base, &post.imgurl),
            likes: post.likes.clone(),
            user: UserProfile::new(&thread.owner, base),
            comments: CommentView::list(&thread.comments, base),
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }

    pub fn list(threads: &[PostThread], base: &str) -> Vec<Self> {
        threads.iter().map(|t| Self::new(t, base)).collect()
    }
}

/// A post together with its resolved comments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommentThread {
    pub post: PostView,
    pub comments: Vec<CommentView>,
}

impl CommentThread {
    pub fn new(post: &Post, comments: &[CommentEntry], base: &str) -> Self {
        Self {
            post: PostView::new(post, base),
            comments: CommentView::list(comments, base),
        }
    }
}

/// One page of the timeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelinePage {
    pub page: usize,
    pub limit: usize,
    /// Number of entries in `posts`
    pub count: usize,
    pub posts: Vec<FeedPost>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const BASE: &str = "http://localhost:8000";

    #[test]
    fn test_absolute_media_url() {
        assert_eq!(
            absolute_media_url(BASE, "/uploads/1-a.png"),
            "http://localhost:8000/uploads/1-a.png"
        );
        assert_eq!(
            absolute_media_url("http://cdn.test/", "uploads/1-a.png"),
            "http://cdn.test/uploads/1-a.png"
        );
        assert_eq!(
            absolute_media_url(BASE, "https://elsewhere.test/x.png"),
            "https://elsewhere.test/x.png"
        );
    }

    #[test]
    fn test_profile_omits_credential_and_rewrites_picture() {
        let mut user = User::new("alice".into(), "a@x.io".into(), "secret-hash".into(), Role::User);
        user.profile_picture = Some("/uploads/1-alice.png".into());

        let json = serde_json::to_value(UserProfile::new(&user, BASE)).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(!json.to_string().contains("secret-hash"));
        assert_eq!(json["profile_picture"], "http://localhost:8000/uploads/1-alice.png");
        assert_eq!(json["role"], "user");
    }

    #[test]
    fn test_feed_post_flattens_post_fields() {
        let user = User::new("bob".into(), "b@x.io".into(), "h".into(), Role::User);
        let post = Post::new(user.id, "hi".into(), Some("/uploads/2-p.jpg".into()));
        let entry = FeedEntry { post, author: Some(user) };

        let json = serde_json::to_value(FeedPost::new(&entry, BASE)).unwrap();
        assert_eq!(json["description"], "hi");
        assert_eq!(json["imgurl"], "http://localhost:8000/uploads/2-p.jpg");
        assert_eq!(json["author"]["username"], "bob");
    }
}
