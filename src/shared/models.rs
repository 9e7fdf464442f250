/**
 * Domain Records
 *
 * The three stored collections of the social network: users, posts and
 * comments. These are the records the store reads and writes; the shapes
 * handed to clients live in `shared::views`.
 *
 * # Relationships
 *
 * - User 1-* Post (`Post::user`, mirrored by `User::posts`)
 * - Post 1-* Comment (`Comment::post`, mirrored by `Post::comments`)
 * - User *-* User (follow edges stored on both sides)
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Maximum length of a post or comment body, in characters.
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// A registered account.
///
/// `password_hash` never leaves the server; every client-facing shape is
/// built from `views::UserProfile`, which omits it.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    /// Server-relative path such as `/uploads/1700000000000-me.png`
    pub profile_picture: Option<String>,
    pub followers: Vec<Uuid>,
    pub followings: Vec<Uuid>,
    pub posts: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: String, email: String, password_hash: String, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash,
            role,
            profile_picture: None,
            followers: Vec::new(),
            followings: Vec::new(),
            posts: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_following(&self, other: Uuid) -> bool {
        self.followings.contains(&other)
    }
}

/// A post. `likes` has set semantics; `comments` keeps insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: Uuid,
    pub user: Uuid,
    pub description: String,
    pub imgurl: Option<String>,
    pub likes: Vec<Uuid>,
    pub comments: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn new(user: Uuid, description: String, imgurl: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user,
            description,
            imgurl,
            likes: Vec::new(),
            comments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_liked_by(&self, user: Uuid) -> bool {
        self.likes.contains(&user)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: Uuid,
    pub user: Uuid,
    pub post: Uuid,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(user: Uuid, post: Uuid, description: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user,
            post,
            description,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A post joined with its author, as listed in feeds.
#[derive(Debug, Clone)]
pub struct FeedEntry {
    pub post: Post,
    /// `None` when the author account has since been deleted
    pub author: Option<User>,
}

/// A comment joined with its author.
#[derive(Debug, Clone)]
pub struct CommentEntry {
    pub comment: Comment,
    pub author: Option<User>,
}

/// A post with its owner and its comments resolved.
#[derive(Debug, Clone)]
pub struct PostThread {
    pub post: Post,
    pub owner: User,
    pub comments: Vec<CommentEntry>,
}

/// Outcome of a set-membership toggle (follow edge, like).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
}
