//! Persistence Module
//!
//! Document-style storage for users, posts and comments, with two backends
//! behind one handle:
//!
//! - **`postgres`** - sqlx over PostgreSQL, used when `DATABASE_URL` is set
//! - **`memory`** - `tokio::sync::RwLock` over hash maps, used in tests and
//!   when no database is configured
//!
//! # Module Structure
//!
//! ```text
//! store/
//! ├── mod.rs       - `Store` handle, `StoreError`, change sets
//! ├── postgres.rs  - PostgreSQL backend
//! └── memory.rs    - In-process backend
//! ```
//!
//! # Compound Writes
//!
//! Writes that touch two records are single store operations. Postgres runs
//! them in one transaction; the memory backend runs them under one write
//! lock. This covers:
//!
//! - `toggle_follow` - both sides of a follow edge
//! - `insert_post` - the post plus the author's `posts` entry
//! - `insert_comment` - the comment plus the post's `comments` entry
//! - `delete_post_cascade` - the post, its comments, and the owner's entry
//! - `delete_comment` - the comment plus the post's `comments` entry
//!
//! Operations that target a record which does not exist return `Ok(None)`;
//! callers turn that into a 404.

use thiserror::Error;
use uuid::Uuid;

use crate::shared::models::{Comment, Post, Role, Toggle, User};

/// PostgreSQL backend
pub mod postgres;

/// In-process backend
pub mod memory;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors raised by either backend
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write (e.g. a taken username)
    #[error("duplicate value violates {0}")]
    UniqueViolation(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// A stored value could not be decoded into a record
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                let constraint = db.constraint().unwrap_or("unique constraint").to_string();
                return StoreError::UniqueViolation(constraint);
            }
        }
        StoreError::Database(err)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Fields an update may change on a user. `None` leaves the field as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<Role>,
    pub profile_picture: Option<String>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.role.is_none()
            && self.profile_picture.is_none()
    }
}

/// Storage handle shared through `AppState`. Cloning is cheap.
#[derive(Clone)]
pub enum Store {
    Postgres(PgStore),
    Memory(MemoryStore),
}

macro_rules! dispatch {
    ($self:ident . $method:ident ( $($arg:expr),* )) => {
        match $self {
            Store::Postgres(store) => store.$method($($arg),*).await,
            Store::Memory(store) => store.$method($($arg),*).await,
        }
    };
}

impl Store {
    pub fn memory() -> Self {
        Store::Memory(MemoryStore::new())
    }

    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Store::Postgres(PgStore::new(pool))
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Store::Postgres(_) => "postgres",
            Store::Memory(_) => "memory",
        }
    }

    // ----- users -----

    pub async fn insert_user(&self, user: &User) -> StoreResult<User> {
        dispatch!(self.insert_user(user))
    }

    pub async fn user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        dispatch!(self.user_by_id(id))
    }

    pub async fn user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        dispatch!(self.user_by_username(username))
    }

    /// Resolve a set of ids. Unknown ids are skipped; order is unspecified.
    pub async fn users_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        dispatch!(self.users_by_ids(ids))
    }

    pub async fn list_users(&self) -> StoreResult<Vec<User>> {
        dispatch!(self.list_users())
    }

    /// Case-insensitive substring match on username. `needle` is literal.
    pub async fn search_users(&self, needle: &str) -> StoreResult<Vec<User>> {
        dispatch!(self.search_users(needle))
    }

    pub async fn admin_exists(&self) -> StoreResult<bool> {
        dispatch!(self.admin_exists())
    }

    pub async fn update_user(&self, id: Uuid, changes: &UserChanges) -> StoreResult<Option<User>> {
        dispatch!(self.update_user(id, changes))
    }

    pub async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        dispatch!(self.delete_user(id))
    }

    pub async fn sample_users(&self, size: usize) -> StoreResult<Vec<User>> {
        dispatch!(self.sample_users(size))
    }

    /// Flip the follow edge `actor -> target` on both records at once.
    /// `None` when either user is missing.
    pub async fn toggle_follow(&self, actor: Uuid, target: Uuid) -> StoreResult<Option<Toggle>> {
        dispatch!(self.toggle_follow(actor, target))
    }

    // ----- posts -----

    /// Insert a post and append it to its author's `posts`. `None` when the
    /// author does not exist; nothing is written in that case.
    pub async fn insert_post(&self, post: &Post) -> StoreResult<Option<Post>> {
        dispatch!(self.insert_post(post))
    }

    pub async fn post_by_id(&self, id: Uuid) -> StoreResult<Option<Post>> {
        dispatch!(self.post_by_id(id))
    }

    /// Posts by any of `authors`, newest first, windowed by `skip`/`limit`.
    pub async fn posts_by_authors(
        &self,
        authors: &[Uuid],
        skip: usize,
        limit: Option<usize>,
    ) -> StoreResult<Vec<Post>> {
        if authors.is_empty() {
            return Ok(Vec::new());
        }
        dispatch!(self.posts_by_authors(authors, skip, limit))
    }

    /// Up to `size` posts in random order, skipping `exclude`.
    pub async fn sample_posts(&self, exclude: &[Uuid], size: usize) -> StoreResult<Vec<Post>> {
        dispatch!(self.sample_posts(exclude, size))
    }

    pub async fn update_post_description(
        &self,
        id: Uuid,
        description: &str,
    ) -> StoreResult<Option<Post>> {
        dispatch!(self.update_post_description(id, description))
    }

    /// Atomically add `user` to the post's likes, or remove it if present.
    pub async fn toggle_like(&self, post: Uuid, user: Uuid) -> StoreResult<Option<(Toggle, Post)>> {
        dispatch!(self.toggle_like(post, user))
    }

    /// Delete a post, every comment that references it, and its id in the
    /// owner's `posts`. Returns the deleted post.
    pub async fn delete_post_cascade(&self, id: Uuid) -> StoreResult<Option<Post>> {
        dispatch!(self.delete_post_cascade(id))
    }

    // ----- comments -----

    /// Insert a comment and append it to its post. `None` when the post is
    /// gone; no comment is left behind in that case.
    pub async fn insert_comment(&self, comment: &Comment) -> StoreResult<Option<Comment>> {
        dispatch!(self.insert_comment(comment))
    }

    pub async fn comment_by_id(&self, id: Uuid) -> StoreResult<Option<Comment>> {
        dispatch!(self.comment_by_id(id))
    }

    /// Resolve comment ids, preserving the order of `ids`.
    pub async fn comments_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Comment>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        dispatch!(self.comments_by_ids(ids))
    }

    /// Every comment whose `post` field is `post`, oldest first.
    pub async fn comments_by_post(&self, post: Uuid) -> StoreResult<Vec<Comment>> {
        dispatch!(self.comments_by_post(post))
    }

    pub async fn update_comment_description(
        &self,
        id: Uuid,
        description: &str,
    ) -> StoreResult<Option<Comment>> {
        dispatch!(self.update_comment_description(id, description))
    }

    /// Delete a comment and pull it from its post's `comments`.
    pub async fn delete_comment(&self, id: Uuid) -> StoreResult<Option<Comment>> {
        dispatch!(self.delete_comment(id))
    }
}

/// Put `items` in the order of `ids`, dropping ids with no match.
pub(crate) fn order_by_ids<T>(ids: &[Uuid], items: Vec<T>, key: impl Fn(&T) -> Uuid) -> Vec<T> {
    let mut by_id: std::collections::HashMap<Uuid, T> =
        items.into_iter().map(|item| (key(&item), item)).collect();
    ids.iter().filter_map(|id| by_id.remove(id)).collect()
}
