/**
 * PostgreSQL Store
 *
 * sqlx-backed implementation of the `Store` operations. Id collections
 * (`followers`, `followings`, `posts`, `likes`, `comments`) are `UUID[]`
 * columns mutated with `array_append` / `array_remove`, mirroring the
 * document layout of the records.
 *
 * # Transactions
 *
 * Compound writes run in one transaction and lock the rows they read with
 * `FOR UPDATE`:
 *
 * - `toggle_follow` locks both users in id order so opposite follows cannot
 *   deadlock
 * - `delete_post_cascade` locks the post before deleting its comments, so a
 *   concurrent `insert_comment` either commits first (and its comment is
 *   deleted) or finds the post gone
 * - `toggle_like` is a single `UPDATE`; the row lock serializes concurrent
 *   toggles and the `CASE` is re-evaluated on the latest row
 *
 * Schema lives in `migrations/`.
 */

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::backend::store::{order_by_ids, StoreError, StoreResult, UserChanges};
use crate::shared::models::{Comment, Post, Role, Toggle, User};

macro_rules! user_columns {
    () => {
        "id, username, email, password_hash, role, profile_picture, followers, followings, posts, created_at, updated_at"
    };
}

macro_rules! post_columns {
    () => {
        "id, user_id, description, imgurl, likes, comments, created_at, updated_at"
    };
}

macro_rules! comment_columns {
    () => {
        "id, user_id, post_id, description, created_at, updated_at"
    };
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    role: String,
    profile_picture: Option<String>,
    followers: Vec<Uuid>,
    followings: Vec<Uuid>,
    posts: Vec<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role: Role = row.role.parse().map_err(StoreError::Corrupt)?;
        Ok(User {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            role,
            profile_picture: row.profile_picture,
            followers: row.followers,
            followings: row.followings,
            posts: row.posts,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    user_id: Uuid,
    description: String,
    imgurl: Option<String>,
    likes: Vec<Uuid>,
    comments: Vec<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: row.id,
            user: row.user_id,
            description: row.description,
            imgurl: row.imgurl,
            likes: row.likes,
            comments: row.comments,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    user_id: Uuid,
    post_id: Uuid,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.id,
            user: row.user_id,
            post: row.post_id,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn users(rows: Vec<UserRow>) -> StoreResult<Vec<User>> {
    rows.into_iter().map(User::try_from).collect()
}

fn optional_user(row: Option<UserRow>) -> StoreResult<Option<User>> {
    row.map(User::try_from).transpose()
}

/// Escape `%`, `_` and `\` so a search needle matches literally under ILIKE.
fn escape_like(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len());
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn as_limit(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn insert_user(&self, user: &User) -> StoreResult<User> {
        let row = sqlx::query_as::<_, UserRow>(concat!(
            "INSERT INTO users (id, username, email, password_hash, role, profile_picture, created_at, updated_at) ",
            "VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING ",
            user_columns!()
        ))
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(&user.profile_picture)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await?;

        User::try_from(row)
    }

    pub async fn user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(concat!(
            "SELECT ", user_columns!(), " FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        optional_user(row)
    }

    pub async fn user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(concat!(
            "SELECT ", user_columns!(), " FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        optional_user(row)
    }

    pub async fn users_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(concat!(
            "SELECT ", user_columns!(), " FROM users WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        users(rows)
    }

    pub async fn list_users(&self) -> StoreResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(concat!(
            "SELECT ", user_columns!(), " FROM users ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        users(rows)
    }

    pub async fn search_users(&self, needle: &str) -> StoreResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(concat!(
            "SELECT ", user_columns!(),
            " FROM users WHERE username ILIKE '%' || $1 || '%' ESCAPE '\\' ORDER BY username"
        ))
        .bind(escape_like(needle))
        .fetch_all(&self.pool)
        .await?;

        users(rows)
    }

    pub async fn admin_exists(&self) -> StoreResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE role = 'admin')")
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    pub async fn update_user(&self, id: Uuid, changes: &UserChanges) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(concat!(
            "UPDATE users SET ",
            "username = COALESCE($2, username), ",
            "email = COALESCE($3, email), ",
            "role = COALESCE($4, role), ",
            "profile_picture = COALESCE($5, profile_picture), ",
            "updated_at = now() ",
            "WHERE id = $1 RETURNING ",
            user_columns!()
        ))
        .bind(id)
        .bind(&changes.username)
        .bind(&changes.email)
        .bind(changes.role.map(|r| r.as_str()))
        .bind(&changes.profile_picture)
        .fetch_optional(&self.pool)
        .await?;

        optional_user(row)
    }

    pub async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn sample_users(&self, size: usize) -> StoreResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(concat!(
            "SELECT ", user_columns!(), " FROM users ORDER BY random() LIMIT $1"
        ))
        .bind(as_limit(size))
        .fetch_all(&self.pool)
        .await?;

        users(rows)
    }

    pub async fn toggle_follow(&self, actor: Uuid, target: Uuid) -> StoreResult<Option<Toggle>> {
        let mut tx = self.pool.begin().await?;

        let locked: Vec<(Uuid, Vec<Uuid>)> = sqlx::query_as(
            "SELECT id, followings FROM users WHERE id = ANY($1) ORDER BY id FOR UPDATE",
        )
        .bind(vec![actor, target])
        .fetch_all(&mut *tx)
        .await?;

        if locked.len() != 2 {
            return Ok(None);
        }
        let following = locked
            .iter()
            .find(|(id, _)| *id == actor)
            .map(|(_, followings)| followings.contains(&target))
            .unwrap_or(false);

        let toggle = if following {
            sqlx::query(
                "UPDATE users SET followings = array_remove(followings, $2), updated_at = now() WHERE id = $1",
            )
            .bind(actor)
            .bind(target)
            .execute(&mut *tx)
            .await?;
            sqlx::query(
                "UPDATE users SET followers = array_remove(followers, $2), updated_at = now() WHERE id = $1",
            )
            .bind(target)
            .bind(actor)
            .execute(&mut *tx)
            .await?;
            Toggle::Removed
        } else {
            sqlx::query(
                "UPDATE users SET followings = array_append(followings, $2), updated_at = now() \
                 WHERE id = $1 AND NOT ($2 = ANY(followings))",
            )
            .bind(actor)
            .bind(target)
            .execute(&mut *tx)
            .await?;
            sqlx::query(
                "UPDATE users SET followers = array_append(followers, $2), updated_at = now() \
                 WHERE id = $1 AND NOT ($2 = ANY(followers))",
            )
            .bind(target)
            .bind(actor)
            .execute(&mut *tx)
            .await?;
            Toggle::Added
        };

        tx.commit().await?;
        Ok(Some(toggle))
    }

    pub async fn insert_post(&self, post: &Post) -> StoreResult<Option<Post>> {
        let mut tx = self.pool.begin().await?;

        let appended = sqlx::query(
            "UPDATE users SET posts = array_append(posts, $2), updated_at = now() WHERE id = $1",
        )
        .bind(post.user)
        .bind(post.id)
        .execute(&mut *tx)
        .await?;
        if appended.rows_affected() == 0 {
            return Ok(None);
        }

        let row = sqlx::query_as::<_, PostRow>(concat!(
            "INSERT INTO posts (id, user_id, description, imgurl, likes, comments, created_at, updated_at) ",
            "VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING ",
            post_columns!()
        ))
        .bind(post.id)
        .bind(post.user)
        .bind(&post.description)
        .bind(&post.imgurl)
        .bind(&post.likes)
        .bind(&post.comments)
        .bind(post.created_at)
        .bind(post.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(row.into()))
    }

    pub async fn post_by_id(&self, id: Uuid) -> StoreResult<Option<Post>> {
        let row = sqlx::query_as::<_, PostRow>(concat!(
            "SELECT ", post_columns!(), " FROM posts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Post::from))
    }

    pub async fn posts_by_authors(
        &self,
        authors: &[Uuid],
        skip: usize,
        limit: Option<usize>,
    ) -> StoreResult<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRow>(concat!(
            "SELECT ", post_columns!(),
            " FROM posts WHERE user_id = ANY($1) ORDER BY created_at DESC, id DESC OFFSET $2 LIMIT $3"
        ))
        .bind(authors)
        .bind(as_limit(skip))
        .bind(limit.map(as_limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    pub async fn sample_posts(&self, exclude: &[Uuid], size: usize) -> StoreResult<Vec<Post>> {
        let rows = sqlx::query_as::<_, PostRow>(concat!(
            "SELECT ", post_columns!(),
            " FROM posts WHERE NOT (id = ANY($1)) ORDER BY random() LIMIT $2"
        ))
        .bind(exclude)
        .bind(as_limit(size))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Post::from).collect())
    }

    pub async fn update_post_description(
        &self,
        id: Uuid,
        description: &str,
    ) -> StoreResult<Option<Post>> {
        let row = sqlx::query_as::<_, PostRow>(concat!(
            "UPDATE posts SET description = $2, updated_at = now() WHERE id = $1 RETURNING ",
            post_columns!()
        ))
        .bind(id)
        .bind(description)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Post::from))
    }

    pub async fn toggle_like(&self, post: Uuid, user: Uuid) -> StoreResult<Option<(Toggle, Post)>> {
        let row = sqlx::query_as::<_, PostRow>(concat!(
            "UPDATE posts SET likes = CASE WHEN $2 = ANY(likes) ",
            "THEN array_remove(likes, $2) ELSE array_append(likes, $2) END, ",
            "updated_at = now() WHERE id = $1 RETURNING ",
            post_columns!()
        ))
        .bind(post)
        .bind(user)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| {
            let post = Post::from(row);
            let toggle = if post.is_liked_by(user) {
                Toggle::Added
            } else {
                Toggle::Removed
            };
            (toggle, post)
        }))
    }

    pub async fn delete_post_cascade(&self, id: Uuid) -> StoreResult<Option<Post>> {
        let mut tx = self.pool.begin().await?;

        let owner: Option<Uuid> =
            sqlx::query_scalar("SELECT user_id FROM posts WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(owner) = owner else {
            return Ok(None);
        };

        let removed = sqlx::query("DELETE FROM comments WHERE post_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let row = sqlx::query_as::<_, PostRow>(concat!(
            "DELETE FROM posts WHERE id = $1 RETURNING ",
            post_columns!()
        ))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE users SET posts = array_remove(posts, $2), updated_at = now() WHERE id = $1",
        )
        .bind(owner)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::debug!(
            "Deleted post {} with {} comments",
            id,
            removed.rows_affected()
        );
        Ok(Some(row.into()))
    }

    pub async fn insert_comment(&self, comment: &Comment) -> StoreResult<Option<Comment>> {
        let mut tx = self.pool.begin().await?;

        let appended = sqlx::query(
            "UPDATE posts SET comments = array_append(comments, $2), updated_at = now() WHERE id = $1",
        )
        .bind(comment.post)
        .bind(comment.id)
        .execute(&mut *tx)
        .await?;
        if appended.rows_affected() == 0 {
            return Ok(None);
        }

        let row = sqlx::query_as::<_, CommentRow>(concat!(
            "INSERT INTO comments (id, user_id, post_id, description, created_at, updated_at) ",
            "VALUES ($1, $2, $3, $4, $5, $6) RETURNING ",
            comment_columns!()
        ))
        .bind(comment.id)
        .bind(comment.user)
        .bind(comment.post)
        .bind(&comment.description)
        .bind(comment.created_at)
        .bind(comment.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(row.into()))
    }

    pub async fn comment_by_id(&self, id: Uuid) -> StoreResult<Option<Comment>> {
        let row = sqlx::query_as::<_, CommentRow>(concat!(
            "SELECT ", comment_columns!(), " FROM comments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Comment::from))
    }

    pub async fn comments_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Comment>> {
        let rows = sqlx::query_as::<_, CommentRow>(concat!(
            "SELECT ", comment_columns!(), " FROM comments WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        let comments = rows.into_iter().map(Comment::from).collect();
        Ok(order_by_ids(ids, comments, |c| c.id))
    }

    pub async fn comments_by_post(&self, post: Uuid) -> StoreResult<Vec<Comment>> {
        let rows = sqlx::query_as::<_, CommentRow>(concat!(
            "SELECT ", comment_columns!(),
            " FROM comments WHERE post_id = $1 ORDER BY created_at, id"
        ))
        .bind(post)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Comment::from).collect())
    }

    pub async fn update_comment_description(
        &self,
        id: Uuid,
        description: &str,
    ) -> StoreResult<Option<Comment>> {
        let row = sqlx::query_as::<_, CommentRow>(concat!(
            "UPDATE comments SET description = $2, updated_at = now() WHERE id = $1 RETURNING ",
            comment_columns!()
        ))
        .bind(id)
        .bind(description)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Comment::from))
    }

    pub async fn delete_comment(&self, id: Uuid) -> StoreResult<Option<Comment>> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, CommentRow>(concat!(
            "DELETE FROM comments WHERE id = $1 RETURNING ",
            comment_columns!()
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };

        sqlx::query(
            "UPDATE posts SET comments = array_remove(comments, $2), updated_at = now() WHERE id = $1",
        )
        .bind(row.post_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(row.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("al"), "al");
        assert_eq!(escape_like("100%_\\"), "100\\%\\_\\\\");
    }

    #[test]
    fn test_as_limit_saturates() {
        assert_eq!(as_limit(10), 10);
        assert_eq!(as_limit(usize::MAX), i64::MAX);
    }

    #[test]
    fn test_row_with_unknown_role_is_corrupt() {
        let now = Utc::now();
        let row = UserRow {
            id: Uuid::new_v4(),
            username: "x".into(),
            email: "x@y.z".into(),
            password_hash: "h".into(),
            role: "superuser".into(),
            profile_picture: None,
            followers: vec![],
            followings: vec![],
            posts: vec![],
            created_at: now,
            updated_at: now,
        };
        assert!(matches!(User::try_from(row), Err(StoreError::Corrupt(_))));
    }
}
