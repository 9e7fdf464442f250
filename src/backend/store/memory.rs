/**
 * In-Process Store
 *
 * Hash-map collections behind a single `tokio::sync::RwLock`. Every compound
 * write takes the write lock once and completes before releasing it, so the
 * two sides of an edge or a cascade are never observed half-applied.
 *
 * Used by the test suites and by the server when no database is configured.
 * Nothing is persisted across restarts.
 */

use chrono::Utc;
use rand::seq::SliceRandom;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::backend::store::{order_by_ids, StoreError, StoreResult, UserChanges};
use crate::shared::models::{Comment, Post, Role, Toggle, User};

#[derive(Default)]
struct Collections {
    users: HashMap<Uuid, User>,
    posts: HashMap<Uuid, Post>,
    comments: HashMap<Uuid, Comment>,
}

impl Collections {
    fn username_taken(&self, username: &str, except: Option<Uuid>) -> bool {
        self.users
            .values()
            .any(|u| u.username == username && Some(u.id) != except)
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Collections>>,
}

fn push_unique(ids: &mut Vec<Uuid>, id: Uuid) {
    if !ids.contains(&id) {
        ids.push(id);
    }
}

fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> (chrono::DateTime<Utc>, Uuid)) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, user: &User) -> StoreResult<User> {
        let mut data = self.inner.write().await;
        if data.username_taken(&user.username, None) {
            return Err(StoreError::UniqueViolation("users_username_key".into()));
        }
        data.users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    pub async fn user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    pub async fn user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let data = self.inner.read().await;
        Ok(data.users.values().find(|u| u.username == username).cloned())
    }

    pub async fn users_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<User>> {
        let data = self.inner.read().await;
        Ok(ids.iter().filter_map(|id| data.users.get(id).cloned()).collect())
    }

    pub async fn list_users(&self) -> StoreResult<Vec<User>> {
        let data = self.inner.read().await;
        let mut users: Vec<User> = data.users.values().cloned().collect();
        users.sort_by_key(|u| (u.created_at, u.id));
        Ok(users)
    }

    pub async fn search_users(&self, needle: &str) -> StoreResult<Vec<User>> {
        let needle = needle.to_lowercase();
        let mut users: Vec<User> = self
            .list_users()
            .await?
            .into_iter()
            .filter(|u| u.username.to_lowercase().contains(&needle))
            .collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    pub async fn admin_exists(&self) -> StoreResult<bool> {
        let data = self.inner.read().await;
        Ok(data.users.values().any(|u| u.role == Role::Admin))
    }

    pub async fn update_user(&self, id: Uuid, changes: &UserChanges) -> StoreResult<Option<User>> {
        let mut data = self.inner.write().await;
        if let Some(username) = &changes.username {
            if data.username_taken(username, Some(id)) {
                return Err(StoreError::UniqueViolation("users_username_key".into()));
            }
        }
        let Some(user) = data.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(username) = &changes.username {
            user.username = username.clone();
        }
        if let Some(email) = &changes.email {
            user.email = email.clone();
        }
        if let Some(role) = changes.role {
            user.role = role;
        }
        if let Some(picture) = &changes.profile_picture {
            user.profile_picture = Some(picture.clone());
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    pub async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.inner.write().await.users.remove(&id).is_some())
    }

    pub async fn sample_users(&self, size: usize) -> StoreResult<Vec<User>> {
        let data = self.inner.read().await;
        let users: Vec<&User> = data.users.values().collect();
        let mut rng = rand::thread_rng();
        Ok(users
            .choose_multiple(&mut rng, size)
            .map(|u| (*u).clone())
            .collect())
    }

    pub async fn toggle_follow(&self, actor: Uuid, target: Uuid) -> StoreResult<Option<Toggle>> {
        let mut data = self.inner.write().await;
        if !data.users.contains_key(&actor) || !data.users.contains_key(&target) {
            return Ok(None);
        }
        let now = Utc::now();
        let following = data.users[&actor].is_following(target);

        if let Some(user) = data.users.get_mut(&actor) {
            if following {
                user.followings.retain(|id| *id != target);
            } else {
                push_unique(&mut user.followings, target);
            }
            user.updated_at = now;
        }
        if let Some(user) = data.users.get_mut(&target) {
            if following {
                user.followers.retain(|id| *id != actor);
            } else {
                push_unique(&mut user.followers, actor);
            }
            user.updated_at = now;
        }

        Ok(Some(if following { Toggle::Removed } else { Toggle::Added }))
    }

    pub async fn insert_post(&self, post: &Post) -> StoreResult<Option<Post>> {
        let mut data = self.inner.write().await;
        let Some(author) = data.users.get_mut(&post.user) else {
            return Ok(None);
        };
        author.posts.push(post.id);
        author.updated_at = Utc::now();
        data.posts.insert(post.id, post.clone());
        Ok(Some(post.clone()))
    }

    pub async fn post_by_id(&self, id: Uuid) -> StoreResult<Option<Post>> {
        Ok(self.inner.read().await.posts.get(&id).cloned())
    }

    pub async fn posts_by_authors(
        &self,
        authors: &[Uuid],
        skip: usize,
        limit: Option<usize>,
    ) -> StoreResult<Vec<Post>> {
        let data = self.inner.read().await;
        let mut posts: Vec<Post> = data
            .posts
            .values()
            .filter(|p| authors.contains(&p.user))
            .cloned()
            .collect();
        newest_first(&mut posts, |p| (p.created_at, p.id));
        Ok(posts
            .into_iter()
            .skip(skip)
            .take(limit.unwrap_or(usize::MAX))
            .collect())
    }

    pub async fn sample_posts(&self, exclude: &[Uuid], size: usize) -> StoreResult<Vec<Post>> {
        let data = self.inner.read().await;
        let candidates: Vec<&Post> = data
            .posts
            .values()
            .filter(|p| !exclude.contains(&p.id))
            .collect();
        let mut rng = rand::thread_rng();
        let mut sample: Vec<Post> = candidates
            .choose_multiple(&mut rng, size)
            .map(|p| (*p).clone())
            .collect();
        sample.shuffle(&mut rng);
        Ok(sample)
    }

    pub async fn update_post_description(
        &self,
        id: Uuid,
        description: &str,
    ) -> StoreResult<Option<Post>> {
        let mut data = self.inner.write().await;
        Ok(data.posts.get_mut(&id).map(|post| {
            post.description = description.to_string();
            post.updated_at = Utc::now();
            post.clone()
        }))
    }

    pub async fn toggle_like(&self, post: Uuid, user: Uuid) -> StoreResult<Option<(Toggle, Post)>> {
        let mut data = self.inner.write().await;
        Ok(data.posts.get_mut(&post).map(|post| {
            let toggle = if post.is_liked_by(user) {
                post.likes.retain(|id| *id != user);
                Toggle::Removed
            } else {
                push_unique(&mut post.likes, user);
                Toggle::Added
            };
            post.updated_at = Utc::now();
            (toggle, post.clone())
        }))
    }

    pub async fn delete_post_cascade(&self, id: Uuid) -> StoreResult<Option<Post>> {
        let mut data = self.inner.write().await;
        let Some(post) = data.posts.remove(&id) else {
            return Ok(None);
        };
        data.comments.retain(|_, c| c.post != id);
        if let Some(owner) = data.users.get_mut(&post.user) {
            owner.posts.retain(|p| *p != id);
            owner.updated_at = Utc::now();
        }
        Ok(Some(post))
    }

    pub async fn insert_comment(&self, comment: &Comment) -> StoreResult<Option<Comment>> {
        let mut data = self.inner.write().await;
        let Some(post) = data.posts.get_mut(&comment.post) else {
            return Ok(None);
        };
        post.comments.push(comment.id);
        post.updated_at = Utc::now();
        data.comments.insert(comment.id, comment.clone());
        Ok(Some(comment.clone()))
    }

    pub async fn comment_by_id(&self, id: Uuid) -> StoreResult<Option<Comment>> {
        Ok(self.inner.read().await.comments.get(&id).cloned())
    }

    pub async fn comments_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Comment>> {
        let data = self.inner.read().await;
        let found: Vec<Comment> = ids
            .iter()
            .filter_map(|id| data.comments.get(id).cloned())
            .collect();
        Ok(order_by_ids(ids, found, |c| c.id))
    }

    pub async fn comments_by_post(&self, post: Uuid) -> StoreResult<Vec<Comment>> {
        let data = self.inner.read().await;
        let mut comments: Vec<Comment> = data
            .comments
            .values()
            .filter(|c| c.post == post)
            .cloned()
            .collect();
        comments.sort_by_key(|c| (c.created_at, c.id));
        Ok(comments)
    }

    pub async fn update_comment_description(
        &self,
        id: Uuid,
        description: &str,
    ) -> StoreResult<Option<Comment>> {
        let mut data = self.inner.write().await;
        Ok(data.comments.get_mut(&id).map(|comment| {
            comment.description = description.to_string();
            comment.updated_at = Utc::now();
            comment.clone()
        }))
    }

    pub async fn delete_comment(&self, id: Uuid) -> StoreResult<Option<Comment>> {
        let mut data = self.inner.write().await;
        let Some(comment) = data.comments.remove(&id) else {
            return Ok(None);
        };
        if let Some(post) = data.posts.get_mut(&comment.post) {
            post.comments.retain(|c| *c != id);
            post.updated_at = Utc::now();
        }
        Ok(Some(comment))
    }
}
