/**
 * User Directory Operations
 *
 * Lookups, search, random suggestions and profile updates. Every function
 * takes the store handle explicitly and returns `BackendResult`, so the
 * handlers and the admin routes share the same rules.
 *
 * # Profile Updates
 *
 * Only `username`, `email` and the profile picture can change through the
 * user-facing route; the admin route may also set `role`. Anything else in
 * the request is ignored. A replaced picture is removed from disk after the
 * record is updated.
 */

use uuid::Uuid;

use crate::backend::error::{BackendError, BackendResult};
use crate::backend::media::{MediaStore, Upload};
use crate::backend::middleware::AuthenticatedUser;
use crate::backend::store::{Store, UserChanges};
use crate::shared::models::User;
use crate::shared::validation::{parse_id, validate_email, validate_username};

/// Number of users returned by the random suggestion endpoint
pub const SUGGESTION_SAMPLE_SIZE: usize = 5;

/// Wildcard query that lists every user
pub const SEARCH_ALL: &str = "*";

/// Allow-listed fields of a self-service profile update
#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub profile_picture: Option<Upload>,
}

pub async fn user_by_username(store: &Store, username: &str) -> BackendResult<User> {
    store
        .user_by_username(username)
        .await?
        .ok_or_else(|| BackendError::not_found("User not found"))
}

pub async fn user_by_id(store: &Store, id: Uuid) -> BackendResult<User> {
    store
        .user_by_id(id)
        .await?
        .ok_or_else(|| BackendError::not_found("User not found"))
}

/// Look up a user by a client-supplied id string
pub async fn user_by_raw_id(store: &Store, raw_id: &str) -> BackendResult<User> {
    let id = parse_id("user id", raw_id)?;
    user_by_id(store, id).await
}

/// `*` lists everyone; anything else is a case-insensitive substring match
pub async fn search(store: &Store, query: Option<&str>) -> BackendResult<Vec<User>> {
    let query = query.map(str::trim).unwrap_or_default();
    if query.is_empty() {
        return Err(BackendError::invalid_argument("Search query is required"));
    }
    if query == SEARCH_ALL {
        return Ok(store.list_users().await?);
    }
    Ok(store.search_users(query).await?)
}

pub async fn posts_count(store: &Store, username: &str) -> BackendResult<usize> {
    Ok(user_by_username(store, username).await?.posts.len())
}

pub async fn suggest_random(store: &Store) -> BackendResult<Vec<User>> {
    let users = store.sample_users(SUGGESTION_SAMPLE_SIZE).await?;
    if users.is_empty() {
        return Err(BackendError::not_found("No users found"));
    }
    Ok(users)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Normalize `changes` against `target` and validate what is left.
///
/// Blank and unchanged values are dropped; a username already taken by
/// another account is a conflict.
async fn prepare_changes(
    store: &Store,
    target: &User,
    mut changes: UserChanges,
) -> BackendResult<UserChanges> {
    changes.username = non_empty(changes.username).filter(|u| *u != target.username);
    changes.email = non_empty(changes.email).filter(|e| *e != target.email);
    if changes.role == Some(target.role) {
        changes.role = None;
    }

    if let Some(username) = &changes.username {
        validate_username(username)?;
        if let Some(existing) = store.user_by_username(username).await? {
            if existing.id != target.id {
                return Err(BackendError::conflict("Username already exists"));
            }
        }
    }
    if let Some(email) = &changes.email {
        validate_email(email)?;
    }
    Ok(changes)
}

async fn write_changes(store: &Store, target: &User, changes: &UserChanges) -> BackendResult<User> {
    if changes.is_empty() {
        return Ok(target.clone());
    }
    let updated = store
        .update_user(target.id, changes)
        .await?
        .ok_or_else(|| BackendError::not_found("User not found"))?;
    tracing::info!("User updated: {} ({})", updated.username, updated.id);
    Ok(updated)
}

/// Validate `changes` against `target` and write them
pub async fn apply_changes(store: &Store, target: &User, changes: UserChanges) -> BackendResult<User> {
    let changes = prepare_changes(store, target, changes).await?;
    write_changes(store, target, &changes).await
}

/// Update a profile. Allowed for the user themself and for admins.
pub async fn update_profile(
    store: &Store,
    media: &MediaStore,
    actor: &AuthenticatedUser,
    raw_id: &str,
    update: ProfileUpdate,
) -> BackendResult<User> {
    let target = user_by_raw_id(store, raw_id).await?;
    if target.id != actor.id && !actor.is_admin() {
        tracing::warn!("{} attempted to update profile {}", actor.username, target.id);
        return Err(BackendError::unauthorized("You can only update your own profile"));
    }

    let text_changes = UserChanges {
        username: update.username,
        email: update.email,
        ..UserChanges::default()
    };
    let mut changes = prepare_changes(store, &target, text_changes).await?;

    if let Some(upload) = &update.profile_picture {
        changes.profile_picture = Some(media.save(upload).await?);
    }

    match write_changes(store, &target, &changes).await {
        Ok(updated) => {
            if changes.profile_picture.is_some() {
                if let Some(old) = &target.profile_picture {
                    media.remove(old).await;
                }
            }
            Ok(updated)
        }
        Err(e) => {
            if let Some(new) = &changes.profile_picture {
                media.remove(new).await;
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::Role;
    use assert_matches::assert_matches;
    use axum::http::StatusCode;
    use bytes::Bytes;

    async fn seed(store: &Store, username: &str, role: Role) -> User {
        store
            .insert_user(&User::new(username.into(), format!("{}@x.io", username), "h".into(), role))
            .await
            .unwrap()
    }

    fn media(dir: &tempfile::TempDir) -> MediaStore {
        MediaStore::new(dir.path(), "http://localhost:8000", 1024)
    }

    fn picture() -> Upload {
        Upload {
            file_name: "me.png".into(),
            content_type: Some("image/png".into()),
            data: Bytes::from_static(b"png"),
        }
    }

    #[tokio::test]
    async fn test_search() {
        let store = Store::memory();
        seed(&store, "alice", Role::User).await;
        seed(&store, "malice", Role::User).await;
        seed(&store, "bob", Role::User).await;

        assert_eq!(search(&store, Some("*")).await.unwrap().len(), 3);
        let mut found: Vec<String> = search(&store, Some("ALI"))
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        found.sort();
        assert_eq!(found, vec!["alice", "malice"]);
        assert_matches!(search(&store, None).await, Err(BackendError::InvalidArgument(_)));
        assert_matches!(search(&store, Some("  ")).await, Err(BackendError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_lookup_errors() {
        let store = Store::memory();
        assert_matches!(user_by_username(&store, "ghost").await, Err(BackendError::NotFound(_)));
        assert_matches!(user_by_raw_id(&store, "not-a-uuid").await, Err(BackendError::Validation(_)));
        assert_matches!(
            user_by_raw_id(&store, &Uuid::new_v4().to_string()).await,
            Err(BackendError::NotFound(_))
        );
        assert_matches!(suggest_random(&store).await, Err(BackendError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_suggest_random_caps_sample() {
        let store = Store::memory();
        for i in 0..8 {
            seed(&store, &format!("user{}", i), Role::User).await;
        }
        assert_eq!(suggest_random(&store).await.unwrap().len(), SUGGESTION_SAMPLE_SIZE);
    }

    #[tokio::test]
    async fn test_update_profile_self_and_admin_only() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::memory();
        let alice = seed(&store, "alice", Role::User).await;
        let bob = seed(&store, "bob", Role::User).await;
        let root = seed(&store, "root", Role::Admin).await;

        let update = || ProfileUpdate {
            email: Some("new@x.io".into()),
            ..Default::default()
        };

        let err = update_profile(&store, &media(&dir), &(&bob).into(), &alice.id.to_string(), update())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);

        let updated = update_profile(&store, &media(&dir), &(&alice).into(), &alice.id.to_string(), update())
            .await
            .unwrap();
        assert_eq!(updated.email, "new@x.io");

        let renamed = update_profile(
            &store,
            &media(&dir),
            &(&root).into(),
            &alice.id.to_string(),
            ProfileUpdate {
                username: Some("alicia".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(renamed.username, "alicia");
    }

    #[tokio::test]
    async fn test_update_profile_rejects_taken_username() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::memory();
        let alice = seed(&store, "alice", Role::User).await;
        seed(&store, "bob", Role::User).await;

        let err = update_profile(
            &store,
            &media(&dir),
            &(&alice).into(),
            &alice.id.to_string(),
            ProfileUpdate {
                username: Some("bob".into()),
                profile_picture: Some(picture()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(std::fs::read_dir(dir.path()).map(|d| d.count()).unwrap_or(0), 0);
    }

    #[tokio::test]
    async fn test_update_profile_replaces_picture() {
        let dir = tempfile::tempdir().unwrap();
        let media = media(&dir);
        let store = Store::memory();
        let alice = seed(&store, "alice", Role::User).await;
        let actor: AuthenticatedUser = (&alice).into();

        let first = update_profile(&store, &media, &actor, &alice.id.to_string(), ProfileUpdate {
            profile_picture: Some(picture()),
            ..Default::default()
        })
        .await
        .unwrap();
        let first_pic = first.profile_picture.clone().unwrap();

        let second = update_profile(&store, &media, &actor, &alice.id.to_string(), ProfileUpdate {
            profile_picture: Some(picture()),
            ..Default::default()
        })
        .await
        .unwrap();
        let second_pic = second.profile_picture.unwrap();

        assert_ne!(first_pic, second_pic);
        assert!(!dir.path().join(first_pic.trim_start_matches("/uploads/")).exists());
        assert!(dir.path().join(second_pic.trim_start_matches("/uploads/")).exists());
    }
}
