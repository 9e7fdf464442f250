/**
 * Feed Composition
 *
 * # Timeline
 *
 * Two windows are read with the same skip/limit: the user's own posts and
 * the posts of everyone they follow, each newest first. The page is the
 * own block followed by the followings block, not re-sorted. A page can
 * therefore hold up to `2 * limit` entries and is not globally ordered by
 * time; clients depend on this shape.
 *
 * # Random Feed
 *
 * Up to `RANDOM_SAMPLE_SIZE` posts in random order, skipping ids the client
 * already has. Posts whose owner is gone are dropped.
 */

use serde::Deserialize;
use uuid::Uuid;

use crate::backend::content::assemble;
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::store::Store;
use crate::backend::users::service::user_by_id;
use crate::shared::models::{FeedEntry, PostThread};
use crate::shared::validation::parse_id;

pub const DEFAULT_PAGE_LIMIT: usize = 10;
pub const MAX_PAGE_LIMIT: usize = 100;
pub const RANDOM_SAMPLE_SIZE: usize = 1000;

/// Raw `?page=&limit=` values
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Normalized 1-based page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: usize,
    pub limit: usize,
}

impl Page {
    pub fn from_query(query: &PageQuery) -> Self {
        let page = query.page.unwrap_or(1).max(1) as usize;
        let limit = query
            .limit
            .unwrap_or(DEFAULT_PAGE_LIMIT as i64)
            .clamp(1, MAX_PAGE_LIMIT as i64) as usize;
        Self { page, limit }
    }

    pub fn skip(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

pub async fn timeline(store: &Store, user_id: Uuid, page: Page) -> BackendResult<Vec<FeedEntry>> {
    let user = user_by_id(store, user_id).await?;

    let mut posts = store
        .posts_by_authors(&[user.id], page.skip(), Some(page.limit))
        .await?;
    let followed = store
        .posts_by_authors(&user.followings, page.skip(), Some(page.limit))
        .await?;
    tracing::debug!(
        "Timeline for {}: {} own, {} followed (page {}, limit {})",
        user.username,
        posts.len(),
        followed.len(),
        page.page,
        page.limit
    );
    posts.extend(followed);

    assemble::with_authors(store, posts).await
}

/// Collect excluded ids from repeated and comma-separated values, dropping
/// anything that is not a valid id.
pub fn parse_excluded<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<Uuid> {
    values
        .into_iter()
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .filter_map(|raw| parse_id("post id", raw).ok())
        .collect()
}

pub async fn random_posts(store: &Store, excluded: &[Uuid]) -> BackendResult<Vec<PostThread>> {
    let posts = store.sample_posts(excluded, RANDOM_SAMPLE_SIZE).await?;
    let threads = assemble::threads(store, posts).await?;
    if threads.is_empty() {
        return Err(BackendError::not_found("No posts found"));
    }
    Ok(threads)
}
