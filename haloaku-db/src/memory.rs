use crate::{
    client::{DbError, Result},
    store::{PostQuery, PostSlice, Store},
};
use async_trait::async_trait;
use haloaku_common::model::{
    Id,
    like::{PostLike, PostLikeMarker},
    post::{Post, PostMarker, ValidatedPost},
    session::SessionId,
};
use std::{
    collections::{HashMap, HashSet},
    sync::{Mutex, MutexGuard, PoisonError},
};
use time::OffsetDateTime;

/// [`Store`] kept in process memory. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    posts: Vec<PostRow>,
    likes: Vec<PostLike>,
    last_post_id: i64,
    last_like_id: i64,
}

#[derive(Clone, Debug)]
struct PostRow {
    id: Id<PostMarker>,
    name: String,
    is_anonymous: bool,
    dari: String,
    untuk: String,
    pesan: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn like_rows(&self, post_id: Id<PostMarker>, session: &SessionId) -> usize {
        self.tables()
            .likes
            .iter()
            .filter(|like| like.post_id == post_id && &like.user_session == session)
            .count()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Tables {
    fn like_counts(&self) -> HashMap<Id<PostMarker>, u64> {
        let mut counts = HashMap::new();
        for like in &self.likes {
            *counts.entry(like.post_id).or_insert(0) += 1;
        }
        counts
    }
}

impl PostRow {
    fn to_post(&self, likes: u64) -> Post {
        Post {
            id: self.id,
            name: self.name.clone(),
            is_anonymous: self.is_anonymous,
            dari: self.dari.clone(),
            untuk: self.untuk.clone(),
            pesan: self.pesan.clone(),
            likes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_post(&self, post: &ValidatedPost) -> Result<Post> {
        let mut tables = self.tables();
        tables.last_post_id += 1;

        let now = OffsetDateTime::now_utc();
        let row = PostRow {
            id: Id::new(tables.last_post_id),
            name: post.name().to_owned(),
            is_anonymous: post.is_anonymous(),
            dari: post.dari().to_owned(),
            untuk: post.untuk().to_owned(),
            pesan: post.pesan().to_owned(),
            created_at: now,
            updated_at: now,
        };
        let inserted = row.to_post(0);
        tables.posts.push(row);

        Ok(inserted)
    }

    async fn fetch_post(&self, post_id: Id<PostMarker>) -> Result<Option<Post>> {
        let tables = self.tables();
        let likes = tables.like_counts();

        Ok(tables
            .posts
            .iter()
            .find(|row| row.id == post_id)
            .map(|row| row.to_post(likes.get(&row.id).copied().unwrap_or(0))))
    }

    async fn select_posts(&self, query: &PostQuery) -> Result<PostSlice> {
        let tables = self.tables();
        let likes = tables.like_counts();

        let mut matching: Vec<&PostRow> = tables
            .posts
            .iter()
            .filter(|row| {
                query
                    .search
                    .as_ref()
                    .is_none_or(|search| search.matches(&row.name, &row.pesan))
            })
            .collect();
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let total_count = u64::try_from(matching.len()).unwrap_or(u64::MAX);
        let offset = usize::try_from(query.range.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.range.limit).unwrap_or(usize::MAX);
        let posts = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|row| row.to_post(likes.get(&row.id).copied().unwrap_or(0)))
            .collect();

        Ok(PostSlice { posts, total_count })
    }

    async fn find_like(
        &self,
        post_id: Id<PostMarker>,
        session: &SessionId,
    ) -> Result<Option<Id<PostLikeMarker>>> {
        Ok(self
            .tables()
            .likes
            .iter()
            .filter(|like| like.post_id == post_id && &like.user_session == session)
            .map(|like| like.id)
            .min())
    }

    async fn insert_like(&self, post_id: Id<PostMarker>, session: &SessionId) -> Result<PostLike> {
        let mut tables = self.tables();
        if !tables.posts.iter().any(|row| row.id == post_id) {
            return Err(DbError::PostNotFound(post_id));
        }

        tables.last_like_id += 1;
        let like = PostLike {
            id: Id::new(tables.last_like_id),
            post_id,
            user_session: session.clone(),
            created_at: OffsetDateTime::now_utc(),
        };
        tables.likes.push(like.clone());

        Ok(like)
    }

    async fn delete_like(&self, like_id: Id<PostLikeMarker>) -> Result<()> {
        self.tables().likes.retain(|like| like.id != like_id);
        Ok(())
    }

    async fn liked_posts(
        &self,
        session: &SessionId,
        post_ids: &[Id<PostMarker>],
    ) -> Result<HashSet<Id<PostMarker>>> {
        Ok(self
            .tables()
            .likes
            .iter()
            .filter(|like| &like.user_session == session && post_ids.contains(&like.post_id))
            .map(|like| like.post_id)
            .collect())
    }
}
