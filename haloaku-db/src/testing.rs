use crate::{
    client::{DbError, Result},
    memory::MemoryStore,
    store::{PostQuery, PostSlice, Store},
};
use async_trait::async_trait;
use haloaku_common::model::{
    Id,
    like::{PostLike, PostLikeMarker},
    post::{CreatePost, Post, PostMarker, ValidatedPost},
    session::SessionId,
};
use std::collections::HashSet;

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
pub(crate) enum Operation {
    SelectPosts,
    FindLike,
    InsertLike,
    DeleteLike,
    LikedPosts,
}

#[derive(Debug, Default)]
pub(crate) struct FailingStore {
    pub inner: MemoryStore,
    pub failing: HashSet<Operation>,
}

impl FailingStore {
    pub fn failing(operations: impl IntoIterator<Item = Operation>) -> Self {
        Self {
            inner: MemoryStore::new(),
            failing: operations.into_iter().collect(),
        }
    }

    fn check(&self, operation: Operation) -> Result<()> {
        if self.failing.contains(&operation) {
            Err(DbError::Sqlx(sqlx::Error::PoolTimedOut))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Store for FailingStore {
    async fn insert_post(&self, post: &ValidatedPost) -> Result<Post> {
        self.inner.insert_post(post).await
    }

    async fn fetch_post(&self, post_id: Id<PostMarker>) -> Result<Option<Post>> {
        self.inner.fetch_post(post_id).await
    }

    async fn select_posts(&self, query: &PostQuery) -> Result<PostSlice> {
        self.check(Operation::SelectPosts)?;
        self.inner.select_posts(query).await
    }

    async fn find_like(
        &self,
        post_id: Id<PostMarker>,
        session: &SessionId,
    ) -> Result<Option<Id<PostLikeMarker>>> {
        self.check(Operation::FindLike)?;
        self.inner.find_like(post_id, session).await
    }

    async fn insert_like(&self, post_id: Id<PostMarker>, session: &SessionId) -> Result<PostLike> {
        self.check(Operation::InsertLike)?;
        self.inner.insert_like(post_id, session).await
    }

    async fn delete_like(&self, like_id: Id<PostLikeMarker>) -> Result<()> {
        self.check(Operation::DeleteLike)?;
        self.inner.delete_like(like_id).await
    }

    async fn liked_posts(
        &self,
        session: &SessionId,
        post_ids: &[Id<PostMarker>],
    ) -> Result<HashSet<Id<PostMarker>>> {
        self.check(Operation::LikedPosts)?;
        self.inner.liked_posts(session, post_ids).await
    }
}

pub(crate) fn letter(name: &str, pesan: &str) -> CreatePost {
    CreatePost {
        name: name.to_owned(),
        is_anonymous: false,
        dari: "25".to_owned(),
        untuk: "17".to_owned(),
        pesan: pesan.to_owned(),
    }
}

/// Inserts `count` letters named `writer 0..count`, oldest first.
pub(crate) async fn seed(store: &dyn Store, count: usize) -> Vec<Post> {
    let mut posts = Vec::with_capacity(count);
    for i in 0..count {
        let post = letter(&format!("writer {i}"), &format!("letter number {i}"))
            .validate()
            .unwrap();
        posts.push(store.insert_post(&post).await.unwrap());
    }
    posts
}
