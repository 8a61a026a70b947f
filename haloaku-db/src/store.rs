use crate::client::Result;
use async_trait::async_trait;
use haloaku_common::{
    feed::{PageRange, SearchQuery},
    model::{
        Id,
        like::{PostLike, PostLikeMarker},
        post::{Post, PostMarker, ValidatedPost},
        session::SessionId,
    },
};
use std::{collections::HashSet, fmt::Debug};

#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub struct PostQuery {
    pub search: Option<SearchQuery>,
    pub range: PageRange,
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct PostSlice {
    pub posts: Vec<Post>,
    pub total_count: u64,
}

/// A tabular store holding `posts` and `post_likes`.
///
/// Every method is one independent read or write. Implementations attach the
/// like count to each returned [`Post`] as part of the same read.
#[async_trait]
pub trait Store: Debug + Send + Sync {
    async fn insert_post(&self, post: &ValidatedPost) -> Result<Post>;

    async fn fetch_post(&self, post_id: Id<PostMarker>) -> Result<Option<Post>>;

    /// Posts ordered by `created_at` descending, ties broken by newest id.
    async fn select_posts(&self, query: &PostQuery) -> Result<PostSlice>;

    /// `Ok(None)` means there is no like for the pair; it is not an error.
    async fn find_like(
        &self,
        post_id: Id<PostMarker>,
        session: &SessionId,
    ) -> Result<Option<Id<PostLikeMarker>>>;

    async fn insert_like(&self, post_id: Id<PostMarker>, session: &SessionId) -> Result<PostLike>;

    async fn delete_like(&self, like_id: Id<PostLikeMarker>) -> Result<()>;

    async fn liked_posts(
        &self,
        session: &SessionId,
        post_ids: &[Id<PostMarker>],
    ) -> Result<HashSet<Id<PostMarker>>>;
}
