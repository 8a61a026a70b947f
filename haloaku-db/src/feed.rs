use crate::{
    client::Result,
    store::{PostQuery, Store},
};
use haloaku_common::{
    feed::{FeedPage, PageRequest, SearchQuery},
    model::{
        Id,
        post::{Post, PostMarker, ValidatedPost},
        session::SessionId,
    },
};
use std::sync::Arc;
use tracing::{debug, error};

#[derive(Clone, Debug)]
pub struct FeedService {
    store: Arc<dyn Store>,
}

impl FeedService {
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn fetch(
        &self,
        request: PageRequest,
        search: Option<&SearchQuery>,
        session: Option<&SessionId>,
    ) -> Result<FeedPage> {
        match search.filter(|query| !query.is_blank()) {
            Some(query) => self.search_page(query, request, session).await,
            None => self.fetch_page(request, session).await,
        }
    }

    /// The newest posts first. A page past the end is empty but still carries
    /// the total count.
    pub async fn fetch_page(
        &self,
        request: PageRequest,
        session: Option<&SessionId>,
    ) -> Result<FeedPage> {
        let query = PostQuery {
            search: None,
            range: request.range(),
        };

        self.page(&query, session)
            .await
            .inspect_err(|err| error!(error = %err, ?request, "Fetching posts failed"))
    }

    /// The query is used as given. An empty query matches every post.
    pub async fn search_page(
        &self,
        query: &SearchQuery,
        request: PageRequest,
        session: Option<&SessionId>,
    ) -> Result<FeedPage> {
        let post_query = PostQuery {
            search: Some(query.clone()),
            range: request.range(),
        };

        self.page(&post_query, session).await.inspect_err(|err| {
            error!(error = %err, query = query.get(), ?request, "Searching posts failed");
        })
    }

    pub async fn create_post(&self, post: &ValidatedPost) -> Result<Post> {
        let post = self
            .store
            .insert_post(post)
            .await
            .inspect_err(|err| error!(error = %err, "Creating post failed"))?;
        debug!(id = %post.id, "Created post");

        Ok(post)
    }

    pub async fn fetch_post(&self, post_id: Id<PostMarker>) -> Result<Option<Post>> {
        self.store.fetch_post(post_id).await
    }

    async fn page(&self, query: &PostQuery, session: Option<&SessionId>) -> Result<FeedPage> {
        let slice = self.store.select_posts(query).await?;

        let liked = match session {
            Some(session) if !slice.posts.is_empty() => {
                let ids: Vec<Id<PostMarker>> = slice.posts.iter().map(|post| post.id).collect();
                let liked = self.store.liked_posts(session, &ids).await?;
                ids.into_iter().filter(|id| liked.contains(id)).collect()
            }
            _ => Vec::new(),
        };

        Ok(FeedPage {
            posts: slice.posts,
            total_count: slice.total_count,
            liked,
        })
    }
}
