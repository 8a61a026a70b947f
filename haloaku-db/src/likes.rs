use crate::{client::DbError, store::Store};
use haloaku_common::model::{
    Id,
    like::LikeToggle,
    post::PostMarker,
    session::SessionId,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

/// A toggle that did not complete. [`ToggleError::liked`] is the like state
/// the pair is known to be in afterwards.
#[derive(Debug, Error)]
pub enum ToggleError {
    #[error("Looking up the existing like failed: {0}")]
    Lookup(#[source] DbError),
    #[error("Removing the like failed: {0}")]
    Unlike(#[source] DbError),
    #[error("Adding the like failed: {0}")]
    Like(#[source] DbError),
}

impl ToggleError {
    /// Only a failed unlike leaves a like in place. A failed lookup reports
    /// `false` and callers must not assume anything changed.
    #[must_use]
    pub fn liked(&self) -> bool {
        matches!(self, ToggleError::Unlike(_))
    }

    #[must_use]
    pub fn db_error(&self) -> &DbError {
        match self {
            ToggleError::Lookup(err) | ToggleError::Unlike(err) | ToggleError::Like(err) => err,
        }
    }
}

/// Flips the like of one session on one post.
///
/// The toggle reads, then writes, without a transaction. Two toggles for the
/// same pair racing each other (two tabs sharing a session id) can both see no
/// like and insert two rows. The derived like count shows the extra row until
/// a later toggle removes it; nothing here prevents the race.
#[derive(Clone, Debug)]
pub struct LikeService {
    store: Arc<dyn Store>,
}

impl LikeService {
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn toggle(
        &self,
        post_id: Id<PostMarker>,
        session: &SessionId,
    ) -> Result<LikeToggle, ToggleError> {
        let existing = self
            .store
            .find_like(post_id, session)
            .await
            .map_err(ToggleError::Lookup)
            .inspect_err(|err| error!(error = %err, %post_id, "Checking like failed"))?;

        if let Some(like_id) = existing {
            self.store
                .delete_like(like_id)
                .await
                .map_err(ToggleError::Unlike)
                .inspect_err(|err| error!(error = %err, %post_id, "Removing like failed"))?;
            debug!(%post_id, %like_id, "Removed like");

            Ok(LikeToggle { liked: false })
        } else {
            let like = self
                .store
                .insert_like(post_id, session)
                .await
                .map_err(ToggleError::Like)
                .inspect_err(|err| error!(error = %err, %post_id, "Adding like failed"))?;
            debug!(%post_id, like_id = %like.id, "Added like");

            Ok(LikeToggle { liked: true })
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        client::DbError,
        feed::FeedService,
        likes::{LikeService, ToggleError},
        memory::MemoryStore,
        store::Store,
        testing::{FailingStore, Operation, seed},
    };
    use haloaku_common::model::{Id, like::LikeToggle, session::SessionId};
    use std::sync::Arc;

    fn session(id: &str) -> SessionId {
        id.parse().unwrap()
    }

    #[tokio::test]
    async fn toggling_twice_restores_the_original_state() {
        let store = Arc::new(MemoryStore::new());
        let post = seed(store.as_ref(), 1).await.remove(0);
        let likes = LikeService::new(store.clone());
        let feed = FeedService::new(store.clone());
        let sess = session("sess-1");

        assert_eq!(
            likes.toggle(post.id, &sess).await.unwrap(),
            LikeToggle { liked: true }
        );
        assert_eq!(feed.fetch_post(post.id).await.unwrap().unwrap().likes, 1);
        assert_eq!(store.like_rows(post.id, &sess), 1);

        assert_eq!(
            likes.toggle(post.id, &sess).await.unwrap(),
            LikeToggle { liked: false }
        );
        assert_eq!(feed.fetch_post(post.id).await.unwrap().unwrap().likes, 0);
        assert_eq!(store.like_rows(post.id, &sess), 0);
    }

    #[tokio::test]
    async fn at_most_one_like_per_pair() {
        let store = Arc::new(MemoryStore::new());
        let post = seed(store.as_ref(), 1).await.remove(0);
        let likes = LikeService::new(store.clone());
        let sess = session("sess-1");

        for round in 1..=7 {
            let toggle = likes.toggle(post.id, &sess).await.unwrap();
            assert_eq!(toggle.liked, round % 2 == 1);
            assert!(store.like_rows(post.id, &sess) <= 1);
        }
    }

    #[tokio::test]
    async fn sessions_like_independently() {
        let store = Arc::new(MemoryStore::new());
        let post = seed(store.as_ref(), 1).await.remove(0);
        let likes = LikeService::new(store.clone());

        likes.toggle(post.id, &session("a")).await.unwrap();
        likes.toggle(post.id, &session("b")).await.unwrap();
        likes.toggle(post.id, &session("a")).await.unwrap();

        assert_eq!(store.fetch_post(post.id).await.unwrap().unwrap().likes, 1);
        assert_eq!(store.like_rows(post.id, &session("b")), 1);
    }

    #[tokio::test]
    async fn unlike_removes_a_duplicate_row_one_at_a_time() {
        let store = Arc::new(MemoryStore::new());
        let post = seed(store.as_ref(), 1).await.remove(0);
        let sess = session("tabs");
        store.insert_like(post.id, &sess).await.unwrap();
        store.insert_like(post.id, &sess).await.unwrap();
        let likes = LikeService::new(store.clone());

        assert!(!likes.toggle(post.id, &sess).await.unwrap().liked);
        assert_eq!(store.like_rows(post.id, &sess), 1);
        assert!(!likes.toggle(post.id, &sess).await.unwrap().liked);
        assert_eq!(store.like_rows(post.id, &sess), 0);
    }

    #[tokio::test]
    async fn failed_lookup_reports_not_liked() {
        let store = Arc::new(FailingStore::failing([Operation::FindLike]));
        let post = seed(store.as_ref(), 1).await.remove(0);
        let likes = LikeService::new(store.clone());

        let err = likes.toggle(post.id, &session("s")).await.unwrap_err();

        assert!(matches!(err, ToggleError::Lookup(_)));
        assert!(!err.liked());
        assert_eq!(store.inner.like_rows(post.id, &session("s")), 0);
    }

    #[tokio::test]
    async fn failed_unlike_reports_still_liked() {
        let store = Arc::new(FailingStore::failing([Operation::DeleteLike]));
        let post = seed(store.as_ref(), 1).await.remove(0);
        let sess = session("s");
        store.inner.insert_like(post.id, &sess).await.unwrap();
        let likes = LikeService::new(store.clone());

        let err = likes.toggle(post.id, &sess).await.unwrap_err();

        assert!(matches!(err, ToggleError::Unlike(_)));
        assert!(err.liked());
        assert_eq!(store.inner.like_rows(post.id, &sess), 1);
    }

    #[tokio::test]
    async fn failed_like_reports_not_liked() {
        let store = Arc::new(FailingStore::failing([Operation::InsertLike]));
        let post = seed(store.as_ref(), 1).await.remove(0);
        let likes = LikeService::new(store.clone());

        let err = likes.toggle(post.id, &session("s")).await.unwrap_err();

        assert!(matches!(err, ToggleError::Like(_)));
        assert!(!err.liked());
        assert!(matches!(err.db_error(), DbError::Sqlx(_)));
    }

    #[tokio::test]
    async fn liking_a_missing_post_is_reported() {
        let likes = LikeService::new(Arc::new(MemoryStore::new()));

        let err = likes.toggle(Id::new(404), &session("s")).await.unwrap_err();

        assert!(matches!(
            err,
            ToggleError::Like(DbError::PostNotFound(id)) if id == Id::new(404)
        ));
    }
}
