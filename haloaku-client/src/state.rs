use haloaku_common::{
    feed::{DEFAULT_PAGE_SIZE, FeedPage, MAX_PAGE_SIZE, PageRequest, total_pages},
    model::{
        Id,
        like::LikeToggle,
        post::{Post, PostMarker},
    },
};
use std::{collections::HashSet, fmt::Display, num::NonZeroU32, ops::Range};
use tracing::{debug, warn};

pub const PAGE_WINDOW: u64 = 5;

/// Stamp of one feed load. Only the most recently issued ticket may change
/// the displayed page.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
#[must_use]
pub struct LoadTicket {
    sequence: u64,
    request: PageRequest,
    query: String,
}

impl LoadTicket {
    #[must_use]
    pub fn request(&self) -> PageRequest {
        self.request
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum LoadOutcome<E> {
    Applied,
    Stale,
    Failed(E),
}

#[derive(Clone, Debug)]
pub struct FeedState {
    page: NonZeroU32,
    page_size: NonZeroU32,
    query: String,
    posts: Vec<Post>,
    total_count: u64,
    liked: HashSet<Id<PostMarker>>,
    latest: u64,
    loading: bool,
}

impl FeedState {
    /// `page_size` is capped at what the server serves per page.
    #[must_use]
    pub fn new(page_size: NonZeroU32) -> Self {
        Self {
            page: NonZeroU32::MIN,
            page_size: page_size.min(MAX_PAGE_SIZE),
            query: String::new(),
            posts: Vec::new(),
            total_count: 0,
            liked: HashSet::new(),
            latest: 0,
            loading: false,
        }
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.latest += 1;
        self.loading = true;

        LoadTicket {
            sequence: self.latest,
            request: PageRequest::new(self.page, self.page_size),
            query: self.query.clone(),
        }
    }

    pub fn finish_load<E: Display>(
        &mut self,
        ticket: LoadTicket,
        result: Result<FeedPage, E>,
    ) -> LoadOutcome<E> {
        if ticket.sequence != self.latest {
            debug!(
                sequence = ticket.sequence,
                latest = self.latest,
                "Dropping superseded feed load"
            );
            return LoadOutcome::Stale;
        }
        self.loading = false;

        match result {
            Ok(page) => {
                for post in &page.posts {
                    self.liked.remove(&post.id);
                }
                self.liked.extend(page.liked);
                self.posts = page.posts;
                self.total_count = page.total_count;

                LoadOutcome::Applied
            }
            Err(err) => {
                warn!(error = %err, "Loading posts failed");
                LoadOutcome::Failed(err)
            }
        }
    }

    /// Applies a toggle the server completed. Every completed toggle added
    /// or removed exactly one row, so the count always moves.
    pub fn apply_toggle(&mut self, post_id: Id<PostMarker>, toggle: LikeToggle) {
        self.mark_liked(post_id, toggle.liked);
        self.adjust_likes(post_id, toggle.liked);
    }

    /// Reconciles the like state reported by a failed toggle. Nothing moves
    /// unless it disagrees with what is shown.
    pub fn reconcile_liked(&mut self, post_id: Id<PostMarker>, liked: bool) {
        if self.mark_liked(post_id, liked) {
            self.adjust_likes(post_id, liked);
        }
    }

    fn mark_liked(&mut self, post_id: Id<PostMarker>, liked: bool) -> bool {
        if liked {
            self.liked.insert(post_id)
        } else {
            self.liked.remove(&post_id)
        }
    }

    fn adjust_likes(&mut self, post_id: Id<PostMarker>, liked: bool) {
        if let Some(post) = self.posts.iter_mut().find(|post| post.id == post_id) {
            post.likes = if liked {
                post.likes + 1
            } else {
                post.likes.saturating_sub(1)
            };
        }
    }

    pub fn set_page(&mut self, page: NonZeroU32) -> bool {
        if u64::from(page.get()) > self.total_pages() || page == self.page {
            return false;
        }
        self.page = page;
        true
    }

    pub fn set_query(&mut self, query: impl Into<String>) -> bool {
        let query = query.into();
        if query == self.query && self.page == NonZeroU32::MIN {
            return false;
        }
        self.query = query;
        self.page = NonZeroU32::MIN;
        true
    }

    #[must_use]
    pub fn needs_reload_after_submit(&self) -> bool {
        self.page == NonZeroU32::MIN
    }

    #[must_use]
    pub fn total_pages(&self) -> u64 {
        total_pages(self.total_count, self.page_size)
    }

    #[must_use]
    pub fn page_window(&self) -> Range<u64> {
        let total = self.total_pages();
        let current = u64::from(self.page.get());
        let start = total
            .saturating_sub(PAGE_WINDOW - 1)
            .min(current.saturating_sub(2))
            .max(1);

        start..start + PAGE_WINDOW.min(total)
    }

    #[must_use]
    pub fn is_liked(&self, post_id: Id<PostMarker>) -> bool {
        self.liked.contains(&post_id)
    }

    #[must_use]
    pub fn page(&self) -> NonZeroU32 {
        self.page
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    #[must_use]
    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

impl Default for FeedState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}
