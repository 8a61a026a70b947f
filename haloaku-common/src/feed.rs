use crate::model::{
    Id,
    post::{Post, PostMarker},
    session::SessionId,
};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

pub const DEFAULT_PAGE_SIZE: NonZeroU32 = NonZeroU32::new(30).unwrap();
pub const MAX_PAGE_SIZE: NonZeroU32 = NonZeroU32::new(100).unwrap();

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Deserialize, Serialize)]
pub struct PageRequest {
    pub page: NonZeroU32,
    pub page_size: NonZeroU32,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash)]
pub struct PageRange {
    pub offset: u64,
    pub limit: u32,
}

impl PageRequest {
    #[must_use]
    pub fn new(page: NonZeroU32, page_size: NonZeroU32) -> Self {
        Self { page, page_size }
    }

    #[must_use]
    pub fn first(page_size: NonZeroU32) -> Self {
        Self::new(NonZeroU32::MIN, page_size)
    }

    #[must_use]
    pub fn clamped(self, max_page_size: NonZeroU32) -> Self {
        Self {
            page_size: self.page_size.min(max_page_size),
            ..self
        }
    }

    #[must_use]
    pub fn range(self) -> PageRange {
        let page_size = self.page_size.get();
        PageRange {
            offset: u64::from(self.page.get() - 1) * u64::from(page_size),
            limit: page_size,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(DEFAULT_PAGE_SIZE)
    }
}

impl PageRange {
    #[must_use]
    pub fn last(self) -> u64 {
        self.offset + u64::from(self.limit) - 1
    }
}

#[must_use]
pub fn total_pages(total_count: u64, page_size: NonZeroU32) -> u64 {
    total_count.div_ceil(u64::from(page_size.get()))
}

/// Free text typed into the search box.
///
/// Matching is a case-insensitive substring test against the author name or
/// the message. A blank query matches everything; callers that want the
/// unfiltered feed route blank queries away from search themselves.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct SearchQuery(String);

impl SearchQuery {
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self(query.into())
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// `ILIKE` pattern for the query with `\`, `%` and `_` escaped.
    #[must_use]
    pub fn like_pattern(&self) -> String {
        let mut pattern = String::with_capacity(self.0.len() + 2);
        pattern.push('%');
        for c in self.0.chars() {
            if matches!(c, '\\' | '%' | '_') {
                pattern.push('\\');
            }
            pattern.push(c);
        }
        pattern.push('%');
        pattern
    }

    #[must_use]
    pub fn matches(&self, name: &str, pesan: &str) -> bool {
        let needle = self.0.to_lowercase();
        name.to_lowercase().contains(&needle) || pesan.to_lowercase().contains(&needle)
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
pub struct FeedParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<NonZeroU32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<NonZeroU32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionId>,
}

impl FeedParams {
    #[must_use]
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(
            self.page.unwrap_or(NonZeroU32::MIN),
            self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        )
    }

    #[must_use]
    pub fn search(&self) -> Option<SearchQuery> {
        self.q
            .as_deref()
            .map(SearchQuery::new)
            .filter(|query| !query.is_blank())
    }
}

/// One page of the feed plus the number of posts across all pages.
///
/// The default value is the empty page callers fall back to when a fetch
/// fails.
#[derive(Clone, Eq, PartialEq, Debug, Default, Hash, Deserialize, Serialize)]
pub struct FeedPage {
    pub posts: Vec<Post>,
    pub total_count: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub liked: Vec<Id<PostMarker>>,
}

#[cfg(test)]
mod tests {
    use crate::feed::{
        DEFAULT_PAGE_SIZE, FeedParams, MAX_PAGE_SIZE, PageRange, PageRequest, SearchQuery,
        total_pages,
    };
    use std::num::NonZeroU32;

    fn nz(value: u32) -> NonZeroU32 {
        NonZeroU32::new(value).unwrap()
    }

    #[test]
    fn page_ranges() {
        assert_eq!(
            PageRequest::new(nz(1), nz(30)).range(),
            PageRange {
                offset: 0,
                limit: 30
            }
        );

        let second = PageRequest::new(nz(2), nz(30)).range();
        assert_eq!(second.offset, 30);
        assert_eq!(second.last(), 59);

        let huge = PageRequest::new(nz(u32::MAX), nz(u32::MAX)).range();
        assert_eq!(
            huge.offset,
            u64::from(u32::MAX - 1) * u64::from(u32::MAX)
        );
    }

    #[test]
    fn page_size_is_clamped() {
        let request = PageRequest::new(nz(3), nz(5000)).clamped(MAX_PAGE_SIZE);
        assert_eq!(request.page, nz(3));
        assert_eq!(request.page_size, MAX_PAGE_SIZE);

        assert_eq!(PageRequest::default().page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn page_counts() {
        assert_eq!(total_pages(0, nz(30)), 0);
        assert_eq!(total_pages(30, nz(30)), 1);
        assert_eq!(total_pages(35, nz(30)), 2);
    }

    #[test]
    fn like_patterns_escape_wildcards() {
        assert_eq!(SearchQuery::new("abc").like_pattern(), "%abc%");
        assert_eq!(SearchQuery::new("100%").like_pattern(), "%100\\%%");
        assert_eq!(SearchQuery::new("a_b\\c").like_pattern(), "%a\\_b\\\\c%");
        assert_eq!(SearchQuery::new("").like_pattern(), "%%");
    }

    #[test]
    fn matching_is_case_insensitive_across_name_or_message() {
        let query = SearchQuery::new("abc");

        assert!(query.matches("Abc", "x"));
        assert!(query.matches("y", "has ABC inside"));
        assert!(!query.matches("z", "no match"));
        assert!(SearchQuery::new("").matches("z", "no match"));
    }

    #[test]
    fn blank_search_text_is_no_search() {
        let params = FeedParams {
            q: Some("   ".to_owned()),
            ..FeedParams::default()
        };
        assert_eq!(params.search(), None);
        assert_eq!(params.page_request(), PageRequest::default());

        let params = FeedParams {
            q: Some(" hi".to_owned()),
            page: Some(nz(4)),
            ..FeedParams::default()
        };
        assert_eq!(params.search(), Some(SearchQuery::new(" hi")));
        assert_eq!(params.page_request().page, nz(4));
    }
}
