use crate::model::{Id, post::PostMarker, session::SessionId};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct PostLikeMarker;

/// One session's like on one post. At most one of these exists per
/// `(post_id, user_session)` pair.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct PostLike {
    pub id: Id<PostLikeMarker>,
    pub post_id: Id<PostMarker>,
    pub user_session: SessionId,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize, Serialize)]
pub struct ToggleLikeRequest {
    pub session: SessionId,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Deserialize, Serialize)]
pub struct LikeToggle {
    pub liked: bool,
}
