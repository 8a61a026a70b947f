use haloaku_common::model::{
    ModelValidationError,
    like::PostLike,
    post::Post,
    session::SessionId,
};
use sqlx::FromRow;
use time::OffsetDateTime;

#[derive(Clone, Eq, PartialEq, Debug, Hash, FromRow)]
pub(crate) struct PostRecord {
    pub id: i64,
    pub name: String,
    pub is_anonymous: bool,
    pub dari: String,
    pub untuk: String,
    pub pesan: String,
    pub likes: i64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, FromRow)]
pub(crate) struct PostLikeRecord {
    pub id: i64,
    pub post_id: i64,
    pub user_session: String,
    pub created_at: OffsetDateTime,
}

impl TryFrom<PostRecord> for Post {
    type Error = ModelValidationError;

    fn try_from(value: PostRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.into(),
            name: value.name,
            is_anonymous: value.is_anonymous,
            dari: value.dari,
            untuk: value.untuk,
            pesan: value.pesan,
            likes: u64::try_from(value.likes)
                .map_err(|_| ModelValidationError::NegativeCount(value.likes))?,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

impl TryFrom<PostLikeRecord> for PostLike {
    type Error = ModelValidationError;

    fn try_from(value: PostLikeRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: value.id.into(),
            post_id: value.post_id.into(),
            user_session: SessionId::new(value.user_session)?,
            created_at: value.created_at,
        })
    }
}
