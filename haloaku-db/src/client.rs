use crate::{
    record::{PostLikeRecord, PostRecord},
    store::{PostQuery, PostSlice, Store},
};
use async_trait::async_trait;
use haloaku_common::{
    feed::SearchQuery,
    model::{
        Id, ModelValidationError,
        like::{PostLike, PostLikeMarker},
        post::{Post, PostMarker, ValidatedPost},
        session::SessionId,
    },
};
use sqlx::{PgPool, migrate::MigrateError, postgres::PgPoolOptions, query, query_as, query_scalar};
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

pub type Result<T, E = DbError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("An object in the database was invalid: {0}")]
    Data(#[from] ModelValidationError),
    #[error("Post with id {0} does not exist")]
    PostNotFound(Id<PostMarker>),
    #[error("Running migrations failed: {0}")]
    Migrate(#[from] MigrateError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

const POST_COLUMNS: &str = "
    posts.id,
    posts.name,
    posts.is_anonymous,
    posts.dari,
    posts.untuk,
    posts.pesan,
    COUNT(post_likes.id) AS likes,
    posts.created_at,
    posts.updated_at
";

#[derive(Clone, Debug)]
pub struct DbClient {
    pool: PgPool,
}

impl DbClient {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        debug!("Database migrations applied");

        Ok(())
    }
}

#[async_trait]
impl Store for DbClient {
    async fn insert_post(&self, post: &ValidatedPost) -> Result<Post> {
        let record = query_as::<_, PostRecord>(
            "
            INSERT INTO posts (name, is_anonymous, dari, untuk, pesan)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING
                id,
                name,
                is_anonymous,
                dari,
                untuk,
                pesan,
                0::BIGINT AS likes,
                created_at,
                updated_at
            ",
        )
        .bind(post.name())
        .bind(post.is_anonymous())
        .bind(post.dari())
        .bind(post.untuk())
        .bind(post.pesan())
        .fetch_one(&self.pool)
        .await?;

        Ok(Post::try_from(record)?)
    }

    async fn fetch_post(&self, post_id: Id<PostMarker>) -> Result<Option<Post>> {
        let record = query_as::<_, PostRecord>(&format!(
            "
            SELECT {POST_COLUMNS}
            FROM
                posts LEFT JOIN post_likes ON post_likes.post_id = posts.id
            WHERE
                posts.id = $1
            GROUP BY
                posts.id
            "
        ))
        .bind(post_id.get())
        .fetch_optional(&self.pool)
        .await?;

        let post = record.map(Post::try_from).transpose()?;
        Ok(post)
    }

    async fn select_posts(&self, query: &PostQuery) -> Result<PostSlice> {
        let pattern = query.search.as_ref().map(SearchQuery::like_pattern);
        let offset = i64::try_from(query.range.offset).unwrap_or(i64::MAX);

        let total_count: i64 = query_scalar(
            "
            SELECT COUNT(*)
            FROM
                posts
            WHERE
                $1::TEXT IS NULL
                OR posts.name ILIKE $1
                OR posts.pesan ILIKE $1
            ",
        )
        .bind(pattern.as_deref())
        .fetch_one(&self.pool)
        .await?;

        let records = query_as::<_, PostRecord>(&format!(
            "
            SELECT {POST_COLUMNS}
            FROM
                posts LEFT JOIN post_likes ON post_likes.post_id = posts.id
            WHERE
                $1::TEXT IS NULL
                OR posts.name ILIKE $1
                OR posts.pesan ILIKE $1
            GROUP BY
                posts.id
            ORDER BY
                posts.created_at DESC,
                posts.id DESC
            LIMIT $2
            OFFSET $3
            "
        ))
        .bind(pattern.as_deref())
        .bind(i64::from(query.range.limit))
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let posts = records
            .into_iter()
            .map(Post::try_from)
            .collect::<Result<_, _>>()?;

        Ok(PostSlice {
            posts,
            total_count: u64::try_from(total_count)
                .map_err(|_| ModelValidationError::NegativeCount(total_count))?,
        })
    }

    async fn find_like(
        &self,
        post_id: Id<PostMarker>,
        session: &SessionId,
    ) -> Result<Option<Id<PostLikeMarker>>> {
        let like_id: Option<i64> = query_scalar(
            "
            SELECT
                post_likes.id
            FROM
                post_likes
            WHERE
                post_likes.post_id = $1
                AND post_likes.user_session = $2
            ORDER BY
                post_likes.id
            LIMIT 1
            ",
        )
        .bind(post_id.get())
        .bind(session.get())
        .fetch_optional(&self.pool)
        .await?;

        Ok(like_id.map(Id::new))
    }

    async fn insert_like(&self, post_id: Id<PostMarker>, session: &SessionId) -> Result<PostLike> {
        let record = query_as::<_, PostLikeRecord>(
            "
            INSERT INTO post_likes (post_id, user_session)
            VALUES ($1, $2)
            RETURNING id, post_id, user_session, created_at
            ",
        )
        .bind(post_id.get())
        .bind(session.get())
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if err
                .as_database_error()
                .is_some_and(|db_err| db_err.is_foreign_key_violation())
            {
                DbError::PostNotFound(post_id)
            } else {
                DbError::Sqlx(err)
            }
        })?;

        Ok(PostLike::try_from(record)?)
    }

    async fn delete_like(&self, like_id: Id<PostLikeMarker>) -> Result<()> {
        query(
            "
            DELETE FROM post_likes
            WHERE post_likes.id = $1
            ",
        )
        .bind(like_id.get())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn liked_posts(
        &self,
        session: &SessionId,
        post_ids: &[Id<PostMarker>],
    ) -> Result<HashSet<Id<PostMarker>>> {
        if post_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let raw_ids: Vec<i64> = post_ids.iter().copied().map(Id::get).collect();
        let liked: Vec<i64> = query_scalar(
            "
            SELECT DISTINCT
                post_likes.post_id
            FROM
                post_likes
            WHERE
                post_likes.user_session = $1
                AND post_likes.post_id = ANY($2)
            ",
        )
        .bind(session.get())
        .bind(&raw_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(liked.into_iter().map(Id::new).collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        client::{DbClient, DbError},
        store::{PostQuery, Store},
        testing::letter,
    };
    use haloaku_common::{
        feed::{PageRequest, SearchQuery},
        model::{Id, post::Post, session::SessionId},
    };
    use sqlx::PgPool;

    async fn insert(client: &DbClient, name: &str, pesan: &str) -> Post {
        client
            .insert_post(&letter(name, pesan).validate().unwrap())
            .await
            .unwrap()
    }

    fn search(text: &str) -> PostQuery {
        PostQuery {
            search: Some(SearchQuery::new(text)),
            range: PageRequest::default().range(),
        }
    }

    #[sqlx::test]
    #[ignore = "requires a PostgreSQL server in DATABASE_URL"]
    async fn search_is_a_literal_case_insensitive_match(pool: PgPool) {
        let client = DbClient::new(pool);
        insert(&client, "Abc", "x").await;
        insert(&client, "y", "has ABC inside").await;
        insert(&client, "z", "100% yakin").await;
        insert(&client, "w", "1000 hari").await;

        let slice = client.select_posts(&search("abc")).await.unwrap();
        assert_eq!(slice.total_count, 2);
        let names: Vec<&str> = slice.posts.iter().map(|post| post.name.as_str()).collect();
        assert_eq!(names, ["y", "Abc"]);

        let slice = client.select_posts(&search("100%")).await.unwrap();
        assert_eq!(slice.total_count, 1);
        assert_eq!(slice.posts[0].pesan, "100% yakin");

        let slice = client.select_posts(&search("_")).await.unwrap();
        assert_eq!(slice.total_count, 0);
    }

    #[sqlx::test]
    #[ignore = "requires a PostgreSQL server in DATABASE_URL"]
    async fn pages_carry_live_like_counts(pool: PgPool) {
        let client = DbClient::new(pool);
        let older = insert(&client, "Rina", "Semangat ya").await;
        let newer = insert(&client, "Budi", "Tetap belajar").await;
        let alice: SessionId = "alice".parse().unwrap();
        let bob: SessionId = "bob".parse().unwrap();
        client.insert_like(older.id, &alice).await.unwrap();
        client.insert_like(older.id, &bob).await.unwrap();

        let slice = client
            .select_posts(&PostQuery {
                search: None,
                range: PageRequest::default().range(),
            })
            .await
            .unwrap();

        assert_eq!(slice.total_count, 2);
        assert_eq!(slice.posts[0].id, newer.id);
        assert_eq!(slice.posts[0].likes, 0);
        assert_eq!(slice.posts[1].likes, 2);
        assert_eq!(client.fetch_post(older.id).await.unwrap().unwrap().likes, 2);
        assert_eq!(client.fetch_post(Id::new(i64::MAX)).await.unwrap(), None);
    }

    #[sqlx::test]
    #[ignore = "requires a PostgreSQL server in DATABASE_URL"]
    async fn duplicate_likes_are_found_oldest_first(pool: PgPool) {
        let client = DbClient::new(pool);
        let post = insert(&client, "Rina", "Semangat ya").await;
        let session: SessionId = "tabs".parse().unwrap();
        let first = client.insert_like(post.id, &session).await.unwrap();
        let second = client.insert_like(post.id, &session).await.unwrap();

        assert_eq!(
            client.find_like(post.id, &session).await.unwrap(),
            Some(first.id)
        );
        client.delete_like(first.id).await.unwrap();
        assert_eq!(
            client.find_like(post.id, &session).await.unwrap(),
            Some(second.id)
        );

        let liked = client.liked_posts(&session, &[post.id]).await.unwrap();
        assert!(liked.contains(&post.id));

        client.delete_like(second.id).await.unwrap();
        assert_eq!(client.find_like(post.id, &session).await.unwrap(), None);
        assert!(
            client
                .liked_posts(&session, &[post.id])
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[sqlx::test]
    #[ignore = "requires a PostgreSQL server in DATABASE_URL"]
    async fn liking_a_missing_post_is_post_not_found(pool: PgPool) {
        let client = DbClient::new(pool);
        let session: SessionId = "alice".parse().unwrap();

        let result = client.insert_like(Id::new(404), &session).await;

        assert!(matches!(result, Err(DbError::PostNotFound(id)) if id == Id::new(404)));
    }
}
