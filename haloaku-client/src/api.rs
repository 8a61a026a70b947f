use haloaku_common::{
    feed::{FeedPage, FeedParams, PageRequest},
    model::{
        Id,
        error::ErrorResponse,
        like::{LikeToggle, ToggleLikeRequest},
        post::{CreatePost, Post, PostMarker, PostValidationError},
        session::SessionId,
    },
};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    InvalidPost(#[from] PostValidationError),
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Server replied with status {}", .0.status)]
    Api(ErrorResponse),
}

impl ClientError {
    #[must_use]
    pub fn liked(&self) -> Option<bool> {
        match self {
            ClientError::Api(response) => response.liked,
            _ => None,
        }
    }

    #[must_use]
    pub fn user_message(&self) -> Option<String> {
        match self {
            ClientError::InvalidPost(err) => Some(err.to_string()),
            ClientError::Api(response) => response.message.clone(),
            ClientError::Http(_) => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    #[must_use]
    pub fn with_client(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn fetch_feed(
        &self,
        request: PageRequest,
        query: &str,
        session: Option<&SessionId>,
    ) -> Result<FeedPage> {
        let params = FeedParams {
            page: Some(request.page),
            page_size: Some(request.page_size),
            q: (!query.trim().is_empty()).then(|| query.to_owned()),
            session: session.cloned(),
        };

        let response = self
            .http
            .get(self.url("/posts"))
            .query(&params)
            .send()
            .await?;

        read(response).await
    }

    /// Runs the form validation locally and only then submits.
    pub async fn create_post(&self, post: &CreatePost) -> Result<Post> {
        post.clone().validate_form()?;

        let response = self
            .http
            .post(self.url("/posts"))
            .json(post)
            .send()
            .await?;
        let created: Post = read(response).await?;
        debug!(id = %created.id, "Submitted letter");

        Ok(created)
    }

    pub async fn toggle_like(
        &self,
        post_id: Id<PostMarker>,
        session: &SessionId,
    ) -> Result<LikeToggle> {
        let response = self
            .http
            .post(self.url(&format!("/posts/{post_id}/like")))
            .json(&ToggleLikeRequest {
                session: session.clone(),
            })
            .send()
            .await?;

        read(response).await
    }
}

async fn read<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let error = response.json::<ErrorResponse>().await.unwrap_or_else(|err| {
        warn!(error = %err, %status, "Error response had an unexpected body");
        ErrorResponse {
            status: status.as_u16(),
            ..ErrorResponse::default()
        }
    });

    Err(ClientError::Api(error))
}
