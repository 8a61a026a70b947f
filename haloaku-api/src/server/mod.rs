use axum::{
    Router,
    extract::{
        FromRef, Request,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use extract::Json;
use haloaku_common::model::{
    Id,
    error::ErrorResponse,
    post::{PostMarker, PostValidationError},
};
use haloaku_db::{
    client::DbError,
    feed::FeedService,
    likes::{LikeService, ToggleError},
    store::Store,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

mod extract;
mod routes;

pub type ServerRouter = Router<ServerState>;

#[derive(Clone, Debug, FromRef)]
pub struct ServerState {
    pub feed: FeedService,
    pub likes: LikeService,
}

impl ServerState {
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            feed: FeedService::new(store.clone()),
            likes: LikeService::new(store),
        }
    }
}

pub fn routes() -> ServerRouter {
    routes::routes().fallback(fallback)
}

pub async fn fallback(request: Request) -> ServerError {
    ServerError::UnknownRoute(request.into_parts().0.uri)
}

pub type Result<T, E = ServerError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Unknown route requested: {0}")]
    UnknownRoute(Uri),
    #[error("Path rejected: {0}")]
    PathRejection(#[from] PathRejection),
    #[error("Query string rejected: {0}")]
    QueryRejection(#[from] QueryRejection),
    #[error("Incoming JSON rejected: {0}")]
    JsonRejection(#[from] JsonRejection),
    #[error("JSON response could not be serialized: {0}")]
    JsonResponse(#[from] serde_json::Error),
    #[error(transparent)]
    InvalidPost(#[from] PostValidationError),
    #[error(transparent)]
    Database(#[from] DbError),
    #[error(transparent)]
    Toggle(#[from] ToggleError),
    #[error("Post with id {0} was not found.")]
    PostByIdNotFound(Id<PostMarker>),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::UnknownRoute(_)
            | ServerError::PathRejection(_)
            | ServerError::PostByIdNotFound(_)
            | ServerError::Database(DbError::PostNotFound(_)) => StatusCode::NOT_FOUND,
            ServerError::Toggle(err) if matches!(err.db_error(), DbError::PostNotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            ServerError::QueryRejection(_)
            | ServerError::JsonRejection(_)
            | ServerError::InvalidPost(_) => StatusCode::BAD_REQUEST,
            ServerError::JsonResponse(_) | ServerError::Database(_) | ServerError::Toggle(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();

        error!(error = %self, %status, "Replying with error");

        let error_response = ErrorResponse {
            status: status.as_u16(),
            message: status.is_client_error().then(|| self.to_string()),
            liked: match &self {
                ServerError::Toggle(err) => Some(err.liked()),
                _ => None,
            },
        };
        (status, Json(error_response)).into_response()
    }
}
