use crate::server::ServerRouter;
use axum::{Router, routing::get};

mod likes;
mod posts;

pub fn routes() -> ServerRouter {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .merge(posts::routes())
        .merge(likes::routes())
}
