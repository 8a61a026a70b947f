use crate::server::{Result, ServerError, ServerRouter, extract::Json};
use axum::{Router, extract::State};
use axum_extra::routing::{RouterExt, TypedPath};
use haloaku_common::model::{
    Id,
    like::{LikeToggle, ToggleLikeRequest},
    post::PostMarker,
};
use haloaku_db::likes::LikeService;
use serde::Deserialize;

pub fn routes() -> ServerRouter {
    Router::new().typed_post(toggle_like)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{id}/like", rejection(ServerError))]
struct ToggleLikePath {
    id: Id<PostMarker>,
}

async fn toggle_like(
    ToggleLikePath { id }: ToggleLikePath,
    State(likes): State<LikeService>,
    Json(ToggleLikeRequest { session }): Json<ToggleLikeRequest>,
) -> Result<Json<LikeToggle>> {
    let toggle = likes.toggle(id, &session).await?;

    Ok(Json(toggle))
}
