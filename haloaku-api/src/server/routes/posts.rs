use crate::server::{
    Result, ServerError, ServerRouter,
    extract::{Created, Json, Query},
};
use axum::{Router, extract::State};
use axum_extra::routing::{RouterExt, TypedPath};
use haloaku_common::{
    feed::{FeedPage, FeedParams, MAX_PAGE_SIZE},
    model::{
        Id,
        post::{CreatePost, Post, PostMarker},
    },
};
use haloaku_db::feed::FeedService;
use serde::Deserialize;

pub fn routes() -> ServerRouter {
    Router::new()
        .typed_get(get_feed)
        .typed_post(create_post)
        .typed_get(get_post)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts", rejection(ServerError))]
struct PostsPath();

async fn get_feed(
    PostsPath(): PostsPath,
    State(feed): State<FeedService>,
    Query(params): Query<FeedParams>,
) -> Result<Json<FeedPage>> {
    let request = params.page_request().clamped(MAX_PAGE_SIZE);
    let search = params.search();

    let page = feed
        .fetch(request, search.as_ref(), params.session.as_ref())
        .await?;

    Ok(Json(page))
}

async fn create_post(
    PostsPath(): PostsPath,
    State(feed): State<FeedService>,
    Json(post): Json<CreatePost>,
) -> Result<Created<Post>> {
    let post = post.validate()?;
    let post = feed.create_post(&post).await?;

    Ok(Created(post))
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/posts/{id}", rejection(ServerError))]
struct GetPostPath {
    id: Id<PostMarker>,
}

async fn get_post(
    GetPostPath { id }: GetPostPath,
    State(feed): State<FeedService>,
) -> Result<Json<Post>> {
    let post = feed
        .fetch_post(id)
        .await?
        .ok_or(ServerError::PostByIdNotFound(id))?;

    Ok(Json(post))
}
