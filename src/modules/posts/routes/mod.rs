//! Post resource handlers.
//!
//! Every handler does at most one lookup and one mutating call against the
//! injected [`PostStore`]; negotiation runs as route middleware before any
//! handler body.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use quill_db::PostStore;
use quill_http::{AppError, JsonGuard};
use quill_kernel::API_PREFIX;

use super::filter::{build_condition, ListParams};
use super::models::{EditForm, NewPost, Post, PostId};
use super::schema::POST_SCHEMA;
use super::views::EditFormRenderer;

mod urls;

pub use urls::{url_for, Endpoint};

/// Collaborators shared by every post handler.
#[derive(Clone)]
pub struct PostsState {
    pub store: Arc<dyn PostStore>,
    pub views: Arc<dyn EditFormRenderer>,
}

/// Routes relative to [`API_PREFIX`].
pub fn router(state: PostsState) -> Router {
    tracing::debug!(prefix = API_PREFIX, "building post routes");

    Router::new()
        .route(
            "/posts",
            JsonGuard::Accept
                .apply(get(list_posts))
                .merge(JsonGuard::AcceptAndContent.apply(post(create_post))),
        )
        .route("/posts/{id}", get(get_post))
        .route("/posts/{id}/delete", get(delete_post))
        .route(
            "/post/{id}/edit",
            get(edit_form).merge(JsonGuard::AcceptAndContent.apply(put(edit_post))),
        )
        .with_state(state)
}

fn not_found(id: impl std::fmt::Display) -> AppError {
    AppError::not_found(format!("Could not find post with id {}", id))
}

/// A path id that is not an integer cannot name any post.
fn parse_id(raw: &str) -> Result<PostId, AppError> {
    raw.parse().map_err(|_| not_found(raw))
}

async fn find_post(state: &PostsState, raw_id: &str) -> Result<Post, AppError> {
    let id = parse_id(raw_id)?;
    state
        .store
        .get(id)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| not_found(id))
}

/// 302 to `location`.
fn found(location: String) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

/// `GET /posts`
async fn list_posts(
    State(state): State<PostsState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<Vec<Post>>, AppError> {
    let Query(pairs) = query.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
    let params = ListParams::from_pairs(pairs);
    let posts = state
        .store
        .list(build_condition(&params))
        .await
        .map_err(AppError::internal)?;

    tracing::debug!(
        count = posts.len(),
        title_like = ?params.title_like,
        body_like = ?params.body_like,
        "listed posts"
    );
    Ok(Json(posts))
}

/// `GET /posts/{id}`
async fn get_post(
    State(state): State<PostsState>,
    Path(id): Path<String>,
) -> Result<Json<Post>, AppError> {
    let post = find_post(&state, &id).await?;
    Ok(Json(post))
}

/// `POST /posts`
async fn create_post(
    State(state): State<PostsState>,
    payload: Bytes,
) -> Result<Response, AppError> {
    let payload: serde_json::Value = serde_json::from_slice(&payload)
        .map_err(|_| AppError::bad_request("Request body is not valid JSON"))?;

    POST_SCHEMA
        .validate(&payload)
        .map_err(|error| AppError::validation(error.to_string()))?;

    let new_post: NewPost = serde_json::from_value(payload).map_err(AppError::internal)?;
    let post = state.store.add(new_post).await.map_err(AppError::internal)?;

    tracing::info!(post_id = post.id, "post created");

    let location = url_for(Endpoint::GetPost(post.id));
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(post)).into_response())
}

/// `GET /posts/{id}/delete`
async fn delete_post(
    State(state): State<PostsState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let post = find_post(&state, &id).await?;
    state
        .store
        .delete(post.id)
        .await
        .map_err(AppError::internal)?;

    tracing::info!(post_id = post.id, "post deleted");
    Ok(found(url_for(Endpoint::ListPosts)))
}

/// `GET /post/{id}/edit`
async fn edit_form(
    State(state): State<PostsState>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let post = find_post(&state, &id).await?;
    let markup = state.views.render_edit(&post).map_err(AppError::Internal)?;
    Ok(Html(markup))
}

/// `PUT /post/{id}/edit`: title and body come from URL-encoded form fields.
async fn edit_post(
    State(state): State<PostsState>,
    Path(id): Path<String>,
    payload: Bytes,
) -> Result<Response, AppError> {
    let mut post = find_post(&state, &id).await?;

    let form: EditForm = serde_urlencoded::from_bytes(&payload)
        .map_err(|_| AppError::bad_request("Request body is not valid form data"))?;
    let title = form
        .title
        .ok_or_else(|| AppError::bad_request("Missing form field 'title'"))?;
    let body = form
        .body
        .ok_or_else(|| AppError::bad_request("Missing form field 'body'"))?;

    post.title = title;
    post.body = body;
    state.store.save(&post).await.map_err(AppError::internal)?;

    tracing::info!(post_id = post.id, "post edited");
    Ok(found(url_for(Endpoint::ListPosts)))
}
