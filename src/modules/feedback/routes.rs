use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use bookshare_http::{Actor, AppError};
use bookshare_kernel::model::{BookId, FeedbackId};
use bookshare_kernel::Page;

use super::gate::{FeedbackBoard, FeedbackGate};
use super::models::{FeedbackRequest, FeedbackView};
use crate::state::{AppState, PageQuery};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", post(submit_feedback))
        .route("/book/{book_id}", get(list_feedback))
        .with_state(state)
}

async fn submit_feedback(
    State(state): State<AppState>,
    actor: Actor,
    Json(request): Json<FeedbackRequest>,
) -> Result<(StatusCode, Json<FeedbackId>), AppError> {
    let mut uow = state.database.begin().await;
    let id = FeedbackGate::new(&mut *uow).submit(
        actor.id(),
        request.book_id,
        request.rating,
        request.comment,
    )?;
    Ok((StatusCode::CREATED, Json(id)))
}

async fn list_feedback(
    State(state): State<AppState>,
    actor: Actor,
    Path(book_id): Path<BookId>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<FeedbackView>>, AppError> {
    let request = query.resolve(&state.pagination)?;
    let uow = state.database.begin().await;
    let page = FeedbackBoard::new(&*uow).list(book_id, actor.id(), request)?;
    Ok(Json(page))
}
