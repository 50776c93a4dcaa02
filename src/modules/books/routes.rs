//! HTTP adapter over the circulation engine and catalog.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post, put},
    Json, Router,
};
use bookshare_http::{Actor, AppError};
use bookshare_kernel::model::{BookDraft, BookId, TransactionId};
use bookshare_kernel::Page;

use super::catalog::Catalog;
use super::circulation::Circulation;
use super::models::{BookView, BorrowedBookView, CoverRequest};
use crate::state::{AppState, PageQuery};

type ApiResult<T> = Result<Json<T>, AppError>;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(displayable_books).post(create_book))
        .route("/owner", get(owned_books))
        .route("/borrowed", get(borrowed_books))
        .route("/returned", get(returned_books))
        .route("/{book_id}", get(find_book))
        .route("/shareable/{book_id}", patch(toggle_shareable))
        .route("/archived/{book_id}", patch(toggle_archived))
        .route("/cover/{book_id}", put(assign_cover))
        .route("/borrow/{book_id}", post(borrow_book))
        .route("/borrow/return/{book_id}", patch(return_book))
        .route("/borrow/return/approve/{book_id}", patch(approve_return))
        .with_state(state)
}

async fn create_book(
    State(state): State<AppState>,
    actor: Actor,
    Json(draft): Json<BookDraft>,
) -> Result<(StatusCode, Json<BookId>), AppError> {
    let mut uow = state.database.begin().await;
    let id = Circulation::new(&mut *uow).create_book(actor.id(), draft)?;
    Ok((StatusCode::CREATED, Json(id)))
}

async fn find_book(
    State(state): State<AppState>,
    _actor: Actor,
    Path(book_id): Path<BookId>,
) -> ApiResult<BookView> {
    let uow = state.database.begin().await;
    Ok(Json(Catalog::new(&*uow).find_book(book_id)?))
}

async fn displayable_books(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<PageQuery>,
) -> ApiResult<Page<BookView>> {
    let request = query.resolve(&state.pagination)?;
    let uow = state.database.begin().await;
    Ok(Json(Catalog::new(&*uow).displayable_books(actor.id(), request)?))
}

async fn owned_books(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<PageQuery>,
) -> ApiResult<Page<BookView>> {
    let request = query.resolve(&state.pagination)?;
    let uow = state.database.begin().await;
    Ok(Json(Catalog::new(&*uow).owned_books(actor.id(), request)?))
}

async fn borrowed_books(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<PageQuery>,
) -> ApiResult<Page<BorrowedBookView>> {
    let request = query.resolve(&state.pagination)?;
    let uow = state.database.begin().await;
    Ok(Json(Catalog::new(&*uow).borrowed_history(actor.id(), request)?))
}

async fn returned_books(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<PageQuery>,
) -> ApiResult<Page<BorrowedBookView>> {
    let request = query.resolve(&state.pagination)?;
    let uow = state.database.begin().await;
    Ok(Json(Catalog::new(&*uow).returned_history(actor.id(), request)?))
}

async fn toggle_shareable(
    State(state): State<AppState>,
    actor: Actor,
    Path(book_id): Path<BookId>,
) -> ApiResult<BookId> {
    let mut uow = state.database.begin().await;
    Ok(Json(Circulation::new(&mut *uow).toggle_shareable(actor.id(), book_id)?))
}

async fn toggle_archived(
    State(state): State<AppState>,
    actor: Actor,
    Path(book_id): Path<BookId>,
) -> ApiResult<BookId> {
    let mut uow = state.database.begin().await;
    Ok(Json(Circulation::new(&mut *uow).toggle_archived(actor.id(), book_id)?))
}

async fn assign_cover(
    State(state): State<AppState>,
    actor: Actor,
    Path(book_id): Path<BookId>,
    Json(body): Json<CoverRequest>,
) -> Result<StatusCode, AppError> {
    let mut uow = state.database.begin().await;
    Circulation::new(&mut *uow).assign_cover(actor.id(), book_id, body.cover)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn borrow_book(
    State(state): State<AppState>,
    actor: Actor,
    Path(book_id): Path<BookId>,
) -> Result<(StatusCode, Json<TransactionId>), AppError> {
    let mut uow = state.database.begin().await;
    let id = Circulation::new(&mut *uow).borrow(actor.id(), book_id)?;
    Ok((StatusCode::CREATED, Json(id)))
}

async fn return_book(
    State(state): State<AppState>,
    actor: Actor,
    Path(book_id): Path<BookId>,
) -> ApiResult<TransactionId> {
    let mut uow = state.database.begin().await;
    Ok(Json(Circulation::new(&mut *uow).return_book(actor.id(), book_id)?))
}

async fn approve_return(
    State(state): State<AppState>,
    actor: Actor,
    Path(book_id): Path<BookId>,
) -> ApiResult<TransactionId> {
    let mut uow = state.database.begin().await;
    Ok(Json(Circulation::new(&mut *uow).approve_return(actor.id(), book_id)?))
}
