use atrium_http::{Admin, AppResult, Authorized, Json};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Router,
};

use super::models::{Book, BookFilter, BookPatch, NewBook};
use super::BooksState;
use crate::utils::{message, Message};

pub fn router() -> Router<BooksState> {
    Router::new()
        .route("/", get(list_books).post(create_book))
        .route("/{id}", get(get_book).put(update_book).delete(delete_book))
}

async fn list_books(
    State(state): State<BooksState>,
    Query(filter): Query<BookFilter>,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.books.list(&filter).await?;
    tracing::debug!(count = books.len(), "listed books");
    Ok(Json(books))
}

async fn get_book(
    State(state): State<BooksState>,
    Path(id): Path<String>,
) -> AppResult<Json<Book>> {
    Ok(Json(state.books.get(&id).await?))
}

async fn create_book(
    State(state): State<BooksState>,
    _admin: Authorized<Admin>,
    Json(payload): Json<NewBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let book = state.books.create(payload).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

async fn update_book(
    State(state): State<BooksState>,
    _admin: Authorized<Admin>,
    Path(id): Path<String>,
    Json(patch): Json<BookPatch>,
) -> AppResult<Json<Book>> {
    Ok(Json(state.books.update(&id, patch).await?))
}

async fn delete_book(
    State(state): State<BooksState>,
    _admin: Authorized<Admin>,
    Path(id): Path<String>,
) -> AppResult<Json<Message>> {
    state.books.delete(&id).await?;
    Ok(message("book deleted"))
}
