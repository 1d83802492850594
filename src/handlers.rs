use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use tracing::info;
use validator::Validate;

use crate::{
    AppState, db,
    errors::{AppError, AppResult},
    models::{AddEntryRequest, AddEntryResponse, Book, BookEntry, CreateBookRequest, ListParams},
};

/// Health check endpoint.
#[must_use]
#[allow(clippy::unused_async)]
pub async fn health_check() -> &'static str { "OK" }

/// List books, newest first, optionally filtered by genre and author.
///
/// Sort parameters are ignored here; see [`sort_books`].
///
/// # Errors
/// Returns validation errors for an unknown genre, or database errors.
pub async fn view_books(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> AppResult<Json<Vec<Book>>> {
    let Query(params) = params?;
    let query = ListParams {
        sort_by: None,
        order: None,
        ..params
    }
    .into_query()?;

    let books = db::list_books(&state.db, &query).await?;
    Ok(Json(books))
}

/// List books ordered by `sort_by` (default `date_added`), with the same filters as [`view_books`].
///
/// # Errors
/// Returns validation errors for values outside the allow-lists, or database errors.
pub async fn sort_books(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> AppResult<Json<Vec<Book>>> {
    let Query(params) = params?;
    let query = params.into_query()?;
    let books = db::list_books(&state.db, &query).await?;
    Ok(Json(books))
}

/// Create a book.
///
/// # Errors
/// Returns validation errors (blank title/author, rating out of range, malformed body) or database errors.
pub async fn add_book(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateBookRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let Json(payload) = payload?;
    let payload = payload.normalized();
    payload.validate()?;

    let book = db::insert_book(&state.db, &payload).await?;
    info!(id = book.id, title = %book.title, "book created");
    Ok((StatusCode::CREATED, Json(book)))
}

/// List every book as `{id, name, created_at}`, newest first.
///
/// # Errors
/// Returns database errors.
pub async fn list_entries(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<BookEntry>>> {
    let entries = db::list_entries(&state.db).await?;
    Ok(Json(entries))
}

/// Create a book from just its name.
///
/// # Errors
/// Returns a validation error if `bookName` is missing or blank, or database errors.
pub async fn add_entry(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AddEntryRequest>, JsonRejection>,
) -> AppResult<Json<AddEntryResponse>> {
    let Json(payload) = payload?;
    let name = payload
        .book_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::Validation("Book name is required".into()))?;

    let entry = db::insert_entry(&state.db, name).await?;
    info!(id = entry.id, name = %entry.name, "entry created");
    Ok(Json(AddEntryResponse {
        id: entry.id,
        name: entry.name,
        message: "Book added successfully".into(),
    }))
}
