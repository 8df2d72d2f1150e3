use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::auth::CurrentUser;
use crate::db;
use crate::error::{AppError, Result};
use crate::presenters::{self, present_book, present_books};
use crate::validate::validate_book_name;
use crate::views::BookView;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BookInput {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookResponse {
    pub book: presenters::Book,
}

pub async fn health_check() -> &'static str {
    "OK"
}

/// Lists the caller's books. `V` decides whether they come back as JSON or
/// as a rendered page; the data and ordering are the same for both.
pub async fn list_books<V: BookView>(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<CurrentUser>,
    Query(params): Query<ListParams>,
) -> Result<Response> {
    let name = params.name.as_deref().filter(|name| !name.is_empty());
    let books = db::list_books(&pool, user.id, name).await?;
    tracing::debug!(user_uuid = %user.uuid, count = books.len(), "listed books");

    Ok(V::render(present_books(&books)))
}

pub async fn get_book(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<CurrentUser>,
    Path(uuid): Path<String>,
) -> Result<Json<presenters::Book>> {
    let book = db::find_book(&pool, user.id, &uuid)
        .await?
        .ok_or(AppError::BookNotFound(uuid))?;

    Ok(Json(present_book(&book)))
}

pub async fn create_book(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<CurrentUser>,
    Json(input): Json<BookInput>,
) -> Result<(StatusCode, Json<BookResponse>)> {
    validate_book_name(&input.name)?;

    let book = db::create_book(&pool, user.id, &input.name).await?;
    tracing::info!(user_id = user.id, book_uuid = %book.uuid, usn = book.usn, "created book");

    Ok((
        StatusCode::CREATED,
        Json(BookResponse {
            book: present_book(&book),
        }),
    ))
}

pub async fn update_book(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<CurrentUser>,
    Path(uuid): Path<String>,
    Json(input): Json<BookInput>,
) -> Result<Json<BookResponse>> {
    validate_book_name(&input.name)?;

    let book = db::update_book(&pool, user.id, &uuid, &input.name).await?;
    tracing::info!(user_id = user.id, book_uuid = %book.uuid, usn = book.usn, "updated book");

    Ok(Json(BookResponse {
        book: present_book(&book),
    }))
}

pub async fn delete_book(
    State(pool): State<SqlitePool>,
    Extension(user): Extension<CurrentUser>,
    Path(uuid): Path<String>,
) -> Result<Json<BookResponse>> {
    let book = db::delete_book(&pool, user.id, &uuid).await?;
    tracing::info!(user_id = user.id, book_uuid = %book.uuid, usn = book.usn, "deleted book");

    Ok(Json(BookResponse {
        book: present_book(&book),
    }))
}
