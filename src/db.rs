//! Queries against the `books`, `users` and `sessions` tables.
//!
//! Every book query is scoped by `user_id`. Mutations run in a transaction
//! that also bumps the owner's `max_usn`, so a book's `usn` is unique and
//! increasing within its user.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Book, SessionUser};

/// Non-deleted books owned by `user_id`, ordered by label.
///
/// Identical labels fall back to creation order. `name`, when given, keeps
/// only the book with exactly that label.
pub async fn list_books(
    pool: &SqlitePool,
    user_id: i64,
    name: Option<&str>,
) -> Result<Vec<Book>, sqlx::Error> {
    sqlx::query_as::<_, Book>(
        "SELECT id, uuid, user_id, label, usn, deleted, created_at, updated_at
         FROM books
         WHERE user_id = ? AND NOT deleted AND (? IS NULL OR label = ?)
         ORDER BY label ASC, created_at ASC, id ASC",
    )
    .bind(user_id)
    .bind(name)
    .bind(name)
    .fetch_all(pool)
    .await
}

pub async fn find_book(
    pool: &SqlitePool,
    user_id: i64,
    uuid: &str,
) -> Result<Option<Book>, sqlx::Error> {
    sqlx::query_as::<_, Book>(
        "SELECT id, uuid, user_id, label, usn, deleted, created_at, updated_at
         FROM books
         WHERE user_id = ? AND uuid = ? AND NOT deleted",
    )
    .bind(user_id)
    .bind(uuid)
    .fetch_optional(pool)
    .await
}

pub async fn create_book(pool: &SqlitePool, user_id: i64, label: &str) -> Result<Book> {
    let mut tx = pool.begin().await?;

    ensure_label_free(&mut tx, user_id, label, None).await?;
    let usn = increment_user_usn(&mut tx, user_id).await?;
    let now = Utc::now();

    let book = sqlx::query_as::<_, Book>(
        "INSERT INTO books (uuid, user_id, label, usn, deleted, created_at, updated_at)
         VALUES (?, ?, ?, ?, FALSE, ?, ?)
         RETURNING id, uuid, user_id, label, usn, deleted, created_at, updated_at",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(user_id)
    .bind(label)
    .bind(usn)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *tx)
    .await
    .map_err(|err| label_conflict(err, label))?;

    tx.commit().await?;
    Ok(book)
}

pub async fn update_book(
    pool: &SqlitePool,
    user_id: i64,
    uuid: &str,
    label: &str,
) -> Result<Book> {
    let mut tx = pool.begin().await?;

    let existing = find_book_for_update(&mut tx, user_id, uuid).await?;
    ensure_label_free(&mut tx, user_id, label, Some(existing.id)).await?;
    let usn = increment_user_usn(&mut tx, user_id).await?;

    let book = sqlx::query_as::<_, Book>(
        "UPDATE books SET label = ?, usn = ?, updated_at = ?
         WHERE id = ?
         RETURNING id, uuid, user_id, label, usn, deleted, created_at, updated_at",
    )
    .bind(label)
    .bind(usn)
    .bind(Utc::now())
    .bind(existing.id)
    .fetch_one(&mut *tx)
    .await
    .map_err(|err| label_conflict(err, label))?;

    tx.commit().await?;
    Ok(book)
}

/// Soft-deletes a book: the row stays, its label is cleared and it gets a
/// fresh usn so syncing clients see the deletion.
pub async fn delete_book(pool: &SqlitePool, user_id: i64, uuid: &str) -> Result<Book> {
    let mut tx = pool.begin().await?;

    let existing = find_book_for_update(&mut tx, user_id, uuid).await?;
    let usn = increment_user_usn(&mut tx, user_id).await?;

    let book = sqlx::query_as::<_, Book>(
        "UPDATE books SET deleted = TRUE, label = '', usn = ?, updated_at = ?
         WHERE id = ?
         RETURNING id, uuid, user_id, label, usn, deleted, created_at, updated_at",
    )
    .bind(usn)
    .bind(Utc::now())
    .bind(existing.id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(book)
}

pub async fn find_session_user(
    pool: &SqlitePool,
    key: &str,
) -> Result<Option<SessionUser>, sqlx::Error> {
    sqlx::query_as::<_, SessionUser>(
        "SELECT users.id AS user_id, users.uuid AS user_uuid, sessions.expires_at
         FROM sessions
         JOIN users ON users.id = sessions.user_id
         WHERE sessions.key = ?",
    )
    .bind(key)
    .fetch_optional(pool)
    .await
}

async fn find_book_for_update(
    conn: &mut SqliteConnection,
    user_id: i64,
    uuid: &str,
) -> Result<Book> {
    sqlx::query_as::<_, Book>(
        "SELECT id, uuid, user_id, label, usn, deleted, created_at, updated_at
         FROM books
         WHERE user_id = ? AND uuid = ? AND NOT deleted",
    )
    .bind(user_id)
    .bind(uuid)
    .fetch_optional(conn)
    .await?
    .ok_or_else(|| AppError::BookNotFound(uuid.to_string()))
}

async fn ensure_label_free(
    conn: &mut SqliteConnection,
    user_id: i64,
    label: &str,
    except_id: Option<i64>,
) -> Result<()> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM books
         WHERE user_id = ? AND label = ? AND NOT deleted AND (? IS NULL OR id != ?)",
    )
    .bind(user_id)
    .bind(label)
    .bind(except_id)
    .bind(except_id)
    .fetch_one(conn)
    .await?;

    if count > 0 {
        return Err(AppError::DuplicateBook(label.to_string()));
    }
    Ok(())
}

/// Maps a hit on the live-label unique index to a duplicate book. The
/// index backs `ensure_label_free` when two writers race.
pub(crate) fn label_conflict(err: sqlx::Error, label: &str) -> AppError {
    let is_unique_violation = err
        .as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation());

    if is_unique_violation {
        AppError::DuplicateBook(label.to_string())
    } else {
        AppError::Database(err)
    }
}

async fn increment_user_usn(conn: &mut SqliteConnection, user_id: i64) -> Result<i64> {
    let usn: i64 = sqlx::query_scalar(
        "UPDATE users SET max_usn = max_usn + 1, updated_at = ?
         WHERE id = ?
         RETURNING max_usn",
    )
    .bind(Utc::now())
    .bind(user_id)
    .fetch_one(conn)
    .await?;

    Ok(usn)
}
