use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A book as stored in the `books` table.
///
/// `label` is empty only once the book has been soft-deleted.
#[derive(Debug, Clone, FromRow)]
pub struct Book {
    pub id: i64,
    pub uuid: String,
    #[allow(dead_code)] // used by sqlx
    pub user_id: i64,
    pub label: String,
    pub usn: i64,
    #[allow(dead_code)] // used by sqlx
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The owner of a resolved session.
#[derive(Debug, Clone, FromRow)]
pub struct SessionUser {
    pub user_id: i64,
    pub user_uuid: String,
    pub expires_at: DateTime<Utc>,
}
