//! External views of stored records.
//!
//! Presenters never expose surrogate keys or owner references; per-user
//! scoping stays on the server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub uuid: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub label: String,
    pub usn: i64,
}

pub fn present_book(book: &models::Book) -> Book {
    Book {
        uuid: book.uuid.clone(),
        created_at: book.created_at,
        updated_at: book.updated_at,
        label: book.label.clone(),
        usn: book.usn,
    }
}

/// Presents each book, keeping the input order.
pub fn present_books(books: &[models::Book]) -> Vec<Book> {
    books.iter().map(present_book).collect()
}
