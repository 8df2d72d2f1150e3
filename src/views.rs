use axum::{
    Json,
    response::{Html, IntoResponse, Response},
};

use crate::presenters::Book;

/// How a list of presented books is written back to the client.
pub trait BookView: Send + Sync + 'static {
    fn render(books: Vec<Book>) -> Response;
}

/// API surface: the presented books as a JSON array.
pub struct JsonView;

impl BookView for JsonView {
    fn render(books: Vec<Book>) -> Response {
        Json(books).into_response()
    }
}

/// Web surface: a page listing the book labels.
pub struct PageView;

impl BookView for PageView {
    fn render(books: Vec<Book>) -> Response {
        let items: String = books
            .iter()
            .map(|book| {
                format!(
                    r#"<li class="book" data-uuid="{}">{}</li>"#,
                    book.uuid,
                    escape_html(&book.label)
                )
            })
            .collect();

        Html(format!(
            "<!DOCTYPE html><html><head><title>Books</title></head>\
             <body><h1>Books</h1><ul class=\"book-list\">{items}</ul></body></html>"
        ))
        .into_response()
    }
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
