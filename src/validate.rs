use thiserror::Error;

const RESERVED_BOOK_NAMES: [&str; 2] = ["trash", "conflicts"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BookNameError {
    #[error("book name is empty")]
    Empty,
    #[error("book name cannot contain spaces")]
    HasSpace,
    #[error("book name cannot contain line breaks")]
    Multiline,
    #[error("book name cannot be a number")]
    Numeric,
    #[error("book name '{0}' is reserved")]
    Reserved(String),
}

pub fn validate_book_name(name: &str) -> Result<(), BookNameError> {
    if name.is_empty() {
        return Err(BookNameError::Empty);
    }
    if name.contains(['\n', '\r']) {
        return Err(BookNameError::Multiline);
    }
    if name.chars().any(char::is_whitespace) {
        return Err(BookNameError::HasSpace);
    }
    if name.chars().all(|c| c.is_ascii_digit()) {
        return Err(BookNameError::Numeric);
    }
    if RESERVED_BOOK_NAMES.contains(&name) {
        return Err(BookNameError::Reserved(name.to_string()));
    }
    Ok(())
}
