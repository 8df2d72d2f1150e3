//! Resolves the session behind a request into a [`CurrentUser`].
//!
//! The web surface carries the session key in the `id` cookie; the API
//! surface sends it as a bearer token. Either way the resolved user is
//! inserted into the request extensions for handlers to extract.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use cookie::Cookie;
use sqlx::SqlitePool;

use crate::db;
use crate::error::{AppError, Result};

pub const SESSION_COOKIE: &str = "id";

#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub uuid: String,
}

/// Web routes: an unauthenticated request is sent to the login page.
pub async fn require_session(
    State(pool): State<SqlitePool>,
    mut req: Request,
    next: Next,
) -> Response {
    let key = session_key_from_cookie(req.headers());
    match resolve_user(&pool, key.as_deref()).await {
        Ok(Some(user)) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Ok(None) => {
            let referrer = req.uri().path();
            Redirect::to(&format!("/login?referrer={referrer}")).into_response()
        }
        Err(err) => err.into_response(),
    }
}

/// API routes: an unauthenticated request gets a 401.
pub async fn require_token(
    State(pool): State<SqlitePool>,
    mut req: Request,
    next: Next,
) -> Response {
    let key = session_key_from_bearer(req.headers());
    match resolve_user(&pool, key.as_deref()).await {
        Ok(Some(user)) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Ok(None) => AppError::Unauthorized.into_response(),
        Err(err) => err.into_response(),
    }
}

async fn resolve_user(pool: &SqlitePool, key: Option<&str>) -> Result<Option<CurrentUser>> {
    let Some(key) = key else {
        return Ok(None);
    };

    let Some(session) = db::find_session_user(pool, key).await? else {
        tracing::debug!("unknown session key");
        return Ok(None);
    };

    if session.expires_at <= Utc::now() {
        tracing::debug!(user_id = session.user_id, "session expired");
        return Ok(None);
    }

    Ok(Some(CurrentUser {
        id: session.user_id,
        uuid: session.user_uuid,
    }))
}

fn session_key_from_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(|cookie| cookie.ok())
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|key| !key.is_empty())
}

fn session_key_from_bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
}
