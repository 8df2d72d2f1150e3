use std::str::FromStr;

use anyhow::Context;
use axum::{Router, middleware, routing::get};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod auth;
mod config;
mod db;
mod error;
mod handlers;
mod models;
mod presenters;
mod validate;
mod views;


use config::Config;
use handlers::{create_book, delete_book, get_book, health_check, list_books, update_book};
use views::{JsonView, PageView};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::new(&config.log_filter))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let options = SqliteConnectOptions::from_str(&config.database_url)
        .context("parsing DATABASE_URL")?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await
        .context("connecting to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("running migrations")?;

    let app = make_app(pool);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.bind_addr))?;
    tracing::info!(addr = %config.bind_addr, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}

fn make_app(pool: SqlitePool) -> Router {
    let web = Router::new()
        .route("/books", get(list_books::<PageView>))
        .route_layer(middleware::from_fn_with_state(
            pool.clone(),
            auth::require_session,
        ));

    let api = Router::new()
        .route("/books", get(list_books::<JsonView>).post(create_book))
        .route(
            "/books/{uuid}",
            get(get_book).patch(update_book).delete(delete_book),
        )
        .route_layer(middleware::from_fn_with_state(
            pool.clone(),
            auth::require_token,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(web)
        .nest("/api/v3", api)
        .layer(TraceLayer::new_for_http())
        .with_state(pool)
}
