use anyhow::Result;
use axum::{ServiceExt, extract::Request, middleware};
use std::io::ErrorKind;
use tokio::net::TcpListener;
use tower::Layer;
use tracing_subscriber::EnvFilter;

mod config;
mod db;
mod errors;
mod handlers;
mod models;
mod routes;
mod services;
mod views;

#[cfg(test)]
mod tests;

use config::Task;
use services::store::{AuthorStore, Catalog};

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // --- Parse config + task ---
    let (cfg, task) = config::AppConfig::from_env_and_args()?;

    tracing::info!("Starting book-catalog with config: {:?}", cfg);

    // --- Initialize SQLite connection ---
    let db = db::connect(&cfg.database_url, cfg.max_connections).await?;

    match task {
        Task::Migrate => {
            db::run_migrations(&db).await?;
            tracing::info!("Database migration complete.");
            return Ok(()); // exit after migration
        }
        Task::AddAuthor(name) => {
            let store = services::sqlite_store::SqliteCatalog::new(db);
            let author = store.insert_author(&name).await?;
            tracing::info!(author_id = %author.id, name = %author.name, "Added author.");
            return Ok(());
        }
        Task::Serve => {}
    }

    // --- Build router ---
    let catalog = Catalog::sqlite(db);
    let app = middleware::from_fn(routes::method_override::method_override)
        .layer(routes::routes::app(catalog));

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, ServiceExt::<Request>::into_make_service(app)).await?;

    Ok(())
}
