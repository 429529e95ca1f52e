use anyhow::{Context, Result};
use clap::Parser;
use std::env;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_connections: u32,
}

/// What the process should do once configuration is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Task {
    Serve,
    Migrate,
    AddAuthor(String),
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Server-rendered book catalog")]
pub struct Args {
    /// Host to bind to (overrides BOOK_CATALOG_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides BOOK_CATALOG_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Database URL (overrides BOOK_CATALOG_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Maximum pooled SQLite connections (overrides BOOK_CATALOG_MAX_CONNECTIONS)
    #[arg(long)]
    pub max_connections: Option<u32>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,

    /// Insert an author with this name and exit
    #[arg(long, value_name = "NAME", conflicts_with = "migrate")]
    pub add_author: Option<String>,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and the task to run.
    pub fn from_env_and_args() -> Result<(Self, Task)> {
        Self::resolve(Args::parse())
    }

    fn resolve(args: Args) -> Result<(Self, Task)> {
        // --- Environment fallback ---
        let env_host = env::var("BOOK_CATALOG_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = parse_env("BOOK_CATALOG_PORT", 3000u16)?;
        let env_db = env::var("BOOK_CATALOG_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/book_catalog.db".into());
        let env_max_connections = parse_env("BOOK_CATALOG_MAX_CONNECTIONS", 5u32)?;

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            database_url: args.database_url.unwrap_or(env_db),
            max_connections: args.max_connections.unwrap_or(env_max_connections).max(1),
        };

        let task = match (args.migrate, args.add_author) {
            (true, _) => Task::Migrate,
            (false, Some(name)) => Task::AddAuthor(name),
            (false, None) => Task::Serve,
        };

        Ok((cfg, task))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(value) => value
            .parse::<T>()
            .with_context(|| format!("parsing {} value `{}`", key, value)),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err).with_context(|| format!("reading {}", key)),
    }
}
