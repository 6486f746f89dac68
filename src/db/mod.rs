use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;

pub mod point_store;
pub mod queries;

pub use point_store::PointStore;

pub type DbPool = Pool<Sqlite>;

/// Opens the embedded database, creating the file if needed.
///
/// The pool holds a single long-lived connection: there is only ever one
/// writer, and an in-memory database lives exactly as long as its
/// connection.
pub async fn init_pool(database_url: &str) -> Result<DbPool> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;
    Ok(pool)
}
