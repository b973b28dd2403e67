use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;

pub mod queries;

pub type DbPool = Pool<Sqlite>;

/// Creates the directory that will hold the database file, if any.
pub fn ensure_parent_dir(db_path: &str) -> Result<()> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

pub async fn init_pool(database_url: &str, max_connections: u32) -> Result<DbPool> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;
    Ok(pool)
}

#[cfg(test)]
pub async fn memory_pool() -> DbPool {
    // One connection: every handle must see the same in-memory database.
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap()
}

#[cfg(test)]
pub async fn seed_users(pool: &DbPool, users: &[(&str, bool)]) {
    sqlx::query("CREATE TABLE IF NOT EXISTS users (id INTEGER PRIMARY KEY AUTOINCREMENT, rut TEXT UNIQUE NOT NULL, is_active BOOLEAN NOT NULL DEFAULT 1)")
        .execute(pool)
        .await
        .unwrap();
    for (rut, active) in users {
        sqlx::query("INSERT INTO users (rut, is_active) VALUES (?, ?)")
            .bind(rut)
            .bind(active)
            .execute(pool)
            .await
            .unwrap();
    }
}
