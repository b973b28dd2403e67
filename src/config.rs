use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub db_path: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub bind_addr: String,
    pub api_token: String,
    pub admin_token: String,
    pub log_level: String,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let db_path = env::var("DB_PATH").unwrap_or_else(|_| "./data/inventario.db".to_string());
        let database_url = format!("sqlite://{}", db_path);
        let db_max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "5".to_string())
            .parse()
            .unwrap_or(5);

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());

        // Empty tokens leave the matching capability unreachable.
        let api_token = env::var("API_TOKEN").unwrap_or_default();
        let admin_token = env::var("ADMIN_TOKEN").unwrap_or_default();

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            db_path,
            database_url,
            db_max_connections,
            bind_addr,
            api_token,
            admin_token,
            log_level,
        })
    }
}
