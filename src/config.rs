use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;
use std::env;

use crate::device::Permission;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub location_feed: String,
    pub heatmap_output: String,
    pub location_permission: String,
    pub log_level: String,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let db_path = env::var("DB_PATH").unwrap_or_else(|_| "locations.db3".to_string());
        let database_url = database_url_for(&db_path);

        let location_feed =
            env::var("LOCATION_FEED").unwrap_or_else(|_| "location_feed.ndjson".to_string());
        let heatmap_output =
            env::var("HEATMAP_OUTPUT").unwrap_or_else(|_| "heatmap.geojson".to_string());
        let location_permission =
            env::var("LOCATION_PERMISSION").unwrap_or_else(|_| "granted".to_string());

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            database_url,
            location_feed,
            heatmap_output,
            location_permission,
            log_level,
        })
    }

    pub fn permission(&self) -> Permission {
        if self.location_permission.trim().eq_ignore_ascii_case("granted") {
            Permission::Granted
        } else {
            Permission::Denied
        }
    }
}

fn database_url_for(db_path: &str) -> String {
    if db_path == ":memory:" {
        "sqlite::memory:".to_string()
    } else {
        format!("sqlite://{}", db_path)
    }
}
