use dotenv::dotenv;
use std::env;
use std::str::FromStr;
use tracing::info;

use crate::db::Result;

const DEFAULT_POOL_SIZE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "pg" => Ok(StoreKind::Postgres),
            "memory" => Ok(StoreKind::Memory),
            other => Err(format!("unknown NEWS_STORE value: {}", other)),
        }
    }
}

/// Process settings, read from the environment after `.env` is loaded.
/// Listener settings are left to Rocket's own `ROCKET_*` variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreKind,
    pub database_url: Option<String>,
    pub pool_size: u32,
}

impl Config {
    pub fn from_env() -> Result<Config> {
        dotenv().ok();
        Config::from_vars(|key| env::var(key).ok())
    }

    fn from_vars<F>(var: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let store = match var("NEWS_STORE") {
            Some(raw) => raw.parse::<StoreKind>()?,
            None => StoreKind::Postgres,
        };
        let pool_size = match var("DATABASE_POOL_SIZE") {
            Some(raw) => raw.parse::<u32>()?,
            None => {
                info!("DATABASE_POOL_SIZE not set, using default: {}", DEFAULT_POOL_SIZE);
                DEFAULT_POOL_SIZE
            }
        };
        let database_url = var("DATABASE_URL");
        if store == StoreKind::Postgres && database_url.is_none() {
            return Err("DATABASE_URL must be set for the postgres store".into());
        }

        Ok(Config {
            store,
            database_url,
            pool_size,
        })
    }
}
