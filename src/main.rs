use std::process;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use news_api::config::{Config, StoreKind};
use news_api::db::memory::MemoryStore;
use news_api::db::pg::PgStore;
use news_api::db::seed::SeedData;
use news_api::db::{self, SharedStore};

fn build_store(config: &Config) -> db::Result<SharedStore> {
    match config.store {
        StoreKind::Postgres => {
            let pool = db::init_pool(config)?;
            Ok(Arc::new(PgStore::new(pool)))
        }
        StoreKind::Memory => {
            info!("serving the seeded test data from memory");
            Ok(Arc::new(MemoryStore::seeded(&SeedData::test()?)))
        }
    }
}

#[rocket::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let store = match Config::from_env().and_then(|config| build_store(&config)) {
        Ok(store) => store,
        Err(err) => {
            error!(error = %err, "failed to start");
            process::exit(1);
        }
    };

    if let Err(err) = news_api::rocket(store).launch().await {
        error!(error = %err, "server stopped");
        process::exit(1);
    }
}
