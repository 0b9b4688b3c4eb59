use diesel::pg::PgConnection;
use diesel::Connection;
use dotenv::dotenv;
use std::env;
use std::process;
use tracing::error;
use tracing_subscriber::EnvFilter;

use news_api::db::seed::{self, SeedData};
use news_api::db::Result;

fn run() -> Result<()> {
    dotenv().ok();
    let database_url = env::var("DATABASE_URL")?;
    let data = match env::args().nth(1) {
        Some(path) => SeedData::from_path(path)?,
        None => SeedData::test()?,
    };
    let mut connection = PgConnection::establish(&database_url)
        .map_err(|err| format!("failed to connect to {}: {}", database_url, err))?;
    seed::run(&mut connection, &data)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(err) = run() {
        error!(error = %err, "seeding failed");
        process::exit(1);
    }
}
