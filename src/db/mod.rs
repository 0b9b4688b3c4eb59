use diesel::pg::PgConnection;
use diesel::r2d2::ConnectionManager;
use rocket::tokio::task;
use std::sync::Arc;
use tracing::error;

use crate::article::{Article, ArticleSummary};
use crate::comment::{Comment, NewComment};
use crate::config::Config;
use crate::topic::Topic;
use crate::types::ApiError;
use crate::user::User;
use crate::validate::ArticleQuery;

pub mod memory;
pub mod pg;
pub mod schema;
pub mod seed;

// An alias to the type for a pool of Diesel Postgres connections.
pub type Pool = r2d2::Pool<ConnectionManager<PgConnection>>;

error_chain! {
    foreign_links {
        Var(::std::env::VarError);
        ParseInt(::std::num::ParseIntError);
        R2D2(r2d2::Error);
        Diesel(::diesel::result::Error);
        Json(::serde_json::Error);
        Io(::std::io::Error);
    }
}

pub fn init_pool(config: &Config) -> Result<Pool> {
    let database_url = config
        .database_url
        .as_deref()
        .ok_or("DATABASE_URL must be set for the postgres store")?;
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Ok(Pool::builder().max_size(config.pool_size).build(manager)?)
}

/// Everything the handlers need from storage. Each call is one statement or
/// one short transaction; none of them keep state between requests.
pub trait Store: Send + Sync {
    fn topics(&self) -> std::result::Result<Vec<Topic>, ApiError>;

    fn users(&self) -> std::result::Result<Vec<User>, ApiError>;

    fn articles(&self, query: &ArticleQuery) -> std::result::Result<Vec<ArticleSummary>, ApiError>;

    fn article(&self, article_id: i32) -> std::result::Result<Article, ApiError>;

    /// Adds `inc_votes` (possibly negative) to the article's counter and
    /// returns the updated row.
    fn adjust_votes(&self, article_id: i32, inc_votes: i32) -> std::result::Result<Article, ApiError>;

    /// Newest first. An existing article without comments yields an empty list.
    fn comments_for(&self, article_id: i32) -> std::result::Result<Vec<Comment>, ApiError>;

    fn add_comment(&self, comment: NewComment) -> std::result::Result<Comment, ApiError>;

    fn delete_comment(&self, comment_id: i32) -> std::result::Result<(), ApiError>;
}

pub type SharedStore = Arc<dyn Store>;

/// Runs a store call on the blocking pool so Diesel never stalls the
/// async workers.
pub async fn blocking<T, F>(store: &SharedStore, f: F) -> std::result::Result<T, ApiError>
where
    F: FnOnce(&dyn Store) -> std::result::Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let store = Arc::clone(store);
    task::spawn_blocking(move || f(&*store))
        .await
        .map_err(|err| {
            error!(error = %err, "store task failed");
            ApiError::Internal
        })?
}
