//! Recreates the schema and loads a data set. Used by the `seed` binary,
//! the Postgres-backed tests and the in-memory store.

use diesel::connection::SimpleConnection;
use diesel::insert_into;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

use super::schema::{articles, comments, topics, users};
use super::Result;
use crate::article::NewArticle;
use crate::comment::SeedComment;
use crate::topic::Topic;
use crate::user::User;

static SCHEMA: &str = include_str!("../../db/schema.sql");
static TEST_DATA: &str = include_str!("../../data/test-data.json");

/// Comments reference articles by their position in `articles`, counting
/// from 1, which is the id each article receives on insert.
#[derive(Debug, Deserialize)]
pub struct SeedData {
    pub topics: Vec<Topic>,
    pub users: Vec<User>,
    pub articles: Vec<NewArticle>,
    pub comments: Vec<SeedComment>,
}

impl SeedData {
    pub fn test() -> Result<SeedData> {
        Ok(serde_json::from_str(TEST_DATA)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<SeedData> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

pub fn run(connection: &mut PgConnection, data: &SeedData) -> Result<()> {
    connection.batch_execute(SCHEMA)?;
    connection.transaction::<_, diesel::result::Error, _>(|conn| {
        insert_into(topics::table).values(&data.topics).execute(conn)?;
        insert_into(users::table).values(&data.users).execute(conn)?;
        insert_into(articles::table).values(&data.articles).execute(conn)?;
        insert_into(comments::table).values(&data.comments).execute(conn)?;
        Ok(())
    })?;
    info!(
        topics = data.topics.len(),
        users = data.users.len(),
        articles = data.articles.len(),
        comments = data.comments.len(),
        "database seeded"
    );
    Ok(())
}
