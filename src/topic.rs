use diesel::prelude::*;
use rocket::serde::json::Json;
use rocket::State;
use serde::{Deserialize, Serialize};

use crate::db::schema::topics;
use crate::db::{self, SharedStore};
use crate::types::ApiResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Selectable, Insertable)]
#[diesel(table_name = topics)]
pub struct Topic {
    pub slug: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct TopicsContainer {
    topics: Vec<Topic>,
}

#[get("/topics")]
pub async fn list(store: &State<SharedStore>) -> ApiResult<TopicsContainer> {
    let topics = db::blocking(store, |store| store.topics()).await?;
    Ok(Json(TopicsContainer { topics }))
}
