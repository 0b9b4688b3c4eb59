use diesel::prelude::*;
use rocket::serde::json::Json;
use rocket::State;
use serde::{Deserialize, Serialize};

use crate::db::schema::users;
use crate::db::{self, SharedStore};
use crate::types::ApiResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Queryable, Selectable, Insertable)]
#[diesel(table_name = users)]
pub struct User {
    pub username: String,
    pub name: String,
    pub avatar_url: String,
}

#[derive(Debug, Serialize)]
pub struct UsersContainer {
    users: Vec<User>,
}

#[get("/users")]
pub async fn list(store: &State<SharedStore>) -> ApiResult<UsersContainer> {
    let users = db::blocking(store, |store| store.users()).await?;
    Ok(Json(UsersContainer { users }))
}
