use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rocket::http::Status;
use rocket::response::status;
use rocket::serde::json::{Error as JsonError, Json};
use rocket::State;
use serde::{Deserialize, Serialize};

use crate::db::schema::comments;
use crate::db::{self, SharedStore};
use crate::types::{ApiError, ApiResult};
use crate::utils::{deserialize_millis, serialize_date};
use crate::validate::{
    self, present, Entity, Validate, MISSING_BOTH, MISSING_CONTENT, MISSING_USERNAME,
};

#[derive(Debug, Clone, PartialEq, Serialize, Queryable, Selectable)]
#[diesel(table_name = comments)]
pub struct Comment {
    pub comment_id: i32,
    pub body: String,
    pub article_id: i32,
    pub author: String,
    pub votes: i32,
    #[serde(serialize_with = "serialize_date")]
    pub created_at: DateTime<Utc>,
}

/// A comment as posted by a client. Votes and the timestamp take their
/// column defaults.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = comments)]
pub struct NewComment {
    pub article_id: i32,
    pub author: String,
    pub body: String,
}

/// A comment as it appears in a seed file.
#[derive(Debug, Deserialize, Insertable)]
#[diesel(table_name = comments)]
pub struct SeedComment {
    pub body: String,
    pub article_id: i32,
    pub author: String,
    #[serde(default)]
    pub votes: i32,
    #[serde(deserialize_with = "deserialize_millis")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CommentBody {
    username: Option<String>,
    body: Option<String>,
}

impl Validate for CommentBody {
    type Output = (String, String);
    fn validate(self) -> Result<(String, String), ApiError> {
        match (present(self.username), present(self.body)) {
            (Some(username), Some(body)) => Ok((username, body)),
            (None, None) => Err(ApiError::BadRequest(MISSING_BOTH)),
            (None, Some(_)) => Err(ApiError::BadRequest(MISSING_USERNAME)),
            (Some(_), None) => Err(ApiError::BadRequest(MISSING_CONTENT)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentContainer<T> {
    comment: T,
}

#[derive(Debug, Serialize)]
pub struct CommentsContainer<T> {
    comments: T,
}

#[get("/articles/<article_id>/comments")]
pub async fn list(
    store: &State<SharedStore>,
    article_id: &str,
) -> ApiResult<CommentsContainer<Vec<Comment>>> {
    let article_id = validate::parse_id(article_id, Entity::Article)?;
    let comments = db::blocking(store, move |store| store.comments_for(article_id)).await?;
    Ok(Json(CommentsContainer { comments }))
}

#[post("/articles/<article_id>/comments", data = "<details>")]
pub async fn add(
    store: &State<SharedStore>,
    article_id: &str,
    details: Result<Json<CommentBody>, JsonError<'_>>,
) -> Result<status::Custom<Json<CommentContainer<Comment>>>, ApiError> {
    let article_id = validate::parse_id(article_id, Entity::Article)?;
    let (author, body) = validate::json_body(details)?.validate()?;
    let new_comment = NewComment {
        article_id,
        author,
        body,
    };
    let comment = db::blocking(store, move |store| store.add_comment(new_comment)).await?;
    Ok(status::Custom(
        Status::Created,
        Json(CommentContainer { comment }),
    ))
}

#[delete("/comments/<comment_id>")]
pub async fn delete(
    store: &State<SharedStore>,
    comment_id: &str,
) -> Result<status::NoContent, ApiError> {
    let comment_id = validate::parse_id(comment_id, Entity::Comment)?;
    db::blocking(store, move |store| store.delete_comment(comment_id)).await?;
    Ok(status::NoContent)
}
