use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer, Text, Timestamptz};
use rocket::serde::json::{Error as JsonError, Json};
use rocket::State;
use serde::{Deserialize, Serialize};

use crate::db::schema::articles;
use crate::db::{self, SharedStore};
use crate::types::{ApiError, ApiResult};
use crate::utils::{deserialize_millis, serialize_count, serialize_date};
use crate::validate::{self, ArticleQuery, Entity, Validate, MISSING_INC_VOTES};

#[derive(Debug, Clone, PartialEq, Serialize, Queryable, Selectable)]
#[diesel(table_name = articles)]
pub struct Article {
    pub article_id: i32,
    pub title: String,
    pub topic: String,
    pub author: String,
    pub body: String,
    #[serde(serialize_with = "serialize_date")]
    pub created_at: DateTime<Utc>,
    pub votes: i32,
    pub article_img_url: String,
}

/// Listing row: the article without its body, plus how many comments it has.
#[derive(Debug, Clone, PartialEq, Serialize, QueryableByName)]
pub struct ArticleSummary {
    #[diesel(sql_type = Integer)]
    pub article_id: i32,
    #[diesel(sql_type = Text)]
    pub title: String,
    #[diesel(sql_type = Text)]
    pub topic: String,
    #[diesel(sql_type = Text)]
    pub author: String,
    #[diesel(sql_type = Timestamptz)]
    #[serde(serialize_with = "serialize_date")]
    pub created_at: DateTime<Utc>,
    #[diesel(sql_type = Integer)]
    pub votes: i32,
    #[diesel(sql_type = Text)]
    pub article_img_url: String,
    #[diesel(sql_type = BigInt)]
    #[serde(serialize_with = "serialize_count")]
    pub comment_count: i64,
}

impl ArticleSummary {
    pub fn with_count(article: &Article, comment_count: i64) -> Self {
        ArticleSummary {
            article_id: article.article_id,
            title: article.title.clone(),
            topic: article.topic.clone(),
            author: article.author.clone(),
            created_at: article.created_at,
            votes: article.votes,
            article_img_url: article.article_img_url.clone(),
            comment_count,
        }
    }
}

#[derive(Debug, Deserialize, Insertable)]
#[diesel(table_name = articles)]
pub struct NewArticle {
    pub title: String,
    pub topic: String,
    pub author: String,
    pub body: String,
    #[serde(deserialize_with = "deserialize_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub votes: i32,
    pub article_img_url: String,
}

#[derive(Debug, Serialize)]
pub struct ArticleContainer<T> {
    article: T,
}

#[derive(Debug, Serialize)]
pub struct ArticlesContainer<T> {
    articles: T,
}

#[derive(Debug, Default, Deserialize)]
pub struct VotePatch {
    inc_votes: Option<i32>,
}

impl Validate for VotePatch {
    type Output = i32;
    fn validate(self) -> Result<i32, ApiError> {
        self.inc_votes.ok_or(ApiError::BadRequest(MISSING_INC_VOTES))
    }
}

#[get("/articles?<topic>&<sort_by>&<order>")]
pub async fn list(
    store: &State<SharedStore>,
    topic: Option<&str>,
    sort_by: Option<&str>,
    order: Option<&str>,
) -> ApiResult<ArticlesContainer<Vec<ArticleSummary>>> {
    let query = ArticleQuery::parse(topic, sort_by, order)?;
    let articles = db::blocking(store, move |store| store.articles(&query)).await?;
    Ok(Json(ArticlesContainer { articles }))
}

#[get("/articles/<article_id>")]
pub async fn get(
    store: &State<SharedStore>,
    article_id: &str,
) -> ApiResult<ArticleContainer<Article>> {
    let article_id = validate::parse_id(article_id, Entity::Article)?;
    let article = db::blocking(store, move |store| store.article(article_id)).await?;
    Ok(Json(ArticleContainer { article }))
}

#[patch("/articles/<article_id>", data = "<patch>")]
pub async fn update_votes(
    store: &State<SharedStore>,
    article_id: &str,
    patch: Result<Json<VotePatch>, JsonError<'_>>,
) -> ApiResult<ArticleContainer<Article>> {
    let article_id = validate::parse_id(article_id, Entity::Article)?;
    let inc_votes = validate::json_body(patch)?.validate()?;
    let article = db::blocking(store, move |store| store.adjust_votes(article_id, inc_votes)).await?;
    Ok(Json(ArticleContainer { article }))
}
