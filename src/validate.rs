//! Request validation that runs before any store call.

use rocket::serde::json::{Error as JsonError, Json};
use std::str::FromStr;

use crate::types::{ApiError, MALFORMED_BODY};

pub const ARTICLE_ID_NAN: &str = "Bad request - article Id can only be a number";
pub const COMMENT_ID_NAN: &str = "Bad request - comment Id can only be a number";

pub const MISSING_USERNAME: &str = "missing username, unable to post comment";
pub const MISSING_CONTENT: &str = "missing content, unable to post an empty comment";
pub const MISSING_BOTH: &str = "missing fields username and content";
pub const MISSING_INC_VOTES: &str = "missing inc_votes, unable to update votes";
pub const VOTES_OUT_OF_RANGE: &str = "Bad request - inc_votes out of range";

pub const INVALID_SORT: &str = "Bad request - invalid sort query";
pub const INVALID_ORDER: &str = "Bad request - invalid order query";

/// Turns a deserialized body into the value a handler acts on, or the
/// 400 that explains what is wrong with it.
pub trait Validate
where
    Self: Sized,
{
    type Output;
    fn validate(self) -> Result<Self::Output, ApiError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Article,
    Comment,
}

/// Path ids must be base-10 integers that fit the `INT` column.
pub fn parse_id(raw: &str, entity: Entity) -> Result<i32, ApiError> {
    raw.parse::<i32>().map_err(|_| match entity {
        Entity::Article => ApiError::BadRequest(ARTICLE_ID_NAN),
        Entity::Comment => ApiError::BadRequest(COMMENT_ID_NAN),
    })
}

/// Unwraps a JSON data guard, mapping parse failures to a 400. An empty
/// payload reads as `{}` so the missing-field checks still apply.
pub fn json_body<T: Default>(body: Result<Json<T>, JsonError<'_>>) -> Result<T, ApiError> {
    match body {
        Ok(json) => Ok(json.into_inner()),
        Err(JsonError::Parse(raw, _)) if raw.trim().is_empty() => Ok(T::default()),
        Err(err) => {
            tracing::debug!(error = ?err, "rejected request body");
            Err(ApiError::BadRequest(MALFORMED_BODY))
        }
    }
}

/// Blank strings count as absent.
pub fn present(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.trim().is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    ArticleId,
    Title,
    Topic,
    Author,
    #[default]
    CreatedAt,
    Votes,
    CommentCount,
    ArticleImgUrl,
}

impl SortBy {
    /// Column expression for the listing query. Only ever one of these
    /// literals reaches the SQL text.
    pub fn column(self) -> &'static str {
        match self {
            SortBy::ArticleId => "articles.article_id",
            SortBy::Title => "articles.title",
            SortBy::Topic => "articles.topic",
            SortBy::Author => "articles.author",
            SortBy::CreatedAt => "articles.created_at",
            SortBy::Votes => "articles.votes",
            SortBy::CommentCount => "comment_count",
            SortBy::ArticleImgUrl => "articles.article_img_url",
        }
    }
}

impl FromStr for SortBy {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "article_id" => Ok(SortBy::ArticleId),
            "title" => Ok(SortBy::Title),
            "topic" => Ok(SortBy::Topic),
            "author" => Ok(SortBy::Author),
            "created_at" => Ok(SortBy::CreatedAt),
            "votes" => Ok(SortBy::Votes),
            "comment_count" => Ok(SortBy::CommentCount),
            "article_img_url" => Ok(SortBy::ArticleImgUrl),
            _ => Err(ApiError::BadRequest(INVALID_SORT)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    Asc,
    #[default]
    Desc,
}

impl Order {
    pub fn keyword(self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

impl FromStr for Order {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(Order::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(Order::Desc)
        } else {
            Err(ApiError::BadRequest(INVALID_ORDER))
        }
    }
}

/// Filter and ordering for the article listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleQuery {
    pub topic: Option<String>,
    pub sort_by: SortBy,
    pub order: Order,
}

impl ArticleQuery {
    pub fn parse(
        topic: Option<&str>,
        sort_by: Option<&str>,
        order: Option<&str>,
    ) -> Result<Self, ApiError> {
        Ok(ArticleQuery {
            topic: topic.map(str::to_owned),
            sort_by: sort_by.map(str::parse::<SortBy>).transpose()?.unwrap_or_default(),
            order: order.map(str::parse::<Order>).transpose()?.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bad_request(err: ApiError) -> &'static str {
        match err {
            ApiError::BadRequest(message) => message,
            other => panic!("expected a bad request, got {:?}", other),
        }
    }

    #[test]
    fn ids_must_be_base_ten_integers() {
        assert_eq!(parse_id("13", Entity::Article).unwrap(), 13);
        assert_eq!(parse_id("-4", Entity::Article).unwrap(), -4);

        for raw in ["sushi-article", "1.5", "0x1", "", " 1", "99999999999"] {
            let err = parse_id(raw, Entity::Article).unwrap_err();
            assert_eq!(bad_request(err), ARTICLE_ID_NAN, "input {:?}", raw);
        }

        let err = parse_id("ramen", Entity::Comment).unwrap_err();
        assert_eq!(bad_request(err), COMMENT_ID_NAN);
    }

    #[derive(Debug, Default, PartialEq, serde::Deserialize)]
    struct Fields {
        field: Option<String>,
    }

    fn parse_failure(raw: &str) -> Result<Json<Fields>, JsonError<'_>> {
        let err = serde_json::from_str::<Fields>(raw).unwrap_err();
        Err(JsonError::Parse(raw, err))
    }

    #[test]
    fn empty_bodies_read_as_empty_objects() {
        assert_eq!(json_body(parse_failure("")).unwrap(), Fields::default());
        assert_eq!(json_body(parse_failure("  \n")).unwrap(), Fields::default());

        let err = json_body(parse_failure("{\"field\":")).unwrap_err();
        assert_eq!(bad_request(err), MALFORMED_BODY);
    }

    #[test]
    fn blank_fields_are_absent() {
        assert_eq!(present(Some("lurker".into())), Some("lurker".into()));
        assert_eq!(present(Some("   ".into())), None);
        assert_eq!(present(None), None);
    }

    #[test]
    fn listing_defaults_to_newest_first() {
        let query = ArticleQuery::parse(None, None, None).unwrap();
        assert_eq!(query.sort_by, SortBy::CreatedAt);
        assert_eq!(query.order, Order::Desc);
        assert_eq!(query.topic, None);
    }

    #[test]
    fn listing_queries_are_whitelisted() {
        let query = ArticleQuery::parse(Some("cats"), Some("votes"), Some("ASC")).unwrap();
        assert_eq!(query.topic.as_deref(), Some("cats"));
        assert_eq!(query.sort_by.column(), "articles.votes");
        assert_eq!(query.order, Order::Asc);

        let err = ArticleQuery::parse(None, Some("votes; DROP TABLE articles"), None).unwrap_err();
        assert_eq!(bad_request(err), INVALID_SORT);

        let err = ArticleQuery::parse(None, None, Some("sideways")).unwrap_err();
        assert_eq!(bad_request(err), INVALID_ORDER);
    }
}
