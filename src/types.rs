use diesel::result::Error as DieselError;
use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, Responder};
use serde_json::json;
use std::fmt;
use tracing::error;

use crate::utils::try_respond;

pub const ROUTE_NOT_FOUND: &str = "Route not found";
pub const INTERNAL_ERROR: &str = "Internal server error";
pub const MALFORMED_BODY: &str = "Bad request - malformed request body";

pub const ARTICLE_MISSING: &str = "article does not exist";
pub const COMMENT_MISSING: &str = "comment does not exist";
pub const TOPIC_MISSING: &str = "topic does not exist";
pub const USER_MISSING: &str = "User does not exist";

/// Every failure a request can end in. The responder below is the single
/// place where these become HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(&'static str),
    NotFound(&'static str),
    Diesel(DieselError),
    Pool(r2d2::Error),
    Internal,
}

impl From<DieselError> for ApiError {
    fn from(err: DieselError) -> ApiError {
        ApiError::Diesel(err)
    }
}

impl From<r2d2::Error> for ApiError {
    fn from(err: r2d2::Error) -> ApiError {
        ApiError::Pool(err)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Diesel(err) => write!(f, "database error: {}", err),
            ApiError::Pool(err) => write!(f, "connection pool error: {}", err),
            other => f.write_str(other.message()),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    pub fn status(&self) -> Status {
        match self {
            ApiError::BadRequest(_) => Status::BadRequest,
            ApiError::NotFound(_) => Status::NotFound,
            _ => Status::InternalServerError,
        }
    }

    /// Text sent to the client. Database and pool details never leave the
    /// process.
    pub fn message(&self) -> &'static str {
        match self {
            ApiError::BadRequest(message) | ApiError::NotFound(message) => message,
            _ => INTERNAL_ERROR,
        }
    }
}

pub type ApiResult<T> = Result<rocket::serde::json::Json<T>, ApiError>;

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        if status == Status::InternalServerError {
            error!(error = %self, uri = %req.uri(), "request failed");
        }
        let body = json!({ "message": self.message() });
        try_respond(req, body, status)
    }
}
