use rocket::serde::json::Json;
use serde::Serialize;
use serde_json::Value;

lazy_static! {
    static ref ENDPOINTS: Value =
        serde_json::from_str(include_str!("../endpoints.json")).unwrap_or_else(|err| {
            tracing::error!(error = %err, "endpoints.json is not valid JSON");
            Value::Null
        });
}

#[derive(Debug, Serialize)]
pub struct EndpointsContainer {
    endpoints: &'static Value,
}

#[get("/")]
pub fn endpoints() -> Json<EndpointsContainer> {
    Json(EndpointsContainer {
        endpoints: &*ENDPOINTS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let documented = ENDPOINTS.as_object().unwrap();
        for key in [
            "GET /api",
            "GET /api/topics",
            "GET /api/users",
            "GET /api/articles",
            "GET /api/articles/:article_id",
            "PATCH /api/articles/:article_id",
            "GET /api/articles/:article_id/comments",
            "POST /api/articles/:article_id/comments",
            "DELETE /api/comments/:comment_id",
        ] {
            assert!(documented.contains_key(key), "{} is undocumented", key);
        }
    }
}
