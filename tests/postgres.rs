//! End-to-end checks against a real database.
//!
//! Enabled with `cargo test --features postgres-tests`; needs `DATABASE_URL`
//! pointing at a disposable database, which every test reseeds.
#![cfg(feature = "postgres-tests")]

use diesel::pg::PgConnection;
use diesel::Connection;
use rocket::http::Status;
use rocket::local::blocking::Client;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex, MutexGuard};

use news_api::config::Config;
use news_api::db::pg::PgStore;
use news_api::db::seed::{self, SeedData};
use news_api::db::init_pool;

lazy_static::lazy_static! {
    static ref DATABASE: Mutex<()> = Mutex::new(());
}

/// Holds the database for the lifetime of one test.
struct Seeded {
    client: Client,
    _guard: MutexGuard<'static, ()>,
}

fn seeded() -> Seeded {
    let guard = DATABASE.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let config = Config::from_env().expect("DATABASE_URL is set");
    let url = config.database_url.clone().expect("DATABASE_URL is set");
    let mut connection = PgConnection::establish(&url).expect("database reachable");
    seed::run(&mut connection, &SeedData::test().unwrap()).expect("seed succeeds");

    let pool = init_pool(&config).expect("pool builds");
    let client = Client::tracked(news_api::rocket(Arc::new(PgStore::new(pool)))).unwrap();
    Seeded {
        client,
        _guard: guard,
    }
}

fn json_of(response: rocket::local::blocking::LocalResponse<'_>) -> (Status, Value) {
    let status = response.status();
    (status, response.into_json().unwrap_or(Value::Null))
}

#[test]
fn article_one_round_trips_from_storage() {
    let app = seeded();
    let (status, body) = json_of(app.client.get("/api/articles/1").dispatch());
    assert_eq!(status, Status::Ok);
    assert_eq!(body["article"]["votes"], 100);
    assert_eq!(body["article"]["created_at"], "2020-07-09T20:11:00.000Z");
}

#[test]
fn listing_counts_comments_as_strings() {
    let app = seeded();
    let (status, body) = json_of(app.client.get("/api/articles").dispatch());
    assert_eq!(status, Status::Ok);
    let articles = body["articles"].as_array().unwrap();
    assert_eq!(articles.len(), 13);
    let first = articles.iter().find(|a| a["article_id"] == 1).unwrap();
    assert_eq!(first["comment_count"], "11");

    let (status, body) = json_of(app.client.get("/api/articles?topic=dogs").dispatch());
    assert_eq!(status, Status::NotFound);
    assert_eq!(body["message"], "topic does not exist");
}

#[test]
fn comments_are_scoped_to_existing_articles() {
    let app = seeded();
    let (status, body) = json_of(app.client.get("/api/articles/1/comments").dispatch());
    assert_eq!(status, Status::Ok);
    assert_eq!(body["comments"].as_array().unwrap().len(), 11);

    let (status, body) = json_of(app.client.get("/api/articles/2/comments").dispatch());
    assert_eq!(status, Status::Ok);
    assert_eq!(body["comments"], json!([]));

    let (status, body) = json_of(app.client.get("/api/articles/999/comments").dispatch());
    assert_eq!(status, Status::NotFound);
    assert_eq!(body["message"], "article does not exist");
}

#[test]
fn foreign_key_violations_name_the_missing_row() {
    let app = seeded();
    let (status, body) = json_of(
        app.client
            .post("/api/articles/1/comments")
            .json(&json!({ "username": "notUser", "body": "Test comment" }))
            .dispatch(),
    );
    assert_eq!(status, Status::NotFound);
    assert_eq!(body["message"], "User does not exist");

    let (status, body) = json_of(
        app.client
            .post("/api/articles/999/comments")
            .json(&json!({ "username": "lurker", "body": "Test comment" }))
            .dispatch(),
    );
    assert_eq!(status, Status::NotFound);
    assert_eq!(body["message"], "article does not exist");

    let (status, body) = json_of(
        app.client
            .post("/api/articles/6/comments")
            .json(&json!({ "username": "butter_bridge", "body": "I am a test comment" }))
            .dispatch(),
    );
    assert_eq!(status, Status::Created);
    assert_eq!(body["comment"]["comment_id"], 19);
    assert_eq!(body["comment"]["votes"], 0);
}

#[test]
fn votes_update_under_a_row_lock() {
    let app = seeded();
    let (status, body) = json_of(
        app.client
            .patch("/api/articles/1")
            .json(&json!({ "inc_votes": -10 }))
            .dispatch(),
    );
    assert_eq!(status, Status::Ok);
    assert_eq!(body["article"]["votes"], 90);

    let (status, _) = json_of(
        app.client
            .patch("/api/articles/999")
            .json(&json!({ "inc_votes": 1 }))
            .dispatch(),
    );
    assert_eq!(status, Status::NotFound);

    let (status, body) = json_of(
        app.client
            .patch("/api/articles/1")
            .json(&json!({ "inc_votes": i32::MAX }))
            .dispatch(),
    );
    assert_eq!(status, Status::BadRequest);
    assert_eq!(body["message"], "Bad request - inc_votes out of range");
}

#[test]
fn deleted_comments_are_gone() {
    let app = seeded();
    let response = app.client.delete("/api/comments/1").dispatch();
    assert_eq!(response.status(), Status::NoContent);
    let (status, body) = json_of(app.client.delete("/api/comments/1").dispatch());
    assert_eq!(status, Status::NotFound);
    assert_eq!(body["message"], "comment does not exist");
}
