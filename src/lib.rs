#[macro_use]
extern crate rocket;
#[macro_use]
extern crate diesel;
#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate lazy_static;

pub mod api;
pub mod article;
pub mod comment;
pub mod config;
pub mod db;
pub mod topic;
pub mod types;
pub mod user;
pub mod utils;
pub mod validate;

use rocket::http::Status;
use rocket::request::Request;
use rocket::serde::json::Json;
use rocket::{Build, Rocket};
use serde_json::{json, Value};

use db::SharedStore;
use types::{INTERNAL_ERROR, ROUTE_NOT_FOUND};

#[catch(404)]
fn not_found(_req: &Request) -> Json<Value> {
    Json(json!({ "message": ROUTE_NOT_FOUND }))
}

#[catch(500)]
fn internal_error(_req: &Request) -> Json<Value> {
    Json(json!({ "message": INTERNAL_ERROR }))
}

#[catch(default)]
fn fallback(status: Status, _req: &Request) -> Json<Value> {
    Json(json!({ "message": status.reason().unwrap_or("Unknown error") }))
}

/// Builds the application around a store. `main` passes the Postgres store;
/// tests pass a freshly seeded in-memory one.
pub fn rocket(store: SharedStore) -> Rocket<Build> {
    rocket::build()
        .manage(store)
        .mount(
            "/api",
            routes![
                api::endpoints,
                topic::list,
                user::list,
                article::list,
                article::get,
                article::update_votes,
                comment::list,
                comment::add,
                comment::delete,
            ],
        )
        .register("/", catchers![not_found, internal_error, fallback])
}
