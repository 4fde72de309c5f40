use std::sync::Arc;

use dashmap::DashMap;
use rocket::{Build, Rocket, routes};

pub mod cleanup;
pub mod cors;
pub mod data;
pub mod error;
pub mod logic;
pub mod model;
pub mod rate_limit;
pub mod routes;

use crate::{
    cleanup::CleanupFairing,
    cors::create_cors,
    logic::Sessions,
    rate_limit::create_rate_limiter,
    routes::{act, create_game, delete_game},
};

/// Assembles the server instance; shared between `main` and the HTTP tests.
pub fn build_rocket() -> Rocket<Build> {
    let sessions: Sessions = Arc::new(DashMap::new());
    let rate_limiter = create_rate_limiter();

    rocket::build()
        .attach(create_cors())
        .attach(CleanupFairing)
        .manage(sessions)
        .manage(rate_limiter)
        .mount("/games", routes![create_game, act, delete_game])
}
