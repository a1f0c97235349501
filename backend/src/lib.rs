pub mod processor;
pub mod routes;
pub mod store;
pub mod queries;
pub mod cors;
pub mod config;
pub mod error;
pub mod utils;
pub mod catchers;
pub use shared::{models::*, error::*};

use rocket::{catchers, routes, Build, Rocket};
use crate::{
    catchers::{bad_request, internal_error, not_found},
    config::AppConfig,
    cors::CORS,
    routes::{
        all_options, cast_vote, create_poll, delete_poll, get_active_poll, list_polls,
        set_poll_active, update_poll, AppState,
    },
};

/// The API server without static file serving.
pub fn build(app_state: AppState, config: &AppConfig) -> Rocket<Build> {
    rocket::build()
        .attach(CORS::new(config.cors_allowed_origin.clone()))
        .manage(app_state)
        .mount(
            "/api",
            routes![
                list_polls,
                create_poll,
                update_poll,
                set_poll_active,
                delete_poll,
                get_active_poll,
                cast_vote,
                all_options
            ],
        )
        .register(
            "/",
            catchers![
                bad_request,
                not_found,
                internal_error
            ],
        )
}
