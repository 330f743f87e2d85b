pub mod analytics;
pub mod cache;
pub mod config;
pub mod error;
pub mod estimates;
pub mod repo;
pub mod routes;
pub mod state;

use axum::Router;

pub fn app(state: state::AppState) -> Router {
    routes::router(state)
}
