pub mod app_state;
pub mod client;
pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod list_view;
pub mod models;
pub mod routes;
pub mod seed;

pub use app_state::AppState;
pub use client::{BookClient, Endpoint};
pub use config::Config;
pub use errors::*;
pub use models::*;
pub use routes::build_router;
