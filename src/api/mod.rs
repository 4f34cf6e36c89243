//! API layer - HTTP endpoints and middleware

pub mod health;
pub mod middleware;
pub mod rest;
pub mod router;
pub mod state;
pub mod types;
pub mod web;

pub use router::{create_router, with_metrics};
pub use state::AppState;
