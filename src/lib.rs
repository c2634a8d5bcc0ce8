// src/lib.rs

pub mod config;
pub mod error;
pub mod flow;
pub mod handlers;
pub mod models;
pub mod notify;
pub mod routes;
pub mod state;
pub mod stats;
pub mod utils;

// Re-export specific items for convenience if needed
pub use routes::create_router;
