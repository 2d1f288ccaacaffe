//! HTTP API: session endpoints over the research service.

pub mod handlers;
pub mod routes;

pub use routes::create_router;
