use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(crate::api::handlers::root))
        .route(
            "/research",
            get(crate::api::handlers::list_research).post(crate::api::handlers::create_research),
        )
        .route(
            "/research/{research_id}",
            get(crate::api::handlers::get_research),
        )
        .route(
            "/research/{research_id}/continue",
            post(crate::api::handlers::continue_research),
        )
}
