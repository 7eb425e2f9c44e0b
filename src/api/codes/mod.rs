//! Redemption Code API 模块

mod handler;

use axum::{Router, routing::{delete, post}};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/codes", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::issue))
        .route("/validate", post(handler::validate))
        .route("/expired", delete(handler::cleanup_expired))
}
