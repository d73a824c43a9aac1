use axum::response::{IntoResponse, Redirect};
use tower_sessions::Session;

use crate::middleware::access::landing_route;
use crate::models::session::SessionContext;

/// Sends every visitor to the home page of their role.
pub async fn index(session: Session) -> impl IntoResponse {
    let role = SessionContext::load(&session).await.map(|c| c.role());
    Redirect::to(landing_route(role))
}

pub async fn health_check() -> &'static str {
    "OK"
}
