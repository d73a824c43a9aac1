use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::middleware::access::{Gate, RouteAccess};
use crate::models::session::SessionContext;

pub const HX_REQUEST: &str = "HX-Request";
pub const HX_REDIRECT: &str = "HX-Redirect";

/// Applies a [`RouteAccess`] rule to every request of the routes it layers.
/// Admitted requests carry the [`SessionContext`] as an extension.
pub async fn role_gate(
    State(access): State<RouteAccess>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Response {
    let context = SessionContext::load(&session).await;

    match access.decide(context.as_ref().map(SessionContext::role)) {
        Gate::Allow => {
            if let Some(context) = context {
                request.extensions_mut().insert(context);
            }
            next.run(request).await
        }
        Gate::Redirect(target) => {
            tracing::debug!(
                path = %request.uri().path(),
                target,
                "Route not open to current visitor, redirecting"
            );
            redirect(request.headers(), target)
        }
    }
}

/// HTMX swaps cannot follow a 303, so fragment requests get `HX-Redirect`.
pub fn redirect(headers: &HeaderMap, target: &'static str) -> Response {
    if headers.contains_key(HX_REQUEST) {
        let mut response = StatusCode::OK.into_response();
        response
            .headers_mut()
            .insert(HX_REDIRECT, HeaderValue::from_static(target));
        response
    } else {
        Redirect::to(target).into_response()
    }
}
