use askama::Template;
use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use tower_sessions::Session;
use validator::Validate;

use crate::error::{Notice, Notify};
use crate::middleware::access::{landing_route, SIGN_IN_ROUTE};
use crate::middleware::auth::redirect;
use crate::models::auth::{SignInForm, SignUpForm};
use crate::models::session::SessionContext;
use crate::AppState;

pub const ORGANIZATION_ONBOARDING_ROUTE: &str = "/onboarding/organization";

#[derive(Template)]
#[template(path = "auth/sign_in.html")]
pub struct SignInTemplate {}

#[derive(Template)]
#[template(path = "auth/sign_up.html")]
pub struct SignUpTemplate {}

pub async fn sign_in_page(session: Session) -> Response {
    match SessionContext::load(&session).await {
        Some(context) => Redirect::to(landing_route(Some(context.role()))).into_response(),
        None => SignInTemplate {}.into_response(),
    }
}

pub async fn sign_up_page() -> impl IntoResponse {
    SignUpTemplate {}
}

pub async fn sign_in_handler(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<SignInForm>,
) -> Result<Response, Notify> {
    form.validate()?;

    let data = state.backend.sign_in(&form).await?;

    // One verification call fills in the profile; the sign-in reply is the
    // fallback when it fails.
    let user = match state.backend.verify(&data.access_token).await {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!(error = %e, "Token verification failed after sign-in");
            data.user()
        }
    };

    let context = SessionContext {
        access_token: data.access_token,
        user,
    };
    if let Err(e) = session.cycle_id().await {
        tracing::warn!(error = %e, "Could not rotate session id");
    }
    context.store(&session).await?;

    tracing::info!(
        email = %context.user.email,
        role = %context.role(),
        "User signed in"
    );

    let target = if context.needs_onboarding() {
        ORGANIZATION_ONBOARDING_ROUTE
    } else {
        landing_route(Some(context.role()))
    };
    Ok(redirect(&headers, target))
}

pub async fn sign_up_handler(
    State(state): State<AppState>,
    Form(form): Form<SignUpForm>,
) -> Result<Notice, Notify> {
    form.validate()?;
    let message = state.backend.sign_up(&form).await?;
    tracing::info!(email = %form.email, "Account created");
    Ok(Notice::success(message))
}

pub async fn sign_out_handler(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
) -> Result<Response, Notify> {
    if let Some(context) = SessionContext::load(&session).await {
        // Revocation failing must not keep the user signed in here.
        if let Err(e) = state.backend.sign_out(&context.access_token).await {
            tracing::warn!(error = %e, "Backend sign-out failed");
        }
        tracing::info!(email = %context.user.email, "User signed out");
    }
    SessionContext::clear(&session).await?;
    Ok(redirect(&headers, SIGN_IN_ROUTE))
}
