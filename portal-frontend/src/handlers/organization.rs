use askama::Template;
use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    Form,
};
use tower_sessions::Session;
use validator::Validate;

use crate::error::Notify;
use crate::middleware::access::landing_route;
use crate::middleware::auth::redirect;
use crate::models::organization::OrganizationForm;
use crate::models::session::SessionContext;
use crate::AppState;

#[derive(Template)]
#[template(path = "onboarding/organization.html")]
pub struct OrganizationOnboardingTemplate {
    pub admin_name: String,
}

pub async fn organization_page(context: SessionContext) -> impl IntoResponse {
    OrganizationOnboardingTemplate {
        admin_name: context.user.name,
    }
}

pub async fn register_organization(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    mut context: SessionContext,
    Form(form): Form<OrganizationForm>,
) -> Result<Response, Notify> {
    form.validate()?;
    let message = state
        .backend
        .register_organization(&context.access_token, &form)
        .await?;
    tracing::info!(organization = %form.name, "{}", message);

    // The backend now links the admin to the new organization.
    match state.backend.verify(&context.access_token).await {
        Ok(user) => context.user = user,
        Err(e) => tracing::warn!(error = %e, "Could not refresh user after registration"),
    }
    context.user.is_organization_configured = true;
    context.store(&session).await?;

    Ok(redirect(&headers, landing_route(Some(context.role()))))
}
