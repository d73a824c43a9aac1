use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use service_core::middleware::{request_id_middleware, security_headers_middleware};
use service_core::observability::REQUEST_ID_HEADER;
use time::Duration;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::handlers::{
    app::{health_check, index},
    auth::{sign_in_handler, sign_in_page, sign_out_handler, sign_up_handler, sign_up_page},
    bills, categories, dashboard, organization, profile, students, template,
};
use crate::middleware::access::{
    RouteAccess, ADMIN_PAGES, ANY_SIGNED_IN, STAFF_PAGES, SUPER_USER_PAGES, USER_PAGES,
};
use crate::middleware::auth::role_gate;
use crate::middleware::metrics::metrics_middleware;
use crate::AppState;

#[derive(Debug, Clone)]
pub struct RouterOptions {
    pub secure_cookies: bool,
    pub session_hours: i64,
    pub static_dir: String,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            secure_cookies: false,
            session_hours: 24,
            static_dir: "portal-frontend/static".to_string(),
        }
    }
}

fn gated(routes: Router<AppState>, access: RouteAccess) -> Router<AppState> {
    routes.route_layer(from_fn_with_state(access, role_gate))
}

pub fn build_router(state: AppState, options: RouterOptions) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(options.secure_cookies)
        .with_expiry(Expiry::OnInactivity(Duration::hours(options.session_hours)));

    let public = Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/metrics", get(crate::handlers::metrics::metrics))
        .route("/auth/sign-in", get(sign_in_page).post(sign_in_handler))
        .route("/auth/sign-up", get(sign_up_page).post(sign_up_handler))
        .route("/auth/sign-out", get(sign_out_handler).post(sign_out_handler));

    let signed_in = Router::new()
        .route("/dashboard", get(dashboard::dashboard_redirect))
        .route("/profile", get(profile::profile_page))
        .route(
            "/onboarding/profile",
            get(profile::onboarding_page).post(profile::submit_onboarding),
        )
        .route("/profile/links", post(profile::create_link))
        .route("/profile/links/:id", post(profile::update_link))
        .route("/profile/skills/categories", post(profile::add_skill_category))
        .route(
            "/profile/skills/categories/:id/delete",
            post(profile::delete_skill_category),
        )
        .route("/profile/skills", post(profile::add_skill))
        .route("/profile/skills/:id/delete", post(profile::delete_skill));

    let user = Router::new().route("/dashboard/user", get(dashboard::user_dashboard));

    let admin = Router::new()
        .route("/dashboard/admin", get(dashboard::admin_dashboard))
        .route(
            "/onboarding/organization",
            get(organization::organization_page).post(organization::register_organization),
        )
        .route(
            "/dashboard/admin/categories",
            get(categories::categories_page).post(categories::create_category),
        )
        .route(
            "/dashboard/admin/categories/:id",
            post(categories::update_category),
        )
        .route(
            "/dashboard/admin/categories/:id/delete",
            post(categories::delete_category),
        )
        .route(
            "/dashboard/admin/template",
            get(template::template_page).post(template::update_template),
        );

    let super_user =
        Router::new().route("/dashboard/super-user", get(dashboard::super_user_dashboard));

    let staff = Router::new()
        .route("/students", get(students::students_page).post(students::add_student))
        .route("/students/list", get(students::student_list))
        .route("/students/bulk", post(students::bulk_upload))
        .route("/students/bulk/preview", post(students::preview_upload))
        .route("/students/bulk/discard", post(students::discard_upload))
        .route("/students/:id/delete", post(students::delete_student))
        .route("/bills/new", get(bills::bill_page))
        .route("/bills", post(bills::submit_bill))
        .route("/bills/reset", post(bills::reset_bill))
        .route("/bills/items", post(bills::add_item))
        .route("/bills/items/:index", post(bills::update_item))
        .route("/bills/items/:index/delete", post(bills::remove_item))
        .route("/bills/subjects", get(bills::search_subjects))
        .route("/bills/subject", post(bills::select_subject))
        .route("/bills/details", post(bills::update_details))
        .route("/bills/preview", get(bills::preview_fragment))
        .route("/bills/preview.txt", get(bills::preview_text));

    Router::new()
        .merge(public)
        .merge(gated(signed_in, ANY_SIGNED_IN))
        .merge(gated(user, USER_PAGES))
        .merge(gated(admin, ADMIN_PAGES))
        .merge(gated(super_user, SUPER_USER_PAGES))
        .merge(gated(staff, STAFF_PAGES))
        .nest_service("/static", ServeDir::new(&options.static_dir))
        .layer(session_layer)
        .layer(from_fn(metrics_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}
