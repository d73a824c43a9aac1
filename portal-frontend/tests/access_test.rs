use axum::{
    body::Body,
    extract::Path,
    http::{header, Request, StatusCode},
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use portal_frontend::middleware::access::{
    landing_route, Gate, Role, ADMIN_PAGES, ANY_SIGNED_IN, STAFF_PAGES, SUPER_USER_PAGES,
    USER_PAGES,
};
use portal_frontend::middleware::auth::role_gate;
use portal_frontend::models::session::{SessionContext, SessionUser};
use tower::util::ServiceExt;
use tower_sessions::{MemoryStore, Session, SessionManagerLayer};

fn context_for(role: Role) -> SessionContext {
    SessionContext {
        access_token: "token".to_string(),
        user: SessionUser {
            name: "Asha Rao".to_string(),
            email: "asha@school.in".to_string(),
            organization: Some("org-1".to_string()),
            role,
            is_organization_configured: true,
        },
    }
}

async fn sign_in_as(Path(role): Path<String>, session: Session) -> StatusCode {
    let role = match role.as_str() {
        "admin" => Role::Admin,
        "super-user" => Role::SuperUser,
        _ => Role::User,
    };
    match context_for(role).store(&session).await {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// A router with one page per access rule plus a test-only sign-in route.
fn app() -> Router {
    let page = |name: &'static str| get(move || async move { name });
    Router::new()
        .route("/test/sign-in/:role", get(sign_in_as))
        .merge(
            Router::new()
                .route("/admin", page("admin"))
                .route_layer(from_fn_with_state(ADMIN_PAGES, role_gate)),
        )
        .merge(
            Router::new()
                .route("/user", page("user"))
                .route_layer(from_fn_with_state(USER_PAGES, role_gate)),
        )
        .merge(
            Router::new()
                .route("/students", page("students"))
                .route_layer(from_fn_with_state(STAFF_PAGES, role_gate)),
        )
        .merge(
            Router::new()
                .route("/profile", page("profile"))
                .route_layer(from_fn_with_state(ANY_SIGNED_IN, role_gate)),
        )
        .layer(SessionManagerLayer::new(MemoryStore::default()))
}

async fn session_cookie(app: &Router, role: &str) -> String {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/test/sign-in/{}", role))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    cookie.split(';').next().unwrap().to_string()
}

async fn visit(app: &Router, uri: &str, cookie: &str) -> axum::response::Response {
    app.clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn user_opening_an_admin_page_lands_on_their_dashboard() {
    let app = app();
    let cookie = session_cookie(&app, "user").await;

    let response = visit(&app, "/admin", &cookie).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/dashboard/user");
}

#[tokio::test]
async fn admin_opens_admin_and_staff_pages() {
    let app = app();
    let cookie = session_cookie(&app, "admin").await;

    for uri in ["/admin", "/students", "/profile"] {
        let response = visit(&app, uri, &cookie).await;
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
    }

    let response = visit(&app, "/user", &cookie).await;
    assert_eq!(response.headers()[header::LOCATION], "/dashboard/admin");
}

#[tokio::test]
async fn super_user_shares_staff_pages_only() {
    let app = app();
    let cookie = session_cookie(&app, "super-user").await;

    assert_eq!(visit(&app, "/students", &cookie).await.status(), StatusCode::OK);

    let response = visit(&app, "/admin", &cookie).await;
    assert_eq!(response.headers()[header::LOCATION], "/dashboard/super-user");
}

#[test]
fn decisions_depend_only_on_role_and_rule() {
    assert_eq!(ADMIN_PAGES.decide(None), Gate::Redirect("/auth/sign-in"));
    assert_eq!(ADMIN_PAGES.decide(Some(Role::Admin)), Gate::Allow);
    assert_eq!(
        SUPER_USER_PAGES.decide(Some(Role::Admin)),
        Gate::Redirect("/dashboard/admin")
    );
    assert_eq!(ANY_SIGNED_IN.decide(Some(Role::User)), Gate::Allow);
    assert_eq!(landing_route(None), "/auth/sign-in");
}
