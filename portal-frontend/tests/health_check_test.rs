use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use portal_frontend::config::{BackendSettings, SchoolSettings};
use portal_frontend::services::api_client::BackendClient;
use portal_frontend::startup::{build_router, RouterOptions};
use portal_frontend::AppState;
use std::sync::Arc;
use tower::util::ServiceExt;

/// The backend is never reached by these tests; the address is unused.
fn app() -> axum::Router {
    let backend = BackendClient::new(BackendSettings {
        url: "http://127.0.0.1:9".to_string(),
        timeout_ms: 100,
    })
    .expect("client builds");
    let school = SchoolSettings {
        classes: vec!["1".to_string(), "2".to_string()],
        sections: vec!["A".to_string()],
    };
    build_router(AppState::new(Arc::new(backend), school), RouterOptions::default())
}

#[tokio::test]
async fn health_check_works() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"OK");
}

#[tokio::test]
async fn index_sends_visitors_to_sign_in() {
    let response = app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/auth/sign-in");
}

#[tokio::test]
async fn protected_pages_redirect_to_sign_in() {
    for uri in ["/bills/new", "/dashboard/admin", "/students", "/profile"] {
        let response = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", uri);
        assert_eq!(response.headers()[header::LOCATION], "/auth/sign-in", "{}", uri);
    }
}

#[tokio::test]
async fn htmx_requests_get_a_client_side_redirect() {
    let response = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/bills/items")
                .header("HX-Request", "true")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["HX-Redirect"], "/auth/sign-in");
}

#[tokio::test]
async fn unknown_routes_are_not_found() {
    let response = app()
        .oneshot(Request::builder().uri("/nowhere").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn responses_carry_security_headers() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert!(response.headers().contains_key("content-security-policy"));
    assert_eq!(response.headers()["x-frame-options"], "DENY");
}
