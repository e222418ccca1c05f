use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::AppState;

/// Build the application router with all routes
pub fn build(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/health", get(handlers::healthcheck))
        // Auth routes
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/me", get(handlers::auth::me))
        // Event routes
        .route(
            "/events",
            get(handlers::events::list_events).post(handlers::events::create_event),
        )
        .route(
            "/events/:id",
            get(handlers::events::get_event)
                .put(handlers::events::update_event)
                .delete(handlers::events::delete_event),
        )
        // Payment routes
        .route("/events/:id/payments", get(handlers::payments::list_event_payments))
        .route("/payments", get(handlers::payments::list_payments));

    let mut app = Router::new().nest("/api", api);

    // Static files (dashboard)
    if let Some(frontend_dir) = &state.config.frontend_dir {
        app = app
            .nest_service("/assets", ServeDir::new(format!("{}/assets", frontend_dir)))
            .fallback_service(
                ServeDir::new(frontend_dir)
                    .fallback(ServeFile::new(format!("{}/index.html", frontend_dir))),
            );
    }

    let cors = cors_layer(&state.config.cors_allow_origin);

    app.with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

fn cors_layer(allow_origin: &str) -> CorsLayer {
    let origin = match allow_origin.trim() {
        "" | "*" => AllowOrigin::any(),
        origins => AllowOrigin::list(
            origins
                .split(',')
                .filter_map(|o| HeaderValue::from_str(o.trim()).ok()),
        ),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use crate::test_support::TestApp;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_health_is_public() {
        let app = TestApp::new().await;
        let (status, json) = app.send("GET", "/api/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_garbage_token_rejected() {
        let app = TestApp::new().await;
        let (status, json) = app
            .send("GET", "/api/events", Some("not.a.jwt"), None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["success"], false);
        assert_eq!(json["code"], "UNAUTHORIZED");
    }
}
