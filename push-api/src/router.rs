use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::{app_state::AppState, routes};

pub fn create(app_state: AppState, app_url: &str) -> Router<()> {
    let base_app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest("/notifications", routes::notifications::router());

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([axum::http::header::CONTENT_TYPE])
        .allow_origin(allowed_origin(app_url));

    base_app
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
}

fn allowed_origin(app_url: &str) -> AllowOrigin {
    match HeaderValue::from_str(app_url.trim_end_matches('/')) {
        Ok(origin) => AllowOrigin::exact(origin),
        Err(_) => {
            tracing::warn!("app_url '{}' is not a valid origin, CORS disabled", app_url);
            AllowOrigin::list(Vec::<HeaderValue>::new())
        }
    }
}
