use crate::api::rate_limit::ClientIpExtractor;
use crate::config::Config;
use crate::services::submission_service::SubmissionService;
use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, HeaderValue, Request, header};
use axum::{
    Router,
    routing::{MethodRouter, get, post},
};
use std::sync::Arc;
use tower_governor::GovernorLayer;
use tower_governor::governor::GovernorConfigBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

pub mod contact;
pub mod health;
pub mod rate_limit;
pub mod schemas;

const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone, Debug)]
pub struct AppState {
    pub submission_service: SubmissionService,
}

/// Configures and returns the application router.
///
/// # Panics
/// Panics if the rate limiter configuration cannot be constructed.
pub fn app_router(config: &Config, submission_service: SubmissionService) -> Router {
    let interval_ns = 1_000_000_000 / config.rate_limit.per_second.max(1);
    let contact_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_nanosecond(u64::from(interval_ns))
            .burst_size(config.rate_limit.burst.max(1))
            .key_extractor(ClientIpExtractor::new(config.server.trusted_proxies.clone()))
            .finish()
            .expect("Failed to build contact rate limiter config"),
    );

    let state = AppState { submission_service };

    let contact_routes = Router::new()
        .route("/contact", contact_method_router())
        .route("/contact-handler", contact_method_router())
        .layer(GovernorLayer::new(contact_conf))
        .layer(SetResponseHeaderLayer::overriding(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*")))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("POST, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ))
        .layer(DefaultBodyLimit::max(config.server.max_body_bytes));

    Router::new()
        .route("/health", get(health::health))
        .merge(contact_routes)
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(REQUEST_ID_HEADER)))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(move |request: &Request<Body>| {
                    let request_id = request
                        .extensions()
                        .get::<tower_http::request_id::RequestId>()
                        .map(|id| id.header_value().to_str().unwrap_or_default())
                        .unwrap_or_default()
                        .to_string();

                    tracing::info_span!(
                        "request",
                        "request_id" = %request_id,
                        "http.request.method" = %request.method(),
                        "url.path" = %request.uri().path(),
                        "http.response.status_code" = tracing::field::Empty,
                        "otel.kind" = "server",
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: std::time::Duration, _span: &tracing::Span| {
                        let status = response.status();
                        tracing::Span::current().record("http.response.status_code", status.as_u16());

                        tracing::info!(
                            latency_ms = %latency.as_millis(),
                            status = %status.as_u16(),
                            "request completed"
                        );
                    },
                )
                .on_failure(|error, _latency, _span: &tracing::Span| {
                    tracing::error!(error = %error, "request failed");
                }),
        )
        .layer(SetRequestIdLayer::new(HeaderName::from_static(REQUEST_ID_HEADER), MakeRequestUuid))
        .with_state(state)
}

fn contact_method_router() -> MethodRouter<AppState> {
    post(contact::submit).options(contact::preflight).fallback(contact::method_not_allowed)
}
