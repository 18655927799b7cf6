use axum::{
    extract::MatchedPath,
    http::header::{HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, ORIGIN},
    http::{HeaderName, Method, Request, Response},
    routing::get,
    Router,
};
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    normalize_path::NormalizePathLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{MakeSpan, OnResponse, TraceLayer},
};
use tracing::Span;

use crate::api::{admin, handlers, results, sessions};
use crate::core::{config::Settings, state::AppState};

const REQUEST_ID_HEADER: &str = "x-request-id";

pub(crate) fn router(state: AppState) -> Router {
    let cors = build_cors_layer(state.settings());
    let api_v1_prefix = state.settings().api().api_v1_str.clone();
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);

    let mut router: Router<AppState> = Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz).head(handlers::healthz))
        .nest(&api_v1_prefix, api_v1_routes())
        .layer(NormalizePathLayer::trim_trailing_slash())
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(TraceLayer::new_for_http().make_span_with(RequestSpan).on_response(ResponseMetrics))
        .layer(cors);

    if state.settings().telemetry().prometheus_enabled {
        router = router.route("/metrics", get(handlers::metrics));
    }

    router.with_state(state)
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .nest("/admin", admin::router())
        .nest("/sessions", sessions::router())
        .nest("/results", results::router())
}

/// Opens the request span; the route template keeps session ids out of the
/// span name so logs group by endpoint.
#[derive(Clone, Copy)]
struct RequestSpan;

impl<B> MakeSpan<B> for RequestSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        let request_id = request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("-");
        let route = request
            .extensions()
            .get::<MatchedPath>()
            .map(MatchedPath::as_str)
            .unwrap_or("unmatched");

        tracing::info_span!(
            "request",
            method = %request.method(),
            route = %route,
            uri = %request.uri(),
            request_id = %request_id
        )
    }
}

#[derive(Clone, Copy)]
struct ResponseMetrics;

impl<B> OnResponse<B> for ResponseMetrics {
    fn on_response(self, response: &Response<B>, latency: Duration, _span: &Span) {
        let status_label = response.status().as_u16().to_string();
        tracing::debug!(status = %status_label, latency_ms = latency.as_millis() as u64, "response sent");
        metrics::counter!("http_requests_total", "status" => status_label.clone()).increment(1);
        metrics::histogram!("http_request_duration_seconds", "status" => status_label)
            .record(latency.as_secs_f64());
    }
}

fn build_cors_layer(settings: &Settings) -> CorsLayer {
    let origins = settings
        .cors()
        .origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect::<Vec<_>>();

    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::HEAD, Method::OPTIONS])
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            ACCEPT,
            ORIGIN,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
        .max_age(Duration::from_secs(3600));

    if origins.is_empty() {
        // Wildcard origin cannot be combined with allow_credentials
        base.allow_origin(Any)
    } else {
        base.allow_credentials(true).allow_origin(AllowOrigin::list(origins))
    }
}
