//! Cross-cutting HTTP layers: request logging, security headers and CORS.

use axum::extract::{MatchedPath, Request};
use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::middleware::{from_fn, Next};
use axum::response::Response;
use axum::Router;
use log::{info, warn};
use notekeeper_core::CORS_ANY_ORIGIN;
use std::time::{Duration, Instant};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use uuid::Uuid;

use crate::handlers::TOTAL_COUNT_HEADER;

pub const REQUEST_ID_HEADER: &str = "x-request-id";
const CORS_MAX_AGE: Duration = Duration::from_secs(600);

const SECURITY_HEADERS: [(&str, &str); 4] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("x-xss-protection", "1; mode=block"),
    ("referrer-policy", "strict-origin-when-cross-origin"),
];

/// Wraps `router` with every cross-cutting layer.
pub fn apply(router: Router, cors_origins: &[String]) -> Router {
    let mut router = router.layer(from_fn(log_requests));
    for (name, value) in SECURITY_HEADERS {
        router = router.layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        ));
    }
    router.layer(cors_layer(cors_origins))
}

/// Logs request start and completion with a request id.
///
/// The id is taken from `x-request-id` when present, otherwise generated,
/// and echoed on the response.
pub async fn log_requests(req: Request, next: Next) -> Response {
    let started_at = Instant::now();

    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(short_request_id);
    let method = req.method().clone();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    info!(
        "event=http_request module=api status=start request_id={} method={} path={}",
        request_id, method, path
    );

    let mut response = next.run(req).await;
    let status = response.status();
    let duration_ms = started_at.elapsed().as_millis();

    if status.is_server_error() {
        warn!(
            "event=http_request module=api status=error request_id={} method={} path={} http_status={} duration_ms={}",
            request_id,
            method,
            path,
            status.as_u16(),
            duration_ms
        );
    } else {
        info!(
            "event=http_request module=api status=ok request_id={} method={} path={} http_status={} duration_ms={}",
            request_id,
            method,
            path,
            status.as_u16(),
            duration_ms
        );
    }

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
    response
}

fn short_request_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// Builds the CORS policy for the configured origins.
///
/// A `*` entry allows any origin without credentials; otherwise only the
/// listed origins are allowed, with credentials.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ACCEPT,
            header::ACCEPT_LANGUAGE,
            header::CONTENT_LANGUAGE,
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
        ])
        .expose_headers([HeaderName::from_static(TOTAL_COUNT_HEADER)])
        .max_age(CORS_MAX_AGE);

    if origins.iter().any(|origin| origin == CORS_ANY_ORIGIN) {
        info!("event=cors_config module=api status=ok origins=* credentials=false");
        return layer.allow_origin(AllowOrigin::any());
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("event=cors_config module=api status=skipped origin={origin}");
                None
            }
        })
        .collect();
    info!(
        "event=cors_config module=api status=ok origins={} credentials=true",
        origins.join(",")
    );

    layer
        .allow_origin(AllowOrigin::list(allowed))
        .allow_credentials(true)
}
