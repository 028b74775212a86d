//! HTTP routing configuration with rate limiting and OpenAPI documentation.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{HeaderValue, Request, Response, StatusCode},
    middleware::{self, Next},
    response::IntoResponse,
    routing::get,
};
use governor::{Quota, RateLimiter};
use tower::ServiceBuilder;
use tower_http::{
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::app::AppState;
use crate::domain::{ErrorDetail, ErrorResponse, RateLimitResponse};

use super::handlers::{
    address_handler, coin_types_handler, domain_handler, health_check_handler, liveness_handler,
    metrics_handler, openapi_handler, readiness_handler,
};

/// Upstream call timeout assumed by [`create_router`].
const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(30);

/// Slack between the last upstream deadline and the request deadline.
const TIMEOUT_MARGIN: Duration = Duration::from_secs(5);

/// Upper bound on a single request given the per-call upstream timeout.
///
/// Address resolution makes two sequential upstream calls, so the bound
/// covers both plus a margin. An upstream that times out is reported as
/// 504 before this bound answers 408.
#[must_use]
pub fn request_timeout(upstream: Duration) -> Duration {
    upstream.saturating_mul(2).saturating_add(TIMEOUT_MARGIN)
}

/// Rate limiter configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Requests per second for domain endpoints
    pub general_rps: u32,
    /// Burst size for domain endpoints
    pub general_burst: u32,
    /// Requests per second for health and metrics endpoints
    pub health_rps: u32,
    /// Burst size for health and metrics endpoints
    pub health_burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            general_rps: 10,
            general_burst: 20,
            health_rps: 100,
            health_burst: 100,
        }
    }
}

type KeyedLimiter = RateLimiter<
    IpAddr,
    governor::state::keyed::DashMapStateStore<IpAddr>,
    governor::clock::DefaultClock,
>;

/// Shared rate limiter state, keyed by client IP
pub struct RateLimitState {
    domain_limiter: KeyedLimiter,
    health_limiter: KeyedLimiter,
    config: RateLimitConfig,
}

impl RateLimitState {
    pub fn new(config: RateLimitConfig) -> Self {
        let domain_quota = quota(config.general_rps, config.general_burst);
        let health_quota = quota(config.health_rps, config.health_burst);

        Self {
            domain_limiter: RateLimiter::dashmap(domain_quota),
            health_limiter: RateLimiter::dashmap(health_quota),
            config,
        }
    }
}

/// Zero values are clamped to one.
fn quota(rps: u32, burst: u32) -> Quota {
    let rps = NonZeroU32::new(rps).unwrap_or(NonZeroU32::MIN);
    let burst = NonZeroU32::new(burst).unwrap_or(NonZeroU32::MIN);
    Quota::per_second(rps).allow_burst(burst)
}

/// Extract client IP from request (X-Forwarded-For, X-Real-IP, or ConnectInfo).
/// Unknown clients share the 0.0.0.0 bucket.
fn client_ip_from_request<B>(request: &Request<B>) -> IpAddr {
    // Client is first in X-Forwarded-For
    if let Some(ip) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|first| first.trim().parse::<IpAddr>().ok())
    {
        return ip;
    }
    if let Some(ip) = request
        .headers()
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
    {
        return ip;
    }
    if let Some(addr) = request.extensions().get::<SocketAddr>() {
        return addr.ip();
    }
    if let Some(info) = request
        .extensions()
        .get::<axum::extract::ConnectInfo<SocketAddr>>()
    {
        return info.0.ip();
    }
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn retry_after_secs(not_until: &governor::NotUntil<governor::clock::QuantaInstant>) -> u64 {
    let wait_time = not_until.wait_time_from(governor::clock::Clock::now(
        &governor::clock::DefaultClock::default(),
    ));
    // Round up so clients never retry early
    wait_time.as_secs() + u64::from(wait_time.subsec_nanos() > 0)
}

/// Rate limit middleware for domain endpoints
async fn rate_limit_domain_middleware(
    State(rate_limit): State<Arc<RateLimitState>>,
    request: Request<Body>,
    next: Next,
) -> Response<Body> {
    let client_ip = client_ip_from_request(&request);
    let limit = HeaderValue::from(rate_limit.config.general_rps);

    match rate_limit.domain_limiter.check_key(&client_ip) {
        Ok(_) => {
            let mut response = next.run(request).await;
            response.headers_mut().insert("X-RateLimit-Limit", limit);
            response
        }
        Err(not_until) => {
            let retry_after = retry_after_secs(&not_until);
            tracing::debug!(client_ip = %client_ip, retry_after, "Domain request rate limited");

            let body = RateLimitResponse {
                error: ErrorDetail {
                    r#type: "rate_limited".to_string(),
                    message: "Rate limit exceeded. Please slow down your requests.".to_string(),
                },
                retry_after,
            };

            let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
            let headers = response.headers_mut();
            headers.insert("X-RateLimit-Limit", limit);
            headers.insert("X-RateLimit-Remaining", HeaderValue::from_static("0"));
            headers.insert("Retry-After", HeaderValue::from(retry_after));
            response
        }
    }
}

/// Rate limit middleware for health and metrics endpoints
async fn rate_limit_health_middleware(
    State(rate_limit): State<Arc<RateLimitState>>,
    request: Request<Body>,
    next: Next,
) -> Response<Body> {
    let client_ip = client_ip_from_request(&request);
    match rate_limit.health_limiter.check_key(&client_ip) {
        Ok(_) => next.run(request).await,
        Err(not_until) => {
            let retry_after = retry_after_secs(&not_until);

            let body = ErrorResponse {
                error: ErrorDetail {
                    r#type: "rate_limited".to_string(),
                    message: "Rate limit exceeded".to_string(),
                },
            };

            let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
            response
                .headers_mut()
                .insert("Retry-After", HeaderValue::from(retry_after));
            response
        }
    }
}

fn domain_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/{domain}", get(domain_handler))
        .route("/{domain}/address", get(address_handler))
        .route("/{domain}/coins", get(coin_types_handler))
}

fn health_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(health_check_handler))
        .route("/live", get(liveness_handler))
        .route("/ready", get(readiness_handler))
}

fn assemble(
    domain: Router<Arc<AppState>>,
    health: Router<Arc<AppState>>,
    metrics: Router<Arc<AppState>>,
    app_state: Arc<AppState>,
    upstream_timeout: Duration,
) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout(upstream_timeout),
        ));

    Router::new()
        .nest("/domain", domain)
        .nest("/health", health)
        .merge(metrics)
        .route("/api-docs/openapi.json", get(openapi_handler))
        .layer(middleware)
        .with_state(app_state)
}

/// Create router without rate limiting
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let metrics = Router::new().route("/metrics", get(metrics_handler));
    assemble(domain_routes(), health_routes(), metrics, app_state, DEFAULT_UPSTREAM_TIMEOUT)
}

/// Create router with per-IP rate limiting enabled
///
/// `upstream_timeout` is the per-call timeout the resolver and indexer
/// clients were built with.
pub fn create_router_with_rate_limit(
    app_state: Arc<AppState>,
    config: RateLimitConfig,
    upstream_timeout: Duration,
) -> Router {
    let rate_limit_state = Arc::new(RateLimitState::new(config));

    let domain = domain_routes().layer(middleware::from_fn_with_state(
        Arc::clone(&rate_limit_state),
        rate_limit_domain_middleware,
    ));

    let health = health_routes().layer(middleware::from_fn_with_state(
        Arc::clone(&rate_limit_state),
        rate_limit_health_middleware,
    ));

    let metrics = Router::new()
        .route("/metrics", get(metrics_handler))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&rate_limit_state),
            rate_limit_health_middleware,
        ));

    assemble(domain, health, metrics, app_state, upstream_timeout)
}
