//! HTTP request handlers with OpenAPI documentation.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use tracing::error;
use utoipa::OpenApi;

use crate::app::AppState;
use crate::domain::{
    AddressResponse, AppError, CoinTypesResponse, Domain, DomainRecord, ErrorDetail,
    ErrorResponse, HealthResponse, HealthStatus, IndexerError, RateLimitResponse,
    ResolutionError,
};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    info(
        title = "ENS Coin Lookup API",
        version = "0.1.0",
        description = "Resolve ENS domains to addresses and list the coin types configured on their resolvers",
        license(
            name = "MIT"
        )
    ),
    paths(
        domain_handler,
        address_handler,
        coin_types_handler,
        health_check_handler,
        liveness_handler,
        readiness_handler,
    ),
    components(
        schemas(
            DomainRecord,
            AddressResponse,
            CoinTypesResponse,
            HealthResponse,
            HealthStatus,
            ErrorResponse,
            ErrorDetail,
            RateLimitResponse,
        )
    ),
    tags(
        (name = "domains", description = "Domain lookup endpoints"),
        (name = "health", description = "Health check endpoints")
    )
)]
pub struct ApiDoc;

/// Resolve a domain's address and list its coin types
#[utoipa::path(
    get,
    path = "/domain/{domain}",
    tag = "domains",
    params(
        ("domain" = String, Path, description = "ENS domain, e.g. brantly.eth")
    ),
    responses(
        (status = 200, description = "Domain resolved", body = DomainRecord),
        (status = 400, description = "Invalid domain", body = ErrorResponse),
        (status = 404, description = "Domain has no resolver, address or index entry", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = RateLimitResponse),
        (status = 502, description = "Upstream failure", body = ErrorResponse),
        (status = 504, description = "Upstream timeout", body = ErrorResponse)
    )
)]
pub async fn domain_handler(
    State(state): State<Arc<AppState>>,
    Path(domain): Path<String>,
) -> Result<Json<DomainRecord>, AppError> {
    let domain = Domain::parse(domain)?;
    let record = state.service.lookup(&domain).await?;
    Ok(Json(record))
}

/// Resolve the address registered for a domain
#[utoipa::path(
    get,
    path = "/domain/{domain}/address",
    tag = "domains",
    params(
        ("domain" = String, Path, description = "ENS domain, e.g. brantly.eth")
    ),
    responses(
        (status = 200, description = "Address resolved", body = AddressResponse),
        (status = 400, description = "Invalid domain", body = ErrorResponse),
        (status = 404, description = "Domain has no resolver or address", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = RateLimitResponse),
        (status = 502, description = "Upstream failure", body = ErrorResponse),
        (status = 504, description = "Upstream timeout", body = ErrorResponse)
    )
)]
pub async fn address_handler(
    State(state): State<Arc<AppState>>,
    Path(domain): Path<String>,
) -> Result<Json<AddressResponse>, AppError> {
    let domain = Domain::parse(domain)?;
    let address = state.service.resolve_address(&domain).await?;
    Ok(Json(AddressResponse::new(&domain, &address)))
}

/// List the coin types configured on a domain's resolver
#[utoipa::path(
    get,
    path = "/domain/{domain}/coins",
    tag = "domains",
    params(
        ("domain" = String, Path, description = "ENS domain, e.g. brantly.eth")
    ),
    responses(
        (status = 200, description = "Coin types listed", body = CoinTypesResponse),
        (status = 400, description = "Invalid domain", body = ErrorResponse),
        (status = 404, description = "Domain not indexed", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = RateLimitResponse),
        (status = 502, description = "Upstream failure", body = ErrorResponse),
        (status = 504, description = "Upstream timeout", body = ErrorResponse)
    )
)]
pub async fn coin_types_handler(
    State(state): State<Arc<AppState>>,
    Path(domain): Path<String>,
) -> Result<Json<CoinTypesResponse>, AppError> {
    let domain = Domain::parse(domain)?;
    let coin_types = state.service.coin_types(&domain).await?;
    Ok(Json(CoinTypesResponse {
        domain: domain.to_string(),
        coin_types,
    }))
}

/// Detailed health check
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Health status", body = HealthResponse)
    )
)]
pub async fn health_check_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let health = state.service.health_check().await;
    Json(health)
}

/// Kubernetes liveness probe
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "health",
    responses(
        (status = 200, description = "Application is alive")
    )
)]
pub async fn liveness_handler() -> StatusCode {
    StatusCode::OK
}

/// Kubernetes readiness probe
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "health",
    responses(
        (status = 200, description = "Application is ready to serve traffic"),
        (status = 503, description = "Application is not ready")
    )
)]
pub async fn readiness_handler(State(state): State<Arc<AppState>>) -> StatusCode {
    let health = state.service.health_check().await;
    match health.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Prometheus scrape endpoint
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// OpenAPI document
pub async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_type, message) = match &self {
            AppError::Resolution(res_err) => match res_err {
                ResolutionError::NoResolver(_) | ResolutionError::NoAddress(_) => {
                    (StatusCode::NOT_FOUND, "not_found", self.to_string())
                }
                ResolutionError::Timeout(_) => {
                    (StatusCode::GATEWAY_TIMEOUT, "timeout", self.to_string())
                }
                _ => (StatusCode::BAD_GATEWAY, "resolver_error", self.to_string()),
            },
            AppError::Indexer(idx_err) => match idx_err {
                IndexerError::DomainNotIndexed(_) => {
                    (StatusCode::NOT_FOUND, "not_found", self.to_string())
                }
                IndexerError::Timeout(_) => {
                    (StatusCode::GATEWAY_TIMEOUT, "timeout", self.to_string())
                }
                IndexerError::RateLimited => (
                    StatusCode::TOO_MANY_REQUESTS,
                    "rate_limited",
                    self.to_string(),
                ),
                _ => (StatusCode::BAD_GATEWAY, "indexer_error", self.to_string()),
            },
            AppError::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "configuration_error",
                self.to_string(),
            ),
            AppError::Validation(_) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                self.to_string(),
            ),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                self.to_string(),
            ),
        };

        if status.is_server_error() {
            error!(error_type = %error_type, message = %message, "Server error");
        }

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                r#type: error_type.to_string(),
                message,
            },
        });

        (status, body).into_response()
    }
}
