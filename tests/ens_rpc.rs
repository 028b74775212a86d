//! Tests for the JSON-RPC backed ENS resolver against a mock node.

use std::time::Duration;

use alloy_primitives::Address;
use httpmock::{Method::POST, MockServer};
use serde_json::json;

use ens_coin_lookup::domain::{AppError, Domain, NameResolver, ResolutionError, checksummed};
use ens_coin_lookup::infra::{ENS_REGISTRY_ADDRESS, RpcClientConfig, RpcEnsResolver};

/// `resolver(bytes32)` selector
const RESOLVER_CALL: &str = "0x0178b8bf";
/// `addr(bytes32)` selector
const ADDR_CALL: &str = "0x3b3b57de";
/// Resolver contract 0x2222..2222, ABI-encoded as a 32-byte word
const RESOLVER_WORD: &str = "0x0000000000000000000000002222222222222222222222222222222222222222";
const BRANTLY_WORD: &str = "0x000000000000000000000000983110309620d911731ac0932219af06091b6744";
const ZERO_WORD: &str = "0x0000000000000000000000000000000000000000000000000000000000000000";

fn domain(name: &str) -> Domain {
    Domain::parse(name).unwrap()
}

fn rpc_result(result: &str) -> serde_json::Value {
    json!({ "jsonrpc": "2.0", "id": 1, "result": result })
}

fn resolver_for(server: &MockServer) -> RpcEnsResolver {
    RpcEnsResolver::with_defaults(&server.base_url()).unwrap()
}

#[tokio::test]
async fn test_resolve_known_domain_returns_checksummed_address() {
    let server = MockServer::start_async().await;

    let registry_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/")
                .body_contains("eth_call")
                .body_contains(RESOLVER_CALL);
            then.status(200).json_body(rpc_result(RESOLVER_WORD));
        })
        .await;
    let addr_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/")
                .body_contains("eth_call")
                .body_contains(ADDR_CALL);
            then.status(200).json_body(rpc_result(BRANTLY_WORD));
        })
        .await;

    let resolver = resolver_for(&server);
    let address = resolver.resolve_address(&domain("brantly.eth")).await.unwrap();

    registry_mock.assert_async().await;
    addr_mock.assert_async().await;
    assert_eq!(
        checksummed(&address),
        "0x983110309620D911731Ac0932219af06091b6744"
    );
}

#[tokio::test]
async fn test_registry_call_targets_registry_with_latest_block() {
    let server = MockServer::start_async().await;

    let registry_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/")
                .body_contains(RESOLVER_CALL)
                .body_contains("\"latest\"");
            then.status(200).json_body(rpc_result(ZERO_WORD));
        })
        .await;

    let resolver = resolver_for(&server);
    let found = resolver.resolver_of(&domain("brantly.eth")).await.unwrap();

    registry_mock.assert_async().await;
    assert!(found.is_none());
    assert_eq!(resolver.registry(), ENS_REGISTRY_ADDRESS);
}

#[tokio::test]
async fn test_zero_resolver_is_no_resolver() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/").body_contains(RESOLVER_CALL);
            then.status(200).json_body(rpc_result(ZERO_WORD));
        })
        .await;
    let addr_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/").body_contains(ADDR_CALL);
            then.status(200).json_body(rpc_result(BRANTLY_WORD));
        })
        .await;

    let resolver = resolver_for(&server);
    let err = resolver
        .resolve_address(&domain("unregistered-name.eth"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Resolution(ResolutionError::NoResolver(name)) if name == "unregistered-name.eth"
    ));
    assert_eq!(addr_mock.hits_async().await, 0);
}

#[tokio::test]
async fn test_empty_registry_result_is_no_resolver() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/");
            then.status(200).json_body(rpc_result("0x"));
        })
        .await;

    let resolver = resolver_for(&server);
    let err = resolver.resolve_address(&domain("a.eth")).await.unwrap_err();

    assert!(matches!(
        err,
        AppError::Resolution(ResolutionError::NoResolver(_))
    ));
}

#[tokio::test]
async fn test_zero_address_record_is_no_address() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/").body_contains(RESOLVER_CALL);
            then.status(200).json_body(rpc_result(RESOLVER_WORD));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/").body_contains(ADDR_CALL);
            then.status(200).json_body(rpc_result(ZERO_WORD));
        })
        .await;

    let resolver = resolver_for(&server);
    let err = resolver.resolve_address(&domain("empty.eth")).await.unwrap_err();

    assert!(matches!(
        err,
        AppError::Resolution(ResolutionError::NoAddress(name)) if name == "empty.eth"
    ));
}

#[tokio::test]
async fn test_addr_call_is_sent_to_resolver_contract() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/").body_contains(RESOLVER_CALL);
            then.status(200).json_body(rpc_result(RESOLVER_WORD));
        })
        .await;
    let addr_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/")
                .body_contains(ADDR_CALL)
                .body_contains("2222222222222222222222222222222222222222");
            then.status(200).json_body(rpc_result(BRANTLY_WORD));
        })
        .await;

    let resolver = resolver_for(&server);
    let address = resolver.resolve_address(&domain("brantly.eth")).await.unwrap();

    addr_mock.assert_async().await;
    assert_eq!(
        address,
        "0x983110309620D911731Ac0932219af06091b6744"
            .parse::<Address>()
            .unwrap()
    );
}

#[tokio::test]
async fn test_json_rpc_error_is_surfaced() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/");
            then.status(200).json_body(json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": { "code": -32000, "message": "execution reverted" }
            }));
        })
        .await;

    let resolver = resolver_for(&server);
    let err = resolver.resolve_address(&domain("a.eth")).await.unwrap_err();

    match err {
        AppError::Resolution(ResolutionError::Rpc(msg)) => {
            assert!(msg.contains("-32000"));
            assert!(msg.contains("execution reverted"));
        }
        other => panic!("expected RPC error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_http_error_status_is_rpc_error() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/");
            then.status(503).body("unavailable");
        })
        .await;

    let resolver = resolver_for(&server);
    let err = resolver.resolve_address(&domain("a.eth")).await.unwrap_err();

    assert!(matches!(err, AppError::Resolution(ResolutionError::Rpc(msg)) if msg.contains("503")));
}

#[tokio::test]
async fn test_short_result_is_invalid_response() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/");
            then.status(200).json_body(rpc_result("0x1234"));
        })
        .await;

    let resolver = resolver_for(&server);
    let err = resolver.resolve_address(&domain("a.eth")).await.unwrap_err();

    assert!(matches!(
        err,
        AppError::Resolution(ResolutionError::InvalidResponse(_))
    ));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_connection_error() {
    let resolver = RpcEnsResolver::with_defaults("http://127.0.0.1:1").unwrap();
    let err = resolver.resolve_address(&domain("a.eth")).await.unwrap_err();

    assert!(matches!(
        err,
        AppError::Resolution(ResolutionError::Connection(_))
    ));
}

#[tokio::test]
async fn test_slow_endpoint_times_out() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/");
            then.status(200)
                .json_body(rpc_result(ZERO_WORD))
                .delay(Duration::from_secs(2));
        })
        .await;

    let config = RpcClientConfig {
        timeout: Duration::from_millis(200),
        connect_timeout: Duration::from_millis(200),
        ..RpcClientConfig::default()
    };
    let resolver = RpcEnsResolver::new(&server.base_url(), config).unwrap();
    let err = resolver.resolve_address(&domain("a.eth")).await.unwrap_err();

    assert!(matches!(
        err,
        AppError::Resolution(ResolutionError::Timeout(_))
    ));
}

#[tokio::test]
async fn test_health_check_uses_block_number() {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/").body_contains("eth_blockNumber");
            then.status(200).json_body(rpc_result("0x1312d00"));
        })
        .await;

    let resolver = resolver_for(&server);
    assert!(resolver.health_check().await.is_ok());
    mock.assert_async().await;
}
