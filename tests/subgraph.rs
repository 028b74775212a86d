//! Tests for the subgraph coin type index against a mock GraphQL endpoint.

use std::time::Duration;

use httpmock::{Method::POST, MockServer};
use secrecy::SecretString;
use serde_json::json;

use ens_coin_lookup::domain::{AppError, CoinTypeIndex, Domain, IndexerError};
use ens_coin_lookup::infra::{SubgraphClient, SubgraphConfig};
use ens_coin_lookup::infra::subgraph::COIN_TYPES_QUERY;

fn domain(name: &str) -> Domain {
    Domain::parse(name).unwrap()
}

fn client_for(server: &MockServer) -> SubgraphClient {
    SubgraphClient::with_defaults(&server.base_url()).unwrap()
}

fn domains_body(domains: serde_json::Value) -> serde_json::Value {
    json!({ "data": { "domains": domains } })
}

#[tokio::test]
async fn test_coin_types_in_indexer_order() {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/")
                .header("content-type", "application/json")
                .json_body(json!({
                    "query": COIN_TYPES_QUERY,
                    "variables": { "name": "brantly.eth" }
                }));
            then.status(200).json_body(domains_body(json!([
                { "resolver": { "coinTypes": ["60", "0", "2", "3"] } }
            ])));
        })
        .await;

    let client = client_for(&server);
    let coins = client.coin_types(&domain("brantly.eth")).await.unwrap();

    mock.assert_async().await;
    assert_eq!(coins, vec!["60", "0", "2", "3"]);
}

#[tokio::test]
async fn test_only_first_record_is_used() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/");
            then.status(200).json_body(domains_body(json!([
                { "resolver": { "coinTypes": ["60"] } },
                { "resolver": { "coinTypes": ["0", "2"] } }
            ])));
        })
        .await;

    let coins = client_for(&server)
        .coin_types(&domain("a.eth"))
        .await
        .unwrap();
    assert_eq!(coins, vec!["60"]);
}

#[tokio::test]
async fn test_empty_domains_is_not_indexed() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/");
            then.status(200).json_body(domains_body(json!([])));
        })
        .await;

    let err = client_for(&server)
        .coin_types(&domain("fresh.eth"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::Indexer(IndexerError::DomainNotIndexed(name)) if name == "fresh.eth"
    ));
}

#[tokio::test]
async fn test_null_resolver_and_coin_types_are_empty() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/")
                .json_body_partial(r#"{ "variables": { "name": "noresolver.eth" } }"#);
            then.status(200)
                .json_body(domains_body(json!([{ "resolver": null }])));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/")
                .json_body_partial(r#"{ "variables": { "name": "nocoins.eth" } }"#);
            then.status(200)
                .json_body(domains_body(json!([{ "resolver": { "coinTypes": null } }])));
        })
        .await;

    let client = client_for(&server);
    assert!(client.coin_types(&domain("noresolver.eth")).await.unwrap().is_empty());
    assert!(client.coin_types(&domain("nocoins.eth")).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_query_metacharacters_travel_as_variables() {
    let server = MockServer::start_async().await;
    let hostile = r#"x"}) { id } domains(where: {name: "y.eth"#;

    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/").json_body(json!({
                "query": COIN_TYPES_QUERY,
                "variables": { "name": hostile }
            }));
            then.status(200).json_body(domains_body(json!([])));
        })
        .await;

    let err = client_for(&server)
        .coin_types(&domain(hostile))
        .await
        .unwrap_err();

    // The document is sent untouched and the name arrives verbatim
    mock.assert_async().await;
    assert!(matches!(
        err,
        AppError::Indexer(IndexerError::DomainNotIndexed(name)) if name == hostile
    ));
}

#[tokio::test]
async fn test_graphql_errors_are_query_errors() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/");
            then.status(200).json_body(json!({
                "errors": [
                    { "message": "Unknown field" },
                    { "message": "Store error" }
                ]
            }));
        })
        .await;

    let err = client_for(&server)
        .coin_types(&domain("a.eth"))
        .await
        .unwrap_err();

    match err {
        AppError::Indexer(IndexerError::Query(msg)) => {
            assert!(msg.contains("Unknown field"));
            assert!(msg.contains("Store error"));
        }
        other => panic!("expected query error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_data_is_malformed() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/");
            then.status(200).json_body(json!({}));
        })
        .await;

    let err = client_for(&server)
        .coin_types(&domain("a.eth"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Indexer(IndexerError::Malformed(_))));
}

#[tokio::test]
async fn test_non_json_body_is_malformed() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/");
            then.status(200).body("<html>gateway</html>");
        })
        .await;

    let err = client_for(&server)
        .coin_types(&domain("a.eth"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Indexer(IndexerError::Malformed(_))));
}

#[tokio::test]
async fn test_server_error_is_unavailable() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/");
            then.status(500).body("internal error");
        })
        .await;

    let err = client_for(&server)
        .coin_types(&domain("a.eth"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Indexer(IndexerError::Unavailable(500))));
}

#[tokio::test]
async fn test_too_many_requests_is_rate_limited() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/");
            then.status(429);
        })
        .await;

    let err = client_for(&server)
        .coin_types(&domain("a.eth"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Indexer(IndexerError::RateLimited)));
}

#[tokio::test]
async fn test_api_key_is_sent_as_bearer_token() {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/")
                .header("authorization", "Bearer gateway-key");
            then.status(200).json_body(domains_body(json!([
                { "resolver": { "coinTypes": ["60"] } }
            ])));
        })
        .await;

    let config = SubgraphConfig {
        api_key: Some(SecretString::from("gateway-key")),
        ..SubgraphConfig::default()
    };
    let client = SubgraphClient::new(&server.base_url(), config).unwrap();
    let coins = client.coin_types(&domain("a.eth")).await.unwrap();

    mock.assert_async().await;
    assert_eq!(coins, vec!["60"]);
}

#[tokio::test]
async fn test_no_authorization_header_without_key() {
    let server = MockServer::start_async().await;

    let authed = server
        .mock_async(|when, then| {
            when.method(POST).path("/").header_exists("authorization");
            then.status(401);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/");
            then.status(200).json_body(domains_body(json!([
                { "resolver": { "coinTypes": [] } }
            ])));
        })
        .await;

    let coins = client_for(&server)
        .coin_types(&domain("a.eth"))
        .await
        .unwrap();

    assert!(coins.is_empty());
    assert_eq!(authed.hits_async().await, 0);
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    let client = SubgraphClient::with_defaults("http://127.0.0.1:1").unwrap();
    let err = client.coin_types(&domain("a.eth")).await.unwrap_err();

    assert!(matches!(err, AppError::Indexer(IndexerError::Transport(_))));
}

#[tokio::test]
async fn test_slow_endpoint_times_out() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/");
            then.status(200)
                .json_body(domains_body(json!([])))
                .delay(Duration::from_secs(2));
        })
        .await;

    let config = SubgraphConfig {
        timeout: Duration::from_millis(200),
        connect_timeout: Duration::from_millis(200),
        api_key: None,
    };
    let client = SubgraphClient::new(&server.base_url(), config).unwrap();
    let err = client.coin_types(&domain("a.eth")).await.unwrap_err();

    assert!(matches!(err, AppError::Indexer(IndexerError::Timeout(_))));
}

#[tokio::test]
async fn test_health_check_reads_meta_block() {
    let server = MockServer::start_async().await;

    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/").body_contains("_meta");
            then.status(200)
                .json_body(json!({ "data": { "_meta": { "block": { "number": 19000000 } } } }));
        })
        .await;

    assert!(client_for(&server).health_check().await.is_ok());
    mock.assert_async().await;
}
