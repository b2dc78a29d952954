use std::sync::Arc;

use axum::body::Body;
use http_body_util::BodyExt;
use pretty_assertions::assert_eq;
use r4x_configuration::{Config, Gateway};
use r4x_core::RedisReply;
use r4x_redis::ConnectionRegistry;
use r4x_redis::mock::MockConnector;
use r4x_server::{ServerError, router, run};
use tower::ServiceExt;

fn gateway(listen: &str) -> Gateway {
    let yaml = format!(
        r#"
servers:
  - listen: "{listen}"
    locations:
      - path: "/get/{{key}}"
        command: ["GET", "{{path.key}}"]
"#
    );
    Config::from_yaml(&yaml).unwrap().compile().unwrap()
}

#[tokio::test]
async fn test_router_forwards_every_path_to_redis() {
    let connector = MockConnector::new();
    connector.push_reply(RedisReply::bulk("value"));
    let registry = Arc::new(ConnectionRegistry::new(connector.clone()));
    let mut gateway = gateway("127.0.0.1:0");
    let app = router(registry, gateway.servers.remove(0), gateway.encoder);

    let request = axum::http::Request::builder()
        .uri("/get/mykey")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(body, "value");

    let request = axum::http::Request::builder()
        .uri("/missing")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), axum::http::StatusCode::NOT_FOUND);
    assert_eq!(connector.commands().len(), 1);
}

#[tokio::test]
async fn test_run_stops_on_shutdown() {
    let registry = Arc::new(ConnectionRegistry::new(MockConnector::new()));

    let result = run(gateway("127.0.0.1:0"), registry, async {}).await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_run_fails_when_address_is_taken() {
    let taken = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let listen = taken.local_addr().unwrap();
    let registry = Arc::new(ConnectionRegistry::new(MockConnector::new()));

    let result = run(gateway(&listen.to_string()), registry, async {}).await;

    assert!(matches!(result, Err(ServerError::Bind { listen: addr, .. }) if addr == listen));
}
