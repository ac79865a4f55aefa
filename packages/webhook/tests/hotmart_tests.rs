//! Status codes of the Hotmart endpoint

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use quizfunnel_webhook::{router, WebhookState, HOTMART_PATH};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn call(state: &WebhookState, method: Method, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(HOTMART_PATH)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = router(state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn purchase(transaction: &str) -> String {
    json!({
        "id": "delivery-1",
        "event": "PURCHASE_COMPLETE",
        "data": {
            "buyer": { "email": "ana@example.com", "name": "Ana" },
            "product": { "id": "guia-estilo" },
            "purchase": { "transaction": transaction, "price": { "value": 97.0 } }
        }
    })
    .to_string()
}

#[tokio::test]
async fn test_purchase_complete_is_recorded() {
    let state = WebhookState::new();
    let (status, body) = call(&state, Method::POST, &purchase("HP001")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["processed"], true);
    assert_eq!(body["duplicate"], false);

    let purchases = state.purchases().await;
    assert_eq!(purchases.len(), 1);
    assert_eq!(purchases[0].buyer_email, "ana@example.com");
    assert_eq!(purchases[0].product_id, "guia-estilo");
}

#[tokio::test]
async fn test_repeated_delivery_is_not_recorded_twice() {
    let state = WebhookState::new();
    call(&state, Method::POST, &purchase("HP002")).await;
    let (status, body) = call(&state, Method::POST, &purchase("HP002")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["duplicate"], true);
    assert_eq!(state.purchases().await.len(), 1);
}

#[tokio::test]
async fn test_only_recent_purchases_are_kept() {
    let state = WebhookState::with_capacity(2);
    for transaction in ["HP010", "HP011", "HP012"] {
        call(&state, Method::POST, &purchase(transaction)).await;
    }

    let transactions: Vec<String> = state
        .purchases()
        .await
        .into_iter()
        .map(|p| p.transaction)
        .collect();
    assert_eq!(transactions, vec!["HP011", "HP012"]);

    let (_, body) = call(&state, Method::POST, &purchase("HP012")).await;
    assert_eq!(body["duplicate"], true);
    assert_eq!(state.purchases().await.len(), 2);
}

#[tokio::test]
async fn test_bad_purchase_data_is_400() {
    let state = WebhookState::new();
    let body = json!({
        "event": "PURCHASE_COMPLETE",
        "data": { "buyer": { "email": "ana@example.com" } }
    })
    .to_string();

    let (status, body) = call(&state, Method::POST, &body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(state.purchases().await.is_empty());
}

#[tokio::test]
async fn test_other_events_are_acknowledged() {
    let state = WebhookState::new();
    let body = json!({ "event": "PURCHASE_REFUNDED", "data": {} }).to_string();

    let (status, body) = call(&state, Method::POST, &body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["processed"], false);
    assert_eq!(body["event"], "PURCHASE_REFUNDED");
}

#[tokio::test]
async fn test_non_post_is_405() {
    let state = WebhookState::new();
    let (status, _) = call(&state, Method::GET, "").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);

    let (status, _) = call(&state, Method::PUT, &purchase("HP003")).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_unreadable_body_is_500() {
    let state = WebhookState::new();
    let (status, body) = call(&state, Method::POST, "{ not json").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
}
