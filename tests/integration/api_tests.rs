//! API integration tests against a running server
//!
//! Start the server on localhost:8080, then run with: cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Unique suffix so repeated runs do not collide on book/card identity
fn unique(label: &str) -> String {
    format!("{} {}", label, chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default())
}

async fn create_book(client: &Client, title: &str, stock: i32) -> i64 {
    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "category": "Testing",
            "title": title,
            "press": "Smoke Press",
            "publish_year": 2024,
            "author": "Tester",
            "price": 12.5,
            "stock": stock
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["payload"].as_i64().expect("No book id in response")
}

async fn create_card(client: &Client, name: &str) -> i64 {
    let response = client
        .post(format!("{}/cards", BASE_URL))
        .json(&json!({
            "name": name,
            "department": "QA",
            "type": "S"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    body["payload"].as_i64().expect("No card id in response")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_readiness_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
#[ignore]
async fn test_duplicate_book_is_conflict() {
    let client = Client::new();
    let title = unique("Duplicate");

    create_book(&client, &title, 1).await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .json(&json!({
            "category": "Testing",
            "title": title,
            "press": "Smoke Press",
            "publish_year": 2024,
            "author": "Tester",
            "price": 12.5
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["ok"], false);
}

#[tokio::test]
#[ignore]
async fn test_query_books_by_title() {
    let client = Client::new();
    let title = unique("Queried");
    let id = create_book(&client, &title, 2).await;

    let response = client
        .get(format!("{}/books", BASE_URL))
        .query(&[("title", title.as_str()), ("sort_by", "price"), ("sort_order", "desc")])
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["ok"], true);
    assert_eq!(body["payload"]["count"], 1);
    assert_eq!(body["payload"]["results"][0]["book_id"], id);
}

#[tokio::test]
#[ignore]
async fn test_negative_stock_is_rejected() {
    let client = Client::new();
    let id = create_book(&client, &unique("Stock"), 1).await;

    let response = client
        .post(format!("{}/books/{}/stock", BASE_URL, id))
        .json(&json!({ "delta": -2 }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 422);
}

#[tokio::test]
#[ignore]
async fn test_borrow_and_return_flow() {
    let client = Client::new();
    let book_id = create_book(&client, &unique("Borrowed"), 1).await;
    let card_id = create_card(&client, &unique("Reader")).await;

    let response = client
        .post(format!("{}/borrows", BASE_URL))
        .json(&json!({ "card_id": card_id, "book_id": book_id, "borrow_time": 1000 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let response = client
        .post(format!("{}/borrows", BASE_URL))
        .json(&json!({ "card_id": card_id, "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 409);

    let response = client
        .post(format!("{}/borrows/return", BASE_URL))
        .json(&json!({ "card_id": card_id, "book_id": book_id, "return_time": 500 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 422);

    let response = client
        .post(format!("{}/borrows/return", BASE_URL))
        .json(&json!({ "card_id": card_id, "book_id": book_id }))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());

    let response = client
        .get(format!("{}/cards/{}/borrows", BASE_URL, card_id))
        .send()
        .await
        .expect("Failed to send request");
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["payload"]["count"], 1);
    assert_eq!(body["payload"]["items"][0]["borrow_time"], 1000);
}

#[tokio::test]
#[ignore]
async fn test_get_unknown_book_is_not_found() {
    let client = Client::new();

    let response = client
        .get(format!("{}/books/{}", BASE_URL, i32::MAX))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 404);
}
