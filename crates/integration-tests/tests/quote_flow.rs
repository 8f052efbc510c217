//! Integration tests for the quote cart and quote request lifecycle.

use std::time::Duration;

use preforma_integration_tests::{TestApp, json_body};
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

fn valid_form() -> Value {
    json!({
        "company": "Envases del Sur",
        "estimated_volume": "50.000 unidades/mes",
        "city": "Arequipa",
        "email": "compras@envasesdelsur.pe",
        "phone": "+51 954 000 111",
    })
}

async fn add(app: &TestApp, client: &Client, product_id: &str, quantity: Option<i64>) -> Value {
    let resp = client
        .post(app.url("/quote/items"))
        .json(&json!({ "product_id": product_id, "quantity": quantity }))
        .send()
        .await
        .expect("Failed to add item");
    json_body(resp, StatusCode::OK).await
}

async fn cart(app: &TestApp, client: &Client) -> Value {
    let resp = client
        .get(app.url("/quote"))
        .send()
        .await
        .expect("Failed to get cart");
    json_body(resp, StatusCode::OK).await
}

#[tokio::test]
async fn test_new_visitor_has_empty_closed_cart() {
    let app = TestApp::spawn().await;
    let body = cart(&app, &app.visitor()).await;
    assert_eq!(body["items"], json!([]));
    assert_eq!(body["total_items"], 0);
    assert_eq!(body["is_open"], false);
    assert_eq!(body["submission"]["state"], "closed");
}

#[tokio::test]
async fn test_adding_merges_lines_and_opens_panel() {
    let app = TestApp::spawn().await;
    let client = app.visitor();

    add(&app, &client, "pf-002", None).await;
    add(&app, &client, "pf-003", Some(5)).await;
    let body = add(&app, &client, "pf-002", Some(2)).await;

    assert_eq!(body["line_count"], 2);
    assert_eq!(body["total_items"], 8);
    assert_eq!(body["is_open"], true);
    assert_eq!(body["items"][0]["product"]["id"], "pf-002");
    assert_eq!(body["items"][0]["quantity"], 3);
}

#[tokio::test]
async fn test_carts_are_per_visitor() {
    let app = TestApp::spawn().await;
    let first = app.visitor();
    let second = app.visitor();

    add(&app, &first, "pf-001", Some(4)).await;

    assert_eq!(cart(&app, &first).await["total_items"], 4);
    assert_eq!(cart(&app, &second).await["total_items"], 0);
}

#[tokio::test]
async fn test_add_rejects_unknown_product_and_bad_quantity() {
    let app = TestApp::spawn().await;
    let client = app.visitor();

    let resp = client
        .post(app.url("/quote/items"))
        .json(&json!({ "product_id": "pf-999" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = client
        .post(app.url("/quote/items"))
        .json(&json!({ "product_id": "pf-001", "quantity": 0 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_to_zero_removes_line() {
    let app = TestApp::spawn().await;
    let client = app.visitor();
    add(&app, &client, "pf-001", None).await;
    add(&app, &client, "pf-004", None).await;

    let resp = client
        .post(app.url("/quote/items/pf-001"))
        .json(&json!({ "quantity": 7 }))
        .send()
        .await
        .expect("Failed to update quantity");
    let body = json_body(resp, StatusCode::OK).await;
    assert_eq!(body["total_items"], 8);

    let resp = client
        .post(app.url("/quote/items/pf-001"))
        .json(&json!({ "quantity": 0 }))
        .send()
        .await
        .expect("Failed to update quantity");
    let body = json_body(resp, StatusCode::OK).await;
    assert_eq!(body["line_count"], 1);
    assert_eq!(body["items"][0]["product"]["id"], "pf-004");

    let resp = client
        .delete(app.url("/quote/items/pf-004"))
        .send()
        .await
        .expect("Failed to remove item");
    let body = json_body(resp, StatusCode::OK).await;
    assert_eq!(body["line_count"], 0);
}

#[tokio::test]
async fn test_panel_open_close_and_clear() {
    let app = TestApp::spawn().await;
    let client = app.visitor();
    add(&app, &client, "pf-001", None).await;

    let resp = client
        .post(app.url("/quote/close"))
        .send()
        .await
        .expect("Failed to close panel");
    assert_eq!(json_body(resp, StatusCode::OK).await["is_open"], false);

    let resp = client
        .post(app.url("/quote/open"))
        .send()
        .await
        .expect("Failed to open panel");
    assert_eq!(json_body(resp, StatusCode::OK).await["is_open"], true);

    let resp = client
        .post(app.url("/quote/clear"))
        .send()
        .await
        .expect("Failed to clear cart");
    assert_eq!(json_body(resp, StatusCode::OK).await["total_items"], 0);
}

#[tokio::test]
async fn test_empty_cart_cannot_be_submitted() {
    let app = TestApp::spawn().await;
    let resp = app
        .visitor()
        .post(app.url("/quote/request"))
        .json(&valid_form())
        .send()
        .await
        .expect("Failed to submit quote");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_incomplete_form_reports_fields() {
    let app = TestApp::spawn().await;
    let client = app.visitor();
    add(&app, &client, "pf-002", None).await;

    let resp = client
        .post(app.url("/quote/request"))
        .json(&json!({ "company": "Envases del Sur", "email": "compras@envasesdelsur.pe" }))
        .send()
        .await
        .expect("Failed to submit quote");
    let body = json_body(resp, StatusCode::UNPROCESSABLE_ENTITY).await;
    assert_eq!(body["fields"], json!(["estimated_volume", "city", "phone"]));

    let mut form = valid_form();
    form["email"] = json!("not-an-email");
    let resp = client
        .post(app.url("/quote/request"))
        .json(&form)
        .send()
        .await
        .expect("Failed to submit quote");
    let body = json_body(resp, StatusCode::UNPROCESSABLE_ENTITY).await;
    assert_eq!(body["fields"], json!(["email"]));

    // Nothing was sent, so the cart is untouched
    assert_eq!(cart(&app, &client).await["total_items"], 1);
}

#[tokio::test]
async fn test_sent_quote_clears_cart_after_delay() {
    let app = TestApp::spawn().await;
    let client = app.visitor();
    add(&app, &client, "pf-002", Some(3)).await;

    let resp = client
        .post(app.url("/quote/request/open"))
        .send()
        .await
        .expect("Failed to open form");
    assert_eq!(
        json_body(resp, StatusCode::OK).await["submission"]["state"],
        "editing"
    );

    let resp = client
        .post(app.url("/quote/request"))
        .json(&valid_form())
        .send()
        .await
        .expect("Failed to submit quote");
    let body = json_body(resp, StatusCode::ACCEPTED).await;
    assert_eq!(body["submission"]["state"], "submitted");
    assert_eq!(body["total_items"], 3);

    // Zero delay: the next interaction completes the submission
    let body = cart(&app, &client).await;
    assert_eq!(body["total_items"], 0);
    assert_eq!(body["is_open"], false);
    assert_eq!(body["submission"]["state"], "closed");
}

#[tokio::test]
async fn test_pending_quote_keeps_cart_until_closed() {
    let app = TestApp::spawn_with_delay(Duration::from_secs(3600)).await;
    let client = app.visitor();
    add(&app, &client, "pf-003", None).await;

    let resp = client
        .post(app.url("/quote/request"))
        .json(&valid_form())
        .send()
        .await
        .expect("Failed to submit quote");
    assert_eq!(resp.status(), StatusCode::ACCEPTED);

    let body = cart(&app, &client).await;
    assert_eq!(body["total_items"], 1);
    assert_eq!(body["submission"]["state"], "submitted");

    let resp = client
        .post(app.url("/quote/request"))
        .json(&valid_form())
        .send()
        .await
        .expect("Failed to resubmit quote");
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = client
        .post(app.url("/quote/request/close"))
        .send()
        .await
        .expect("Failed to close form");
    let body = json_body(resp, StatusCode::OK).await;
    assert_eq!(body["total_items"], 0);
    assert_eq!(body["submission"]["state"], "closed");
}
