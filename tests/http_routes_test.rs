mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{body_json, body_text, doc, location, numbered_orders, TestApp};
use order_board::models::OrderStatus;

#[tokio::test]
async fn board_page_lists_first_six_orders() {
    let app = TestApp::new(numbered_orders(13)).await;

    let response = app.request(Method::GET, "/", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let html = body_text(response).await;
    assert_eq!(html.matches("data-order-id=").count(), 6);
    assert!(html.contains("data-order-id=\"order-06\""));
    assert!(!html.contains("data-order-id=\"order-07\""));
    assert!(html.contains("1–6 of 13"));
}

#[tokio::test]
async fn board_page_honours_page_query() {
    let app = TestApp::new(numbered_orders(13)).await;

    let html = body_text(app.request(Method::GET, "/?page=2", None).await).await;
    assert_eq!(html.matches("data-order-id=").count(), 1);
    assert!(html.contains("13–13 of 13"));
}

#[tokio::test]
async fn empty_store_shows_error_row() {
    let app = TestApp::new(vec![]).await;

    let html = body_text(app.request(Method::GET, "/", None).await).await;
    assert!(html.contains("colspan=\"11\">Failed to fetch orders: No orders found</td>"));
}

#[tokio::test]
async fn status_form_writes_and_redirects() {
    let app = TestApp::new(numbered_orders(8)).await;

    let response = app
        .post_form(
            "/orders/order-07/status",
            &[("status", "กำลังเตรียม"), ("page", "1")],
        )
        .await;
    assert_eq!(location(&response), "/?page=1");
    assert_eq!(
        app.board.order("order-07").await.unwrap().status,
        OrderStatus::Preparing
    );
    assert_eq!(app.store.updates().len(), 1);
}

#[tokio::test]
async fn rejected_status_write_redirects_with_alert() {
    let app = TestApp::new(numbered_orders(1)).await;
    app.store.fail_updates(true);

    let response = app
        .post_form("/orders/order-01/status", &[("status", "กำลังจัดส่ง")])
        .await;
    assert_eq!(location(&response), "/?page=0&alert=status");

    let html = body_text(app.request(Method::GET, "/?page=0&alert=status", None).await).await;
    assert!(html.contains("window.alert(\"Failed to update order status\")"));
}

#[tokio::test]
async fn pending_cannot_be_selected() {
    let app = TestApp::new(numbered_orders(1)).await;

    let response = app
        .post_form("/orders/order-01/status", &[("status", "กำลังดำเนินการ")])
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.store.updates().is_empty());
}

#[tokio::test]
async fn edit_then_save_through_forms() {
    let app = TestApp::new(numbered_orders(2)).await;

    let response = app.post_form("/orders/order-02/edit", &[("page", "0")]).await;
    assert_eq!(location(&response), "/?page=0");
    let html = body_text(app.request(Method::GET, "/", None).await).await;
    assert!(html.contains("action=\"/orders/order-02/save\""));

    let response = app
        .post_form(
            "/orders/order-02/save",
            &[
                ("shipping_provider", "FLASH"),
                ("tracking_number", "FL-778"),
                ("page", "0"),
            ],
        )
        .await;
    assert_eq!(location(&response), "/?page=0");
    assert_eq!(
        app.store.updates()[0].fields,
        json!({"shippingProvider": "FLASH", "trackingNumber": "FL-778"})
    );
    assert_eq!(app.board.editing().await, None);
}

#[tokio::test]
async fn edit_form_reaches_ids_with_reserved_characters() {
    let app = TestApp::new(vec![doc("A#1", json!({"total": 5}))]).await;

    let html = body_text(app.request(Method::GET, "/", None).await).await;
    assert!(html.contains("action=\"/orders/A%231/edit\""));

    let response = app.post_form("/orders/A%231/edit", &[("page", "0")]).await;
    assert_eq!(location(&response), "/?page=0");
    assert_eq!(app.board.editing().await.as_deref(), Some("A#1"));
}

#[tokio::test]
async fn save_form_without_edit_mode_conflicts() {
    let app = TestApp::new(numbered_orders(1)).await;

    let response = app
        .post_form(
            "/orders/order-01/save",
            &[("shipping_provider", "SPX"), ("tracking_number", "X")],
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(app.store.updates().is_empty());
}

#[tokio::test]
async fn reload_form_reads_again() {
    let app = TestApp::new(numbered_orders(2)).await;

    let response = app.post_form("/reload", &[]).await;
    assert_eq!(location(&response), "/?page=0");
    assert_eq!(app.store.listings(), 2);
}

#[tokio::test]
async fn api_lists_board_view() {
    let app = TestApp::new(numbered_orders(7)).await;

    let response = app.request(Method::GET, "/api/orders?page=1", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let view = body_json(response).await;
    assert_eq!(view["page"], 1);
    assert_eq!(view["page_count"], 2);
    assert_eq!(view["total"], 7);
    assert_eq!(view["rows"][0]["id"], "order-07");
    assert_eq!(view["rows"][0]["status"], "กำลังดำเนินการ");
}

#[tokio::test]
async fn api_shipping_flow() {
    let app = TestApp::new(numbered_orders(1)).await;

    let response = app
        .request(Method::POST, "/api/orders/order-01/edit", None)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .request(
            Method::PATCH,
            "/api/orders/order-01/shipping",
            Some(json!({"shipping_provider": "SPX", "tracking_number": "SPX-1"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let order = body_json(response).await;
    assert_eq!(order["shipping_provider"], "SPX");
    assert!(app.store.updates().is_empty());

    let response = app
        .request(Method::POST, "/api/orders/order-01/save", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["tracking_number"], "SPX-1");
    assert_eq!(app.store.updates().len(), 1);
}

#[tokio::test]
async fn api_save_failure_is_bad_gateway() {
    let app = TestApp::new(numbered_orders(1)).await;
    app.store.fail_updates(true);

    let response = app
        .request(Method::POST, "/api/orders/order-01/save", None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Failed to save shipping details");
    assert!(body["request_id"].is_string());
}

#[tokio::test]
async fn api_status_change() {
    let app = TestApp::new(numbered_orders(1)).await;

    let response = app
        .request(
            Method::PUT,
            "/api/orders/order-01/status",
            Some(json!({"status": "กำลังจัดส่ง"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "กำลังจัดส่ง");

    let response = app
        .request(
            Method::PUT,
            "/api/orders/missing/status",
            Some(json!({"status": "กำลังจัดส่ง"})),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn api_reload_reports_failure_in_view() {
    let app = TestApp::new(numbered_orders(3)).await;
    app.store.fail_listing(true);

    let response = app.request(Method::POST, "/api/reload", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let view = body_json(response).await;
    assert_eq!(view["total"], 3);
    assert_eq!(view["rows"], json!([]));
    assert!(view["error"]
        .as_str()
        .unwrap()
        .starts_with("Failed to fetch orders:"));
}

#[tokio::test]
async fn health_reports_loaded_orders() {
    let app = TestApp::new(numbered_orders(4)).await;

    let response = app.request(Method::GET, "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "OK");
    assert_eq!(body["orders_loaded"], 4);
}
