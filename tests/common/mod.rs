#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{self, Body},
    http::{header, Method, Request, Response, StatusCode},
    Router,
};
use order_board::{
    app_router,
    services::OrderBoard,
    store::{Document, DocumentStore, Fields, InMemoryDocumentStore, StoreError},
    AppState,
};
use serde_json::{json, Value};
use tower::ServiceExt;

pub const COLLECTION: &str = "orders";

/// One `update_fields` call seen by [`RecordingStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedUpdate {
    pub key: String,
    pub fields: Value,
}

/// In-memory store that records every call and can be told to fail or stall.
#[derive(Default)]
pub struct RecordingStore {
    inner: InMemoryDocumentStore,
    listings: AtomicUsize,
    updates: Mutex<Vec<RecordedUpdate>>,
    fail_listing: AtomicBool,
    fail_updates: AtomicBool,
    update_delay: Mutex<Option<Duration>>,
}

impl RecordingStore {
    pub fn with_documents(docs: Vec<Document>) -> Arc<Self> {
        let store = Self::default();
        for doc in docs {
            store.inner.insert(COLLECTION, doc);
        }
        Arc::new(store)
    }

    pub fn listings(&self) -> usize {
        self.listings.load(Ordering::SeqCst)
    }

    pub fn updates(&self) -> Vec<RecordedUpdate> {
        self.updates.lock().unwrap().clone()
    }

    pub fn fail_listing(&self, fail: bool) {
        self.fail_listing.store(fail, Ordering::SeqCst);
    }

    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    pub fn delay_updates(&self, delay: Duration) {
        *self.update_delay.lock().unwrap() = Some(delay);
    }

    /// Stored copy of a document, bypassing the recorder.
    pub fn stored(&self, key: &str) -> Option<Document> {
        self.inner.get(COLLECTION, key)
    }
}

#[async_trait]
impl DocumentStore for RecordingStore {
    async fn list_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        self.listings.fetch_add(1, Ordering::SeqCst);
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(StoreError::Transport("connection refused".into()));
        }
        self.inner.list_all(collection).await
    }

    async fn update_fields(
        &self,
        collection: &str,
        key: &str,
        fields: Fields,
    ) -> Result<(), StoreError> {
        self.updates.lock().unwrap().push(RecordedUpdate {
            key: key.to_string(),
            fields: Value::Object(fields.clone()),
        });
        let delay = *self.update_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected {
                status: 403,
                message: "Missing or insufficient permissions.".into(),
            });
        }
        self.inner.update_fields(collection, key, fields).await
    }
}

pub fn doc(key: &str, fields: Value) -> Document {
    match fields {
        Value::Object(map) => Document::new(key, map),
        other => panic!("document fields must be an object, got {other}"),
    }
}

/// `count` complete orders keyed `order-01`, `order-02`, ...
pub fn numbered_orders(count: usize) -> Vec<Document> {
    (1..=count)
        .map(|n| {
            doc(
                &format!("order-{n:02}"),
                json!({
                    "customer": {"name": format!("Customer {n}"), "address": "1 Main St", "phone": "555-0100"},
                    "items": [{"id": n, "name": "Widget", "price": 5, "quantity": 1}],
                    "total": 5,
                    "status": "กำลังดำเนินการ",
                    "shippingProvider": "",
                    "trackingNumber": ""
                }),
            )
        })
        .collect()
}

pub async fn mount(store: Arc<RecordingStore>) -> Arc<OrderBoard> {
    Arc::new(OrderBoard::mount(store, COLLECTION).await)
}

/// Router plus the board and store behind it.
pub struct TestApp {
    router: Router,
    pub board: Arc<OrderBoard>,
    pub store: Arc<RecordingStore>,
}

impl TestApp {
    pub async fn new(docs: Vec<Document>) -> Self {
        let store = RecordingStore::with_documents(docs);
        let board = mount(store.clone()).await;
        let router = app_router(AppState::new(board.clone()));
        Self {
            router,
            board,
            store,
        }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        self.router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }

    /// Submits an urlencoded form, the way the board page does.
    pub async fn post_form(&self, uri: &str, fields: &[(&str, &str)]) -> Response<Body> {
        let encoded = serde_urlencoded::to_string(fields).expect("encode form");
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(encoded))
            .unwrap();
        self.router.clone().oneshot(request).await.unwrap()
    }
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_str(&body_text(response).await).expect("json body")
}

pub fn location(response: &Response<Body>) -> &str {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .expect("location header")
}
