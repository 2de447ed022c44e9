//! HTTP tests for the router.
//!
//! The full application router is driven with `tower::ServiceExt::oneshot`
//! on top of an in-memory store, so no database is needed.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use marketplace_core::config::Config;
use marketplace_core::infra::MemoryStore;
use marketplace_core::services::{
    AuthService, BusinessService, CatalogService, ServiceContainer, Services,
};
use marketplace_core::{create_router, AppState};

use domain::{BusinessKind, Identity, NewBusiness, NewProduct, Product, RoleId};

const PASSWORD: &str = "correct-horse-battery";

struct TestApp {
    router: Router,
    services: Services,
}

impl TestApp {
    fn new() -> Self {
        let config = Config::with_secret("k".repeat(48)).expect("valid config");
        let services = Services::from_uow(Arc::new(MemoryStore::new()), config.clone());
        let router = create_router(AppState::new(services.clone(), &config));
        Self { router, services }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value, Option<String>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body, cookie)
    }

    async fn call(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let (status, body, _) = self.send(request).await;
        (status, body)
    }

    /// Create an account directly, bypassing role requests.
    async fn account(&self, username: &str, role: RoleId) -> Identity {
        let user = self
            .services
            .auth()
            .create_account(username.to_string(), PASSWORD.to_string(), role)
            .await
            .unwrap();
        Identity::new(user.id, user.username, user.role)
    }

    async fn login(&self, username: &str) -> String {
        let (status, body) = self
            .call(
                Method::POST,
                "/auth/login",
                None,
                Some(json!({ "username": username, "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["accessToken"].as_str().unwrap().to_string()
    }

    async fn customer(&self, username: &str) -> String {
        let (status, _) = self
            .call(
                Method::POST,
                "/auth/register",
                None,
                Some(json!({ "username": username, "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        self.login(username).await
    }

    /// An approved shop holding one product.
    async fn listed_product(&self, stock: i32) -> Product {
        let retailer = self.account("retailer", RoleId::Retailer).await;
        let admin = self.account("platform", RoleId::PlatformAdmin).await;
        let shop = self
            .services
            .businesses()
            .create(
                &retailer,
                NewBusiness {
                    kind: BusinessKind::Shop,
                    name: "Corner Grocer".into(),
                    category: "grocery".into(),
                    description: None,
                },
            )
            .await
            .unwrap();
        self.services.businesses().approve(&admin, shop.id).await.unwrap();
        self.services
            .catalog()
            .create_product(
                &retailer,
                shop.id,
                NewProduct {
                    name: "Olive oil".into(),
                    description: None,
                    price: 1299,
                    stock,
                },
            )
            .await
            .unwrap()
    }
}

// =============================================================================
// Public endpoints
// =============================================================================

#[tokio::test]
async fn health_reports_store_status() {
    let app = TestApp::new();
    let (status, body) = app.call(Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = TestApp::new();
    let (status, body) = app.call(Method::GET, "/api-docs/openapi.json", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/auth/checkout"].is_object());
}

#[tokio::test]
async fn marketplace_lists_only_approved_products() {
    let app = TestApp::new();
    let product = app.listed_product(4).await;

    let (status, body) = app.call(Method::GET, "/marketplace/products", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], product.id.to_string());

    let (status, _) = app
        .call(Method::GET, "/marketplace/shops?kind=bazaar", None, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Sessions
// =============================================================================

#[tokio::test]
async fn register_rejects_invalid_payload() {
    let app = TestApp::new();
    let (status, body) = app
        .call(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({ "username": "al", "password": "short" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn duplicate_username_conflicts() {
    let app = TestApp::new();
    app.customer("alice").await;

    let (status, body) = app
        .call(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({ "username": "alice", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn login_sets_http_only_cookie() {
    let app = TestApp::new();
    app.customer("alice").await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "username": "alice", "password": PASSWORD }).to_string(),
        ))
        .unwrap();
    let (status, body, cookie) = app.send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tokenType"], "Bearer");
    assert_eq!(body["user"]["role"], 8);
    let cookie = cookie.expect("session cookie");
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = TestApp::new();
    app.customer("alice").await;

    let (status, body) = app
        .call(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "username": "alice", "password": "not-the-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn verify_accepts_bearer_or_cookie() {
    let app = TestApp::new();
    let token = app.customer("alice").await;

    let (status, _) = app.call(Method::GET, "/auth/verify", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.call(Method::GET, "/auth/verify", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "alice");
    assert_eq!(body["user"]["role"], 8);

    let request = Request::builder()
        .uri("/auth/verify")
        .header(header::COOKIE, format!("token={token}"))
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .call(Method::GET, "/auth/verify", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Roles
// =============================================================================

#[tokio::test]
async fn role_request_flow_over_http() {
    let app = TestApp::new();
    let customer = app.customer("alice").await;
    app.account("root", RoleId::Developer).await;
    let admin = app.login("root").await;

    let (status, request) = app
        .call(Method::POST, "/auth/role-request", Some(&customer), Some(json!({ "role": 4 })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(request["status"], "pending");

    let (status, _) = app
        .call(Method::POST, "/auth/role-request", Some(&customer), Some(json!({ "role": 5 })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .call(Method::GET, "/auth/role-requests", Some(&customer), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, queue) = app
        .call(Method::GET, "/auth/role-requests?status=pending", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(queue.as_array().unwrap().len(), 1);

    let id = request["id"].as_str().unwrap();
    let (status, resolved) = app
        .call(Method::POST, &format!("/auth/role/approve/{id}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resolved["status"], "approved");

    // The new role is visible on the next request with the same token
    let (_, session) = app.call(Method::GET, "/auth/verify", Some(&customer), None).await;
    assert_eq!(session["user"]["role"], 4);

    let (status, _) = app
        .call(Method::POST, &format!("/auth/role/reject/{id}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn rejected_request_can_be_resubmitted() {
    let app = TestApp::new();
    let customer = app.customer("alice").await;
    let admin = app.account("platform", RoleId::PlatformAdmin).await;
    let admin_token = app.login("platform").await;

    let (_, request) = app
        .call(Method::POST, "/auth/role-request", Some(&customer), Some(json!({ "role": 6 })))
        .await;
    let id = request["id"].as_str().unwrap();

    let (status, resolved) = app
        .call(Method::POST, &format!("/auth/role/reject/{id}"), Some(&admin_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resolved["status"], "rejected");
    assert_eq!(resolved["adminId"], admin.user_id.to_string());

    let (_, session) = app.call(Method::GET, "/auth/verify", Some(&customer), None).await;
    assert_eq!(session["user"]["role"], 8);

    let (status, _) = app
        .call(Method::POST, "/auth/role-request", Some(&customer), Some(json!({ "role": 6 })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn set_role_over_http() {
    let app = TestApp::new();
    let customer = app.customer("alice").await;
    app.account("root", RoleId::Developer).await;
    let developer = app.login("root").await;
    app.account("ops", RoleId::OperationsAdmin).await;
    let ops = app.login("ops").await;

    let (_, session) = app.call(Method::GET, "/auth/verify", Some(&customer), None).await;
    let uri = format!("/auth/users/{}/role", session["user"]["id"].as_str().unwrap());

    let (status, body) = app
        .call(Method::PUT, &uri, Some(&ops), Some(json!({ "role": 7 })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");

    let (status, body) = app
        .call(Method::PUT, &uri, Some(&developer), Some(json!({ "role": 7 })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], 7);

    let missing = format!("/auth/users/{}/role", uuid::Uuid::new_v4());
    let (status, body) = app
        .call(Method::PUT, &missing, Some(&developer), Some(json!({ "role": 7 })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn customers_cannot_list_users() {
    let app = TestApp::new();
    let customer = app.customer("alice").await;

    let (status, body) = app.call(Method::GET, "/auth/users", Some(&customer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

// =============================================================================
// Orders
// =============================================================================

#[tokio::test]
async fn checkout_reports_every_short_line() {
    let app = TestApp::new();
    let product = app.listed_product(1).await;
    let customer = app.customer("alice").await;

    let (status, body) = app
        .call(
            Method::POST,
            "/auth/checkout",
            Some(&customer),
            Some(json!({ "items": [{ "productId": product.id, "quantity": 3 }] })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INSUFFICIENT_STOCK");
    assert_eq!(body["error"]["details"][0]["productId"], product.id.to_string());
    assert_eq!(body["error"]["details"][0]["requested"], 3);
    assert_eq!(body["error"]["details"][0]["available"], 1);

    let (_, listed) = app.call(Method::GET, "/marketplace/products", None, None).await;
    assert_eq!(listed[0]["stock"], 1);
}

#[tokio::test]
async fn checkout_without_body_uses_cart() {
    let app = TestApp::new();
    let product = app.listed_product(5).await;
    let customer = app.customer("alice").await;

    let (status, _) = app.call(Method::POST, "/auth/checkout", Some(&customer), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call(
            Method::POST,
            "/auth/cart",
            Some(&customer),
            Some(json!({ "productId": product.id, "quantity": 2 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, orders) = app.call(Method::POST, "/auth/checkout", Some(&customer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(orders.as_array().unwrap().len(), 1);
    assert_eq!(orders[0]["status"], "processing");

    let (_, cart) = app.call(Method::GET, "/auth/cart", Some(&customer), None).await;
    assert!(cart.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn courier_advances_order_one_step_at_a_time() {
    let app = TestApp::new();
    let product = app.listed_product(5).await;
    let customer = app.customer("alice").await;
    app.account("courier", RoleId::Courier).await;
    let courier = app.login("courier").await;

    let (status, order) = app
        .call(
            Method::POST,
            "/auth/orders",
            Some(&customer),
            Some(json!({ "productId": product.id, "quantity": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/auth/orders/{}/status", order["id"].as_str().unwrap());

    let (status, body) = app
        .call(Method::PUT, &uri, Some(&courier), Some(json!({ "status": "delivered" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_TRANSITION");

    let (status, _) = app
        .call(Method::PUT, &uri, Some(&customer), Some(json!({ "status": "shipped" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .call(Method::PUT, &uri, Some(&courier), Some(json!({ "status": "shipped" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "shipped");
}

#[tokio::test]
async fn malformed_bodies_use_error_envelope() {
    let app = TestApp::new();
    let product = app.listed_product(5).await;
    let customer = app.customer("alice").await;
    app.account("courier", RoleId::Courier).await;
    let courier = app.login("courier").await;

    let rejected = [
        ("/auth/orders", Method::POST, json!({ "productId": product.id, "quantity": "two" })),
        ("/auth/cart", Method::POST, json!({ "productId": "nope", "quantity": 1 })),
        ("/auth/role-request", Method::POST, json!({ "role": "retailer" })),
    ];
    for (uri, method, body) in rejected {
        let (status, reply) = app.call(method, uri, Some(&customer), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(reply["error"]["code"], "VALIDATION_ERROR", "{uri}");
    }

    let (_, order) = app
        .call(
            Method::POST,
            "/auth/orders",
            Some(&customer),
            Some(json!({ "productId": product.id, "quantity": 1 })),
        )
        .await;
    let uri = format!("/auth/orders/{}/status", order["id"].as_str().unwrap());

    let (status, reply) = app
        .call(Method::PUT, &uri, Some(&courier), Some(json!({ "status": "cancelled" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(reply["error"]["code"], "VALIDATION_ERROR");

    // Status names are case-insensitive
    let (status, reply) = app
        .call(Method::PUT, &uri, Some(&courier), Some(json!({ "status": "Shipped" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply["status"], "shipped");
}
