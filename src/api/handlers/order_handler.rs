//! Order and checkout handlers.

use axum::{
    body::Bytes,
    extract::{Extension, Path, State},
    response::Json,
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::types::Created;
use common::{AppError, AppResult};
use domain::{Identity, Order, OrderLine, OrderStatus};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub product_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be positive"))]
    #[schema(example = 1)]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateOrderStatusRequest {
    /// Next status: `shipped` or `delivered`
    #[schema(example = "shipped")]
    pub status: OrderStatus,
}

/// Checkout body; omit `items` (or send an empty list) to buy the stored cart
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub items: Option<Vec<OrderLine>>,
}

pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", post(create_order).get(list_orders))
        .route("/orders/:id", get(get_order))
        .route("/orders/:id/status", put(update_status))
        .route("/checkout", post(checkout))
}

/// Order a single product; stock is taken atomically
#[utoipa::path(
    post,
    path = "/auth/orders",
    tag = "Orders",
    security(("bearer_auth" = [])),
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = Order),
        (status = 400, description = "Invalid quantity or insufficient stock"),
        (status = 403, description = "Role cannot buy"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn create_order(
    Extension(identity): Extension<Identity>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateOrderRequest>,
) -> AppResult<Created<Order>> {
    let order = state
        .order_service
        .create(&identity, payload.product_id, payload.quantity)
        .await?;
    Ok(Created(order))
}

/// Orders visible to the caller's role
#[utoipa::path(
    get,
    path = "/auth/orders",
    tag = "Orders",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Orders, newest first", body = Vec<Order>))
)]
pub async fn list_orders(
    Extension(identity): Extension<Identity>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Order>>> {
    Ok(Json(state.order_service.list(&identity).await?))
}

#[utoipa::path(
    get,
    path = "/auth/orders/{id}",
    tag = "Orders",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order", body = Order),
        (status = 403, description = "Not visible to the caller"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn get_order(
    Extension(identity): Extension<Identity>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.order_service.get(&identity, id).await?))
}

/// Move an order one step along processing, shipped, delivered
#[utoipa::path(
    put,
    path = "/auth/orders/{id}/status",
    tag = "Orders",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Order ID")),
    request_body = UpdateOrderStatusRequest,
    responses(
        (status = 200, description = "Status advanced", body = Order),
        (status = 400, description = "Unknown or not the next status"),
        (status = 403, description = "Fulfillment roles only"),
        (status = 404, description = "Order not found")
    )
)]
pub async fn update_status(
    Extension(identity): Extension<Identity>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<UpdateOrderStatusRequest>,
) -> AppResult<Json<Order>> {
    let order = state
        .order_service
        .advance(&identity, id, payload.status)
        .await?;
    Ok(Json(order))
}

/// All-or-nothing checkout
#[utoipa::path(
    post,
    path = "/auth/checkout",
    tag = "Orders",
    security(("bearer_auth" = [])),
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "One order per line", body = Vec<Order>),
        (status = 400, description = "Empty cart, invalid quantity, or every short line"),
        (status = 403, description = "Role cannot buy"),
        (status = 404, description = "A product was not found")
    )
)]
pub async fn checkout(
    Extension(identity): Extension<Identity>,
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<Vec<Order>>> {
    let payload = if body.iter().all(u8::is_ascii_whitespace) {
        CheckoutRequest::default()
    } else {
        serde_json::from_slice::<CheckoutRequest>(&body)
            .map_err(|e| AppError::Validation(format!("Invalid checkout body: {e}")))?
    };
    let orders = state
        .checkout_service
        .checkout(&identity, payload.items)
        .await?;
    Ok(Json(orders))
}
