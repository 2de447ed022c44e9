//! Cart handlers.

use axum::{
    extract::{Extension, Path, State},
    response::Json,
    routing::{get, put},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::types::NoContent;
use common::AppResult;
use domain::{CartItem, Identity};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be positive"))]
    #[schema(example = 1)]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CartQuantityRequest {
    #[validate(range(min = 1, message = "Quantity must be positive"))]
    #[schema(example = 2)]
    pub quantity: i32,
}

pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/cart", get(list_cart).post(add_to_cart))
        .route("/cart/:product_id", put(set_quantity).delete(remove_from_cart))
}

#[utoipa::path(
    get,
    path = "/auth/cart",
    tag = "Cart",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Cart lines", body = Vec<CartItem>),
        (status = 403, description = "Role cannot buy")
    )
)]
pub async fn list_cart(
    Extension(identity): Extension<Identity>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<CartItem>>> {
    Ok(Json(state.cart_service.list(&identity).await?))
}

/// Add a product; an existing line grows by `quantity`
#[utoipa::path(
    post,
    path = "/auth/cart",
    tag = "Cart",
    security(("bearer_auth" = [])),
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Line after the addition", body = CartItem),
        (status = 400, description = "Invalid quantity"),
        (status = 403, description = "Role cannot buy"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn add_to_cart(
    Extension(identity): Extension<Identity>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<AddToCartRequest>,
) -> AppResult<Json<CartItem>> {
    let item = state
        .cart_service
        .add(&identity, payload.product_id, payload.quantity)
        .await?;
    Ok(Json(item))
}

#[utoipa::path(
    put,
    path = "/auth/cart/{product_id}",
    tag = "Cart",
    security(("bearer_auth" = [])),
    params(("product_id" = Uuid, Path, description = "Product ID")),
    request_body = CartQuantityRequest,
    responses(
        (status = 200, description = "Line updated", body = CartItem),
        (status = 400, description = "Invalid quantity"),
        (status = 404, description = "Product not in cart")
    )
)]
pub async fn set_quantity(
    Extension(identity): Extension<Identity>,
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<CartQuantityRequest>,
) -> AppResult<Json<CartItem>> {
    let item = state
        .cart_service
        .set_quantity(&identity, product_id, payload.quantity)
        .await?;
    Ok(Json(item))
}

#[utoipa::path(
    delete,
    path = "/auth/cart/{product_id}",
    tag = "Cart",
    security(("bearer_auth" = [])),
    params(("product_id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Line removed"),
        (status = 404, description = "Product not in cart")
    )
)]
pub async fn remove_from_cart(
    Extension(identity): Extension<Identity>,
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> AppResult<NoContent> {
    state.cart_service.remove(&identity, product_id).await?;
    Ok(NoContent)
}
