//! Seller-side product handlers.

use axum::{
    extract::{Extension, Path, State},
    response::Json,
    routing::{post, put},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::types::Created;
use common::AppResult;
use domain::{Identity, NewProduct, Product};

/// New product in a shop or warehouse the caller owns
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub business_id: Uuid,
    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    #[schema(example = "Olive oil 1L")]
    pub name: String,
    pub description: Option<String>,
    /// Unit price in minor currency units
    #[validate(range(min = 0, message = "Price cannot be negative"))]
    #[schema(example = 1299)]
    pub price: i64,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    #[serde(default)]
    #[schema(example = 10)]
    pub stock: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RestockRequest {
    /// Units to add
    #[validate(range(min = 1, message = "Quantity must be positive"))]
    #[schema(example = 5)]
    pub quantity: i32,
}

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/products", post(create_product))
        .route("/products/:id/stock", put(restock))
}

#[utoipa::path(
    post,
    path = "/auth/products",
    tag = "Products",
    security(("bearer_auth" = [])),
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Invalid product or business not open"),
        (status = 403, description = "Not the business owner"),
        (status = 404, description = "Business not found")
    )
)]
pub async fn create_product(
    Extension(identity): Extension<Identity>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateProductRequest>,
) -> AppResult<Created<Product>> {
    let details = NewProduct {
        name: payload.name,
        description: payload.description,
        price: payload.price,
        stock: payload.stock,
    };
    let product = state
        .catalog_service
        .create_product(&identity, payload.business_id, details)
        .await?;
    Ok(Created(product))
}

/// Add units to a product's stock
#[utoipa::path(
    put,
    path = "/auth/products/{id}/stock",
    tag = "Products",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = RestockRequest,
    responses(
        (status = 200, description = "Stock updated", body = Product),
        (status = 403, description = "Not the business owner"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn restock(
    Extension(identity): Extension<Identity>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<RestockRequest>,
) -> AppResult<Json<Product>> {
    let product = state
        .catalog_service
        .restock(&identity, id, payload.quantity)
        .await?;
    Ok(Json(product))
}
