//! Public marketplace listing. No session required.

use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};

use crate::api::AppState;
use crate::types::{parse_optional, KindQuery};
use common::AppResult;
use domain::{Business, BusinessKind, Product};

pub fn marketplace_routes() -> Router<AppState> {
    Router::new()
        .route("/shops", get(list_shops))
        .route("/products", get(list_products))
}

/// Active shops and warehouses
#[utoipa::path(
    get,
    path = "/marketplace/shops",
    tag = "Marketplace",
    params(KindQuery),
    responses(
        (status = 200, description = "Listed businesses", body = Vec<Business>),
        (status = 400, description = "Unknown kind")
    )
)]
pub async fn list_shops(
    State(state): State<AppState>,
    Query(query): Query<KindQuery>,
) -> AppResult<Json<Vec<Business>>> {
    let kind = parse_optional::<BusinessKind>(query.kind.as_deref())?;
    Ok(Json(state.business_service.list_listed(kind).await?))
}

/// Products of active businesses
#[utoipa::path(
    get,
    path = "/marketplace/products",
    tag = "Marketplace",
    responses((status = 200, description = "Listed products", body = Vec<Product>))
)]
pub async fn list_products(State(state): State<AppState>) -> AppResult<Json<Vec<Product>>> {
    Ok(Json(state.catalog_service.list_listed().await?))
}
