//! Shop and warehouse handlers.

use axum::{
    extract::{Extension, Path, Query, State},
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
use crate::types::{parse_optional, Created, NoContent, StatusQuery};
use common::AppResult;
use domain::{Business, BusinessKind, BusinessStatus, Identity, NewBusiness, Product};

/// Shop or warehouse details
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBusinessRequest {
    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    #[schema(example = "Corner Grocer")]
    pub name: String,
    #[validate(length(min = 1, max = 120, message = "Category must be 1-120 characters"))]
    #[schema(example = "grocery")]
    pub category: String,
    pub description: Option<String>,
}

impl CreateBusinessRequest {
    fn into_details(self, kind: BusinessKind) -> NewBusiness {
        NewBusiness {
            kind,
            name: self.name,
            category: self.category,
            description: self.description,
        }
    }
}

pub fn shop_routes() -> Router<AppState> {
    Router::new()
        .route("/create-shop", post(create_shop))
        .route("/warehouse", post(create_warehouse))
        .route("/shops", get(list_shops))
        .route("/shops/:id", get(get_shop).delete(delete_shop))
        .route("/shops/:id/products", get(list_shop_products))
        .route("/shops/:id/approve", put(approve_shop))
        .route("/shops/:id/reject", put(reject_shop))
        .route("/shops/:id/suspend", put(suspend_shop))
}

/// Open a shop (Retailer or Merchant)
#[utoipa::path(
    post,
    path = "/auth/create-shop",
    tag = "Shops",
    security(("bearer_auth" = [])),
    request_body = CreateBusinessRequest,
    responses(
        (status = 201, description = "Shop created, pending approval", body = Business),
        (status = 403, description = "Role may not own a shop")
    )
)]
pub async fn create_shop(
    Extension(identity): Extension<Identity>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateBusinessRequest>,
) -> AppResult<Created<Business>> {
    let details = payload.into_details(BusinessKind::Shop);
    Ok(Created(state.business_service.create(&identity, details).await?))
}

/// Open the caller's warehouse (Supplier, at most one)
#[utoipa::path(
    post,
    path = "/auth/warehouse",
    tag = "Shops",
    security(("bearer_auth" = [])),
    request_body = CreateBusinessRequest,
    responses(
        (status = 201, description = "Warehouse created, pending approval", body = Business),
        (status = 403, description = "Suppliers only"),
        (status = 409, description = "Supplier already owns a warehouse")
    )
)]
pub async fn create_warehouse(
    Extension(identity): Extension<Identity>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateBusinessRequest>,
) -> AppResult<Created<Business>> {
    let details = payload.into_details(BusinessKind::Warehouse);
    Ok(Created(state.business_service.create(&identity, details).await?))
}

/// Own entities for sellers, the full queue for admins
#[utoipa::path(
    get,
    path = "/auth/shops",
    tag = "Shops",
    security(("bearer_auth" = [])),
    params(StatusQuery),
    responses(
        (status = 200, description = "Shops and warehouses", body = Vec<Business>),
        (status = 403, description = "Sellers and admins only")
    )
)]
pub async fn list_shops(
    Extension(identity): Extension<Identity>,
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> AppResult<Json<Vec<Business>>> {
    let status = parse_optional::<BusinessStatus>(query.status.as_deref())?;
    Ok(Json(state.business_service.list(&identity, status).await?))
}

#[utoipa::path(
    get,
    path = "/auth/shops/{id}",
    tag = "Shops",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Shop or warehouse ID")),
    responses(
        (status = 200, description = "Shop or warehouse", body = Business),
        (status = 403, description = "Owner or admin only"),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_shop(
    Extension(identity): Extension<Identity>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Business>> {
    Ok(Json(state.business_service.get(&identity, id).await?))
}

/// Every product of one entity, including out-of-stock ones
#[utoipa::path(
    get,
    path = "/auth/shops/{id}/products",
    tag = "Shops",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Shop or warehouse ID")),
    responses(
        (status = 200, description = "Products", body = Vec<Product>),
        (status = 403, description = "Owner or admin only"),
        (status = 404, description = "Not found")
    )
)]
pub async fn list_shop_products(
    Extension(identity): Extension<Identity>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<Product>>> {
    Ok(Json(state.catalog_service.list_for_business(&identity, id).await?))
}

#[utoipa::path(
    put,
    path = "/auth/shops/{id}/approve",
    tag = "Shops",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Shop or warehouse ID")),
    responses(
        (status = 200, description = "Now active", body = Business),
        (status = 400, description = "Not pending"),
        (status = 403, description = "PlatformAdmin only"),
        (status = 404, description = "Not found")
    )
)]
pub async fn approve_shop(
    Extension(identity): Extension<Identity>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Business>> {
    Ok(Json(state.business_service.approve(&identity, id).await?))
}

#[utoipa::path(
    put,
    path = "/auth/shops/{id}/reject",
    tag = "Shops",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Shop or warehouse ID")),
    responses(
        (status = 200, description = "Rejected", body = Business),
        (status = 400, description = "Not pending"),
        (status = 403, description = "PlatformAdmin only"),
        (status = 404, description = "Not found")
    )
)]
pub async fn reject_shop(
    Extension(identity): Extension<Identity>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Business>> {
    Ok(Json(state.business_service.reject(&identity, id).await?))
}

/// Hide an active entity and its products from the marketplace
#[utoipa::path(
    put,
    path = "/auth/shops/{id}/suspend",
    tag = "Shops",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Shop or warehouse ID")),
    responses(
        (status = 200, description = "Suspended", body = Business),
        (status = 400, description = "Not active"),
        (status = 403, description = "Admins only"),
        (status = 404, description = "Not found")
    )
)]
pub async fn suspend_shop(
    Extension(identity): Extension<Identity>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Business>> {
    Ok(Json(state.business_service.suspend(&identity, id).await?))
}

#[utoipa::path(
    delete,
    path = "/auth/shops/{id}",
    tag = "Shops",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Shop or warehouse ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Owner only"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Still active")
    )
)]
pub async fn delete_shop(
    Extension(identity): Extension<Identity>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    state.business_service.delete(&identity, id).await?;
    Ok(NoContent)
}
