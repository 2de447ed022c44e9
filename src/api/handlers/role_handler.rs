//! Role escalation handlers.

use axum::{
    extract::{Extension, Path, Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::types::{parse_optional, Created, StatusQuery};
use common::AppResult;
use domain::{Identity, RequestStatus, RoleId, RoleRequest};

/// Role change request body
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SubmitRoleRequest {
    /// Requested role id: 4 Retailer, 5 Merchant, 6 Supplier, 7 Courier, 8 Customer
    #[schema(example = 4)]
    pub role: i16,
}

pub fn role_routes() -> Router<AppState> {
    Router::new()
        .route("/role-request", post(submit_request).get(my_requests))
        .route("/role-requests", get(list_requests))
        .route("/role/approve/:id", post(approve_request))
        .route("/role/reject/:id", post(reject_request))
}

/// Ask for a different role
#[utoipa::path(
    post,
    path = "/auth/role-request",
    tag = "Roles",
    security(("bearer_auth" = [])),
    request_body = SubmitRoleRequest,
    responses(
        (status = 201, description = "Request is pending review", body = RoleRequest),
        (status = 400, description = "Role cannot be requested"),
        (status = 409, description = "A pending request already exists")
    )
)]
pub async fn submit_request(
    Extension(identity): Extension<Identity>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<SubmitRoleRequest>,
) -> AppResult<Created<RoleRequest>> {
    let role = RoleId::try_from(payload.role)?;
    let request = state.role_request_service.submit(&identity, role).await?;
    Ok(Created(request))
}

/// The caller's own requests, newest first
#[utoipa::path(
    get,
    path = "/auth/role-request",
    tag = "Roles",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Own requests", body = Vec<RoleRequest>))
)]
pub async fn my_requests(
    Extension(identity): Extension<Identity>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<RoleRequest>>> {
    Ok(Json(state.role_request_service.list_mine(&identity).await?))
}

/// Review queue
#[utoipa::path(
    get,
    path = "/auth/role-requests",
    tag = "Roles",
    security(("bearer_auth" = [])),
    params(StatusQuery),
    responses(
        (status = 200, description = "Requests, oldest first", body = Vec<RoleRequest>),
        (status = 403, description = "Not an approver")
    )
)]
pub async fn list_requests(
    Extension(identity): Extension<Identity>,
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> AppResult<Json<Vec<RoleRequest>>> {
    let status = parse_optional::<RequestStatus>(query.status.as_deref())?;
    Ok(Json(state.role_request_service.list(&identity, status).await?))
}

/// Approve a pending request and grant the role
#[utoipa::path(
    post,
    path = "/auth/role/approve/{id}",
    tag = "Roles",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Role request ID")),
    responses(
        (status = 200, description = "Approved", body = RoleRequest),
        (status = 403, description = "Not an approver"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Already resolved")
    )
)]
pub async fn approve_request(
    Extension(identity): Extension<Identity>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RoleRequest>> {
    Ok(Json(state.role_request_service.approve(&identity, id).await?))
}

/// Reject a pending request
#[utoipa::path(
    post,
    path = "/auth/role/reject/{id}",
    tag = "Roles",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Role request ID")),
    responses(
        (status = 200, description = "Rejected", body = RoleRequest),
        (status = 403, description = "Not an approver"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Already resolved")
    )
)]
pub async fn reject_request(
    Extension(identity): Extension<Identity>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RoleRequest>> {
    Ok(Json(state.role_request_service.reject(&identity, id).await?))
}
