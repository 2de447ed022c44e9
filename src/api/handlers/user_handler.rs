//! User administration handlers.

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
use common::AppResult;
use domain::{Identity, RoleId, UserResponse};

/// Direct role assignment body
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SetRoleRequest {
    /// Role id (1-8)
    #[schema(example = 3)]
    pub role: i16,
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:id", get(get_user))
        .route("/users/:id/role", put(set_role))
}

/// List all users (admin only)
#[utoipa::path(
    get,
    path = "/auth/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All users", body = Vec<UserResponse>),
        (status = 403, description = "Admin only")
    )
)]
pub async fn list_users(
    Extension(identity): Extension<Identity>,
    State(state): State<AppState>,
) -> AppResult<Json<Vec<UserResponse>>> {
    let users = state.user_service.list_users(&identity).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Get a user (self or admin)
#[utoipa::path(
    get,
    path = "/auth/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User profile", body = UserResponse),
        (status = 403, description = "Another user's profile"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    Extension(identity): Extension<Identity>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserResponse>> {
    let user = state.user_service.get_user(&identity, id).await?;
    Ok(Json(user.into()))
}

/// Set a user's role directly
#[utoipa::path(
    put,
    path = "/auth/users/{id}/role",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = SetRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = UserResponse),
        (status = 400, description = "Unknown role"),
        (status = 403, description = "Developer or PlatformAdmin only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn set_role(
    Extension(identity): Extension<Identity>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<SetRoleRequest>,
) -> AppResult<Json<UserResponse>> {
    let role = RoleId::try_from(payload.role)?;
    let user = state.user_service.set_role(&identity, id, role).await?;
    Ok(Json(user.into()))
}
