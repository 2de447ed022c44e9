//! Role request repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    IsolationLevel, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use super::entities::role_request::{self, ActiveModel, Entity as RoleRequestEntity};
use super::entities::user::{self, Entity as UserEntity};
use crate::infra::unit_of_work::{execute_transaction, map_unique_violation};
use common::{AppError, AppResult, OptionExt};
use domain::{Decision, DomainError, RequestStatus, RoleRequest};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Message returned when a user already has a pending request.
pub const PENDING_REQUEST_EXISTS: &str = "A pending role request already exists for this user";

/// Role request repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RoleRequestRepository: Send + Sync {
    /// Store a new pending request. `Conflict` if the user already has one.
    async fn create_pending(&self, request: RoleRequest) -> AppResult<RoleRequest>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<RoleRequest>>;

    /// Requests submitted by one user, newest first
    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<RoleRequest>>;

    /// All requests, optionally filtered by status, oldest first
    async fn list(&self, status: Option<RequestStatus>) -> AppResult<Vec<RoleRequest>>;

    /// Resolve a pending request and, on approval, set the requester's role.
    ///
    /// Both writes happen atomically. `AlreadyResolved` if the request is no
    /// longer pending, `NotFound` if it (or its user) does not exist.
    async fn resolve(&self, id: Uuid, decision: Decision, admin_id: Uuid)
        -> AppResult<RoleRequest>;
}

/// SeaORM implementation of RoleRequestRepository
pub struct RoleRequestStore {
    db: DatabaseConnection,
}

impl RoleRequestStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn into_domain(models: Vec<role_request::Model>) -> AppResult<Vec<RoleRequest>> {
    models
        .into_iter()
        .map(|m| RoleRequest::try_from(m).map_err(AppError::from))
        .collect()
}

#[async_trait]
impl RoleRequestRepository for RoleRequestStore {
    async fn create_pending(&self, request: RoleRequest) -> AppResult<RoleRequest> {
        // The partial unique index on (user_id) WHERE status = 'pending'
        // settles concurrent submissions.
        let model = ActiveModel::from(request)
            .insert(&self.db)
            .await
            .map_err(|e| map_unique_violation(e, PENDING_REQUEST_EXISTS))?;
        Ok(RoleRequest::try_from(model)?)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<RoleRequest>> {
        let result = RoleRequestEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(RoleRequest::try_from).transpose()?)
    }

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<RoleRequest>> {
        let models = RoleRequestEntity::find()
            .filter(role_request::Column::UserId.eq(user_id))
            .order_by_desc(role_request::Column::CreatedAt)
            .all(&self.db)
            .await?;
        into_domain(models)
    }

    async fn list(&self, status: Option<RequestStatus>) -> AppResult<Vec<RoleRequest>> {
        let mut query = RoleRequestEntity::find();
        if let Some(status) = status {
            query = query.filter(role_request::Column::Status.eq(status.as_str()));
        }
        let models = query
            .order_by_asc(role_request::Column::CreatedAt)
            .all(&self.db)
            .await?;
        into_domain(models)
    }

    async fn resolve(
        &self,
        id: Uuid,
        decision: Decision,
        admin_id: Uuid,
    ) -> AppResult<RoleRequest> {
        execute_transaction(&self.db, IsolationLevel::ReadCommitted, move |txn| {
            Box::pin(async move {
                let mut request: RoleRequest = RoleRequestEntity::find_by_id(id)
                    .one(txn)
                    .await?
                    .ok_or_not_found("Role request")?
                    .try_into()?;

                request.resolve(decision, admin_id)?;

                // Only flip a row that is still pending; a concurrent resolver
                // that got there first leaves zero affected rows.
                let updated = RoleRequestEntity::update_many()
                    .col_expr(
                        role_request::Column::Status,
                        Expr::value(request.status.as_str()),
                    )
                    .col_expr(role_request::Column::AdminId, Expr::value(admin_id))
                    .col_expr(role_request::Column::UpdatedAt, Expr::value(request.updated_at))
                    .filter(role_request::Column::Id.eq(id))
                    .filter(role_request::Column::Status.eq(RequestStatus::Pending.as_str()))
                    .exec(txn)
                    .await?;
                if updated.rows_affected == 0 {
                    return Err(DomainError::AlreadyResolved("Role request".to_string()).into());
                }

                if decision == Decision::Approve {
                    let promoted = UserEntity::update_many()
                        .col_expr(user::Column::Role, Expr::value(request.requested_role.id()))
                        .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now()))
                        .filter(user::Column::Id.eq(request.user_id))
                        .exec(txn)
                        .await?;
                    if promoted.rows_affected == 0 {
                        return Err(AppError::not_found("User"));
                    }
                }

                Ok::<_, AppError>(request)
            })
        })
        .await
    }
}
