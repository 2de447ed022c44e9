//! Shop and warehouse repository implementation.

use async_trait::async_trait;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, IsolationLevel, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use super::entities::business::{self, ActiveModel, Entity as BusinessEntity};
use crate::infra::unit_of_work::{execute_transaction, map_unique_violation};
use common::{AppError, AppResult, OptionExt};
use domain::{Business, BusinessAction, BusinessKind, BusinessStatus};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Message returned when a supplier already owns a live warehouse.
pub const WAREHOUSE_EXISTS: &str = "Supplier already owns a warehouse";

/// Message returned when a write lost a race with another writer.
pub const CONCURRENT_MODIFICATION: &str = "Business was modified concurrently";

/// Listing filter. Deleted entities are always excluded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BusinessFilter {
    pub owner_id: Option<Uuid>,
    pub kind: Option<BusinessKind>,
    pub status: Option<BusinessStatus>,
}

impl BusinessFilter {
    pub fn owned_by(owner_id: Uuid) -> Self {
        Self {
            owner_id: Some(owner_id),
            ..Self::default()
        }
    }

    /// Active entities only, as shown in the public marketplace.
    pub fn listed() -> Self {
        Self {
            status: Some(BusinessStatus::Active),
            ..Self::default()
        }
    }

    pub fn matches(&self, business: &Business) -> bool {
        !business.is_deleted()
            && self.owner_id.map_or(true, |id| business.owner_id == id)
            && self.kind.map_or(true, |kind| business.kind == kind)
            && self.status.map_or(true, |status| business.status == status)
    }
}

/// Business repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait BusinessRepository: Send + Sync {
    /// Store a new entity. `Conflict` for a second live warehouse.
    async fn create(&self, business: Business) -> AppResult<Business>;

    /// Find a live (not deleted) entity.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Business>>;

    /// Live entities matching the filter, newest first
    async fn list(&self, filter: BusinessFilter) -> AppResult<Vec<Business>>;

    /// Apply an admin action as a conditional write on the observed status.
    ///
    /// `InvalidTransition` if the action is illegal from the current status,
    /// `NotFound` if the entity does not exist or was deleted.
    async fn transition(
        &self,
        id: Uuid,
        action: BusinessAction,
        admin_id: Uuid,
    ) -> AppResult<Business>;

    /// Soft delete. `Conflict` while the entity is active.
    async fn soft_delete(&self, id: Uuid) -> AppResult<Business>;
}

/// SeaORM implementation of BusinessRepository
pub struct BusinessStore {
    db: DatabaseConnection,
}

impl BusinessStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

async fn load_live<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<Business> {
    let model = BusinessEntity::find_by_id(id)
        .filter(business::Column::DeletedAt.is_null())
        .one(conn)
        .await?
        .ok_or_not_found("Business")?;
    Ok(Business::try_from(model)?)
}

#[async_trait]
impl BusinessRepository for BusinessStore {
    async fn create(&self, business: Business) -> AppResult<Business> {
        // The partial unique index on live warehouses settles concurrent creates.
        let model = ActiveModel::from(business)
            .insert(&self.db)
            .await
            .map_err(|e| map_unique_violation(e, WAREHOUSE_EXISTS))?;
        Ok(Business::try_from(model)?)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Business>> {
        match load_live(&self.db, id).await {
            Ok(business) => Ok(Some(business)),
            Err(AppError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn list(&self, filter: BusinessFilter) -> AppResult<Vec<Business>> {
        let mut query = BusinessEntity::find().filter(business::Column::DeletedAt.is_null());
        if let Some(owner_id) = filter.owner_id {
            query = query.filter(business::Column::OwnerId.eq(owner_id));
        }
        if let Some(kind) = filter.kind {
            query = query.filter(business::Column::Kind.eq(kind.as_str()));
        }
        if let Some(status) = filter.status {
            query = query.filter(business::Column::Status.eq(status.as_str()));
        }

        let models = query
            .order_by_desc(business::Column::CreatedAt)
            .all(&self.db)
            .await?;
        models
            .into_iter()
            .map(|m| Business::try_from(m).map_err(AppError::from))
            .collect()
    }

    async fn transition(
        &self,
        id: Uuid,
        action: BusinessAction,
        admin_id: Uuid,
    ) -> AppResult<Business> {
        execute_transaction(&self.db, IsolationLevel::ReadCommitted, move |txn| {
            Box::pin(async move {
                let mut business = load_live(txn, id).await?;
                let observed = business.status;
                business.apply(action, admin_id)?;

                let updated = BusinessEntity::update_many()
                    .col_expr(business::Column::Status, Expr::value(business.status.as_str()))
                    .col_expr(business::Column::AdminId, Expr::value(admin_id))
                    .col_expr(business::Column::UpdatedAt, Expr::value(business.updated_at))
                    .filter(business::Column::Id.eq(id))
                    .filter(business::Column::Status.eq(observed.as_str()))
                    .filter(business::Column::DeletedAt.is_null())
                    .exec(txn)
                    .await?;

                if updated.rows_affected == 0 {
                    // Someone else moved it first; report against the fresh state.
                    let current = load_live(txn, id).await?;
                    action.apply_to(current.status)?;
                    return Err(AppError::conflict(CONCURRENT_MODIFICATION));
                }

                Ok::<_, AppError>(business)
            })
        })
        .await
    }

    async fn soft_delete(&self, id: Uuid) -> AppResult<Business> {
        execute_transaction(&self.db, IsolationLevel::ReadCommitted, move |txn| {
            Box::pin(async move {
                let mut business = load_live(txn, id).await?;
                let observed = business.status;
                business.soft_delete()?;

                let updated = BusinessEntity::update_many()
                    .col_expr(business::Column::DeletedAt, Expr::value(business.deleted_at))
                    .col_expr(business::Column::UpdatedAt, Expr::value(business.updated_at))
                    .filter(business::Column::Id.eq(id))
                    .filter(business::Column::Status.eq(observed.as_str()))
                    .filter(business::Column::DeletedAt.is_null())
                    .exec(txn)
                    .await?;

                if updated.rows_affected == 0 {
                    let current = load_live(txn, id).await?;
                    current.ensure_deletable()?;
                    return Err(AppError::conflict(CONCURRENT_MODIFICATION));
                }

                Ok::<_, AppError>(business)
            })
        })
        .await
    }
}
