//! Shop and warehouse approval workflow.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::guard;
use crate::infra::{BusinessFilter, UnitOfWork};
use common::{AppResult, OptionExt};
use domain::role::{ADMINS, BUSINESS_APPROVERS, SELLERS};
use domain::{Business, BusinessAction, BusinessKind, BusinessStatus, Identity, NewBusiness, RoleSet};

/// Business service trait for dependency injection.
#[async_trait]
pub trait BusinessService: Send + Sync {
    /// Register a shop or warehouse in `Pending` for the caller
    async fn create(&self, caller: &Identity, details: NewBusiness) -> AppResult<Business>;

    /// Owner or admin view of one entity
    async fn get(&self, caller: &Identity, id: Uuid) -> AppResult<Business>;

    /// Sellers see their own entities; admins see every entity
    async fn list(
        &self,
        caller: &Identity,
        status: Option<BusinessStatus>,
    ) -> AppResult<Vec<Business>>;

    async fn approve(&self, caller: &Identity, id: Uuid) -> AppResult<Business>;

    async fn reject(&self, caller: &Identity, id: Uuid) -> AppResult<Business>;

    async fn suspend(&self, caller: &Identity, id: Uuid) -> AppResult<Business>;

    /// Owner-only soft delete
    async fn delete(&self, caller: &Identity, id: Uuid) -> AppResult<()>;

    /// Public marketplace listing (active entities only)
    async fn list_listed(&self, kind: Option<BusinessKind>) -> AppResult<Vec<Business>>;
}

/// Concrete implementation of BusinessService using Unit of Work.
pub struct BusinessManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> BusinessManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn load(&self, id: Uuid) -> AppResult<Business> {
        self.uow
            .businesses()
            .find_by_id(id)
            .await?
            .ok_or_not_found("Business")
    }

    async fn act(&self, caller: &Identity, id: Uuid, action: BusinessAction) -> AppResult<Business> {
        let allowed = match action {
            BusinessAction::Suspend => ADMINS,
            BusinessAction::Approve | BusinessAction::Reject => BUSINESS_APPROVERS,
        };
        guard(caller, allowed, None, action.as_str())?;

        let business = self
            .uow
            .businesses()
            .transition(id, action, caller.user_id)
            .await
            .inspect_err(|err| {
                tracing::warn!(business_id = %id, action = action.as_str(), error = %err, "Business transition refused");
            })?;

        tracing::info!(
            business_id = %id,
            kind = %business.kind,
            status = %business.status,
            admin_id = %caller.user_id,
            "Business status changed"
        );
        Ok(business)
    }
}

#[async_trait]
impl<U: UnitOfWork> BusinessService for BusinessManager<U> {
    async fn create(&self, caller: &Identity, details: NewBusiness) -> AppResult<Business> {
        guard(caller, details.kind.owner_roles(), None, "create_business")?;
        details.validate()?;

        let business = self
            .uow
            .businesses()
            .create(Business::new(caller.user_id, details))
            .await?;
        tracing::info!(
            business_id = %business.id,
            owner_id = %caller.user_id,
            kind = %business.kind,
            "Business created"
        );
        Ok(business)
    }

    async fn get(&self, caller: &Identity, id: Uuid) -> AppResult<Business> {
        let business = self.load(id).await?;
        guard(caller, RoleSet::ALL, Some(business.owner_id), "get_business")?;
        Ok(business)
    }

    async fn list(
        &self,
        caller: &Identity,
        status: Option<BusinessStatus>,
    ) -> AppResult<Vec<Business>> {
        guard(caller, SELLERS.union(ADMINS), None, "list_businesses")?;

        let mut filter = if caller.is_admin() {
            BusinessFilter::default()
        } else {
            BusinessFilter::owned_by(caller.user_id)
        };
        filter.status = status;
        self.uow.businesses().list(filter).await
    }

    async fn approve(&self, caller: &Identity, id: Uuid) -> AppResult<Business> {
        self.act(caller, id, BusinessAction::Approve).await
    }

    async fn reject(&self, caller: &Identity, id: Uuid) -> AppResult<Business> {
        self.act(caller, id, BusinessAction::Reject).await
    }

    async fn suspend(&self, caller: &Identity, id: Uuid) -> AppResult<Business> {
        self.act(caller, id, BusinessAction::Suspend).await
    }

    async fn delete(&self, caller: &Identity, id: Uuid) -> AppResult<()> {
        let business = self.load(id).await?;
        // Sellers only: admins moderate through suspension, not deletion.
        guard(caller, SELLERS, Some(business.owner_id), "delete_business")?;

        self.uow.businesses().soft_delete(id).await?;
        tracing::info!(business_id = %id, owner_id = %caller.user_id, "Business deleted");
        Ok(())
    }

    async fn list_listed(&self, kind: Option<BusinessKind>) -> AppResult<Vec<Business>> {
        let filter = BusinessFilter {
            kind,
            ..BusinessFilter::listed()
        };
        self.uow.businesses().list(filter).await
    }
}
