//! Role escalation workflow.
//!
//! Customers (and sellers changing line of business) ask for a new role; a
//! Developer or PlatformAdmin resolves the request exactly once.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::guard;
use crate::infra::UnitOfWork;
use common::AppResult;
use domain::role::ROLE_APPROVERS;
use domain::{Decision, Identity, RequestStatus, RoleId, RoleRequest, RoleSet};

/// Role request service trait for dependency injection.
#[async_trait]
pub trait RoleRequestService: Send + Sync {
    /// Open a pending request for the caller
    async fn submit(&self, caller: &Identity, requested_role: RoleId) -> AppResult<RoleRequest>;

    /// The caller's own requests, newest first
    async fn list_mine(&self, caller: &Identity) -> AppResult<Vec<RoleRequest>>;

    /// Review queue for approvers
    async fn list(
        &self,
        caller: &Identity,
        status: Option<RequestStatus>,
    ) -> AppResult<Vec<RoleRequest>>;

    async fn approve(&self, caller: &Identity, request_id: Uuid) -> AppResult<RoleRequest>;

    async fn reject(&self, caller: &Identity, request_id: Uuid) -> AppResult<RoleRequest>;
}

/// Concrete implementation of RoleRequestService using Unit of Work.
pub struct RoleRequestDesk<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> RoleRequestDesk<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn resolve(
        &self,
        caller: &Identity,
        request_id: Uuid,
        decision: Decision,
    ) -> AppResult<RoleRequest> {
        guard(caller, ROLE_APPROVERS, None, "resolve_role_request")?;

        let request = self
            .uow
            .role_requests()
            .resolve(request_id, decision, caller.user_id)
            .await
            .inspect_err(|err| {
                tracing::warn!(request_id = %request_id, error = %err, "Role request not resolved");
            })?;

        tracing::info!(
            request_id = %request.id,
            user_id = %request.user_id,
            requested_role = %request.requested_role,
            status = %request.status,
            admin_id = %caller.user_id,
            "Role request resolved"
        );
        Ok(request)
    }
}

#[async_trait]
impl<U: UnitOfWork> RoleRequestService for RoleRequestDesk<U> {
    async fn submit(&self, caller: &Identity, requested_role: RoleId) -> AppResult<RoleRequest> {
        guard(caller, RoleSet::ALL, None, "submit_role_request")?;

        let request = RoleRequest::open(caller.user_id, caller.role, requested_role)?;
        let request = self.uow.role_requests().create_pending(request).await?;
        tracing::info!(
            request_id = %request.id,
            user_id = %caller.user_id,
            requested_role = %requested_role,
            "Role request submitted"
        );
        Ok(request)
    }

    async fn list_mine(&self, caller: &Identity) -> AppResult<Vec<RoleRequest>> {
        guard(caller, RoleSet::ALL, None, "list_own_role_requests")?;
        self.uow.role_requests().list_for_user(caller.user_id).await
    }

    async fn list(
        &self,
        caller: &Identity,
        status: Option<RequestStatus>,
    ) -> AppResult<Vec<RoleRequest>> {
        guard(caller, ROLE_APPROVERS, None, "list_role_requests")?;
        self.uow.role_requests().list(status).await
    }

    async fn approve(&self, caller: &Identity, request_id: Uuid) -> AppResult<RoleRequest> {
        self.resolve(caller, request_id, Decision::Approve).await
    }

    async fn reject(&self, caller: &Identity, request_id: Uuid) -> AppResult<RoleRequest> {
        self.resolve(caller, request_id, Decision::Reject).await
    }
}
