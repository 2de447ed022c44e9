//! User service - admin user listing and direct role assignment.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::guard;
use crate::infra::UnitOfWork;
use common::{AppResult, OptionExt};
use domain::role::{ADMINS, ROLE_APPROVERS};
use domain::{Identity, RoleId, RoleSet, User};

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Get a user. Callers may read themselves; admins may read anyone.
    async fn get_user(&self, caller: &Identity, id: Uuid) -> AppResult<User>;

    /// List all users (admins only)
    async fn list_users(&self, caller: &Identity) -> AppResult<Vec<User>>;

    /// Set a user's role directly, bypassing the request workflow
    async fn set_role(&self, caller: &Identity, id: Uuid, role: RoleId) -> AppResult<User>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> UserManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn get_user(&self, caller: &Identity, id: Uuid) -> AppResult<User> {
        guard(caller, RoleSet::ALL, Some(id), "get_user")?;
        self.uow.users().find_by_id(id).await?.ok_or_not_found("User")
    }

    async fn list_users(&self, caller: &Identity) -> AppResult<Vec<User>> {
        guard(caller, ADMINS, None, "list_users")?;
        self.uow.users().list().await
    }

    async fn set_role(&self, caller: &Identity, id: Uuid, role: RoleId) -> AppResult<User> {
        guard(caller, ROLE_APPROVERS, None, "set_role")?;
        let user = self.uow.users().update_role(id, role).await?;
        tracing::info!(
            user_id = %id,
            role = %role,
            admin_id = %caller.user_id,
            "Role set directly"
        );
        Ok(user)
    }
}
