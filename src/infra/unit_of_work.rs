//! Unit of Work pattern implementation.
//!
//! The Unit of Work centralizes access to every repository so services depend
//! on one abstraction. Multi-step workflows (role approval, order placement)
//! are single repository calls, each atomic in its backend.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    AccessMode, DatabaseConnection, DatabaseTransaction, DbErr, IsolationLevel, SqlErr,
    TransactionTrait,
};

use common::{AppError, AppResult};

use super::db::Database;
use super::repositories::{
    BusinessRepository, BusinessStore, CartRepository, CartStore, OrderRepository, OrderStore,
    ProductRepository, ProductStore, RoleRequestRepository, RoleRequestStore, UserRepository,
    UserStore,
};

/// Unit of Work trait for dependency injection.
///
/// Provides centralized access to all repositories plus a liveness probe for
/// the backing store.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn users(&self) -> Arc<dyn UserRepository>;

    fn role_requests(&self) -> Arc<dyn RoleRequestRepository>;

    fn businesses(&self) -> Arc<dyn BusinessRepository>;

    fn products(&self) -> Arc<dyn ProductRepository>;

    fn carts(&self) -> Arc<dyn CartRepository>;

    fn orders(&self) -> Arc<dyn OrderRepository>;

    /// Check the backing store is reachable.
    async fn ping(&self) -> AppResult<()>;
}

/// Closure run inside a database transaction.
pub(crate) type TxFuture<'a, T> = Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'a>>;

/// Execute a closure within a transaction with the given isolation level.
///
/// The transaction is committed on success or rolled back on error.
pub(crate) async fn execute_transaction<F, T>(
    db: &DatabaseConnection,
    isolation: IsolationLevel,
    f: F,
) -> AppResult<T>
where
    F: for<'a> FnOnce(&'a DatabaseTransaction) -> TxFuture<'a, T> + Send,
    T: Send,
{
    let txn = db
        .begin_with_config(Some(isolation), Some(AccessMode::ReadWrite))
        .await
        .map_err(AppError::from)?;

    match f(&txn).await {
        Ok(result) => {
            txn.commit().await.map_err(AppError::from)?;
            Ok(result)
        }
        Err(e) => {
            if let Err(rollback_err) = txn.rollback().await {
                tracing::error!("Transaction rollback failed: {}", rollback_err);
            }
            Err(e)
        }
    }
}

/// Map a unique-constraint violation to `Conflict`, anything else to a database error.
pub(crate) fn map_unique_violation(err: DbErr, message: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::conflict(message),
        _ => AppError::from(err),
    }
}

/// PostgreSQL-backed implementation of UnitOfWork
pub struct Persistence {
    database: Database,
    user_repo: Arc<UserStore>,
    role_request_repo: Arc<RoleRequestStore>,
    business_repo: Arc<BusinessStore>,
    product_repo: Arc<ProductStore>,
    cart_repo: Arc<CartStore>,
    order_repo: Arc<OrderStore>,
}

impl Persistence {
    pub fn new(database: Database) -> Self {
        let db = database.get_connection();
        Self {
            user_repo: Arc::new(UserStore::new(db.clone())),
            role_request_repo: Arc::new(RoleRequestStore::new(db.clone())),
            business_repo: Arc::new(BusinessStore::new(db.clone())),
            product_repo: Arc::new(ProductStore::new(db.clone())),
            cart_repo: Arc::new(CartStore::new(db.clone())),
            order_repo: Arc::new(OrderStore::new(db)),
            database,
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn role_requests(&self) -> Arc<dyn RoleRequestRepository> {
        self.role_request_repo.clone()
    }

    fn businesses(&self) -> Arc<dyn BusinessRepository> {
        self.business_repo.clone()
    }

    fn products(&self) -> Arc<dyn ProductRepository> {
        self.product_repo.clone()
    }

    fn carts(&self) -> Arc<dyn CartRepository> {
        self.cart_repo.clone()
    }

    fn orders(&self) -> Arc<dyn OrderRepository> {
        self.order_repo.clone()
    }

    async fn ping(&self) -> AppResult<()> {
        self.database.ping().await.map_err(AppError::from)
    }
}
