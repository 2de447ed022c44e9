//! Service Container - Centralized service access.
//!
//! Handlers reach every use case through [`ServiceContainer`], which hides
//! which storage backend the services were built on.

use std::sync::Arc;

use super::{
    AuthService, Authenticator, BusinessManager, BusinessService, CartManager, CartService,
    Catalog, CatalogService, CheckoutDesk, CheckoutService, OrderDesk, OrderService,
    RoleRequestDesk, RoleRequestService, UserManager, UserService,
};
use crate::config::Config;
use crate::infra::UnitOfWork;
use common::AppResult;

/// Service container trait for dependency injection.
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn users(&self) -> Arc<dyn UserService>;

    fn role_requests(&self) -> Arc<dyn RoleRequestService>;

    fn businesses(&self) -> Arc<dyn BusinessService>;

    fn catalog(&self) -> Arc<dyn CatalogService>;

    fn carts(&self) -> Arc<dyn CartService>;

    fn orders(&self) -> Arc<dyn OrderService>;

    fn checkout(&self) -> Arc<dyn CheckoutService>;
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
    role_request_service: Arc<dyn RoleRequestService>,
    business_service: Arc<dyn BusinessService>,
    catalog_service: Arc<dyn CatalogService>,
    cart_service: Arc<dyn CartService>,
    order_service: Arc<dyn OrderService>,
    checkout_service: Arc<dyn CheckoutService>,
    store: Arc<dyn UnitOfWork>,
}

impl Services {
    /// Build every service on top of one Unit of Work.
    pub fn from_uow<U: UnitOfWork + 'static>(uow: Arc<U>, config: Config) -> Self {
        Self {
            auth_service: Arc::new(Authenticator::new(uow.clone(), config)),
            user_service: Arc::new(UserManager::new(uow.clone())),
            role_request_service: Arc::new(RoleRequestDesk::new(uow.clone())),
            business_service: Arc::new(BusinessManager::new(uow.clone())),
            catalog_service: Arc::new(Catalog::new(uow.clone())),
            cart_service: Arc::new(CartManager::new(uow.clone())),
            order_service: Arc::new(OrderDesk::new(uow.clone())),
            checkout_service: Arc::new(CheckoutDesk::new(uow.clone())),
            store: uow,
        }
    }

    /// Liveness of the backing store
    pub async fn ping(&self) -> AppResult<()> {
        self.store.ping().await
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn role_requests(&self) -> Arc<dyn RoleRequestService> {
        self.role_request_service.clone()
    }

    fn businesses(&self) -> Arc<dyn BusinessService> {
        self.business_service.clone()
    }

    fn catalog(&self) -> Arc<dyn CatalogService> {
        self.catalog_service.clone()
    }

    fn carts(&self) -> Arc<dyn CartService> {
        self.cart_service.clone()
    }

    fn orders(&self) -> Arc<dyn OrderService> {
        self.order_service.clone()
    }

    fn checkout(&self) -> Arc<dyn CheckoutService> {
        self.checkout_service.clone()
    }
}
