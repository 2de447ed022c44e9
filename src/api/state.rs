//! Application state - Dependency injection container.

use std::sync::Arc;

use common::{AppResult, JwtConfig};

use crate::config::Config;
use crate::services::{
    AuthService, BusinessService, CartService, CatalogService, CheckoutService, OrderService,
    RoleRequestService, ServiceContainer, Services, UserService,
};

/// Application state containing all services.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub user_service: Arc<dyn UserService>,
    pub role_request_service: Arc<dyn RoleRequestService>,
    pub business_service: Arc<dyn BusinessService>,
    pub catalog_service: Arc<dyn CatalogService>,
    pub cart_service: Arc<dyn CartService>,
    pub order_service: Arc<dyn OrderService>,
    pub checkout_service: Arc<dyn CheckoutService>,
    /// Cookie settings for issued session tokens
    pub jwt: JwtConfig,
    services: Arc<Services>,
}

impl AppState {
    pub fn new(services: Services, config: &Config) -> Self {
        Self {
            auth_service: services.auth(),
            user_service: services.users(),
            role_request_service: services.role_requests(),
            business_service: services.businesses(),
            catalog_service: services.catalog(),
            cart_service: services.carts(),
            order_service: services.orders(),
            checkout_service: services.checkout(),
            jwt: config.jwt.clone(),
            services: Arc::new(services),
        }
    }

    /// Liveness of the backing store
    pub async fn ping(&self) -> AppResult<()> {
        self.services.ping().await
    }
}
