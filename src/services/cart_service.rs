//! Customer shopping cart.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::guard;
use crate::infra::UnitOfWork;
use common::{AppResult, OptionExt};
use domain::role::BUYERS;
use domain::{CartItem, Identity};

/// Cart service trait for dependency injection.
#[async_trait]
pub trait CartService: Send + Sync {
    async fn list(&self, caller: &Identity) -> AppResult<Vec<CartItem>>;

    /// Add units of a product, merging with an existing line
    async fn add(&self, caller: &Identity, product_id: Uuid, quantity: i32) -> AppResult<CartItem>;

    async fn set_quantity(
        &self,
        caller: &Identity,
        product_id: Uuid,
        quantity: i32,
    ) -> AppResult<CartItem>;

    async fn remove(&self, caller: &Identity, product_id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of CartService using Unit of Work.
pub struct CartManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> CartManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> CartService for CartManager<U> {
    async fn list(&self, caller: &Identity) -> AppResult<Vec<CartItem>> {
        guard(caller, BUYERS, None, "list_cart")?;
        self.uow.carts().list(caller.user_id).await
    }

    async fn add(&self, caller: &Identity, product_id: Uuid, quantity: i32) -> AppResult<CartItem> {
        guard(caller, BUYERS, None, "add_to_cart")?;
        // Stock is only checked at checkout.
        self.uow
            .products()
            .find_by_id(product_id)
            .await?
            .ok_or_not_found("Product")?;
        self.uow.carts().add(caller.user_id, product_id, quantity).await
    }

    async fn set_quantity(
        &self,
        caller: &Identity,
        product_id: Uuid,
        quantity: i32,
    ) -> AppResult<CartItem> {
        guard(caller, BUYERS, None, "update_cart")?;
        self.uow
            .carts()
            .set_quantity(caller.user_id, product_id, quantity)
            .await
    }

    async fn remove(&self, caller: &Identity, product_id: Uuid) -> AppResult<()> {
        guard(caller, BUYERS, None, "remove_from_cart")?;
        self.uow.carts().remove(caller.user_id, product_id).await
    }
}
