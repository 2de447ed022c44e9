//! Cart checkout: every line becomes an order, or nothing happens.

use async_trait::async_trait;
use std::sync::Arc;

use super::guard;
use crate::infra::UnitOfWork;
use common::AppResult;
use domain::role::BUYERS;
use domain::{merge_lines, Identity, Order, OrderLine};

/// Checkout service trait for dependency injection.
#[async_trait]
pub trait CheckoutService: Send + Sync {
    /// Turn `items` (or the stored cart when `None`) into orders.
    ///
    /// Fails with `InsufficientStock` listing every short line, in which case
    /// no order is created, no stock moves and the cart is untouched.
    async fn checkout(&self, caller: &Identity, items: Option<Vec<OrderLine>>)
        -> AppResult<Vec<Order>>;
}

/// Concrete implementation of CheckoutService using Unit of Work.
pub struct CheckoutDesk<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> CheckoutDesk<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> CheckoutService for CheckoutDesk<U> {
    async fn checkout(
        &self,
        caller: &Identity,
        items: Option<Vec<OrderLine>>,
    ) -> AppResult<Vec<Order>> {
        guard(caller, BUYERS, None, "checkout")?;

        let requested = match items {
            Some(items) if !items.is_empty() => items,
            _ => self
                .uow
                .carts()
                .list(caller.user_id)
                .await?
                .iter()
                .map(|item| item.line())
                .collect(),
        };
        let lines = merge_lines(&requested)?;

        let orders = self
            .uow
            .orders()
            .place(caller.user_id, lines, true)
            .await
            .inspect_err(|err| {
                tracing::warn!(user_id = %caller.user_id, error = %err, "Checkout failed");
            })?;

        tracing::info!(
            user_id = %caller.user_id,
            orders = orders.len(),
            "Checkout completed"
        );
        Ok(orders)
    }
}
