//! Order fulfillment workflow.
//!
//! Visibility is scoped by role: customers see what they bought, sellers see
//! orders for their products, couriers and admins see everything.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::guard;
use crate::infra::{OrderFilter, UnitOfWork};
use common::{AppError, AppResult, OptionExt};
use domain::role::{ADMINS, BUYERS, FULFILLERS, SELLERS};
use domain::{validate_quantity, AccessDenied, Identity, Order, OrderLine, OrderStatus, RoleSet};

/// Order service trait for dependency injection.
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Place a single-product order, taking stock atomically
    async fn create(&self, caller: &Identity, product_id: Uuid, quantity: i32) -> AppResult<Order>;

    async fn get(&self, caller: &Identity, id: Uuid) -> AppResult<Order>;

    async fn list(&self, caller: &Identity) -> AppResult<Vec<Order>>;

    /// Move an order one step along Processing -> Shipped -> Delivered
    async fn advance(&self, caller: &Identity, id: Uuid, target: OrderStatus) -> AppResult<Order>;
}

/// Concrete implementation of OrderService using Unit of Work.
pub struct OrderDesk<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> OrderDesk<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    fn sees_all(caller: &Identity) -> bool {
        FULFILLERS.union(ADMINS).contains(caller.role)
    }

    /// Whether the caller owns the business selling this order's product.
    async fn sells(&self, caller: &Identity, order: &Order) -> AppResult<bool> {
        let Some(product) = self.uow.products().find_by_id(order.product_id).await? else {
            return Ok(false);
        };
        let business = self.uow.businesses().find_by_id(product.business_id).await?;
        Ok(business.is_some_and(|b| b.owner_id == caller.user_id))
    }
}

#[async_trait]
impl<U: UnitOfWork> OrderService for OrderDesk<U> {
    async fn create(&self, caller: &Identity, product_id: Uuid, quantity: i32) -> AppResult<Order> {
        guard(caller, BUYERS, None, "create_order")?;
        validate_quantity(quantity)?;

        let orders = self
            .uow
            .orders()
            .place(caller.user_id, vec![OrderLine::new(product_id, quantity)], false)
            .await
            .inspect_err(|err| {
                tracing::warn!(user_id = %caller.user_id, product_id = %product_id, error = %err, "Order not placed");
            })?;
        let order = orders
            .into_iter()
            .next()
            .ok_or_else(|| AppError::internal("order placement returned no order"))?;

        tracing::info!(
            order_id = %order.id,
            user_id = %caller.user_id,
            product_id = %product_id,
            quantity,
            total = order.total,
            "Order placed"
        );
        Ok(order)
    }

    async fn get(&self, caller: &Identity, id: Uuid) -> AppResult<Order> {
        guard(caller, RoleSet::ALL, None, "get_order")?;
        let order = self.uow.orders().find_by_id(id).await?.ok_or_not_found("Order")?;

        let visible = order.user_id == caller.user_id
            || Self::sees_all(caller)
            || (SELLERS.contains(caller.role) && self.sells(caller, &order).await?);
        if !visible {
            return Err(domain::DomainError::from(AccessDenied::NotOwner).into());
        }
        Ok(order)
    }

    async fn list(&self, caller: &Identity) -> AppResult<Vec<Order>> {
        let filter = if Self::sees_all(caller) {
            OrderFilter::default()
        } else if SELLERS.contains(caller.role) {
            OrderFilter::sold_by(caller.user_id)
        } else {
            guard(caller, BUYERS, None, "list_orders")?;
            OrderFilter::placed_by(caller.user_id)
        };
        self.uow.orders().list(filter).await
    }

    async fn advance(&self, caller: &Identity, id: Uuid, target: OrderStatus) -> AppResult<Order> {
        guard(caller, FULFILLERS, None, "advance_order")?;

        let order = self
            .uow
            .orders()
            .advance(id, target)
            .await
            .inspect_err(|err| {
                tracing::warn!(order_id = %id, target = %target, error = %err, "Order not advanced");
            })?;
        tracing::info!(order_id = %id, status = %order.status, actor = %caller.user_id, "Order advanced");
        Ok(order)
    }
}
