//! Order repository implementation.
//!
//! Order placement is the one place stock goes down. Every line is a
//! conditional decrement (`stock = stock - q WHERE stock >= q`) inside a single
//! transaction, so stock never goes negative and a failed line undoes the
//! whole batch.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::{Expr, Query},
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    IsolationLevel, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use super::entities::business::{self, Entity as BusinessEntity};
use super::entities::cart_item::{self, Entity as CartItemEntity};
use super::entities::order::{self, ActiveModel, Entity as OrderEntity};
use super::entities::product::{self, Entity as ProductEntity};
use crate::infra::unit_of_work::execute_transaction;
use common::{AppError, AppResult, OptionExt};
use domain::{Business, Order, OrderLine, OrderStatus, Product, StockShortfall};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Listing filter for orders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderFilter {
    /// Orders placed by this customer
    pub user_id: Option<Uuid>,
    /// Orders for products sold by businesses this user owns
    pub seller_id: Option<Uuid>,
}

impl OrderFilter {
    pub fn placed_by(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    pub fn sold_by(seller_id: Uuid) -> Self {
        Self {
            seller_id: Some(seller_id),
            ..Self::default()
        }
    }
}

/// Order repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Place one order per line, all or nothing.
    ///
    /// Lines are processed in the given order. `NotFound` if a product does
    /// not exist or is not listed; `InsufficientStock` listing every short line.
    /// When `clear_cart` is set, the user's cart lines for these products are
    /// removed in the same transaction.
    async fn place(
        &self,
        user_id: Uuid,
        lines: Vec<OrderLine>,
        clear_cart: bool,
    ) -> AppResult<Vec<Order>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Order>>;

    /// Orders matching the filter, newest first
    async fn list(&self, filter: OrderFilter) -> AppResult<Vec<Order>>;

    /// Move an order one step forward as a conditional write on the observed status.
    async fn advance(&self, id: Uuid, target: OrderStatus) -> AppResult<Order>;
}

/// SeaORM implementation of OrderRepository
pub struct OrderStore {
    db: DatabaseConnection,
}

impl OrderStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Load a product that can currently be ordered.
async fn load_orderable<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<Product> {
    let product: Product = ProductEntity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_not_found("Product")?
        .into();

    let business: Business = BusinessEntity::find_by_id(product.business_id)
        .one(conn)
        .await?
        .ok_or_not_found("Product")?
        .try_into()?;
    if !business.is_listed() {
        return Err(AppError::not_found("Product"));
    }
    Ok(product)
}

#[async_trait]
impl OrderRepository for OrderStore {
    async fn place(
        &self,
        user_id: Uuid,
        lines: Vec<OrderLine>,
        clear_cart: bool,
    ) -> AppResult<Vec<Order>> {
        execute_transaction(&self.db, IsolationLevel::ReadCommitted, move |txn| {
            Box::pin(async move {
                let mut orders = Vec::with_capacity(lines.len());
                let mut shortfalls = Vec::new();

                for line in &lines {
                    let product = load_orderable(txn, line.product_id).await?;
                    let total = product.total_for(line.quantity)?;

                    let taken = ProductEntity::update_many()
                        .col_expr(
                            product::Column::Stock,
                            Expr::col(product::Column::Stock).sub(line.quantity),
                        )
                        .col_expr(product::Column::UpdatedAt, Expr::value(Utc::now()))
                        .filter(product::Column::Id.eq(line.product_id))
                        .filter(product::Column::Stock.gte(line.quantity))
                        .exec(txn)
                        .await?;

                    if taken.rows_affected == 0 {
                        let available = ProductEntity::find_by_id(line.product_id)
                            .one(txn)
                            .await?
                            .map_or(0, |p| p.stock);
                        shortfalls.push(StockShortfall {
                            product_id: line.product_id,
                            requested: line.quantity,
                            available,
                        });
                        continue;
                    }

                    orders.push(Order::new(user_id, product.id, line.quantity, total));
                }

                if !shortfalls.is_empty() {
                    return Err(AppError::InsufficientStock(shortfalls));
                }

                for order in &orders {
                    ActiveModel::from(order.clone()).insert(txn).await?;
                }

                if clear_cart {
                    let product_ids: Vec<Uuid> = lines.iter().map(|l| l.product_id).collect();
                    CartItemEntity::delete_many()
                        .filter(cart_item::Column::UserId.eq(user_id))
                        .filter(cart_item::Column::ProductId.is_in(product_ids))
                        .exec(txn)
                        .await?;
                }

                Ok::<_, AppError>(orders)
            })
        })
        .await
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Order>> {
        let result = OrderEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Order::try_from).transpose()?)
    }

    async fn list(&self, filter: OrderFilter) -> AppResult<Vec<Order>> {
        let mut query = OrderEntity::find();
        if let Some(user_id) = filter.user_id {
            query = query.filter(order::Column::UserId.eq(user_id));
        }
        if let Some(seller_id) = filter.seller_id {
            let owned = Query::select()
                .column(business::Column::Id)
                .from(BusinessEntity)
                .and_where(business::Column::OwnerId.eq(seller_id))
                .to_owned();
            let sold = Query::select()
                .column(product::Column::Id)
                .from(ProductEntity)
                .and_where(product::Column::BusinessId.in_subquery(owned))
                .to_owned();
            query = query.filter(order::Column::ProductId.in_subquery(sold));
        }

        let models = query
            .order_by_desc(order::Column::CreatedAt)
            .all(&self.db)
            .await?;
        models
            .into_iter()
            .map(|m| Order::try_from(m).map_err(AppError::from))
            .collect()
    }

    async fn advance(&self, id: Uuid, target: OrderStatus) -> AppResult<Order> {
        execute_transaction(&self.db, IsolationLevel::ReadCommitted, move |txn| {
            Box::pin(async move {
                let mut order: Order = OrderEntity::find_by_id(id)
                    .one(txn)
                    .await?
                    .ok_or_not_found("Order")?
                    .try_into()?;
                let observed = order.status;
                order.advance(target)?;

                let updated = OrderEntity::update_many()
                    .col_expr(order::Column::Status, Expr::value(order.status.as_str()))
                    .col_expr(order::Column::UpdatedAt, Expr::value(order.updated_at))
                    .filter(order::Column::Id.eq(id))
                    .filter(order::Column::Status.eq(observed.as_str()))
                    .exec(txn)
                    .await?;

                if updated.rows_affected == 0 {
                    // A racing actor advanced it first; judge against what they left.
                    let current: Order = OrderEntity::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or_not_found("Order")?
                        .try_into()?;
                    current.status.advance_to(target)?;
                    return Err(AppError::conflict("Order was modified concurrently"));
                }

                Ok::<_, AppError>(order)
            })
        })
        .await
    }
}
