//! Cart repository implementation.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IsolationLevel, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::cart_item::{self, ActiveModel, Entity as CartItemEntity};
use crate::infra::unit_of_work::{execute_transaction, map_unique_violation};
use common::{AppError, AppResult, OptionExt};
use domain::{validate_quantity, CartItem};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Cart repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// A user's cart lines, oldest first
    async fn list(&self, user_id: Uuid) -> AppResult<Vec<CartItem>>;

    /// Add units of a product, merging into an existing line.
    async fn add(&self, user_id: Uuid, product_id: Uuid, quantity: i32) -> AppResult<CartItem>;

    /// Replace the quantity of an existing line. `NotFound` if absent.
    async fn set_quantity(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> AppResult<CartItem>;

    /// Remove a line. `NotFound` if absent.
    async fn remove(&self, user_id: Uuid, product_id: Uuid) -> AppResult<()>;
}

/// SeaORM implementation of CartRepository
pub struct CartStore {
    db: DatabaseConnection,
}

impl CartStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CartRepository for CartStore {
    async fn list(&self, user_id: Uuid) -> AppResult<Vec<CartItem>> {
        let models = CartItemEntity::find()
            .filter(cart_item::Column::UserId.eq(user_id))
            .order_by_asc(cart_item::Column::AddedAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(CartItem::from).collect())
    }

    async fn add(&self, user_id: Uuid, product_id: Uuid, quantity: i32) -> AppResult<CartItem> {
        validate_quantity(quantity)?;

        execute_transaction(&self.db, IsolationLevel::ReadCommitted, move |txn| {
            Box::pin(async move {
                let existing = CartItemEntity::find_by_id((user_id, product_id))
                    .one(txn)
                    .await?;

                let model = match existing {
                    Some(model) => {
                        let merged = model
                            .quantity
                            .checked_add(quantity)
                            .unwrap_or(i32::MAX);
                        validate_quantity(merged)?;
                        let mut active: ActiveModel = model.into();
                        active.quantity = Set(merged);
                        active.update(txn).await?
                    }
                    None => {
                        let item = CartItem::new(user_id, product_id, quantity)?;
                        ActiveModel {
                            user_id: Set(item.user_id),
                            product_id: Set(item.product_id),
                            quantity: Set(item.quantity),
                            added_at: Set(item.added_at),
                        }
                        .insert(txn)
                        .await
                        .map_err(|e| {
                            map_unique_violation(e, "Cart line was added concurrently")
                        })?
                    }
                };
                Ok::<_, AppError>(CartItem::from(model))
            })
        })
        .await
    }

    async fn set_quantity(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> AppResult<CartItem> {
        validate_quantity(quantity)?;

        let model = CartItemEntity::find_by_id((user_id, product_id))
            .one(&self.db)
            .await?
            .ok_or_not_found("Cart item")?;
        let mut active: ActiveModel = model.into();
        active.quantity = Set(quantity);
        let model = active.update(&self.db).await?;
        Ok(model.into())
    }

    async fn remove(&self, user_id: Uuid, product_id: Uuid) -> AppResult<()> {
        let result = CartItemEntity::delete_by_id((user_id, product_id))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(AppError::not_found("Cart item"));
        }
        Ok(())
    }
}
