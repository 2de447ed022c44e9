//! Product repository implementation.

use async_trait::async_trait;
use sea_orm::{
    sea_query::{Expr, Query},
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IsolationLevel, QueryFilter,
    QueryOrder,
};
use uuid::Uuid;

use super::entities::business::{self, Entity as BusinessEntity};
use super::entities::product::{self, ActiveModel, Entity as ProductEntity};
use crate::infra::unit_of_work::execute_transaction;
use common::{AppError, AppResult, OptionExt};
use domain::{BusinessStatus, Product};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Product repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn create(&self, product: Product) -> AppResult<Product>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Product>>;

    async fn list_by_business(&self, business_id: Uuid) -> AppResult<Vec<Product>>;

    /// Products of active, live businesses only
    async fn list_listed(&self) -> AppResult<Vec<Product>>;

    /// Add units to stock atomically. `NotFound` if the product does not exist.
    async fn restock(&self, id: Uuid, quantity: i32) -> AppResult<Product>;
}

/// SeaORM implementation of ProductRepository
pub struct ProductStore {
    db: DatabaseConnection,
}

impl ProductStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductRepository for ProductStore {
    async fn create(&self, product: Product) -> AppResult<Product> {
        let model = ActiveModel::from(product).insert(&self.db).await?;
        Ok(model.into())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Product>> {
        let result = ProductEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Product::from))
    }

    async fn list_by_business(&self, business_id: Uuid) -> AppResult<Vec<Product>> {
        let models = ProductEntity::find()
            .filter(product::Column::BusinessId.eq(business_id))
            .order_by_asc(product::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Product::from).collect())
    }

    async fn list_listed(&self) -> AppResult<Vec<Product>> {
        let listed = Query::select()
            .column(business::Column::Id)
            .from(BusinessEntity)
            .and_where(business::Column::Status.eq(BusinessStatus::Active.as_str()))
            .and_where(business::Column::DeletedAt.is_null())
            .to_owned();

        let models = ProductEntity::find()
            .filter(product::Column::BusinessId.in_subquery(listed))
            .order_by_asc(product::Column::Name)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Product::from).collect())
    }

    async fn restock(&self, id: Uuid, quantity: i32) -> AppResult<Product> {
        execute_transaction(&self.db, IsolationLevel::ReadCommitted, move |txn| {
            Box::pin(async move {
                let mut product: Product = ProductEntity::find_by_id(id)
                    .one(txn)
                    .await?
                    .ok_or_not_found("Product")?
                    .into();
                product.restock(quantity)?;

                // Increment in place so concurrent orders are not overwritten.
                ProductEntity::update_many()
                    .col_expr(
                        product::Column::Stock,
                        Expr::col(product::Column::Stock).add(quantity),
                    )
                    .col_expr(product::Column::UpdatedAt, Expr::value(product.updated_at))
                    .filter(product::Column::Id.eq(id))
                    .exec(txn)
                    .await?;

                let model = ProductEntity::find_by_id(id)
                    .one(txn)
                    .await?
                    .ok_or_not_found("Product")?;
                Ok::<_, AppError>(Product::from(model))
            })
        })
        .await
    }
}
