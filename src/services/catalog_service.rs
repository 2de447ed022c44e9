//! Products: seller-side management and the public listing.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::guard;
use crate::infra::UnitOfWork;
use common::{AppError, AppResult, OptionExt};
use domain::role::SELLERS;
use domain::{Business, BusinessStatus, Identity, NewProduct, Product, RoleSet};

/// Catalog service trait for dependency injection.
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Add a product to a business the caller owns
    async fn create_product(
        &self,
        caller: &Identity,
        business_id: Uuid,
        details: NewProduct,
    ) -> AppResult<Product>;

    /// Add units to a product's stock
    async fn restock(&self, caller: &Identity, product_id: Uuid, quantity: i32)
        -> AppResult<Product>;

    /// Products of one business, for its owner or an admin
    async fn list_for_business(&self, caller: &Identity, business_id: Uuid)
        -> AppResult<Vec<Product>>;

    /// Public listing: products of active businesses only
    async fn list_listed(&self) -> AppResult<Vec<Product>>;
}

/// Concrete implementation of CatalogService using Unit of Work.
pub struct Catalog<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> Catalog<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn business(&self, id: Uuid) -> AppResult<Business> {
        self.uow
            .businesses()
            .find_by_id(id)
            .await?
            .ok_or_not_found("Business")
    }
}

#[async_trait]
impl<U: UnitOfWork> CatalogService for Catalog<U> {
    async fn create_product(
        &self,
        caller: &Identity,
        business_id: Uuid,
        details: NewProduct,
    ) -> AppResult<Product> {
        let business = self.business(business_id).await?;
        guard(caller, SELLERS, Some(business.owner_id), "create_product")?;
        details.validate()?;

        if !matches!(business.status, BusinessStatus::Pending | BusinessStatus::Active) {
            return Err(AppError::validation(format!(
                "Products cannot be added to a {} {}",
                business.status, business.kind
            )));
        }

        let product = self
            .uow
            .products()
            .create(Product::new(business_id, details))
            .await?;
        tracing::info!(product_id = %product.id, business_id = %business_id, "Product created");
        Ok(product)
    }

    async fn restock(
        &self,
        caller: &Identity,
        product_id: Uuid,
        quantity: i32,
    ) -> AppResult<Product> {
        let product = self
            .uow
            .products()
            .find_by_id(product_id)
            .await?
            .ok_or_not_found("Product")?;
        let business = self.business(product.business_id).await?;
        guard(caller, SELLERS, Some(business.owner_id), "restock_product")?;

        let product = self.uow.products().restock(product_id, quantity).await?;
        tracing::info!(product_id = %product_id, added = quantity, stock = product.stock, "Product restocked");
        Ok(product)
    }

    async fn list_for_business(
        &self,
        caller: &Identity,
        business_id: Uuid,
    ) -> AppResult<Vec<Product>> {
        let business = self.business(business_id).await?;
        guard(caller, RoleSet::ALL, Some(business.owner_id), "list_business_products")?;
        self.uow.products().list_by_business(business_id).await
    }

    async fn list_listed(&self) -> AppResult<Vec<Product>> {
        self.uow.products().list_listed().await
    }
}
