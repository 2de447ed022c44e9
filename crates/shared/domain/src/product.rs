//! Products offered by shops and warehouses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::MAX_NAME_LENGTH;
use crate::error::{DomainError, DomainResult};

/// A sellable item. Prices are in minor currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub business_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(business_id: Uuid, details: NewProduct) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            business_id,
            name: details.name,
            description: details.description,
            price: details.price,
            stock: details.stock,
            created_at: now,
            updated_at: now,
        }
    }

    /// Total price for `quantity` units.
    ///
    /// # Errors
    /// `Validation` if the total overflows.
    pub fn total_for(&self, quantity: i32) -> DomainResult<i64> {
        self.price
            .checked_mul(i64::from(quantity))
            .ok_or_else(|| DomainError::validation("Order total is too large"))
    }

    /// Take `quantity` units out of stock, refusing to go negative.
    pub fn take_stock(&mut self, quantity: i32) -> bool {
        if quantity <= 0 || quantity > self.stock {
            return false;
        }
        self.stock -= quantity;
        self.updated_at = Utc::now();
        true
    }

    /// Add units back to stock.
    ///
    /// # Errors
    /// `Validation` for non-positive amounts or overflow.
    pub fn restock(&mut self, quantity: i32) -> DomainResult<()> {
        if quantity <= 0 {
            return Err(DomainError::validation("Restock quantity must be positive"));
        }
        self.stock = self
            .stock
            .checked_add(quantity)
            .ok_or_else(|| DomainError::validation("Stock level is too large"))?;
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// Seller-supplied details of a new product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub stock: i32,
}

impl NewProduct {
    pub fn validate(&self) -> DomainResult<()> {
        let name = self.name.trim();
        if name.is_empty() || name.chars().count() > MAX_NAME_LENGTH {
            return Err(DomainError::validation(format!(
                "Name must be between 1 and {MAX_NAME_LENGTH} characters"
            )));
        }
        if self.price < 0 {
            return Err(DomainError::validation("Price cannot be negative"));
        }
        if self.stock < 0 {
            return Err(DomainError::validation("Stock cannot be negative"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(stock: i32) -> Product {
        Product::new(
            Uuid::new_v4(),
            NewProduct {
                name: "Tea".into(),
                description: None,
                price: 250,
                stock,
            },
        )
    }

    #[test]
    fn take_stock_never_goes_negative() {
        let mut p = product(5);
        assert!(p.take_stock(3));
        assert_eq!(p.stock, 2);
        assert!(!p.take_stock(3));
        assert_eq!(p.stock, 2);
        assert!(!p.take_stock(0));
        assert!(!p.take_stock(-1));
        assert!(p.take_stock(2));
        assert_eq!(p.stock, 0);
    }

    #[test]
    fn totals() {
        assert_eq!(product(1).total_for(4).unwrap(), 1000);
        let mut pricey = product(1);
        pricey.price = i64::MAX;
        assert!(pricey.total_for(2).is_err());
    }

    #[test]
    fn restock_rules() {
        let mut p = product(1);
        p.restock(9).unwrap();
        assert_eq!(p.stock, 10);
        assert!(p.restock(0).is_err());
        p.stock = i32::MAX;
        assert!(p.restock(1).is_err());
    }

    #[test]
    fn validation() {
        let mut details = NewProduct {
            name: "Tea".into(),
            description: None,
            price: 0,
            stock: 0,
        };
        assert!(details.validate().is_ok());
        details.price = -1;
        assert!(details.validate().is_err());
        details.price = 1;
        details.stock = -5;
        assert!(details.validate().is_err());
    }
}
