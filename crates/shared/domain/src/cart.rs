//! Shopping cart lines.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::MAX_LINE_QUANTITY;
use crate::error::{DomainError, DomainResult};

/// One product in a user's cart. Unique per `(user_id, product_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    pub fn new(user_id: Uuid, product_id: Uuid, quantity: i32) -> DomainResult<Self> {
        validate_quantity(quantity)?;
        Ok(Self {
            user_id,
            product_id,
            quantity,
            added_at: Utc::now(),
        })
    }

    pub fn line(&self) -> OrderLine {
        OrderLine {
            product_id: self.product_id,
            quantity: self.quantity,
        }
    }
}

/// Quantity of one product requested at order time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: Uuid,
    pub quantity: i32,
}

impl OrderLine {
    pub fn new(product_id: Uuid, quantity: i32) -> Self {
        Self { product_id, quantity }
    }
}

/// Quantities must be at least one and within a sane per-line bound.
pub fn validate_quantity(quantity: i32) -> DomainResult<()> {
    if !(1..=MAX_LINE_QUANTITY).contains(&quantity) {
        return Err(DomainError::validation(format!(
            "Quantity must be between 1 and {MAX_LINE_QUANTITY}"
        )));
    }
    Ok(())
}

/// Validate checkout lines and merge repeated products into one line.
///
/// Output is ordered by product id so concurrent checkouts touch rows in the
/// same order.
///
/// # Errors
/// `Validation` for an empty list, a bad quantity, or a merged quantity
/// above the per-line bound.
pub fn merge_lines(lines: &[OrderLine]) -> DomainResult<Vec<OrderLine>> {
    if lines.is_empty() {
        return Err(DomainError::validation("Checkout requires at least one item"));
    }
    let mut merged: BTreeMap<Uuid, i32> = BTreeMap::new();
    for line in lines {
        validate_quantity(line.quantity)?;
        let entry = merged.entry(line.product_id).or_insert(0);
        *entry += line.quantity;
        validate_quantity(*entry)?;
    }
    Ok(merged
        .into_iter()
        .map(|(product_id, quantity)| OrderLine { product_id, quantity })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cart_item_requires_positive_quantity() {
        let user = Uuid::new_v4();
        assert!(CartItem::new(user, Uuid::new_v4(), 0).is_err());
        assert!(CartItem::new(user, Uuid::new_v4(), -3).is_err());
        assert_eq!(CartItem::new(user, Uuid::new_v4(), 2).unwrap().quantity, 2);
    }

    #[test]
    fn merges_duplicate_products() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let merged = merge_lines(&[
            OrderLine::new(a, 2),
            OrderLine::new(b, 1),
            OrderLine::new(a, 3),
        ])
        .unwrap();
        assert_eq!(merged.len(), 2);
        let a_line = merged.iter().find(|l| l.product_id == a).unwrap();
        assert_eq!(a_line.quantity, 5);
    }

    #[test]
    fn merged_lines_are_sorted() {
        let lines: Vec<_> = (0..5).map(|_| OrderLine::new(Uuid::new_v4(), 1)).collect();
        let merged = merge_lines(&lines).unwrap();
        assert!(merged.windows(2).all(|w| w[0].product_id < w[1].product_id));
    }

    #[test]
    fn rejects_empty_and_oversized() {
        assert!(merge_lines(&[]).is_err());
        let p = Uuid::new_v4();
        assert!(merge_lines(&[
            OrderLine::new(p, MAX_LINE_QUANTITY),
            OrderLine::new(p, 1)
        ])
        .is_err());
    }
}
