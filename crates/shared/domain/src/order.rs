//! Orders and the fulfillment lifecycle.
//!
//! Status only moves forward, one step at a time:
//! `Processing -> Shipped -> Delivered`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Processing,
    Shipped,
    Delivered,
}

impl OrderStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
        }
    }

    /// The only status this one may advance to.
    pub const fn next(self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Processing => Some(OrderStatus::Shipped),
            OrderStatus::Shipped => Some(OrderStatus::Delivered),
            OrderStatus::Delivered => None,
        }
    }

    pub fn can_advance_to(self, target: OrderStatus) -> bool {
        self.next() == Some(target)
    }

    /// # Errors
    /// `InvalidTransition` for skips, reversals and no-op moves.
    pub fn advance_to(self, target: OrderStatus) -> DomainResult<OrderStatus> {
        if self.can_advance_to(target) {
            Ok(target)
        } else {
            Err(DomainError::invalid_transition("order", self, target))
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    /// Case-insensitive, so `"Shipped"` and `"shipped"` both parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "processing" => Ok(OrderStatus::Processing),
            "shipped" => Ok(OrderStatus::Shipped),
            "delivered" => Ok(OrderStatus::Delivered),
            _ => Err(DomainError::validation(format!("unknown order status '{s}'"))),
        }
    }
}

// Accepts the same spellings as `FromStr`; always serializes lowercase.
impl<'de> Deserialize<'de> for OrderStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A placed order for one product. Only `status` changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    /// Unit price times quantity, in minor currency units
    pub total: i64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(user_id: Uuid, product_id: Uuid, quantity: i32, total: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            product_id,
            quantity,
            total,
            status: OrderStatus::Processing,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn advance(&mut self, target: OrderStatus) -> DomainResult<()> {
        self.status = self.status.advance_to(target)?;
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// A line that could not be filled from current stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct StockShortfall {
    pub product_id: Uuid,
    pub requested: i32,
    pub available: i32,
}

impl fmt::Display for StockShortfall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "product {} has {} in stock, {} requested",
            self.product_id, self.available, self.requested
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order() -> Order {
        Order::new(Uuid::new_v4(), Uuid::new_v4(), 2, 500)
    }

    #[test]
    fn new_orders_are_processing() {
        assert_eq!(order().status, OrderStatus::Processing);
    }

    #[test]
    fn advances_one_step_at_a_time() {
        let mut o = order();
        o.advance(OrderStatus::Shipped).unwrap();
        o.advance(OrderStatus::Delivered).unwrap();
        assert_eq!(o.status, OrderStatus::Delivered);
        assert_eq!(o.status.next(), None);
    }

    #[test]
    fn cannot_skip_shipped() {
        let mut o = order();
        let err = o.advance(OrderStatus::Delivered).unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition { .. }));
        assert_eq!(o.status, OrderStatus::Processing);
    }

    #[test]
    fn cannot_move_backwards_or_stand_still() {
        let mut o = order();
        o.advance(OrderStatus::Shipped).unwrap();
        assert!(o.advance(OrderStatus::Processing).is_err());
        assert!(o.advance(OrderStatus::Shipped).is_err());
        o.advance(OrderStatus::Delivered).unwrap();
        for target in [OrderStatus::Processing, OrderStatus::Shipped, OrderStatus::Delivered] {
            assert!(o.advance(target).is_err());
        }
    }

    #[test]
    fn parses_status_case_insensitively() {
        assert_eq!("Shipped".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
        assert_eq!("delivered".parse::<OrderStatus>().unwrap(), OrderStatus::Delivered);
        assert!("cancelled".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn json_status_matches_from_str() {
        let status: OrderStatus = serde_json::from_str("\"Shipped\"").unwrap();
        assert_eq!(status, OrderStatus::Shipped);
        assert_eq!(serde_json::to_string(&status).unwrap(), "\"shipped\"");
        assert!(serde_json::from_str::<OrderStatus>("\"cancelled\"").is_err());
    }
}
