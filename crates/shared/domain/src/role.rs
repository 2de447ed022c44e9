//! Roles and capability sets.
//!
//! A user holds exactly one [`RoleId`]. Authorization is a membership test
//! against a [`RoleSet`]; roles carry no rank and there is no hierarchy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Closed set of user roles, serialized as their numeric id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i16", into = "i16")]
#[repr(i16)]
pub enum RoleId {
    Developer = 1,
    PlatformAdmin = 2,
    OperationsAdmin = 3,
    Retailer = 4,
    Merchant = 5,
    Supplier = 6,
    Courier = 7,
    Customer = 8,
}

impl RoleId {
    /// Every role, in id order.
    pub const ALL: [RoleId; 8] = [
        RoleId::Developer,
        RoleId::PlatformAdmin,
        RoleId::OperationsAdmin,
        RoleId::Retailer,
        RoleId::Merchant,
        RoleId::Supplier,
        RoleId::Courier,
        RoleId::Customer,
    ];

    /// Numeric id as stored and transmitted.
    pub const fn id(self) -> i16 {
        self as i16
    }

    /// Stable machine name.
    pub const fn as_str(self) -> &'static str {
        match self {
            RoleId::Developer => "developer",
            RoleId::PlatformAdmin => "platform_admin",
            RoleId::OperationsAdmin => "operations_admin",
            RoleId::Retailer => "retailer",
            RoleId::Merchant => "merchant",
            RoleId::Supplier => "supplier",
            RoleId::Courier => "courier",
            RoleId::Customer => "customer",
        }
    }

    const fn bit(self) -> u16 {
        1 << (self as u16)
    }

    /// Admin roles bypass ownership checks.
    pub const fn is_admin(self) -> bool {
        ADMINS.contains(self)
    }

    /// Whether a user may ask for this role through a role request.
    pub const fn is_self_requestable(self) -> bool {
        SELF_REQUESTABLE.contains(self)
    }
}

impl TryFrom<i16> for RoleId {
    type Error = DomainError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        RoleId::ALL
            .into_iter()
            .find(|role| role.id() == value)
            .ok_or_else(|| DomainError::InvalidRole(format!("unknown role id {value}")))
    }
}

impl From<RoleId> for i16 {
    fn from(role: RoleId) -> Self {
        role.id()
    }
}

impl FromStr for RoleId {
    type Err = DomainError;

    /// Accepts either the numeric id or the machine name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(id) = s.parse::<i16>() {
            return RoleId::try_from(id);
        }
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        RoleId::ALL
            .into_iter()
            .find(|role| role.as_str() == normalized)
            .ok_or_else(|| DomainError::InvalidRole(format!("unknown role '{s}'")))
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A set of roles allowed to perform an operation.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoleSet(u16);

impl RoleSet {
    /// Set containing every role.
    pub const ALL: RoleSet = RoleSet::of(&RoleId::ALL);

    /// Build a set from a list of roles.
    pub const fn of(roles: &[RoleId]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < roles.len() {
            bits |= roles[i].bit();
            i += 1;
        }
        Self(bits)
    }

    pub const fn contains(self, role: RoleId) -> bool {
        self.0 & role.bit() != 0
    }

    pub const fn union(self, other: RoleSet) -> Self {
        Self(self.0 | other.0)
    }

    /// Members of the set, in id order.
    pub fn roles(self) -> impl Iterator<Item = RoleId> {
        RoleId::ALL.into_iter().filter(move |role| self.contains(*role))
    }
}

impl fmt::Debug for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.roles()).finish()
    }
}

/// Developer, PlatformAdmin and OperationsAdmin.
pub const ADMINS: RoleSet = RoleSet::of(&[
    RoleId::Developer,
    RoleId::PlatformAdmin,
    RoleId::OperationsAdmin,
]);

/// Roles allowed to resolve role requests and assign roles directly.
pub const ROLE_APPROVERS: RoleSet = RoleSet::of(&[RoleId::Developer, RoleId::PlatformAdmin]);

/// Roles allowed to approve or reject shops and warehouses.
pub const BUSINESS_APPROVERS: RoleSet = RoleSet::of(&[RoleId::PlatformAdmin]);

/// Roles a user may request for themselves.
pub const SELF_REQUESTABLE: RoleSet = RoleSet::of(&[
    RoleId::Retailer,
    RoleId::Merchant,
    RoleId::Supplier,
    RoleId::Courier,
    RoleId::Customer,
]);

/// Roles that own shops.
pub const SHOP_OWNERS: RoleSet = RoleSet::of(&[RoleId::Retailer, RoleId::Merchant]);

/// Roles that own warehouses.
pub const WAREHOUSE_OWNERS: RoleSet = RoleSet::of(&[RoleId::Supplier]);

/// Any role that owns a business and sells products.
pub const SELLERS: RoleSet = SHOP_OWNERS.union(WAREHOUSE_OWNERS);

/// Roles that move orders through fulfillment.
pub const FULFILLERS: RoleSet = RoleSet::of(&[RoleId::Courier, RoleId::OperationsAdmin]);

/// Roles that buy.
pub const BUYERS: RoleSet = RoleSet::of(&[RoleId::Customer]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_ids_round_trip_through_integers() {
        for role in RoleId::ALL {
            assert_eq!(RoleId::try_from(role.id()).unwrap(), role);
        }
        assert!(RoleId::try_from(0).is_err());
        assert!(RoleId::try_from(9).is_err());
    }

    #[test]
    fn parses_names_and_numbers() {
        assert_eq!("4".parse::<RoleId>().unwrap(), RoleId::Retailer);
        assert_eq!("platform-admin".parse::<RoleId>().unwrap(), RoleId::PlatformAdmin);
        assert_eq!("Courier".parse::<RoleId>().unwrap(), RoleId::Courier);
        assert!("superuser".parse::<RoleId>().is_err());
    }

    #[test]
    fn serializes_as_number() {
        let json = serde_json::to_string(&RoleId::Supplier).unwrap();
        assert_eq!(json, "6");
        let role: RoleId = serde_json::from_str("7").unwrap();
        assert_eq!(role, RoleId::Courier);
        assert!(serde_json::from_str::<RoleId>("42").is_err());
    }

    #[test]
    fn admin_roles() {
        let admins: Vec<_> = ADMINS.roles().collect();
        assert_eq!(
            admins,
            vec![RoleId::Developer, RoleId::PlatformAdmin, RoleId::OperationsAdmin]
        );
        assert!(!RoleId::Retailer.is_admin());
        assert!(!RoleId::Courier.is_admin());
    }

    #[test]
    fn privileged_roles_are_never_self_requestable() {
        for role in ADMINS.roles() {
            assert!(!role.is_self_requestable());
        }
        assert!(RoleId::Retailer.is_self_requestable());
        assert!(RoleId::Customer.is_self_requestable());
    }

    #[test]
    fn set_membership() {
        assert!(SELLERS.contains(RoleId::Supplier));
        assert!(SELLERS.contains(RoleId::Merchant));
        assert!(!SELLERS.contains(RoleId::Customer));
        assert!(FULFILLERS.contains(RoleId::OperationsAdmin));
        assert!(!FULFILLERS.contains(RoleId::PlatformAdmin));
        assert_eq!(RoleSet::ALL.roles().count(), 8);
    }
}
