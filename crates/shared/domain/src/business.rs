//! Shops and warehouses.
//!
//! Both are seller-owned business entities that go live through the same
//! admin approval lifecycle:
//!
//! ```text
//! Pending ──approve──▶ Active ──suspend──▶ Suspended
//!    │
//!    └────reject────▶ Rejected
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::MAX_NAME_LENGTH;
use crate::error::{DomainError, DomainResult};
use crate::role::{RoleSet, SHOP_OWNERS, WAREHOUSE_OWNERS};

/// Kind of business entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum BusinessKind {
    Shop,
    Warehouse,
}

impl BusinessKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            BusinessKind::Shop => "shop",
            BusinessKind::Warehouse => "warehouse",
        }
    }

    /// Roles allowed to own this kind of entity.
    pub const fn owner_roles(self) -> RoleSet {
        match self {
            BusinessKind::Shop => SHOP_OWNERS,
            BusinessKind::Warehouse => WAREHOUSE_OWNERS,
        }
    }

    /// Warehouses are limited to one live entity per owner.
    pub const fn single_per_owner(self) -> bool {
        matches!(self, BusinessKind::Warehouse)
    }
}

impl fmt::Display for BusinessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BusinessKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shop" => Ok(BusinessKind::Shop),
            "warehouse" => Ok(BusinessKind::Warehouse),
            other => Err(DomainError::validation(format!("unknown business kind '{other}'"))),
        }
    }
}

/// Approval status of a shop or warehouse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum BusinessStatus {
    Pending,
    Active,
    Suspended,
    Rejected,
}

impl BusinessStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            BusinessStatus::Pending => "pending",
            BusinessStatus::Active => "active",
            BusinessStatus::Suspended => "suspended",
            BusinessStatus::Rejected => "rejected",
        }
    }

    /// Only active entities and their products appear in marketplace listings.
    pub const fn is_listed(self) -> bool {
        matches!(self, BusinessStatus::Active)
    }
}

impl fmt::Display for BusinessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BusinessStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BusinessStatus::Pending),
            "active" => Ok(BusinessStatus::Active),
            "suspended" => Ok(BusinessStatus::Suspended),
            "rejected" => Ok(BusinessStatus::Rejected),
            other => Err(DomainError::validation(format!("unknown business status '{other}'"))),
        }
    }
}

/// Admin action on a business entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusinessAction {
    Approve,
    Reject,
    Suspend,
}

impl BusinessAction {
    /// Transition table: the single source state and the target state.
    pub const fn transition(self) -> (BusinessStatus, BusinessStatus) {
        match self {
            BusinessAction::Approve => (BusinessStatus::Pending, BusinessStatus::Active),
            BusinessAction::Reject => (BusinessStatus::Pending, BusinessStatus::Rejected),
            BusinessAction::Suspend => (BusinessStatus::Active, BusinessStatus::Suspended),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            BusinessAction::Approve => "approve",
            BusinessAction::Reject => "reject",
            BusinessAction::Suspend => "suspend",
        }
    }

    /// Target status if the action is legal from `current`.
    ///
    /// # Errors
    /// `InvalidTransition` when `current` is not the action's source state.
    pub fn apply_to(self, current: BusinessStatus) -> DomainResult<BusinessStatus> {
        let (from, to) = self.transition();
        if current == from {
            Ok(to)
        } else {
            Err(DomainError::invalid_transition("business", current, to))
        }
    }
}

/// A shop or warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Business {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub kind: BusinessKind,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub status: BusinessStatus,
    /// Admin who last changed the status
    pub admin_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Business {
    /// New entity awaiting approval.
    pub fn new(owner_id: Uuid, details: NewBusiness) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            kind: details.kind,
            name: details.name,
            category: details.category,
            description: details.description,
            status: BusinessStatus::Pending,
            admin_id: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Visible in marketplace listings.
    pub fn is_listed(&self) -> bool {
        !self.is_deleted() && self.status.is_listed()
    }

    /// Apply an admin action, recording the acting admin.
    pub fn apply(&mut self, action: BusinessAction, admin_id: Uuid) -> DomainResult<()> {
        self.status = action.apply_to(self.status)?;
        self.admin_id = Some(admin_id);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Check that the owner may delete this entity.
    ///
    /// # Errors
    /// `Conflict` while active; it must be suspended or rejected first.
    pub fn ensure_deletable(&self) -> DomainResult<()> {
        if self.status == BusinessStatus::Active {
            return Err(DomainError::conflict(format!(
                "Active {} must be suspended before it can be deleted",
                self.kind
            )));
        }
        Ok(())
    }

    pub fn soft_delete(&mut self) -> DomainResult<()> {
        self.ensure_deletable()?;
        let now = Utc::now();
        self.deleted_at = Some(now);
        self.updated_at = now;
        Ok(())
    }
}

/// Owner-supplied details of a new shop or warehouse.
#[derive(Debug, Clone)]
pub struct NewBusiness {
    pub kind: BusinessKind,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
}

impl NewBusiness {
    pub fn validate(&self) -> DomainResult<()> {
        let name = self.name.trim();
        if name.is_empty() || name.chars().count() > MAX_NAME_LENGTH {
            return Err(DomainError::validation(format!(
                "Name must be between 1 and {MAX_NAME_LENGTH} characters"
            )));
        }
        if self.category.trim().is_empty() {
            return Err(DomainError::validation("Category is required"));
        }
        Ok(())
    }
}
