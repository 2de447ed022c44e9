//! Caller identity and the role authorization gate.
//!
//! The session verifier turns a bearer credential into an [`Identity`],
//! which is passed explicitly into every operation. [`authorize`] is the only
//! place role membership and resource ownership are decided.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::role::{RoleId, RoleSet};

/// Authenticated caller resolved from a bearer credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// User id
    pub user_id: Uuid,
    /// Login name
    pub username: String,
    /// Current role id (1-8)
    #[cfg_attr(feature = "openapi", schema(value_type = i16, example = 8))]
    pub role: RoleId,
}

impl Identity {
    pub fn new(user_id: Uuid, username: impl Into<String>, role: RoleId) -> Self {
        Self {
            user_id,
            username: username.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Whether this identity owns (or, as an admin, may act for) `owner_id`.
    pub fn acts_for(&self, owner_id: Uuid) -> bool {
        self.user_id == owner_id || self.is_admin()
    }
}

/// Reason the authorization gate refused an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDenied {
    /// Caller's role is not in the allowed set
    NotInRole(RoleId),
    /// Caller does not own the resource and is not an admin
    NotOwner,
}

impl fmt::Display for AccessDenied {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessDenied::NotInRole(role) => write!(f, "role '{role}' may not perform this action"),
            AccessDenied::NotOwner => f.write_str("resource belongs to another user"),
        }
    }
}

impl From<AccessDenied> for DomainError {
    fn from(reason: AccessDenied) -> Self {
        DomainError::Forbidden(reason)
    }
}

/// Decide whether `identity` may act on a resource.
///
/// The role check always applies. When `owner` is given, the caller must be
/// that owner unless they hold an admin role.
pub fn authorize(identity: &Identity, allowed: RoleSet, owner: Option<Uuid>) -> DomainResult<()> {
    if !allowed.contains(identity.role) {
        return Err(AccessDenied::NotInRole(identity.role).into());
    }
    match owner {
        Some(owner_id) if !identity.acts_for(owner_id) => Err(AccessDenied::NotOwner.into()),
        _ => Ok(()),
    }
}
