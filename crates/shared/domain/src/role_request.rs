//! Role escalation requests.
//!
//! A request starts `Pending` and is resolved once, by an approver, to
//! `Approved` or `Rejected`. Resolved requests never change again.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::role::RoleId;

/// Lifecycle state of a role request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "approved" => Ok(RequestStatus::Approved),
            "rejected" => Ok(RequestStatus::Rejected),
            other => Err(DomainError::validation(format!("unknown request status '{other}'"))),
        }
    }
}

/// Approver's decision on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    /// Terminal status this decision produces.
    pub const fn outcome(self) -> RequestStatus {
        match self {
            Decision::Approve => RequestStatus::Approved,
            Decision::Reject => RequestStatus::Rejected,
        }
    }
}

/// A user's request to change role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RoleRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    #[cfg_attr(feature = "openapi", schema(value_type = i16, example = 4))]
    pub requested_role: RoleId,
    pub status: RequestStatus,
    /// Approver who resolved the request
    pub admin_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RoleRequest {
    /// Open a new pending request after checking the requested role.
    ///
    /// # Errors
    /// `InvalidRole` if the role is privileged; `Validation` if the user
    /// already holds it.
    pub fn open(user_id: Uuid, current_role: RoleId, requested_role: RoleId) -> DomainResult<Self> {
        if !requested_role.is_self_requestable() {
            return Err(DomainError::InvalidRole(format!(
                "'{requested_role}' cannot be requested"
            )));
        }
        if requested_role == current_role {
            return Err(DomainError::validation(format!(
                "User already has role '{requested_role}'"
            )));
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            requested_role,
            status: RequestStatus::Pending,
            admin_id: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    /// Apply an approver's decision.
    ///
    /// # Errors
    /// `AlreadyResolved` if the request is no longer pending.
    pub fn resolve(&mut self, decision: Decision, admin_id: Uuid) -> DomainResult<()> {
        if self.status.is_terminal() {
            return Err(DomainError::AlreadyResolved("Role request".to_string()));
        }
        self.status = decision.outcome();
        self.admin_id = Some(admin_id);
        self.updated_at = Utc::now();
        Ok(())
    }
}
