//! Application services layer - Use cases and business logic.
//!
//! Services take the caller's [`Identity`] explicitly, pass it through the
//! authorization gate, then delegate to the domain and the Unit of Work.

mod auth_service;
mod business_service;
mod cart_service;
mod catalog_service;
mod checkout_service;
pub mod container;
mod order_service;
mod role_request_service;
mod user_service;

use common::AppResult;
use domain::{authorize, Identity, RoleSet};
use uuid::Uuid;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use auth_service::{AuthService, Authenticator, Claims, TokenResponse};
pub use business_service::{BusinessManager, BusinessService};
pub use cart_service::{CartManager, CartService};
pub use catalog_service::{Catalog, CatalogService};
pub use checkout_service::{CheckoutDesk, CheckoutService};
pub use order_service::{OrderDesk, OrderService};
pub use role_request_service::{RoleRequestDesk, RoleRequestService};
pub use user_service::{UserManager, UserService};

/// Run the authorization gate, logging refusals.
pub(crate) fn guard(
    identity: &Identity,
    allowed: RoleSet,
    owner: Option<Uuid>,
    action: &'static str,
) -> AppResult<()> {
    authorize(identity, allowed, owner).map_err(|err| {
        tracing::warn!(
            user_id = %identity.user_id,
            role = %identity.role,
            action,
            reason = %err,
            "Access denied"
        );
        err.into()
    })
}
