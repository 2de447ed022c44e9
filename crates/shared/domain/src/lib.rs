//! Domain layer - Core marketplace entities, roles and lifecycle rules.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.
//! Every state machine transition and authorization decision lives here so
//! the storage backends only have to make them atomic.

pub mod access;
pub mod business;
pub mod cart;
pub mod constants;
pub mod error;
pub mod order;
pub mod password;
pub mod product;
pub mod role;
pub mod role_request;
pub mod user;

pub use access::{authorize, AccessDenied, Identity};
pub use business::{Business, BusinessAction, BusinessKind, BusinessStatus, NewBusiness};
pub use cart::{merge_lines, validate_quantity, CartItem, OrderLine};
pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use order::{Order, OrderStatus, StockShortfall};
pub use password::Password;
pub use product::{NewProduct, Product};
pub use role::{RoleId, RoleSet};
pub use role_request::{Decision, RequestStatus, RoleRequest};
pub use user::{validate_username, NewUser, User, UserResponse};
