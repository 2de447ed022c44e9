//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.
//! Enumerated columns are stored as text (role as its numeric id) and
//! parsed back into domain types on load.

pub mod business;
pub mod cart_item;
pub mod order;
pub mod product;
pub mod role_request;
pub mod user;
