//! Repository layer - Data access abstraction
//!
//! One repository per aggregate. Each trait has a SeaORM implementation here
//! and an in-memory one in [`crate::infra::memory`].

mod business_repository;
mod cart_repository;
pub(crate) mod entities;
mod order_repository;
mod product_repository;
mod role_request_repository;
mod user_repository;

pub use business_repository::{
    BusinessFilter, BusinessRepository, BusinessStore, CONCURRENT_MODIFICATION, WAREHOUSE_EXISTS,
};
pub use cart_repository::{CartRepository, CartStore};
pub use order_repository::{OrderFilter, OrderRepository, OrderStore};
pub use product_repository::{ProductRepository, ProductStore};
pub use role_request_repository::{
    RoleRequestRepository, RoleRequestStore, PENDING_REQUEST_EXISTS,
};
pub use user_repository::{UserRepository, UserStore, USERNAME_TAKEN};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use business_repository::MockBusinessRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use cart_repository::MockCartRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use order_repository::MockOrderRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use product_repository::MockProductRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use role_request_repository::MockRoleRequestRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
