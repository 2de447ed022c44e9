//! Infrastructure layer - External systems integration
//!
//! - PostgreSQL connection, migrations and repositories (SeaORM)
//! - In-memory store for tests and `serve --in-memory`
//! - Unit of Work giving services one handle on every repository

pub mod db;
pub mod memory;
pub mod repositories;
pub mod unit_of_work;

pub use db::{Database, Migrator};
pub use memory::MemoryStore;
pub use repositories::{
    BusinessFilter, BusinessRepository, CartRepository, OrderFilter, OrderRepository,
    ProductRepository, RoleRequestRepository, UserRepository,
};
pub use unit_of_work::{Persistence, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{
    MockBusinessRepository, MockCartRepository, MockOrderRepository, MockProductRepository,
    MockRoleRequestRepository, MockUserRepository,
};
