//! Marketplace backend.
//!
//! Users hold exactly one of eight roles. Customers ask for seller or
//! courier roles through reviewed role requests; sellers open shops and
//! warehouses that an admin must approve before their products are listed;
//! buyers order products, and stock is taken atomically so concurrent
//! orders can never oversell.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **services**: Use cases, each behind the role gate
//! - **infra**: Repositories (PostgreSQL via SeaORM, or in memory)
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared request/response helpers
//!
//! Entities, lifecycle rules and the authorization gate live in the
//! `domain` crate; `AppError` and the shared config structs in `common`.
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server against an in-memory store
//! cargo run -- serve --in-memory
//!
//! # Run migrations
//! cargo run -- migrate up
//!
//! # Bootstrap the first approver
//! cargo run -- create-admin --username root --password 'change-me-please'
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::{create_router, AppState};
pub use common::{AppError, AppResult};
pub use config::Config;
pub use infra::{MemoryStore, Persistence, UnitOfWork};
pub use services::Services;
