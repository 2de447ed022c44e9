//! Shared request and response helpers for handlers.

mod query;
mod response;

pub use query::{parse_optional, KindQuery, StatusQuery};
pub use response::{Created, MessageResponse, NoContent};
