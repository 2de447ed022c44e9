//! HTTP request handlers.

pub mod auth_handler;
pub mod cart_handler;
pub mod marketplace_handler;
pub mod order_handler;
pub mod product_handler;
pub mod role_handler;
pub mod shop_handler;
pub mod user_handler;

pub use auth_handler::{public_auth_routes, session_routes};
pub use cart_handler::cart_routes;
pub use marketplace_handler::marketplace_routes;
pub use order_handler::order_routes;
pub use product_handler::product_routes;
pub use role_handler::role_routes;
pub use shop_handler::shop_routes;
pub use user_handler::user_routes;
