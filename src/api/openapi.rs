//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    auth_handler, cart_handler, marketplace_handler, order_handler, product_handler,
    role_handler, shop_handler, user_handler,
};
use crate::services::TokenResponse;
use crate::types::MessageResponse;
use domain::{
    Business, BusinessKind, BusinessStatus, CartItem, Identity, Order, OrderLine, OrderStatus,
    Product, RequestStatus, RoleRequest, StockShortfall, UserResponse,
};

/// OpenAPI documentation for the marketplace API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Marketplace API",
        version = "0.1.0",
        description = "Role-based marketplace: shop approval, stock and order fulfillment",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development server")
    ),
    paths(
        // Authentication
        auth_handler::register,
        auth_handler::login,
        auth_handler::logout,
        auth_handler::verify,
        // Roles
        role_handler::submit_request,
        role_handler::my_requests,
        role_handler::list_requests,
        role_handler::approve_request,
        role_handler::reject_request,
        // Users
        user_handler::list_users,
        user_handler::get_user,
        user_handler::set_role,
        // Shops and warehouses
        shop_handler::create_shop,
        shop_handler::create_warehouse,
        shop_handler::list_shops,
        shop_handler::get_shop,
        shop_handler::list_shop_products,
        shop_handler::approve_shop,
        shop_handler::reject_shop,
        shop_handler::suspend_shop,
        shop_handler::delete_shop,
        // Products
        product_handler::create_product,
        product_handler::restock,
        // Cart
        cart_handler::list_cart,
        cart_handler::add_to_cart,
        cart_handler::set_quantity,
        cart_handler::remove_from_cart,
        // Orders
        order_handler::create_order,
        order_handler::list_orders,
        order_handler::get_order,
        order_handler::update_status,
        order_handler::checkout,
        // Marketplace
        marketplace_handler::list_shops,
        marketplace_handler::list_products,
    ),
    components(
        schemas(
            // Domain types
            Identity,
            UserResponse,
            RoleRequest,
            RequestStatus,
            Business,
            BusinessKind,
            BusinessStatus,
            Product,
            CartItem,
            OrderLine,
            Order,
            OrderStatus,
            StockShortfall,
            // Request and response bodies
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            auth_handler::VerifyResponse,
            TokenResponse,
            MessageResponse,
            role_handler::SubmitRoleRequest,
            user_handler::SetRoleRequest,
            shop_handler::CreateBusinessRequest,
            product_handler::CreateProductRequest,
            product_handler::RestockRequest,
            cart_handler::AddToCartRequest,
            cart_handler::CartQuantityRequest,
            order_handler::CreateOrderRequest,
            order_handler::UpdateOrderStatusRequest,
            order_handler::CheckoutRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login and sessions"),
        (name = "Roles", description = "Role change requests and approvals"),
        (name = "Users", description = "User administration"),
        (name = "Shops", description = "Shop and warehouse lifecycle"),
        (name = "Products", description = "Seller product management"),
        (name = "Cart", description = "Shopping cart"),
        (name = "Orders", description = "Orders, checkout and fulfillment"),
        (name = "Marketplace", description = "Public listing")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT from /auth/login; the session cookie works too"))
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_auth_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/auth/register",
            "/auth/role/approve/{id}",
            "/auth/shops/{id}/suspend",
            "/auth/checkout",
            "/marketplace/products",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
