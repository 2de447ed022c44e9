//! End-to-end workflows against the in-memory store.
//!
//! Every test builds the full service graph on a fresh `MemoryStore`, so
//! role checks, lifecycle rules and stock accounting run exactly as they
//! do behind the HTTP layer.

use std::sync::Arc;

use marketplace_core::config::Config;
use marketplace_core::infra::MemoryStore;
use marketplace_core::services::{
    AuthService, BusinessService, CartService, CatalogService, CheckoutService, OrderService,
    RoleRequestService, ServiceContainer, Services, UserService,
};
use marketplace_core::AppError;

use domain::{
    BusinessKind, BusinessStatus, Identity, NewBusiness, NewProduct, OrderLine, OrderStatus,
    Product, RequestStatus, RoleId,
};
use tokio_test::{assert_err, assert_ok};
use uuid::Uuid;

const PASSWORD: &str = "correct-horse-battery";

fn services() -> Services {
    let config = Config::with_secret("k".repeat(48)).expect("valid config");
    Services::from_uow(Arc::new(MemoryStore::new()), config)
}

async fn account(services: &Services, username: &str, role: RoleId) -> Identity {
    let user = services
        .auth()
        .create_account(username.to_string(), PASSWORD.to_string(), role)
        .await
        .expect("account created");
    Identity::new(user.id, user.username, user.role)
}

fn shop_details(kind: BusinessKind, name: &str) -> NewBusiness {
    NewBusiness {
        kind,
        name: name.to_string(),
        category: "general".to_string(),
        description: None,
    }
}

fn product_details(name: &str, price: i64, stock: i32) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        description: None,
        price,
        stock,
    }
}

/// A retailer with an approved shop and one product in it.
struct Storefront {
    retailer: Identity,
    admin: Identity,
    shop_id: Uuid,
    product: Product,
}

async fn storefront(services: &Services, stock: i32) -> Storefront {
    let retailer = account(services, "retailer", RoleId::Retailer).await;
    let admin = account(services, "platform", RoleId::PlatformAdmin).await;

    let shop = services
        .businesses()
        .create(&retailer, shop_details(BusinessKind::Shop, "Corner Grocer"))
        .await
        .unwrap();
    services.businesses().approve(&admin, shop.id).await.unwrap();

    let product = services
        .catalog()
        .create_product(&retailer, shop.id, product_details("Olive oil", 1299, stock))
        .await
        .unwrap();

    Storefront {
        retailer,
        admin,
        shop_id: shop.id,
        product,
    }
}

async fn stock_of(services: &Services, seller: &Identity, shop_id: Uuid, product_id: Uuid) -> i32 {
    services
        .catalog()
        .list_for_business(seller, shop_id)
        .await
        .unwrap()
        .into_iter()
        .find(|p| p.id == product_id)
        .map(|p| p.stock)
        .expect("product listed for its owner")
}

// =============================================================================
// Role requests
// =============================================================================

#[tokio::test]
async fn second_pending_request_conflicts() {
    let services = services();
    let customer = account(&services, "casey", RoleId::Customer).await;

    assert_ok!(services.role_requests().submit(&customer, RoleId::Retailer).await);
    let err = services
        .role_requests()
        .submit(&customer, RoleId::Retailer)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)), "got {err:?}");
    assert_eq!(services.role_requests().list_mine(&customer).await.unwrap().len(), 1);
}

#[tokio::test]
async fn approval_grants_role_and_cannot_repeat() {
    let services = services();
    let customer = account(&services, "casey", RoleId::Customer).await;
    let approver = account(&services, "dev", RoleId::Developer).await;

    let request = services
        .role_requests()
        .submit(&customer, RoleId::Supplier)
        .await
        .unwrap();
    let approved = services
        .role_requests()
        .approve(&approver, request.id)
        .await
        .unwrap();
    assert_eq!(approved.status, RequestStatus::Approved);
    assert_eq!(approved.admin_id, Some(approver.user_id));

    let user = services.users().get_user(&approver, customer.user_id).await.unwrap();
    assert_eq!(user.role, RoleId::Supplier);

    let again = services.role_requests().reject(&approver, request.id).await;
    assert!(matches!(again, Err(AppError::Conflict(_))), "got {again:?}");
}

#[tokio::test]
async fn privileged_roles_cannot_be_requested() {
    let services = services();
    let customer = account(&services, "casey", RoleId::Customer).await;

    let err = services
        .role_requests()
        .submit(&customer, RoleId::PlatformAdmin)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)), "got {err:?}");
    assert!(services.role_requests().list_mine(&customer).await.unwrap().is_empty());
}

#[tokio::test]
async fn operations_admin_cannot_resolve_role_requests() {
    let services = services();
    let customer = account(&services, "casey", RoleId::Customer).await;
    let ops = account(&services, "ops", RoleId::OperationsAdmin).await;

    let request = services
        .role_requests()
        .submit(&customer, RoleId::Courier)
        .await
        .unwrap();
    let err = services.role_requests().approve(&ops, request.id).await.unwrap_err();

    assert!(matches!(err, AppError::Forbidden(_)), "got {err:?}");
    let user = services.users().get_user(&customer, customer.user_id).await.unwrap();
    assert_eq!(user.role, RoleId::Customer);
}

#[tokio::test]
async fn rejection_keeps_role_and_allows_resubmission() {
    let services = services();
    let customer = account(&services, "casey", RoleId::Customer).await;
    let approver = account(&services, "platform", RoleId::PlatformAdmin).await;

    let request = services
        .role_requests()
        .submit(&customer, RoleId::Merchant)
        .await
        .unwrap();
    let rejected = services
        .role_requests()
        .reject(&approver, request.id)
        .await
        .unwrap();
    assert_eq!(rejected.status, RequestStatus::Rejected);
    assert_eq!(rejected.admin_id, Some(approver.user_id));

    let user = services.users().get_user(&customer, customer.user_id).await.unwrap();
    assert_eq!(user.role, RoleId::Customer);

    let again = services
        .role_requests()
        .submit(&customer, RoleId::Merchant)
        .await
        .unwrap();
    assert_eq!(again.status, RequestStatus::Pending);
    assert_eq!(services.role_requests().list_mine(&customer).await.unwrap().len(), 2);
}

// =============================================================================
// Users
// =============================================================================

#[tokio::test]
async fn role_approvers_can_set_roles_directly() {
    let services = services();
    let customer = account(&services, "casey", RoleId::Customer).await;
    let developer = account(&services, "dev", RoleId::Developer).await;
    let platform = account(&services, "platform", RoleId::PlatformAdmin).await;

    let user = services
        .users()
        .set_role(&developer, customer.user_id, RoleId::Courier)
        .await
        .unwrap();
    assert_eq!(user.role, RoleId::Courier);

    let user = services
        .users()
        .set_role(&platform, customer.user_id, RoleId::OperationsAdmin)
        .await
        .unwrap();
    assert_eq!(user.role, RoleId::OperationsAdmin);
}

#[tokio::test]
async fn set_role_is_refused_to_operations_admin_and_needs_a_user() {
    let services = services();
    let customer = account(&services, "casey", RoleId::Customer).await;
    let ops = account(&services, "ops", RoleId::OperationsAdmin).await;
    let developer = account(&services, "dev", RoleId::Developer).await;

    let err = services
        .users()
        .set_role(&ops, customer.user_id, RoleId::Retailer)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)), "got {err:?}");
    let user = services.users().get_user(&customer, customer.user_id).await.unwrap();
    assert_eq!(user.role, RoleId::Customer);

    let missing = services
        .users()
        .set_role(&developer, Uuid::new_v4(), RoleId::Retailer)
        .await;
    assert!(matches!(missing, Err(AppError::NotFound(_))), "got {missing:?}");
}

// =============================================================================
// Shops and warehouses
// =============================================================================

#[tokio::test]
async fn non_admin_cannot_approve_shop() {
    let services = services();
    let retailer = account(&services, "retailer", RoleId::Retailer).await;
    let courier = account(&services, "courier", RoleId::Courier).await;

    let shop = services
        .businesses()
        .create(&retailer, shop_details(BusinessKind::Shop, "Stall"))
        .await
        .unwrap();
    let err = services.businesses().approve(&courier, shop.id).await.unwrap_err();

    assert!(matches!(err, AppError::Forbidden(_)), "got {err:?}");
    let stored = services.businesses().get(&retailer, shop.id).await.unwrap();
    assert_eq!(stored.status, BusinessStatus::Pending);
}

#[tokio::test]
async fn customers_cannot_open_shops() {
    let services = services();
    let customer = account(&services, "casey", RoleId::Customer).await;

    let result = services
        .businesses()
        .create(&customer, shop_details(BusinessKind::Shop, "Nope"))
        .await;
    assert!(matches!(result, Err(AppError::Forbidden(_))), "got {result:?}");
}

#[tokio::test]
async fn supplier_owns_at_most_one_warehouse() {
    let services = services();
    let supplier = account(&services, "supplier", RoleId::Supplier).await;

    let first = services
        .businesses()
        .create(&supplier, shop_details(BusinessKind::Warehouse, "North"))
        .await
        .unwrap();
    let second = services
        .businesses()
        .create(&supplier, shop_details(BusinessKind::Warehouse, "South"))
        .await;
    assert!(matches!(second, Err(AppError::Conflict(_))), "got {second:?}");

    // A deleted warehouse frees the slot
    assert_ok!(services.businesses().delete(&supplier, first.id).await);
    assert_ok!(
        services
            .businesses()
            .create(&supplier, shop_details(BusinessKind::Warehouse, "South"))
            .await
    );
}

#[tokio::test]
async fn active_shop_cannot_be_deleted() {
    let services = services();
    let front = storefront(&services, 3).await;

    let err = services
        .businesses()
        .delete(&front.retailer, front.shop_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)), "got {err:?}");
}

#[tokio::test]
async fn approving_twice_is_an_invalid_transition() {
    let services = services();
    let front = storefront(&services, 3).await;

    let err = services
        .businesses()
        .approve(&front.admin, front.shop_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)), "got {err:?}");
}

#[tokio::test]
async fn suspension_hides_shop_and_products() {
    let services = services();
    let front = storefront(&services, 3).await;
    let customer = account(&services, "casey", RoleId::Customer).await;

    assert_eq!(services.catalog().list_listed().await.unwrap().len(), 1);

    let suspended = services
        .businesses()
        .suspend(&front.admin, front.shop_id)
        .await
        .unwrap();
    assert_eq!(suspended.status, BusinessStatus::Suspended);

    assert!(services.catalog().list_listed().await.unwrap().is_empty());
    assert!(services.businesses().list_listed(None).await.unwrap().is_empty());

    let err = services
        .orders()
        .create(&customer, front.product.id, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "got {err:?}");
}

#[tokio::test]
async fn sellers_only_see_their_own_businesses() {
    let services = services();
    let front = storefront(&services, 3).await;
    let other = account(&services, "merchant", RoleId::Merchant).await;

    assert!(services.businesses().list(&other, None).await.unwrap().is_empty());
    assert_eq!(services.businesses().list(&front.admin, None).await.unwrap().len(), 1);

    let err = services.businesses().get(&other, front.shop_id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)), "got {err:?}");
}

// =============================================================================
// Orders
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_orders_never_oversell() {
    let services = services();
    let front = storefront(&services, 5).await;
    let alice = account(&services, "alice", RoleId::Customer).await;
    let bob = account(&services, "bob", RoleId::Customer).await;

    let orders = services.orders();
    let product_id = front.product.id;
    let (first, second) = tokio::join!(
        {
            let orders = orders.clone();
            tokio::spawn(async move { orders.create(&alice, product_id, 3).await })
        },
        {
            let orders = orders.clone();
            tokio::spawn(async move { orders.create(&bob, product_id, 3).await })
        },
    );
    let results = [first.unwrap(), second.unwrap()];

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    let failure = results.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert!(matches!(failure, AppError::InsufficientStock(_)), "got {failure:?}");

    let stock = stock_of(&services, &front.retailer, front.shop_id, product_id).await;
    assert_eq!(stock, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn many_buyers_share_limited_stock() {
    let services = services();
    let front = storefront(&services, 5).await;
    let orders = services.orders();

    let attempts = (0..12).map(|n| {
        let orders = orders.clone();
        let buyer = Identity::new(Uuid::new_v4(), format!("buyer{n}"), RoleId::Customer);
        let product_id = front.product.id;
        tokio::spawn(async move { orders.create(&buyer, product_id, 1).await })
    });
    let results = futures::future::join_all(attempts).await;

    let placed = results
        .into_iter()
        .map(|joined| joined.unwrap())
        .filter(Result::is_ok)
        .count();
    assert_eq!(placed, 5);
    assert_eq!(
        stock_of(&services, &front.retailer, front.shop_id, front.product.id).await,
        0
    );
}

#[tokio::test]
async fn order_status_only_moves_one_step_forward() {
    let services = services();
    let front = storefront(&services, 5).await;
    let customer = account(&services, "casey", RoleId::Customer).await;
    let courier = account(&services, "courier", RoleId::Courier).await;

    let order = services
        .orders()
        .create(&customer, front.product.id, 1)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Processing);
    assert_eq!(order.total, 1299);

    let skipped = services
        .orders()
        .advance(&courier, order.id, OrderStatus::Delivered)
        .await
        .unwrap_err();
    assert!(matches!(skipped, AppError::InvalidTransition(_)), "got {skipped:?}");
    let unchanged = services.orders().get(&customer, order.id).await.unwrap();
    assert_eq!(unchanged.status, OrderStatus::Processing);

    let shipped = services
        .orders()
        .advance(&courier, order.id, OrderStatus::Shipped)
        .await
        .unwrap();
    assert_eq!(shipped.status, OrderStatus::Shipped);
    let delivered = services
        .orders()
        .advance(&courier, order.id, OrderStatus::Delivered)
        .await
        .unwrap();
    assert_eq!(delivered.status, OrderStatus::Delivered);

    assert_err!(
        services
            .orders()
            .advance(&courier, order.id, OrderStatus::Shipped)
            .await
    );
}

#[tokio::test]
async fn buyers_cannot_advance_orders() {
    let services = services();
    let front = storefront(&services, 5).await;
    let customer = account(&services, "casey", RoleId::Customer).await;

    let order = services
        .orders()
        .create(&customer, front.product.id, 1)
        .await
        .unwrap();
    let err = services
        .orders()
        .advance(&customer, order.id, OrderStatus::Shipped)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)), "got {err:?}");
}

#[tokio::test]
async fn order_visibility_follows_role() {
    let services = services();
    let front = storefront(&services, 5).await;
    let alice = account(&services, "alice", RoleId::Customer).await;
    let bob = account(&services, "bob", RoleId::Customer).await;
    let courier = account(&services, "courier", RoleId::Courier).await;

    let order = services
        .orders()
        .create(&alice, front.product.id, 2)
        .await
        .unwrap();

    assert_eq!(services.orders().list(&alice).await.unwrap().len(), 1);
    assert!(services.orders().list(&bob).await.unwrap().is_empty());
    assert_eq!(services.orders().list(&courier).await.unwrap().len(), 1);
    assert_eq!(services.orders().list(&front.retailer).await.unwrap().len(), 1);

    assert_ok!(services.orders().get(&front.retailer, order.id).await);
    let err = services.orders().get(&bob, order.id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)), "got {err:?}");
}

// =============================================================================
// Cart and checkout
// =============================================================================

#[tokio::test]
async fn checkout_is_all_or_nothing() {
    let services = services();
    let front = storefront(&services, 10).await;
    let scarce = services
        .catalog()
        .create_product(&front.retailer, front.shop_id, product_details("Saffron", 900, 5))
        .await
        .unwrap();
    let customer = account(&services, "casey", RoleId::Customer).await;

    services.carts().add(&customer, front.product.id, 2).await.unwrap();
    services.carts().add(&customer, scarce.id, 999).await.unwrap();

    let err = services.checkout().checkout(&customer, None).await.unwrap_err();
    match err {
        AppError::InsufficientStock(shortfalls) => {
            assert_eq!(shortfalls.len(), 1);
            assert_eq!(shortfalls[0].product_id, scarce.id);
            assert_eq!(shortfalls[0].requested, 999);
            assert_eq!(shortfalls[0].available, 5);
        }
        other => panic!("expected insufficient stock, got {other:?}"),
    }

    assert!(services.orders().list(&customer).await.unwrap().is_empty());
    assert_eq!(
        stock_of(&services, &front.retailer, front.shop_id, front.product.id).await,
        10
    );
    assert_eq!(services.carts().list(&customer).await.unwrap().len(), 2);
}

#[tokio::test]
async fn checkout_turns_cart_into_orders() {
    let services = services();
    let front = storefront(&services, 10).await;
    let customer = account(&services, "casey", RoleId::Customer).await;

    services.carts().add(&customer, front.product.id, 1).await.unwrap();
    services.carts().add(&customer, front.product.id, 2).await.unwrap();

    let orders = services.checkout().checkout(&customer, None).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].quantity, 3);
    assert_eq!(orders[0].total, 3 * 1299);

    assert!(services.carts().list(&customer).await.unwrap().is_empty());
    assert_eq!(
        stock_of(&services, &front.retailer, front.shop_id, front.product.id).await,
        7
    );
}

#[tokio::test]
async fn explicit_items_merge_duplicate_lines() {
    let services = services();
    let front = storefront(&services, 4).await;
    let customer = account(&services, "casey", RoleId::Customer).await;

    let items = vec![
        OrderLine::new(front.product.id, 2),
        OrderLine::new(front.product.id, 3),
    ];
    let err = services
        .checkout()
        .checkout(&customer, Some(items))
        .await
        .unwrap_err();
    match err {
        AppError::InsufficientStock(shortfalls) => assert_eq!(shortfalls[0].requested, 5),
        other => panic!("expected insufficient stock, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_cart_checkout_is_rejected() {
    let services = services();
    let customer = account(&services, "casey", RoleId::Customer).await;

    let err = services.checkout().checkout(&customer, None).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)), "got {err:?}");
}

#[tokio::test]
async fn cart_lines_can_be_changed_and_removed() {
    let services = services();
    let front = storefront(&services, 4).await;
    let customer = account(&services, "casey", RoleId::Customer).await;
    let carts = services.carts();

    carts.add(&customer, front.product.id, 1).await.unwrap();
    let line = carts.set_quantity(&customer, front.product.id, 4).await.unwrap();
    assert_eq!(line.quantity, 4);

    assert_ok!(carts.remove(&customer, front.product.id).await);
    let again = carts.remove(&customer, front.product.id).await;
    assert!(matches!(again, Err(AppError::NotFound(_))), "got {again:?}");

    let zero = carts.add(&customer, front.product.id, 0).await;
    assert!(matches!(zero, Err(AppError::Validation(_))), "got {zero:?}");
}

#[tokio::test]
async fn restock_makes_product_orderable_again() {
    let services = services();
    let front = storefront(&services, 1).await;
    let customer = account(&services, "casey", RoleId::Customer).await;

    services.orders().create(&customer, front.product.id, 1).await.unwrap();
    assert_err!(services.orders().create(&customer, front.product.id, 1).await);

    let restocked = services
        .catalog()
        .restock(&front.retailer, front.product.id, 3)
        .await
        .unwrap();
    assert_eq!(restocked.stock, 3);
    assert_ok!(services.orders().create(&customer, front.product.id, 3).await);

    let stranger = account(&services, "merchant", RoleId::Merchant).await;
    let err = services
        .catalog()
        .restock(&stranger, front.product.id, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)), "got {err:?}");
}
