//! In-memory implementation of every repository.
//!
//! All state sits behind one `tokio::sync::RwLock`. Each multi-step operation
//! holds the write guard for its whole duration, which gives the same
//! all-or-nothing behaviour the SeaORM store gets from transactions.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use common::{AppError, AppResult, OptionExt};
use domain::{
    validate_quantity, Business, BusinessAction, CartItem, Decision, NewUser, Order,
    OrderLine, OrderStatus, Product, RequestStatus, RoleId, RoleRequest, StockShortfall, User,
};

use super::repositories::{
    BusinessFilter, BusinessRepository, CartRepository, OrderFilter, OrderRepository,
    ProductRepository, RoleRequestRepository, UserRepository, PENDING_REQUEST_EXISTS,
    USERNAME_TAKEN, WAREHOUSE_EXISTS,
};
use super::unit_of_work::UnitOfWork;

#[derive(Default)]
struct State {
    users: HashMap<Uuid, User>,
    role_requests: HashMap<Uuid, RoleRequest>,
    businesses: HashMap<Uuid, Business>,
    products: HashMap<Uuid, Product>,
    carts: BTreeMap<(Uuid, Uuid), CartItem>,
    orders: HashMap<Uuid, Order>,
}

impl State {
    fn live_business(&self, id: Uuid) -> AppResult<&Business> {
        self.businesses
            .get(&id)
            .filter(|b| !b.is_deleted())
            .ok_or_not_found("Business")
    }

    fn orderable(&self, id: Uuid) -> AppResult<&Product> {
        let product = self.products.get(&id).ok_or_not_found("Product")?;
        match self.businesses.get(&product.business_id) {
            Some(business) if business.is_listed() => Ok(product),
            _ => Err(AppError::not_found("Product")),
        }
    }

    fn sells(&self, seller_id: Uuid, product_id: Uuid) -> bool {
        self.products
            .get(&product_id)
            .and_then(|p| self.businesses.get(&p.business_id))
            .is_some_and(|b| b.owner_id == seller_id)
    }
}

/// Shared in-memory store. Cloning yields another handle on the same state.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UnitOfWork for MemoryStore {
    fn users(&self) -> Arc<dyn UserRepository> {
        Arc::new(self.clone())
    }

    fn role_requests(&self) -> Arc<dyn RoleRequestRepository> {
        Arc::new(self.clone())
    }

    fn businesses(&self) -> Arc<dyn BusinessRepository> {
        Arc::new(self.clone())
    }

    fn products(&self) -> Arc<dyn ProductRepository> {
        Arc::new(self.clone())
    }

    fn carts(&self) -> Arc<dyn CartRepository> {
        Arc::new(self.clone())
    }

    fn orders(&self) -> Arc<dyn OrderRepository> {
        Arc::new(self.clone())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.username == username).cloned())
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let mut state = self.state.write().await;
        if state.users.values().any(|u| u.username == new_user.username) {
            return Err(AppError::conflict(USERNAME_TAKEN));
        }
        let user = User::new(Uuid::new_v4(), new_user);
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_role(&self, id: Uuid, role: RoleId) -> AppResult<User> {
        let mut state = self.state.write().await;
        let user = state.users.get_mut(&id).ok_or_not_found("User")?;
        user.update_role(role);
        Ok(user.clone())
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let state = self.state.read().await;
        let mut users: Vec<User> = state.users.values().cloned().collect();
        users.sort_by_key(|u| (u.created_at, u.id));
        Ok(users)
    }
}

#[async_trait]
impl RoleRequestRepository for MemoryStore {
    async fn create_pending(&self, request: RoleRequest) -> AppResult<RoleRequest> {
        let mut state = self.state.write().await;
        let pending_exists = state
            .role_requests
            .values()
            .any(|r| r.user_id == request.user_id && r.status == RequestStatus::Pending);
        if pending_exists {
            return Err(AppError::conflict(PENDING_REQUEST_EXISTS));
        }
        state.role_requests.insert(request.id, request.clone());
        Ok(request)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<RoleRequest>> {
        Ok(self.state.read().await.role_requests.get(&id).cloned())
    }

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<RoleRequest>> {
        let state = self.state.read().await;
        let mut requests: Vec<RoleRequest> = state
            .role_requests
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        requests.sort_by_key(|r| std::cmp::Reverse((r.created_at, r.id)));
        Ok(requests)
    }

    async fn list(&self, status: Option<RequestStatus>) -> AppResult<Vec<RoleRequest>> {
        let state = self.state.read().await;
        let mut requests: Vec<RoleRequest> = state
            .role_requests
            .values()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .cloned()
            .collect();
        requests.sort_by_key(|r| (r.created_at, r.id));
        Ok(requests)
    }

    async fn resolve(
        &self,
        id: Uuid,
        decision: Decision,
        admin_id: Uuid,
    ) -> AppResult<RoleRequest> {
        let mut state = self.state.write().await;

        let mut request = state
            .role_requests
            .get(&id)
            .cloned()
            .ok_or_not_found("Role request")?;
        request.resolve(decision, admin_id)?;

        if decision == Decision::Approve {
            let user = state
                .users
                .get_mut(&request.user_id)
                .ok_or_not_found("User")?;
            user.update_role(request.requested_role);
        }
        state.role_requests.insert(id, request.clone());
        Ok(request)
    }
}

#[async_trait]
impl BusinessRepository for MemoryStore {
    async fn create(&self, business: Business) -> AppResult<Business> {
        let mut state = self.state.write().await;
        if business.kind.single_per_owner() {
            let duplicate = state.businesses.values().any(|b| {
                !b.is_deleted() && b.owner_id == business.owner_id && b.kind == business.kind
            });
            if duplicate {
                return Err(AppError::conflict(WAREHOUSE_EXISTS));
            }
        }
        state.businesses.insert(business.id, business.clone());
        Ok(business)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Business>> {
        let state = self.state.read().await;
        Ok(state.live_business(id).ok().cloned())
    }

    async fn list(&self, filter: BusinessFilter) -> AppResult<Vec<Business>> {
        let state = self.state.read().await;
        let mut businesses: Vec<Business> = state
            .businesses
            .values()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect();
        businesses.sort_by_key(|b| std::cmp::Reverse((b.created_at, b.id)));
        Ok(businesses)
    }

    async fn transition(
        &self,
        id: Uuid,
        action: BusinessAction,
        admin_id: Uuid,
    ) -> AppResult<Business> {
        let mut state = self.state.write().await;
        let mut business = state.live_business(id)?.clone();
        business.apply(action, admin_id)?;
        state.businesses.insert(id, business.clone());
        Ok(business)
    }

    async fn soft_delete(&self, id: Uuid) -> AppResult<Business> {
        let mut state = self.state.write().await;
        let mut business = state.live_business(id)?.clone();
        business.soft_delete()?;
        state.businesses.insert(id, business.clone());
        Ok(business)
    }
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn create(&self, product: Product) -> AppResult<Product> {
        let mut state = self.state.write().await;
        state.live_business(product.business_id)?;
        state.products.insert(product.id, product.clone());
        Ok(product)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Product>> {
        Ok(self.state.read().await.products.get(&id).cloned())
    }

    async fn list_by_business(&self, business_id: Uuid) -> AppResult<Vec<Product>> {
        let state = self.state.read().await;
        let mut products: Vec<Product> = state
            .products
            .values()
            .filter(|p| p.business_id == business_id)
            .cloned()
            .collect();
        products.sort_by_key(|p| (p.created_at, p.id));
        Ok(products)
    }

    async fn list_listed(&self) -> AppResult<Vec<Product>> {
        let state = self.state.read().await;
        let mut products: Vec<Product> = state
            .products
            .values()
            .filter(|p| {
                state
                    .businesses
                    .get(&p.business_id)
                    .is_some_and(Business::is_listed)
            })
            .cloned()
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(products)
    }

    async fn restock(&self, id: Uuid, quantity: i32) -> AppResult<Product> {
        let mut state = self.state.write().await;
        let product = state.products.get_mut(&id).ok_or_not_found("Product")?;
        product.restock(quantity)?;
        Ok(product.clone())
    }
}

#[async_trait]
impl CartRepository for MemoryStore {
    async fn list(&self, user_id: Uuid) -> AppResult<Vec<CartItem>> {
        let state = self.state.read().await;
        let mut items: Vec<CartItem> = state
            .carts
            .range((user_id, Uuid::nil())..=(user_id, Uuid::from_u128(u128::MAX)))
            .map(|(_, item)| item.clone())
            .collect();
        items.sort_by_key(|i| (i.added_at, i.product_id));
        Ok(items)
    }

    async fn add(&self, user_id: Uuid, product_id: Uuid, quantity: i32) -> AppResult<CartItem> {
        validate_quantity(quantity)?;
        let mut state = self.state.write().await;
        let item = match state.carts.get(&(user_id, product_id)) {
            Some(existing) => {
                let merged = existing.quantity.checked_add(quantity).unwrap_or(i32::MAX);
                validate_quantity(merged)?;
                CartItem {
                    quantity: merged,
                    ..existing.clone()
                }
            }
            None => CartItem::new(user_id, product_id, quantity)?,
        };
        state.carts.insert((user_id, product_id), item.clone());
        Ok(item)
    }

    async fn set_quantity(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> AppResult<CartItem> {
        validate_quantity(quantity)?;
        let mut state = self.state.write().await;
        let item = state
            .carts
            .get_mut(&(user_id, product_id))
            .ok_or_not_found("Cart item")?;
        item.quantity = quantity;
        Ok(item.clone())
    }

    async fn remove(&self, user_id: Uuid, product_id: Uuid) -> AppResult<()> {
        let mut state = self.state.write().await;
        state
            .carts
            .remove(&(user_id, product_id))
            .map(|_| ())
            .ok_or_not_found("Cart item")
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn place(
        &self,
        user_id: Uuid,
        lines: Vec<OrderLine>,
        clear_cart: bool,
    ) -> AppResult<Vec<Order>> {
        let mut state = self.state.write().await;

        // Validate every line before touching anything.
        let mut orders = Vec::with_capacity(lines.len());
        let mut shortfalls = Vec::new();
        for line in &lines {
            let product = state.orderable(line.product_id)?;
            let total = product.total_for(line.quantity)?;
            if line.quantity > product.stock {
                shortfalls.push(StockShortfall {
                    product_id: product.id,
                    requested: line.quantity,
                    available: product.stock,
                });
                continue;
            }
            orders.push(Order::new(user_id, product.id, line.quantity, total));
        }
        if !shortfalls.is_empty() {
            return Err(AppError::InsufficientStock(shortfalls));
        }

        for line in &lines {
            let product = state
                .products
                .get_mut(&line.product_id)
                .ok_or_not_found("Product")?;
            if !product.take_stock(line.quantity) {
                return Err(AppError::internal("stock changed under write lock"));
            }
        }
        for order in &orders {
            state.orders.insert(order.id, order.clone());
        }
        if clear_cart {
            for line in &lines {
                state.carts.remove(&(user_id, line.product_id));
            }
        }
        Ok(orders)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Order>> {
        Ok(self.state.read().await.orders.get(&id).cloned())
    }

    async fn list(&self, filter: OrderFilter) -> AppResult<Vec<Order>> {
        let state = self.state.read().await;
        let mut orders: Vec<Order> = state
            .orders
            .values()
            .filter(|o| filter.user_id.map_or(true, |id| o.user_id == id))
            .filter(|o| {
                filter
                    .seller_id
                    .map_or(true, |seller| state.sells(seller, o.product_id))
            })
            .cloned()
            .collect();
        orders.sort_by_key(|o| std::cmp::Reverse((o.created_at, o.id)));
        Ok(orders)
    }

    async fn advance(&self, id: Uuid, target: OrderStatus) -> AppResult<Order> {
        let mut state = self.state.write().await;
        let order = state.orders.get_mut(&id).ok_or_not_found("Order")?;
        order.advance(target)?;
        Ok(order.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{BusinessKind, BusinessStatus, NewBusiness, NewProduct};

    async fn listed_product(store: &MemoryStore, stock: i32) -> Product {
        let owner = Uuid::new_v4();
        let shop = BusinessRepository::create(
            store,
            Business::new(
                owner,
                NewBusiness {
                    kind: BusinessKind::Shop,
                    name: "Stall".into(),
                    category: "misc".into(),
                    description: None,
                },
            ),
        )
        .await
        .unwrap();
        store
            .transition(shop.id, BusinessAction::Approve, Uuid::new_v4())
            .await
            .unwrap();
        ProductRepository::create(
            store,
            Product::new(
                shop.id,
                NewProduct {
                    name: "Kettle".into(),
                    description: None,
                    price: 1200,
                    stock,
                },
            ),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn place_decrements_stock_and_clears_cart() {
        let store = MemoryStore::new();
        let product = listed_product(&store, 5).await;
        let buyer = Uuid::new_v4();
        store.add(buyer, product.id, 2).await.unwrap();

        let orders = store
            .place(buyer, vec![OrderLine::new(product.id, 2)], true)
            .await
            .unwrap();

        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].total, 2400);
        let stored = ProductRepository::find_by_id(&store, product.id).await.unwrap().unwrap();
        assert_eq!(stored.stock, 3);
        assert!(CartRepository::list(&store, buyer).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn short_line_leaves_everything_untouched() {
        let store = MemoryStore::new();
        let plenty = listed_product(&store, 10).await;
        let scarce = listed_product(&store, 1).await;
        let buyer = Uuid::new_v4();

        let err = store
            .place(
                buyer,
                vec![OrderLine::new(plenty.id, 2), OrderLine::new(scarce.id, 4)],
                false,
            )
            .await
            .unwrap_err();

        match err {
            AppError::InsufficientStock(shortfalls) => {
                assert_eq!(shortfalls.len(), 1);
                assert_eq!(shortfalls[0].product_id, scarce.id);
                assert_eq!(shortfalls[0].available, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let stored = ProductRepository::find_by_id(&store, plenty.id).await.unwrap().unwrap();
        assert_eq!(stored.stock, 10);
        assert!(OrderRepository::list(&store, OrderFilter::default())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn second_live_warehouse_conflicts() {
        let store = MemoryStore::new();
        let supplier = Uuid::new_v4();
        let warehouse = || {
            Business::new(
                supplier,
                NewBusiness {
                    kind: BusinessKind::Warehouse,
                    name: "Depot".into(),
                    category: "bulk".into(),
                    description: None,
                },
            )
        };

        let first = BusinessRepository::create(&store, warehouse()).await.unwrap();
        assert_eq!(first.status, BusinessStatus::Pending);
        let err = BusinessRepository::create(&store, warehouse()).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        store.soft_delete(first.id).await.unwrap();
        assert!(BusinessRepository::create(&store, warehouse()).await.is_ok());
    }

    #[tokio::test]
    async fn cart_add_merges_lines() {
        let store = MemoryStore::new();
        let (user, product) = (Uuid::new_v4(), Uuid::new_v4());
        store.add(user, product, 2).await.unwrap();
        let item = store.add(user, product, 3).await.unwrap();
        assert_eq!(item.quantity, 5);
        assert_eq!(CartRepository::list(&store, user).await.unwrap().len(), 1);
    }
}
