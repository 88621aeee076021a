//! In-memory `KioskApi`
//!
//! `MockKioskApi` behaves like a tiny ordering backend: it resolves menu items
//! and options into order snapshots, appends to existing orders, and marks
//! orders paid on checkout. Every call is recorded so tests can assert on the
//! exact sequence of requests, and failures can be injected per endpoint.
//!
//! Enabled with the `mock` feature (and always in this crate's own tests).

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use shared::client::TokenResponse;
use shared::order::{
    Order, OrderAddItemsRequest, OrderCheckoutRequest, OrderCreateRequest, OrderId, OrderItem,
    OrderItemRequest, OrderStatus,
};
use shared::Item;

use crate::{ClientError, ClientResult, KioskApi};

/// Endpoint selector for failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Login,
    FetchMenu,
    CreateOrder,
    AddItems,
    Checkout,
    FetchOrder,
}

/// A recorded API call
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    Login { username: String },
    FetchMenu,
    CreateOrder(OrderCreateRequest),
    AddItems(OrderId, OrderAddItemsRequest),
    Checkout(OrderId, OrderCheckoutRequest),
    FetchOrder(OrderId),
}

impl ApiCall {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            Self::Login { .. } => Endpoint::Login,
            Self::FetchMenu => Endpoint::FetchMenu,
            Self::CreateOrder(_) => Endpoint::CreateOrder,
            Self::AddItems(..) => Endpoint::AddItems,
            Self::Checkout(..) => Endpoint::Checkout,
            Self::FetchOrder(_) => Endpoint::FetchOrder,
        }
    }
}

#[derive(Default)]
struct MockState {
    calls: Vec<ApiCall>,
    menu: Vec<Item>,
    orders: HashMap<OrderId, Order>,
    next_order_id: i64,
    next_line_id: i64,
    failures: HashMap<Endpoint, VecDeque<ClientError>>,
    fetch_delay: Option<Duration>,
}

/// In-memory ordering backend
pub struct MockKioskApi {
    state: Mutex<MockState>,
}

impl MockKioskApi {
    pub fn new(menu: Vec<Item>) -> Self {
        Self {
            state: Mutex::new(MockState {
                menu,
                next_order_id: 1,
                next_line_id: 1,
                ..Default::default()
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // A panicking test thread must not hide the original failure
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// IDs handed out to the next created order
    pub fn with_next_order_id(self, id: i64) -> Self {
        self.lock().next_order_id = id;
        self
    }

    /// Make the next call to `endpoint` fail with `error`
    pub fn fail_next(&self, endpoint: Endpoint, error: ClientError) {
        self.lock().failures.entry(endpoint).or_default().push_back(error);
    }

    /// Delay `fetch_order` responses; the snapshot is taken before the delay
    pub fn set_fetch_delay(&self, delay: Option<Duration>) {
        self.lock().fetch_delay = delay;
    }

    /// Simulate a kitchen-side status change
    pub fn set_status(&self, order_id: OrderId, status: OrderStatus) {
        if let Some(order) = self.lock().orders.get_mut(&order_id) {
            order.status = status;
        }
    }

    pub fn order(&self, order_id: OrderId) -> Option<Order> {
        self.lock().orders.get(&order_id).cloned()
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.lock().calls.clone()
    }

    pub fn count(&self, endpoint: Endpoint) -> usize {
        self.lock().calls.iter().filter(|c| c.endpoint() == endpoint).count()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Record the call and pop an injected failure, if any
    fn begin(&self, call: ApiCall) -> ClientResult<MutexGuard<'_, MockState>> {
        let mut state = self.lock();
        let endpoint = call.endpoint();
        state.calls.push(call);
        if let Some(err) = state.failures.get_mut(&endpoint).and_then(VecDeque::pop_front) {
            return Err(err);
        }
        Ok(state)
    }
}

impl MockState {
    fn resolve(&mut self, requests: &[OrderItemRequest]) -> ClientResult<Vec<OrderItem>> {
        let mut lines = Vec::with_capacity(requests.len());
        for req in requests {
            let item = self
                .menu
                .iter()
                .find(|i| i.id == req.item_id)
                .cloned()
                .ok_or_else(|| ClientError::NotFound(format!("Item {} not found", req.item_id)))?;
            let options = req
                .option_ids
                .iter()
                .map(|id| {
                    item.option(*id).cloned().ok_or_else(|| {
                        ClientError::Validation(format!("Option {} not available", id))
                    })
                })
                .collect::<ClientResult<Vec<_>>>()?;
            let id = self.next_line_id;
            self.next_line_id += 1;
            lines.push(OrderItem {
                id,
                item,
                quantity: req.quantity,
                options,
            });
        }
        Ok(lines)
    }
}

#[async_trait]
impl KioskApi for MockKioskApi {
    async fn login(&self, username: &str, password: &str) -> ClientResult<TokenResponse> {
        let _state = self.begin(ApiCall::Login {
            username: username.to_string(),
        })?;
        if username.is_empty() || password.is_empty() {
            return Err(ClientError::Unauthorized(
                "Incorrect username or password".into(),
            ));
        }
        Ok(TokenResponse {
            access_token: format!("mock-token-{}", username),
            token_type: "bearer".into(),
        })
    }

    async fn fetch_menu(&self) -> ClientResult<Vec<Item>> {
        let state = self.begin(ApiCall::FetchMenu)?;
        Ok(state.menu.clone())
    }

    async fn create_order(&self, request: &OrderCreateRequest) -> ClientResult<Order> {
        let mut state = self.begin(ApiCall::CreateOrder(request.clone()))?;
        let items = state.resolve(&request.items)?;
        let id = OrderId(state.next_order_id);
        state.next_order_id += 1;
        let order = Order {
            id,
            created_at: Default::default(),
            status: OrderStatus::Pending,
            payment_method: None,
            age_group: request.age_group,
            gender: request.gender,
            items,
        };
        state.orders.insert(id, order.clone());
        Ok(order)
    }

    async fn add_items(&self, order_id: OrderId, request: &OrderAddItemsRequest) -> ClientResult<Order> {
        let mut state = self.begin(ApiCall::AddItems(order_id, request.clone()))?;
        let items = state.resolve(&request.items)?;
        let order = state
            .orders
            .get_mut(&order_id)
            .ok_or_else(|| ClientError::NotFound("Order not found".into()))?;
        order.items.extend(items);
        Ok(order.clone())
    }

    async fn checkout(&self, order_id: OrderId, request: &OrderCheckoutRequest) -> ClientResult<()> {
        let mut state = self.begin(ApiCall::Checkout(order_id, *request))?;
        let order = state
            .orders
            .get_mut(&order_id)
            .ok_or_else(|| ClientError::NotFound("Order not found".into()))?;
        if order.payment_method.is_some() {
            return Err(ClientError::Validation("Order already paid".into()));
        }
        order.payment_method = Some(request.payment_method);
        order.status = OrderStatus::Completed;
        Ok(())
    }

    async fn fetch_order(&self, order_id: OrderId) -> ClientResult<Order> {
        let (snapshot, delay) = {
            let state = self.begin(ApiCall::FetchOrder(order_id))?;
            let order = state
                .orders
                .get(&order_id)
                .cloned()
                .ok_or_else(|| ClientError::NotFound("Order not found".into()));
            (order, state.fetch_delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        snapshot
    }
}
