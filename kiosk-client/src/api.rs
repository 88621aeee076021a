//! Kiosk REST API
//!
//! The endpoints the ordering flow consumes. Object-safe so the kiosk can hold
//! an `Arc<dyn KioskApi>` and tests can swap in [`MockKioskApi`](crate::mock::MockKioskApi).

use async_trait::async_trait;
use serde::de::IgnoredAny;
use shared::Item;
use shared::client::{LoginForm, TokenResponse};
use shared::order::{Order, OrderAddItemsRequest, OrderCheckoutRequest, OrderCreateRequest, OrderId};

use crate::ClientResult;
use crate::http::{HttpClient, NetworkHttpClient};

/// Ordering backend API
#[async_trait]
pub trait KioskApi: Send + Sync {
    /// `POST /token` (form-encoded, unauthenticated)
    async fn login(&self, username: &str, password: &str) -> ClientResult<TokenResponse>;

    /// `GET /items`
    async fn fetch_menu(&self) -> ClientResult<Vec<Item>>;

    /// `POST /orders`
    async fn create_order(&self, request: &OrderCreateRequest) -> ClientResult<Order>;

    /// `POST /orders/{id}/items`
    async fn add_items(&self, order_id: OrderId, request: &OrderAddItemsRequest) -> ClientResult<Order>;

    /// `POST /orders/{id}/checkout` (response body is not used)
    async fn checkout(&self, order_id: OrderId, request: &OrderCheckoutRequest) -> ClientResult<()>;

    /// `GET /orders/{id}`
    async fn fetch_order(&self, order_id: OrderId) -> ClientResult<Order>;
}

#[async_trait]
impl KioskApi for NetworkHttpClient {
    async fn login(&self, username: &str, password: &str) -> ClientResult<TokenResponse> {
        let form = LoginForm {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.post_form("/token", &form).await
    }

    async fn fetch_menu(&self) -> ClientResult<Vec<Item>> {
        self.get("/items").await
    }

    async fn create_order(&self, request: &OrderCreateRequest) -> ClientResult<Order> {
        self.post("/orders", request).await
    }

    async fn add_items(&self, order_id: OrderId, request: &OrderAddItemsRequest) -> ClientResult<Order> {
        self.post(&format!("/orders/{}/items", order_id), request).await
    }

    async fn checkout(&self, order_id: OrderId, request: &OrderCheckoutRequest) -> ClientResult<()> {
        let _: IgnoredAny = self.post(&format!("/orders/{}/checkout", order_id), request).await?;
        Ok(())
    }

    async fn fetch_order(&self, order_id: OrderId) -> ClientResult<Order> {
        self.get(&format!("/orders/{}", order_id)).await
    }
}
