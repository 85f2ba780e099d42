use tracing::instrument;

use crate::accounts::Accounts;
use crate::clients::ShopClient;
use crate::domain::{Order, OrderStatus, PaymentStatus, Product, ProductDraft, User};
use crate::error::StoreResult;
use crate::ledger::SalesReport;
use crate::session::Session;

/// Orders shown on the admin dashboard.
pub const RECENT_ORDER_LIMIT: usize = 5;

/// Administrator-only operations.
///
/// Only obtainable from an administrator [`Session`], so every method here is
/// already authorized.
#[derive(Clone)]
pub struct AdminConsole {
    shop: ShopClient,
    accounts: Accounts,
}

impl AdminConsole {
    pub fn open(session: &Session, shop: ShopClient, accounts: Accounts) -> StoreResult<Self> {
        session.require_admin()?;
        Ok(Self { shop, accounts })
    }

    // --- Inventory ---

    pub async fn create_product(&self, draft: ProductDraft) -> StoreResult<Product> {
        self.shop.create_product(draft).await
    }

    pub async fn update_stock(&self, product_id: u32, new_stock: i64) -> StoreResult<Product> {
        self.shop.update_stock(product_id, new_stock).await
    }

    pub async fn replace_image(&self, product_id: u32, image: impl Into<String>) -> StoreResult<Product> {
        self.shop.replace_image(product_id, image.into()).await
    }

    pub async fn delete_product(&self, product_id: u32) -> StoreResult<Product> {
        self.shop.delete_product(product_id).await
    }

    // --- Orders ---

    pub async fn update_status(&self, order_id: &str, status: OrderStatus) -> StoreResult<Order> {
        self.shop.update_status(order_id.to_string(), status).await
    }

    pub async fn update_payment_status(&self, order_id: &str, status: PaymentStatus) -> StoreResult<Order> {
        self.shop.update_payment_status(order_id.to_string(), status).await
    }

    pub async fn report(&self) -> StoreResult<SalesReport> {
        self.shop.report().await
    }

    pub async fn get_order(&self, order_id: &str) -> StoreResult<Option<Order>> {
        self.shop.get_order(order_id.to_string()).await
    }

    pub async fn recent_orders(&self) -> StoreResult<Vec<Order>> {
        self.shop.recent_orders(RECENT_ORDER_LIMIT).await
    }

    // --- Users ---

    pub async fn list_users(&self) -> StoreResult<Vec<User>> {
        self.accounts.list_users().await
    }

    pub async fn add_user(&self, username: &str, password: &str) -> StoreResult<()> {
        self.accounts.register(username, password).await
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, username: &str) -> StoreResult<()> {
        self.accounts.delete_user(username).await
    }
}
