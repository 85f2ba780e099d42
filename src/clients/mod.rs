mod macros;
mod user_client;

pub use user_client::UserClient;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

use crate::checkout::{CheckoutRequest, ShippingRate};
use crate::domain::{Category, Order, OrderStatus, PaymentStatus, Product, ProductDraft};
use crate::error::StoreError;
use crate::ledger::SalesReport;
use crate::messages::ShopRequest;

// =============================================================================
// Macro for message-based clients
// =============================================================================

/// Generate client methods with oneshot channel boilerplate and automatic tracing.
macro_rules! client_method {
    ($client:ty => fn $method:ident($($param:ident: $param_type:ty),*) -> $return_type:ty as $request:ident::$variant:ident, Error = $error_type:ty) => {
        impl $client {
            #[instrument(skip(self))]
            pub async fn $method(&self, $($param: $param_type),*) -> Result<$return_type, $error_type> {
                debug!("Sending request");
                let (respond_to, response) = oneshot::channel();
                self.sender.send($request::$variant {
                    $($param,)*
                    respond_to,
                }).await.map_err(|_| <$error_type>::ActorCommunicationError("Actor closed".to_string()))?;

                response.await.map_err(|_| <$error_type>::ActorCommunicationError("Actor dropped".to_string()))?
            }
        }
    };
}

// =============================================================================
// Shop Client
// =============================================================================

/// Client for the shop service. Cheap to clone; every clone talks to the same task.
#[derive(Clone)]
pub struct ShopClient {
    sender: mpsc::Sender<ShopRequest>,
}

impl ShopClient {
    pub fn new(sender: mpsc::Sender<ShopRequest>) -> Self {
        Self { sender }
    }

    #[instrument(skip(self))]
    pub async fn shutdown(&self) -> Result<(), StoreError> {
        debug!("Sending shutdown request");
        self.sender
            .send(ShopRequest::Shutdown)
            .await
            .map_err(|_| StoreError::ActorCommunicationError("Actor closed".to_string()))
    }
}

client_method!(ShopClient => fn list_products(category: Option<Category>) -> Vec<Product> as ShopRequest::ListProducts, Error = StoreError);
client_method!(ShopClient => fn get_product(id: u32) -> Option<Product> as ShopRequest::GetProduct, Error = StoreError);
client_method!(ShopClient => fn create_product(draft: ProductDraft) -> Product as ShopRequest::CreateProduct, Error = StoreError);
client_method!(ShopClient => fn update_stock(id: u32, stock: i64) -> Product as ShopRequest::UpdateStock, Error = StoreError);
client_method!(ShopClient => fn replace_image(id: u32, image: String) -> Product as ShopRequest::ReplaceImage, Error = StoreError);
client_method!(ShopClient => fn delete_product(id: u32) -> Product as ShopRequest::DeleteProduct, Error = StoreError);

client_method!(ShopClient => fn shipping_quote(method: String) -> ShippingRate as ShopRequest::ShippingQuote, Error = StoreError);
client_method!(ShopClient => fn shipping_rates() -> Vec<ShippingRate> as ShopRequest::ShippingRates, Error = StoreError);
client_method!(ShopClient => fn checkout(request: CheckoutRequest) -> Order as ShopRequest::Checkout, Error = StoreError);

client_method!(ShopClient => fn get_order(id: String) -> Option<Order> as ShopRequest::GetOrder, Error = StoreError);
client_method!(ShopClient => fn update_status(id: String, status: OrderStatus) -> Order as ShopRequest::UpdateStatus, Error = StoreError);
client_method!(ShopClient => fn update_payment_status(id: String, status: PaymentStatus) -> Order as ShopRequest::UpdatePaymentStatus, Error = StoreError);
client_method!(ShopClient => fn report() -> SalesReport as ShopRequest::Report, Error = StoreError);
client_method!(ShopClient => fn history_for(username: String) -> Vec<Order> as ShopRequest::HistoryFor, Error = StoreError);
client_method!(ShopClient => fn recent_orders(limit: usize) -> Vec<Order> as ShopRequest::RecentOrders, Error = StoreError);
