use tokio::sync::oneshot;

use crate::checkout::{CheckoutRequest, ShippingRate};
use crate::domain::{Category, Order, OrderStatus, PaymentStatus, Product, ProductDraft};
use crate::error::StoreError;
use crate::ledger::SalesReport;

/// Generic type aliases for service communication
pub type ServiceResult<T, E> = std::result::Result<T, E>;
pub type ServiceResponse<T, E> = oneshot::Sender<ServiceResult<T, E>>;

/// Requests handled by the shop service, the single writer for products and orders.
/// Each variant carries its parameters and a oneshot channel for the reply.
#[derive(Debug)]
pub enum ShopRequest {
    // --- Catalog ---
    ListProducts {
        category: Option<Category>,
        respond_to: ServiceResponse<Vec<Product>, StoreError>,
    },
    GetProduct {
        id: u32,
        respond_to: ServiceResponse<Option<Product>, StoreError>,
    },
    CreateProduct {
        draft: ProductDraft,
        respond_to: ServiceResponse<Product, StoreError>,
    },
    UpdateStock {
        id: u32,
        stock: i64,
        respond_to: ServiceResponse<Product, StoreError>,
    },
    ReplaceImage {
        id: u32,
        image: String,
        respond_to: ServiceResponse<Product, StoreError>,
    },
    DeleteProduct {
        id: u32,
        respond_to: ServiceResponse<Product, StoreError>,
    },

    // --- Checkout ---
    ShippingQuote {
        method: String,
        respond_to: ServiceResponse<ShippingRate, StoreError>,
    },
    ShippingRates {
        respond_to: ServiceResponse<Vec<ShippingRate>, StoreError>,
    },
    Checkout {
        request: CheckoutRequest,
        respond_to: ServiceResponse<Order, StoreError>,
    },

    // --- Order lifecycle ---
    GetOrder {
        id: String,
        respond_to: ServiceResponse<Option<Order>, StoreError>,
    },
    UpdateStatus {
        id: String,
        status: OrderStatus,
        respond_to: ServiceResponse<Order, StoreError>,
    },
    UpdatePaymentStatus {
        id: String,
        status: PaymentStatus,
        respond_to: ServiceResponse<Order, StoreError>,
    },
    Report {
        respond_to: ServiceResponse<SalesReport, StoreError>,
    },
    HistoryFor {
        username: String,
        respond_to: ServiceResponse<Vec<Order>, StoreError>,
    },
    RecentOrders {
        limit: usize,
        respond_to: ServiceResponse<Vec<Order>, StoreError>,
    },

    Shutdown,
}
