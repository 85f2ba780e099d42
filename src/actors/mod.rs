use chrono::{NaiveDateTime, SubsecRound};
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};

use crate::catalog::{Catalog, ImageStore};
use crate::checkout::{self, CheckoutRequest, ShippingTable};
use crate::clients::ShopClient;
use crate::domain::{Category, Order, OrderStatus, PaymentStatus, Product, ProductDraft};
use crate::error::{StoreError, StoreResult};
use crate::ledger::{Ledger, SalesReport};
use crate::messages::{ServiceResponse, ShopRequest};
use crate::persistence::Repository;

/// Source of order timestamps.
pub type Clock = Box<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Local wall clock at whole-second precision, matching the stored date format.
pub fn local_clock() -> Clock {
    Box::new(|| chrono::Local::now().naive_local().trunc_subsecs(0))
}

/// Storage and collaborators the shop service is built from.
pub struct ShopParts {
    pub products: Box<dyn Repository<Product>>,
    pub orders: Box<dyn Repository<Order>>,
    pub images: Box<dyn ImageStore>,
    pub shipping: ShippingTable,
    pub placeholder_image: String,
    pub clock: Clock,
}

// =============================================================================
// SHOP SERVICE
// =============================================================================

/// Single writer for the product and order collections.
///
/// Both collections live in this one task, so a checkout's order append and
/// stock decrement are published together: every mutation is planned on a
/// copy, saved, and only then swapped in.
pub struct ShopService {
    receiver: mpsc::Receiver<ShopRequest>,
    catalog: Catalog,
    ledger: Ledger,
    product_repo: Box<dyn Repository<Product>>,
    order_repo: Box<dyn Repository<Order>>,
    images: Box<dyn ImageStore>,
    shipping: ShippingTable,
    placeholder_image: String,
    clock: Clock,
}

impl ShopService {
    pub fn new(buffer_size: usize, parts: ShopParts) -> StoreResult<(Self, ShopClient)> {
        let catalog = Catalog::new(parts.products.load_all()?);
        let ledger = Ledger::new(parts.orders.load_all()?);
        let (sender, receiver) = mpsc::channel(buffer_size);
        let service = Self {
            receiver,
            catalog,
            ledger,
            product_repo: parts.products,
            order_repo: parts.orders,
            images: parts.images,
            shipping: parts.shipping,
            placeholder_image: parts.placeholder_image,
            clock: parts.clock,
        };
        Ok((service, ShopClient::new(sender)))
    }

    #[instrument(name = "shop_service", skip(self))]
    pub async fn run(mut self) {
        info!(
            product_count = self.catalog.products().len(),
            order_count = self.ledger.orders().len(),
            "ShopService starting"
        );

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ShopRequest::ListProducts { category, respond_to } => {
                    self.handle_list_products(category, respond_to);
                }
                ShopRequest::GetProduct { id, respond_to } => {
                    let _ = respond_to.send(Ok(self.catalog.get(id).cloned()));
                }
                ShopRequest::CreateProduct { draft, respond_to } => {
                    self.handle_create_product(draft, respond_to);
                }
                ShopRequest::UpdateStock { id, stock, respond_to } => {
                    self.handle_update_stock(id, stock, respond_to);
                }
                ShopRequest::ReplaceImage { id, image, respond_to } => {
                    self.handle_replace_image(id, image, respond_to);
                }
                ShopRequest::DeleteProduct { id, respond_to } => {
                    self.handle_delete_product(id, respond_to);
                }
                ShopRequest::ShippingQuote { method, respond_to } => {
                    let _ = respond_to.send(self.shipping.rate(&method).cloned());
                }
                ShopRequest::ShippingRates { respond_to } => {
                    let _ = respond_to.send(Ok(self.shipping.rates().to_vec()));
                }
                ShopRequest::Checkout { request, respond_to } => {
                    self.handle_checkout(request, respond_to);
                }
                ShopRequest::GetOrder { id, respond_to } => {
                    let _ = respond_to.send(Ok(self.ledger.get(&id).cloned()));
                }
                ShopRequest::UpdateStatus { id, status, respond_to } => {
                    self.handle_update_status(id, status, respond_to);
                }
                ShopRequest::UpdatePaymentStatus { id, status, respond_to } => {
                    self.handle_update_payment_status(id, status, respond_to);
                }
                ShopRequest::Report { respond_to } => {
                    self.handle_report(respond_to);
                }
                ShopRequest::HistoryFor { username, respond_to } => {
                    self.handle_history_for(username, respond_to);
                }
                ShopRequest::RecentOrders { limit, respond_to } => {
                    let _ = respond_to.send(Ok(self.ledger.recent(limit)));
                }
                ShopRequest::Shutdown => {
                    info!("ShopService shutting down");
                    break;
                }
            }
        }

        info!("ShopService stopped");
    }

    // --- Catalog handlers ---

    #[instrument(fields(category = ?category), skip(self, respond_to))]
    fn handle_list_products(&self, category: Option<Category>, respond_to: ServiceResponse<Vec<Product>, StoreError>) {
        debug!("Processing list_products request");
        let products = self.catalog.list(category);
        debug!(product_count = products.len(), "Listed products");
        let _ = respond_to.send(Ok(products));
    }

    #[instrument(fields(product_name = %draft.name), skip(self, draft, respond_to))]
    fn handle_create_product(&mut self, draft: ProductDraft, respond_to: ServiceResponse<Product, StoreError>) {
        debug!("Processing create_product request");
        let result = self.create_product(draft);

        match &result {
            Ok(product) => info!(product_id = product.id, "Product created successfully"),
            Err(e) => warn!(error = %e, "Product creation rejected"),
        }
        let _ = respond_to.send(result);
    }

    #[instrument(fields(product_id = id, stock = stock), skip(self, respond_to))]
    fn handle_update_stock(&mut self, id: u32, stock: i64, respond_to: ServiceResponse<Product, StoreError>) {
        debug!("Processing update_stock request");
        let result = self.edit_catalog(|catalog| catalog.update_stock(id, stock));

        match &result {
            Ok(_) => info!("Stock updated"),
            Err(e) => warn!(error = %e, "Stock update rejected"),
        }
        let _ = respond_to.send(result);
    }

    #[instrument(fields(product_id = id), skip(self, image, respond_to))]
    fn handle_replace_image(&mut self, id: u32, image: String, respond_to: ServiceResponse<Product, StoreError>) {
        debug!("Processing replace_image request");
        let result = self
            .edit_catalog(|catalog| catalog.replace_image(id, image))
            .map(|(product, previous)| {
                if previous != product.image {
                    self.release_image(&previous);
                }
                product
            });

        match &result {
            Ok(_) => info!("Product image replaced"),
            Err(e) => warn!(error = %e, "Image replacement rejected"),
        }
        let _ = respond_to.send(result);
    }

    #[instrument(fields(product_id = id), skip(self, respond_to))]
    fn handle_delete_product(&mut self, id: u32, respond_to: ServiceResponse<Product, StoreError>) {
        debug!("Processing delete_product request");
        let result = self.edit_catalog(|catalog| catalog.remove(id));

        match &result {
            Ok(product) => {
                self.release_image(&product.image);
                info!(product_name = %product.name, "Product deleted");
            }
            Err(e) => warn!(error = %e, "Product deletion rejected"),
        }
        let _ = respond_to.send(result);
    }

    // --- Checkout handler ---

    /// Validates, plans and commits one cart.
    ///
    /// Orders are saved before products. If the products save fails the
    /// previous orders snapshot is written back and nothing is published.
    #[instrument(
        fields(
            username = %request.username,
            line_count = request.lines.len(),
            shipping = %request.shipping_method
        ),
        skip(self, request, respond_to)
    )]
    fn handle_checkout(&mut self, request: CheckoutRequest, respond_to: ServiceResponse<Order, StoreError>) {
        info!("Processing checkout request");
        let result = self.commit_checkout(&request);
        match &result {
            Ok(order) => info!(order_id = %order.id, total = order.total, "Order committed"),
            Err(e) => warn!(error = %e, "Checkout rejected"),
        }
        let _ = respond_to.send(result);
    }

    fn commit_checkout(&mut self, request: &CheckoutRequest) -> StoreResult<Order> {
        let plan = checkout::plan_commit(&self.catalog, &self.shipping, request, (self.clock)())?;

        let mut ledger = self.ledger.clone();
        ledger.append(plan.order.clone());
        self.order_repo.save_all(ledger.orders())?;

        if let Err(e) = self.product_repo.save_all(plan.catalog.products()) {
            error!(error = %e, "Product snapshot save failed, restoring orders snapshot");
            if let Err(restore) = self.order_repo.save_all(self.ledger.orders()) {
                error!(error = %restore, "Orders snapshot restore failed");
            }
            return Err(e.into());
        }

        self.ledger = ledger;
        self.catalog = plan.catalog;
        Ok(plan.order)
    }

    // --- Order lifecycle handlers ---

    #[instrument(fields(order_id = %id, status = %status), skip(self, respond_to))]
    fn handle_update_status(&mut self, id: String, status: OrderStatus, respond_to: ServiceResponse<Order, StoreError>) {
        debug!("Processing update_status request");
        let result = self.edit_ledger(|ledger| ledger.update_status(&id, status));

        match &result {
            Ok(_) => info!("Order status updated"),
            Err(e) => warn!(error = %e, "Order status update rejected"),
        }
        let _ = respond_to.send(result);
    }

    #[instrument(fields(order_id = %id, payment_status = %status), skip(self, respond_to))]
    fn handle_update_payment_status(
        &mut self,
        id: String,
        status: PaymentStatus,
        respond_to: ServiceResponse<Order, StoreError>,
    ) {
        debug!("Processing update_payment_status request");
        let result = self.edit_ledger(|ledger| ledger.update_payment_status(&id, status));

        match &result {
            Ok(_) => info!("Payment status updated"),
            Err(e) => warn!(error = %e, "Payment status update rejected"),
        }
        let _ = respond_to.send(result);
    }

    #[instrument(skip(self, respond_to))]
    fn handle_report(&self, respond_to: ServiceResponse<SalesReport, StoreError>) {
        let report = self.ledger.report();
        info!(
            total_sales = report.total_sales,
            completed = report.total_completed_count,
            "Sales report computed"
        );
        let _ = respond_to.send(Ok(report));
    }

    #[instrument(fields(username = %username), skip(self, respond_to))]
    fn handle_history_for(&self, username: String, respond_to: ServiceResponse<Vec<Order>, StoreError>) {
        let orders = self.ledger.history_for(&username);
        debug!(order_count = orders.len(), "History collected");
        let _ = respond_to.send(Ok(orders));
    }

    // --- Persistence ---

    fn create_product(&mut self, draft: ProductDraft) -> StoreResult<Product> {
        let placeholder = self.placeholder_image.clone();
        self.edit_catalog(|catalog| catalog.create(draft, &placeholder))
    }

    /// Applies `edit` to a copy of the catalog and publishes it once saved.
    fn edit_catalog<R>(&mut self, edit: impl FnOnce(&mut Catalog) -> StoreResult<R>) -> StoreResult<R> {
        let mut next = self.catalog.clone();
        let outcome = edit(&mut next)?;
        self.product_repo.save_all(next.products())?;
        self.catalog = next;
        Ok(outcome)
    }

    /// Applies `edit` to a copy of the ledger and publishes it once saved.
    fn edit_ledger<R>(&mut self, edit: impl FnOnce(&mut Ledger) -> StoreResult<R>) -> StoreResult<R> {
        let mut next = self.ledger.clone();
        let outcome = edit(&mut next)?;
        self.order_repo.save_all(next.orders())?;
        self.ledger = next;
        Ok(outcome)
    }

    fn release_image(&self, image: &str) {
        if image == self.placeholder_image {
            return;
        }
        if let Err(e) = self.images.release(image) {
            warn!(image = %image, error = %e, "Image release failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    use crate::cart::Cart;
    use crate::catalog::sample_products;
    use crate::domain::{Customer, PaymentMethod};
    use crate::persistence::MemoryRepository;

    const PLACEHOLDER: &str = "assets/logo.png";

    #[derive(Clone, Default)]
    struct RecordingImages {
        released: Arc<Mutex<Vec<String>>>,
    }

    impl ImageStore for RecordingImages {
        fn release(&self, image: &str) -> io::Result<()> {
            self.released.lock().unwrap().push(image.to_string());
            Ok(())
        }
    }

    struct Harness {
        client: ShopClient,
        products: MemoryRepository<Product>,
        orders: MemoryRepository<Order>,
        images: RecordingImages,
    }

    fn fixed_clock() -> Clock {
        Box::new(|| NaiveDateTime::parse_from_str("2024-05-01 10:00:05", "%Y-%m-%d %H:%M:%S").unwrap())
    }

    fn start() -> Harness {
        let products = MemoryRepository::with_records(sample_products(std::path::Path::new("assets/products")));
        let orders = MemoryRepository::new();
        let images = RecordingImages::default();
        let parts = ShopParts {
            products: Box::new(products.clone()),
            orders: Box::new(orders.clone()),
            images: Box::new(images.clone()),
            shipping: ShippingTable::default(),
            placeholder_image: PLACEHOLDER.to_string(),
            clock: fixed_clock(),
        };
        let (service, client) = ShopService::new(10, parts).unwrap();
        tokio::spawn(service.run());
        Harness {
            client,
            products,
            orders,
            images,
        }
    }

    async fn checkout_request(client: &ShopClient, qty: u32, customer: Customer) -> CheckoutRequest {
        let p1 = client.get_product(1).await.unwrap().unwrap();
        let mut cart = Cart::new();
        cart.add(&p1, qty).unwrap();
        CheckoutRequest {
            username: "budi".to_string(),
            customer,
            shipping_method: "JNE".to_string(),
            payment_method: PaymentMethod::TransferBri,
            lines: cart.items().to_vec(),
        }
    }

    #[tokio::test]
    async fn checkout_commits_order_and_stock_together() {
        let h = start();
        let request = checkout_request(&h.client, 2, Customer::new("Budi", "0812", "Brebes")).await;

        let order = h.client.checkout(request).await.unwrap();

        assert_eq!(order.total, 45000);
        assert_eq!(h.client.get_product(1).await.unwrap().unwrap().stock, 98);
        assert_eq!(h.orders.snapshot(), vec![order.clone()]);
        assert_eq!(h.products.snapshot()[0].stock, 98);
        assert_eq!(h.client.history_for("budi".to_string()).await.unwrap(), vec![order]);
    }

    #[tokio::test]
    async fn failed_checkout_changes_nothing() {
        let h = start();
        let request = checkout_request(&h.client, 2, Customer::new("Budi", "0812", " ")).await;

        let err = h.client.checkout(request).await.unwrap_err();

        assert_eq!(err, StoreError::MissingFields(vec!["address".to_string()]));
        assert_eq!(h.client.get_product(1).await.unwrap().unwrap().stock, 100);
        assert!(h.orders.snapshot().is_empty());
        assert!(h.client.recent_orders(5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn product_save_failure_rolls_back_orders() {
        let h = start();
        let request = checkout_request(&h.client, 2, Customer::new("Budi", "0812", "Brebes")).await;

        h.products.set_fail_saves(true);
        let err = h.client.checkout(request).await.unwrap_err();

        assert!(matches!(err, StoreError::PersistenceError(_)));
        assert!(h.orders.snapshot().is_empty());
        assert!(h.client.recent_orders(5).await.unwrap().is_empty());
        assert_eq!(h.client.get_product(1).await.unwrap().unwrap().stock, 100);
    }

    #[tokio::test]
    async fn deleted_product_makes_checkout_unavailable() {
        let h = start();
        let request = checkout_request(&h.client, 1, Customer::new("Budi", "0812", "Brebes")).await;

        h.client.delete_product(1).await.unwrap();
        let err = h.client.checkout(request).await.unwrap_err();

        assert_eq!(err, StoreError::ProductUnavailable(1));
        assert!(h.orders.snapshot().is_empty());
    }

    #[tokio::test]
    async fn catalog_mutations_persist_and_release_images() {
        let h = start();

        let created = h
            .client
            .create_product(ProductDraft::new("Bawang Brebes", 18000, 30, Category::Bawang))
            .await
            .unwrap();
        assert_eq!(created.id, 3);
        assert_eq!(created.image, PLACEHOLDER);
        assert_eq!(h.products.snapshot().len(), 3);

        h.client.update_stock(3, 12).await.unwrap();
        assert_eq!(h.products.snapshot()[2].stock, 12);
        assert!(h.client.update_stock(3, -1).await.unwrap_err().is_validation());
        assert!(matches!(h.client.update_stock(42, 1).await, Err(StoreError::NotFound(_))));

        h.client.replace_image(3, "assets/products/brebes.jpg".to_string()).await.unwrap();
        h.client.delete_product(3).await.unwrap();
        h.client.delete_product(1).await.unwrap();

        let released = h.images.released.lock().unwrap().clone();
        assert_eq!(
            released,
            vec![
                "assets/products/brebes.jpg".to_string(),
                "assets/products/bawang_merah.jpg".to_string()
            ]
        );
        assert_eq!(h.client.list_products(None).await.unwrap().len(), 1);
        assert_eq!(h.client.list_products(Some(Category::Bawang)).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn status_updates_feed_the_report() {
        let h = start();
        let request = checkout_request(&h.client, 2, Customer::new("Budi", "0812", "Brebes")).await;
        let order = h.client.checkout(request).await.unwrap();

        assert_eq!(h.client.report().await.unwrap(), SalesReport::default());

        h.client.update_status(order.id.clone(), OrderStatus::Completed).await.unwrap();
        let confirmed = h
            .client
            .update_payment_status(order.id.clone(), PaymentStatus::Confirmed)
            .await
            .unwrap();
        assert_eq!(confirmed.status, OrderStatus::Completed);
        assert_eq!(h.orders.snapshot()[0].payment.status, PaymentStatus::Confirmed);

        let report = h.client.report().await.unwrap();
        assert_eq!(report.total_sales, 45000);
        assert_eq!(report.total_completed_count, 1);

        assert!(matches!(
            h.client.update_status("missing".to_string(), OrderStatus::Completed).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn overflowing_checkout_is_rejected_and_service_keeps_running() {
        let h = start();

        let err = h
            .client
            .create_product(ProductDraft::new("Mahal", i64::MAX, 10, Category::Bawang))
            .await
            .unwrap_err();
        assert!(err.is_validation());

        let mut request = checkout_request(&h.client, 2, Customer::new("Budi", "0812", "Brebes")).await;
        request.lines[0].product.price = u64::MAX / 2 + 1;
        let err = h.client.checkout(request).await.unwrap_err();

        assert!(err.is_validation(), "unexpected error {:?}", err);
        assert!(h.orders.snapshot().is_empty());
        assert_eq!(h.client.list_products(None).await.unwrap().len(), 2);
        assert_eq!(h.client.get_product(1).await.unwrap().unwrap().stock, 100);
    }

    #[tokio::test]
    async fn shipping_quotes_come_from_the_table() {
        let h = start();
        assert_eq!(h.client.shipping_quote("JNT".to_string()).await.unwrap().cost, 12000);
        assert_eq!(h.client.shipping_rates().await.unwrap().len(), 3);
        assert!(matches!(
            h.client.shipping_quote("Pos".to_string()).await,
            Err(StoreError::UnknownShippingMethod(_))
        ));
    }
}
