use std::path::PathBuf;

use tracing::{error, info, Instrument};

use bawang_store::app_system::{setup_tracing, StoreConfig, StoreSystem, SystemError};
use bawang_store::domain::{Customer, OrderStatus, PaymentMethod, PaymentStatus};

#[tokio::main]
async fn main() -> Result<(), SystemError> {
    // Setup tracing once for the entire application
    setup_tracing();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = StoreConfig::load(config_path.as_deref())?;

    info!("Starting storefront");
    let system = StoreSystem::start(&config)?;

    let span = tracing::info_span!("storefront_walkthrough");
    if let Err(e) = walkthrough(&system, &config).instrument(span).await {
        error!(error = %e, "Walkthrough failed");
    }

    system.shutdown().await?;
    info!("Application completed successfully");
    Ok(())
}

/// One customer purchase followed by the administrator completing it.
async fn walkthrough(system: &StoreSystem, config: &StoreConfig) -> bawang_store::StoreResult<()> {
    let shop = system.shop();

    for product in shop.list_products(None).await? {
        info!(
            product_id = product.id,
            name = %product.name,
            price = product.price,
            stock = product.stock,
            rating = %product.star_rating(),
            "Catalog entry"
        );
    }

    match system.accounts().register("pembeli", "bawang123").await {
        Ok(()) => info!("Demo customer registered"),
        Err(e) => info!(error = %e, "Demo customer already present"),
    }

    let mut session = system.login("pembeli", "bawang123").await?;
    session.add_to_cart(shop, 1, 2).await?;
    info!(cart_total = session.cart_total(), "Cart ready");

    session.begin_checkout()?;
    let order = session
        .submit_checkout(
            shop,
            Customer::new("Pembeli", "081234567890", "Jl. Raya Brebes No. 1"),
            "JNE",
            PaymentMethod::TransferBri,
        )
        .await?;
    info!(order_id = %order.id, total = order.total, "Order placed");
    session.finish_checkout();

    for past in session.history(shop).await? {
        info!(order_id = %past.id, status = %past.status, "Order history");
    }
    session.logout();

    let admin_session = system
        .login(&config.admin.username, &config.admin.password)
        .await?;
    let console = system.admin_console(&admin_session)?;
    console.update_payment_status(&order.id, PaymentStatus::Confirmed).await?;
    console.update_status(&order.id, OrderStatus::Completed).await?;

    let report = console.report().await?;
    info!(
        total_sales = report.total_sales,
        completed = report.total_completed_count,
        "Sales report"
    );
    for recent in console.recent_orders().await? {
        info!(order_id = %recent.id, username = %recent.username, total = recent.total, "Recent order");
    }
    for product in shop.list_products(None).await?.iter().filter(|p| p.is_low_stock()) {
        info!(product_id = product.id, stock = product.stock, "Low stock");
    }

    Ok(())
}
