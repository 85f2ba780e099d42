//! Per-session state: who is acting, their cart, and where they are in checkout.
//!
//! A `Session` is owned by the presentation layer and passed into the core; the
//! core holds no global session state.

use tracing::{info, instrument, warn};

use crate::cart::Cart;
use crate::checkout::CheckoutRequest;
use crate::clients::ShopClient;
use crate::domain::{Customer, Order, PaymentMethod};
use crate::error::{StoreError, StoreResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    Guest,
    Customer(String),
    Admin(String),
}

/// `Browsing → CheckoutForm → Committed`, falling back to `Browsing` when a
/// submission fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutState {
    Browsing,
    CheckoutForm,
    Committed { order_id: String },
}

#[derive(Debug, Clone)]
pub struct Session {
    actor: Actor,
    cart: Cart,
    checkout: CheckoutState,
}

impl Default for Session {
    fn default() -> Self {
        Self::guest()
    }
}

impl Session {
    pub fn guest() -> Self {
        Self {
            actor: Actor::Guest,
            cart: Cart::new(),
            checkout: CheckoutState::Browsing,
        }
    }

    pub(crate) fn authenticated(username: &str, is_admin: bool) -> Self {
        let actor = if is_admin {
            Actor::Admin(username.to_string())
        } else {
            Actor::Customer(username.to_string())
        };
        Self {
            actor,
            ..Self::guest()
        }
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn username(&self) -> Option<&str> {
        match &self.actor {
            Actor::Guest => None,
            Actor::Customer(name) | Actor::Admin(name) => Some(name),
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.actor, Actor::Admin(_))
    }

    pub fn require_admin(&self) -> StoreResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(StoreError::PermissionDenied("administrator login required".to_string()))
        }
    }

    fn require_login(&self) -> StoreResult<&str> {
        self.username()
            .ok_or_else(|| StoreError::PermissionDenied("login required".to_string()))
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn checkout_state(&self) -> &CheckoutState {
        &self.checkout
    }

    pub fn logout(&mut self) {
        *self = Self::guest();
    }

    // --- Cart ---

    /// Adds `quantity` of a product, checked against its current stock.
    #[instrument(skip(self, shop))]
    pub async fn add_to_cart(&mut self, shop: &ShopClient, product_id: u32, quantity: u32) -> StoreResult<()> {
        let product = shop
            .get_product(product_id)
            .await?
            .ok_or_else(|| crate::catalog::product_not_found(product_id))?;
        self.cart.add(&product, quantity)
    }

    #[instrument(skip(self, shop))]
    pub async fn update_quantity(&mut self, shop: &ShopClient, line_index: usize, quantity: u32) -> StoreResult<()> {
        let product_id = self.cart.line(line_index)?.product.id;
        let product = shop
            .get_product(product_id)
            .await?
            .ok_or(StoreError::ProductUnavailable(product_id))?;
        self.cart.update_quantity(line_index, &product, quantity)
    }

    pub fn remove_line(&mut self, line_index: usize) -> StoreResult<()> {
        self.cart.remove_line(line_index).map(|_| ())
    }

    pub fn cart_total(&self) -> u64 {
        self.cart.total()
    }

    // --- Checkout ---

    pub fn begin_checkout(&mut self) -> StoreResult<()> {
        self.require_login()?;
        if self.cart.is_empty() {
            return Err(StoreError::EmptyCart);
        }
        self.checkout = CheckoutState::CheckoutForm;
        Ok(())
    }

    pub fn cancel_checkout(&mut self) {
        if self.checkout == CheckoutState::CheckoutForm {
            self.checkout = CheckoutState::Browsing;
        }
    }

    /// Sends the cart to the shop service for an atomic commit.
    ///
    /// The cart is cleared only after the order and stock are persisted; on any
    /// failure the cart is kept and the session returns to browsing.
    #[instrument(skip(self, shop, customer))]
    pub async fn submit_checkout(
        &mut self,
        shop: &ShopClient,
        customer: Customer,
        shipping_method: &str,
        payment_method: PaymentMethod,
    ) -> StoreResult<Order> {
        if self.checkout != CheckoutState::CheckoutForm {
            return Err(StoreError::ValidationError("checkout has not been started".to_string()));
        }
        let username = self.require_login()?.to_string();
        let request = CheckoutRequest {
            username,
            customer,
            shipping_method: shipping_method.to_string(),
            payment_method,
            lines: self.cart.items().to_vec(),
        };

        match shop.checkout(request).await {
            Ok(order) => {
                info!(order_id = %order.id, "Checkout committed, clearing cart");
                self.cart.clear();
                self.checkout = CheckoutState::Committed {
                    order_id: order.id.clone(),
                };
                Ok(order)
            }
            Err(e) => {
                warn!(error = %e, "Checkout failed, cart kept");
                self.checkout = CheckoutState::Browsing;
                Err(e)
            }
        }
    }

    /// Leaves the confirmation screen after a successful commit.
    pub fn finish_checkout(&mut self) {
        if matches!(self.checkout, CheckoutState::Committed { .. }) {
            self.checkout = CheckoutState::Browsing;
        }
    }

    /// The logged-in user's orders, most recent first.
    pub async fn history(&self, shop: &ShopClient) -> StoreResult<Vec<Order>> {
        let username = self.require_login()?;
        shop.history_for(username.to_string()).await
    }
}
