//! Checkout rules: shipping lookup, customer validation and the commit plan
//! that turns cart lines into an order plus a decremented catalog.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::cart::{self, CartItem};
use crate::catalog::Catalog;
use crate::domain::{Customer, Order, OrderStatus, Payment, PaymentMethod, PaymentStatus, Shipping};
use crate::error::{StoreError, StoreResult};

/// One courier option with its flat fee and delivery window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingRate {
    pub code: String,
    pub label: String,
    pub cost: u64,
    pub estimate: String,
}

impl ShippingRate {
    pub fn new(code: &str, label: &str, cost: u64, estimate: &str) -> Self {
        Self {
            code: code.to_string(),
            label: label.to_string(),
            cost,
            estimate: estimate.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShippingTable {
    rates: Vec<ShippingRate>,
}

impl Default for ShippingTable {
    fn default() -> Self {
        Self {
            rates: vec![
                ShippingRate::new("JNE", "JNE Reguler", 15000, "2-3 hari"),
                ShippingRate::new("JNT", "J&T Express", 12000, "1-2 hari"),
                ShippingRate::new("SiCepat", "SiCepat", 10000, "3-5 hari"),
            ],
        }
    }
}

impl ShippingTable {
    pub fn new(rates: Vec<ShippingRate>) -> Self {
        Self { rates }
    }

    pub fn rates(&self) -> &[ShippingRate] {
        &self.rates
    }

    /// Looks up a courier by code, ignoring case.
    pub fn rate(&self, method: &str) -> StoreResult<&ShippingRate> {
        let method = method.trim();
        self.rates
            .iter()
            .find(|r| r.code.eq_ignore_ascii_case(method))
            .ok_or_else(|| StoreError::UnknownShippingMethod(method.to_string()))
    }

    pub fn cost(&self, method: &str) -> StoreResult<u64> {
        self.rate(method).map(|r| r.cost)
    }
}

/// Everything the shop service needs to commit one session's cart.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub username: String,
    pub customer: Customer,
    pub shipping_method: String,
    pub payment_method: PaymentMethod,
    pub lines: Vec<CartItem>,
}

/// Order plus the catalog it leaves behind, not yet persisted.
#[derive(Debug, Clone)]
pub struct CommitPlan {
    pub order: Order,
    pub catalog: Catalog,
}

/// Fails with every blank contact field, in form order.
pub fn validate_customer(customer: &Customer) -> StoreResult<()> {
    let missing: Vec<String> = [
        ("name", &customer.name),
        ("phone", &customer.phone),
        ("address", &customer.address),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(field, _)| field.to_string())
    .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(StoreError::MissingFields(missing))
    }
}

/// Builds the order for `request` and applies its stock decrements to a copy of `catalog`.
///
/// The total is recomputed from the cart lines and the shipping table. Any
/// failure returns before anything is produced, so the caller has nothing to roll back.
pub fn plan_commit(
    catalog: &Catalog,
    shipping: &ShippingTable,
    request: &CheckoutRequest,
    created_at: NaiveDateTime,
) -> StoreResult<CommitPlan> {
    validate_customer(&request.customer)?;
    if request.lines.is_empty() {
        return Err(StoreError::EmptyCart);
    }
    let rate = shipping.rate(&request.shipping_method)?;

    let mut next = catalog.clone();
    for line in &request.lines {
        let product = next
            .get_mut(line.product.id)
            .ok_or(StoreError::ProductUnavailable(line.product.id))?;
        if line.quantity == 0 || line.quantity > product.stock {
            return Err(StoreError::InsufficientStock {
                product_id: product.id,
                requested: line.quantity,
                available: product.stock,
            });
        }
        product.stock -= line.quantity;
    }

    let items: Vec<_> = request.lines.iter().map(CartItem::to_line_item).collect();
    let subtotal = cart::checked_total(&request.lines)?;
    let total = subtotal.checked_add(rate.cost).ok_or_else(cart::amount_too_large)?;
    let order = Order {
        id: Order::id_for(&created_at),
        created_at,
        username: request.username.clone(),
        customer: request.customer.clone(),
        items,
        total,
        payment: Payment {
            method: request.payment_method,
            status: PaymentStatus::Pending,
        },
        shipping: Shipping {
            method: rate.code.clone(),
            cost: rate.cost,
            estimate: rate.estimate.clone(),
        },
        status: OrderStatus::Pending,
    };

    Ok(CommitPlan { order, catalog: next })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::Cart;
    use crate::domain::{Category, Product};

    fn p1() -> Product {
        Product {
            id: 1,
            name: "Bawang Merah".to_string(),
            price: 15000,
            stock: 100,
            description: String::new(),
            category: Category::Bawang,
            rating: 4.5,
            image: "assets/logo.png".to_string(),
        }
    }

    fn at() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2024-05-01 10:00:05", "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn request(lines: Vec<CartItem>, customer: Customer) -> CheckoutRequest {
        CheckoutRequest {
            username: "budi".to_string(),
            customer,
            shipping_method: "JNE".to_string(),
            payment_method: PaymentMethod::TransferBri,
            lines,
        }
    }

    fn customer() -> Customer {
        Customer::new("Budi", "081234567890", "Jl. Raya Brebes 1")
    }

    #[test]
    fn shipping_table_lookup() {
        let table = ShippingTable::default();
        assert_eq!(table.cost("JNE").unwrap(), 15000);
        assert_eq!(table.cost("jnt").unwrap(), 12000);
        assert_eq!(table.rate("SiCepat").unwrap().estimate, "3-5 hari");
        assert_eq!(
            table.cost("Pos"),
            Err(StoreError::UnknownShippingMethod("Pos".to_string()))
        );
    }

    #[test]
    fn missing_fields_are_all_listed() {
        let err = validate_customer(&Customer::new("", "0812", "   ")).unwrap_err();
        assert_eq!(err, StoreError::MissingFields(vec!["name".into(), "address".into()]));
        assert!(err.is_validation());
        assert!(validate_customer(&customer()).is_ok());
    }

    #[test]
    fn plan_totals_cart_plus_shipping_and_decrements_stock() {
        let catalog = Catalog::new(vec![p1()]);
        let mut cart = Cart::new();
        cart.add(&p1(), 2).unwrap();

        let plan = plan_commit(&catalog, &ShippingTable::default(), &request(cart.items().to_vec(), customer()), at()).unwrap();

        assert_eq!(plan.order.total, 45000);
        assert_eq!(plan.order.id, "20240501100005");
        assert_eq!(plan.order.shipping.method, "JNE");
        assert_eq!(plan.order.status, OrderStatus::Pending);
        assert_eq!(plan.order.payment.status, PaymentStatus::Pending);
        assert_eq!(plan.catalog.get(1).unwrap().stock, 98);
        // The source catalog is untouched.
        assert_eq!(catalog.get(1).unwrap().stock, 100);
    }

    #[test]
    fn deleted_product_fails_whole_plan() {
        let mut cart = Cart::new();
        cart.add(&p1(), 1).unwrap();
        let gone = Product { id: 9, ..p1() };
        cart.add(&gone, 1).unwrap();

        let catalog = Catalog::new(vec![p1()]);
        let err = plan_commit(&catalog, &ShippingTable::default(), &request(cart.items().to_vec(), customer()), at())
            .unwrap_err();
        assert_eq!(err, StoreError::ProductUnavailable(9));
    }

    #[test]
    fn validation_precedes_other_checks() {
        let catalog = Catalog::new(vec![p1()]);
        let err = plan_commit(&catalog, &ShippingTable::default(), &request(Vec::new(), Customer::default()), at())
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::MissingFields(vec!["name".into(), "phone".into(), "address".into()])
        );

        let err = plan_commit(&catalog, &ShippingTable::default(), &request(Vec::new(), customer()), at()).unwrap_err();
        assert_eq!(err, StoreError::EmptyCart);
    }

    #[test]
    fn overflowing_total_is_a_validation_error() {
        let pricey = Product {
            price: u64::MAX - 100,
            ..p1()
        };
        let mut cart = Cart::new();
        cart.add(&pricey, 1).unwrap();
        let catalog = Catalog::new(vec![pricey]);

        let err = plan_commit(&catalog, &ShippingTable::default(), &request(cart.items().to_vec(), customer()), at())
            .unwrap_err();
        assert!(err.is_validation(), "unexpected error {:?}", err);

        let doubled = CartItem {
            quantity: 2,
            ..cart.items()[0].clone()
        };
        let err = plan_commit(&catalog, &ShippingTable::default(), &request(vec![doubled], customer()), at())
            .unwrap_err();
        assert!(err.is_validation(), "unexpected error {:?}", err);
    }

    #[test]
    fn stale_cart_cannot_oversell() {
        let mut cart = Cart::new();
        cart.add(&p1(), 5).unwrap();
        let catalog = Catalog::new(vec![Product { stock: 3, ..p1() }]);

        let err = plan_commit(&catalog, &ShippingTable::default(), &request(cart.items().to_vec(), customer()), at())
            .unwrap_err();
        assert!(matches!(err, StoreError::InsufficientStock { requested: 5, available: 3, .. }));
    }
}
