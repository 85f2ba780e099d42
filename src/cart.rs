//! Session-scoped shopping cart.
//!
//! Lines keep the name and price seen when the product was added, while every
//! quantity check runs against the live product passed in by the caller.

use serde::{Deserialize, Serialize};

use crate::domain::{LineItem, Product};
use crate::error::{StoreError, StoreResult};

/// Name and price of a product as captured when it entered the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: u32,
    pub name: String,
    pub price: u64,
}

impl From<&Product> for ProductSnapshot {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: ProductSnapshot,
    pub quantity: u32,
}

impl CartItem {
    /// `price × quantity`, or a validation error when it does not fit in a `u64`.
    pub fn subtotal(&self) -> StoreResult<u64> {
        self.product
            .price
            .checked_mul(u64::from(self.quantity))
            .ok_or_else(amount_too_large)
    }

    /// Frozen order line for this cart entry.
    pub fn to_line_item(&self) -> LineItem {
        LineItem {
            id: self.product.id,
            name: self.product.name.clone(),
            price: self.product.price,
            quantity: self.quantity,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn line(&self, index: usize) -> StoreResult<&CartItem> {
        self.items.get(index).ok_or(StoreError::IndexOutOfRange {
            index,
            len: self.items.len(),
        })
    }

    /// Adds `quantity` of `product`, merging into an existing line for the same id.
    ///
    /// The requested (or merged) quantity must stay within the product's current
    /// stock; otherwise nothing changes.
    pub fn add(&mut self, product: &Product, quantity: u32) -> StoreResult<()> {
        let existing = self.items.iter().position(|item| item.product.id == product.id);
        let already = existing.map_or(0, |index| self.items[index].quantity);
        let combined = already.saturating_add(quantity);
        ensure_within_stock(product, quantity, combined)?;

        let mut next = self.items.clone();
        match existing {
            Some(index) => next[index].quantity = combined,
            None => next.push(CartItem {
                product: ProductSnapshot::from(product),
                quantity,
            }),
        }
        checked_total(&next)?;
        self.items = next;
        Ok(())
    }

    /// Sets the quantity of line `index`; `product` must be the live record for that line.
    pub fn update_quantity(&mut self, index: usize, product: &Product, quantity: u32) -> StoreResult<()> {
        let line = self.line(index)?;
        if line.product.id != product.id {
            return Err(StoreError::ValidationError(format!(
                "cart line {} holds product {}, not {}",
                index, line.product.id, product.id
            )));
        }
        ensure_within_stock(product, quantity, quantity)?;
        let mut next = self.items.clone();
        next[index].quantity = quantity;
        checked_total(&next)?;
        self.items = next;
        Ok(())
    }

    pub fn remove_line(&mut self, index: usize) -> StoreResult<CartItem> {
        self.line(index)?;
        Ok(self.items.remove(index))
    }

    /// Sum of price × quantity over all lines. `add` and `update_quantity`
    /// refuse any change that would push it past `u64::MAX`.
    pub fn total(&self) -> u64 {
        self.items.iter().fold(0, |acc, item| {
            acc.saturating_add(item.product.price.saturating_mul(u64::from(item.quantity)))
        })
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// Sum of line subtotals, failing instead of overflowing.
pub fn checked_total(lines: &[CartItem]) -> StoreResult<u64> {
    lines
        .iter()
        .try_fold(0u64, |acc, line| acc.checked_add(line.subtotal()?).ok_or_else(amount_too_large))
}

pub(crate) fn amount_too_large() -> StoreError {
    StoreError::ValidationError("amount exceeds the supported range".to_string())
}

fn ensure_within_stock(product: &Product, requested: u32, resulting: u32) -> StoreResult<()> {
    if requested == 0 || resulting > product.stock {
        return Err(StoreError::InsufficientStock {
            product_id: product.id,
            requested: resulting,
            available: product.stock,
        });
    }
    Ok(())
}
