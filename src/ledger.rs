//! Order collection: status transitions, history and sales reporting.

use serde::Serialize;

use crate::domain::{Order, OrderStatus, PaymentStatus};
use crate::error::{StoreError, StoreResult};

/// Sales over completed orders, recomputed on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SalesReport {
    pub total_sales: u64,
    pub total_completed_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    orders: Vec<Order>,
}

impl Ledger {
    pub fn new(orders: Vec<Order>) -> Self {
        Self { orders }
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn append(&mut self, order: Order) {
        self.orders.push(order);
    }

    pub fn get(&self, id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    fn get_mut(&mut self, id: &str) -> StoreResult<&mut Order> {
        self.orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("order {}", id)))
    }

    /// Sets the overall status. Completed orders may go back to pending.
    ///
    /// Orders sharing an id (same-second checkouts) resolve to the first stored one.
    pub fn update_status(&mut self, id: &str, status: OrderStatus) -> StoreResult<Order> {
        let order = self.get_mut(id)?;
        order.status = status;
        Ok(order.clone())
    }

    pub fn update_payment_status(&mut self, id: &str, status: PaymentStatus) -> StoreResult<Order> {
        let order = self.get_mut(id)?;
        order.payment.status = status;
        Ok(order.clone())
    }

    pub fn report(&self) -> SalesReport {
        self.orders
            .iter()
            .filter(|o| o.is_completed())
            .fold(SalesReport::default(), |acc, o| SalesReport {
                total_sales: acc.total_sales + o.total,
                total_completed_count: acc.total_completed_count + 1,
            })
    }

    /// Orders placed by `username`, most recent first.
    pub fn history_for(&self, username: &str) -> Vec<Order> {
        self.orders
            .iter()
            .rev()
            .filter(|o| o.username == username)
            .cloned()
            .collect()
    }

    /// The last `limit` orders in stored order.
    pub fn recent(&self, limit: usize) -> Vec<Order> {
        let start = self.orders.len().saturating_sub(limit);
        self.orders[start..].to_vec()
    }
}
