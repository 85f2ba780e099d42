use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Overall order status. Any transition is allowed, including back to pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Completed,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Pending => f.write_str("pending"),
            OrderStatus::Completed => f.write_str("completed"),
        }
    }
}

impl FromStr for OrderStatus {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "completed" => Ok(OrderStatus::Completed),
            other => Err(StoreError::ValidationError(format!("unknown order status: {}", other))),
        }
    }
}

/// Payment status, confirmed manually by the administrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Confirmed,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Pending => f.write_str("pending"),
            PaymentStatus::Confirmed => f.write_str("confirmed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "Transfer BRI")]
    TransferBri,
    #[serde(rename = "Transfer BCA")]
    TransferBca,
    #[serde(rename = "Transfer SeaBank")]
    TransferSeaBank,
    #[serde(rename = "COD (Bayar di Tempat)")]
    CashOnDelivery,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::TransferBri,
        PaymentMethod::TransferBca,
        PaymentMethod::TransferSeaBank,
        PaymentMethod::CashOnDelivery,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::TransferBri => "Transfer BRI",
            PaymentMethod::TransferBca => "Transfer BCA",
            PaymentMethod::TransferSeaBank => "Transfer SeaBank",
            PaymentMethod::CashOnDelivery => "COD (Bayar di Tempat)",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Recipient contact block. All three fields must be non-blank at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub phone: String,
    pub address: String,
}

impl Customer {
    pub fn new(name: impl Into<String>, phone: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            address: address.into(),
        }
    }
}

/// Frozen copy of a purchased product line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: u32,
    pub name: String,
    pub price: u64,
    pub quantity: u32,
}

impl LineItem {
    /// Saturates; committed lines were already checked at checkout.
    pub fn subtotal(&self) -> u64 {
        self.price.saturating_mul(u64::from(self.quantity))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub method: PaymentMethod,
    #[serde(default)]
    pub status: PaymentStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shipping {
    pub method: String,
    pub cost: u64,
    pub estimate: String,
}

/// A committed purchase. Items and total never change after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    #[serde(rename = "date", with = "order_date")]
    pub created_at: NaiveDateTime,
    pub username: String,
    pub customer: Customer,
    pub items: Vec<LineItem>,
    pub total: u64,
    pub payment: Payment,
    pub shipping: Shipping,
    #[serde(default)]
    pub status: OrderStatus,
}

impl Order {
    /// Order ids have second granularity; two checkouts in the same second share an id.
    pub fn id_for(created_at: &NaiveDateTime) -> String {
        created_at.format("%Y%m%d%H%M%S").to_string()
    }

    pub fn items_subtotal(&self) -> u64 {
        self.items.iter().fold(0, |acc, item| acc.saturating_add(item.subtotal()))
    }

    pub fn is_completed(&self) -> bool {
        self.status == OrderStatus::Completed
    }
}

mod order_date {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%d/%m/%Y %H:%M:%S";
    const LEGACY_FORMAT: &str = "%d/%m/%Y %H:%M";

    pub fn serialize<S: Serializer>(date: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(&raw, LEGACY_FORMAT))
            .map_err(de::Error::custom)
    }
}
