//! Core of the Tukang Bawang storefront: catalog, cart, checkout, order
//! lifecycle and accounts, served by single-writer actors over JSON files.

pub mod accounts;
pub mod actor_framework;
pub mod actors;
pub mod admin;
pub mod app_system;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod clients;
pub mod domain;
pub mod error;
pub mod ledger;
pub mod messages;
pub mod persistence;
pub mod session;
pub mod user_actor;

#[cfg(test)]
mod mock_framework;

pub use accounts::{Accounts, AdminCredentials};
pub use admin::AdminConsole;
pub use app_system::{StoreConfig, StoreSystem};
pub use error::{StoreError, StoreResult};
pub use session::{Actor, CheckoutState, Session};
