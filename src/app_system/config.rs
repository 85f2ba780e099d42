use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::SystemError;
use crate::accounts::AdminCredentials;
use crate::checkout::ShippingTable;

pub const ENV_DATA_DIR: &str = "BAWANG_DATA_DIR";
pub const ENV_ADMIN_USERNAME: &str = "BAWANG_ADMIN_USERNAME";
pub const ENV_ADMIN_PASSWORD: &str = "BAWANG_ADMIN_PASSWORD";

const PRODUCTS_FILE: &str = "products.json";
const ORDERS_FILE: &str = "transactions.json";
const USERS_FILE: &str = "users.json";

/// Deployment settings. Every field has a default, so a partial JSON file is
/// enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
    pub image_dir: PathBuf,
    pub placeholder_image: String,
    pub admin: AdminCredentials,
    pub shipping: ShippingTable,
    pub channel_buffer: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            image_dir: PathBuf::from("assets/products"),
            placeholder_image: "assets/logo.png".to_string(),
            admin: AdminCredentials::default(),
            shipping: ShippingTable::default(),
            channel_buffer: 100,
        }
    }
}

impl StoreConfig {
    /// Reads `path` if given, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, SystemError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        info!(data_dir = %config.data_dir.display(), "Configuration loaded");
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, SystemError> {
        debug!(path = %path.display(), "Reading config file");
        let raw = fs::read_to_string(path).map_err(|source| SystemError::ConfigIo {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| SystemError::ConfigParse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Overrides file values with whatever `lookup` returns for the
    /// `BAWANG_*` keys.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup(ENV_DATA_DIR) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(username) = lookup(ENV_ADMIN_USERNAME) {
            self.admin.username = username;
        }
        if let Some(password) = lookup(ENV_ADMIN_PASSWORD) {
            self.admin.password = password;
        }
    }

    pub fn products_path(&self) -> PathBuf {
        self.data_dir.join(PRODUCTS_FILE)
    }

    pub fn orders_path(&self) -> PathBuf {
        self.data_dir.join(ORDERS_FILE)
    }

    pub fn users_path(&self) -> PathBuf {
        self.data_dir.join(USERS_FILE)
    }
}
