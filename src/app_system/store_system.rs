use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::{StoreConfig, SystemError};
use crate::accounts::{Accounts, AdminCredentials};
use crate::actor_framework::ResourceActor;
use crate::actors::{local_clock, ShopParts, ShopService};
use crate::admin::AdminConsole;
use crate::catalog::{sample_products, FsImageStore};
use crate::clients::{ShopClient, UserClient};
use crate::domain::{Order, Product, User};
use crate::error::{StoreError, StoreResult};
use crate::persistence::{JsonFileRepository, Repository};
use crate::session::Session;

/// The running store: the shop service and the user actor, wired together.
///
/// Responsible for starting up actors, seeding first-run data, and handling
/// shutdown.
pub struct StoreSystem {
    shop: ShopClient,
    accounts: Accounts,
    handles: Vec<JoinHandle<()>>,
}

impl StoreSystem {
    /// Starts the store on the JSON files under `config.data_dir`.
    ///
    /// A missing products file is seeded with the sample catalog.
    pub fn start(config: &StoreConfig) -> Result<Self, SystemError> {
        let products = JsonFileRepository::<Product>::new(config.products_path());
        if !products.exists() {
            products
                .save_all(&sample_products(&config.image_dir))
                .map_err(StoreError::from)?;
            info!(path = %products.path().display(), "Seeded sample products");
        }

        let parts = ShopParts {
            products: Box::new(products),
            orders: Box::new(JsonFileRepository::<Order>::new(config.orders_path())),
            images: Box::new(FsImageStore::new(config.placeholder_image.clone())),
            shipping: config.shipping.clone(),
            placeholder_image: config.placeholder_image.clone(),
            clock: local_clock(),
        };
        let users = Box::new(JsonFileRepository::<User>::new(config.users_path()));

        Self::from_parts(parts, users, config.admin.clone(), config.channel_buffer)
    }

    /// Starts the store on caller-supplied storage.
    pub fn from_parts(
        parts: ShopParts,
        users: Box<dyn Repository<User>>,
        admin: AdminCredentials,
        buffer_size: usize,
    ) -> Result<Self, SystemError> {
        let (shop_service, shop) = ShopService::new(buffer_size, parts)?;
        let shop_handle = tokio::spawn(shop_service.run());

        let (user_actor, user_resource_client) = ResourceActor::<User>::new(buffer_size, users)
            .map_err(|e| StoreError::PersistenceError(e.to_string()))?;
        let accounts = Accounts::new(UserClient::new(user_resource_client), admin);
        let user_handle = tokio::spawn(user_actor.run());

        info!("Store system started");
        Ok(Self {
            shop,
            accounts,
            handles: vec![shop_handle, user_handle],
        })
    }

    pub fn shop(&self) -> &ShopClient {
        &self.shop
    }

    pub fn accounts(&self) -> &Accounts {
        &self.accounts
    }

    pub async fn login(&self, username: &str, password: &str) -> StoreResult<Session> {
        self.accounts.authenticate(username, password).await
    }

    /// Admin operations for `session`, or `PermissionDenied`.
    pub fn admin_console(&self, session: &Session) -> StoreResult<AdminConsole> {
        AdminConsole::open(session, self.shop.clone(), self.accounts.clone())
    }

    /// Stops the shop service and waits for every task.
    ///
    /// The user actor stops once the last `Accounts`/`AdminConsole` clone is
    /// dropped, so callers must release theirs first.
    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down system...");
        if let Err(e) = self.shop.shutdown().await {
            warn!(error = %e, "Shop service already stopped");
        }

        // Drop clients to close channels
        drop(self.shop);
        drop(self.accounts);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(SystemError::TaskFailed(e.to_string()));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
