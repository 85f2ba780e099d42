use tracing::{debug, instrument};

use crate::actor_framework::{FrameworkError, ResourceClient};
use crate::domain::{User, UserCreate};
use crate::error::StoreError;
use crate::impl_resource_client;

/// Client for interacting with the User actor.
#[derive(Clone)]
pub struct UserClient {
    inner: ResourceClient<User>,
}

impl_resource_client!(UserClient, User, String, StoreError, user, user_error);

impl UserClient {
    /// Stores a new account and returns its username.
    #[instrument(fields(username = %params.username), skip(self, params))]
    pub async fn create_user(&self, params: UserCreate) -> Result<String, StoreError> {
        debug!("Sending request");
        self.inner.create(params).await.map_err(user_error)
    }
}

fn user_error(e: FrameworkError) -> StoreError {
    match e {
        FrameworkError::NotFound(username) => StoreError::NotFound(format!("user {}", username)),
        FrameworkError::Conflict(username) => StoreError::DuplicateUsername(username),
        FrameworkError::Invalid(msg) => StoreError::ValidationError(msg),
        FrameworkError::Persistence(msg) => StoreError::PersistenceError(msg),
        other @ (FrameworkError::ActorClosed | FrameworkError::ActorDropped) => {
            StoreError::ActorCommunicationError(other.to_string())
        }
    }
}
