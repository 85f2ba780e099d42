//! Registration and login. The administrator is a configured credential pair,
//! not a stored user.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::clients::UserClient;
use crate::domain::{User, UserCreate};
use crate::error::{StoreError, StoreResult};
use crate::session::Session;

/// Administrator login, fixed at deployment time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl Default for AdminCredentials {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "admin123".to_string(),
        }
    }
}

impl AdminCredentials {
    /// The single rule for administrator identity.
    pub fn is_admin(&self, username: &str) -> bool {
        username == self.username
    }

    fn matches(&self, username: &str, password: &str) -> bool {
        self.is_admin(username) && password == self.password
    }
}

#[derive(Clone)]
pub struct Accounts {
    users: UserClient,
    admin: AdminCredentials,
}

impl Accounts {
    pub fn new(users: UserClient, admin: AdminCredentials) -> Self {
        Self { users, admin }
    }

    pub fn is_admin(&self, username: &str) -> bool {
        self.admin.is_admin(username)
    }

    /// Creates a customer account. The administrator username counts as taken.
    #[instrument(skip(self, password))]
    pub async fn register(&self, username: &str, password: &str) -> StoreResult<()> {
        if username.trim().is_empty() || password.trim().is_empty() {
            return Err(StoreError::ValidationError("username and password are required".to_string()));
        }
        if self.is_admin(username) {
            warn!("Registration attempted with the administrator username");
            return Err(StoreError::DuplicateUsername(username.to_string()));
        }
        self.users.create_user(UserCreate::new(username, password)).await?;
        info!("User registered");
        Ok(())
    }

    /// Checks the administrator pair first, then stored users.
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, username: &str, password: &str) -> StoreResult<Session> {
        if self.admin.matches(username, password) {
            info!("Administrator logged in");
            return Ok(Session::authenticated(username, true));
        }
        match self.users.get_user(username.to_string()).await? {
            Some(user) if user.matches(username, password) => {
                info!("User logged in");
                Ok(Session::authenticated(username, self.is_admin(username)))
            }
            _ => {
                warn!("Login rejected");
                Err(StoreError::AuthenticationError)
            }
        }
    }

    pub(crate) async fn list_users(&self) -> StoreResult<Vec<User>> {
        self.users.list_users().await
    }

    pub(crate) async fn delete_user(&self, username: &str) -> StoreResult<()> {
        self.users.delete_user(username.to_string()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor_framework::ResourceActor;
    use crate::persistence::MemoryRepository;

    fn start(users: Vec<User>) -> (Accounts, MemoryRepository<User>) {
        let repo = MemoryRepository::with_records(users);
        let (actor, client) = ResourceActor::new(10, Box::new(repo.clone())).unwrap();
        tokio::spawn(actor.run());
        (Accounts::new(UserClient::new(client), AdminCredentials::default()), repo)
    }

    #[tokio::test]
    async fn admin_pair_works_without_stored_user() {
        let (accounts, _) = start(Vec::new());
        let session = accounts.authenticate("admin", "admin123").await.unwrap();
        assert!(session.is_admin());
        assert_eq!(session.username(), Some("admin"));

        assert_eq!(
            accounts.authenticate("admin", "wrong").await.unwrap_err(),
            StoreError::AuthenticationError
        );
    }

    #[tokio::test]
    async fn registered_users_log_in_as_customers() {
        let (accounts, repo) = start(Vec::new());
        accounts.register("budi", "rahasia").await.unwrap();
        assert_eq!(repo.snapshot(), vec![User::new("budi", "rahasia")]);

        let session = accounts.authenticate("budi", "rahasia").await.unwrap();
        assert!(!session.is_admin());
        assert_eq!(session.username(), Some("budi"));

        assert_eq!(
            accounts.authenticate("budi", "salah").await.unwrap_err(),
            StoreError::AuthenticationError
        );
        assert_eq!(
            accounts.authenticate("joko", "rahasia").await.unwrap_err(),
            StoreError::AuthenticationError
        );
    }

    #[tokio::test]
    async fn register_rejects_duplicates_and_blanks() {
        let (accounts, _) = start(vec![User::new("budi", "rahasia")]);

        assert_eq!(
            accounts.register("budi", "lain").await.unwrap_err(),
            StoreError::DuplicateUsername("budi".to_string())
        );
        assert_eq!(
            accounts.register("admin", "x").await.unwrap_err(),
            StoreError::DuplicateUsername("admin".to_string())
        );
        assert!(accounts.register("", "x").await.unwrap_err().is_validation());
        assert!(accounts.register("sari", " ").await.unwrap_err().is_validation());
    }
}
