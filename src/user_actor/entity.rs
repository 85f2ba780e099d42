use crate::actor_framework::{Entity, FrameworkError};
use crate::domain::{User, UserCreate};

impl Entity for User {
    type Id = String;
    type CreateParams = UserCreate;

    fn id(&self) -> &String {
        &self.username
    }

    /// The username is the id, so it must be non-blank and unused.
    fn assign_id(existing: &[Self], params: &UserCreate) -> Result<String, FrameworkError> {
        if params.username.trim().is_empty() || params.password.trim().is_empty() {
            return Err(FrameworkError::Invalid("username and password are required".to_string()));
        }
        if existing.iter().any(|u| u.username == params.username) {
            return Err(FrameworkError::Conflict(params.username.clone()));
        }
        Ok(params.username.clone())
    }

    fn from_create_params(id: String, params: UserCreate) -> Result<Self, FrameworkError> {
        Ok(Self {
            username: id,
            password: params.password,
        })
    }
}
