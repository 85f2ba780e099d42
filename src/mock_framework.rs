//! # Mock Framework
//!
//! Utilities for testing clients in isolation.
//!
//! Use [`create_mock_client`] or [`create_mock_shop`] to get a client and a
//! receiver. Then use helpers like [`expect_create`] or [`expect_get`] to
//! assert behavior and script the reply.

use tokio::sync::{mpsc, oneshot};

use crate::actor_framework::{Entity, FrameworkError, ResourceClient, ResourceRequest};
use crate::clients::ShopClient;
use crate::messages::ShopRequest;

type Reply<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Creates a mock resource client and a receiver for asserting requests.
///
/// The client sends to a channel the test controls, so actor behavior
/// (success, failure, delays) can be simulated deterministically.
pub fn create_mock_client<T: Entity>(buffer_size: usize) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

/// Same as [`create_mock_client`] for the shop service.
pub fn create_mock_shop(buffer_size: usize) -> (ShopClient, mpsc::Receiver<ShopRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ShopClient::new(sender), receiver)
}

/// Helper to verify that the next message is a Create request
pub async fn expect_create<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::CreateParams, Reply<T::Id>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Create { params, respond_to }) => Some((params, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a Get request
pub async fn expect_get<T: Entity>(receiver: &mut mpsc::Receiver<ResourceRequest<T>>) -> Option<(T::Id, Reply<Option<T>>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is a List request
pub async fn expect_list<T: Entity>(receiver: &mut mpsc::Receiver<ResourceRequest<T>>) -> Option<Reply<Vec<T>>> {
    match receiver.recv().await {
        Some(ResourceRequest::List { respond_to }) => Some(respond_to),
        _ => None,
    }
}

/// Helper to verify that the next message is a Delete request
pub async fn expect_delete<T: Entity>(receiver: &mut mpsc::Receiver<ResourceRequest<T>>) -> Option<(T::Id, Reply<()>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Delete { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::UserClient;
    use crate::domain::{User, UserCreate};
    use crate::error::StoreError;

    #[tokio::test]
    async fn test_mock_client() {
        let (client, mut receiver) = create_mock_client::<User>(10);

        // Test Create
        let create_task = tokio::spawn(async move { client.create(UserCreate::new("budi", "rahasia")).await });

        let (payload, responder) = expect_create(&mut receiver).await.expect("Expected Create request");
        assert_eq!(payload.username, "budi");
        responder.send(Ok("budi".to_string())).unwrap();

        let result = create_task.await.unwrap();
        assert_eq!(result, Ok("budi".to_string()));
    }

    #[tokio::test]
    async fn user_client_maps_framework_errors() {
        let (inner, mut receiver) = create_mock_client::<User>(10);
        let client = UserClient::new(inner);

        let task = tokio::spawn(async move { client.delete_user("ghost".to_string()).await });

        let (id, responder) = expect_delete(&mut receiver).await.expect("Expected Delete request");
        assert_eq!(id, "ghost");
        responder.send(Err(FrameworkError::NotFound(id))).unwrap();

        assert_eq!(task.await.unwrap(), Err(StoreError::NotFound("user ghost".to_string())));
    }

    #[tokio::test]
    async fn user_client_lists_through_actor() {
        let (inner, mut receiver) = create_mock_client::<User>(10);
        let client = UserClient::new(inner);

        let task = tokio::spawn(async move { client.list_users().await });

        let responder = expect_list(&mut receiver).await.expect("Expected List request");
        responder.send(Ok(vec![User::new("budi", "rahasia")])).unwrap();

        assert_eq!(task.await.unwrap().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn dropped_actor_surfaces_as_communication_error() {
        let (client, receiver) = create_mock_shop(1);
        drop(receiver);

        assert!(matches!(
            client.report().await,
            Err(StoreError::ActorCommunicationError(_))
        ));
    }
}
