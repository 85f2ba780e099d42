/// Generates the read and delete methods of a client wrapping a
/// [`ResourceClient`](crate::actor_framework::ResourceClient).
///
/// `$map_err` converts framework errors into the client's error type.
#[macro_export]
macro_rules! impl_resource_client {
    ($client_name:ident, $entity:ty, $id:ty, $error:ty, $entity_name_snake:ident, $map_err:path) => {
        paste::paste! {
            impl $client_name {
                pub fn new(inner: $crate::actor_framework::ResourceClient<$entity>) -> Self {
                    Self { inner }
                }

                #[tracing::instrument(skip(self))]
                pub async fn [<get_ $entity_name_snake>](&self, id: $id) -> Result<Option<$entity>, $error> {
                    tracing::debug!("Sending request");
                    self.inner.get(id).await.map_err($map_err)
                }

                #[tracing::instrument(skip(self))]
                pub async fn [<list_ $entity_name_snake s>](&self) -> Result<Vec<$entity>, $error> {
                    tracing::debug!("Sending request");
                    self.inner.list().await.map_err($map_err)
                }

                #[tracing::instrument(skip(self))]
                pub async fn [<delete_ $entity_name_snake>](&self, id: $id) -> Result<(), $error> {
                    tracing::debug!("Sending request");
                    self.inner.delete(id).await.map_err($map_err)
                }
            }
        }
    };
}
