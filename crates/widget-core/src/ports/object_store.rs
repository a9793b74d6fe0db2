//! ObjectStore port - bucket 単位の point operations（S3 / InMemory）

use async_trait::async_trait;

use crate::domain::TransportError;

/// One bucket of an object store.
///
/// Deleting a missing key is not an error. `get` of a missing key is `Ok(None)`.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    fn bucket(&self) -> &str;

    /// First key in listing order, optionally restricted to a prefix.
    async fn first_key(&self, prefix: Option<&str>) -> Result<Option<String>, TransportError>;

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, TransportError>;

    async fn put(&self, key: &str, body: Vec<u8>) -> Result<(), TransportError>;

    async fn delete(&self, key: &str) -> Result<(), TransportError>;
}
