//! Get trait for fetching single records.

use async_trait::async_trait;

use crate::client::SignalsClient;
use crate::error::Result;

/// Fetch a single record by ID.
///
/// Implement this trait for model types that can be fetched individually
/// by a unique identifier.
///
/// # Example
///
/// ```ignore
/// use signals_notebook::{Eid, Entity, Get, SignalsClient};
///
/// let client = SignalsClient::from_env()?;
/// let eid: Eid = "experiment:2f5a0c1e-8a3f-4e4f-9a55-0d9d3c2b1a10".parse()?;
/// let entity = Entity::get(&client, eid).await?;
/// ```
#[async_trait]
pub trait Get: Sized {
    /// The ID type for this record (e.g. [`crate::Eid`]).
    type Id: Send;

    /// Fetch the record by ID.
    ///
    /// # Arguments
    ///
    /// * `client` - The Signals Notebook API client
    /// * `id` - The record identifier
    ///
    /// # Errors
    ///
    /// Returns an error if the record is not found, the request fails or
    /// the response cannot be decoded.
    async fn get(client: &SignalsClient, id: Self::Id) -> Result<Self>;
}
