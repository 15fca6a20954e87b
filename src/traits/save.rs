//! Save trait for pushing local changes.

use async_trait::async_trait;

use crate::client::SignalsClient;
use crate::error::Result;

/// Push locally modified fields back to the server.
///
/// Only fields that may change after creation are sent; identifiers,
/// timestamps and digests never appear in the request body.
#[async_trait]
pub trait Save {
    /// Save the record.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn save(&self, client: &SignalsClient) -> Result<()>;
}
