//! Delete trait for removing records.

use async_trait::async_trait;

use crate::client::SignalsClient;
use crate::error::Result;

/// Remove a record on the server.
#[async_trait]
pub trait Delete {
    /// Delete the record.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn delete(&self, client: &SignalsClient) -> Result<()>;
}
