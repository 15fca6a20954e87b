//! List trait for streaming collections of records.

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::TryStreamExt;

use crate::client::SignalsClient;
use crate::error::Result;

/// List/filter records, following pagination links lazily.
///
/// # Example
///
/// ```ignore
/// use futures::TryStreamExt;
/// use signals_notebook::{Entity, EntityListQuery, List, SignalsClient};
///
/// let client = SignalsClient::from_env()?;
///
/// // Stream records page by page
/// let mut entities = Entity::get_list(&client, &EntityListQuery::default());
/// while let Some(entity) = entities.try_next().await? {
///     println!("{}", entity.name());
/// }
///
/// // Or collect every page
/// let all = Entity::list_all(&client, &EntityListQuery::default()).await?;
/// ```
#[async_trait]
pub trait List: Sized + Send + 'static {
    /// Query parameters for filtering.
    type Query: Default + Send + Sync;

    /// Stream all records matching the query.
    ///
    /// No request is made until the stream is polled; subsequent pages are
    /// requested as the previous one is consumed.
    fn get_list<'a>(client: &'a SignalsClient, query: &Self::Query) -> BoxStream<'a, Result<Self>>;

    /// Collect every record matching the query.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails.
    async fn list_all(client: &SignalsClient, query: &Self::Query) -> Result<Vec<Self>> {
        Self::get_list(client, query).try_collect().await
    }
}
