//! Pagination over `links.next`.
//!
//! List endpoints return one page per envelope; the next page is whatever
//! URL the server put in `links.next`. [`paginate`] turns that chain into a
//! lazy stream: nothing is requested until the stream is polled, and each
//! follow-up page is requested only after the previous one is exhausted.

use async_stream::try_stream;
use futures::Stream;
use serde::de::DeserializeOwned;
use url::Url;

use crate::client::{ApiRequest, SignalsClient};
use crate::envelope::{Links, Response, ResponseData};
use crate::error::Result;

/// One decoded page of results.
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Links returned with the page.
    pub links: Option<Links>,
}

impl<T> Page<T> {
    /// Decode a page from an envelope, mapping every record.
    pub fn from_response<B, F>(response: Response<B>, map: F) -> Result<Self>
    where
        F: FnMut(ResponseData<B>) -> Result<T>,
    {
        let links = response.links;
        let items = response
            .data
            .into_vec()
            .into_iter()
            .map(map)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { items, links })
    }

    /// URL of the following page, if any.
    pub fn next_link(&self) -> Option<&Url> {
        self.links.as_ref().and_then(|links| links.next.as_ref())
    }

    /// Whether there are more pages.
    pub fn has_more(&self) -> bool {
        self.next_link().is_some()
    }

    /// Map the items to a different type.
    #[must_use]
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            links: self.links,
        }
    }

    /// Returns true if this page has no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of items on this page.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns an iterator over the items in this page.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Page<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Fetch and decode a single page.
pub async fn fetch_page<B, T, F>(client: &SignalsClient, request: ApiRequest, map: F) -> Result<Page<T>>
where
    B: DeserializeOwned,
    F: FnMut(ResponseData<B>) -> Result<T>,
{
    let response = client.call(request).await?;
    let envelope: Response<B> = Response::decode(&response.content)?;
    Page::from_response(envelope, map)
}

/// Stream every record reachable from `request` by following `links.next`.
///
/// Records are yielded in server order across pages; duplicates returned by
/// the server are passed through. The first error ends the stream.
pub fn paginate<'a, B, T, F>(
    client: &'a SignalsClient,
    request: ApiRequest,
    mut map: F,
) -> impl Stream<Item = Result<T>> + Send + 'a
where
    B: DeserializeOwned + Send + 'a,
    T: Send + 'a,
    F: FnMut(ResponseData<B>) -> Result<T> + Send + 'a,
{
    try_stream! {
        let mut next = Some(request);
        let mut pages = 0usize;

        while let Some(request) = next.take() {
            let page = fetch_page(client, request, &mut map).await?;
            pages += 1;

            next = page.next_link().map(|url| ApiRequest::follow(url.as_str()));
            if next.is_some() {
                tracing::debug!(pages, "following next page link");
            }

            for item in page.items {
                yield item;
            }
        }
    }
}

/// Stream the record bodies of a paginated endpoint.
pub fn paginate_bodies<'a, T>(
    client: &'a SignalsClient,
    request: ApiRequest,
) -> impl Stream<Item = Result<T>> + Send + 'a
where
    T: DeserializeOwned + Send + 'a,
{
    paginate(client, request, |record: ResponseData<T>| Ok(record.body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ObjectType;

    #[derive(Debug, serde::Deserialize)]
    struct Body {
        name: String,
    }

    fn envelope(next: Option<&str>) -> Response<Body> {
        let mut json = serde_json::json!({
            "links": {"self": "https://example.com/attributes"},
            "data": [
                {"type": "attribute", "id": "attribute:1", "attributes": {"name": "a"}},
                {"type": "attribute", "id": "attribute:2", "attributes": {"name": "b"}}
            ]
        });
        if let Some(next) = next {
            json["links"]["next"] = serde_json::Value::String(next.to_string());
        }
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_page_from_response() {
        let page = Page::from_response(envelope(None), |record| Ok(record.body.name)).unwrap();
        assert_eq!(page.items, vec!["a", "b"]);
        assert!(!page.has_more());
        assert_eq!(page.len(), 2);
    }

    #[test]
    fn test_page_next_link() {
        let page = Page::from_response(
            envelope(Some("https://example.com/attributes?page[offset]=2")),
            |record| Ok(record.object_type),
        )
        .unwrap();
        assert!(page.has_more());
        assert_eq!(page.items, vec![ObjectType::Attribute, ObjectType::Attribute]);
    }

    #[test]
    fn test_page_map_error_propagates() {
        let result: Result<Page<String>> = Page::from_response(envelope(None), |_| {
            Err(crate::SignalsError::Validation("bad".to_string()))
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_page_map() {
        let page = Page::from_response(envelope(None), |record| Ok(record.body.name))
            .unwrap()
            .map(|name| name.len());
        assert_eq!(page.items, vec![1, 1]);
    }
}
