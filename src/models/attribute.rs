//! Attributes: administrator-defined option lists.

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::client::{ApiRequest, SignalsClient};
use crate::envelope::Response;
use crate::error::{Result, SignalsError};
use crate::pagination::paginate_bodies;
use crate::traits::{Delete, Get, List, Save};
use crate::types::{AttrId, ObjectType};

const ENDPOINT: &str = "attributes";

/// One allowed value of an attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeOption {
    #[serde(default)]
    pub id: Option<String>,
    pub key: String,
    pub value: String,
}

/// An attribute and, once fetched, its options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    #[serde(rename = "type")]
    attribute_type: String,
    id: AttrId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip)]
    options: Option<Vec<AttributeOption>>,
}

impl Attribute {
    pub fn id(&self) -> &AttrId {
        &self.id
    }

    /// Value type of the attribute (e.g. `choice`).
    pub fn attribute_type(&self) -> &str {
        &self.attribute_type
    }

    /// Create an attribute with the given options.
    #[tracing::instrument(skip(client, options))]
    pub async fn create(
        client: &SignalsClient,
        name: &str,
        attribute_type: &str,
        description: &str,
        options: &[AttributeOption],
    ) -> Result<Self> {
        let option_ids: Vec<&str> = options.iter().filter_map(|o| o.id.as_deref()).collect();
        let body = json!({
            "data": {
                "type": ObjectType::Attribute,
                "attributes": {
                    "name": name,
                    "type": attribute_type,
                    "description": description,
                    "options": option_ids
                }
            }
        });

        let request = ApiRequest::new(Method::POST, [ENDPOINT]).json(&body)?;
        let response = client.call(request).await?;
        let attribute = Response::<Attribute>::decode(&response.content)?.single()?;
        tracing::debug!(id = %attribute.id, "attribute created");
        Ok(attribute)
    }

    /// Options of the attribute, fetched on first access.
    pub async fn options(&mut self, client: &SignalsClient) -> Result<&[AttributeOption]> {
        let options = match self.options.take() {
            Some(options) => options,
            None => {
                let response = client.get([ENDPOINT, self.id.as_str(), "options"]).await?;
                Response::<AttributeOption>::decode(&response.content)?.into_bodies()
            }
        };
        Ok(self.options.insert(options).as_slice())
    }

    /// Replace the locally held options; sent with the next [`Save`].
    pub fn set_options(&mut self, options: Vec<AttributeOption>) {
        self.options = Some(options);
    }

    /// Accept `value` only when it is one of the attribute's option values.
    ///
    /// # Errors
    ///
    /// Returns [`SignalsError::Validation`] for any other value.
    pub async fn validate<'v>(&mut self, client: &SignalsClient, value: &'v str) -> Result<&'v str> {
        let options = self.options(client).await?;
        if options.iter().any(|option| option.value == value) {
            Ok(value)
        } else {
            Err(SignalsError::Validation(format!(
                "'{value}' is not an option of attribute '{}'",
                self.name
            )))
        }
    }

    /// Body of the update: only the options, and only once they are known.
    pub fn save_payload(&self) -> Value {
        let attributes = match &self.options {
            Some(options) => json!({ "options": options }),
            None => json!({}),
        };
        json!({
            "data": {
                "type": ObjectType::Attribute,
                "id": self.id,
                "attributes": attributes
            }
        })
    }
}

#[async_trait]
impl Get for Attribute {
    type Id = AttrId;

    #[tracing::instrument(skip(client))]
    async fn get(client: &SignalsClient, id: AttrId) -> Result<Self> {
        let response = client.get([ENDPOINT, id.as_str()]).await?;
        Response::<Attribute>::decode(&response.content)?.single()
    }
}

#[async_trait]
impl List for Attribute {
    type Query = ();

    fn get_list<'a>(client: &'a SignalsClient, _query: &()) -> BoxStream<'a, Result<Self>> {
        paginate_bodies(client, ApiRequest::get([ENDPOINT])).boxed()
    }
}

#[async_trait]
impl Save for Attribute {
    #[tracing::instrument(skip(self, client), fields(id = %self.id))]
    async fn save(&self, client: &SignalsClient) -> Result<()> {
        let request = ApiRequest::new(Method::PATCH, [ENDPOINT, self.id.as_str()]).json(&self.save_payload())?;
        client.call(request).await?;
        tracing::debug!("attribute saved");
        Ok(())
    }
}

#[async_trait]
impl Delete for Attribute {
    #[tracing::instrument(skip(self, client), fields(id = %self.id))]
    async fn delete(&self, client: &SignalsClient) -> Result<()> {
        client
            .call(ApiRequest::new(Method::DELETE, [ENDPOINT, self.id.as_str()]))
            .await?;
        tracing::debug!("attribute deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attribute() -> Attribute {
        serde_json::from_value(json!({
            "type": "choice",
            "id": "attribute:42",
            "name": "Color",
            "description": "Sample color"
        }))
        .unwrap()
    }

    fn option(value: &str) -> AttributeOption {
        AttributeOption {
            id: Some(format!("opt-{value}")),
            key: value.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_decode() {
        let attribute = attribute();
        assert_eq!(attribute.id().id(), 42);
        assert_eq!(attribute.attribute_type(), "choice");
        assert!(attribute.options.is_none());
    }

    #[test]
    fn test_save_payload_excludes_immutable_fields() {
        let mut attribute = attribute();
        attribute.name = "Colour".to_string();
        attribute.set_options(vec![option("red")]);

        let payload = attribute.save_payload();
        assert_eq!(
            payload,
            json!({
                "data": {
                    "type": "attribute",
                    "id": "attribute:42",
                    "attributes": {
                        "options": [{"id": "opt-red", "key": "red", "value": "red"}]
                    }
                }
            })
        );
        assert!(payload["data"]["attributes"].get("name").is_none());
        assert!(payload["data"]["attributes"].get("type").is_none());
    }

    #[test]
    fn test_save_payload_without_options() {
        let payload = attribute().save_payload();
        assert_eq!(payload["data"]["attributes"], json!({}));
    }

    #[tokio::test]
    async fn test_validate_uses_cached_options() {
        // Options are already held, so no request reaches this client.
        let client = SignalsClient::new("key", "http://127.0.0.1:9").unwrap();
        let mut attribute = attribute();
        attribute.set_options(vec![option("red"), option("blue")]);

        assert_eq!(attribute.validate(&client, "blue").await.unwrap(), "blue");
        assert!(matches!(
            attribute.validate(&client, "green").await,
            Err(SignalsError::Validation(_))
        ));
    }
}
