//! Notebooks and experiments: entities that hold other entities.

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::client::{ApiRequest, SignalsClient};
use crate::envelope::{DataObject, OneOrMany, Response, ResponseData, ShortDescription};
use crate::error::Result;
use crate::models::entity::{create_entity, entity_kind, Entity, EntityCommon, ENDPOINT};
use crate::models::stoichiometry::Stoichiometry;
use crate::pagination::paginate;
use crate::types::{open_enum, EntityType};

/// Operations on entities that can have children.
#[async_trait]
pub trait Container: Send + Sync {
    /// The container's own common fields.
    fn container(&self) -> &EntityCommon;

    /// Stream the direct children of this container.
    fn get_children<'a>(&self, client: &'a SignalsClient) -> BoxStream<'a, Result<Entity>> {
        let request = ApiRequest::get([ENDPOINT, self.container().eid().as_str(), "children"]);
        paginate(client, request, |record: ResponseData<Entity>| Ok(record.body)).boxed()
    }

    /// Upload `content` as a new child named `name`.
    ///
    /// The server derives the child's kind from the file name and content
    /// type.
    async fn add_child(
        &self,
        client: &SignalsClient,
        name: &str,
        content: Vec<u8>,
        content_type: &str,
        force: bool,
    ) -> Result<Entity> {
        let parent = self.container();
        tracing::debug!(parent = %parent.eid(), name, content_type, "adding child");

        let request = ApiRequest::new(
            Method::POST,
            [ENDPOINT, parent.eid().as_str(), "children", name],
        )
        .query_opt("digest", parent.digest())
        .query("force", force)
        .header("Content-Type", content_type)
        .body(content);

        let response = client.call(request).await?;
        Response::<Entity>::decode(&response.content)?.single()
    }
}

#[derive(Debug, Serialize)]
struct CreateAttributes<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

#[derive(Debug, Default, Serialize)]
struct Relationships {
    #[serde(skip_serializing_if = "Option::is_none")]
    template: Option<DataObject<ShortDescription>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ancestors: Option<DataObject<Vec<ShortDescription>>>,
}

#[derive(Debug, Serialize)]
struct CreateBody<'a> {
    #[serde(rename = "type")]
    entity_type: EntityType,
    attributes: CreateAttributes<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    relationships: Option<Relationships>,
}

/// A notebook (`journal`), the top of the hierarchy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notebook {
    #[serde(flatten)]
    common: EntityCommon,
}

entity_kind!(Notebook, Notebook, "journal");

impl Notebook {
    /// Create an empty notebook.
    #[tracing::instrument(skip(client))]
    pub async fn create(
        client: &SignalsClient,
        name: &str,
        description: Option<&str>,
        force: bool,
    ) -> Result<Self> {
        let body = DataObject {
            data: CreateBody {
                entity_type: EntityType::Notebook,
                attributes: CreateAttributes { name, description },
                relationships: None,
            },
        };
        create_entity(client, &body, None, force).await?.try_into()
    }
}

impl Container for Notebook {
    fn container(&self) -> &EntityCommon {
        &self.common
    }
}

open_enum! {
    /// Whether an experiment still accepts changes.
    pub enum ExperimentState {
        Open => "open",
        Closed => "closed",
    }
}

/// An experiment inside a notebook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Experiment {
    #[serde(flatten)]
    common: EntityCommon,
    #[serde(default)]
    state: Option<ExperimentState>,
    #[serde(skip)]
    stoichiometry: Option<OneOrMany<Stoichiometry>>,
}

entity_kind!(Experiment, Experiment, "experiment");

impl Experiment {
    pub fn state(&self) -> Option<&ExperimentState> {
        self.state.as_ref()
    }

    /// Create an experiment, optionally from a template and inside a notebook.
    #[tracing::instrument(skip(client, template, notebook))]
    pub async fn create(
        client: &SignalsClient,
        name: &str,
        description: Option<&str>,
        template: Option<&Experiment>,
        notebook: Option<&Notebook>,
        force: bool,
    ) -> Result<Self> {
        let relationships = (template.is_some() || notebook.is_some()).then(|| Relationships {
            template: template.map(|t| DataObject {
                data: t.common.short_description(),
            }),
            ancestors: notebook.map(|n| DataObject {
                data: vec![n.common.short_description()],
            }),
        });

        let body = DataObject {
            data: CreateBody {
                entity_type: EntityType::Experiment,
                attributes: CreateAttributes { name, description },
                relationships,
            },
        };
        create_entity(client, &body, None, force).await?.try_into()
    }

    /// Stoichiometry of the experiment, fetched on first access.
    pub async fn stoichiometry(&mut self, client: &SignalsClient) -> Result<&OneOrMany<Stoichiometry>> {
        let data = match self.stoichiometry.take() {
            Some(data) => data,
            None => Stoichiometry::fetch_data(client, self.common.eid()).await?,
        };
        Ok(&*self.stoichiometry.insert(data))
    }
}

impl Container for Experiment {
    fn container(&self) -> &EntityCommon {
        &self.common
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::entity::tests::body;
    use serde_json::json;

    const NOTEBOOK_EID: &str = "journal:3f2504e0-4f89-11d3-9a0c-0305e82c3301";
    const TEMPLATE_EID: &str = "experiment:9a4d2a3e-43b0-4b8b-8d59-27a2c1b0e6f1";

    #[test]
    fn test_experiment_decodes_state() {
        let mut value = body(TEMPLATE_EID, "experiment");
        value["state"] = json!("closed");
        let experiment: Experiment = serde_json::from_value(value).unwrap();
        assert_eq!(experiment.state(), Some(&ExperimentState::Closed));
        assert!(experiment.stoichiometry.is_none());
    }

    #[test]
    fn test_create_body_with_relationships() {
        let notebook: Notebook = serde_json::from_value(body(NOTEBOOK_EID, "journal")).unwrap();
        let template: Experiment = serde_json::from_value(body(TEMPLATE_EID, "experiment")).unwrap();

        let body = DataObject {
            data: CreateBody {
                entity_type: EntityType::Experiment,
                attributes: CreateAttributes {
                    name: "Run 1",
                    description: None,
                },
                relationships: Some(Relationships {
                    template: Some(DataObject {
                        data: template.common.short_description(),
                    }),
                    ancestors: Some(DataObject {
                        data: vec![notebook.common.short_description()],
                    }),
                }),
            },
        };

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "data": {
                    "type": "experiment",
                    "attributes": {"name": "Run 1"},
                    "relationships": {
                        "template": {"data": {"type": "experiment", "id": TEMPLATE_EID}},
                        "ancestors": {"data": [{"type": "journal", "id": NOTEBOOK_EID}]}
                    }
                }
            })
        );
    }

    #[test]
    fn test_notebook_create_body() {
        let body = DataObject {
            data: CreateBody {
                entity_type: EntityType::Notebook,
                attributes: CreateAttributes {
                    name: "Lab book",
                    description: Some("2024"),
                },
                relationships: None,
            },
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"data": {"type": "journal", "attributes": {"name": "Lab book", "description": "2024"}}})
        );
    }
}
