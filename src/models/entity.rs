//! Notebook-hierarchy entities.
//!
//! Every entity body carries the same common fields ([`EntityCommon`]);
//! kind-specific types wrap them and are selected from the body's `type`
//! field by the entity registry. Kinds this crate does not model decode as
//! [`Entity::Generic`].

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use futures::StreamExt;
use once_cell::sync::Lazy;
use reqwest::Method;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Value};

use crate::client::{ApiRequest, SignalsClient};
use crate::envelope::{Response, ResponseData, ShortDescription};
use crate::error::Result;
use crate::models::container::{Experiment, Notebook};
use crate::models::content::{ChemicalDrawing, Image, SamplesContainer, Text};
use crate::models::table::Table;
use crate::pagination::paginate;
use crate::resolver::{Registry, ResolverError};
use crate::traits::{Delete, Get, List, Save};
use crate::types::{open_enum, Eid, EntityType};

pub(crate) const ENDPOINT: &str = "entities";

/// Fields shared by every entity.
///
/// Identifier, kind, timestamps and digest are read-only; `name` and
/// `description` can be edited and pushed back with [`Save`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityCommon {
    eid: Eid,
    #[serde(rename = "type")]
    entity_type: EntityType,
    created_at: DateTime<Utc>,
    edited_at: DateTime<Utc>,
    #[serde(default)]
    digest: Option<String>,
    /// Display name.
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: Option<String>,
}

impl EntityCommon {
    pub fn eid(&self) -> &Eid {
        &self.eid
    }

    pub fn entity_type(&self) -> &EntityType {
        &self.entity_type
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn edited_at(&self) -> DateTime<Utc> {
        self.edited_at
    }

    /// Server-assigned content digest, used for optimistic concurrency.
    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }

    /// `{type, id}` reference used in creation relationships.
    pub fn short_description(&self) -> ShortDescription {
        ShortDescription {
            kind: self.entity_type.to_string(),
            id: self.eid.to_string(),
        }
    }

    /// Body of the properties update: only the editable fields.
    pub fn save_payload(&self) -> Value {
        json!({
            "data": [
                {"attributes": {"name": "Name", "value": self.name}},
                {"attributes": {"name": "Description", "value": self.description.clone().unwrap_or_default()}}
            ]
        })
    }

    /// Push `name` and `description` to the server.
    #[tracing::instrument(skip(self, client), fields(eid = %self.eid))]
    pub async fn save_with(&self, client: &SignalsClient, force: bool) -> Result<()> {
        let request = ApiRequest::new(Method::PATCH, [ENDPOINT, self.eid.as_str(), "properties"])
            .query("force", force)
            .json(&self.save_payload())?;
        client.call(request).await?;
        tracing::debug!("entity saved");
        Ok(())
    }

    /// Delete the entity, passing the known digest so the server can reject
    /// stale deletes unless `force` is set.
    #[tracing::instrument(skip(self, client), fields(eid = %self.eid))]
    pub async fn delete_with(&self, client: &SignalsClient, force: bool) -> Result<()> {
        let request = ApiRequest::new(Method::DELETE, [ENDPOINT, self.eid.as_str()])
            .query_opt("digest", self.digest())
            .query("force", force);
        client.call(request).await?;
        tracing::debug!("entity deleted");
        Ok(())
    }

    /// Re-fetch the entity and take over the server's editable fields.
    pub async fn refresh(&mut self, client: &SignalsClient) -> Result<()> {
        let fresh = Entity::get(client, self.eid.clone()).await?;
        self.copy_editable_from(fresh.common());
        Ok(())
    }

    fn copy_editable_from(&mut self, other: &EntityCommon) {
        self.name = other.name.clone();
        self.description = other.description.clone();
    }
}

#[async_trait]
impl Save for EntityCommon {
    async fn save(&self, client: &SignalsClient) -> Result<()> {
        self.save_with(client, true).await
    }
}

#[async_trait]
impl Delete for EntityCommon {
    async fn delete(&self, client: &SignalsClient) -> Result<()> {
        self.delete_with(client, true).await
    }
}

/// Any entity, resolved to its most specific known kind.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Entity {
    Notebook(Notebook),
    Experiment(Experiment),
    Text(Text),
    ChemicalDrawing(ChemicalDrawing),
    Image(Image),
    SamplesContainer(SamplesContainer),
    Table(Table),
    /// A kind without a dedicated type; only the common fields are kept.
    Generic(EntityCommon),
}

static ENTITIES: Lazy<core::result::Result<Registry<Entity>, ResolverError>> = Lazy::new(|| {
    Registry::builder("entities", "type")
        .candidate("journal", Entity::Notebook)
        .candidate("experiment", Entity::Experiment)
        .candidate("text", Entity::Text)
        .candidate("chemicalDrawing", Entity::ChemicalDrawing)
        .candidate("imageResource", Entity::Image)
        .candidate("samplesContainer", Entity::SamplesContainer)
        .candidate("grid", Entity::Table)
        .fallback(Entity::Generic)
        .build()
});

/// The entity discriminator table.
pub fn registry() -> core::result::Result<&'static Registry<Entity>, ResolverError> {
    ENTITIES.as_ref().map_err(Clone::clone)
}

impl<'de> Deserialize<'de> for Entity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        registry()
            .map_err(de::Error::custom)?
            .decode(&value)
            .map_err(de::Error::custom)
    }
}

impl Entity {
    pub fn common(&self) -> &EntityCommon {
        match self {
            Self::Notebook(e) => e.common(),
            Self::Experiment(e) => e.common(),
            Self::Text(e) => e.common(),
            Self::ChemicalDrawing(e) => e.common(),
            Self::Image(e) => e.common(),
            Self::SamplesContainer(e) => e.common(),
            Self::Table(e) => e.common(),
            Self::Generic(common) => common,
        }
    }

    pub fn common_mut(&mut self) -> &mut EntityCommon {
        match self {
            Self::Notebook(e) => e.common_mut(),
            Self::Experiment(e) => e.common_mut(),
            Self::Text(e) => e.common_mut(),
            Self::ChemicalDrawing(e) => e.common_mut(),
            Self::Image(e) => e.common_mut(),
            Self::SamplesContainer(e) => e.common_mut(),
            Self::Table(e) => e.common_mut(),
            Self::Generic(common) => common,
        }
    }

    pub fn eid(&self) -> &Eid {
        self.common().eid()
    }

    pub fn name(&self) -> &str {
        &self.common().name
    }

    pub fn entity_type(&self) -> &EntityType {
        self.common().entity_type()
    }

    /// Whether the body decoded as a dedicated kind rather than the fallback.
    pub fn is_specific(&self) -> bool {
        !matches!(self, Self::Generic(_))
    }
}

/// Create an entity from a `POST entities` body.
pub(crate) async fn create_entity<B: Serialize + ?Sized>(
    client: &SignalsClient,
    body: &B,
    digest: Option<&str>,
    force: bool,
) -> Result<Entity> {
    let request = ApiRequest::new(Method::POST, [ENDPOINT])
        .query_opt("digest", digest)
        .query("force", force)
        .json(body)?;
    let response = client.call(request).await?;
    let entity = Response::<Entity>::decode(&response.content)?.single()?;
    tracing::debug!(eid = %entity.eid(), "entity created");
    Ok(entity)
}

#[async_trait]
impl Get for Entity {
    type Id = Eid;

    #[tracing::instrument(skip(client))]
    async fn get(client: &SignalsClient, eid: Eid) -> Result<Self> {
        let response = client.get([ENDPOINT, eid.as_str()]).await?;
        Response::<Entity>::decode(&response.content)?.single()
    }
}

#[async_trait]
impl List for Entity {
    type Query = EntityListQuery;

    fn get_list<'a>(client: &'a SignalsClient, query: &Self::Query) -> BoxStream<'a, Result<Self>> {
        match ApiRequest::get([ENDPOINT]).query_params(query) {
            Ok(request) => paginate(client, request, |record: ResponseData<Entity>| Ok(record.body)).boxed(),
            Err(err) => futures::stream::once(async move { Err(err) }).boxed(),
        }
    }
}

#[async_trait]
impl Save for Entity {
    async fn save(&self, client: &SignalsClient) -> Result<()> {
        self.common().save(client).await
    }
}

#[async_trait]
impl Delete for Entity {
    async fn delete(&self, client: &SignalsClient) -> Result<()> {
        self.common().delete(client).await
    }
}

open_enum! {
    /// Visibility filters for entity listings.
    pub enum IncludeOption {
        Mine => "mine",
        Others => "other",
        Shared => "shared",
        Trashed => "trashed",
        Untrashed => "untrashed",
        TrashedAncestor => "trashedAncestor",
        Starred => "starred",
        Unstarred => "unstarred",
        Template => "template",
        NonTemplate => "nontemplate",
        SystemTemplate => "systemTemplate",
        NonSystemTemplate => "nonSystemTemplate",
    }
}

/// Query parameters for listing entities.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EntityListQuery {
    /// Only these kinds.
    #[serde(
        rename = "includeTypes",
        serialize_with = "comma_joined",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub include_types: Vec<EntityType>,

    /// Every kind except these.
    #[serde(
        rename = "excludeTypes",
        serialize_with = "comma_joined",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub exclude_types: Vec<EntityType>,

    #[serde(
        rename = "includeOptions",
        serialize_with = "comma_joined",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub include_options: Vec<IncludeOption>,

    /// Modified at or after.
    #[serde(rename = "start", skip_serializing_if = "Option::is_none")]
    pub modified_after: Option<DateTime<Utc>>,

    /// Modified at or before.
    #[serde(rename = "end", skip_serializing_if = "Option::is_none")]
    pub modified_before: Option<DateTime<Utc>>,
}

impl EntityListQuery {
    #[must_use]
    pub fn include_types(mut self, types: impl IntoIterator<Item = EntityType>) -> Self {
        self.include_types.extend(types);
        self
    }

    #[must_use]
    pub fn exclude_types(mut self, types: impl IntoIterator<Item = EntityType>) -> Self {
        self.exclude_types.extend(types);
        self
    }

    #[must_use]
    pub fn include_options(mut self, options: impl IntoIterator<Item = IncludeOption>) -> Self {
        self.include_options.extend(options);
        self
    }

    #[must_use]
    pub fn modified_after(mut self, at: DateTime<Utc>) -> Self {
        self.modified_after = Some(at);
        self
    }

    #[must_use]
    pub fn modified_before(mut self, at: DateTime<Utc>) -> Self {
        self.modified_before = Some(at);
        self
    }
}

#[allow(clippy::ptr_arg)]
fn comma_joined<T: fmt::Display, S: Serializer>(
    items: &Vec<T>,
    serializer: S,
) -> core::result::Result<S::Ok, S::Error> {
    let joined = items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",");
    serializer.serialize_str(&joined)
}

/// Implements the accessors, conversions and CRUD traits shared by every
/// concrete entity kind. The type must have a `common: EntityCommon` field.
macro_rules! entity_kind {
    ($name:ident, $variant:ident, $expected:literal) => {
        impl $name {
            pub fn common(&self) -> &$crate::models::EntityCommon {
                &self.common
            }

            pub fn common_mut(&mut self) -> &mut $crate::models::EntityCommon {
                &mut self.common
            }

            pub fn eid(&self) -> &$crate::types::Eid {
                self.common.eid()
            }

            pub fn name(&self) -> &str {
                &self.common.name
            }
        }

        impl From<$name> for $crate::models::Entity {
            fn from(value: $name) -> Self {
                $crate::models::Entity::$variant(value)
            }
        }

        impl TryFrom<$crate::models::Entity> for $name {
            type Error = $crate::error::SignalsError;

            fn try_from(entity: $crate::models::Entity) -> ::core::result::Result<Self, Self::Error> {
                match entity {
                    $crate::models::Entity::$variant(value) => Ok(value),
                    other => Err($crate::error::SignalsError::UnexpectedType {
                        expected: $expected,
                        found: other.entity_type().to_string(),
                    }),
                }
            }
        }

        #[::async_trait::async_trait]
        impl $crate::traits::Get for $name {
            type Id = $crate::types::Eid;

            async fn get(
                client: &$crate::client::SignalsClient,
                eid: $crate::types::Eid,
            ) -> $crate::error::Result<Self> {
                let entity = <$crate::models::Entity as $crate::traits::Get>::get(client, eid).await?;
                Self::try_from(entity)
            }
        }

        #[::async_trait::async_trait]
        impl $crate::traits::Save for $name {
            async fn save(&self, client: &$crate::client::SignalsClient) -> $crate::error::Result<()> {
                self.common.save_with(client, true).await
            }
        }

        #[::async_trait::async_trait]
        impl $crate::traits::Delete for $name {
            async fn delete(&self, client: &$crate::client::SignalsClient) -> $crate::error::Result<()> {
                self.common.delete_with(client, true).await
            }
        }
    };
}

pub(crate) use entity_kind;

impl From<EntityCommon> for Entity {
    fn from(common: EntityCommon) -> Self {
        Self::Generic(common)
    }
}
