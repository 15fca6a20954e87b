//! Materials hierarchy: libraries, assets and batches.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use futures::StreamExt;
use once_cell::sync::Lazy;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::{ApiRequest, SignalsClient};
use crate::envelope::{Response, ResponseData};
use crate::error::{Result, SignalsError};
use crate::pagination::paginate;
use crate::resolver::{Registry, ResolverError};
use crate::traits::{Get, List};
use crate::types::{MaterialType, Mid};

const ENDPOINT: &str = "materials";

/// Fields shared by every material record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialCommon {
    eid: Mid,
    #[serde(rename = "type")]
    kind: String,
    asset_type_id: String,
    #[serde(rename = "library")]
    library_name: String,
    created_at: DateTime<Utc>,
    edited_at: DateTime<Utc>,
    #[serde(default)]
    digest: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl MaterialCommon {
    pub fn eid(&self) -> &Mid {
        &self.eid
    }

    /// The record's kind, when it is one of the modelled ones.
    pub fn material_type(&self) -> Option<MaterialType> {
        self.kind.parse().ok()
    }

    /// Raw `type` value.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Hex id of the owning library.
    pub fn asset_type_id(&self) -> &str {
        &self.asset_type_id
    }

    pub fn library_name(&self) -> &str {
        &self.library_name
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn edited_at(&self) -> DateTime<Utc> {
        self.edited_at
    }

    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }
}

macro_rules! material_kind {
    ($(#[$meta:meta])* $name:ident, $expected:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            #[serde(flatten)]
            common: MaterialCommon,
        }

        impl $name {
            pub fn common(&self) -> &MaterialCommon {
                &self.common
            }

            pub fn eid(&self) -> &Mid {
                self.common.eid()
            }

            pub fn name(&self) -> &str {
                &self.common.name
            }
        }

        impl From<$name> for Material {
            fn from(value: $name) -> Self {
                Material::$name(value)
            }
        }

        impl TryFrom<Material> for $name {
            type Error = SignalsError;

            fn try_from(material: Material) -> Result<Self> {
                match material {
                    Material::$name(value) => Ok(value),
                    other => Err(SignalsError::UnexpectedType {
                        expected: $expected,
                        found: other.common().kind().to_string(),
                    }),
                }
            }
        }

        #[async_trait]
        impl Get for $name {
            type Id = Mid;

            async fn get(client: &SignalsClient, mid: Mid) -> Result<Self> {
                Material::get(client, mid).await?.try_into()
            }
        }
    };
}

material_kind!(
    /// A material library (asset type).
    Library,
    "assetType"
);
material_kind!(
    /// An asset registered in a library.
    Asset,
    "asset"
);
material_kind!(
    /// A batch (lot) of an asset.
    Batch,
    "batch"
);

/// Any material record, resolved by its `type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Material {
    Library(Library),
    Asset(Asset),
    Batch(Batch),
    Generic(MaterialCommon),
}

static MATERIALS: Lazy<core::result::Result<Registry<Material>, ResolverError>> = Lazy::new(|| {
    Registry::builder("materials", "type")
        .candidate("assetType", Material::Library)
        .candidate("asset", Material::Asset)
        .candidate("batch", Material::Batch)
        .fallback(Material::Generic)
        .build()
});

/// The material discriminator table.
pub fn registry() -> core::result::Result<&'static Registry<Material>, ResolverError> {
    MATERIALS.as_ref().map_err(Clone::clone)
}

impl<'de> Deserialize<'de> for Material {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        registry()
            .map_err(de::Error::custom)?
            .decode(&value)
            .map_err(de::Error::custom)
    }
}

impl Material {
    pub fn common(&self) -> &MaterialCommon {
        match self {
            Self::Library(m) => &m.common,
            Self::Asset(m) => &m.common,
            Self::Batch(m) => &m.common,
            Self::Generic(common) => common,
        }
    }

    pub fn eid(&self) -> &Mid {
        self.common().eid()
    }

    pub fn name(&self) -> &str {
        &self.common().name
    }
}

#[async_trait]
impl Get for Material {
    type Id = Mid;

    #[tracing::instrument(skip(client))]
    async fn get(client: &SignalsClient, mid: Mid) -> Result<Self> {
        let response = client.get([ENDPOINT, mid.as_str()]).await?;
        Response::<Material>::decode(&response.content)?.single()
    }
}

/// Stream `request`, requiring every record to decode as `T`.
fn list_of<'a, T>(client: &'a SignalsClient, request: ApiRequest) -> BoxStream<'a, Result<T>>
where
    T: TryFrom<Material, Error = SignalsError> + Send + 'a,
{
    paginate(client, request, |record: ResponseData<Material>| {
        T::try_from(record.body)
    })
    .boxed()
}

#[async_trait]
impl List for Library {
    type Query = ();

    fn get_list<'a>(client: &'a SignalsClient, _query: &()) -> BoxStream<'a, Result<Self>> {
        list_of(client, ApiRequest::get([ENDPOINT, "libraries"]))
    }
}

impl Library {
    /// Stream the assets of this library.
    pub fn get_assets<'a>(&self, client: &'a SignalsClient) -> BoxStream<'a, Result<Asset>> {
        list_of(client, ApiRequest::get([ENDPOINT, self.name(), "assets"]))
    }

    /// The asset named `name`.
    #[tracing::instrument(skip(self, client), fields(library = %self.name()))]
    pub async fn get_asset(&self, client: &SignalsClient, name: &str) -> Result<Asset> {
        let response = client.get([ENDPOINT, self.name(), "assets", name]).await?;
        Response::<Material>::decode(&response.content)?
            .single()?
            .try_into()
    }
}

impl Asset {
    /// Stream the batches of this asset.
    pub fn get_batches<'a>(&self, client: &'a SignalsClient) -> BoxStream<'a, Result<Batch>> {
        let request = ApiRequest::get([
            ENDPOINT,
            self.common.library_name(),
            "assets",
            self.name(),
            "batches",
        ]);
        list_of(client, request)
    }

    /// The library this asset belongs to.
    pub async fn library(&self, client: &SignalsClient) -> Result<Library> {
        let mid = Mid::new(MaterialType::Library, self.common.asset_type_id())?;
        Library::get(client, mid).await
    }
}
