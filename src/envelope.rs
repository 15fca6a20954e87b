//! JSON:API response envelopes.
//!
//! Every endpoint answers with `{"links": {...}, "data": ...}` where `data`
//! is either a single record or an array of records. Each record carries a
//! `type`, an `id`, optional `links` and an `attributes` body that decodes
//! into a model type.

use std::fmt;

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::error::{Result, SignalsError};
use crate::types::{AttrId, Eid, Mid, ObjectType};

/// Pagination and self links.
///
/// The server returns `next`/`prev` URLs with raw spaces in query values;
/// those are escaped as `%20` before parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links {
    #[serde(rename = "self", default, deserialize_with = "escaped_url")]
    pub self_link: Option<Url>,
    #[serde(default, deserialize_with = "escaped_url")]
    pub first: Option<Url>,
    #[serde(default, deserialize_with = "escaped_url")]
    pub next: Option<Url>,
    #[serde(default, deserialize_with = "escaped_url")]
    pub prev: Option<Url>,
}

/// Replace literal spaces so the link is a valid URL.
pub fn escape_spaces(raw: &str) -> String {
    raw.replace(' ', "%20")
}

fn escaped_url<'de, D>(deserializer: D) -> core::result::Result<Option<Url>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|raw| Url::parse(&escape_spaces(&raw)).map_err(de::Error::custom))
        .transpose()
}

/// Record identifier, decoded into the most specific family that accepts it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum RecordId {
    Entity(Eid),
    Material(Mid),
    Attribute(AttrId),
    Uuid(Uuid),
    Raw(String),
}

impl RecordId {
    /// Classify a raw identifier string.
    pub fn classify(raw: String) -> Self {
        if let Ok(eid) = Eid::parse(raw.as_str()) {
            return Self::Entity(eid);
        }
        if let Ok(mid) = Mid::parse(raw.as_str()) {
            return Self::Material(mid);
        }
        if let Ok(attr) = AttrId::parse(raw.as_str()) {
            return Self::Attribute(attr);
        }
        if let Ok(uuid) = Uuid::parse_str(&raw) {
            return Self::Uuid(uuid);
        }
        Self::Raw(raw)
    }

    pub fn as_eid(&self) -> Option<&Eid> {
        match self {
            Self::Entity(eid) => Some(eid),
            _ => None,
        }
    }

    pub fn as_mid(&self) -> Option<&Mid> {
        match self {
            Self::Material(mid) => Some(mid),
            _ => None,
        }
    }

    pub fn as_uuid(&self) -> Option<Uuid> {
        match self {
            Self::Uuid(uuid) => Some(*uuid),
            Self::Entity(eid) => Some(eid.id()),
            _ => None,
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entity(eid) => write!(f, "{eid}"),
            Self::Material(mid) => write!(f, "{mid}"),
            Self::Attribute(attr) => write!(f, "{attr}"),
            Self::Uuid(uuid) => write!(f, "{uuid}"),
            Self::Raw(raw) => f.write_str(raw),
        }
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        // Numeric ids occur for roles.
        let value = serde_json::Value::deserialize(deserializer)?;
        match value {
            serde_json::Value::String(raw) => Ok(Self::classify(raw)),
            serde_json::Value::Number(n) => Ok(Self::Raw(n.to_string())),
            other => Err(de::Error::custom(format!(
                "expected string record id, got {other}"
            ))),
        }
    }
}

/// One element of `data`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseData<T> {
    #[serde(rename = "type")]
    pub object_type: ObjectType,
    pub id: RecordId,
    #[serde(default)]
    pub links: Option<Links>,
    #[serde(rename = "attributes")]
    pub body: T,
}

/// `data` holds either one record or an array of records.
#[derive(Debug, Clone, PartialEq)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    /// All items, in order.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(item) => vec![item],
            Self::Many(items) => items,
        }
    }

    /// The single item, or the first of many.
    pub fn into_first(self) -> Option<T> {
        self.into_vec().into_iter().next()
    }

    pub fn len(&self) -> usize {
        match self {
            Self::One(_) => 1,
            Self::Many(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Map every item.
    pub fn map<U, F: FnMut(T) -> U>(self, mut f: F) -> OneOrMany<U> {
        match self {
            Self::One(item) => OneOrMany::One(f(item)),
            Self::Many(items) => OneOrMany::Many(items.into_iter().map(f).collect()),
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for OneOrMany<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        if value.is_array() {
            Vec::<T>::deserialize(value)
                .map(Self::Many)
                .map_err(de::Error::custom)
        } else {
            T::deserialize(value).map(Self::One).map_err(de::Error::custom)
        }
    }
}

/// A decoded response envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct Response<T> {
    #[serde(default)]
    pub links: Option<Links>,
    pub data: OneOrMany<ResponseData<T>>,
}

impl<T: DeserializeOwned> Response<T> {
    /// Decode an envelope from a raw JSON body.
    pub fn decode(body: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(body)?)
    }
}

impl<T> Response<T> {
    /// The `links.next` URL, if there is another page.
    pub fn next_link(&self) -> Option<&Url> {
        self.links.as_ref().and_then(|links| links.next.as_ref())
    }

    /// Bodies of all records, in order.
    pub fn into_bodies(self) -> Vec<T> {
        self.data.into_vec().into_iter().map(|item| item.body).collect()
    }

    /// Body of the single (or first) record.
    pub fn into_body(self) -> Option<T> {
        self.data.into_first().map(|item| item.body)
    }

    /// Body of the single (or first) record, failing on an empty `data` array.
    pub fn single(self) -> Result<T> {
        self.into_body().ok_or_else(|| SignalsError::UnexpectedType {
            expected: "a record",
            found: "empty data".to_string(),
        })
    }
}

/// `{"data": ...}` request wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataObject<T> {
    pub data: T,
}

/// `{type, id}` reference used in relationships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortDescription {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
}
