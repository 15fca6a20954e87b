//! Typed `"<kind>:<key>"` identifiers.
//!
//! Every family validates its kind and key grammar on construction and
//! keeps the original string, so formatting an identifier gives back
//! exactly what the server sent.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::{EntityType, MaterialType, ObjectType};

/// Why an identifier string was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// Not of the form `<kind>:<key>`.
    #[error("Malformed identifier '{0}': expected '<kind>:<key>'")]
    Malformed(String),

    /// The kind is not allowed for this identifier family.
    #[error("Unknown kind '{kind}' in identifier '{value}'")]
    UnknownKind { value: String, kind: String },

    /// The key does not match the family's key grammar.
    #[error("Invalid key '{key}' in identifier '{value}'")]
    BadKey { value: String, key: String },
}

/// Classification of an [`IdError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdErrorReason {
    Malformed,
    UnknownKind,
    BadKey,
}

impl IdError {
    /// The error class, without the offending value.
    pub fn reason(&self) -> IdErrorReason {
        match self {
            Self::Malformed(_) => IdErrorReason::Malformed,
            Self::UnknownKind { .. } => IdErrorReason::UnknownKind,
            Self::BadKey { .. } => IdErrorReason::BadKey,
        }
    }

    fn bad_key(value: &str, key: &str) -> Self {
        Self::BadKey {
            value: value.to_string(),
            key: key.to_string(),
        }
    }
}

/// Split on the first `:`; both halves must be non-empty.
fn split(value: &str) -> Result<(&str, &str), IdError> {
    match value.split_once(':') {
        Some((kind, key)) if !kind.is_empty() && !key.is_empty() => Ok((kind, key)),
        _ => Err(IdError::Malformed(value.to_string())),
    }
}

/// Entity identifier, e.g. `experiment:2f5a…`.
///
/// Any kind is accepted so that entity kinds added server-side still parse;
/// the key must be a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Eid(String);

impl Eid {
    /// Parse and validate an entity identifier.
    pub fn parse(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        let (_, key) = split(&value)?;
        Uuid::parse_str(key).map_err(|_| IdError::bad_key(&value, key))?;
        Ok(Self(value))
    }

    /// Build an identifier from its parts.
    pub fn new(kind: &EntityType, id: Uuid) -> Self {
        Self(format!("{}:{}", kind, id))
    }

    /// The entity kind; unknown kinds come back as [`EntityType::Other`].
    pub fn kind(&self) -> EntityType {
        EntityType::from(self.kind_str())
    }

    /// The raw kind prefix.
    pub fn kind_str(&self) -> &str {
        self.0.split_once(':').map_or("", |(kind, _)| kind)
    }

    /// The UUID key.
    pub fn id(&self) -> Uuid {
        self.0
            .split_once(':')
            .and_then(|(_, key)| Uuid::parse_str(key).ok())
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Material identifier, e.g. `batch:5a1f`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Mid(String);

impl Mid {
    /// Parse and validate a material identifier.
    pub fn parse(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        let (kind, key) = split(&value)?;
        kind.parse::<MaterialType>().map_err(|_| IdError::UnknownKind {
            value: value.clone(),
            kind: kind.to_string(),
        })?;
        if !key.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(IdError::bad_key(&value, key));
        }
        Ok(Self(value))
    }

    /// Build an identifier from its parts.
    pub fn new(kind: MaterialType, id: &str) -> Result<Self, IdError> {
        Self::parse(format!("{}:{}", kind, id))
    }

    /// The material kind.
    pub fn kind(&self) -> MaterialType {
        let kind = self.0.split_once(':').map_or("", |(kind, _)| kind);
        kind.parse().unwrap_or(MaterialType::Asset)
    }

    /// The hexadecimal key.
    pub fn id(&self) -> &str {
        self.0.split_once(':').map_or("", |(_, key)| key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Attribute identifier, e.g. `attribute:42`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AttrId(String);

impl AttrId {
    /// Parse and validate an attribute identifier.
    pub fn parse(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        let (kind, key) = split(&value)?;
        if kind != ObjectType::Attribute.as_str() {
            return Err(IdError::UnknownKind {
                value: value.clone(),
                kind: kind.to_string(),
            });
        }
        key.parse::<i64>()
            .map_err(|_| IdError::bad_key(&value, key))?;
        Ok(Self(value))
    }

    /// Build an identifier for the given attribute number.
    pub fn new(id: i64) -> Self {
        Self(format!("{}:{}", ObjectType::Attribute, id))
    }

    /// Always [`ObjectType::Attribute`].
    pub fn kind(&self) -> ObjectType {
        ObjectType::Attribute
    }

    /// The numeric key.
    pub fn id(&self) -> i64 {
        self.0
            .split_once(':')
            .and_then(|(_, key)| key.parse().ok())
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! string_id_impls {
    ($($name:ident),+) => {
        $(
            impl FromStr for $name {
                type Err = IdError;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    Self::parse(s)
                }
            }

            impl TryFrom<String> for $name {
                type Error = IdError;

                fn try_from(value: String) -> Result<Self, Self::Error> {
                    Self::parse(value)
                }
            }

            impl From<$name> for String {
                fn from(value: $name) -> Self {
                    value.0
                }
            }

            impl AsRef<str> for $name {
                fn as_ref(&self) -> &str {
                    &self.0
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }
        )+
    };
}

string_id_impls!(Eid, Mid, AttrId);
