//! Discriminator enums shared by identifiers, envelopes and models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::IdError;

/// Declares a string enum that keeps values it does not know as `Other(raw)`.
///
/// The server adds kinds over time; these must round-trip instead of
/// failing the decode of the whole record.
macro_rules! open_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
            /// A value this client does not model.
            Other(String),
        }

        impl $name {
            /// Wire representation.
            pub fn as_str(&self) -> &str {
                match self {
                    $( Self::$variant => $wire, )+
                    Self::Other(raw) => raw,
                }
            }

            /// Whether this value is one of the modelled variants.
            pub fn is_known(&self) -> bool {
                !matches!(self, Self::Other(_))
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                match raw.as_str() {
                    $( $wire => Self::$variant, )+
                    _ => Self::Other(raw),
                }
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self::from(raw.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                match value {
                    $name::Other(raw) => raw,
                    known => known.as_str().to_string(),
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use open_enum;

open_enum! {
    /// Top-level record type of a response envelope (`data[].type`).
    pub enum ObjectType {
        Entity => "entity",
        AdtRow => "adtRow",
        ColumnDefinitions => "columnDefinitions",
        Material => "material",
        AssetType => "assetType",
        Attribute => "attribute",
        Stoichiometry => "stoichiometry",
        User => "user",
        Profile => "profile",
        Role => "role",
        Group => "group",
    }
}

open_enum! {
    /// Kind of a notebook-hierarchy entity.
    pub enum EntityType {
        Notebook => "journal",
        Experiment => "experiment",
        Text => "text",
        ChemicalDrawing => "chemicalDrawing",
        Grid => "grid",
        Asset => "asset",
        BioSequence => "bioSequence",
        UploadedResource => "uploadedResource",
        ImageResource => "imageResource",
        SamplesContainer => "samplesContainer",
    }
}

/// Kind of a materials-hierarchy record.
///
/// Unlike [`EntityType`] this set is closed: material identifiers with any
/// other kind are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialType {
    /// A material library (asset type).
    #[serde(rename = "assetType")]
    Library,
    /// An asset inside a library.
    #[serde(rename = "asset")]
    Asset,
    /// A batch of an asset.
    #[serde(rename = "batch")]
    Batch,
}

impl MaterialType {
    /// All material kinds, in hierarchy order.
    pub const ALL: [MaterialType; 3] = [Self::Library, Self::Asset, Self::Batch];

    /// Wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Library => "assetType",
            Self::Asset => "asset",
            Self::Batch => "batch",
        }
    }
}

impl FromStr for MaterialType {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| IdError::UnknownKind {
                value: s.to_string(),
                kind: s.to_string(),
            })
    }
}

impl fmt::Display for MaterialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Export formats for chemical drawings and stoichiometry structures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChemicalDrawingFormat {
    Cdxml,
    Svg,
    Mol,
    #[serde(rename = "mol-v3000")]
    Mol3000,
    Smiles,
}

impl ChemicalDrawingFormat {
    /// Value of the `format` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cdxml => "cdxml",
            Self::Svg => "svg",
            Self::Mol => "mol",
            Self::Mol3000 => "mol-v3000",
            Self::Smiles => "smiles",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_type_known_values() {
        assert_eq!(EntityType::from("journal"), EntityType::Notebook);
        assert_eq!(EntityType::from("imageResource"), EntityType::ImageResource);
        assert_eq!(EntityType::Notebook.as_str(), "journal");
    }

    #[test]
    fn test_entity_type_keeps_unknown_values() {
        let kind = EntityType::from("spotfireDxp");
        assert_eq!(kind, EntityType::Other("spotfireDxp".to_string()));
        assert!(!kind.is_known());
        assert_eq!(kind.to_string(), "spotfireDxp");
    }

    #[test]
    fn test_object_type_serde() {
        let kind: ObjectType = serde_json::from_str("\"adtRow\"").unwrap();
        assert_eq!(kind, ObjectType::AdtRow);
        assert_eq!(serde_json::to_string(&ObjectType::Entity).unwrap(), "\"entity\"");

        let other: ObjectType = serde_json::from_str("\"task\"").unwrap();
        assert_eq!(serde_json::to_string(&other).unwrap(), "\"task\"");
    }

    #[test]
    fn test_material_type_from_str() {
        assert_eq!("assetType".parse::<MaterialType>().unwrap(), MaterialType::Library);
        assert_eq!("batch".parse::<MaterialType>().unwrap(), MaterialType::Batch);
        assert!("journal".parse::<MaterialType>().is_err());
    }

    #[test]
    fn test_chemical_drawing_format_serialize() {
        assert_eq!(
            serde_json::to_string(&ChemicalDrawingFormat::Mol3000).unwrap(),
            "\"mol-v3000\""
        );
        assert_eq!(ChemicalDrawingFormat::Cdxml.as_str(), "cdxml");
    }
}
