//! Signals Notebook record types.

pub mod attribute;
pub mod container;
pub mod content;
pub mod entity;
pub mod file;
pub mod material;
pub mod stoichiometry;
pub mod table;
pub mod user;

pub use attribute::{Attribute, AttributeOption};
pub use container::{Container, Experiment, ExperimentState, Notebook};
pub use content::{export, ChemicalDrawing, Image, SamplesContainer, SamplesTable, Text};
pub use entity::{Entity, EntityCommon, EntityListQuery, IncludeOption};
pub use file::File;
pub use material::{Asset, Batch, Library, Material, MaterialCommon};
pub use stoichiometry::{DataGridKind, GridRow, Stoichiometry, StoichiometryColumn};
pub use table::{Cell, Column, ColumnDataType, ColumnDefinition, ColumnDefinitions, Row, Table};
pub use user::{Group, License, NewGroup, NewUser, Privileges, Profile, Role, User};
