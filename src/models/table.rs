//! Tables (`grid` entities): column definitions, rows and typed cells.
//!
//! Both cells and column definitions are polymorphic on their `type` field.
//! Column definitions with extra mandatory fields (option lists, units) are
//! registered ahead of the generic definition, which would accept any of
//! them.

use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use futures::StreamExt;
use once_cell::sync::Lazy;
use reqwest::Method;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::client::{ApiRequest, SignalsClient};
use crate::envelope::{Response, ResponseData};
use crate::error::{Result, SignalsError};
use crate::models::entity::{entity_kind, EntityCommon};
use crate::pagination::paginate;
use crate::resolver::{Registry, ResolverError};
use crate::types::{open_enum, Eid, EntityType, Mid, ObjectType};

const ENDPOINT: &str = "adt";

open_enum! {
    /// Data type of a table column.
    pub enum ColumnDataType {
        Number => "number",
        Integer => "integer",
        DateTime => "datetime",
        Text => "text",
        List => "list",
        MultiSelect => "multiSelect",
        AttributeList => "attributeList",
        AutotextList => "autotextList",
        Boolean => "boolean",
        Unit => "unit",
        Link => "link",
        ExternalLink => "externalLink",
    }
}

/// Shape shared by every column definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    pub key: Uuid,
    pub title: String,
    #[serde(rename = "type")]
    pub column_type: ColumnDataType,
    #[serde(default)]
    pub is_external_key: Option<bool>,
    #[serde(default)]
    pub is_user_defined: Option<bool>,
    #[serde(default)]
    pub saved: Option<bool>,
    #[serde(default = "read_only_default")]
    pub read_only: bool,
}

fn read_only_default() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeListColumnDefinition {
    #[serde(flatten)]
    pub base: ColumnDefinition,
    pub options: Vec<String>,
    pub attribute_list_eid: Eid,
    pub multi_select: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutotextListColumnDefinition {
    #[serde(flatten)]
    pub base: ColumnDefinition,
    pub options: Vec<String>,
    pub autotext_list_eid: Eid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListColumnDefinition {
    #[serde(flatten)]
    pub base: ColumnDefinition,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiSelectColumnDefinition {
    #[serde(flatten)]
    pub base: ColumnDefinition,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitColumnDefinition {
    #[serde(flatten)]
    pub base: ColumnDefinition,
    pub measure: String,
    pub default_unit: String,
}

/// A column definition resolved to its most specific shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Column {
    AttributeList(AttributeListColumnDefinition),
    AutotextList(AutotextListColumnDefinition),
    List(ListColumnDefinition),
    MultiSelect(MultiSelectColumnDefinition),
    Unit(UnitColumnDefinition),
    Generic(ColumnDefinition),
}

impl Column {
    pub fn definition(&self) -> &ColumnDefinition {
        match self {
            Self::AttributeList(c) => &c.base,
            Self::AutotextList(c) => &c.base,
            Self::List(c) => &c.base,
            Self::MultiSelect(c) => &c.base,
            Self::Unit(c) => &c.base,
            Self::Generic(c) => c,
        }
    }

    /// Allowed values for option-list columns.
    pub fn options(&self) -> Option<&[String]> {
        match self {
            Self::AttributeList(c) => Some(&c.options),
            Self::AutotextList(c) => Some(&c.options),
            Self::List(c) => Some(&c.options),
            Self::MultiSelect(c) => Some(&c.options),
            Self::Unit(_) | Self::Generic(_) => None,
        }
    }
}

static COLUMNS: Lazy<core::result::Result<Registry<Column>, ResolverError>> = Lazy::new(|| {
    Registry::builder("column definitions", "type")
        .candidate("attributeList", Column::AttributeList)
        .candidate("autotextList", Column::AutotextList)
        .candidate("list", Column::List)
        .candidate("multiSelect", Column::MultiSelect)
        .candidate("unit", Column::Unit)
        .fallback(Column::Generic)
        .build()
});

/// The column-definition discriminator table.
pub fn column_registry() -> core::result::Result<&'static Registry<Column>, ResolverError> {
    COLUMNS.as_ref().map_err(Clone::clone)
}

impl<'de> Deserialize<'de> for Column {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        column_registry()
            .map_err(de::Error::custom)?
            .decode(&value)
            .map_err(de::Error::custom)
    }
}

/// All column definitions of a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinitions {
    #[serde(default)]
    pub id: Option<Eid>,
    #[serde(rename = "type", default)]
    pub object_type: Option<ObjectType>,
    pub columns: Vec<Column>,
}

impl ColumnDefinitions {
    /// The column titled `title`.
    pub fn by_title(&self, title: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.definition().title == title)
    }
}

/// Target of a link cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LinkTarget {
    Entity(Eid),
    Material(Mid),
}

/// Stored value of a cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellContent<V> {
    pub value: Option<V>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<V>>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<EntityType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

/// A table cell holding values of type `V`.
///
/// `key`, `type` and `name` describe the column and cannot be changed;
/// setting the value marks the cell for the next [`Table::save_rows`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedCell<V> {
    key: Uuid,
    #[serde(rename = "type")]
    column_type: ColumnDataType,
    name: String,
    content: CellContent<V>,
    #[serde(skip)]
    changed: bool,
}

impl<V> TypedCell<V> {
    pub fn key(&self) -> Uuid {
        self.key
    }

    pub fn column_type(&self) -> &ColumnDataType {
        &self.column_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &CellContent<V> {
        &self.content
    }

    pub fn value(&self) -> Option<&V> {
        self.content.value.as_ref()
    }

    /// Every selected value of a multi-value cell.
    pub fn values(&self) -> Option<&[V]> {
        self.content.values.as_deref()
    }

    pub fn display(&self) -> &str {
        self.content.display.as_deref().unwrap_or_default()
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }
}

impl<V: Clone> TypedCell<V> {
    /// Replace the value. Multi-value cells end up with a single selection.
    pub fn set_value(&mut self, value: V, display: Option<String>) {
        if self.is_multi_value() {
            self.content.values = Some(vec![value.clone()]);
        }
        self.content.value = Some(value);
        self.content.display = display;
        self.changed = true;
    }

    fn is_multi_value(&self) -> bool {
        self.content.values.is_some()
            || matches!(
                self.column_type,
                ColumnDataType::MultiSelect | ColumnDataType::AttributeList
            )
    }
}

impl TypedCell<String> {
    fn set_values(&mut self, values: Vec<String>, display: Option<String>) {
        self.content.value = Some(values.join(", "));
        self.content.values = Some(values);
        self.content.display = display;
        self.changed = true;
    }
}

trait AnyCell {
    fn key(&self) -> Uuid;
    fn name(&self) -> &str;
    fn column_type(&self) -> &ColumnDataType;
    fn is_changed(&self) -> bool;
    fn update_request(&self) -> Option<Value>;
}

impl<V: Serialize> AnyCell for TypedCell<V> {
    fn key(&self) -> Uuid {
        self.key
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn column_type(&self) -> &ColumnDataType {
        &self.column_type
    }

    fn is_changed(&self) -> bool {
        self.changed
    }

    fn update_request(&self) -> Option<Value> {
        if !self.changed {
            return None;
        }
        let content = serde_json::to_value(&self.content).ok()?;
        Some(json!({"key": self.key, "content": content}))
    }
}

/// A cell resolved from its column data type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    AttributeList(TypedCell<String>),
    AutotextList(TypedCell<String>),
    Boolean(TypedCell<bool>),
    DateTime(TypedCell<DateTime<Utc>>),
    ExternalLink(TypedCell<String>),
    Integer(TypedCell<i64>),
    Link(TypedCell<LinkTarget>),
    List(TypedCell<String>),
    MultiSelect(TypedCell<String>),
    Number(TypedCell<f64>),
    Text(TypedCell<String>),
    Unit(TypedCell<f64>),
    /// A cell whose type or content this crate does not model, kept as raw JSON.
    Other(Value),
}

static CELLS: Lazy<core::result::Result<Registry<Cell>, ResolverError>> = Lazy::new(|| {
    Registry::builder("cells", "type")
        .candidate("attributeList", Cell::AttributeList)
        .candidate("autotextList", Cell::AutotextList)
        .candidate("boolean", Cell::Boolean)
        .candidate("datetime", Cell::DateTime)
        .candidate("externalLink", Cell::ExternalLink)
        .candidate("integer", Cell::Integer)
        .candidate("link", Cell::Link)
        .candidate("list", Cell::List)
        .candidate("multiSelect", Cell::MultiSelect)
        .candidate("number", Cell::Number)
        .candidate("text", Cell::Text)
        .candidate("unit", Cell::Unit)
        .fallback(Cell::Other)
        .build()
});

/// The cell discriminator table.
pub fn cell_registry() -> core::result::Result<&'static Registry<Cell>, ResolverError> {
    CELLS.as_ref().map_err(Clone::clone)
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        cell_registry()
            .map_err(de::Error::custom)?
            .decode(&value)
            .map_err(de::Error::custom)
    }
}

impl Cell {
    fn typed(&self) -> Option<&dyn AnyCell> {
        match self {
            Self::AttributeList(c)
            | Self::AutotextList(c)
            | Self::ExternalLink(c)
            | Self::List(c)
            | Self::MultiSelect(c)
            | Self::Text(c) => Some(c),
            Self::Boolean(c) => Some(c),
            Self::DateTime(c) => Some(c),
            Self::Integer(c) => Some(c),
            Self::Link(c) => Some(c),
            Self::Number(c) | Self::Unit(c) => Some(c),
            Self::Other(_) => None,
        }
    }

    /// Column key; for unmodelled cells, read from the raw JSON if present.
    pub fn key(&self) -> Option<Uuid> {
        match self.typed() {
            Some(cell) => Some(cell.key()),
            None => match self {
                Self::Other(raw) => raw
                    .get("key")
                    .and_then(Value::as_str)
                    .and_then(|k| Uuid::parse_str(k).ok()),
                _ => None,
            },
        }
    }

    /// Column name.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Other(raw) => raw.get("name").and_then(Value::as_str),
            _ => self.typed().map(AnyCell::name),
        }
    }

    pub fn column_type(&self) -> Option<&ColumnDataType> {
        self.typed().map(AnyCell::column_type)
    }

    pub fn is_changed(&self) -> bool {
        self.typed().is_some_and(AnyCell::is_changed)
    }

    /// `{key, content}` for a changed cell.
    pub fn update_request(&self) -> Option<Value> {
        self.typed().and_then(AnyCell::update_request)
    }

    /// Select several values of a multi-select or attribute-list cell.
    ///
    /// # Errors
    ///
    /// Returns [`SignalsError::Validation`] for any other kind of cell.
    pub fn set_values(&mut self, values: Vec<String>, display: Option<String>) -> Result<()> {
        match self {
            Self::MultiSelect(cell) | Self::AttributeList(cell) => {
                cell.set_values(values, display);
                Ok(())
            }
            other => Err(SignalsError::Validation(format!(
                "cell '{}' does not accept multiple values",
                other.name().unwrap_or_default()
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RowBody {
    #[serde(default)]
    cells: Vec<Cell>,
}

/// A table row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    id: Uuid,
    pub cells: Vec<Cell>,
}

impl Row {
    fn from_record(record: ResponseData<RowBody>) -> Result<Self> {
        let id = record
            .id
            .as_uuid()
            .ok_or_else(|| SignalsError::UnexpectedType {
                expected: "row uuid",
                found: record.id.to_string(),
            })?;
        Ok(Self {
            id,
            cells: record.body.cells,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The cell of the column named `name`.
    pub fn cell(&self, name: &str) -> Option<&Cell> {
        self.cells.iter().find(|c| c.name() == Some(name))
    }

    pub fn cell_mut(&mut self, name: &str) -> Option<&mut Cell> {
        self.cells.iter_mut().find(|c| c.name() == Some(name))
    }

    pub fn is_changed(&self) -> bool {
        self.cells.iter().any(Cell::is_changed)
    }

    /// Update entry carrying only the changed cells, if any.
    pub fn update_request(&self) -> Option<Value> {
        let cells: Vec<Value> = self.cells.iter().filter_map(Cell::update_request).collect();
        if cells.is_empty() {
            return None;
        }
        Some(json!({
            "type": "adtRow",
            "id": self.id,
            "attributes": {"action": "update", "cells": cells}
        }))
    }
}

/// Body of a rows update, or `None` when nothing changed.
pub fn rows_payload(rows: &[Row]) -> Option<Value> {
    let data: Vec<Value> = rows.iter().filter_map(Row::update_request).collect();
    (!data.is_empty()).then(|| json!({ "data": data }))
}

/// A table entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    #[serde(flatten)]
    common: EntityCommon,
}

entity_kind!(Table, Table, "grid");

impl Table {
    #[tracing::instrument(skip(self, client), fields(eid = %self.eid()))]
    pub async fn get_column_definitions(&self, client: &SignalsClient) -> Result<ColumnDefinitions> {
        let response = client.get([ENDPOINT, self.eid().as_str(), "_column"]).await?;
        Response::<ColumnDefinitions>::decode(&response.content)?.single()
    }

    /// Stream the rows of the table.
    pub fn get_rows<'a>(&self, client: &'a SignalsClient) -> BoxStream<'a, Result<Row>> {
        let request = ApiRequest::get([ENDPOINT, self.eid().as_str()]);
        paginate(client, request, Row::from_record).boxed()
    }

    /// Send the changed cells of `rows`. Makes no request when nothing
    /// changed.
    #[tracing::instrument(skip(self, client, rows), fields(eid = %self.eid()))]
    pub async fn save_rows(&self, client: &SignalsClient, rows: &[Row], force: bool) -> Result<()> {
        let Some(payload) = rows_payload(rows) else {
            tracing::debug!("no changed cells");
            return Ok(());
        };
        let request = ApiRequest::new(Method::PATCH, [ENDPOINT, self.eid().as_str()])
            .query("force", force)
            .json(&payload)?;
        client.call(request).await?;
        Ok(())
    }
}
