//! Reaction stoichiometry of experiments and chemical drawings.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::{ApiRequest, SignalsClient};
use crate::envelope::{OneOrMany, Response, ResponseData};
use crate::error::Result;
use crate::models::file::File;
use crate::types::{ChemicalDrawingFormat, Eid};

const ENDPOINT: &str = "stoichiometry";

/// One of the four stoichiometry grids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataGridKind {
    Reactants,
    Products,
    Solvents,
    Conditions,
}

impl DataGridKind {
    pub const ALL: [DataGridKind; 4] = [
        Self::Reactants,
        Self::Products,
        Self::Solvents,
        Self::Conditions,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reactants => "reactants",
            Self::Products => "products",
            Self::Solvents => "solvents",
            Self::Conditions => "conditions",
        }
    }
}

impl fmt::Display for DataGridKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row of a stoichiometry grid; columns vary by grid and tenant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridRow {
    #[serde(rename = "row_id", alias = "rowId", default, skip_serializing_if = "Option::is_none")]
    pub row_id: Option<String>,
    #[serde(flatten)]
    pub values: BTreeMap<String, Value>,
}

impl GridRow {
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }
}

/// Column description of a stoichiometry grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoichiometryColumn {
    pub key: String,
    pub title: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub column_type: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
struct DataGrids {
    #[serde(default)]
    reactants: Vec<GridRow>,
    #[serde(default)]
    products: Vec<GridRow>,
    #[serde(default)]
    solvents: Vec<GridRow>,
    #[serde(default)]
    conditions: Vec<GridRow>,
}

#[derive(Debug, Default, Deserialize)]
struct GridColumns {
    #[serde(default)]
    reactants: Vec<StoichiometryColumn>,
    #[serde(default)]
    products: Vec<StoichiometryColumn>,
    #[serde(default)]
    solvents: Vec<StoichiometryColumn>,
    #[serde(default)]
    conditions: Vec<StoichiometryColumn>,
}

impl GridColumns {
    fn take(self, kind: DataGridKind) -> Vec<StoichiometryColumn> {
        match kind {
            DataGridKind::Reactants => self.reactants,
            DataGridKind::Products => self.products,
            DataGridKind::Solvents => self.solvents,
            DataGridKind::Conditions => self.conditions,
        }
    }
}

/// Stoichiometry grids of one reaction.
///
/// Column definitions are fetched per grid on first use and kept on the
/// value.
#[derive(Debug, Clone, Serialize)]
pub struct Stoichiometry {
    eid: Eid,
    pub reactants: Vec<GridRow>,
    pub products: Vec<GridRow>,
    pub solvents: Vec<GridRow>,
    pub conditions: Vec<GridRow>,
    #[serde(skip)]
    column_definitions: HashMap<DataGridKind, Vec<StoichiometryColumn>>,
}

impl Stoichiometry {
    pub fn eid(&self) -> &Eid {
        &self.eid
    }

    pub fn rows(&self, kind: DataGridKind) -> &[GridRow] {
        match kind {
            DataGridKind::Reactants => &self.reactants,
            DataGridKind::Products => &self.products,
            DataGridKind::Solvents => &self.solvents,
            DataGridKind::Conditions => &self.conditions,
        }
    }

    fn from_record(record: ResponseData<DataGrids>, requested: &Eid) -> Self {
        let eid = record.id.as_eid().cloned().unwrap_or_else(|| requested.clone());
        let grids = record.body;
        Self {
            eid,
            reactants: grids.reactants,
            products: grids.products,
            solvents: grids.solvents,
            conditions: grids.conditions,
            column_definitions: HashMap::new(),
        }
    }

    /// Fetch the stoichiometry of an entity. Drawings with several reactions
    /// return several values.
    #[tracing::instrument(skip(client))]
    pub async fn fetch_data(client: &SignalsClient, eid: &Eid) -> Result<OneOrMany<Stoichiometry>> {
        let fields = DataGridKind::ALL
            .iter()
            .map(|kind| kind.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let request = ApiRequest::get([ENDPOINT, eid.as_str()])
            .query("fields", fields)
            .query("value", "normalized");

        let response = client.call(request).await?;
        let envelope: Response<DataGrids> = Response::decode(&response.content)?;
        Ok(envelope
            .data
            .map(|record| Stoichiometry::from_record(record, eid)))
    }

    /// Column definitions of one grid, fetched on first access.
    pub async fn get_column_definitions(
        &mut self,
        client: &SignalsClient,
        kind: DataGridKind,
    ) -> Result<&[StoichiometryColumn]> {
        if !self.column_definitions.contains_key(&kind) {
            let request = ApiRequest::get([ENDPOINT, self.eid.as_str(), "columns", kind.as_str()]);
            let response = client.call(request).await?;
            let columns = Response::<GridColumns>::decode(&response.content)?
                .single()?
                .take(kind);
            tracing::debug!(eid = %self.eid, %kind, columns = columns.len(), "fetched column definitions");
            self.column_definitions.insert(kind, columns);
        }
        Ok(self
            .column_definitions
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or_default())
    }

    /// Download the structure drawn in one grid row.
    pub async fn fetch_structure(
        &self,
        client: &SignalsClient,
        row_id: &str,
        format: Option<ChemicalDrawingFormat>,
    ) -> Result<File> {
        let request = ApiRequest::get([ENDPOINT, self.eid.as_str(), row_id, "structure"])
            .query_opt("format", format.map(ChemicalDrawingFormat::as_str));
        let response = client.call(request).await?;
        Ok(File::from_response(response))
    }
}
