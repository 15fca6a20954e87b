//! Signals Notebook API client library.
//!
//! A Rust library for the Signals Notebook electronic lab notebook REST
//! API. Each operation (Get, List, Save, Delete) is a trait that the
//! record types implement; polymorphic records are decoded into the most
//! specific type known for their `type` field.
//!
//! # Quick Start
//!
//! ```no_run
//! use futures::TryStreamExt;
//! use signals_notebook::{Eid, Entity, EntityListQuery, EntityType, Experiment, Get, List, Save, SignalsClient};
//!
//! #[tokio::main]
//! async fn main() -> signals_notebook::Result<()> {
//!     // Create client from environment variables
//!     let client = SignalsClient::from_env()?;
//!
//!     // Stream the notebooks, one page at a time
//!     let query = EntityListQuery::default().include_types([EntityType::Notebook]);
//!     let mut notebooks = Entity::get_list(&client, &query);
//!     while let Some(notebook) = notebooks.try_next().await? {
//!         println!("{}: {}", notebook.eid(), notebook.name());
//!     }
//!
//!     // Fetch an experiment and rename it
//!     let eid = Eid::parse("experiment:79b12479-2b5d-490f-be52-d60c53f16719")?;
//!     let mut experiment = Experiment::get(&client, eid).await?;
//!     experiment.common_mut().name = "Suzuki coupling, run 2".to_string();
//!     experiment.save(&client).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`Get`] - Fetch a single record by id
//! - [`List`] - Stream a paginated collection
//! - [`Save`] - Push the editable fields of a record
//! - [`Delete`] - Remove a record
//!
//! Every response is a JSON:API style envelope ([`envelope`]). Lists follow
//! `links.next` lazily ([`pagination`]). Record kinds are chosen by
//! discriminator tables ([`resolver`]).
//!
//! # Configuration
//!
//! - `SIGNALS_NOTEBOOK_API_KEY` (required) - API key sent as `x-api-key`
//! - `SIGNALS_NOTEBOOK_API_URL` (required) - Base URL, e.g.
//!   `https://tenant.signalsnotebook.com/api/rest/v1.0`

pub mod cli;
mod client;
pub mod envelope;
mod error;
pub mod models;
pub mod output;
pub mod pagination;
pub mod resolver;
mod traits;
pub mod types;

// Re-export core types
pub use client::{ApiRequest, ApiResponse, SignalsClient, Target, API_KEY_ENV, API_URL_ENV};
pub use error::{Result, SignalsError};
pub use pagination::{paginate, Page};

// Re-export traits
pub use traits::{Delete, Get, List, Save};

// Re-export identifiers and discriminators
pub use types::{AttrId, ChemicalDrawingFormat, Eid, EntityType, IdError, Mid, MaterialType, ObjectType};

// Re-export models
pub use models::{
    // Notebook hierarchy
    ChemicalDrawing,
    Container,
    Entity,
    EntityCommon,
    EntityListQuery,
    Experiment,
    ExperimentState,
    Image,
    IncludeOption,
    Notebook,
    SamplesContainer,
    Text,
    // Tables and stoichiometry
    Cell,
    ColumnDefinitions,
    DataGridKind,
    Row,
    Stoichiometry,
    Table,
    // Materials
    Asset,
    Batch,
    Library,
    Material,
    // Attributes, users and files
    Attribute,
    AttributeOption,
    File,
    Group,
    Profile,
    Role,
    User,
};
