//! Entities with downloadable content: text, images, chemical drawings and
//! samples containers.

use serde::{Deserialize, Serialize};

use crate::client::{ApiRequest, SignalsClient};
use crate::envelope::OneOrMany;
use crate::error::Result;
use crate::models::container::Container;
use crate::models::entity::{entity_kind, EntityCommon, ENDPOINT};
use crate::models::file::{content_type_for_extension, File};
use crate::models::stoichiometry::Stoichiometry;
use crate::types::{ChemicalDrawingFormat, Eid};

/// Export an entity's content, optionally converted to `format`.
#[tracing::instrument(skip(client))]
pub async fn export(client: &SignalsClient, eid: &Eid, format: Option<&str>) -> Result<File> {
    let request = ApiRequest::get([ENDPOINT, eid.as_str(), "export"]).query_opt("format", format);
    let response = client.call(request).await?;
    Ok(File::from_response(response))
}

/// A plain-text entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Text {
    #[serde(flatten)]
    common: EntityCommon,
}

entity_kind!(Text, Text, "text");

impl Text {
    /// Create a text entry `{name}.txt` inside `container`.
    pub async fn create<C: Container + ?Sized>(
        client: &SignalsClient,
        container: &C,
        name: &str,
        content: &str,
        force: bool,
    ) -> Result<Self> {
        container
            .add_child(
                client,
                &format!("{name}.txt"),
                content.as_bytes().to_vec(),
                "text/plain",
                force,
            )
            .await?
            .try_into()
    }

    pub async fn get_content(&self, client: &SignalsClient) -> Result<File> {
        export(client, self.eid(), None).await
    }
}

/// An uploaded image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    #[serde(flatten)]
    common: EntityCommon,
}

entity_kind!(Image, Image, "imageResource");

impl Image {
    /// Upload an image `{name}.{file_extension}`; the content type follows
    /// the extension.
    pub async fn create<C: Container + ?Sized>(
        client: &SignalsClient,
        container: &C,
        name: &str,
        content: Vec<u8>,
        file_extension: &str,
        force: bool,
    ) -> Result<Self> {
        let content_type = content_type_for_extension(file_extension);
        container
            .add_child(
                client,
                &format!("{name}.{file_extension}"),
                content,
                content_type,
                force,
            )
            .await?
            .try_into()
    }

    pub async fn get_content(&self, client: &SignalsClient) -> Result<File> {
        export(client, self.eid(), None).await
    }
}

/// A chemical drawing, which also carries reaction stoichiometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChemicalDrawing {
    #[serde(flatten)]
    common: EntityCommon,
    #[serde(skip)]
    stoichiometry: Option<OneOrMany<Stoichiometry>>,
}

entity_kind!(ChemicalDrawing, ChemicalDrawing, "chemicalDrawing");

impl ChemicalDrawing {
    pub async fn create<C: Container + ?Sized>(
        client: &SignalsClient,
        container: &C,
        name: &str,
        content: Vec<u8>,
        content_type: &str,
        force: bool,
    ) -> Result<Self> {
        container
            .add_child(client, name, content, content_type, force)
            .await?
            .try_into()
    }

    /// Download the drawing, converted to `format` when given.
    pub async fn get_content(
        &self,
        client: &SignalsClient,
        format: Option<ChemicalDrawingFormat>,
    ) -> Result<File> {
        export(client, self.eid(), format.map(ChemicalDrawingFormat::as_str)).await
    }

    /// Stoichiometry of the drawing, fetched on first access.
    pub async fn stoichiometry(&mut self, client: &SignalsClient) -> Result<&OneOrMany<Stoichiometry>> {
        let data = match self.stoichiometry.take() {
            Some(data) => data,
            None => Stoichiometry::fetch_data(client, self.common.eid()).await?,
        };
        Ok(&*self.stoichiometry.insert(data))
    }
}

/// A container of registered samples, exported as CSV.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplesContainer {
    #[serde(flatten)]
    common: EntityCommon,
}

entity_kind!(SamplesContainer, SamplesContainer, "samplesContainer");

impl SamplesContainer {
    pub async fn get_content(&self, client: &SignalsClient) -> Result<File> {
        export(client, self.eid(), None).await
    }

    /// Download the samples and split them into a header and rows.
    pub async fn get_table(&self, client: &SignalsClient) -> Result<SamplesTable> {
        let file = self.get_content(client).await?;
        Ok(SamplesTable::parse(&file.text()))
    }
}

/// Samples exported from a [`SamplesContainer`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SamplesTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SamplesTable {
    /// Parse the export: `\r\n`-separated lines, `,`-separated cells, first
    /// line is the header. Empty lines are skipped.
    pub fn parse(content: &str) -> Self {
        let split = |line: &str| line.split(',').map(str::to_string).collect::<Vec<_>>();

        let mut lines = content.split("\r\n");
        let header = lines
            .next()
            .filter(|line| !line.is_empty())
            .map(split)
            .unwrap_or_default();
        let rows = lines.filter(|line| !line.is_empty()).map(split).collect();

        Self { header, rows }
    }
}
