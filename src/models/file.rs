//! Downloaded and uploaded file content.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_with::base64::Base64;
use serde_with::serde_as;

use crate::client::ApiResponse;
use crate::error::Result;

/// File content exported from, or uploaded to, the notebook.
///
/// Serializes with the content base64-encoded.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct File {
    pub name: String,
    #[serde_as(as = "Base64")]
    pub content: Vec<u8>,
    pub content_type: String,
}

impl File {
    pub fn new(name: impl Into<String>, content: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content,
            content_type: content_type.into(),
        }
    }

    /// Build a file from an export response, naming it after the
    /// `Content-Disposition` filename (empty when absent).
    pub fn from_response(response: ApiResponse) -> Self {
        let name = response
            .content_disposition()
            .and_then(filename_from_disposition)
            .unwrap_or_default();
        let content_type = response.content_type().unwrap_or_default().to_string();
        Self::new(name, response.content, content_type)
    }

    /// Read a local file, guessing its content type from the extension.
    pub async fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(name, content, content_type_for_extension(&extension)))
    }

    /// Content encoded as base64.
    pub fn base64(&self) -> String {
        use serde_with::base64::{Base64 as Codec, Standard};
        use serde_with::formats::Padded;
        use serde_with::SerializeAs;

        let value = Codec::<Standard, Padded>::serialize_as(&self.content, serde_json::value::Serializer)
            .unwrap_or_default();
        value.as_str().unwrap_or_default().to_string()
    }

    /// Content as UTF-8 text, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }

    /// Write the content to `path`; when `path` is a directory the file
    /// name is appended. Returns the path written.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let mut target = path.as_ref().to_path_buf();
        if tokio::fs::metadata(&target)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
        {
            target.push(&self.name);
        }
        tokio::fs::write(&target, &self.content).await?;
        tracing::debug!(path = %target.display(), bytes = self.content.len(), "saved file");
        Ok(target)
    }
}

/// Extract the file name from a `Content-Disposition` header value.
///
/// Prefers the RFC 5987 `filename*=` form over plain `filename=`.
pub fn filename_from_disposition(header: &str) -> Option<String> {
    let mut plain = None;
    for param in header.split(';').skip(1) {
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim();
        match key.as_str() {
            "filename*" => {
                let encoded = value.rsplit('\'').next().unwrap_or(value);
                if let Ok(decoded) = urlencoding::decode(encoded) {
                    return Some(decoded.into_owned());
                }
            }
            "filename" => plain = Some(value.trim_matches('"').to_string()),
            _ => {}
        }
    }
    plain
}

/// MIME type for a file extension, `application/octet-stream` when unknown.
pub fn content_type_for_extension(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "txt" => "text/plain",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "tif" | "tiff" => "image/tiff",
        "pdf" => "application/pdf",
        "json" => "application/json",
        "cdxml" => "chemical/x-cdxml",
        "mol" => "chemical/x-mdl-molfile",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}
