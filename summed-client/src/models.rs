use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ClientError, Result};

/// A document the service accepted, in upload order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedDocument {
    pub title: String,
    /// Name of the file as it was dropped; summaries are fetched by this name
    pub source_file_name: String,
}

/// Everything the service extracted from a paper
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedMetadata {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub key_concepts: String,
    #[serde(default)]
    pub highlights: String,
    #[serde(default)]
    pub limitations: String,
    #[serde(default)]
    pub authors: String,
    #[serde(default)]
    pub tables: Vec<String>,
    #[serde(default)]
    pub figures: Vec<String>,
}

/// Body of a successful `POST /upload`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub title: String,
    #[serde(flatten)]
    pub metadata: ExtractedMetadata,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryRequest {
    pub file_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageRequest {
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub text: String,
}

/// A file picked or dropped by the user, ready to be sent as multipart form data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                ClientError::InvalidInput(format!("{} has no file name", path.display()))
            })?
            .to_string();
        let bytes = tokio::fs::read(path).await?;
        Ok(Self { file_name, bytes })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub text: String,
    pub sender: Sender,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, Sender::User)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(text, Sender::Bot)
    }

    fn new(text: impl Into<String>, sender: Sender) -> Self {
        Self {
            text: text.into(),
            sender,
            sent_at: Utc::now(),
        }
    }
}

/// An extracted table or figure. The service names these `<directory>*<file>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    pub name: String,
    pub directory: String,
    pub file: String,
}

impl ImageAsset {
    pub fn parse(name: &str) -> Result<Self> {
        let (directory, file) = name.split_once('*').ok_or_else(|| {
            ClientError::InvalidInput(format!("image name '{}' has no '*' separator", name))
        })?;
        if directory.is_empty() || file.is_empty() || file.contains('*') {
            return Err(ClientError::InvalidInput(format!(
                "malformed image name '{}'",
                name
            )));
        }
        Ok(Self {
            name: name.to_string(),
            directory: directory.to_string(),
            file: file.to_string(),
        })
    }
}
