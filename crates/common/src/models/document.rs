//! Document entity and upload payload

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,

    #[serde(rename = "titulo")]
    pub title: String,

    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,

    /// URL of the stored file
    #[serde(rename = "archivo", default)]
    pub file_url: Option<String>,

    #[serde(rename = "creado_en", default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// An uploaded file held in memory until it is sent
#[derive(Clone, Debug, PartialEq)]
pub struct FileAttachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FileAttachment {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Build an attachment whose MIME type is sniffed from the content
    pub fn sniffed(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let content_type = Self::sniff_content_type(&bytes).to_string();
        Self::new(file_name, content_type, bytes)
    }

    /// `%PDF-` magic marks a PDF; anything else is opaque
    pub fn sniff_content_type(bytes: &[u8]) -> &'static str {
        if bytes.starts_with(b"%PDF-") {
            crate::PDF_MIME
        } else {
            "application/octet-stream"
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Step 1 payload, sent as multipart
#[derive(Clone, Debug, PartialEq)]
pub struct NewDocument {
    pub title: String,
    pub description: Option<String>,
    pub file: FileAttachment,
}
