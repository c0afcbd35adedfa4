//! Publication entity and slug preview

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublicationStatus {
    #[default]
    Borrador,
    Publicada,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Publication {
    pub id: i64,

    #[serde(rename = "proyecto_id", alias = "proyecto")]
    pub project_id: i64,

    #[serde(default)]
    pub slug: Option<String>,

    #[serde(rename = "url_externa", default)]
    pub external_url: Option<String>,

    #[serde(rename = "estado", default)]
    pub status: Option<PublicationStatus>,
}

/// Step 3 payload, sent as JSON
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewPublication {
    #[serde(rename = "proyecto_id")]
    pub project_id: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    #[serde(rename = "url_externa", skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,

    #[serde(rename = "estado")]
    pub status: PublicationStatus,
}

/// Slug preview answer. The slug travels at the top level, not under `data`.
#[derive(Clone, Debug, Deserialize)]
pub struct SlugPreview {
    pub success: bool,

    #[serde(default)]
    pub slug_preview: Option<String>,

    #[serde(default)]
    pub error: Option<String>,
}
