//! Project entity

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,

    #[serde(rename = "titulo", default)]
    pub title: Option<String>,

    #[serde(rename = "tipo_proyecto_id", alias = "tipo_proyecto", default)]
    pub project_type_id: Option<i64>,

    #[serde(rename = "documento_id", alias = "documento", default)]
    pub document_id: Option<i64>,
}

/// Step 2 payload, sent as multipart with JSON-encoded `autores` and `campos`
#[derive(Clone, Debug, PartialEq)]
pub struct NewProject {
    pub title: Option<String>,
    pub project_type_id: i64,
    pub document_id: i64,

    /// User ids of the linked authors only, in staged order
    pub author_user_ids: Vec<i64>,

    /// Values of the project type's dynamic fields
    pub fields: Map<String, Value>,
}
