//! Document authors

use serde::{Deserialize, Serialize};

/// Who an author row points at
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tipo", rename_all = "snake_case")]
pub enum AuthorKind {
    /// A registered user of the repository
    Usuario { usuario_id: i64 },

    /// Free-text person without an account
    Persona {
        nombre: String,
        #[serde(default)]
        apellido: Option<String>,
        #[serde(default)]
        afiliacion: Option<String>,
        #[serde(default)]
        orcid: Option<String>,
    },
}

/// Payload for one author row of a document
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewAuthor {
    #[serde(rename = "documento_id")]
    pub document_id: i64,

    /// 1-based position in the author list
    #[serde(rename = "orden")]
    pub position: u32,

    #[serde(flatten)]
    pub kind: AuthorKind,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRecord {
    pub id: i64,

    #[serde(rename = "documento_id")]
    pub document_id: i64,

    #[serde(rename = "usuario_id", default)]
    pub user_id: Option<i64>,

    #[serde(rename = "nombre", default)]
    pub name: Option<String>,

    #[serde(rename = "orden", default)]
    pub position: Option<u32>,
}
