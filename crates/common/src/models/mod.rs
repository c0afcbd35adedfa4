//! Wire models for the admin backend
//!
//! Field names follow the backend's Spanish JSON keys through serde renames.

mod author;
mod document;
mod lookup;
mod project;
mod publication;

pub use author::{AuthorKind, AuthorRecord, NewAuthor};
pub use document::{Document, FileAttachment, NewDocument};
pub use lookup::{FieldKind, FieldSchema, ProjectType, UserOption};
pub use project::{NewProject, Project};
pub use publication::{NewPublication, Publication, PublicationStatus, SlugPreview};
