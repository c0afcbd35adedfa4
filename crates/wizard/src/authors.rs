//! Author staging
//!
//! Authors are collected before the document exists and written one by one
//! once it does. Linked-user entries also feed the project payload.

use docrepo_common::errors::{AppError, Result};
use docrepo_common::models::{AuthorKind, NewAuthor, UserOption};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use validator::Validate;

use crate::forms::first_validation_error;

fn orcid_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{4}-\d{4}-\d{4}-\d{3}[\dX]$").expect("valid ORCID pattern"))
}

/// Free-text author without an account
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PersonAuthor {
    #[validate(length(min = 1, max = 150, message = "El nombre del autor es obligatorio"))]
    pub nombre: String,

    #[serde(default)]
    #[validate(length(max = 150))]
    pub apellido: Option<String>,

    #[serde(default)]
    #[validate(length(max = 255))]
    pub afiliacion: Option<String>,

    #[serde(default)]
    pub orcid: Option<String>,
}

impl PersonAuthor {
    /// Trim every field and drop empty optionals
    pub fn normalized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
        }
        Self {
            nombre: self.nombre.trim().to_string(),
            apellido: clean(self.apellido),
            afiliacion: clean(self.afiliacion),
            orcid: clean(self.orcid),
        }
    }

    pub fn check(&self) -> Result<()> {
        self.validate().map_err(first_validation_error)?;
        if let Some(orcid) = &self.orcid {
            if !orcid_pattern().is_match(orcid) {
                return Err(AppError::validation("orcid", "El ORCID no tiene un formato válido"));
            }
        }
        Ok(())
    }

    pub fn full_name(&self) -> String {
        match &self.apellido {
            Some(apellido) => format!("{} {}", self.nombre, apellido),
            None => self.nombre.clone(),
        }
    }
}

/// One entry of the local author list
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tipo", rename_all = "snake_case")]
pub enum StagedAuthor {
    /// Registered user; the display name is the selected option's text
    LinkedUser { user_id: i64, display_name: String },

    FreePerson(PersonAuthor),
}

impl StagedAuthor {
    pub fn linked(user: &UserOption) -> Self {
        StagedAuthor::LinkedUser {
            user_id: user.id,
            display_name: user.display_name.clone(),
        }
    }

    pub fn user_id(&self) -> Option<i64> {
        match self {
            StagedAuthor::LinkedUser { user_id, .. } => Some(*user_id),
            StagedAuthor::FreePerson(_) => None,
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            StagedAuthor::LinkedUser { display_name, .. } => display_name.clone(),
            StagedAuthor::FreePerson(person) => person.full_name(),
        }
    }

    /// Author row for `document_id` at 1-based `position`
    pub fn to_new_author(&self, document_id: i64, position: u32) -> NewAuthor {
        let kind = match self {
            StagedAuthor::LinkedUser { user_id, .. } => AuthorKind::Usuario { usuario_id: *user_id },
            StagedAuthor::FreePerson(person) => AuthorKind::Persona {
                nombre: person.nombre.clone(),
                apellido: person.apellido.clone(),
                afiliacion: person.afiliacion.clone(),
                orcid: person.orcid.clone(),
            },
        };
        NewAuthor {
            document_id,
            position,
            kind,
        }
    }
}

/// Ordered author list, kept client-side
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthorStaging {
    entries: Vec<StagedAuthor>,
}

impl AuthorStaging {
    /// Validate and append an author, returning its index
    pub fn stage(&mut self, author: StagedAuthor) -> Result<usize> {
        let author = match author {
            StagedAuthor::FreePerson(person) => {
                let person = person.normalized();
                person.check()?;
                StagedAuthor::FreePerson(person)
            }
            StagedAuthor::LinkedUser { user_id, display_name } => {
                if self.entries.iter().any(|a| a.user_id() == Some(user_id)) {
                    return Err(AppError::validation("usuario", "El usuario ya está en la lista de autores"));
                }
                StagedAuthor::LinkedUser { user_id, display_name }
            }
        };
        self.entries.push(author);
        Ok(self.entries.len() - 1)
    }

    pub fn remove(&mut self, index: usize) -> Option<StagedAuthor> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    pub fn entries(&self) -> &[StagedAuthor] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// User ids of linked authors, in staged order
    pub fn linked_user_ids(&self) -> Vec<i64> {
        self.entries.iter().filter_map(StagedAuthor::user_id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(nombre: &str) -> PersonAuthor {
        PersonAuthor {
            nombre: nombre.into(),
            apellido: None,
            afiliacion: None,
            orcid: None,
        }
    }

    #[test]
    fn test_linked_ids_keep_order_and_skip_people() {
        let mut staging = AuthorStaging::default();
        staging
            .stage(StagedAuthor::LinkedUser { user_id: 9, display_name: "Ana Ruiz".into() })
            .unwrap();
        staging.stage(StagedAuthor::FreePerson(person("Carlos"))).unwrap();
        staging
            .stage(StagedAuthor::LinkedUser { user_id: 3, display_name: "Luis Gómez".into() })
            .unwrap();

        assert_eq!(staging.len(), 3);
        assert_eq!(staging.linked_user_ids(), vec![9, 3]);
    }

    #[test]
    fn test_person_requires_name() {
        let mut staging = AuthorStaging::default();
        let err = staging.stage(StagedAuthor::FreePerson(person("   "))).unwrap_err();
        assert!(err.is_client_side());
        assert_eq!(err.user_message(), "El nombre del autor es obligatorio");
        assert!(staging.is_empty());
    }

    #[test]
    fn test_orcid_format() {
        let mut author = person("Marta");
        author.orcid = Some("0000-0002-1825-009X".into());
        assert!(author.check().is_ok());

        author.orcid = Some("0000-0002".into());
        assert!(author.check().is_err());
    }

    #[test]
    fn test_duplicate_linked_user_rejected() {
        let user = UserOption { id: 5, display_name: "Ana".into() };
        let mut staging = AuthorStaging::default();
        staging.stage(StagedAuthor::linked(&user)).unwrap();
        assert!(staging.stage(StagedAuthor::linked(&user)).is_err());
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut staging = AuthorStaging::default();
        staging.stage(StagedAuthor::FreePerson(person("Eva"))).unwrap();
        assert!(staging.remove(3).is_none());
        assert_eq!(staging.remove(0).map(|a| a.display_name()), Some("Eva".to_string()));
    }

    #[test]
    fn test_new_author_payload() {
        let author = StagedAuthor::FreePerson(PersonAuthor {
            apellido: Some("Pérez".into()),
            ..person("Ana")
        });
        let row = author.to_new_author(12, 2);
        assert_eq!(row.document_id, 12);
        assert_eq!(row.position, 2);
        assert!(matches!(row.kind, AuthorKind::Persona { ref apellido, .. } if apellido.as_deref() == Some("Pérez")));
        assert_eq!(author.display_name(), "Ana Pérez");
    }
}
