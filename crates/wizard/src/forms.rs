//! Typed form state for each wizard step
//!
//! Forms are plain values handed to the controller; validation runs before
//! any request is built.

use docrepo_common::config::WizardConfig;
use docrepo_common::errors::{AppError, Result};
use docrepo_common::models::{FileAttachment, NewDocument, PublicationStatus};
use std::collections::BTreeMap;
use validator::{Validate, ValidationErrors};

/// Collapse validator output into one dialog message.
///
/// Fields are visited in name order so the reported field is stable.
pub(crate) fn first_validation_error(errors: ValidationErrors) -> AppError {
    let mut fields: Vec<_> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| (field.to_string(), errs.clone()))
        .collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    match fields.into_iter().next() {
        Some((field, errs)) => {
            let message = errs
                .first()
                .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                .unwrap_or_else(|| format!("El campo {} no es válido", field));
            AppError::validation(&field, message)
        }
        None => AppError::Validation {
            message: "Formulario inválido".to_string(),
            field: None,
        },
    }
}

/// Step 1: document metadata plus its file
#[derive(Clone, Debug, Default, PartialEq, Validate)]
pub struct DocumentForm {
    #[validate(length(min = 1, max = 500, message = "El título es obligatorio"))]
    pub title: String,

    #[validate(length(max = 5000))]
    pub description: Option<String>,

    pub file: Option<FileAttachment>,
}

impl DocumentForm {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.trim().to_string(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        let description = description.trim();
        self.description = (!description.is_empty()).then(|| description.to_string());
        self
    }

    pub fn with_file(mut self, file: FileAttachment) -> Self {
        self.file = Some(file);
        self
    }

    /// Check the form and build the upload payload
    pub fn to_new_document(&self, limits: &WizardConfig) -> Result<NewDocument> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(AppError::validation("titulo", "El título es obligatorio"));
        }
        self.validate().map_err(first_validation_error)?;

        let file = self
            .file
            .as_ref()
            .ok_or_else(|| AppError::validation("archivo", "Debe adjuntar un archivo PDF"))?;

        if !file.content_type.eq_ignore_ascii_case(&limits.required_mime) {
            return Err(AppError::validation("archivo", "El archivo debe ser un PDF"));
        }
        if limits.max_file_bytes > 0 && file.size() > limits.max_file_bytes {
            return Err(AppError::PayloadTooLarge {
                size: file.size(),
                limit: limits.max_file_bytes,
            });
        }

        Ok(NewDocument {
            title: title.to_string(),
            description: self.description.clone(),
            file: file.clone(),
        })
    }
}

/// Step 2: project type, optional title and dynamic field values
#[derive(Clone, Debug, Default, PartialEq, Validate)]
pub struct ProjectForm {
    pub project_type_id: Option<i64>,

    #[validate(length(max = 500))]
    pub title: Option<String>,

    /// Raw values of the project type's dynamic fields, keyed by field name
    pub fields: BTreeMap<String, String>,
}

impl ProjectForm {
    pub fn new(project_type_id: Option<i64>) -> Self {
        Self {
            project_type_id,
            ..Self::default()
        }
    }

    pub fn with_field(mut self, name: &str, value: &str) -> Self {
        self.fields.insert(name.to_string(), value.to_string());
        self
    }

    /// The selected project type, or the dialog error when none is
    pub fn selected_type(&self) -> Result<i64> {
        self.validate().map_err(first_validation_error)?;
        self.project_type_id
            .filter(|id| *id > 0)
            .ok_or_else(|| AppError::validation("tipo_proyecto", "Debe seleccionar un tipo de proyecto"))
    }
}

/// Step 3: everything has a default
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PublicationForm {
    /// Overrides the URL held by the session when set
    pub external_url: Option<String>,

    pub status: PublicationStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf() -> FileAttachment {
        FileAttachment::sniffed("informe.pdf", b"%PDF-1.7 body".to_vec())
    }

    #[test]
    fn test_empty_title_blocks() {
        let form = DocumentForm::new("   ").with_file(pdf());
        let err = form.to_new_document(&WizardConfig::default()).unwrap_err();
        assert_eq!(err.user_message(), "El título es obligatorio");
    }

    #[test]
    fn test_missing_and_wrong_file() {
        let limits = WizardConfig::default();
        let err = DocumentForm::new("Informe").to_new_document(&limits).unwrap_err();
        assert!(matches!(err, AppError::Validation { field: Some(ref f), .. } if f == "archivo"));

        let docx = FileAttachment::new(
            "informe.docx",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            vec![0; 10],
        );
        let err = DocumentForm::new("Informe").with_file(docx).to_new_document(&limits).unwrap_err();
        assert_eq!(err.user_message(), "El archivo debe ser un PDF");
    }

    #[test]
    fn test_size_limit() {
        let limits = WizardConfig {
            max_file_bytes: 4,
            ..WizardConfig::default()
        };
        let err = DocumentForm::new("Informe").with_file(pdf()).to_new_document(&limits).unwrap_err();
        assert!(matches!(err, AppError::PayloadTooLarge { limit: 4, .. }));
    }

    #[test]
    fn test_valid_document() {
        let document = DocumentForm::new("  Informe Anual 2024 ")
            .with_description("  ")
            .with_file(pdf())
            .to_new_document(&WizardConfig::default())
            .unwrap();
        assert_eq!(document.title, "Informe Anual 2024");
        assert!(document.description.is_none());
    }

    #[test]
    fn test_title_too_long() {
        let form = DocumentForm::new(&"x".repeat(501)).with_file(pdf());
        let err = form.to_new_document(&WizardConfig::default()).unwrap_err();
        assert!(err.is_client_side());
    }

    #[test]
    fn test_project_type_required() {
        assert!(ProjectForm::new(None).selected_type().is_err());
        assert!(ProjectForm::new(Some(0)).selected_type().is_err());
        assert_eq!(ProjectForm::new(Some(3)).selected_type().unwrap(), 3);
    }
}
