//! Job manifests for headless runs
//!
//! A manifest describes one full wizard run: document, authors, project and
//! publication options. `run` drives a `Wizard` through it step by step.

use crate::authors::{PersonAuthor, StagedAuthor};
use crate::controller::Wizard;
use crate::forms::{DocumentForm, ProjectForm, PublicationForm};
use crate::summary::WizardSummary;
use docrepo_common::errors::{AppError, Result};
use docrepo_common::models::{FileAttachment, PublicationStatus};
use docrepo_common::AdminApi;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

/// Author entry as written in a manifest
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "tipo", rename_all = "snake_case")]
pub enum ManifestAuthor {
    /// Display name comes from the user list, as the select box would show it
    Usuario { usuario_id: i64 },
    Persona(PersonAuthor),
}

#[derive(Clone, Debug, Deserialize)]
pub struct JobManifest {
    pub titulo: String,

    #[serde(default)]
    pub descripcion: Option<String>,

    /// PDF path, relative to the manifest's directory
    pub archivo: PathBuf,

    #[serde(default)]
    pub autores: Vec<ManifestAuthor>,

    pub tipo_proyecto_id: Option<i64>,

    #[serde(default)]
    pub titulo_proyecto: Option<String>,

    #[serde(default)]
    pub campos: BTreeMap<String, String>,

    #[serde(default)]
    pub url_externa: Option<String>,

    /// Request a slug preview before publishing
    #[serde(default)]
    pub generar_slug: bool,

    #[serde(default)]
    pub estado: PublicationStatus,
}

impl JobManifest {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path).await?;
        Self::from_json(&text)
    }

    /// Read the attachment and build the step 1 form
    pub async fn document_form(&self, base_dir: &Path) -> Result<DocumentForm> {
        let path = base_dir.join(&self.archivo);
        let bytes = tokio::fs::read(&path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "documento.pdf".to_string());

        let mut form = DocumentForm::new(&self.titulo).with_file(FileAttachment::sniffed(file_name, bytes));
        if let Some(description) = &self.descripcion {
            form = form.with_description(description);
        }
        Ok(form)
    }

    pub fn project_form(&self) -> ProjectForm {
        ProjectForm {
            project_type_id: self.tipo_proyecto_id,
            title: self.titulo_proyecto.clone(),
            fields: self.campos.clone(),
        }
    }

    pub fn publication_form(&self) -> PublicationForm {
        PublicationForm {
            external_url: None,
            status: self.estado,
        }
    }
}

/// Drive a freshly opened wizard through the whole manifest
pub async fn run<A: AdminApi + ?Sized>(
    wizard: &mut Wizard<A>,
    job: &JobManifest,
    document: DocumentForm,
) -> Result<WizardSummary> {
    wizard.open();
    wizard.load_project_types().await?;

    if job.autores.iter().any(|a| matches!(a, ManifestAuthor::Usuario { .. })) {
        let users = wizard.load_users().await?;
        for author in &job.autores {
            let staged = match author {
                ManifestAuthor::Usuario { usuario_id } => users
                    .iter()
                    .find(|u| u.id == *usuario_id)
                    .map(StagedAuthor::linked)
                    .ok_or_else(|| {
                        AppError::validation("autores", format!("Usuario {} no encontrado", usuario_id))
                    })?,
                ManifestAuthor::Persona(person) => StagedAuthor::FreePerson(person.clone()),
            };
            wizard.stage_author(staged)?;
        }
    } else {
        for author in &job.autores {
            if let ManifestAuthor::Persona(person) = author {
                wizard.stage_author(StagedAuthor::FreePerson(person.clone()))?;
            }
        }
    }

    wizard.submit_document(&document).await?;
    wizard.submit_project(&job.project_form()).await?;

    if job.generar_slug {
        let url = wizard.generate_slug_preview().await?;
        info!(url = %url, "Publication URL reserved");
    } else if let Some(url) = &job.url_externa {
        wizard.set_external_url(url);
    }

    wizard.finalize(&job.publication_form()).await?;

    wizard.summary().ok_or_else(|| AppError::Internal {
        message: "wizard finished without a document".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::RecordingNotifier;
    use crate::session::WizardStep;
    use docrepo_common::api::{ApiCall, CallKind, MockAdminApi};
    use docrepo_common::cache::LookupCache;
    use docrepo_common::config::AppConfig;
    use docrepo_common::models::UserOption;
    use std::sync::Arc;

    const MANIFEST: &str = r#"{
        "titulo": "Informe Anual 2024",
        "archivo": "informe.pdf",
        "autores": [
            {"tipo": "usuario", "usuario_id": 8},
            {"tipo": "persona", "nombre": "Carlos", "apellido": "Mena"}
        ],
        "tipo_proyecto_id": 2,
        "campos": {"paginas": "40"},
        "generar_slug": true
    }"#;

    fn document() -> DocumentForm {
        DocumentForm::new("Informe Anual 2024")
            .with_file(FileAttachment::sniffed("informe.pdf", b"%PDF-1.4 x".to_vec()))
    }

    fn wizard(api: Arc<MockAdminApi>) -> Wizard<MockAdminApi> {
        let mut config = AppConfig::default();
        config.api.origin = Some("https://repositorio.test".into());
        Wizard::new(
            api,
            Arc::new(LookupCache::default()),
            Arc::new(RecordingNotifier::new()),
            &config,
        )
    }

    #[test]
    fn test_parse_manifest() {
        let job = JobManifest::from_json(MANIFEST).unwrap();
        assert_eq!(job.autores.len(), 2);
        assert_eq!(job.autores[0], ManifestAuthor::Usuario { usuario_id: 8 });
        assert!(job.generar_slug);
        assert_eq!(job.estado, PublicationStatus::Borrador);
        assert_eq!(job.project_form().project_type_id, Some(2));
    }

    #[test]
    fn test_bad_manifest() {
        let err = JobManifest::from_json(r#"{"titulo": 3}"#).unwrap_err();
        assert!(matches!(err, AppError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_run_full_flow() {
        let api = Arc::new(
            MockAdminApi::new()
                .with_users(vec![UserOption { id: 8, display_name: "Ana Ruiz".into() }])
                .with_slug("informe-anual-2024-ab12"),
        );
        let mut wizard = wizard(Arc::clone(&api));
        let job = JobManifest::from_json(MANIFEST).unwrap();

        let summary = run(&mut wizard, &job, document()).await.unwrap();
        assert_eq!(wizard.step(), WizardStep::Completed);
        assert_eq!(summary.authors, vec!["Ana Ruiz".to_string(), "Carlos Mena".to_string()]);
        assert_eq!(summary.slug.as_deref(), Some("informe-anual-2024-ab12"));
        assert_eq!(
            summary.external_url.as_deref(),
            Some("https://repositorio.test/publicacion/informe-anual-2024-ab12/")
        );

        let kinds: Vec<CallKind> = api.calls().iter().map(ApiCall::kind).collect();
        assert_eq!(
            kinds,
            vec![
                CallKind::ListProjectTypes,
                CallKind::ListUsers,
                CallKind::CreateDocument,
                CallKind::CreateAuthor,
                CallKind::CreateAuthor,
                CallKind::CreateProject,
                CallKind::SlugPreview,
                CallKind::CreatePublication,
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_user_stops_before_any_write() {
        let api = Arc::new(MockAdminApi::new());
        let mut wizard = wizard(Arc::clone(&api));
        let job = JobManifest::from_json(MANIFEST).unwrap();

        let err = run(&mut wizard, &job, document()).await.unwrap_err();
        assert_eq!(err.user_message(), "Usuario 8 no encontrado");
        assert!(api.calls_of(CallKind::CreateDocument).is_empty());
    }
}
