//! Wizard controller
//!
//! Drives the fixed flow Document -> Project -> Publication:
//! - every step validates its form before any request
//! - a step advances only after its server call succeeds
//! - failures leave the step where it was and never undo earlier steps
//! - staged authors are written one at a time, in order

use crate::authors::StagedAuthor;
use crate::forms::{DocumentForm, ProjectForm, PublicationForm};
use crate::notify::Notifier;
use crate::session::{WizardSession, WizardStep};
use crate::slug::{extract_slug, preview_url};
use crate::summary::WizardSummary;
use docrepo_common::cache::{keys, LookupCache};
use docrepo_common::config::{AppConfig, WizardConfig};
use docrepo_common::errors::{AppError, Result};
use docrepo_common::metrics::record_wizard_step;
use docrepo_common::models::{
    Document, NewProject, NewPublication, Project, ProjectType, Publication, UserOption,
};
use docrepo_common::AdminApi;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

const ERROR_TITLE: &str = "Error";

pub struct Wizard<A: AdminApi + ?Sized> {
    api: Arc<A>,
    cache: Arc<LookupCache>,
    notifier: Arc<dyn Notifier>,
    limits: WizardConfig,
    origin: String,
    session: WizardSession,
    busy: bool,
}

impl<A: AdminApi + ?Sized> Wizard<A> {
    pub fn new(
        api: Arc<A>,
        cache: Arc<LookupCache>,
        notifier: Arc<dyn Notifier>,
        config: &AppConfig,
    ) -> Self {
        Self {
            api,
            cache,
            notifier,
            limits: config.wizard.clone(),
            origin: config.public_origin().to_string(),
            session: WizardSession::new(),
            busy: false,
        }
    }

    pub fn session(&self) -> &WizardSession {
        &self.session
    }

    pub fn step(&self) -> WizardStep {
        self.session.step()
    }

    /// False whenever the next/finish control may be pressed
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Start a fresh session
    pub fn open(&mut self) {
        self.session.reset();
        self.busy = false;
        info!("Wizard opened");
    }

    /// Discard the session. Entities already created stay on the server.
    pub fn close(&mut self) {
        let orphans = self.session.orphans();
        if !orphans.is_empty() {
            warn!(?orphans, "Wizard closed before completion");
        }
        self.session.reset();
        self.busy = false;
        info!("Wizard closed");
    }

    /// Users for the linked-author select box
    pub async fn load_users(&self) -> Result<Vec<UserOption>> {
        let api = Arc::clone(&self.api);
        self.cache
            .get_or_load(&keys::users(), || async move { api.list_users().await })
            .await
            .map_err(|e| self.reject(e))
    }

    /// Project types, with the schema of their dynamic fields
    pub async fn load_project_types(&self) -> Result<Vec<ProjectType>> {
        let api = Arc::clone(&self.api);
        self.cache
            .get_or_load(&keys::project_types(), || async move { api.list_project_types().await })
            .await
            .map_err(|e| self.reject(e))
    }

    /// Add an author to the local list. Only possible on step 1.
    pub fn stage_author(&mut self, author: StagedAuthor) -> Result<usize> {
        self.expect_step(WizardStep::Document).map_err(|e| self.reject(e))?;
        let index = self.session.authors.stage(author).map_err(|e| self.reject(e))?;
        debug!(index, total = self.session.authors.len(), "Author staged");
        Ok(index)
    }

    /// Remove a staged author that has not been written yet
    pub fn remove_author(&mut self, index: usize) -> Result<StagedAuthor> {
        self.expect_step(WizardStep::Document).map_err(|e| self.reject(e))?;
        if index < self.session.authors_persisted {
            return Err(self.reject(AppError::validation("autores", "El autor ya fue registrado")));
        }
        self.session
            .authors
            .remove(index)
            .ok_or_else(|| self.reject(AppError::validation("autores", "El autor no existe")))
    }

    /// Step 1: create the document, then its authors one by one.
    ///
    /// The form is validated on every submit. Once the document exists it is
    /// reused; later edits to the form are not sent.
    pub async fn submit_document(&mut self, form: &DocumentForm) -> Result<Document> {
        let step = WizardStep::Document;
        self.expect_step(step).map_err(|e| self.reject(e))?;
        let new_document = form.to_new_document(&self.limits).map_err(|e| self.reject(e))?;

        let document = match self.session.created_document.clone() {
            Some(existing) => {
                if existing.title != new_document.title {
                    warn!(
                        document_id = existing.id,
                        title = %new_document.title,
                        "Document already created, edited form is not sent"
                    );
                }
                existing
            }
            None => {
                self.busy = true;
                match self.api.create_document(&new_document).await {
                    Ok(document) => {
                        info!(document_id = document.id, title = %document.title, "Document created");
                        self.session.created_document = Some(document.clone());
                        document
                    }
                    Err(e) => return Err(self.fail(step, e)),
                }
            }
        };

        self.busy = true;
        if let Err(e) = self.persist_authors(document.id).await {
            return Err(self.fail(step, e));
        }

        self.advance(step);
        Ok(document)
    }

    async fn persist_authors(&mut self, document_id: i64) -> Result<()> {
        let pending: Vec<(usize, StagedAuthor)> = self
            .session
            .authors
            .entries()
            .iter()
            .cloned()
            .enumerate()
            .skip(self.session.authors_persisted)
            .collect();

        for (index, author) in pending {
            let row = author.to_new_author(document_id, index as u32 + 1);
            let record = self.api.create_author(&row).await?;
            self.session.authors_persisted = index + 1;
            debug!(document_id, author_id = record.id, position = row.position, "Author created");
        }
        Ok(())
    }

    /// Step 2: create the project with the linked-user authors.
    ///
    /// Validated on every submit like step 1. An existing project is reused;
    /// linked authors staged after its creation are reported, not sent.
    pub async fn submit_project(&mut self, form: &ProjectForm) -> Result<Project> {
        let step = WizardStep::Project;
        self.expect_step(step).map_err(|e| self.reject(e))?;

        let project_type_id = form.selected_type().map_err(|e| self.reject(e))?;
        let fields = self
            .project_fields(project_type_id, &form.fields)
            .await
            .map_err(|e| self.reject(e))?;

        if let Some(existing) = self.session.created_project.clone() {
            let unsent = self.session.unsent_project_authors();
            if !unsent.is_empty() {
                warn!(project_id = existing.id, ?unsent, "Project already created, new linked authors are not sent");
            }
            self.advance(step);
            return Ok(existing);
        }

        let document_id = self.document_id().map_err(|e| self.reject(e))?;
        let new_project = NewProject {
            title: form
                .title
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            project_type_id,
            document_id,
            author_user_ids: self.session.authors.linked_user_ids(),
            fields,
        };

        self.busy = true;
        match self.api.create_project(&new_project).await {
            Ok(project) => {
                info!(project_id = project.id, document_id, "Project created");
                self.session.created_project = Some(project.clone());
                self.session.project_author_ids = new_project.author_user_ids;
                self.advance(step);
                Ok(project)
            }
            Err(e) => Err(self.fail(step, e)),
        }
    }

    /// Check and coerce dynamic field values through the cached schema.
    ///
    /// Without a cached schema the raw strings are sent as typed.
    async fn project_fields(&self, project_type_id: i64, raw: &BTreeMap<String, String>) -> Result<Map<String, Value>> {
        if let Ok(Some(types)) = self.cache.get::<Vec<ProjectType>>(&keys::project_types()).await {
            if let Some(project_type) = types.iter().find(|t| t.id == project_type_id) {
                if let Some(field) = project_type.first_missing_required(raw) {
                    return Err(AppError::validation(
                        &field.name,
                        format!("El campo {} es obligatorio", field.display_label()),
                    ));
                }
                return Ok(project_type.coerce_fields(raw));
            }
        }
        Ok(raw
            .iter()
            .map(|(name, value)| (name.clone(), Value::String(value.clone())))
            .collect())
    }

    /// Ask the server for the slug and remember it for the publication.
    ///
    /// Returns the public URL the publication will have.
    pub async fn generate_slug_preview(&mut self) -> Result<String> {
        self.expect_step(WizardStep::Publication).map_err(|e| self.reject(e))?;
        let project_id = self.project_id().map_err(|e| self.reject(e))?;

        self.busy = true;
        let result = self.api.generate_slug_preview(project_id).await;
        self.busy = false;

        let slug = result.map_err(|e| self.reject(e))?;
        let url = preview_url(&self.origin, &slug);
        debug!(project_id, slug = %slug, "Slug preview cached");
        self.session.generated_slug = Some(slug);
        self.session.external_url = Some(url.clone());
        Ok(url)
    }

    /// URL typed by hand. Empty text clears it.
    pub fn set_external_url(&mut self, url: &str) {
        let url = url.trim();
        self.session.external_url = (!url.is_empty()).then(|| url.to_string());
    }

    /// Cached preview slug first, then whatever the URL text yields
    fn resolve_slug(&self, external_url: Option<&str>) -> Option<String> {
        self.session
            .generated_slug
            .clone()
            .or_else(|| external_url.and_then(extract_slug))
    }

    /// Step 3: create the publication and finish the flow.
    ///
    /// Calling it again after completion, without a reset, sends another
    /// publication for the same project. Nothing deduplicates it.
    pub async fn finalize(&mut self, form: &PublicationForm) -> Result<Publication> {
        let step = WizardStep::Publication;
        if self.session.step != WizardStep::Completed {
            self.expect_step(step).map_err(|e| self.reject(e))?;
        }
        let project_id = self.project_id().map_err(|e| self.reject(e))?;

        let external_url = form
            .external_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string)
            .or_else(|| self.session.external_url.clone());
        let slug = self.resolve_slug(external_url.as_deref());

        let new_publication = NewPublication {
            project_id,
            slug,
            external_url,
            status: form.status,
        };

        self.busy = true;
        match self.api.create_publication(&new_publication).await {
            Ok(publication) => {
                info!(publication_id = publication.id, project_id, "Publication created");
                self.session.created_publication = Some(publication.clone());
                self.advance(step);
                self.cache.invalidate_all().await;
                self.notifier
                    .success("Publicación creada", "El documento, el proyecto y la publicación se crearon correctamente");
                Ok(publication)
            }
            Err(e) => Err(self.fail(step, e)),
        }
    }

    /// Go back one step. Nothing created is undone.
    pub fn back(&mut self) -> Result<WizardStep> {
        let current = self.session.step;
        match current.previous() {
            Some(previous) => {
                self.session.step = previous;
                debug!(from = current.number(), to = previous.number(), "Wizard stepped back");
                Ok(previous)
            }
            None => Err(self.reject(AppError::InvalidStep {
                expected: WizardStep::Project.number(),
                actual: current.number(),
            })),
        }
    }

    pub fn summary(&self) -> Option<WizardSummary> {
        WizardSummary::from_session(&self.session)
    }

    fn expect_step(&self, expected: WizardStep) -> Result<()> {
        if self.session.step == expected {
            Ok(())
        } else {
            Err(AppError::InvalidStep {
                expected: expected.number(),
                actual: self.session.step.number(),
            })
        }
    }

    fn document_id(&self) -> Result<i64> {
        self.session
            .created_document
            .as_ref()
            .map(|d| d.id)
            .ok_or_else(|| AppError::Internal {
                message: "no document in wizard session".to_string(),
            })
    }

    fn project_id(&self) -> Result<i64> {
        self.session
            .created_project
            .as_ref()
            .map(|p| p.id)
            .ok_or_else(|| AppError::Internal {
                message: "no project in wizard session".to_string(),
            })
    }

    fn advance(&mut self, step: WizardStep) {
        record_wizard_step(step.number(), true);
        self.session.step = step.next();
        self.busy = false;
        info!(step = step.number(), next = self.session.step.number(), "Wizard step completed");
    }

    /// Server-side failure of `step`: report it and leave state as is
    fn fail(&mut self, step: WizardStep, err: AppError) -> AppError {
        self.busy = false;
        record_wizard_step(step.number(), false);

        let orphans = self.session.orphans();
        if !orphans.is_empty() {
            warn!(step = step.number(), ?orphans, "Step failed after earlier entities were created");
        }
        warn!(step = step.number(), error = %err, "Wizard step failed");
        self.reject(err)
    }

    /// Show the error dialog and hand the error back
    fn reject(&self, err: AppError) -> AppError {
        self.notifier.error(ERROR_TITLE, &err.user_message());
        err
    }
}
