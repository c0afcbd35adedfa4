//! In-memory admin API for tests and dry runs

use super::AdminApi;
use crate::errors::{AppError, Result};
use crate::models::{
    AuthorRecord, AuthorKind, Document, NewAuthor, NewDocument, NewProject, NewPublication,
    Project, ProjectType, Publication, UserOption,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Which operation a scripted failure targets
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallKind {
    CreateDocument,
    CreateAuthor,
    CreateProject,
    CreatePublication,
    SlugPreview,
    ListProjectTypes,
    ListUsers,
    DeleteDocument,
    DeleteProject,
}

/// One recorded call, with the payload it carried
#[derive(Clone, Debug, PartialEq)]
pub enum ApiCall {
    CreateDocument(NewDocument),
    CreateAuthor(NewAuthor),
    CreateProject(NewProject),
    CreatePublication(NewPublication),
    SlugPreview { project_id: i64 },
    ListProjectTypes,
    ListUsers,
    DeleteDocument(i64),
    DeleteProject(i64),
}

impl ApiCall {
    pub fn kind(&self) -> CallKind {
        match self {
            ApiCall::CreateDocument(_) => CallKind::CreateDocument,
            ApiCall::CreateAuthor(_) => CallKind::CreateAuthor,
            ApiCall::CreateProject(_) => CallKind::CreateProject,
            ApiCall::CreatePublication(_) => CallKind::CreatePublication,
            ApiCall::SlugPreview { .. } => CallKind::SlugPreview,
            ApiCall::ListProjectTypes => CallKind::ListProjectTypes,
            ApiCall::ListUsers => CallKind::ListUsers,
            ApiCall::DeleteDocument(_) => CallKind::DeleteDocument,
            ApiCall::DeleteProject(_) => CallKind::DeleteProject,
        }
    }
}

/// Mock admin backend.
///
/// Every call is recorded. Failures are scripted per operation and per
/// occurrence (`fail_at(CallKind::CreateAuthor, 1, ..)` fails the second
/// author creation).
pub struct MockAdminApi {
    calls: Mutex<Vec<ApiCall>>,
    failures: Mutex<HashMap<(CallKind, usize), String>>,
    counts: Mutex<HashMap<CallKind, usize>>,
    next_id: AtomicI64,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    slug: Mutex<Option<String>>,
    project_types: Vec<ProjectType>,
    users: Vec<UserOption>,
}

impl Default for MockAdminApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAdminApi {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            counts: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            slug: Mutex::new(None),
            project_types: Vec::new(),
            users: Vec::new(),
        }
    }

    pub fn with_project_types(mut self, project_types: Vec<ProjectType>) -> Self {
        self.project_types = project_types;
        self
    }

    pub fn with_users(mut self, users: Vec<UserOption>) -> Self {
        self.users = users;
        self
    }

    pub fn with_slug(self, slug: &str) -> Self {
        *lock(&self.slug) = Some(slug.to_string());
        self
    }

    /// Fail the `occurrence`-th (0-based) call of `kind` with `message`
    pub fn fail_at(&self, kind: CallKind, occurrence: usize, message: &str) {
        lock(&self.failures).insert((kind, occurrence), message.to_string());
    }

    /// Fail the next call of `kind`
    pub fn fail_next(&self, kind: CallKind, message: &str) {
        let seen = lock(&self.counts).get(&kind).copied().unwrap_or(0);
        self.fail_at(kind, seen, message);
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        lock(&self.calls).clone()
    }

    pub fn calls_of(&self, kind: CallKind) -> Vec<ApiCall> {
        self.calls().into_iter().filter(|c| c.kind() == kind).collect()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Highest number of calls that were in flight at the same time
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn record(&self, call: ApiCall) -> Result<i64> {
        let kind = call.kind();
        lock(&self.calls).push(call);

        let occurrence = {
            let mut counts = lock(&self.counts);
            let n = counts.entry(kind).or_insert(0);
            let current = *n;
            *n += 1;
            current
        };

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(message) = lock(&self.failures).remove(&(kind, occurrence)) {
            return Err(AppError::Api {
                status: Some(400),
                message,
            });
        }
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl AdminApi for MockAdminApi {
    async fn create_document(&self, document: &NewDocument) -> Result<Document> {
        let id = self.record(ApiCall::CreateDocument(document.clone())).await?;
        Ok(Document {
            id,
            title: document.title.clone(),
            description: document.description.clone(),
            file_url: Some(format!("/media/documentos/{}", document.file.file_name)),
            created_at: Some(chrono::Utc::now()),
        })
    }

    async fn create_author(&self, author: &NewAuthor) -> Result<AuthorRecord> {
        let id = self.record(ApiCall::CreateAuthor(author.clone())).await?;
        let (user_id, name) = match &author.kind {
            AuthorKind::Usuario { usuario_id } => (Some(*usuario_id), None),
            AuthorKind::Persona { nombre, .. } => (None, Some(nombre.clone())),
        };
        Ok(AuthorRecord {
            id,
            document_id: author.document_id,
            user_id,
            name,
            position: Some(author.position),
        })
    }

    async fn create_project(&self, project: &NewProject) -> Result<Project> {
        let id = self.record(ApiCall::CreateProject(project.clone())).await?;
        Ok(Project {
            id,
            title: project.title.clone(),
            project_type_id: Some(project.project_type_id),
            document_id: Some(project.document_id),
        })
    }

    async fn create_publication(&self, publication: &NewPublication) -> Result<Publication> {
        let id = self.record(ApiCall::CreatePublication(publication.clone())).await?;
        Ok(Publication {
            id,
            project_id: publication.project_id,
            slug: publication.slug.clone(),
            external_url: publication.external_url.clone(),
            status: Some(publication.status),
        })
    }

    async fn generate_slug_preview(&self, project_id: i64) -> Result<String> {
        self.record(ApiCall::SlugPreview { project_id }).await?;
        Ok(lock(&self.slug)
            .clone()
            .unwrap_or_else(|| format!("proyecto-{}", project_id)))
    }

    async fn list_project_types(&self) -> Result<Vec<ProjectType>> {
        self.record(ApiCall::ListProjectTypes).await?;
        Ok(self.project_types.clone())
    }

    async fn list_users(&self) -> Result<Vec<UserOption>> {
        self.record(ApiCall::ListUsers).await?;
        Ok(self.users.clone())
    }

    async fn delete_document(&self, id: i64) -> Result<()> {
        self.record(ApiCall::DeleteDocument(id)).await?;
        Ok(())
    }

    async fn delete_project(&self, id: i64) -> Result<()> {
        self.record(ApiCall::DeleteProject(id)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FileAttachment;

    fn document(title: &str) -> NewDocument {
        NewDocument {
            title: title.into(),
            description: None,
            file: FileAttachment::sniffed("a.pdf", b"%PDF-1.4".to_vec()),
        }
    }

    #[tokio::test]
    async fn test_records_calls_and_assigns_ids() {
        let api = MockAdminApi::new();
        let first = api.create_document(&document("A")).await.unwrap();
        let second = api.create_document(&document("B")).await.unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(api.calls_of(CallKind::CreateDocument).len(), 2);
    }

    #[tokio::test]
    async fn test_scripted_failure_hits_one_occurrence() {
        let api = MockAdminApi::new();
        api.fail_at(CallKind::CreateDocument, 1, "Título duplicado");

        assert!(api.create_document(&document("A")).await.is_ok());
        let err = api.create_document(&document("A")).await.unwrap_err();
        assert_eq!(err.user_message(), "Título duplicado");
        assert!(api.create_document(&document("A")).await.is_ok());
        assert_eq!(api.call_count(), 3);
    }

    #[tokio::test]
    async fn test_default_slug() {
        let api = MockAdminApi::new();
        assert_eq!(api.generate_slug_preview(5).await.unwrap(), "proyecto-5");

        let api = MockAdminApi::new().with_slug("informe-anual-2024-ab12");
        assert_eq!(api.generate_slug_preview(5).await.unwrap(), "informe-anual-2024-ab12");
    }
}
