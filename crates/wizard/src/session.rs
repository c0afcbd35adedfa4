//! Wizard session state
//!
//! Lives for one open/close cycle of the wizard. Nothing here is persisted.

use crate::authors::AuthorStaging;
use docrepo_common::models::{Document, Project, Publication};
use serde::Serialize;

/// Position in the fixed three-step flow
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    #[default]
    Document,
    Project,
    Publication,
    Completed,
}

impl WizardStep {
    /// 1-based step number; Completed reports 4
    pub fn number(self) -> u8 {
        match self {
            WizardStep::Document => 1,
            WizardStep::Project => 2,
            WizardStep::Publication => 3,
            WizardStep::Completed => 4,
        }
    }

    pub fn next(self) -> WizardStep {
        match self {
            WizardStep::Document => WizardStep::Project,
            WizardStep::Project => WizardStep::Publication,
            WizardStep::Publication | WizardStep::Completed => WizardStep::Completed,
        }
    }

    /// Only steps 2 and 3 can go back
    pub fn previous(self) -> Option<WizardStep> {
        match self {
            WizardStep::Project => Some(WizardStep::Document),
            WizardStep::Publication => Some(WizardStep::Project),
            WizardStep::Document | WizardStep::Completed => None,
        }
    }
}

/// A server-side entity left behind by a flow that did not complete
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "entity", content = "id", rename_all = "snake_case")]
pub enum Orphan {
    Document(i64),
    Project(i64),
}

#[derive(Debug, Default)]
pub struct WizardSession {
    pub(crate) step: WizardStep,
    pub(crate) created_document: Option<Document>,
    pub(crate) created_project: Option<Project>,
    pub(crate) created_publication: Option<Publication>,
    pub(crate) authors: AuthorStaging,
    /// Staged authors already written against the document
    pub(crate) authors_persisted: usize,
    /// Linked-user ids the project was created with
    pub(crate) project_author_ids: Vec<i64>,
    pub(crate) generated_slug: Option<String>,
    pub(crate) external_url: Option<String>,
}

impl WizardSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn created_document(&self) -> Option<&Document> {
        self.created_document.as_ref()
    }

    pub fn created_project(&self) -> Option<&Project> {
        self.created_project.as_ref()
    }

    pub fn created_publication(&self) -> Option<&Publication> {
        self.created_publication.as_ref()
    }

    pub fn authors(&self) -> &AuthorStaging {
        &self.authors
    }

    pub fn generated_slug(&self) -> Option<&str> {
        self.generated_slug.as_deref()
    }

    pub fn external_url(&self) -> Option<&str> {
        self.external_url.as_deref()
    }

    /// Linked users staged after the project was created. The project is
    /// reused as is, so these never reach its `autores`.
    pub fn unsent_project_authors(&self) -> Vec<i64> {
        if self.created_project.is_none() {
            return Vec::new();
        }
        self.authors
            .linked_user_ids()
            .into_iter()
            .filter(|id| !self.project_author_ids.contains(id))
            .collect()
    }

    /// Entities created so far that no finished flow owns yet
    pub fn orphans(&self) -> Vec<Orphan> {
        if self.step == WizardStep::Completed {
            return Vec::new();
        }
        let mut orphans = Vec::new();
        if let Some(document) = &self.created_document {
            orphans.push(Orphan::Document(document.id));
        }
        if let Some(project) = &self.created_project {
            orphans.push(Orphan::Project(project.id));
        }
        orphans
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_transitions() {
        assert_eq!(WizardStep::default(), WizardStep::Document);
        assert_eq!(WizardStep::Document.next(), WizardStep::Project);
        assert_eq!(WizardStep::Publication.next(), WizardStep::Completed);
        assert_eq!(WizardStep::Publication.previous(), Some(WizardStep::Project));
        assert_eq!(WizardStep::Document.previous(), None);
        assert_eq!(WizardStep::Completed.previous(), None);
        assert_eq!(WizardStep::Publication.number(), 3);
    }

    #[test]
    fn test_orphans_and_reset() {
        let mut session = WizardSession::new();
        assert!(session.orphans().is_empty());

        session.created_document = Some(Document {
            id: 4,
            title: "Informe".into(),
            description: None,
            file_url: None,
            created_at: None,
        });
        session.step = WizardStep::Project;
        assert_eq!(session.orphans(), vec![Orphan::Document(4)]);

        session.step = WizardStep::Completed;
        assert!(session.orphans().is_empty());

        session.reset();
        assert_eq!(session.step(), WizardStep::Document);
        assert!(session.created_document().is_none());
    }
}
