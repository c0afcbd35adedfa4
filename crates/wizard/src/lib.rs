//! DocRepo quick-creation wizard
//!
//! Creates a document (with its file and authors), a project and a
//! publication in one guided, strictly ordered flow:
//! - `controller`: the step machine and its server calls
//! - `session`: per-run state, discarded on close
//! - `authors`: client-side author staging
//! - `forms`: typed form state and validation
//! - `slug`: publication slug preview and extraction
//! - `notify`: user-facing dialogs
//! - `job`: manifest-driven headless runs

pub mod authors;
pub mod controller;
pub mod forms;
pub mod job;
pub mod notify;
pub mod session;
pub mod slug;
pub mod summary;

pub use authors::{AuthorStaging, PersonAuthor, StagedAuthor};
pub use controller::Wizard;
pub use forms::{DocumentForm, ProjectForm, PublicationForm};
pub use notify::{Notifier, RecordingNotifier, TracingNotifier};
pub use session::{Orphan, WizardSession, WizardStep};
pub use summary::WizardSummary;
