//! Final summary of a wizard run

use crate::session::WizardSession;
use docrepo_common::markup::escape_html;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WizardSummary {
    pub document_id: i64,
    pub document_title: String,
    pub authors: Vec<String>,
    pub project_id: Option<i64>,
    pub publication_id: Option<i64>,
    pub slug: Option<String>,
    pub external_url: Option<String>,
}

impl WizardSummary {
    /// Nothing to summarize until the document exists
    pub fn from_session(session: &WizardSession) -> Option<Self> {
        let document = session.created_document()?;
        let publication = session.created_publication();

        Some(Self {
            document_id: document.id,
            document_title: document.title.clone(),
            authors: session
                .authors()
                .entries()
                .iter()
                .map(|author| author.display_name())
                .collect(),
            project_id: session.created_project().map(|p| p.id),
            publication_id: publication.map(|p| p.id),
            slug: publication.and_then(|p| p.slug.clone()),
            external_url: publication
                .and_then(|p| p.external_url.clone())
                .or_else(|| session.external_url().map(str::to_string)),
        })
    }

    pub fn render_html(&self) -> String {
        let mut html = String::from("<dl class=\"wizard-resumen\">");
        html.push_str(&format!(
            "<dt>Documento</dt><dd>#{} {}</dd>",
            self.document_id,
            escape_html(&self.document_title)
        ));

        if !self.authors.is_empty() {
            let items: String = self
                .authors
                .iter()
                .map(|name| format!("<li>{}</li>", escape_html(name)))
                .collect();
            html.push_str(&format!("<dt>Autores</dt><dd><ul>{}</ul></dd>", items));
        }
        if let Some(project_id) = self.project_id {
            html.push_str(&format!("<dt>Proyecto</dt><dd>#{}</dd>", project_id));
        }
        if let Some(publication_id) = self.publication_id {
            html.push_str(&format!("<dt>Publicación</dt><dd>#{}</dd>", publication_id));
        }
        if let Some(url) = &self.external_url {
            let url = escape_html(url);
            html.push_str(&format!("<dt>URL</dt><dd><a href=\"{0}\">{0}</a></dd>", url));
        }
        html.push_str("</dl>");
        html
    }
}
