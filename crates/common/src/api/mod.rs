//! Admin API abstraction
//!
//! `AdminApi` is the seam between the wizard and the backend:
//! - `HttpAdminApi` talks to the real server through `ApiClient`
//! - `MockAdminApi` records calls in memory for tests and dry runs

mod mock;

pub use mock::{ApiCall, CallKind, MockAdminApi};

use crate::client::{ApiClient, ApiResponse};
use crate::config::{ApiConfig, EndpointsConfig};
use crate::errors::{AppError, Result};
use crate::models::{
    AuthorRecord, Document, NewAuthor, NewDocument, NewProject, NewPublication, Project,
    ProjectType, Publication, SlugPreview, UserOption,
};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::info;

/// Operations the admin backend offers to the wizard
#[async_trait]
pub trait AdminApi: Send + Sync {
    /// Create a document with its file (multipart)
    async fn create_document(&self, document: &NewDocument) -> Result<Document>;

    /// Create one author row against an existing document
    async fn create_author(&self, author: &NewAuthor) -> Result<AuthorRecord>;

    /// Create a project bound to a document (multipart)
    async fn create_project(&self, project: &NewProject) -> Result<Project>;

    /// Create the publication of a project (JSON)
    async fn create_publication(&self, publication: &NewPublication) -> Result<Publication>;

    /// Ask the server which slug a publication of this project would get
    async fn generate_slug_preview(&self, project_id: i64) -> Result<String>;

    /// Project types with their dynamic field schema
    async fn list_project_types(&self) -> Result<Vec<ProjectType>>;

    /// Users selectable as linked authors
    async fn list_users(&self) -> Result<Vec<UserOption>>;

    /// Delete a document. Only ever called on explicit request.
    async fn delete_document(&self, id: i64) -> Result<()>;

    /// Delete a project. Only ever called on explicit request.
    async fn delete_project(&self, id: i64) -> Result<()>;
}

/// `AdminApi` over HTTP
pub struct HttpAdminApi {
    client: ApiClient,
    endpoints: EndpointsConfig,
}

impl HttpAdminApi {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        Ok(Self {
            client: ApiClient::new(config)?,
            endpoints: config.endpoints.clone(),
        })
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

/// Multipart body for a new document
pub fn document_form(document: &NewDocument) -> Result<Form> {
    let file = Part::bytes(document.file.bytes.clone())
        .file_name(document.file.file_name.clone())
        .mime_str(&document.file.content_type)?;

    let mut form = Form::new()
        .text("titulo", document.title.clone())
        .part("archivo", file);
    if let Some(description) = &document.description {
        form = form.text("descripcion", description.clone());
    }
    Ok(form)
}

/// Text fields of the project multipart body, in send order
pub fn project_form_fields(project: &NewProject) -> Result<Vec<(&'static str, String)>> {
    let mut fields = Vec::with_capacity(5);
    if let Some(title) = &project.title {
        fields.push(("titulo", title.clone()));
    }
    fields.push(("tipo_proyecto", project.project_type_id.to_string()));
    fields.push(("documento", project.document_id.to_string()));
    fields.push(("autores", serde_json::to_string(&project.author_user_ids)?));
    fields.push(("campos", serde_json::to_string(&project.fields)?));
    Ok(fields)
}

#[async_trait]
impl AdminApi for HttpAdminApi {
    async fn create_document(&self, document: &NewDocument) -> Result<Document> {
        let form = document_form(document)?;
        let response: ApiResponse<Document> =
            self.client.send_multipart(&self.endpoints.documents, form).await?;
        let created = response.into_data(&self.endpoints.documents)?;
        info!(document_id = created.id, size = document.file.size(), "Document created");
        Ok(created)
    }

    async fn create_author(&self, author: &NewAuthor) -> Result<AuthorRecord> {
        let path = EndpointsConfig::with_id(&self.endpoints.document_authors, author.document_id);
        let response: ApiResponse<AuthorRecord> =
            self.client.send_json(Method::POST, &path, author).await?;
        response.into_data(&path)
    }

    async fn create_project(&self, project: &NewProject) -> Result<Project> {
        let form = project_form_fields(project)?
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value));
        let response: ApiResponse<Project> =
            self.client.send_multipart(&self.endpoints.projects, form).await?;
        let created = response.into_data(&self.endpoints.projects)?;
        info!(project_id = created.id, document_id = project.document_id, "Project created");
        Ok(created)
    }

    async fn create_publication(&self, publication: &NewPublication) -> Result<Publication> {
        let response: ApiResponse<Publication> = self
            .client
            .send_json(Method::POST, &self.endpoints.publications, publication)
            .await?;
        let created = response.into_data(&self.endpoints.publications)?;
        info!(publication_id = created.id, project_id = publication.project_id, "Publication created");
        Ok(created)
    }

    async fn generate_slug_preview(&self, project_id: i64) -> Result<String> {
        let response: SlugPreview = self
            .client
            .send_json(Method::POST, &self.endpoints.slug_preview, &json!({ "proyecto_id": project_id }))
            .await?;

        if !response.success {
            return Err(AppError::Api {
                status: None,
                message: response
                    .error
                    .unwrap_or_else(|| crate::errors::MSG_GENERIC.to_string()),
            });
        }
        response
            .slug_preview
            .filter(|slug| !slug.is_empty())
            .ok_or_else(|| AppError::InvalidResponse {
                endpoint: self.endpoints.slug_preview.clone(),
                message: "slug preview missing from response".to_string(),
            })
    }

    async fn list_project_types(&self) -> Result<Vec<ProjectType>> {
        let response: ApiResponse<Vec<ProjectType>> =
            self.client.get_json(&self.endpoints.project_types, &[]).await?;
        response.into_data(&self.endpoints.project_types)
    }

    async fn list_users(&self) -> Result<Vec<UserOption>> {
        let response: ApiResponse<Vec<UserOption>> = self
            .client
            .get_json(&self.endpoints.users, &[("activos", "1".to_string())])
            .await?;
        response.into_data(&self.endpoints.users)
    }

    async fn delete_document(&self, id: i64) -> Result<()> {
        let path = EndpointsConfig::with_id(&self.endpoints.document, id);
        let response: ApiResponse<Value> =
            self.client.send_json(Method::DELETE, &path, &Value::Null).await?;
        response.into_result()?;
        info!(document_id = id, "Document deleted");
        Ok(())
    }

    async fn delete_project(&self, id: i64) -> Result<()> {
        let path = EndpointsConfig::with_id(&self.endpoints.project, id);
        let response: ApiResponse<Value> =
            self.client.send_json(Method::DELETE, &path, &Value::Null).await?;
        response.into_result()?;
        info!(project_id = id, "Project deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::{head_of, serve_once, CSRF};
    use crate::errors::MSG_GENERIC;
    use crate::models::FileAttachment;
    use serde_json::Map;

    #[test]
    fn test_project_form_only_carries_linked_ids() {
        let mut fields = Map::new();
        fields.insert("paginas".into(), Value::from(120));

        let project = NewProject {
            title: None,
            project_type_id: 4,
            document_id: 17,
            author_user_ids: vec![11, 12],
            fields,
        };
        let form = project_form_fields(&project).unwrap();
        assert_eq!(
            form,
            vec![
                ("tipo_proyecto", "4".to_string()),
                ("documento", "17".to_string()),
                ("autores", "[11,12]".to_string()),
                ("campos", r#"{"paginas":120}"#.to_string()),
            ]
        );
    }

    #[test]
    fn test_document_form_rejects_bad_mime() {
        let document = NewDocument {
            title: "Informe".into(),
            description: None,
            file: FileAttachment::new("informe.pdf", "not a mime", b"%PDF-".to_vec()),
        };
        assert!(document_form(&document).is_err());

        let document = NewDocument {
            file: FileAttachment::new("informe.pdf", "application/pdf", b"%PDF-".to_vec()),
            ..document
        };
        assert!(document_form(&document).is_ok());
    }

    #[tokio::test]
    async fn test_document_upload_is_multipart_with_csrf() {
        let (config, server) = serve_once(
            "201 Created",
            r#"{"success": true, "data": {"id": 31, "titulo": "Informe Anual 2024"}}"#,
        )
        .await;
        let api = HttpAdminApi::new(&config).unwrap();
        let document = NewDocument {
            title: "Informe Anual 2024".into(),
            description: None,
            file: FileAttachment::sniffed("informe.pdf", b"%PDF-1.7 contenido".to_vec()),
        };

        let created = api.create_document(&document).await.unwrap();
        assert_eq!(created.id, 31);

        let request = server.await.unwrap();
        let head = head_of(&request);
        assert!(head.starts_with("post /api/documentos/ "));
        assert!(head.contains("content-type: multipart/form-data; boundary="));
        assert!(head.contains(&format!("x-csrftoken: {}", CSRF)));
        assert!(request.contains("name=\"titulo\""));
        assert!(request.contains("filename=\"informe.pdf\""));
    }

    #[tokio::test]
    async fn test_success_without_data_is_server_side() {
        let (config, server) = serve_once("200 OK", r#"{"success": true}"#).await;
        let api = HttpAdminApi::new(&config).unwrap();
        let project = NewProject {
            title: None,
            project_type_id: 2,
            document_id: 31,
            author_user_ids: vec![],
            fields: Map::new(),
        };

        let err = api.create_project(&project).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidResponse { .. }));
        assert!(!err.is_client_side());
        assert_eq!(err.user_message(), MSG_GENERIC);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_slug_preview_on_the_wire() {
        let (config, server) =
            serve_once("200 OK", r#"{"success": true, "slug_preview": "informe-anual-2024-ab12"}"#).await;
        let api = HttpAdminApi::new(&config).unwrap();
        assert_eq!(api.generate_slug_preview(9).await.unwrap(), "informe-anual-2024-ab12");
        let request = server.await.unwrap();
        assert!(head_of(&request).starts_with("post /api/publicaciones/generar-slug/ "));
        assert!(request.contains(r#""proyecto_id":9"#));

        let (config, server) = serve_once("200 OK", r#"{"success": true, "slug_preview": ""}"#).await;
        let api = HttpAdminApi::new(&config).unwrap();
        let err = api.generate_slug_preview(9).await.unwrap_err();
        assert_eq!(err.user_message(), MSG_GENERIC);
        assert!(!err.is_client_side());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_document_uses_override() {
        let (config, server) = serve_once("200 OK", r#"{"success": true}"#).await;
        let api = HttpAdminApi::new(&config).unwrap();
        api.delete_document(5).await.unwrap();

        let request = server.await.unwrap();
        let path = EndpointsConfig::with_id(&config.endpoints.document, 5);
        assert!(head_of(&request).starts_with(&format!("post {} ", path)));
        assert!(request.contains(r#""_method":"DELETE""#));
    }

    #[test]
    fn test_http_api_builds_from_config() {
        let api = HttpAdminApi::new(&ApiConfig::default()).unwrap();
        assert_eq!(api.client().url("/api/proyectos/"), "http://localhost:8000/api/proyectos/");
    }
}
