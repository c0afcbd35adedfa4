//! quick-publish
//!
//! Runs the quick-creation wizard against the admin backend from a JSON job
//! manifest:
//! 1. Creates the document with its PDF and authors
//! 2. Creates the project
//! 3. Creates the publication and prints the summary

use anyhow::Context;
use docrepo_common::{
    cache::LookupCache, config::ObservabilityConfig, metrics, AppConfig, HttpAdminApi, VERSION,
};
use docrepo_wizard::{job, TracingNotifier, Wizard};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing
    init_tracing(&config.observability);

    info!(service = %config.observability.service_name, "Starting DocRepo quick-publish v{}", VERSION);

    metrics::register_metrics();

    let manifest_path = std::env::args()
        .nth(1)
        .context("usage: quick-publish <job.json>")?;
    let manifest_path = Path::new(&manifest_path);
    let base_dir = manifest_path.parent().unwrap_or_else(|| Path::new("."));

    let job = job::JobManifest::load(manifest_path)
        .await
        .with_context(|| format!("Failed to read job manifest {}", manifest_path.display()))?;
    let document = job.document_form(base_dir).await?;

    let api = Arc::new(HttpAdminApi::new(&config.api)?);
    let cache = Arc::new(LookupCache::new(config.cache.clone()));
    let mut wizard = Wizard::new(api, cache, Arc::new(TracingNotifier), &config);

    match job::run(&mut wizard, &job, document).await {
        Ok(summary) => {
            info!(document_id = summary.document_id, publication_id = ?summary.publication_id, "Quick publish complete");
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        Err(e) => {
            let orphans = wizard.session().orphans();
            error!(error = %e, step = wizard.step().number(), ?orphans, "Quick publish failed");
            Err(e.into())
        }
    }
}

fn init_tracing(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if config.json_logging {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}
