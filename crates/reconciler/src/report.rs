use crate::catalog::{EndpointCatalog, SourceRef};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

/// One endpoint row in the report, grouped under its primary repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEndpoint {
    pub endpoint_id: String,
    pub method: String,
    pub path: String,
    pub file_path: String,
    #[serde(default)]
    pub alternative_sources: Vec<SourceRef>,
}

/// Final artifact of a run: every canonical endpoint, grouped by the
/// repository that first reported it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogReport {
    pub job_id: String,
    pub generated_unix_ms: u64,
    pub total_endpoints: usize,
    pub repositories: BTreeMap<String, Vec<ReportEndpoint>>,
}

impl CatalogReport {
    pub fn build(job_id: impl Into<String>, catalog: &EndpointCatalog) -> Self {
        let mut repositories: BTreeMap<String, Vec<ReportEndpoint>> = BTreeMap::new();
        for endpoint in catalog.endpoints() {
            repositories
                .entry(endpoint.repo_name.clone())
                .or_default()
                .push(ReportEndpoint {
                    endpoint_id: endpoint.endpoint_id(),
                    method: endpoint.method.clone(),
                    path: endpoint.path.clone(),
                    file_path: endpoint.file_path.clone(),
                    alternative_sources: endpoint.alternative_sources.clone(),
                });
        }
        Self {
            job_id: job_id.into(),
            generated_unix_ms: unix_ms_now(),
            total_endpoints: catalog.len(),
            repositories,
        }
    }

    pub fn render_markdown(&self) -> String {
        let mut md = String::new();
        md.push_str("# API endpoint catalog\n\n");
        md.push_str(&format!("- Job: `{}`\n", self.job_id));
        md.push_str(&format!("- Endpoints: `{}`\n", self.total_endpoints));
        md.push_str(&format!("- Repositories: `{}`\n\n", self.repositories.len()));

        for (repo, endpoints) in &self.repositories {
            md.push_str(&format!("## {repo}\n\n"));
            md.push_str("| method | path | file | also seen |\n");
            md.push_str("|---|---|---|---:|\n");
            for endpoint in endpoints {
                md.push_str(&format!(
                    "| `{}` | `{}` | `{}` | `{}` |\n",
                    endpoint.method,
                    endpoint.path,
                    endpoint.file_path,
                    endpoint.alternative_sources.len()
                ));
            }
            md.push('\n');
        }
        md
    }
}

fn unix_ms_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
