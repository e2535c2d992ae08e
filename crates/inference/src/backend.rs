use crate::error::Result;
use crate::parse::parse_endpoint_pairs;
use crate::types::{AnalysisRequest, EndpointPair};
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::sync::Arc;

/// Boundary to whatever reads a chunk and reports endpoints.
///
/// The pipeline only ever talks to this trait; swapping a hosted model for
/// canned responses is a constructor away.
#[async_trait]
pub trait EndpointInference: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Analyze one chunk and return the raw method/path pairs it declares.
    async fn analyze(&self, request: &AnalysisRequest) -> Result<Vec<EndpointPair>>;
}

/// Shared handle the pipeline clones into its worker tasks.
pub type SharedInference = Arc<dyn EndpointInference>;

/// Backend that reports nothing. Useful for dry runs where only the
/// classification and chunking stages matter.
pub struct NullInference;

#[async_trait]
impl EndpointInference for NullInference {
    fn name(&self) -> &'static str {
        "null"
    }

    async fn analyze(&self, _request: &AnalysisRequest) -> Result<Vec<EndpointPair>> {
        Ok(Vec::new())
    }
}

/// Backend that replays canned responses from a directory.
///
/// Responses are keyed by a digest of the chunk content, so the same chunk
/// always maps to the same file regardless of where or when it was cut.
/// A chunk without a recorded response yields no pairs.
pub struct ReplayInference {
    dir: PathBuf,
}

impl ReplayInference {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File stem a request's response is stored under.
    pub fn response_key(request: &AnalysisRequest) -> String {
        let digest = Sha256::digest(request.content.as_bytes());
        digest
            .iter()
            .take(8)
            .map(|byte| format!("{byte:02x}"))
            .collect()
    }

    fn response_path(&self, request: &AnalysisRequest) -> PathBuf {
        self.dir.join(format!("{}.txt", Self::response_key(request)))
    }
}

#[async_trait]
impl EndpointInference for ReplayInference {
    fn name(&self) -> &'static str {
        "replay"
    }

    async fn analyze(&self, request: &AnalysisRequest) -> Result<Vec<EndpointPair>> {
        let path = self.response_path(request);
        let response = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::debug!(
                    "No recorded response for {} ({})",
                    request.file_path,
                    path.display()
                );
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };
        Ok(parse_endpoint_pairs(&response))
    }
}
