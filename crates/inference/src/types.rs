use apiscout_chunker::{Chunk, Language};
use serde::{Deserialize, Serialize};

/// Chunks shorter than this carry no extractable route; they are skipped
/// before any backend call.
pub const MIN_ANALYZABLE_CHARS: usize = 50;

/// Whether a chunk's content is worth sending to a backend at all.
pub fn should_analyze(content: &str) -> bool {
    content.chars().count() >= MIN_ANALYZABLE_CHARS
}

/// What a backend receives for one chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub content: String,
    pub language: Language,
    pub file_path: String,
    pub is_partial: bool,
}

impl AnalysisRequest {
    pub fn from_chunk(chunk: &Chunk) -> Self {
        Self {
            content: chunk.content.clone(),
            language: chunk.language,
            file_path: chunk.file_path.clone(),
            is_partial: chunk.is_partial,
        }
    }
}

/// A bare method and path pair as reported by a backend.
///
/// Pairs are raw: casing and slashes stay exactly as the model wrote them,
/// and normalization happens once, at reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointPair {
    pub method: String,
    pub path: String,
}

impl EndpointPair {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
        }
    }
}

/// An endpoint observation tied back to the file that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointCandidate {
    pub method: String,
    pub path: String,
    pub repo_name: String,
    pub file_path: String,
}

impl EndpointCandidate {
    pub fn from_pair(pair: EndpointPair, repo_name: &str, file_path: &str) -> Self {
        Self {
            method: pair.method,
            path: pair.path,
            repo_name: repo_name.to_string(),
            file_path: file_path.to_string(),
        }
    }
}

/// Per-chunk result document persisted by the extract stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkResult {
    pub repo_name: String,
    pub file_path: String,
    pub chunk_id: String,
    pub endpoints: Vec<EndpointCandidate>,
}
