//! The discovery pipeline, stage by stage.
//!
//! Each stage reads and writes [`ArtifactStore`] documents, so a job can be
//! driven one stage at a time (and rerun from any point), while [`run`]
//! chains everything in memory for the one-shot case.
//!
//! ```text
//! discover   repositories ──> candidate files ──> chunk documents
//! extract    chunk documents ──> inference ──> result documents
//! aggregate  result documents ──> catalog ──> report
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;
use apiscout_chunker::{Chunk, Chunker, Language};
use apiscout_classifier::{read_lossy, RepoScanner};
use apiscout_inference::{
    should_analyze, AnalysisRequest, ChunkResult, EndpointCandidate, EndpointInference,
    SharedInference,
};
use apiscout_reconciler::{CatalogReport, EndpointCatalog, SharedCatalog};
use serde::Serialize;

use crate::store::ArtifactStore;

/// Upper bound on concurrent inference calls, whatever the flag says.
const MAX_CONCURRENT_ANALYSES: usize = 16;

/// A repository to scan: display name plus its on-disk root.
#[derive(Debug, Clone)]
pub struct RepoSource {
    pub name: String,
    pub root: PathBuf,
}

impl RepoSource {
    /// Names the repository after the final path component of its root.
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let name = root
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("repo")
            .to_string();
        Self { name, root }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DiscoverStats {
    pub job_id: String,
    pub repositories: usize,
    pub candidate_files: usize,
    pub files_skipped: usize,
    pub sections: usize,
    pub chunks_written: usize,
    pub languages: BTreeMap<String, usize>,
}

/// A section yields one chunk with no sub index, or a run of chunks whose
/// sub indexes start at zero.
fn count_sections(chunks: &[Chunk]) -> usize {
    chunks
        .iter()
        .filter(|chunk| chunk.sub_index.unwrap_or(0) == 0)
        .count()
}

/// Scans every repository, chunks each candidate file, and persists one
/// document per chunk. Unreadable files are logged and skipped.
pub async fn discover(
    store: &ArtifactStore,
    job_id: &str,
    sources: &[RepoSource],
    scanner: &RepoScanner,
    chunker: &Chunker,
) -> Result<DiscoverStats> {
    let mut stats = DiscoverStats {
        job_id: job_id.to_string(),
        ..Default::default()
    };

    for source in sources {
        stats.repositories += 1;
        let candidates = scanner.scan(&source.name, &source.root);
        stats.candidate_files += candidates.len();

        // Running counter per repository: chunk document names must stay
        // unique even when one section splits into several chunks.
        let mut chunk_index = 0usize;
        for candidate in &candidates {
            let content = match read_lossy(&candidate.absolute_path) {
                Ok(content) => content,
                Err(err) => {
                    log::warn!(
                        "Cannot read {}: {err}",
                        candidate.absolute_path.display()
                    );
                    stats.files_skipped += 1;
                    continue;
                }
            };

            let language = Language::from_path(&candidate.relative_path);
            *stats
                .languages
                .entry(language.as_str().to_string())
                .or_default() += 1;

            let chunks =
                chunker.chunk_content(&candidate.repo_name, &candidate.relative_path, &content);
            stats.sections += count_sections(&chunks);
            for chunk in &chunks {
                store
                    .write_chunk(job_id, &source.name, chunk_index, chunk)
                    .await?;
                chunk_index += 1;
            }
            stats.chunks_written += chunks.len();
        }
        log::info!(
            "Repository {}: {} candidate files, {} chunks",
            source.name,
            candidates.len(),
            chunk_index
        );
    }
    Ok(stats)
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractStats {
    pub job_id: String,
    pub chunks_seen: usize,
    pub chunks_analyzed: usize,
    pub chunks_skipped_small: usize,
    pub chunks_failed: usize,
    pub candidates_found: usize,
}

/// What happened to a single chunk during analysis.
enum ChunkOutcome {
    /// Below the analyzable size; no result document is written.
    Skipped,
    /// The backend failed; the error is logged and no document is written.
    Failed,
    /// Analysis succeeded, possibly with zero candidates.
    Analyzed(Vec<EndpointCandidate>),
}

async fn analyze_chunk(backend: &dyn EndpointInference, chunk: &Chunk) -> ChunkOutcome {
    if !should_analyze(&chunk.content) {
        log::debug!(
            "Skipping short chunk {} of {}/{}",
            chunk.chunk_id(),
            chunk.repo_name,
            chunk.file_path
        );
        return ChunkOutcome::Skipped;
    }
    let request = AnalysisRequest::from_chunk(chunk);
    match backend.analyze(&request).await {
        Ok(pairs) => ChunkOutcome::Analyzed(
            pairs
                .into_iter()
                .map(|pair| EndpointCandidate::from_pair(pair, &chunk.repo_name, &chunk.file_path))
                .collect(),
        ),
        Err(err) => {
            log::error!(
                "Analysis failed for chunk {} of {}/{}: {err}",
                chunk.chunk_id(),
                chunk.repo_name,
                chunk.file_path
            );
            ChunkOutcome::Failed
        }
    }
}

/// Runs inference over every stored chunk of a job and persists one result
/// document per successful analysis. Chunks are analyzed in batches of
/// `concurrency` tasks; failures cost only their own chunk.
pub async fn extract(
    store: &ArtifactStore,
    job_id: &str,
    backend: SharedInference,
    concurrency: usize,
) -> Result<ExtractStats> {
    let docs = store.read_chunks(job_id).await?;
    let mut stats = ExtractStats {
        job_id: job_id.to_string(),
        chunks_seen: docs.len(),
        ..Default::default()
    };
    log::info!("Analyzing {} chunks with backend {}", docs.len(), backend.name());

    let batch_size = concurrency.clamp(1, MAX_CONCURRENT_ANALYSES);
    for batch in docs.chunks(batch_size) {
        let mut tasks = Vec::with_capacity(batch.len());
        for doc in batch {
            let doc = doc.clone();
            let backend = backend.clone();
            tasks.push(tokio::spawn(async move {
                let outcome = analyze_chunk(backend.as_ref(), &doc.chunk).await;
                (doc, outcome)
            }));
        }
        for task in tasks {
            match task.await {
                Ok((doc, ChunkOutcome::Analyzed(candidates))) => {
                    stats.chunks_analyzed += 1;
                    stats.candidates_found += candidates.len();
                    let result = ChunkResult {
                        repo_name: doc.chunk.repo_name.clone(),
                        file_path: doc.chunk.file_path.clone(),
                        chunk_id: doc.chunk.chunk_id(),
                        endpoints: candidates,
                    };
                    store.write_result(job_id, &doc.stem, &result).await?;
                }
                Ok((_, ChunkOutcome::Skipped)) => stats.chunks_skipped_small += 1,
                Ok((_, ChunkOutcome::Failed)) => stats.chunks_failed += 1,
                Err(err) => {
                    log::error!("Analysis task failed: {err}");
                    stats.chunks_failed += 1;
                }
            }
        }
    }
    Ok(stats)
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AggregateStats {
    pub job_id: String,
    pub result_files: usize,
    pub result_files_unreadable: usize,
    pub candidates_seen: usize,
    pub candidates_accepted: usize,
    pub unique_endpoints: usize,
}

/// Folds every result document of a job into one canonical catalog.
/// Unreadable documents are logged and skipped.
pub async fn aggregate(
    store: &ArtifactStore,
    job_id: &str,
) -> Result<(EndpointCatalog, AggregateStats)> {
    let paths = store.list_results(job_id).await?;
    let mut stats = AggregateStats {
        job_id: job_id.to_string(),
        ..Default::default()
    };
    let mut catalog = EndpointCatalog::new();

    for path in paths {
        stats.result_files += 1;
        let result = match store.read_result(&path).await {
            Ok(result) => result,
            Err(err) => {
                log::warn!("Skipping unreadable result document {}: {err:#}", path.display());
                stats.result_files_unreadable += 1;
                continue;
            }
        };
        stats.candidates_seen += result.endpoints.len();
        stats.candidates_accepted += catalog.observe_all(&result.endpoints);
    }
    stats.unique_endpoints = catalog.len();
    Ok((catalog, stats))
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStats {
    pub job_id: String,
    pub repositories: usize,
    pub candidate_files: usize,
    pub files_skipped: usize,
    pub sections: usize,
    pub chunks_total: usize,
    pub chunks_analyzed: usize,
    pub chunks_skipped_small: usize,
    pub chunks_failed: usize,
    pub candidates_found: usize,
    pub candidates_accepted: usize,
    pub unique_endpoints: usize,
}

/// The whole pipeline in memory: scan, chunk, analyze, reconcile, report.
/// Nothing is persisted; the caller decides what to do with the report.
pub async fn run(
    job_id: &str,
    sources: &[RepoSource],
    scanner: &RepoScanner,
    chunker: &Chunker,
    backend: SharedInference,
    concurrency: usize,
) -> Result<(CatalogReport, RunStats)> {
    let mut stats = RunStats {
        job_id: job_id.to_string(),
        ..Default::default()
    };

    let mut chunks: Vec<Chunk> = Vec::new();
    for source in sources {
        stats.repositories += 1;
        let candidates = scanner.scan(&source.name, &source.root);
        stats.candidate_files += candidates.len();
        for candidate in &candidates {
            let content = match read_lossy(&candidate.absolute_path) {
                Ok(content) => content,
                Err(err) => {
                    log::warn!(
                        "Cannot read {}: {err}",
                        candidate.absolute_path.display()
                    );
                    stats.files_skipped += 1;
                    continue;
                }
            };
            let file_chunks = chunker.chunk_content(
                &candidate.repo_name,
                &candidate.relative_path,
                &content,
            );
            stats.sections += count_sections(&file_chunks);
            chunks.extend(file_chunks);
        }
    }
    stats.chunks_total = chunks.len();
    log::info!(
        "Analyzing {} chunks from {} repositories with backend {}",
        chunks.len(),
        stats.repositories,
        backend.name()
    );

    let shared = SharedCatalog::new();
    let batch_size = concurrency.clamp(1, MAX_CONCURRENT_ANALYSES);
    for batch in chunks.chunks(batch_size) {
        let mut tasks = Vec::with_capacity(batch.len());
        for chunk in batch {
            let chunk = chunk.clone();
            let backend = backend.clone();
            let shared = shared.clone();
            tasks.push(tokio::spawn(async move {
                let outcome = analyze_chunk(backend.as_ref(), &chunk).await;
                let accepted = match &outcome {
                    ChunkOutcome::Analyzed(candidates) => shared.observe_all(candidates),
                    _ => 0,
                };
                (outcome, accepted)
            }));
        }
        for task in tasks {
            match task.await {
                Ok((ChunkOutcome::Analyzed(candidates), accepted)) => {
                    stats.chunks_analyzed += 1;
                    stats.candidates_found += candidates.len();
                    stats.candidates_accepted += accepted;
                }
                Ok((ChunkOutcome::Skipped, _)) => stats.chunks_skipped_small += 1,
                Ok((ChunkOutcome::Failed, _)) => stats.chunks_failed += 1,
                Err(err) => {
                    log::error!("Analysis task failed: {err}");
                    stats.chunks_failed += 1;
                }
            }
        }
    }

    let catalog = shared.into_catalog();
    stats.unique_endpoints = catalog.len();
    let report = CatalogReport::build(job_id, &catalog);
    Ok((report, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiscout_chunker::ChunkerConfig;
    use apiscout_classifier::ClassificationIndex;
    use apiscout_inference::{EndpointPair, NullInference, ReplayInference};
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn write_fixture_repo(root: &std::path::Path) {
        fs::create_dir_all(root.join("routes")).unwrap();
        fs::write(
            root.join("routes/users.js"),
            "const express = require('express');\n\
             const router = express.Router();\n\
             router.get('/users', (req, res) => { res.json([]); });\n\
             router.post('/users', (req, res) => { res.status(201).end(); });\n",
        )
        .unwrap();
        // Dependency tree noise that must never reach the chunker.
        fs::create_dir_all(root.join("node_modules/express/lib")).unwrap();
        fs::write(
            root.join("node_modules/express/lib/router.js"),
            "module.exports = function() {};\n",
        )
        .unwrap();
    }

    fn test_scanner() -> RepoScanner {
        RepoScanner::new(ClassificationIndex::with_defaults())
    }

    #[tokio::test]
    async fn discover_writes_one_document_per_chunk() {
        let repo = TempDir::new().unwrap();
        write_fixture_repo(repo.path());
        let artifacts = TempDir::new().unwrap();
        let store = ArtifactStore::new(artifacts.path());

        let sources = vec![RepoSource {
            name: "shop".to_string(),
            root: repo.path().to_path_buf(),
        }];
        let stats = discover(
            &store,
            "job-1",
            &sources,
            &test_scanner(),
            &Chunker::new(ChunkerConfig::default()),
        )
        .await
        .unwrap();

        assert_eq!(stats.repositories, 1);
        assert_eq!(stats.candidate_files, 1);
        // Two method-call matches plus the express.Router() signature.
        assert_eq!(stats.sections, 3);
        assert_eq!(stats.chunks_written, 3);
        assert_eq!(stats.languages.get("js"), Some(&1));

        let docs = store.read_chunks("job-1").await.unwrap();
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[0].stem, "shop_0");
        assert_eq!(docs[0].chunk.repo_name, "shop");
    }

    #[tokio::test]
    async fn extract_with_replay_backend_writes_result_documents() {
        let repo = TempDir::new().unwrap();
        write_fixture_repo(repo.path());
        let artifacts = TempDir::new().unwrap();
        let store = ArtifactStore::new(artifacts.path());
        let sources = vec![RepoSource {
            name: "shop".to_string(),
            root: repo.path().to_path_buf(),
        }];
        discover(
            &store,
            "job-1",
            &sources,
            &test_scanner(),
            &Chunker::new(ChunkerConfig::default()),
        )
        .await
        .unwrap();

        // Canned responses keyed by request digest, one per stored chunk.
        let responses = TempDir::new().unwrap();
        for doc in store.read_chunks("job-1").await.unwrap() {
            let request = AnalysisRequest::from_chunk(&doc.chunk);
            let key = ReplayInference::response_key(&request);
            fs::write(
                responses.path().join(format!("{key}.txt")),
                r#"[{"method": "GET", "path": "/users"}]"#,
            )
            .unwrap();
        }

        let backend: SharedInference = Arc::new(ReplayInference::new(responses.path()));
        let stats = extract(&store, "job-1", backend, 4).await.unwrap();
        assert_eq!(stats.chunks_seen, 3);
        assert_eq!(stats.chunks_analyzed, 3);
        assert_eq!(stats.chunks_failed, 0);
        assert_eq!(stats.candidates_found, 3);

        let results = store.list_results("job-1").await.unwrap();
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn aggregate_folds_duplicates_into_one_endpoint() {
        let artifacts = TempDir::new().unwrap();
        let store = ArtifactStore::new(artifacts.path());

        let candidate = |repo: &str, file: &str| {
            EndpointCandidate::from_pair(EndpointPair::new("get", "/users/"), repo, file)
        };
        store
            .write_result(
                "job-1",
                "shop_0",
                &ChunkResult {
                    repo_name: "shop".to_string(),
                    file_path: "routes/users.js".to_string(),
                    chunk_id: "0".to_string(),
                    endpoints: vec![candidate("shop", "routes/users.js")],
                },
            )
            .await
            .unwrap();
        store
            .write_result(
                "job-1",
                "billing_0",
                &ChunkResult {
                    repo_name: "billing".to_string(),
                    file_path: "api/app.py".to_string(),
                    chunk_id: "0".to_string(),
                    endpoints: vec![candidate("billing", "api/app.py")],
                },
            )
            .await
            .unwrap();

        let (catalog, stats) = aggregate(&store, "job-1").await.unwrap();
        assert_eq!(stats.result_files, 2);
        assert_eq!(stats.candidates_seen, 2);
        assert_eq!(stats.candidates_accepted, 2);
        assert_eq!(stats.unique_endpoints, 1);

        let endpoints: Vec<_> = catalog.endpoints().collect();
        assert_eq!(endpoints[0].method, "GET");
        assert_eq!(endpoints[0].path, "/users");
        assert_eq!(endpoints[0].alternative_sources.len(), 1);
    }

    #[tokio::test]
    async fn run_with_null_backend_reports_an_empty_catalog() {
        let repo = TempDir::new().unwrap();
        write_fixture_repo(repo.path());
        let sources = vec![RepoSource::from_root(repo.path())];

        let backend: SharedInference = Arc::new(NullInference);
        let (report, stats) = run(
            "job-1",
            &sources,
            &test_scanner(),
            &Chunker::new(ChunkerConfig::default()),
            backend,
            4,
        )
        .await
        .unwrap();

        assert_eq!(stats.chunks_total, 3);
        assert_eq!(stats.chunks_analyzed, 3);
        assert_eq!(stats.unique_endpoints, 0);
        assert_eq!(report.total_endpoints, 0);
        assert!(report.repositories.is_empty());
    }
}
