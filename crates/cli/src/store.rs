//! Filesystem-backed store for the documents each pipeline stage leaves
//! behind. Every artifact is pretty-printed JSON so a job directory can be
//! inspected with nothing but a pager.
//!
//! Layout under the store root:
//!
//! ```text
//! chunks/{job}/{repo}_{n}.json          one document per chunk
//! results/{job}/{repo}/{stem}.json      one document per analyzed chunk
//! reports/{job}/report.json|report.md   final catalog
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use apiscout_chunker::Chunk;
use apiscout_inference::ChunkResult;
use apiscout_reconciler::CatalogReport;
use serde::de::DeserializeOwned;
use tokio::fs;

/// A stored chunk document plus the file stem it was stored under.
///
/// The stem names the matching result document, so a result can always be
/// traced back to the chunk that produced it.
#[derive(Debug, Clone)]
pub struct ChunkDoc {
    pub stem: String,
    pub chunk: Chunk,
}

/// Reads and writes job artifacts below a single root directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn chunks_dir(&self, job_id: &str) -> PathBuf {
        self.root.join("chunks").join(job_id)
    }

    fn results_dir(&self, job_id: &str) -> PathBuf {
        self.root.join("results").join(job_id)
    }

    fn reports_dir(&self, job_id: &str) -> PathBuf {
        self.root.join("reports").join(job_id)
    }

    /// Persists one chunk as `chunks/{job}/{repo}_{index}.json`.
    ///
    /// The index is the caller's running counter per repository, not the
    /// chunk's own section index, so file names stay unique even when a
    /// section splits into several chunks.
    pub async fn write_chunk(
        &self,
        job_id: &str,
        repo_name: &str,
        index: usize,
        chunk: &Chunk,
    ) -> Result<PathBuf> {
        let dir = self.chunks_dir(job_id);
        let path = dir.join(format!("{repo_name}_{index}.json"));
        write_json(&dir, &path, chunk).await?;
        Ok(path)
    }

    /// Loads every chunk document of a job, sorted by stem.
    ///
    /// Documents that fail to read or parse are logged and skipped so one
    /// damaged file cannot sink the whole job.
    pub async fn read_chunks(&self, job_id: &str) -> Result<Vec<ChunkDoc>> {
        let dir = self.chunks_dir(job_id);
        let mut entries = fs::read_dir(&dir)
            .await
            .with_context(|| format!("Cannot list chunk documents in {}", dir.display()))?;

        let mut docs = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .with_context(|| format!("Cannot list chunk documents in {}", dir.display()))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match read_json::<Chunk>(&path).await {
                Ok(chunk) => docs.push(ChunkDoc {
                    stem: stem.to_string(),
                    chunk,
                }),
                Err(err) => {
                    log::warn!("Skipping unreadable chunk document {}: {err:#}", path.display());
                }
            }
        }
        docs.sort_by(|a, b| a.stem.cmp(&b.stem));
        Ok(docs)
    }

    /// Persists one analysis result as `results/{job}/{repo}/{stem}.json`.
    pub async fn write_result(
        &self,
        job_id: &str,
        stem: &str,
        result: &ChunkResult,
    ) -> Result<PathBuf> {
        let dir = self.results_dir(job_id).join(&result.repo_name);
        let path = dir.join(format!("{stem}.json"));
        write_json(&dir, &path, result).await?;
        Ok(path)
    }

    /// Lists every result document of a job, sorted by path.
    ///
    /// A job that produced no results yields an empty list, not an error.
    pub async fn list_results(&self, job_id: &str) -> Result<Vec<PathBuf>> {
        let dir = self.results_dir(job_id);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut paths: Vec<PathBuf> = walkdir::WalkDir::new(&dir)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    log::warn!("Failed to read entry: {err}");
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("json"))
            .collect();
        paths.sort();
        Ok(paths)
    }

    pub async fn read_result(&self, path: &Path) -> Result<ChunkResult> {
        read_json(path).await
    }

    /// Persists the final catalog as `reports/{job}/report.json`.
    pub async fn write_report(&self, job_id: &str, report: &CatalogReport) -> Result<PathBuf> {
        let dir = self.reports_dir(job_id);
        let path = dir.join("report.json");
        write_json(&dir, &path, report).await?;
        Ok(path)
    }

    /// Persists the rendered catalog as `reports/{job}/report.md`.
    pub async fn write_report_markdown(&self, job_id: &str, markdown: &str) -> Result<PathBuf> {
        let dir = self.reports_dir(job_id);
        fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Cannot create {}", dir.display()))?;
        let path = dir.join("report.md");
        fs::write(&path, markdown)
            .await
            .with_context(|| format!("Cannot write {}", path.display()))?;
        Ok(path)
    }
}

async fn write_json<T: serde::Serialize>(dir: &Path, path: &Path, value: &T) -> Result<()> {
    fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Cannot create {}", dir.display()))?;
    let data = serde_json::to_vec_pretty(value)
        .with_context(|| format!("Cannot serialize {}", path.display()))?;
    fs::write(path, data)
        .await
        .with_context(|| format!("Cannot write {}", path.display()))?;
    Ok(())
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read(path)
        .await
        .with_context(|| format!("Cannot read {}", path.display()))?;
    serde_json::from_slice(&raw).with_context(|| format!("Invalid JSON in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiscout_chunker::Language;
    use apiscout_inference::{EndpointCandidate, EndpointPair};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample_chunk(repo: &str, section: usize) -> Chunk {
        Chunk {
            repo_name: repo.to_string(),
            file_path: "routes/users.js".to_string(),
            language: Language::JavaScript,
            section_index: section,
            sub_index: None,
            content: "router.get('/users', list);".to_string(),
            is_partial: false,
            total_chunks: 1,
        }
    }

    #[tokio::test]
    async fn chunk_documents_round_trip_sorted_by_stem() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());

        store
            .write_chunk("job-1", "shop", 1, &sample_chunk("shop", 1))
            .await
            .unwrap();
        store
            .write_chunk("job-1", "shop", 0, &sample_chunk("shop", 0))
            .await
            .unwrap();

        let docs = store.read_chunks("job-1").await.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].stem, "shop_0");
        assert_eq!(docs[1].stem, "shop_1");
        assert_eq!(docs[0].chunk.section_index, 0);
    }

    #[tokio::test]
    async fn damaged_chunk_documents_are_skipped() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());

        store
            .write_chunk("job-1", "shop", 0, &sample_chunk("shop", 0))
            .await
            .unwrap();
        let bad = dir.path().join("chunks/job-1/shop_1.json");
        tokio::fs::write(&bad, b"{ not json").await.unwrap();

        let docs = store.read_chunks("job-1").await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].stem, "shop_0");
    }

    #[tokio::test]
    async fn results_are_grouped_by_repository() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());

        let result = ChunkResult {
            repo_name: "shop".to_string(),
            file_path: "routes/users.js".to_string(),
            chunk_id: "0".to_string(),
            endpoints: vec![EndpointCandidate::from_pair(
                EndpointPair::new("GET", "/users"),
                "shop",
                "routes/users.js",
            )],
        };
        let path = store.write_result("job-1", "shop_0", &result).await.unwrap();
        assert!(path.ends_with("results/job-1/shop/shop_0.json"));

        let listed = store.list_results("job-1").await.unwrap();
        assert_eq!(listed, vec![path.clone()]);

        let loaded = store.read_result(&path).await.unwrap();
        assert_eq!(loaded.endpoints.len(), 1);
        assert_eq!(loaded.endpoints[0].path, "/users");
    }

    #[tokio::test]
    async fn listing_results_of_an_unknown_job_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(dir.path());
        let listed = store.list_results("no-such-job").await.unwrap();
        assert!(listed.is_empty());
    }
}
