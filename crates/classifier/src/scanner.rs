use crate::index::ClassificationIndex;
use ignore::WalkBuilder;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Files larger than this are never worth scanning for route declarations.
const MAX_FILE_SIZE_BYTES: u64 = 1_048_576;

/// A file the classifier picked as likely to declare HTTP routes.
///
/// Identity is the `(repo_name, relative_path)` pair; `absolute_path` only
/// says where the bytes currently live on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateFile {
    pub repo_name: String,
    pub relative_path: String,
    pub absolute_path: PathBuf,
}

/// Walks one materialized repository and keeps the candidate files.
pub struct RepoScanner {
    index: ClassificationIndex,
}

impl RepoScanner {
    pub fn new(index: ClassificationIndex) -> Self {
        Self { index }
    }

    pub fn with_defaults() -> Self {
        Self::new(ClassificationIndex::with_defaults())
    }

    /// Scan `root` and return candidates sorted by relative path.
    ///
    /// Unreadable entries are logged and skipped; the walk itself never
    /// fails.
    pub fn scan(&self, repo_name: &str, root: &Path) -> Vec<CandidateFile> {
        let mut candidates = Vec::new();

        let mut builder = WalkBuilder::new(root);
        builder
            .hidden(true) // hidden trees are excluded by classification anyway
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true);

        for result in builder.build() {
            match result {
                Ok(entry) => {
                    let Some(file_type) = entry.file_type() else {
                        continue;
                    };
                    if !file_type.is_file() {
                        continue;
                    }

                    let path = entry.path();
                    if let Ok(meta) = entry.metadata() {
                        if meta.len() > MAX_FILE_SIZE_BYTES {
                            log::debug!(
                                "Skipping large file {} ({} bytes > {})",
                                path.display(),
                                meta.len(),
                                MAX_FILE_SIZE_BYTES
                            );
                            continue;
                        }
                    }

                    let Some(relative_path) = relative_to(path, root) else {
                        continue;
                    };
                    if self.index.classify(&relative_path).is_none() {
                        continue;
                    }

                    candidates.push(CandidateFile {
                        repo_name: repo_name.to_string(),
                        relative_path,
                        absolute_path: path.to_path_buf(),
                    });
                }
                Err(e) => log::warn!("Failed to read entry: {e}"),
            }
        }

        candidates.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        log::info!("Found {} candidate files in {repo_name}", candidates.len());
        candidates
    }
}

/// Read a candidate's bytes, replacing invalid UTF-8 instead of failing.
///
/// Route files occasionally carry latin-1 comments or stray bytes; losing a
/// character beats losing the file.
pub fn read_lossy(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn relative_to(path: &Path, root: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let text = relative.to_string_lossy().replace('\\', "/");
    (!text.is_empty()).then_some(text)
}
