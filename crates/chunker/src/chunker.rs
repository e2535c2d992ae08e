use crate::config::ChunkerConfig;
use crate::extractor::SectionExtractor;
use crate::language::Language;
use crate::signatures::SignatureTable;
use crate::splitter::split_section;
use crate::types::{Chunk, Section};

/// Main chunker interface: file content in, budgeted chunks out.
pub struct Chunker {
    config: ChunkerConfig,
    extractor: SectionExtractor,
}

impl Chunker {
    /// Create a new chunker with configuration
    #[must_use]
    pub fn new(config: ChunkerConfig) -> Self {
        config
            .validate()
            .expect("Invalid chunker configuration provided");
        let extractor = SectionExtractor::new(config.clone());
        Self { config, extractor }
    }

    /// Create a chunker with a custom signature table
    #[must_use]
    pub fn with_signatures(config: ChunkerConfig, signatures: SignatureTable) -> Self {
        config
            .validate()
            .expect("Invalid chunker configuration provided");
        let extractor = SectionExtractor::with_signatures(config.clone(), signatures);
        Self { config, extractor }
    }

    /// Chunk one file's content, detecting the language from its path.
    pub fn chunk_content(&self, repo_name: &str, file_path: &str, content: &str) -> Vec<Chunk> {
        let language = Language::from_path(file_path);
        self.chunk_with_language(repo_name, file_path, content, language)
    }

    /// Chunk one file's content with an explicit language.
    ///
    /// When no signature matches, the whole file becomes a single section so
    /// that a route file with unrecognized framework syntax is still
    /// analyzed. Empty content produces no chunks at all.
    pub fn chunk_with_language(
        &self,
        repo_name: &str,
        file_path: &str,
        content: &str,
        language: Language,
    ) -> Vec<Chunk> {
        if content.is_empty() {
            log::debug!("Skipping empty file {repo_name}/{file_path}");
            return Vec::new();
        }

        let mut texts = self.extractor.extract(content, language);
        if texts.is_empty() {
            log::debug!(
                "No signature matches in {repo_name}/{file_path}; using the whole file as one section"
            );
            texts = vec![content.to_string()];
        }

        let mut chunks = Vec::new();
        for (index, text) in texts.into_iter().enumerate() {
            let section = Section {
                repo_name: repo_name.to_string(),
                file_path: file_path.to_string(),
                language,
                index,
                text,
            };
            chunks.extend(split_section(&section, self.config.max_chunk_chars));
        }
        chunks
    }

    pub const fn config(&self) -> &ChunkerConfig {
        &self.config
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self::new(ChunkerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn chunks_a_route_file_end_to_end() {
        let content = "\
router.get('/users', (req, res) => {
  res.json(users);
});
";
        let chunker = Chunker::default();
        let chunks = chunker.chunk_content("shop", "routes/users.js", content);

        assert_eq!(chunks.len(), 1);
        let chunk = &chunks[0];
        assert_eq!(chunk.repo_name, "shop");
        assert_eq!(chunk.file_path, "routes/users.js");
        assert_eq!(chunk.language, Language::JavaScript);
        assert_eq!(chunk.chunk_id(), "0");
        assert!(!chunk.is_partial);
        assert!(chunk.content.contains("router.get('/users'"));
    }

    #[test]
    fn empty_content_produces_no_chunks() {
        let chunker = Chunker::default();
        assert!(chunker.chunk_content("shop", "routes/users.js", "").is_empty());
    }

    #[test]
    fn file_without_matches_becomes_one_whole_file_chunk() {
        let content = "// nothing that looks like a route\nconst n = 1;\n";
        let chunker = Chunker::default();
        let chunks = chunker.chunk_content("shop", "routes/misc.js", content);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, content);
        assert_eq!(chunks[0].section_index, 0);
        assert!(!chunks[0].is_partial);
    }

    #[test]
    fn unknown_extension_still_gets_the_whole_file_treatment() {
        let content = "some opaque config\n";
        let chunker = Chunker::default();
        let chunks = chunker.chunk_content("shop", "routes/users.conf", content);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].language, Language::Unknown);
        assert_eq!(chunks[0].content, content);
    }

    #[test]
    fn oversized_sections_are_split_with_file_scoped_indices() {
        // A small handler followed by a minified route line: the second
        // section outgrows the budget through its long match line.
        let minified = "x".repeat(3500);
        let tail = "// tail tail tail\n".repeat(60);
        let content = format!(
            "router.get('/a', h => {{ ok(); }});\n\nrouter.post('/b', start); {minified}\n{tail}"
        );
        let chunker = Chunker::default();
        let chunks = chunker.chunk_content("shop", "routes/big.js", &content);

        assert!(chunks.len() > 2);
        assert_eq!(chunks[0].section_index, 0);
        assert_eq!(chunks[0].sub_index, None);
        let split: Vec<&Chunk> = chunks.iter().filter(|c| c.is_partial).collect();
        assert!(split.len() >= 2);
        assert!(split.iter().all(|c| c.section_index == 1));
        assert!(split.iter().all(|c| c.content.chars().count() <= 4000));
        assert_eq!(split[0].chunk_id(), "1_0");
    }

    #[test]
    #[should_panic(expected = "Invalid chunker configuration")]
    fn zero_budget_panics_at_construction() {
        let config = ChunkerConfig {
            max_chunk_chars: 0,
            ..Default::default()
        };
        let _ = Chunker::new(config);
    }
}
