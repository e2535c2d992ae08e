use crate::boundary::{braced_block_end, clamp_to_char_boundary, indented_block_end};
use crate::config::ChunkerConfig;
use crate::language::{BlockStyle, Language};
use crate::signatures::SignatureTable;
use once_cell::sync::Lazy;
use regex::Regex;

/// Declaration openers the lookback scan recognizes when widening a section
/// backwards from a signature match.
static DECLARATION_OPENER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(function|class|def|func)\s+\w+").expect("opener pattern must compile"));

/// Slices route-bearing sections out of file content.
///
/// For every signature match the extractor widens backwards to the nearest
/// declaration opener inside the lookback window, then scans forward for the
/// block boundary, capped by the forward window.
pub struct SectionExtractor {
    signatures: SignatureTable,
    config: ChunkerConfig,
}

impl SectionExtractor {
    pub fn new(config: ChunkerConfig) -> Self {
        Self::with_signatures(config, SignatureTable::builtin())
    }

    pub fn with_signatures(config: ChunkerConfig, signatures: SignatureTable) -> Self {
        Self { signatures, config }
    }

    /// Extract section texts from one file, in pattern-major order: all
    /// matches of the first pattern, then the second, and so on.
    pub fn extract(&self, content: &str, language: Language) -> Vec<String> {
        let Some(style) = language.block_style() else {
            return Vec::new();
        };

        let mut sections = Vec::new();
        for pattern in self.signatures.for_language(language) {
            for found in pattern.find_iter(content) {
                let start = self.section_start(content, found.start());
                let end = self.section_end(content, found.start(), found.end(), style);
                let text = content[start..end].trim();
                if !text.is_empty() {
                    sections.push(text.to_string());
                }
            }
        }
        sections
    }

    /// Widen backwards: nearest declaration opener inside the lookback
    /// window, or the window start when none is found.
    fn section_start(&self, content: &str, match_start: usize) -> usize {
        let window_start = clamp_to_char_boundary(
            content,
            match_start.saturating_sub(self.config.context_lookback_chars),
        );

        let mut opener: Option<usize> = None;
        let mut offset = window_start;
        for line in content[window_start..match_start].split_inclusive('\n') {
            if DECLARATION_OPENER.is_match(line) {
                opener = Some(offset);
            }
            offset += line.len();
        }
        opener.unwrap_or(window_start)
    }

    /// Scan forward from the match for the block boundary. When the block
    /// never closes inside the forward window, the section runs to the
    /// window end.
    fn section_end(
        &self,
        content: &str,
        match_start: usize,
        match_end: usize,
        style: BlockStyle,
    ) -> usize {
        let eol = content[match_end..]
            .find('\n')
            .map(|i| match_end + i)
            .unwrap_or(content.len());
        let window_end = clamp_to_char_boundary(
            content,
            eol.saturating_add(self.config.forward_window_chars),
        );

        match style {
            BlockStyle::Braced => {
                braced_block_end(content, match_start, match_end, window_end).unwrap_or(window_end)
            }
            BlockStyle::Indented => {
                let body_start = (eol + 1).min(content.len());
                indented_block_end(content, body_start, window_end).unwrap_or(window_end)
            }
        }
    }
}
