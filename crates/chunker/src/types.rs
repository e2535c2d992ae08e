use crate::language::Language;
use serde::{Deserialize, Serialize};

/// A contiguous span of one file believed to contain route declarations.
///
/// Sections are an intermediate product; chunks are what leaves the crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub repo_name: String,
    pub file_path: String,
    pub language: Language,
    /// Position of this section within its file, in emission order.
    pub index: usize,
    pub text: String,
}

/// A budget-bounded slice of a section, the unit handed to analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub repo_name: String,
    pub file_path: String,
    pub language: Language,
    /// Index of the section this chunk came from.
    pub section_index: usize,
    /// Split position within the section; `None` for an unsplit section.
    pub sub_index: Option<usize>,
    pub content: String,
    /// True when the section had to be split to fit the budget.
    pub is_partial: bool,
    /// How many chunks the section produced in total.
    pub total_chunks: usize,
}

impl Chunk {
    /// Identifier unique within one file: `"2"` for a whole section,
    /// `"2_1"` for the second piece of a split one.
    pub fn chunk_id(&self) -> String {
        match self.sub_index {
            Some(sub) => format!("{}_{sub}", self.section_index),
            None => self.section_index.to_string(),
        }
    }
}
