//! Greedy line-preserving split of oversized sections.

use crate::types::{Chunk, Section};

/// Split `text` into pieces of at most `budget` characters without ever
/// cutting inside a line.
///
/// Lines land in the current piece until one more would overflow the budget;
/// each line is costed as its length plus one for the newline that follows
/// it. A single line longer than the budget becomes its own oversized piece.
/// Joining the pieces with `"\n"` reproduces `text` exactly.
pub fn split_by_size(text: &str, budget: usize) -> Vec<String> {
    if text.chars().count() <= budget {
        return vec![text.to_string()];
    }

    let mut pieces = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut size = 0usize;

    for line in text.split('\n') {
        let cost = line.chars().count() + 1;
        if size + cost > budget && !current.is_empty() {
            pieces.push(current.join("\n"));
            current.clear();
            size = 0;
        }
        current.push(line);
        size += cost;
    }
    if !current.is_empty() {
        pieces.push(current.join("\n"));
    }
    pieces
}

/// Turn one section into its chunks.
///
/// A section within budget becomes a single chunk with no sub index; an
/// oversized one is split, and every resulting chunk is marked partial.
pub fn split_section(section: &Section, budget: usize) -> Vec<Chunk> {
    let over_budget = section.text.chars().count() > budget;
    if !over_budget {
        return vec![Chunk {
            repo_name: section.repo_name.clone(),
            file_path: section.file_path.clone(),
            language: section.language,
            section_index: section.index,
            sub_index: None,
            content: section.text.clone(),
            is_partial: false,
            total_chunks: 1,
        }];
    }

    let pieces = split_by_size(&section.text, budget);
    let total_chunks = pieces.len();
    pieces
        .into_iter()
        .enumerate()
        .map(|(sub, content)| Chunk {
            repo_name: section.repo_name.clone(),
            file_path: section.file_path.clone(),
            language: section.language,
            section_index: section.index,
            sub_index: Some(sub),
            content,
            is_partial: true,
            total_chunks,
        })
        .collect()
}
