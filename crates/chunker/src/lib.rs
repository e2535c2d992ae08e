//! # apiscout chunker
//!
//! Regex-guided section extraction and budgeted splitting of route files.
//! No parsing, no syntax trees: signature patterns find route declarations,
//! lightweight boundary scans decide how much surrounding code belongs to
//! each one, and oversized sections are split along line boundaries.
//!
//! ## Architecture
//!
//! ```text
//! File content
//!     │
//!     ├──> Language (from extension)
//!     │
//!     ├──> SectionExtractor
//!     │    ├─> signature matches (per-language pattern table)
//!     │    ├─> backward: nearest declaration opener in the lookback window
//!     │    └─> forward: brace balance or indentation, capped by the window
//!     │
//!     └──> ChunkSplitter
//!          ├─> within budget → one whole chunk
//!          └─> oversized    → greedy line-preserving split, marked partial
//! ```
//!
//! ## Example
//!
//! ```rust
//! use apiscout_chunker::{Chunker, ChunkerConfig};
//!
//! let chunker = Chunker::new(ChunkerConfig::default());
//! let chunks = chunker.chunk_content(
//!     "shop",
//!     "routes/users.js",
//!     "router.get('/users', (req, res) => { res.json([]); });\n",
//! );
//! assert_eq!(chunks.len(), 1);
//! assert_eq!(chunks[0].chunk_id(), "0");
//! ```

pub mod boundary;
pub mod chunker;
pub mod config;
pub mod error;
pub mod extractor;
pub mod language;
pub mod signatures;
pub mod splitter;
pub mod types;

pub use chunker::Chunker;
pub use config::ChunkerConfig;
pub use error::{ChunkerError, Result};
pub use extractor::SectionExtractor;
pub use language::{BlockStyle, Language};
pub use signatures::SignatureTable;
pub use splitter::{split_by_size, split_section};
pub use types::{Chunk, Section};
