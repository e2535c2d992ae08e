//! # apiscout classifier
//!
//! Cheap, name-only triage of repository trees: decides which files are
//! likely to declare HTTP routes before anything reads their content.
//!
//! ## Architecture
//!
//! ```text
//! Repository tree
//!     │
//!     ├──> RepoScanner (walk, size cap)
//!     │
//!     ├──> ClassificationIndex
//!     │    ├─> excluded / hidden segments  → reject
//!     │    └─> ordered ecosystem rules     → first match wins
//!     │
//!     └──> CandidateFile[] (repo, relative path, location)
//! ```
//!
//! Rules are data, not code: the built-in table can be replaced by a JSON
//! file without touching the matching logic.

pub mod error;
pub mod index;
pub mod rules;
pub mod scanner;

pub use error::{ClassifierError, Result};
pub use index::ClassificationIndex;
pub use rules::{EcosystemRules, RuleTable};
pub use scanner::{read_lossy, CandidateFile, RepoScanner};
