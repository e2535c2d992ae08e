//! # apiscout inference
//!
//! The analysis boundary: chunks go out to a model, method/path pairs come
//! back. The trait keeps the pipeline honest about what it depends on; the
//! parser assumes the model will sometimes ignore the format instructions
//! and salvages what it can.
//!
//! ```text
//! Chunk ──> AnalysisRequest ──> EndpointInference::analyze
//!                                  │
//!                                  ├─> prompt (JSON-array instructions)
//!                                  └─> response ──> parse_endpoint_pairs
//!                                                      ├─> JSON array probe
//!                                                      └─> fallback scraping
//! ```

pub mod backend;
pub mod error;
pub mod parse;
pub mod prompt;
pub mod types;

pub use backend::{EndpointInference, NullInference, ReplayInference, SharedInference};
pub use error::{InferenceError, Result};
pub use parse::parse_endpoint_pairs;
pub use prompt::build_prompt;
pub use types::{
    should_analyze, AnalysisRequest, ChunkResult, EndpointCandidate, EndpointPair,
    MIN_ANALYZABLE_CHARS,
};
