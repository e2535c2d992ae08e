//! # apiscout reconciler
//!
//! Folds raw endpoint observations from every repository into one canonical
//! catalog. Identity is the normalized `(method, path)` pair: the first
//! observation becomes the primary source, later ones accumulate as
//! alternatives, and iteration order never depends on arrival order.
//!
//! ```text
//! EndpointCandidate*  ──> normalize ──> EndpointKey
//!                              │
//!                              ├─> first observation  → CanonicalEndpoint
//!                              ├─> repeat observation → alternative_sources
//!                              │
//!                              └─> EndpointCatalog ──> CatalogReport
//! ```

pub mod catalog;
pub mod normalize;
pub mod report;
pub mod shared;

pub use catalog::{CanonicalEndpoint, EndpointCatalog, EndpointKey, SourceRef};
pub use normalize::{normalize_method, normalize_path};
pub use report::{CatalogReport, ReportEndpoint};
pub use shared::SharedCatalog;
