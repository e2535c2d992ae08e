use crate::error::{ClassifierError, Result};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use std::path::Path;

/// Built-in ecosystem tags, in resolution order.
pub const NODE_EXPRESS: &str = "node_express";
pub const PYTHON_WEB: &str = "python_web";
pub const JAVA_SPRING: &str = "java_spring";
pub const GOLANG: &str = "golang";
pub const TYPESCRIPT: &str = "typescript";

/// Directory names that disqualify a path no matter what the rules say.
const EXCLUDED_SEGMENTS: &[&str] = &[
    "node_modules",
    "vendor",
    "third_party",
    "dist",
    "build",
    "out",
    "target",
    "venv",
    "__pycache__",
    "coverage",
];

/// Built-in path-shape rules. Tried in order; the first ecosystem with a
/// matching pattern wins.
const DEFAULT_RULES: &[(&str, &[&str])] = &[
    (
        NODE_EXPRESS,
        &[
            r"routes/.*\.js$",
            r"controllers/.*\.js$",
            r"api/.*\.js$",
            r".*router\.js$",
            r".*routes\.js$",
            r".*controller\.js$",
        ],
    ),
    (
        PYTHON_WEB,
        &[
            r"routes/.*\.py$",
            r"views/.*\.py$",
            r"api/.*\.py$",
            r"controllers/.*\.py$",
            r".*router\.py$",
            r".*routes\.py$",
            r".*views\.py$",
            r".*app\.py$",
        ],
    ),
    (
        JAVA_SPRING,
        &[r".*Controller\.java$", r".*Resource\.java$", r".*Endpoint\.java$"],
    ),
    (
        GOLANG,
        &[
            r"handlers/.*\.go$",
            r"routes/.*\.go$",
            r"api/.*\.go$",
            r".*router\.go$",
            r".*handler\.go$",
        ],
    ),
    (
        TYPESCRIPT,
        &[
            r"routes/.*\.ts$",
            r"controllers/.*\.ts$",
            r"api/.*\.ts$",
            r".*router\.ts$",
            r".*routes\.ts$",
            r".*controller\.ts$",
        ],
    ),
];

static BUILTIN: Lazy<RuleTable> =
    Lazy::new(|| RuleTable::compile_builtin().expect("built-in rules must compile"));

/// Path-shape rules for one ecosystem.
#[derive(Debug, Clone)]
pub struct EcosystemRules {
    tag: String,
    patterns: Vec<Regex>,
}

impl EcosystemRules {
    /// Compile one ecosystem entry. Patterns match case-insensitively
    /// anywhere in a repository-relative path.
    pub fn new(tag: impl Into<String>, patterns: &[impl AsRef<str>]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|pattern| compile_pattern(pattern.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            tag: tag.into(),
            patterns,
        })
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    fn matches(&self, relative_path: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.is_match(relative_path))
    }
}

/// On-disk shape of a rules override file.
#[derive(Debug, Deserialize)]
struct RulesFile {
    #[serde(default)]
    excluded_segments: Option<Vec<String>>,
    ecosystems: Vec<EcosystemSpec>,
}

#[derive(Debug, Deserialize)]
struct EcosystemSpec {
    tag: String,
    patterns: Vec<String>,
}

/// Ordered ecosystem rules plus the excluded-directory list.
///
/// The table is pure data: adding or reordering ecosystems changes what gets
/// classified without touching any matching code.
#[derive(Debug, Clone)]
pub struct RuleTable {
    ecosystems: Vec<EcosystemRules>,
    excluded_segments: Vec<String>,
}

impl RuleTable {
    /// The compiled built-in table.
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Build a table from already-compiled ecosystem entries.
    pub fn new(ecosystems: Vec<EcosystemRules>, excluded_segments: Vec<String>) -> Self {
        Self {
            ecosystems,
            excluded_segments,
        }
    }

    /// Load a table from a JSON rules file.
    ///
    /// When the file omits `excluded_segments`, the built-in exclusion list
    /// applies.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let file: RulesFile = serde_json::from_str(&raw)?;
        let ecosystems = file
            .ecosystems
            .iter()
            .map(|entry| EcosystemRules::new(&entry.tag, &entry.patterns))
            .collect::<Result<Vec<_>>>()?;
        let excluded_segments = file
            .excluded_segments
            .unwrap_or_else(|| EXCLUDED_SEGMENTS.iter().map(|s| s.to_string()).collect());
        Ok(Self::new(ecosystems, excluded_segments))
    }

    /// First ecosystem whose rules match the given relative path.
    pub fn resolve(&self, relative_path: &str) -> Option<&str> {
        self.ecosystems
            .iter()
            .find(|rules| rules.matches(relative_path))
            .map(EcosystemRules::tag)
    }

    /// Whether a single path segment lands in an excluded directory.
    pub fn is_excluded_segment(&self, segment: &str) -> bool {
        self.excluded_segments
            .iter()
            .any(|excluded| segment.eq_ignore_ascii_case(excluded))
    }

    fn compile_builtin() -> Result<Self> {
        let ecosystems = DEFAULT_RULES
            .iter()
            .map(|(tag, patterns)| EcosystemRules::new(*tag, *patterns))
            .collect::<Result<Vec<_>>>()?;
        let excluded_segments = EXCLUDED_SEGMENTS.iter().map(|s| s.to_string()).collect();
        Ok(Self::new(ecosystems, excluded_segments))
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::builtin()
    }
}

fn compile_pattern(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| ClassifierError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}
