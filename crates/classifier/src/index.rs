use crate::rules::RuleTable;

/// Decides which repository-relative paths are worth scanning for routes.
///
/// Exclusion always wins: a path inside a vendored or hidden directory is
/// rejected before any ecosystem rule runs, so a rules file can never
/// accidentally pull `node_modules` back in.
#[derive(Debug, Clone, Default)]
pub struct ClassificationIndex {
    table: RuleTable,
}

impl ClassificationIndex {
    pub fn new(table: RuleTable) -> Self {
        Self { table }
    }

    /// Index over the built-in rule table.
    pub fn with_defaults() -> Self {
        Self::new(RuleTable::builtin())
    }

    /// Classify one repository-relative path.
    ///
    /// Returns the matching ecosystem tag, or `None` when the path is
    /// excluded or matches no rule.
    pub fn classify(&self, relative_path: &str) -> Option<&str> {
        let normalized = normalize_relative_path(relative_path);
        if self.is_excluded(&normalized) {
            return None;
        }
        self.table.resolve(&normalized)
    }

    /// Whether the path sits under a hidden or excluded directory.
    pub fn is_excluded(&self, relative_path: &str) -> bool {
        let normalized = normalize_relative_path(relative_path);
        normalized
            .split('/')
            .filter(|segment| !segment.is_empty())
            .any(|segment| segment.starts_with('.') || self.table.is_excluded_segment(segment))
    }
}

/// Normalize separators so rules written with `/` match on every platform.
fn normalize_relative_path(path: &str) -> String {
    let unified = path.replace('\\', "/");
    unified
        .strip_prefix("./")
        .map(str::to_string)
        .unwrap_or(unified)
}
