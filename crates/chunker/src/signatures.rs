use crate::error::{ChunkerError, Result};
use crate::language::Language;
use once_cell::sync::Lazy;
use regex::Regex;

/// Built-in route signatures per language. Unlike classification rules these
/// are case-sensitive: `app.get(` is a route call, `APP.GET(` is not.
const DEFAULT_SIGNATURES: &[(Language, &[&str])] = &[
    (
        Language::JavaScript,
        &[
            r"(router|app)\.(get|post|put|delete|patch|head|options)\([^)]*\)",
            r"(router|app)\.route\([^)]*\)\.(get|post|put|delete|patch|head|options)",
            r"express\.Router\(\)",
        ],
    ),
    (
        Language::TypeScript,
        &[
            r"(router|app)\.(get|post|put|delete|patch|head|options)\([^)]*\)",
            r"@(Get|Post|Put|Delete|Patch|Head|Options)\([^)]*\)",
            r"@ApiOperation\([^)]*\)",
        ],
    ),
    (
        Language::Python,
        &[
            r"@(app|router|blueprint)\.(route|get|post|put|delete|patch|head|options)",
            r"@api_view\(\[.*\]\)",
            r"class\s+\w+\(.*View\):",
            r"def\s+\w+\(.*request",
        ],
    ),
    (
        Language::Java,
        &[
            r"@(GetMapping|PostMapping|PutMapping|DeleteMapping|PatchMapping|RequestMapping)",
            r"@Path\([^)]*\)",
        ],
    ),
    (
        Language::Go,
        &[
            r"func\s+\w+\((\s*\w+\s+[*]?gin\.Context|\s*\w+\s+[*]?http\.ResponseWriter,\s*\w+\s+[*]?http\.Request|\s*\w+\s+[*]?echo\.Context)",
            r"\.(GET|POST|PUT|DELETE|PATCH|HEAD|OPTIONS)\(",
        ],
    ),
];

static BUILTIN: Lazy<SignatureTable> =
    Lazy::new(|| SignatureTable::compile_builtin().expect("built-in signatures must compile"));

/// Route-declaration patterns keyed by language.
///
/// Like the classification rules, the table is swappable data; a framework
/// nobody thought of yet is one entry away.
#[derive(Debug, Clone)]
pub struct SignatureTable {
    sets: Vec<(Language, Vec<Regex>)>,
}

impl SignatureTable {
    /// The compiled built-in table.
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Compile a table from `(language, patterns)` pairs.
    pub fn from_pairs(pairs: &[(Language, Vec<String>)]) -> Result<Self> {
        let sets = pairs
            .iter()
            .map(|(language, patterns)| {
                let compiled = patterns
                    .iter()
                    .map(|pattern| compile_signature(pattern))
                    .collect::<Result<Vec<_>>>()?;
                Ok((*language, compiled))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { sets })
    }

    /// Patterns for one language; empty when the language has no set.
    pub fn for_language(&self, language: Language) -> &[Regex] {
        self.sets
            .iter()
            .find(|(candidate, _)| *candidate == language)
            .map(|(_, patterns)| patterns.as_slice())
            .unwrap_or(&[])
    }

    fn compile_builtin() -> Result<Self> {
        let sets = DEFAULT_SIGNATURES
            .iter()
            .map(|(language, patterns)| {
                let compiled = patterns
                    .iter()
                    .map(|pattern| compile_signature(pattern))
                    .collect::<Result<Vec<_>>>()?;
                Ok((*language, compiled))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { sets })
    }
}

impl Default for SignatureTable {
    fn default() -> Self {
        Self::builtin()
    }
}

fn compile_signature(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| ChunkerError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}
