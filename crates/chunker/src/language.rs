use serde::{Deserialize, Serialize};
use std::path::Path;

/// Source language of a candidate file, detected from its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "js")]
    JavaScript,
    #[serde(rename = "ts")]
    TypeScript,
    #[serde(rename = "py")]
    Python,
    #[serde(rename = "java")]
    Java,
    #[serde(rename = "go")]
    Go,
    #[serde(rename = "unknown")]
    Unknown,
}

/// How a language delimits blocks, which drives the section end rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStyle {
    /// Blocks close when braces balance out
    Braced,
    /// Blocks close when indentation falls back to the opening level
    Indented,
}

impl Language {
    /// Detect language from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "js" | "mjs" | "cjs" => Language::JavaScript,
            "ts" | "tsx" => Language::TypeScript,
            "py" | "pyw" => Language::Python,
            "java" => Language::Java,
            "go" => Language::Go,
            _ => Language::Unknown,
        }
    }

    /// Detect language from file path
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Language::Unknown)
    }

    /// Short language tag as stored on chunk documents
    pub fn as_str(self) -> &'static str {
        match self {
            Language::JavaScript => "js",
            Language::TypeScript => "ts",
            Language::Python => "py",
            Language::Java => "java",
            Language::Go => "go",
            Language::Unknown => "unknown",
        }
    }

    /// Block delimiting style, or `None` when the language is unknown
    pub fn block_style(self) -> Option<BlockStyle> {
        match self {
            Language::JavaScript | Language::TypeScript | Language::Java | Language::Go => {
                Some(BlockStyle::Braced)
            }
            Language::Python => Some(BlockStyle::Indented),
            Language::Unknown => None,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
