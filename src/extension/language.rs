//! Supported source languages and the tools bound to them.
//!
//! The set of languages is closed: each variant maps to exactly one external
//! tool, one install hint and one pair of code-block classes.

use crate::error::FilterError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A source language that can appear in a shinylive code block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    R,
}

/// Static description of how to reach a language's tool.
#[derive(Debug, Clone, Copy)]
pub struct LanguageBinding {
    pub language: Language,
    /// Command prefix; the first element is the executable.
    pub command: &'static [&'static str],
    /// Printed when the tool is missing or fails.
    pub install_hint: &'static str,
    /// Class written by the author, e.g. `{shinylive-python}`.
    pub source_class: &'static str,
    /// Class left on the block after rewriting.
    pub canonical_class: &'static str,
    /// Arguments that make the tool print its own version, if it supports that.
    pub version_args: Option<&'static [&'static str]>,
    /// Minimum supported tool version, if one is enforced.
    pub min_version: Option<&'static str>,
    /// Package upgrade instruction used in version mismatch reports.
    pub upgrade_hint: &'static str,
}

static BINDINGS: [LanguageBinding; 2] = [
    LanguageBinding {
        language: Language::Python,
        command: &["shinylive"],
        install_hint: "Perhaps you need to install / update the 'shinylive' Python package? (pip install shinylive --upgrade)",
        source_class: "{shinylive-python}",
        canonical_class: "shinylive-python",
        version_args: Some(&["--version"]),
        min_version: Some("0.1.0"),
        upgrade_hint: "Python: pip install shinylive --upgrade",
    },
    LanguageBinding {
        language: Language::R,
        command: &["Rscript", "-e", "shinylive:::quarto_ext()"],
        install_hint: "Perhaps you need to install / update the 'shinylive' R package? (install.packages('shinylive'))",
        source_class: "{shinylive-r}",
        canonical_class: "shinylive-r",
        version_args: None,
        min_version: None,
        upgrade_hint: "R: install.packages('shinylive')",
    },
];

impl Language {
    pub const ALL: [Language; 2] = [Language::Python, Language::R];

    pub fn binding(self) -> &'static LanguageBinding {
        match self {
            Language::Python => &BINDINGS[0],
            Language::R => &BINDINGS[1],
        }
    }

    /// Name passed to the conversion script and written to the `engine` attribute.
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::R => "r",
        }
    }

    /// Human-facing name used in diagnostics.
    pub fn display_name(self) -> &'static str {
        match self {
            Language::Python => "Python",
            Language::R => "R",
        }
    }

    /// Classify a code block by its class list.
    ///
    /// R is checked first, matching the order the classes are tested in when a
    /// block carries both tags.
    pub fn from_classes<S: AsRef<str>>(classes: &[S]) -> Option<Language> {
        [Language::R, Language::Python]
            .into_iter()
            .find(|lang| classes.iter().any(|c| c.as_ref() == lang.binding().source_class))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "python" | "py" => Ok(Language::Python),
            "r" => Ok(Language::R),
            other => Err(FilterError::UnknownLanguage(other.to_string())),
        }
    }
}
