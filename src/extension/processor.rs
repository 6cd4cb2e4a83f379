//! Per-block processing: classify, set up, convert, resolve, rewrite.

use super::dependencies::HtmlDependency;
use super::language::Language;
use super::session::BuildSession;
use super::types::CodeBlockRequest;
use crate::error::{FilterError, Result};
use crate::host::DocumentHost;
use crate::pandoc::CodeBlock;

/// Attribute telling downstream rendering which engine runs the block.
pub const ENGINE_ATTRIBUTE: &str = "engine";

/// Outcome of processing one code block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockOutcome {
    /// Not a shinylive block; left as it was.
    Untouched,
    /// Rewritten for `language`; `new_dependencies` app dependencies were attached.
    Rewritten {
        language: Language,
        new_dependencies: usize,
    },
}

/// Rewrites shinylive code blocks for one document build.
pub struct CodeBlockRewriter<'s, 'a> {
    session: &'s mut BuildSession<'a>,
}

impl<'s, 'a> CodeBlockRewriter<'s, 'a> {
    pub fn new(session: &'s mut BuildSession<'a>) -> Self {
        Self { session }
    }

    /// Process one block, mutating it in place when it is a shinylive block.
    pub fn process(&mut self, block: &mut CodeBlock, host: &mut dyn DocumentHost) -> Result<BlockOutcome> {
        let Some(language) = Language::from_classes(&block.classes) else {
            return Ok(BlockOutcome::Untouched);
        };
        log::debug!("Processing {language} shinylive block");

        self.session.ensure_language_setup(language, host)?;

        let request = self.convert(language, &block.text)?;
        let app_deps = self.app_dependencies(language, &request)?;

        let mut new_dependencies = 0;
        for dep in &app_deps {
            if self.session.register_app_dependency(dep, host) {
                new_dependencies += 1;
            }
        }

        rewrite_markup(block, language);
        Ok(BlockOutcome::Rewritten {
            language,
            new_dependencies,
        })
    }

    /// Run the conversion script over the block body.
    fn convert(&self, language: Language, text: &str) -> Result<CodeBlockRequest> {
        let script = self.session.codeblock_script().ok_or_else(|| FilterError::Conversion {
            language,
            message: "code-block conversion script is unknown".to_string(),
        })?;
        let args = vec!["run".to_string(), script.to_string(), language.as_str().to_string()];

        let output = self
            .session
            .runner()
            .pipe(&self.session.config().quarto, &args, text)
            .map_err(|e| FilterError::Conversion {
                language,
                message: e.to_string(),
            })?;

        serde_json::from_str(&output).map_err(|e| FilterError::Conversion {
            language,
            message: format!("invalid JSON from conversion script: {e}\n{output}"),
        })
    }

    /// Ask the tool which dependencies the app's files need.
    fn app_dependencies(&self, language: Language, request: &CodeBlockRequest) -> Result<Vec<HtmlDependency>> {
        let files = serde_json::to_string(&request.files).map_err(|e| FilterError::Conversion {
            language,
            message: format!("failed to encode app files: {e}"),
        })?;
        self.session
            .invoker()
            .query(language, &["extension", "app-resources"], Some(&files))
    }
}

/// Mark the block for its engine and leave only the canonical class.
pub fn rewrite_markup(block: &mut CodeBlock, language: Language) {
    block.set_attribute(ENGINE_ATTRIBUTE, language.as_str());
    block.classes = vec![language.binding().canonical_class.to_string()];
}
