//! Pandoc JSON filter host.
//!
//! [`PandocFilter`] is the [`DocumentHost`] used by the binary: it collects
//! attached dependencies in memory, and [`filter_document`] writes them into the
//! document metadata once every block has been processed.

use crate::config::FilterConfig;
use crate::error::{FilterError, Result};
use crate::extension::{BlockOutcome, BuildSession, CodeBlockRewriter, HtmlDependency};
use crate::host::{DocumentHost, ProcessRunner};
use crate::pandoc;
use indexmap::IndexMap;
use serde_json::{Value, json};

/// Dependency collector for one pandoc document.
#[derive(Debug, Default)]
pub struct PandocFilter {
    project_offset: Option<String>,
    document: Vec<HtmlDependency>,
    extensions: IndexMap<String, Vec<HtmlDependency>>,
}

impl PandocFilter {
    pub fn new(project_offset: Option<String>) -> Self {
        Self {
            project_offset,
            ..Default::default()
        }
    }

    pub fn document_dependencies(&self) -> &[HtmlDependency] {
        &self.document
    }

    pub fn extension_dependencies(&self, extension: &str) -> &[HtmlDependency] {
        self.extensions.get(extension).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn dependency_count(&self) -> usize {
        self.document.len() + self.extensions.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.dependency_count() == 0
    }

    /// All collected dependencies as `{ document: [...], extensions: {...} }`.
    pub fn manifest(&self) -> Value {
        let extensions: serde_json::Map<String, Value> = self
            .extensions
            .iter()
            .map(|(name, deps)| (name.clone(), Value::Array(deps.iter().cloned().map(Value::from).collect())))
            .collect();
        json!({
            "document": self.document.iter().cloned().map(Value::from).collect::<Vec<_>>(),
            "extensions": extensions,
        })
    }
}

impl DocumentHost for PandocFilter {
    fn add_dependency(&mut self, dependency: &HtmlDependency) {
        self.document.push(dependency.clone());
    }

    fn attach_to_dependency(&mut self, extension: &str, dependency: &HtmlDependency) {
        self.extensions
            .entry(extension.to_string())
            .or_default()
            .push(dependency.clone());
    }

    fn project_offset(&self) -> Option<&str> {
        self.project_offset.as_deref()
    }
}

/// What a filter run did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterSummary {
    pub blocks_seen: usize,
    pub blocks_rewritten: usize,
    pub dependencies: usize,
}

/// Parse a pandoc JSON document.
pub fn read_document(input: &str) -> Result<Value> {
    let document: Value = serde_json::from_str(input).map_err(|e| FilterError::InvalidDocument(e.to_string()))?;
    if !document.is_object() {
        return Err(FilterError::InvalidDocument("expected a JSON object".to_string()));
    }
    Ok(document)
}

/// Run one document build over `document`.
///
/// Blocks are processed in document order; the first error aborts the build and
/// leaves the metadata untouched.
pub fn filter_document(
    document: &mut Value,
    runner: &dyn ProcessRunner,
    config: &FilterConfig,
    host: &mut PandocFilter,
) -> Result<FilterSummary> {
    let mut session = BuildSession::new(runner, config);
    let mut rewriter = CodeBlockRewriter::new(&mut session);
    let mut summary = FilterSummary::default();

    pandoc::walk_code_blocks(document, &mut |block: &mut pandoc::CodeBlock| {
        summary.blocks_seen += 1;
        match rewriter.process(block, host)? {
            BlockOutcome::Untouched => Ok(false),
            BlockOutcome::Rewritten { .. } => {
                summary.blocks_rewritten += 1;
                Ok(true)
            }
        }
    })?;

    summary.dependencies = host.dependency_count();
    if !host.is_empty() {
        pandoc::set_meta(document, &config.metadata_key, &host.manifest())?;
    }

    log::info!(
        "Rewrote {} of {} code blocks, {} dependencies",
        summary.blocks_rewritten,
        summary.blocks_seen,
        summary.dependencies
    );
    Ok(summary)
}
