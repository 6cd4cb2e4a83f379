//! Per-build setup state.
//!
//! A [`BuildSession`] lives for exactly one document build. It remembers which
//! one-time setup steps already ran, the tool info fetched per language, the
//! conversion script path, and every dependency handed to the host. Setup runs
//! in three scopes:
//!
//! - tool version: once per language, checks the tool is recent enough, using
//!   the tool's version query or else the version from `extension info`
//! - global: once per document, registers language-agnostic dependencies
//! - language: once per language, checks assets compatibility and registers
//!   language resources
//!
//! A step is only marked done after it fully succeeds.

use super::compat;
use super::dependencies::{DependencyScope, HtmlDependency, RegisteredDependencies};
use super::executor::ToolInvoker;
use super::language::Language;
use super::response::truncate_for_diagnostics;
use super::types::ToolInfo;
use crate::config::FilterConfig;
use crate::error::{FilterError, Result};
use crate::host::{DocumentHost, ProcessRunner};
use std::collections::{BTreeMap, BTreeSet};

/// Name of the stylesheet dependency registered with the base dependencies.
pub const QUARTO_CSS_DEPENDENCY: &str = "shinylive-quarto-css";

pub struct BuildSession<'a> {
    config: &'a FilterConfig,
    runner: &'a dyn ProcessRunner,
    invoker: ToolInvoker<'a>,
    global_done: bool,
    languages_done: BTreeSet<Language>,
    versions_checked: BTreeSet<Language>,
    tool_info: BTreeMap<Language, ToolInfo>,
    codeblock_script: Option<String>,
    registered: RegisteredDependencies,
}

impl<'a> BuildSession<'a> {
    pub fn new(runner: &'a dyn ProcessRunner, config: &'a FilterConfig) -> Self {
        Self {
            config,
            runner,
            invoker: ToolInvoker::new(runner, config),
            global_done: false,
            languages_done: BTreeSet::new(),
            versions_checked: BTreeSet::new(),
            tool_info: BTreeMap::new(),
            codeblock_script: None,
            registered: RegisteredDependencies::new(),
        }
    }

    pub fn config(&self) -> &FilterConfig {
        self.config
    }

    pub fn runner(&self) -> &dyn ProcessRunner {
        self.runner
    }

    pub fn invoker(&self) -> &ToolInvoker<'a> {
        &self.invoker
    }

    /// Path of the code-block conversion script, once global setup ran.
    pub fn codeblock_script(&self) -> Option<&str> {
        self.codeblock_script.as_deref()
    }

    pub fn tool_info(&self, language: Language) -> Option<&ToolInfo> {
        self.tool_info.get(&language)
    }

    pub fn is_global_setup_done(&self) -> bool {
        self.global_done
    }

    pub fn is_language_setup_done(&self, language: Language) -> bool {
        self.languages_done.contains(&language)
    }

    pub fn registered(&self) -> &RegisteredDependencies {
        &self.registered
    }

    /// Scope of dependencies attached to the extension's own dependency.
    pub fn extension_scope(&self) -> DependencyScope {
        DependencyScope::Extension(self.config.extension_name.clone())
    }

    /// Register language-agnostic dependencies, once per build.
    pub fn ensure_global_setup(&mut self, language: Language, host: &mut dyn DocumentHost) -> Result<()> {
        if self.global_done {
            return Ok(());
        }

        let info = self.fetch_tool_info(language)?;
        let script = info
            .codeblock_script()
            .ok_or_else(|| FilterError::MalformedToolOutput {
                language,
                reason: "Missing 'codeblock-to-json' script".to_string(),
                output: truncate_for_diagnostics(&format!("{:?}", info.scripts)),
            })?
            .to_string();

        let offset = host.project_offset().ok_or(FilterError::NotInProjectContext)?.to_string();
        let base_deps: Vec<HtmlDependency> = self.invoker.query(
            language,
            &["extension", "base-htmldeps", "--sw-dir", offset.as_str()],
            Some(""),
        )?;

        for dep in &base_deps {
            register(&mut self.registered, &DependencyScope::Document, dep, host);
        }
        let css = HtmlDependency::stylesheet(QUARTO_CSS_DEPENDENCY, &self.config.stylesheet);
        register(&mut self.registered, &DependencyScope::Document, &css, host);

        log::info!(
            "Registered {} base dependencies using the {language} tool",
            base_deps.len() + 1
        );
        self.codeblock_script = Some(script);
        self.global_done = true;
        Ok(())
    }

    /// Prepare everything a block of `language` needs, once per language.
    pub fn ensure_language_setup(&mut self, language: Language, host: &mut dyn DocumentHost) -> Result<()> {
        self.ensure_tool_version(language)?;
        self.ensure_global_setup(language, host)?;
        if self.languages_done.contains(&language) {
            return Ok(());
        }

        self.fetch_tool_info(language)?;
        compat::check_assets_versions(&self.tool_info)?;

        let resources: Vec<HtmlDependency> =
            self.invoker
                .query(language, &["extension", "language-resources"], None)?;
        let scope = self.extension_scope();
        for dep in &resources {
            register(&mut self.registered, &scope, dep, host);
        }

        log::info!("Registered {} {language} language resources", resources.len());
        self.languages_done.insert(language);
        Ok(())
    }

    /// Verify the tool for `language` meets the minimum version, once per language.
    pub fn ensure_tool_version(&mut self, language: Language) -> Result<()> {
        if self.versions_checked.contains(&language) {
            return Ok(());
        }

        if let Some(minimum) = self.config.min_version(language) {
            // Tools without a version query report their version through `extension info`.
            let output = match language.binding().version_args {
                Some(args) => self.invoker.invoke(language, args, None)?,
                None => self.fetch_tool_info(language)?.version,
            };
            let found = compat::parse_tool_version(&output).ok_or_else(|| FilterError::MalformedToolOutput {
                language,
                reason: "Could not find a version number".to_string(),
                output: truncate_for_diagnostics(output.trim()),
            })?;
            compat::check_min_version(language, &found, &minimum)?;
            log::debug!("{language} tool version {found} satisfies minimum {minimum}");
        }

        self.versions_checked.insert(language);
        Ok(())
    }

    /// Register an app-specific dependency, skipping names already seen.
    pub fn register_app_dependency(&mut self, dep: &HtmlDependency, host: &mut dyn DocumentHost) -> bool {
        let scope = self.extension_scope();
        register(&mut self.registered, &scope, dep, host)
    }

    fn fetch_tool_info(&mut self, language: Language) -> Result<ToolInfo> {
        if let Some(info) = self.tool_info.get(&language) {
            return Ok(info.clone());
        }
        let info: ToolInfo = self.invoker.query(language, &["extension", "info"], None)?;
        log::info!(
            "{} shinylive tool {} (assets {})",
            language.display_name(),
            info.version,
            info.assets_version
        );
        self.tool_info.insert(language, info.clone());
        Ok(info)
    }
}

fn register(
    registered: &mut RegisteredDependencies,
    scope: &DependencyScope,
    dep: &HtmlDependency,
    host: &mut dyn DocumentHost,
) -> bool {
    registered.register_once(scope, dep.name(), || match scope {
        DependencyScope::Document => host.add_dependency(dep),
        DependencyScope::Extension(extension) => host.attach_to_dependency(extension, dep),
    })
}
