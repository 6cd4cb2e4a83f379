//! Invocation of the per-language shinylive tools.
//!
//! Each call spawns exactly one subprocess and blocks until it exits. Failures
//! are never retried: a tool that cannot be started is almost always missing or
//! outdated, so the error carries the language's install hint instead.

use super::language::Language;
use super::response;
use crate::config::FilterConfig;
use crate::error::{FilterError, Result};
use crate::host::{PipeError, ProcessRunner};
use serde::de::DeserializeOwned;

/// Runs the tool bound to a language through a [`ProcessRunner`].
pub struct ToolInvoker<'a> {
    runner: &'a dyn ProcessRunner,
    config: &'a FilterConfig,
}

impl<'a> ToolInvoker<'a> {
    pub fn new(runner: &'a dyn ProcessRunner, config: &'a FilterConfig) -> Self {
        Self { runner, config }
    }

    /// Run the tool for `language` with `args`, piping `input` to stdin.
    ///
    /// Returns the captured stdout.
    pub fn invoke(&self, language: Language, args: &[&str], input: Option<&str>) -> Result<String> {
        let mut command = self.config.tool_command(language);
        if command.is_empty() {
            return Err(FilterError::Config(format!("no command configured for {language}")));
        }
        let program = command.remove(0);
        command.extend(args.iter().map(|a| a.to_string()));

        log::debug!("Running {language} tool: {program} {}", command.join(" "));

        let hint = language.binding().install_hint.to_string();
        self.runner
            .pipe(&program, &command, input.unwrap_or(""))
            .map_err(|e| match e {
                PipeError::NotFound { program } => FilterError::ToolNotFound {
                    language,
                    program,
                    hint,
                },
                other => FilterError::ToolExecution {
                    language,
                    program,
                    message: other.to_string(),
                    hint,
                },
            })
    }

    /// Run the tool and decode its JSON response.
    pub fn query<T: DeserializeOwned>(&self, language: Language, args: &[&str], input: Option<&str>) -> Result<T> {
        let raw = self.invoke(language, args, input)?;
        response::decode(&raw, language)
    }
}
