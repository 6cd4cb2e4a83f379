//! Fake tools and hosts shared by the integration tests.
#![allow(dead_code)]

use serde_json::{Value, json};
use shinylive_lib::{DocumentHost, HtmlDependency, PipeError, ProcessRunner};
use std::cell::RefCell;
use std::collections::HashMap;

/// One recorded subprocess call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub program: String,
    pub args: Vec<String>,
    pub input: String,
}

impl Call {
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Simulates the Python and R shinylive tools plus `quarto run`.
pub struct FakeTools {
    python_banner: String,
    versions: HashMap<&'static str, (String, String)>,
    failures: HashMap<String, PipeError>,
    app_deps: Vec<(String, Vec<String>)>,
    without_scripts: Vec<&'static str>,
    calls: RefCell<Vec<Call>>,
}

impl FakeTools {
    pub fn new() -> Self {
        let mut versions = HashMap::new();
        versions.insert("python", ("0.5.0".to_string(), "0.4.1".to_string()));
        versions.insert("r", ("0.2.0".to_string(), "0.4.1".to_string()));
        Self {
            python_banner: "shinylive, version 0.5.0\n".to_string(),
            versions,
            failures: HashMap::new(),
            app_deps: Vec::new(),
            without_scripts: Vec::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Report `assets` as the assets version of `language` ("python" or "r").
    pub fn with_assets(mut self, language: &'static str, version: &str, assets: &str) -> Self {
        self.versions.insert(language, (version.to_string(), assets.to_string()));
        self
    }

    pub fn with_python_banner(mut self, banner: &str) -> Self {
        self.python_banner = banner.to_string();
        self
    }

    /// Report no helper scripts in the `extension info` of `language`.
    pub fn without_scripts(mut self, language: &'static str) -> Self {
        self.without_scripts.push(language);
        self
    }

    /// Make the call whose command line equals `command_line` fail.
    pub fn failing(mut self, command_line: &str, error: PipeError) -> Self {
        self.failures.insert(command_line.to_string(), error);
        self
    }

    /// Apps whose files mention `needle` depend on `deps`.
    pub fn with_app_deps(mut self, needle: &str, deps: &[&str]) -> Self {
        self.app_deps
            .push((needle.to_string(), deps.iter().map(|d| d.to_string()).collect()));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// Number of calls whose command line starts with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.command_line().starts_with(prefix))
            .count()
    }

    fn respond(&self, language: &str, args: &[String], input: &str) -> Result<String, PipeError> {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let (version, assets) = &self.versions[language];
        match args.as_slice() {
            ["--version"] => Ok(self.python_banner.clone()),
            ["extension", "info"] => {
                let scripts = if self.without_scripts.iter().any(|l| *l == language) {
                    json!({})
                } else {
                    json!({"codeblock-to-json": format!("/{language}/codeblock-to-json.js")})
                };
                let info = json!({"version": version, "assets_version": assets, "scripts": scripts});
                // R prints package startup noise before the payload.
                let noise = if language == "r" { "Loading required package: shiny\n" } else { "" };
                Ok(format!("{noise}{info}"))
            }
            ["extension", "base-htmldeps", "--sw-dir", dir] => Ok(json!([
                {"name": "shinylive", "version": assets, "scripts": [{"name": "shinylive/load-shinylive-sw.js"}]},
                {"name": "shinylive-serviceworker", "version": assets, "serviceworkers": [format!("{dir}/shinylive-sw.js")]}
            ])
            .to_string()),
            ["extension", "language-resources"] => {
                Ok(json!([{"name": format!("{language}-runtime"), "version": assets}]).to_string())
            }
            ["extension", "app-resources"] => {
                let deps: Vec<Value> = self
                    .app_deps
                    .iter()
                    .filter(|(needle, _)| input.contains(needle.as_str()))
                    .flat_map(|(_, deps)| deps.iter())
                    .map(|name| json!({"name": name, "version": "1.0", "type": "package"}))
                    .collect();
                Ok(Value::Array(deps).to_string())
            }
            other => Err(PipeError::Failed {
                program: language.to_string(),
                exit_code: Some(2),
                stderr: format!("unexpected arguments {other:?}"),
            }),
        }
    }
}

impl ProcessRunner for FakeTools {
    fn pipe(&self, program: &str, args: &[String], input: &str) -> Result<String, PipeError> {
        let call = Call {
            program: program.to_string(),
            args: args.to_vec(),
            input: input.to_string(),
        };
        let command_line = call.command_line();
        self.calls.borrow_mut().push(call);

        if let Some(err) = self.failures.get(&command_line) {
            return Err(err.clone());
        }

        match program {
            "shinylive" => self.respond("python", args, input),
            "Rscript" => self.respond("r", &args[2..], input),
            "quarto" => Ok(json!({
                "files": [{"name": "app", "content": input, "type": "text"}],
                "quartoArgs": []
            })
            .to_string()),
            _ => Err(PipeError::NotFound {
                program: program.to_string(),
            }),
        }
    }
}

/// Records every dependency attachment in order.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub offset: Option<String>,
    /// `(scope, name)`; scope is `"document"` or the extension name.
    pub attached: Vec<(String, String)>,
}

impl RecordingHost {
    pub fn in_project() -> Self {
        Self {
            offset: Some("..".to_string()),
            attached: Vec::new(),
        }
    }

    pub fn names_in(&self, scope: &str) -> Vec<&str> {
        self.attached
            .iter()
            .filter(|(s, _)| s == scope)
            .map(|(_, n)| n.as_str())
            .collect()
    }
}

impl DocumentHost for RecordingHost {
    fn add_dependency(&mut self, dependency: &HtmlDependency) {
        self.attached.push(("document".to_string(), dependency.name().to_string()));
    }

    fn attach_to_dependency(&mut self, extension: &str, dependency: &HtmlDependency) {
        self.attached.push((extension.to_string(), dependency.name().to_string()));
    }

    fn project_offset(&self) -> Option<&str> {
        self.offset.as_deref()
    }
}

/// A pandoc `CodeBlock` node.
pub fn code_block(classes: &[&str], text: &str) -> Value {
    json!({"t": "CodeBlock", "c": [["", classes, []], text]})
}

/// A pandoc document holding `blocks`.
pub fn document(blocks: Vec<Value>) -> Value {
    json!({"pandoc-api-version": [1, 23, 1], "meta": {}, "blocks": blocks})
}
