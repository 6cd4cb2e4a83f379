//! Wire types exchanged with the tools and the conversion script.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Script name of the code-block converter in [`ToolInfo::scripts`].
pub const CODEBLOCK_TO_JSON_SCRIPT: &str = "codeblock-to-json";

/// Response to `extension info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Version of the tool package itself.
    pub version: String,
    /// Version of the shared assets bundle the tool supports.
    pub assets_version: String,
    /// Helper scripts shipped with the tool, by name.
    #[serde(default)]
    pub scripts: BTreeMap<String, String>,
}

impl ToolInfo {
    pub fn codeblock_script(&self) -> Option<&str> {
        self.scripts.get(CODEBLOCK_TO_JSON_SCRIPT).map(String::as_str)
    }
}

/// Output of the code-block conversion script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeBlockRequest {
    /// App files, forwarded as-is to `extension app-resources`.
    pub files: Value,
    /// Extra options parsed from the block's `#|` comments; not interpreted here.
    #[serde(rename = "quartoArgs", default)]
    pub quarto_args: Value,
}
