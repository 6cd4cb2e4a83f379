//! Handler for the `info` command.

use crate::Cli;
use anyhow::{Context, Result};
use shinylive_lib::extension::compat::check_assets_versions;
use shinylive_lib::extension::{ToolInfo, ToolInvoker};
use shinylive_lib::{FilterConfig, Language, SystemRunner};
use std::collections::BTreeMap;

/// Print each tool's `extension info` and check the tools agree on assets.
pub fn handle_info(cli: &Cli, languages: &[Language]) -> Result<()> {
    let cwd = std::env::current_dir().context("resolve working directory")?;
    let config = FilterConfig::discover(cli.config.as_deref(), &cwd)?;
    let runner = SystemRunner::new();
    let invoker = ToolInvoker::new(&runner, &config);

    let mut infos: BTreeMap<Language, ToolInfo> = BTreeMap::new();
    for &language in languages {
        let info: ToolInfo = invoker.query(language, &["extension", "info"], None)?;
        infos.insert(language, info);
    }

    println!("{}", serde_json::to_string_pretty(&infos).context("encode tool info")?);
    check_assets_versions(&infos)?;
    Ok(())
}
