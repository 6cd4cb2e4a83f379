//! Handler for the default command: filter a pandoc JSON document.

use crate::Cli;
use anyhow::{Context, Result};
use shinylive_lib::{FilterConfig, PandocFilter, SystemRunner, filter_document, read_document};
use std::fs;
use std::io::{self, Read, Write};

/// Read the document, rewrite it, and write it back out.
pub fn handle_filter(cli: &Cli) -> Result<()> {
    let cwd = std::env::current_dir().context("resolve working directory")?;
    let config = FilterConfig::discover(cli.config.as_deref(), &cwd)?;

    if let Some(format) = &cli.target_format {
        log::debug!("Filtering document for target format '{format}'");
    }

    let input = match &cli.input {
        Some(path) => fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).context("read document from stdin")?;
            buf
        }
    };
    let mut document = read_document(&input)?;

    let runner = SystemRunner::new();
    let mut host = PandocFilter::new(cli.project_offset.clone());
    let summary = filter_document(&mut document, &runner, &config, &mut host)?;
    if !cli.quiet && cli.output.is_some() {
        eprintln!(
            "Rewrote {} shinylive code blocks ({} dependencies)",
            summary.blocks_rewritten, summary.dependencies
        );
    }

    if let Some(path) = &cli.dependencies_out {
        let manifest = serde_json::to_string_pretty(&host.manifest()).context("encode dependency manifest")?;
        fs::write(path, manifest).with_context(|| format!("write {}", path.display()))?;
    }

    let output = serde_json::to_string(&document).context("encode document")?;
    match &cli.output {
        Some(path) => fs::write(path, output).with_context(|| format!("write {}", path.display()))?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(output.as_bytes()).context("write document to stdout")?;
            stdout.flush().context("flush stdout")?;
        }
    }

    Ok(())
}
