//! Cross-language and minimum-version compatibility checks.

use super::language::Language;
use super::types::ToolInfo;
use crate::error::{FilterError, Result};
use regex::Regex;
use semver::Version;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\.(\d+)(?:\.(\d+))?").expect("version regex is valid"));

/// Fail when the known languages support different assets versions.
///
/// With fewer than two languages known there is nothing to compare.
pub fn check_assets_versions(infos: &BTreeMap<Language, ToolInfo>) -> Result<()> {
    let mut known = infos.iter();
    let Some((_, first)) = known.next() else {
        return Ok(());
    };
    if known.all(|(_, info)| info.assets_version == first.assets_version) {
        return Ok(());
    }

    let details = infos
        .iter()
        .map(|(language, info)| {
            format!(
                "{} shinylive package version: {} ; Supported assets version: {}",
                language.display_name(),
                info.version,
                info.assets_version
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    let upgrade_hints = infos
        .keys()
        .map(|language| language.binding().upgrade_hint)
        .collect::<Vec<_>>()
        .join("\n");

    Err(FilterError::AssetsVersionMismatch { details, upgrade_hints })
}

/// Pull the first `major.minor[.patch]` out of a tool's version banner.
pub fn parse_tool_version(output: &str) -> Option<Version> {
    let caps = VERSION_RE.captures(output)?;
    let part = |i: usize| caps.get(i).map_or(Ok(0), |m| m.as_str().parse::<u64>());
    Some(Version::new(part(1).ok()?, part(2).ok()?, part(3).ok()?))
}

/// Fail when `found` is older than `minimum`.
pub fn check_min_version(language: Language, found: &Version, minimum: &str) -> Result<()> {
    let minimum_version = Version::parse(minimum)
        .map_err(|e| FilterError::Config(format!("invalid minimum version '{minimum}' for {language}: {e}")))?;
    if *found < minimum_version {
        return Err(FilterError::ToolTooOld {
            language,
            found: found.to_string(),
            minimum: minimum.to_string(),
            hint: language.binding().install_hint.to_string(),
        });
    }
    Ok(())
}
