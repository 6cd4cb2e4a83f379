//! Shinylive code-block support.
//!
//! This module turns `{shinylive-python}` and `{shinylive-r}` code blocks into
//! blocks the shinylive runtime can execute client-side, and collects the HTML
//! dependencies that runtime needs.
//!
//! # Overview
//!
//! The per-language `shinylive` tools know which assets and packages an app
//! needs. For every document build:
//!
//! 1. The first shinylive block triggers global setup: `extension info` and
//!    `extension base-htmldeps` on that block's tool.
//! 2. The first block of each language triggers language setup: a minimum
//!    version check, an assets-version compatibility check across languages,
//!    and `extension language-resources`.
//! 3. Every block is converted to an app request by the `codeblock-to-json`
//!    script, then `extension app-resources` lists the packages it needs.
//!    Dependencies already attached earlier in the build are skipped.
//! 4. The block gets `engine=<language>` and a single `shinylive-<language>`
//!    class.
//!
//! # Tools
//!
//! - Python: `shinylive` (`pip install shinylive`)
//! - R: `Rscript -e 'shinylive:::quarto_ext()'` (`install.packages("shinylive")`)
//!
//! Commands can be overridden in configuration, see [`crate::config`].

pub mod compat;
pub mod dependencies;
pub mod executor;
pub mod language;
pub mod processor;
pub mod response;
pub mod session;
pub mod types;

pub use dependencies::{DependencyScope, HtmlDependency, RegisteredDependencies};
pub use executor::ToolInvoker;
pub use language::{Language, LanguageBinding};
pub use processor::{BlockOutcome, CodeBlockRewriter};
pub use session::BuildSession;
pub use types::{CodeBlockRequest, ToolInfo};
