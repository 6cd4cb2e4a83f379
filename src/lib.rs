//! Build-time document filter for shinylive code blocks.
//!
//! Code blocks tagged `{shinylive-python}` or `{shinylive-r}` are rewritten so the
//! rendered page can run them client-side, and the HTML dependencies they need
//! are collected from the per-language `shinylive` tools. See [`extension`] for
//! the orchestration and [`filter`] for the pandoc JSON filter host.

pub mod config;
pub mod error;
pub mod exit_codes;
pub mod extension;
pub mod filter;
pub mod host;
pub mod pandoc;

pub use config::FilterConfig;
pub use error::{FilterError, Result};
pub use extension::{BuildSession, CodeBlockRewriter, HtmlDependency, Language, ToolInfo};
pub use filter::{FilterSummary, PandocFilter, filter_document, read_document};
pub use host::{DocumentHost, PipeError, ProcessRunner, SystemRunner};
