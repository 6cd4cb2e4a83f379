//! Command handlers for the shinylive-filter CLI.
//!
//! Each subcommand has its own module with a public handler function
//! that `main()` dispatches to.

pub mod filter;
pub mod info;
