//! # Command-Line Interface
//!
//! A single command that turns a task file into a DOT file:
//!
//! ```bash
//! task-graph Taskfile.yml -o graph.dot --group-by-namespace --render-image svg
//! ```
//!
//! ## Output Formats
//!
//! `--format` selects how the run summary is printed:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug logging on stderr. `RUST_LOG`
//! overrides it.
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the pipeline.

mod app;
mod logging;
mod output;

pub use app::{run, Cli, Summary};
pub use output::{Output, OutputFormat};
