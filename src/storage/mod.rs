//! # Storage Layer
//!
//! Everything that touches the file system on the way in.
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Task files | go-task YAML, with includes | `Taskfile.yml` or as given |
//! | Config | YAML, JSON or TOML | `--config`, or `config.yaml` in the user config directory |
//!
//! ## Key Types
//!
//! - [`TaskfileLoader`] - Reads a task file and its includes into a [`crate::domain::Taskfile`]
//! - [`Config`] - Presentation settings layered over built-in defaults

mod config;
mod taskfile;

pub use config::{
    Config, ConfigError, ConfigFormat, Graphviz, GraphvizEdge, GraphvizNode, GraphvizStyleRule,
    DEFAULT_HIGHLIGHT_COLOR,
};
pub use taskfile::{load_taskfile, resolve_taskfile, LoadError, TaskfileLoader, DEFAULT_TASKFILES};
