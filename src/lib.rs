//! task-graph - Graphviz diagrams of task runner manifests
//!
//! Reads a go-task style task file, builds a directed graph of tasks with
//! their dependencies and task calls, and writes it as a DOT document,
//! optionally clustered by namespace and rendered to an image.

pub mod cli;
pub mod domain;
pub mod graphviz;
pub mod storage;

pub use domain::{Graph, TaskGraphBuilder, Taskfile};
pub use storage::Config;
