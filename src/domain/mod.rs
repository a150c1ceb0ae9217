//! Domain models for task-graph
//!
//! Contains the graph model and the task description it is built from,
//! without any I/O concerns.

mod builder;
mod graph;
mod taskfile;

pub use builder::TaskGraphBuilder;
pub use graph::{Edge, Graph, Node, Nodes, CALL_EDGE, DEPENDENCY_EDGE};
pub use taskfile::{qualified_name, root_name, Command, Dependency, Task, Taskfile, NAMESPACE_SEPARATOR};
