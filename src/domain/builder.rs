//! Translation of a task description into a [`Graph`]
//!
//! Each task becomes a node; dependencies become `dep` edges and task
//! invocations inside commands become `call` edges. References to tasks
//! that do not exist are dropped rather than represented by placeholder
//! nodes, since they usually come from template variables the loader could
//! not expand.

use tracing::debug;

use super::graph::{Graph, CALL_EDGE, DEPENDENCY_EDGE};
use super::taskfile::Taskfile;

/// Builds a [`Graph`] from a [`Taskfile`]
pub struct TaskGraphBuilder<'a> {
    taskfile: &'a Taskfile,
}

impl<'a> TaskGraphBuilder<'a> {
    pub fn new(taskfile: &'a Taskfile) -> Self {
        Self { taskfile }
    }

    /// Constructs the graph.
    ///
    /// All nodes are created first so that edge targets can be checked
    /// regardless of task order.
    pub fn build(&self) -> Graph {
        let mut graph = Graph::new();

        for (name, task) in self.taskfile.tasks() {
            graph.add_node(name.as_str()).set_description(task.description.as_str());
        }

        for (name, task) in self.taskfile.tasks() {
            for dep in &task.deps {
                connect(&mut graph, name, &dep.task, DEPENDENCY_EDGE);
            }
        }

        for (name, task) in self.taskfile.tasks() {
            for called in task.calls() {
                connect(&mut graph, name, called, CALL_EDGE);
            }
        }

        debug!(
            nodes = graph.len(),
            edges = graph.edge_count(),
            "Built task graph"
        );

        graph
    }
}

fn connect(graph: &mut Graph, from: &str, to: &str, class: &str) {
    match graph.add_edge(from, to) {
        Some(edge) => {
            edge.set_class(class);
        }
        None => debug!(from, to, class, "Skipping reference to undefined task"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Command, Dependency, Task};

    fn sample_taskfile() -> Taskfile {
        let mut tf = Taskfile::new();
        tf.insert(
            "build",
            Task {
                description: "Build the project".to_string(),
                deps: vec![Dependency::new("gen"), Dependency::new("{{.UNRESOLVED}}")],
                cmds: vec![
                    Command::shell("cargo build"),
                    Command::call("lint"),
                    Command::call("missing"),
                ],
            },
        );
        tf.insert("gen", Task::default());
        tf.insert(
            "lint",
            Task {
                description: "Run linters".to_string(),
                ..Task::default()
            },
        );
        tf
    }

    #[test]
    fn creates_node_per_task() {
        let tf = sample_taskfile();
        let graph = TaskGraphBuilder::new(&tf).build();

        assert_eq!(graph.len(), 3);
        assert_eq!(graph.node("build").unwrap().description, "Build the project");
        assert_eq!(graph.node("lint").unwrap().description, "Run linters");
        assert_eq!(graph.node("gen").unwrap().description, "");
    }

    #[test]
    fn classifies_edges() {
        let tf = sample_taskfile();
        let graph = TaskGraphBuilder::new(&tf).build();

        let edges = graph.node("build").unwrap().edges();
        let summary: Vec<_> = edges.iter().map(|e| (e.to(), e.class())).collect();
        assert_eq!(summary, vec![("gen", "dep"), ("lint", "call")]);
    }

    #[test]
    fn drops_undefined_references() {
        let tf = sample_taskfile();
        let graph = TaskGraphBuilder::new(&tf).build();

        assert!(!graph.contains("missing"));
        assert!(!graph.contains("{{.UNRESOLVED}}"));
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn dependency_on_later_task_is_kept() {
        let mut tf = Taskfile::new();
        tf.insert(
            "a",
            Task {
                deps: vec![Dependency::new("z")],
                ..Task::default()
            },
        );
        tf.insert("z", Task::default());

        let graph = TaskGraphBuilder::new(&tf).build();
        assert_eq!(graph.node("a").unwrap().edges()[0].to(), "z");
    }

    #[test]
    fn self_dependency_round_trips() {
        let mut tf = Taskfile::new();
        tf.insert(
            "loop",
            Task {
                deps: vec![Dependency::new("loop")],
                ..Task::default()
            },
        );

        let graph = TaskGraphBuilder::new(&tf).build();
        let edges = graph.node("loop").unwrap().edges();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].to(), "loop");
    }

    #[test]
    fn empty_taskfile_builds_empty_graph() {
        let tf = Taskfile::new();
        assert!(TaskGraphBuilder::new(&tf).build().is_empty());
    }
}
