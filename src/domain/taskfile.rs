//! Task description model
//!
//! The already-resolved shape of a task manifest: named tasks with their
//! descriptions, dependencies and commands. Produced by
//! [`crate::storage::TaskfileLoader`], consumed by [`super::TaskGraphBuilder`].

use std::collections::btree_map;
use std::collections::BTreeMap;

/// Separator between namespace segments in a task name
pub const NAMESPACE_SEPARATOR: char = ':';

/// A reference from one task to another task it depends on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Name of the task depended upon
    pub task: String,
}

impl Dependency {
    pub fn new(task: impl Into<String>) -> Self {
        Self { task: task.into() }
    }
}

/// A single command within a task
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Command {
    /// Shell command line, empty when the entry only invokes a task
    pub cmd: String,

    /// Name of a task invoked by this command, if any
    pub task: Option<String>,
}

impl Command {
    /// A plain shell command
    pub fn shell(cmd: impl Into<String>) -> Self {
        Self {
            cmd: cmd.into(),
            task: None,
        }
    }

    /// A command that invokes another task
    pub fn call(task: impl Into<String>) -> Self {
        Self {
            cmd: String::new(),
            task: Some(task.into()),
        }
    }
}

/// A named unit of work
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Task {
    pub description: String,
    pub deps: Vec<Dependency>,
    pub cmds: Vec<Command>,
}

impl Task {
    /// Tasks invoked from this task's commands, in command order
    pub fn calls(&self) -> impl Iterator<Item = &str> {
        self.cmds.iter().filter_map(|c| c.task.as_deref())
    }

    /// Rewrites task references to live inside `namespace`.
    ///
    /// References starting with the separator point at the root namespace
    /// and are kept as they are until [`Task::resolve_root`] runs.
    pub fn qualify(&mut self, namespace: &str) {
        for dep in &mut self.deps {
            dep.task = qualified_name(namespace, &dep.task);
        }

        for cmd in &mut self.cmds {
            if let Some(task) = cmd.task.as_mut() {
                *task = qualified_name(namespace, task);
            }
        }
    }

    /// Strips the leading separator from root references
    pub fn resolve_root(&mut self) {
        for dep in &mut self.deps {
            dep.task = root_name(&dep.task).to_string();
        }

        for cmd in &mut self.cmds {
            if let Some(task) = cmd.task.as_mut() {
                *task = root_name(task).to_string();
            }
        }
    }
}

/// Joins a namespace and a task name. Root references, which start with
/// the separator, are left untouched at every nesting level.
///
/// ```
/// use task_graph::domain::qualified_name;
///
/// assert_eq!(qualified_name("docs", "build"), "docs:build");
/// assert_eq!(qualified_name("docs", ":build"), ":build");
/// ```
pub fn qualified_name(namespace: &str, name: &str) -> String {
    if name.starts_with(NAMESPACE_SEPARATOR) {
        name.to_string()
    } else {
        format!("{namespace}{NAMESPACE_SEPARATOR}{name}")
    }
}

/// Name a root reference points at: `name` without its leading separator
///
/// ```
/// use task_graph::domain::root_name;
///
/// assert_eq!(root_name(":setup"), "setup");
/// assert_eq!(root_name("cmd:build"), "cmd:build");
/// ```
pub fn root_name(name: &str) -> &str {
    name.strip_prefix(NAMESPACE_SEPARATOR).unwrap_or(name)
}

/// A set of tasks keyed by name, iterated in name order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Taskfile {
    tasks: BTreeMap<String, Task>,
}

impl Taskfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a task, replacing any existing task with the same name
    pub fn insert(&mut self, name: impl Into<String>, task: Task) -> Option<Task> {
        self.tasks.insert(name.into(), task)
    }

    pub fn get(&self, name: &str) -> Option<&Task> {
        self.tasks.get(name)
    }

    /// Tasks sorted by name
    pub fn tasks(&self) -> btree_map::Iter<'_, String, Task> {
        self.tasks.iter()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Moves every task of `other` into this set.
    ///
    /// With a namespace, task names and their references are qualified;
    /// without one they are merged as-is. Existing tasks of the same name
    /// are replaced.
    pub fn merge(&mut self, other: Taskfile, namespace: Option<&str>) {
        for (name, mut task) in other.tasks {
            let name = match namespace {
                Some(ns) => {
                    task.qualify(ns);
                    qualified_name(ns, &name)
                }
                None => name,
            };

            self.tasks.insert(name, task);
        }
    }

    /// Resolves root references in every task once the whole include
    /// tree has been merged
    pub fn resolve_root_references(&mut self) {
        for task in self.tasks.values_mut() {
            task.resolve_root();
        }
    }
}

impl FromIterator<(String, Task)> for Taskfile {
    fn from_iter<I: IntoIterator<Item = (String, Task)>>(iter: I) -> Self {
        Self {
            tasks: iter.into_iter().collect(),
        }
    }
}
