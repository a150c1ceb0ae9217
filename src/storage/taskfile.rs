//! Taskfile loading
//!
//! Reads go-task style YAML manifests into a [`Taskfile`]. Included
//! taskfiles are loaded recursively and merged under their namespace.
//! Templates are not expanded: a reference such as `{{.TASK}}` is kept
//! verbatim and simply names no task.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::domain::{Command, Dependency, Task, Taskfile};

/// File names tried, in order, when a directory is given
pub const DEFAULT_TASKFILES: &[&str] = &[
    "Taskfile.yml",
    "taskfile.yml",
    "Taskfile.yaml",
    "taskfile.yaml",
    "Taskfile.dist.yml",
    "taskfile.dist.yml",
    "Taskfile.dist.yaml",
    "taskfile.dist.yaml",
];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("taskfile not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("no taskfile found in directory: {}", .0.display())]
    NoTaskfileInDirectory(PathBuf),

    #[error("failed to read taskfile: {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse taskfile: {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("include cycle detected at: {}", .0.display())]
    IncludeCycle(PathBuf),

    #[error("failed to load include '{namespace}'")]
    Include {
        namespace: String,
        #[source]
        source: Box<LoadError>,
    },
}

#[derive(Debug, Deserialize)]
struct RawTaskfile {
    #[serde(default)]
    includes: BTreeMap<String, RawInclude>,

    #[serde(default)]
    tasks: BTreeMap<String, Option<RawTask>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawInclude {
    Path(String),
    Detailed(IncludeSpec),
}

#[derive(Debug, Deserialize)]
struct IncludeSpec {
    taskfile: String,

    #[serde(default)]
    optional: bool,

    #[serde(default)]
    flatten: bool,
}

impl RawInclude {
    fn into_spec(self) -> IncludeSpec {
        match self {
            RawInclude::Path(taskfile) => IncludeSpec {
                taskfile,
                optional: false,
                flatten: false,
            },
            RawInclude::Detailed(spec) => spec,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTask {
    /// `name: echo hello`
    Command(String),

    /// `name: [cmd, cmd]`
    Commands(Vec<RawCommand>),

    Full(TaskSpec),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TaskSpec {
    desc: String,
    deps: Vec<RawDependency>,
    cmds: Vec<RawCommand>,
    cmd: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDependency {
    Name(String),
    Call { task: String },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCommand {
    Shell(String),
    Detailed(CommandSpec),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CommandSpec {
    cmd: Option<String>,
    task: Option<String>,
    defer: Option<RawDefer>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDefer {
    Shell(String),
    Call { task: String },
}

impl From<RawCommand> for Command {
    fn from(raw: RawCommand) -> Self {
        match raw {
            RawCommand::Shell(cmd) => Command::shell(cmd),
            RawCommand::Detailed(spec) => match (spec.task, spec.defer) {
                (Some(task), _) | (None, Some(RawDefer::Call { task })) => Command {
                    cmd: spec.cmd.unwrap_or_default(),
                    task: Some(task),
                },
                (None, Some(RawDefer::Shell(cmd))) => Command::shell(cmd),
                (None, None) => Command::shell(spec.cmd.unwrap_or_default()),
            },
        }
    }
}

impl From<RawTask> for Task {
    fn from(raw: RawTask) -> Self {
        match raw {
            RawTask::Command(cmd) => Task {
                cmds: vec![Command::shell(cmd)],
                ..Task::default()
            },
            RawTask::Commands(cmds) => Task {
                cmds: cmds.into_iter().map(Command::from).collect(),
                ..Task::default()
            },
            RawTask::Full(spec) => {
                let mut cmds: Vec<Command> = spec.cmd.into_iter().map(Command::shell).collect();
                cmds.extend(spec.cmds.into_iter().map(Command::from));

                Task {
                    description: spec.desc,
                    deps: spec
                        .deps
                        .into_iter()
                        .map(|dep| match dep {
                            RawDependency::Name(task) | RawDependency::Call { task } => {
                                Dependency::new(task)
                            }
                        })
                        .collect(),
                    cmds,
                }
            }
        }
    }
}

/// Finds the taskfile for `path`: the file itself, or the first default
/// taskfile inside a directory
pub fn resolve_taskfile(path: &Path) -> Result<PathBuf, LoadError> {
    if path.is_dir() {
        return DEFAULT_TASKFILES
            .iter()
            .map(|name| path.join(name))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| LoadError::NoTaskfileInDirectory(path.to_path_buf()));
    }

    if path.is_file() {
        Ok(path.to_path_buf())
    } else {
        Err(LoadError::NotFound(path.to_path_buf()))
    }
}

/// Loads a taskfile and everything it includes
#[derive(Debug, Default)]
pub struct TaskfileLoader {
    /// Files currently being loaded, outermost first
    stack: Vec<PathBuf>,
}

impl TaskfileLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the taskfile at `path`, which may be a file or a directory.
    ///
    /// Root references (`:name`) are resolved against the merged result.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<Taskfile, LoadError> {
        let mut taskfile = self.load_tree(path.as_ref())?;
        taskfile.resolve_root_references();
        Ok(taskfile)
    }

    /// Loads one taskfile and its includes, leaving root references as
    /// they are written
    fn load_tree(&mut self, path: &Path) -> Result<Taskfile, LoadError> {
        let file = resolve_taskfile(path)?;
        let file = fs::canonicalize(&file).map_err(|source| LoadError::Read {
            path: file.clone(),
            source,
        })?;

        if self.stack.contains(&file) {
            return Err(LoadError::IncludeCycle(file));
        }

        self.stack.push(file.clone());
        let result = self.load_file(&file);
        self.stack.pop();

        result
    }

    fn load_file(&mut self, file: &Path) -> Result<Taskfile, LoadError> {
        let content = fs::read_to_string(file).map_err(|source| LoadError::Read {
            path: file.to_path_buf(),
            source,
        })?;

        let raw: RawTaskfile = serde_yaml::from_str(&content).map_err(|source| LoadError::Parse {
            path: file.to_path_buf(),
            source,
        })?;

        debug!(
            path = %file.display(),
            tasks = raw.tasks.len(),
            includes = raw.includes.len(),
            "Read taskfile"
        );

        let dir = file.parent().unwrap_or_else(|| Path::new("."));
        let mut taskfile = Taskfile::new();

        for (namespace, include) in raw.includes {
            let spec = include.into_spec();
            let target = dir.join(&spec.taskfile);

            let included = match self.load_tree(&target) {
                Ok(included) => included,
                Err(LoadError::NotFound(_) | LoadError::NoTaskfileInDirectory(_)) if spec.optional => {
                    debug!(namespace = %namespace, path = %target.display(), "Skipping missing optional include");
                    continue;
                }
                Err(source) => {
                    return Err(LoadError::Include {
                        namespace,
                        source: Box::new(source),
                    })
                }
            };

            let prefix = (!spec.flatten).then_some(namespace.as_str());
            taskfile.merge(included, prefix);
        }

        // Tasks declared here win over included ones of the same name
        for (name, task) in raw.tasks {
            taskfile.insert(name, task.map(Task::from).unwrap_or_default());
        }

        Ok(taskfile)
    }
}

/// Loads the taskfile at `path` with a fresh [`TaskfileLoader`]
pub fn load_taskfile(path: impl AsRef<Path>) -> Result<Taskfile, LoadError> {
    TaskfileLoader::new().load(path)
}
