//! Main CLI application structure

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{debug, info};

use super::logging;
use super::output::{Output, OutputFormat};
use crate::domain::TaskGraphBuilder;
use crate::graphviz::{find_executable, image_path, render_image, save_to};
use crate::storage::{load_taskfile, Config, ConfigError};

#[derive(Parser, Debug)]
#[command(name = "task-graph")]
#[command(author, version, about = "Visualize task files as Graphviz graphs")]
pub struct Cli {
    /// Task file to read, or a directory containing one
    pub taskfile: PathBuf,

    /// Path of the DOT file to write
    #[arg(long, short = 'o')]
    pub output: PathBuf,

    /// Configuration file (YAML, JSON or TOML)
    #[arg(long, short = 'c', env = "TASK_GRAPH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Group tasks in the same namespace into clusters
    #[arg(long)]
    pub group_by_namespace: bool,

    /// Fill tasks matching a pattern with the highlight color (repeatable)
    #[arg(long, value_name = "GLOB")]
    pub highlight: Vec<String>,

    /// Render an image of the given type (png, svg, ...) with Graphviz dot
    #[arg(long, value_name = "TYPE")]
    pub render_image: Option<String>,

    /// Seconds to allow dot to run before giving up
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Write the effective configuration to a file
    #[arg(long, value_name = "FILE")]
    pub export_config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

/// What a run produced
#[derive(Debug, Serialize)]
pub struct Summary {
    pub taskfile: PathBuf,
    pub output: PathBuf,
    pub tasks: usize,
    pub edges: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub exported_config: Option<PathBuf>,
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let summary = cli.execute()?;
    cli.report(&summary);

    Ok(())
}

impl Cli {
    /// Builds the effective configuration: file settings over the
    /// defaults, then command-line overrides. `user_config` is read when
    /// no `--config` is given.
    pub fn create_config(&self, user_config: Option<&Path>) -> Result<Config, ConfigError> {
        let mut config = Config::resolve(self.config.as_deref(), user_config)?;

        if self.group_by_namespace {
            config.group_by_namespace = true;
        }

        for pattern in &self.highlight {
            config.add_highlight(pattern.as_str());
        }

        Ok(config)
    }

    /// Runs the whole pipeline: config, task file, graph, DOT file and
    /// optional image
    pub fn execute(&self) -> Result<Summary> {
        self.execute_with(Config::user_config_path().as_deref())
    }

    /// Like [`Cli::execute`], with an explicit user config location
    pub fn execute_with(&self, user_config: Option<&Path>) -> Result<Summary> {
        let config = self.create_config(user_config)?;

        if let Some(path) = &self.export_config {
            config.export(path)?;
            info!(path = %path.display(), "Exported config");
        }

        let taskfile = load_taskfile(&self.taskfile).context("failed to load taskfile")?;
        info!(
            taskfile = %self.taskfile.display(),
            tasks = taskfile.len(),
            "Loaded taskfile"
        );

        let graph = TaskGraphBuilder::new(&taskfile).build();

        save_to(&self.output, Some(&graph), Some(&config)).context("failed to save graph")?;

        let image = match &self.render_image {
            Some(file_type) => Some(self.render(&config, file_type)?),
            None => None,
        };

        Ok(Summary {
            taskfile: self.taskfile.clone(),
            output: self.output.clone(),
            tasks: graph.len(),
            edges: graph.edge_count(),
            image,
            exported_config: self.export_config.clone(),
        })
    }

    fn render(&self, config: &Config, file_type: &str) -> Result<PathBuf> {
        let executable =
            find_executable(config.dot_path.as_deref()).context("failed to find dot executable")?;
        debug!(executable = %executable.display(), "Found dot");

        let image = image_path(&self.output, file_type);
        let timeout = self.timeout.map(Duration::from_secs);

        render_image(&executable, &self.output, &image, file_type, timeout)
            .context("failed to render image")?;

        Ok(image)
    }

    fn report(&self, summary: &Summary) {
        let output = Output::new(self.format);

        if output.is_json() {
            output.data(summary);
            return;
        }

        if let Some(path) = &summary.exported_config {
            output.success(&format!("Exported config to {}", path.display()));
        }

        output.success(&format!(
            "Saved graph to {} ({} tasks, {} edges)",
            summary.output.display(),
            summary.tasks,
            summary.edges
        ));

        if let Some(image) = &summary.image {
            output.success(&format!("Rendered image to {}", image.display()));
        }
    }
}
