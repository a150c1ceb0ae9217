//! Configuration handling for task-graph
//!
//! Configuration is read from an explicit file (`--config`) or from
//! `config.yaml` in the user's config directory, and is layered over the
//! built-in defaults. Files may be YAML, JSON or TOML.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Fill color for highlighted tasks when none is configured
pub const DEFAULT_HIGHLIGHT_COLOR: &str = "yellow";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file: {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("failed to serialize config: {0}")]
    Serialize(String),

    #[error("failed to write config file: {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// File format, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
    Unknown,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("yaml" | "yml") => ConfigFormat::Yaml,
            Some("json") => ConfigFormat::Json,
            Some("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Unknown,
        }
    }

    fn parse(self, raw: &str) -> Result<Value, String> {
        if raw.trim().is_empty() {
            return Ok(Value::Null);
        }

        match self {
            ConfigFormat::Yaml => serde_yaml::from_str(raw).map_err(|e| e.to_string()),
            ConfigFormat::Json => serde_json::from_str(raw).map_err(|e| e.to_string()),
            ConfigFormat::Toml => toml::from_str(raw).map_err(|e| e.to_string()),
            // YAML first, then JSON
            ConfigFormat::Unknown => serde_yaml::from_str(raw)
                .or_else(|_| serde_json::from_str(raw))
                .map_err(|e: serde_json::Error| e.to_string()),
        }
    }
}

/// Presentation of one class of edges
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GraphvizEdge {
    /// Any Graphviz color
    #[serde(skip_serializing_if = "String::is_empty")]
    pub color: String,

    /// Pen width; only positive values are written
    #[serde(skip_serializing_if = "is_zero")]
    pub width: i32,

    /// Any Graphviz edge style (solid, dashed, bold, ...)
    #[serde(skip_serializing_if = "String::is_empty")]
    pub style: String,
}

/// Presentation of task nodes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GraphvizNode {
    /// Border color
    #[serde(skip_serializing_if = "String::is_empty")]
    pub color: String,

    /// Background color
    #[serde(skip_serializing_if = "String::is_empty")]
    pub fill_color: String,

    /// Node style (filled, dashed, bold, ...)
    #[serde(skip_serializing_if = "String::is_empty")]
    pub style: String,

    /// Label text color
    #[serde(skip_serializing_if = "String::is_empty")]
    pub font_color: String,
}

/// Styling applied to task nodes whose name matches a wildcard pattern.
///
/// All matching rules apply in order; for each attribute the last rule
/// that sets it wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GraphvizStyleRule {
    /// Task name pattern; `*` and `?` are wildcards
    #[serde(rename = "match", skip_serializing_if = "String::is_empty")]
    pub match_pattern: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub color: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub fill_color: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub style: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub font_color: String,
}

/// Graphviz presentation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Graphviz {
    /// Font for all labels
    #[serde(skip_serializing_if = "String::is_empty")]
    pub font: String,

    /// Font size in points
    #[serde(skip_serializing_if = "is_zero")]
    pub font_size: u32,

    /// Fill color used by `--highlight`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight_color: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependency_edges: Option<GraphvizEdge>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_edges: Option<GraphvizEdge>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_nodes: Option<GraphvizNode>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub style_rules: Vec<GraphvizStyleRule>,
}

impl Default for Graphviz {
    fn default() -> Self {
        Self {
            font: "Verdana".to_string(),
            font_size: 16,
            highlight_color: None,
            dependency_edges: Some(GraphvizEdge {
                color: "black".to_string(),
                width: 1,
                style: "solid".to_string(),
            }),
            call_edges: Some(GraphvizEdge {
                color: "blue".to_string(),
                width: 1,
                style: "dashed".to_string(),
            }),
            task_nodes: Some(GraphvizNode {
                color: "black".to_string(),
                ..GraphvizNode::default()
            }),
            style_rules: Vec::new(),
        }
    }
}

impl Graphviz {
    /// The highlight fill color, defaulting to yellow
    pub fn highlight_color(&self) -> &str {
        self.highlight_color
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_HIGHLIGHT_COLOR)
    }
}

/// Effective configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Cluster tasks by their colon-separated namespace
    pub group_by_namespace: bool,

    /// Path to the `dot` executable, or a directory containing it.
    /// Looked up on `PATH` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dot_path: Option<PathBuf>,

    pub graphviz: Graphviz,
}

impl Config {
    /// Location of the per-user configuration file
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("dev", "task-graph", "task-graph")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Loads a file over the defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::default().overlay_file(path)
    }

    /// Builds the configuration from an explicit file if given, otherwise
    /// from the user file if it exists, otherwise the defaults.
    pub fn resolve(explicit: Option<&Path>, user: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            debug!(path = %path.display(), "Loading config file");
            return Self::load(path);
        }

        match user {
            Some(path) if path.is_file() => {
                debug!(path = %path.display(), "Loading user config file");
                Self::load(path)
            }
            _ => {
                debug!("Using default config");
                Ok(Self::default())
            }
        }
    }

    /// Returns this configuration with the settings from `path` layered on
    /// top.
    ///
    /// Nested sections are merged key by key, so a file that only sets
    /// `graphviz.callEdges.color` keeps the other call edge settings. Lists
    /// are replaced whole.
    pub fn overlay_file(self, path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let parse_error = |message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        };

        let overlay = ConfigFormat::from_path(path).parse(&raw).map_err(parse_error)?;

        let mut merged =
            serde_json::to_value(&self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        merge_values(&mut merged, overlay);

        serde_json::from_value(merged).map_err(|e| parse_error(e.to_string()))
    }

    /// Adds a style rule filling tasks that match `pattern` with the
    /// highlight color
    pub fn add_highlight(&mut self, pattern: impl Into<String>) {
        let fill_color = self.graphviz.highlight_color().to_string();
        self.graphviz.style_rules.push(GraphvizStyleRule {
            match_pattern: pattern.into(),
            fill_color,
            ..GraphvizStyleRule::default()
        });
    }

    /// Serializes the configuration in the format implied by the extension
    /// (JSON, TOML, otherwise YAML)
    pub fn to_string_for(&self, path: &Path) -> Result<String, ConfigError> {
        let serialized = match ConfigFormat::from_path(path) {
            ConfigFormat::Json => serde_json::to_string_pretty(self).map_err(|e| e.to_string()),
            ConfigFormat::Toml => toml::to_string_pretty(self).map_err(|e| e.to_string()),
            ConfigFormat::Yaml | ConfigFormat::Unknown => {
                serde_yaml::to_string(self).map_err(|e| e.to_string())
            }
        };

        serialized.map_err(ConfigError::Serialize)
    }

    /// Writes the configuration to `path`
    pub fn export(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_string_for(path)?;

        fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Recursively layers `overlay` onto `base`. Objects merge by key; any
/// other value replaces what was there. A null document changes nothing.
fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (_, Value::Null) => {}
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        merge_values(existing, value);
                    }
                    _ => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

fn is_zero<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}
