//! DOT document emission
//!
//! Turns a [`Graph`] into a `digraph` document. Output is deterministic:
//! nodes are sorted by id, attributes by key and namespaces by name, so
//! the same graph and configuration always produce the same bytes.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use super::indent::{IndentError, IndentWriter, Line};
use super::properties::Properties;
use super::record::Record;
use crate::domain::{Edge, Graph, Node, CALL_EDGE, DEPENDENCY_EDGE, NAMESPACE_SEPARATOR};
use crate::storage::{Config, Graphviz};

/// Indentation unit for each nesting level
pub const INDENT: &str = "  ";

/// Shape used for every task node
pub const NODE_SHAPE: &str = "Mrecord";

const MAX_DESCRIPTION_WIDTH: usize = 40;

#[derive(Debug, Error)]
pub enum DotError {
    #[error("graphviz: graph is nil")]
    NilGraph,

    #[error("failed to create file: {}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write graphviz output")]
    Write(#[from] IndentError),

    #[error("failed to flush file: {}", path.display())]
    Flush {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Builds the DOT document for `graph` as a tree of lines
pub fn render(graph: &Graph, config: &Config) -> IndentWriter {
    let mut nodes: Vec<&Node> = graph.nodes().collect();
    nodes.sort_unstable_by(|a, b| a.id().cmp(b.id()));

    let mut iw = IndentWriter::new();
    let root = iw.add("digraph {");

    write_defaults(root, &config.graphviz);

    if config.group_by_namespace {
        NamespaceTree::new(&nodes).write_to(root, config);
    } else {
        for node in nodes {
            write_node(root, node, config);
        }
    }

    iw.add("}");
    iw
}

/// Writes `graph` as DOT to `w`, returning the number of bytes written.
///
/// Without a configuration the built-in defaults are used.
pub fn write_to<W: Write + ?Sized>(
    w: &mut W,
    graph: Option<&Graph>,
    config: Option<&Config>,
) -> Result<u64, DotError> {
    let graph = graph.ok_or(DotError::NilGraph)?;
    let config = config.map_or_else(|| Cow::Owned(Config::default()), Cow::Borrowed);

    let written = render(graph, &config).write_to(w, INDENT)?;
    debug!(bytes = written, nodes = graph.len(), "Wrote DOT document");

    Ok(written)
}

/// Writes `graph` as DOT to a new file at `path`, replacing any existing
/// file
pub fn save_to(path: &Path, graph: Option<&Graph>, config: Option<&Config>) -> Result<u64, DotError> {
    let graph = graph.ok_or(DotError::NilGraph)?;

    let file = File::create(path).map_err(|source| DotError::Create {
        path: path.to_path_buf(),
        source,
    })?;

    let mut w = BufWriter::new(file);
    let written = write_to(&mut w, Some(graph), config)?;

    w.flush().map_err(|source| DotError::Flush {
        path: path.to_path_buf(),
        source,
    })?;

    info!(path = %path.display(), bytes = written, "Saved DOT file");
    Ok(written)
}

/// Width at which a description is wrapped: short descriptions get a
/// squarer box, long ones are capped.
pub fn description_width(description: &str) -> usize {
    ((description.len() + 20) / 2).min(MAX_DESCRIPTION_WIDTH)
}

fn quote(id: &str) -> String {
    format!("\"{}\"", id.replace('"', "\\\""))
}

/// Writes `node` and `edge` default statements carrying the font settings
fn write_defaults(parent: &mut Line, graphviz: &Graphviz) {
    let mut props = Properties::new();

    if !graphviz.font.is_empty() {
        props.add("fontname", graphviz.font.as_str());
    }

    if graphviz.font_size > 0 {
        props.add_fmt("fontsize", format_args!("{}", graphviz.font_size));
    }

    if props.is_empty() {
        return;
    }

    props.write_to("node", parent);
    props.write_to("edge", parent);
}

/// Writes a node definition followed by its outgoing edges
fn write_node(parent: &mut Line, node: &Node, config: &Config) {
    let graphviz = &config.graphviz;

    let mut label = Record::new();
    label.add(node.display_label());
    label.add_wrapped(description_width(&node.description), &node.description);

    let mut props = Properties::new();
    props.add("label", label.to_string());
    props.add("shape", NODE_SHAPE);

    if let Some(style) = &graphviz.task_nodes {
        props.add_node_style(style);
    }

    for rule in &graphviz.style_rules {
        props.add_style_rule(node.id(), rule);
    }

    props.ensure_filled();
    props.write_to(&quote(node.id()), parent);

    for edge in node.edges() {
        write_edge(parent, edge, graphviz);
    }
}

fn write_edge(parent: &mut Line, edge: &Edge, graphviz: &Graphviz) {
    let mut props = Properties::new();

    if !edge.label().is_empty() {
        props.add("label", edge.label());
    }

    let style = match edge.class() {
        DEPENDENCY_EDGE => graphviz.dependency_edges.as_ref(),
        CALL_EDGE => graphviz.call_edges.as_ref(),
        _ => None,
    };

    if let Some(style) = style {
        props.add_edge_style(style);
    }

    let statement = format!("{} -> {}", quote(edge.from()), quote(edge.to()));
    props.write_to(&statement, parent);
}

/// Namespace of a task id: everything before the last separator
fn namespace_of(id: &str) -> &str {
    id.rsplit_once(NAMESPACE_SEPARATOR).map_or("", |(ns, _)| ns)
}

/// Subgraph id for a namespace. Graphviz only treats subgraphs whose id
/// starts with `cluster` as boxed clusters.
fn cluster_id(namespace: &str) -> String {
    let id = format!("cluster_{}", namespace.replace(NAMESPACE_SEPARATOR, "_"));

    if id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        id
    } else {
        quote(&id)
    }
}

/// Nodes grouped by namespace, with the parent/child relation between
/// namespaces. The root namespace is the empty string.
struct NamespaceTree<'a> {
    members: BTreeMap<&'a str, Vec<&'a Node>>,
    children: BTreeMap<&'a str, BTreeSet<&'a str>>,
}

impl<'a> NamespaceTree<'a> {
    /// Groups `nodes`, which must already be sorted by id
    fn new(nodes: &[&'a Node]) -> Self {
        let mut tree = Self {
            members: BTreeMap::new(),
            children: BTreeMap::new(),
        };

        for &node in nodes {
            let namespace = namespace_of(node.id());
            tree.members.entry(namespace).or_default().push(node);
            tree.register(namespace);
        }

        tree
    }

    /// Links `namespace` and its ancestors up to the root
    fn register(&mut self, mut namespace: &'a str) {
        while !namespace.is_empty() {
            let parent = namespace_of(namespace);

            // Ancestors of a known namespace are already linked
            if !self.children.entry(parent).or_default().insert(namespace) {
                break;
            }

            namespace = parent;
        }
    }

    fn write_to(&self, root: &mut Line, config: &Config) {
        self.write_contents("", root, config);
    }

    /// Writes the direct members of `namespace`, then one cluster per
    /// child namespace
    fn write_contents(&self, namespace: &str, parent: &mut Line, config: &Config) {
        let members = self.members.get(namespace).map_or(&[][..], Vec::as_slice);
        for node in members {
            write_node(parent, node, config);
        }

        let mut separate = !members.is_empty();
        for &child in self.children.get(namespace).into_iter().flatten() {
            if separate {
                parent.add("");
            }

            let cluster = parent.add(format!("subgraph {} {{", cluster_id(child)));
            cluster.add(format!("label=\"{child}\""));
            self.write_contents(child, cluster, config);
            parent.add("}");

            separate = true;
        }
    }
}
