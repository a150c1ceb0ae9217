//! Attribute lists for nodes and edges
//!
//! Attributes are held sorted by key so output never depends on the order
//! in which they were set.

use std::collections::BTreeMap;
use std::fmt;

use super::glob::glob_match;
use super::indent::Line;
use super::wrap::word_wrap;
use crate::storage::{GraphvizEdge, GraphvizNode, GraphvizStyleRule};

/// Escape sequence Graphviz renders as a line break inside a label
pub const LINE_BREAK: &str = "\\n";

/// Attribute name to value mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    values: BTreeMap<String, String>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key`, replacing any previous value
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn add_fmt(&mut self, key: impl Into<String>, args: fmt::Arguments<'_>) {
        self.add(key, args.to_string());
    }

    /// Sets `key` to `value` word-wrapped at `width`, lines joined with
    /// [`LINE_BREAK`]
    pub fn add_wrapped(&mut self, key: impl Into<String>, width: usize, value: &str) {
        self.add(key, word_wrap(value, width).join(LINE_BREAK));
    }

    pub fn add_wrapped_fmt(&mut self, key: impl Into<String>, width: usize, args: fmt::Arguments<'_>) {
        self.add_wrapped(key, width, &args.to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Attributes in ascending key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Sets `key` only when `value` is non-empty
    fn add_non_empty(&mut self, key: &str, value: &str) {
        if !value.is_empty() {
            self.add(key, value);
        }
    }

    /// Applies base styling for task nodes
    pub fn add_node_style(&mut self, style: &GraphvizNode) {
        self.add_non_empty("color", &style.color);
        self.add_non_empty("fillcolor", &style.fill_color);
        self.add_non_empty("style", &style.style);
        self.add_non_empty("fontcolor", &style.font_color);
    }

    /// Applies the rule's non-empty fields when its pattern matches `id`.
    ///
    /// Each field overrides independently, so a rule setting only
    /// `fontColor` leaves colors from earlier rules in place.
    pub fn add_style_rule(&mut self, id: &str, rule: &GraphvizStyleRule) -> bool {
        if !glob_match(&rule.match_pattern, id) {
            return false;
        }

        self.add_non_empty("color", &rule.color);
        self.add_non_empty("fillcolor", &rule.fill_color);
        self.add_non_empty("style", &rule.style);
        self.add_non_empty("fontcolor", &rule.font_color);
        true
    }

    /// Makes a fill color visible by adding `style=filled` when no style
    /// was given
    pub fn ensure_filled(&mut self) {
        if self.contains("fillcolor") && !self.contains("style") {
            self.add("style", "filled");
        }
    }

    /// Applies styling for an edge class. Non-positive widths are skipped.
    pub fn add_edge_style(&mut self, style: &GraphvizEdge) {
        self.add_non_empty("color", &style.color);

        if style.width > 0 {
            self.add_fmt("penwidth", format_args!("{}", style.width));
        }

        self.add_non_empty("style", &style.style);
    }

    /// Writes `label` under `parent`, followed by a bracketed attribute
    /// block when any attributes are set.
    ///
    /// Values are written as given; callers escape them beforehand.
    pub fn write_to(&self, label: &str, parent: &mut Line) {
        if self.is_empty() {
            parent.add(label);
            return;
        }

        let nested = parent.add(format!("{label} ["));
        for (key, value) in self.iter() {
            nested.add(format!("{key}=\"{value}\""));
        }

        parent.add("]");
    }
}
