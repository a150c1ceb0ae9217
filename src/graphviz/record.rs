//! Record-shaped node labels
//!
//! A record label lays out several fields inside one node. Fields are
//! separated by `|`, and the whole label is braced so Graphviz stacks the
//! fields vertically when the graph flows left to right.

use std::fmt;

use super::properties::LINE_BREAK;
use super::wrap::word_wrap;

/// Builder for a Graphviz record label
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    parts: Vec<String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field; empty text is ignored
    pub fn add(&mut self, text: impl Into<String>) {
        let text = text.into();
        if !text.is_empty() {
            self.parts.push(text);
        }
    }

    pub fn add_fmt(&mut self, args: fmt::Arguments<'_>) {
        self.add(args.to_string());
    }

    /// Appends a field word-wrapped at `width`
    pub fn add_wrapped(&mut self, width: usize, text: &str) {
        self.add(word_wrap(text, width).join(LINE_BREAK));
    }

    pub fn add_wrapped_fmt(&mut self, width: usize, args: fmt::Arguments<'_>) {
        self.add_wrapped(width, &args.to_string());
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }
}

fn escape(content: &str) -> String {
    let mut escaped = String::with_capacity(content.len());
    for c in content.chars() {
        if matches!(c, '{' | '}' | '"') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl fmt::Display for Record {
    /// A single field is written as-is; otherwise fields are joined,
    /// escaped and braced.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let [only] = self.parts.as_slice() {
            return f.write_str(only);
        }

        write!(f, "{{{}}}", escape(&self.parts.join(" | ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_record_is_empty() {
        let r = Record::new();
        assert!(r.parts().is_empty());
        assert_eq!(r.to_string(), "{}");
    }

    #[test]
    fn add_preserves_order() {
        let mut r = Record::new();
        r.add("alpha");
        r.add("beta");
        r.add("gamma");
        assert_eq!(r.parts(), ["alpha", "beta", "gamma"]);
    }

    #[test]
    fn empty_parts_are_dropped() {
        let mut r = Record::new();
        r.add("alpha");
        r.add("");
        r.add_wrapped(10, "");
        assert_eq!(r.parts(), ["alpha"]);
    }

    #[test]
    fn add_fmt_formats_part() {
        let mut r = Record::new();
        r.add_fmt(format_args!("{}-{}", "blue", 7));
        assert_eq!(r.parts(), ["blue-7"]);
    }

    #[test]
    fn add_wrapped_inserts_line_breaks() {
        let mut r = Record::new();
        r.add_wrapped(4, "abc def ghi");
        assert_eq!(r.parts(), ["abc \\ndef \\nghi"]);

        let mut r = Record::new();
        r.add_wrapped_fmt(4, format_args!("{}", "abc def ghi"));
        assert_eq!(r.parts(), ["abc \\ndef \\nghi"]);
    }

    #[test]
    fn single_part_is_unbraced_and_unescaped() {
        let mut r = Record::new();
        r.add("say {hi}");
        assert_eq!(r.to_string(), "say {hi}");
    }

    #[test]
    fn multiple_parts_are_joined_and_braced() {
        let mut r = Record::new();
        r.add("alpha");
        r.add("beta");
        assert_eq!(r.to_string(), "{alpha | beta}");
    }

    #[test]
    fn multiple_parts_are_escaped() {
        let mut r = Record::new();
        r.add("build");
        r.add("uses {{.VAR}} and \"quotes\"");
        assert_eq!(
            r.to_string(),
            "{build | uses \\{\\{.VAR\\}\\} and \\\"quotes\\\"}"
        );
    }
}
