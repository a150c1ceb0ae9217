//! Tree-of-lines text builder
//!
//! Lines are collected into a tree where each line may own nested lines.
//! Writing walks the tree depth-first, indenting each line once per level
//! of nesting. This is the only structure used for DOT output; there is no
//! separate syntax tree.

use std::fmt;
use std::io::{self, Write};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IndentError {
    #[error("failed to write indent for level {level}")]
    Indent {
        level: usize,
        written: u64,
        #[source]
        source: io::Error,
    },

    #[error("failed to write line: {text}")]
    Line {
        text: String,
        written: u64,
        #[source]
        source: io::Error,
    },
}

impl IndentError {
    /// Bytes successfully written before the failure
    pub fn bytes_written(&self) -> u64 {
        match self {
            IndentError::Indent { written, .. } | IndentError::Line { written, .. } => *written,
        }
    }
}

/// A single line of text with nested child lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    text: String,
    nested: Vec<Line>,
}

impl Line {
    fn new(text: String) -> Self {
        Self {
            text,
            nested: Vec::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Child lines, in insertion order
    pub fn nested(&self) -> &[Line] {
        &self.nested
    }

    /// Appends a nested line and returns it for further nesting
    pub fn add(&mut self, text: impl Into<String>) -> &mut Line {
        push_line(&mut self.nested, text.into())
    }

    /// Appends a nested line built from format arguments
    ///
    /// ```
    /// use task_graph::graphviz::IndentWriter;
    ///
    /// let mut iw = IndentWriter::new();
    /// iw.add("parent").add_fmt(format_args!("child {}", 1));
    /// ```
    pub fn add_fmt(&mut self, args: fmt::Arguments<'_>) -> &mut Line {
        self.add(args.to_string())
    }

    fn write_to<W: Write + ?Sized>(
        &self,
        w: &mut W,
        indent: &str,
        level: usize,
        written: &mut u64,
    ) -> Result<(), IndentError> {
        for _ in 0..level {
            w.write_all(indent.as_bytes())
                .map_err(|source| IndentError::Indent {
                    level,
                    written: *written,
                    source,
                })?;
            *written += indent.len() as u64;
        }

        w.write_all(self.text.as_bytes())
            .and_then(|()| w.write_all(b"\n"))
            .map_err(|source| IndentError::Line {
                text: self.text.clone(),
                written: *written,
                source,
            })?;
        *written += self.text.len() as u64 + 1;

        for line in &self.nested {
            line.write_to(w, indent, level + 1, written)?;
        }

        Ok(())
    }
}

fn push_line(lines: &mut Vec<Line>, text: String) -> &mut Line {
    lines.push(Line::new(text));
    let last = lines.len() - 1;
    &mut lines[last]
}

/// Builder for indented text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndentWriter {
    lines: Vec<Line>,
}

impl IndentWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a top-level line and returns it for further nesting
    pub fn add(&mut self, text: impl Into<String>) -> &mut Line {
        push_line(&mut self.lines, text.into())
    }

    /// Appends a top-level line built from format arguments
    pub fn add_fmt(&mut self, args: fmt::Arguments<'_>) -> &mut Line {
        self.add(args.to_string())
    }

    /// Top-level lines, in insertion order
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Writes every line, prefixing each with `indent` once per nesting
    /// level. Top-level lines are not indented.
    ///
    /// Returns the number of bytes written. On failure the error carries
    /// the count written before the failing write.
    pub fn write_to<W: Write + ?Sized>(&self, w: &mut W, indent: &str) -> Result<u64, IndentError> {
        let mut written = 0;

        for line in &self.lines {
            line.write_to(w, indent, 0, &mut written)?;
        }

        Ok(written)
    }
}

impl fmt::Display for IndentWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = Vec::new();
        self.write_to(&mut buf, "  ").map_err(|_| fmt::Error)?;
        f.write_str(&String::from_utf8_lossy(&buf))
    }
}
