//! # Graphviz output
//!
//! Building blocks for DOT text and the emitter that uses them:
//!
//! - [`IndentWriter`] collects nested lines and writes them indented
//! - [`word_wrap`] breaks descriptions into label lines
//! - [`Properties`] holds a node or edge attribute list
//! - [`Record`] builds multi-field record labels
//! - [`glob_match`] matches style rule patterns against task names
//! - [`write_to`] and [`save_to`] emit a whole graph
//! - [`render_image`] hands a DOT file to the `dot` executable

mod glob;
mod indent;
mod properties;
mod record;
mod render;
mod wrap;
mod writer;

pub use glob::{glob_match, Pattern, PatternError};
pub use indent::{IndentError, IndentWriter, Line};
pub use properties::{Properties, LINE_BREAK};
pub use record::Record;
pub use render::{find_executable, image_path, render_image, RenderError, DOT_EXECUTABLE};
pub use wrap::word_wrap;
pub use writer::{description_width, render, save_to, write_to, DotError, INDENT, NODE_SHAPE};
