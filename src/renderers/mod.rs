//! Renderers module for the annotated reader
//!
//! Converts composed lattices into the reader's markup.

pub mod html;

pub use html::{escape_html, render_failure, render_html};
