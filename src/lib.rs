//! Annotated Translation Reader WASM Module
//!
//! Composes a verse's translation text and its annotation rows into a
//! per-character lattice (colours, highlights, underlines, note markers and
//! dual-word glosses), renders it to markup, and re-styles every rendered
//! verse when the reader's display settings change.

pub mod models;
pub mod lookup;
pub mod compositor;
pub mod renderers;
pub mod settings;
pub mod reader;
pub mod api;

// Re-export commonly used types
pub use models::*;
pub use compositor::{compose, compose_rows, Composition, CompositionIssue};
pub use lookup::{NoteTypeResolver, TypeLookup};
pub use reader::{ReaderSession, ReaderView};
pub use settings::SettingsStore;
pub use api::{compose_verse, compose_verse_lattice, Reader};

use wasm_bindgen::prelude::*;

// This is like the `main` function, but for WASM modules.
#[wasm_bindgen(start)]
pub fn main() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    #[cfg(feature = "console_log")]
    {
        if let Err(e) = console_log::init_with_level(log::Level::Debug) {
            crate::wasm_warn!("logger already initialized: {}", e);
        }
    }

    log::info!("Annotated reader WASM module initialized");
}
