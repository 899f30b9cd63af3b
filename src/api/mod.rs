//! Annotated reader WASM API
//!
//! The JavaScript-facing surface of the crate.
//!
//! # Module Structure
//!
//! - `helpers`: console logging macros and JS value conversion
//! - `compose`: stateless `composeVerse` / `composeVerseLattice`
//! - `reader`: the stateful `Reader` handle

pub mod helpers;
pub mod compose;
pub mod reader;

pub use compose::{compose_verse, compose_verse_lattice};
pub use reader::Reader;
