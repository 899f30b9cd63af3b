//! Models module for the annotated translation reader
//!
//! This module contains the data models shared by the compositor, the
//! settings store and the renderers.

pub mod annotation;
pub mod display;
pub mod lattice;
pub mod serde_helpers;

// Re-export commonly used types
pub use annotation::*;
pub use display::*;
pub use lattice::*;
pub use serde_helpers::SheetRow;
