//! Annotation compositor
//!
//! Turns one verse's translation text plus its annotation rows into a
//! `Lattice`, in one uninterrupted sequence:
//!
//! 1. `range_index`: validate rows and group them by kind
//! 2. `lattice_builder`: plan dual-word ranges, then emit one unit per
//!    character (or per consumed run)
//! 3. `style`: font colour, highlight and underline passes
//! 4. `notes`: attach note markers at their anchors
//! 5. `restyle`: assign every display-parameter-driven property
//!
//! Step 5 is also the live re-styler, run again on its own whenever the
//! display parameters change.
//!
//! Nothing here fails. Every per-record problem is recovered locally and
//! reported as a `CompositionIssue` next to the lattice.

pub mod lattice_builder;
pub mod notes;
pub mod range_index;
pub mod restyle;
pub mod style;

pub use lattice_builder::{build_lattice, plan_dual_words, DualWordPlan, ValidationError};
pub use notes::{attach_notes, switch_notes_mode};
pub use range_index::{NoteEntry, RangeIndex, StyleRange};
pub use restyle::{apply_display_parameters, restyle, short_note_margin};
pub use style::{apply_styles, StylePass};

use crate::lookup::NoteTypeResolver;
use crate::models::{Annotation, AnnotationRow, DisplayParameters, Lattice};
use serde::Serialize;

/// A non-fatal problem recovered during composition
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "issue", rename_all = "camelCase")]
pub enum CompositionIssue {
    /// A row failed validation and was skipped
    #[serde(rename_all = "camelCase")]
    DroppedRecord { row: usize, reason: String },

    /// A dual word was rejected and its characters render as plain glyphs
    #[serde(rename_all = "camelCase")]
    RejectedDualWord { start: usize, end: usize, reason: String },

    /// Part of a range, or a note anchor, had no glyph to land on
    #[serde(rename_all = "camelCase")]
    TargetMiss {
        target: &'static str,
        start: usize,
        end: usize,
        missing: usize,
    },
}

/// A composed verse and what was recovered while composing it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Composition {
    pub lattice: Lattice,
    pub issues: Vec<CompositionIssue>,
}

/// Compose from raw sheet rows
pub fn compose_rows(
    text: &str,
    rows: &[AnnotationRow],
    resolver: &dyn NoteTypeResolver,
    params: &DisplayParameters,
) -> Composition {
    let mut issues = Vec::new();
    let index = RangeIndex::from_rows(rows, &mut issues);
    compose_index(text, &index, resolver, params, issues)
}

/// Compose from already validated annotations
pub fn compose(
    text: &str,
    annotations: impl IntoIterator<Item = Annotation>,
    resolver: &dyn NoteTypeResolver,
    params: &DisplayParameters,
) -> Composition {
    let index = RangeIndex::from_annotations(annotations);
    compose_index(text, &index, resolver, params, Vec::new())
}

pub fn compose_index(
    text: &str,
    index: &RangeIndex,
    resolver: &dyn NoteTypeResolver,
    params: &DisplayParameters,
    mut issues: Vec<CompositionIssue>,
) -> Composition {
    let char_count = text.chars().count();

    let plan = plan_dual_words(&index.dual_words, char_count);
    for (range, error) in &plan.rejected {
        log::warn!("rejecting dual word: {}", error);
        issues.push(CompositionIssue::RejectedDualWord {
            start: range.start(),
            end: range.end(),
            reason: error.to_string(),
        });
    }

    let mut lattice = build_lattice(text, &plan.accepted, &params.dual_word);
    apply_styles(&mut lattice, index, &mut issues);
    attach_notes(&mut lattice, &index.notes, resolver, params, &mut issues);
    apply_display_parameters(&mut lattice, params);

    Composition { lattice, issues }
}
