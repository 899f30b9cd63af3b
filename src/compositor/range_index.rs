//! Range index: annotations grouped by kind
//!
//! Grouping only; no ordering is imposed beyond source order within each
//! kind. Range notes contribute twice: a note entry at their anchor and an
//! underline over their span.

use super::CompositionIssue;
use crate::models::{Annotation, AnnotationRow, CharRange, Colour, MarkerKind, ParallelGloss};
use serde::Serialize;

/// A colour applied over an inclusive character range
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleRange {
    pub range: CharRange,
    pub colour: Colour,
}

/// A note or short note waiting to be attached at `position`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteEntry {
    pub position: usize,
    pub kind: MarkerKind,
    pub text: String,
    /// Empty for short notes
    pub note_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeIndex {
    pub font_styles: Vec<StyleRange>,
    pub highlight_styles: Vec<StyleRange>,
    pub underline_styles: Vec<StyleRange>,
    pub notes: Vec<NoteEntry>,
    pub dual_words: Vec<ParallelGloss>,
}

impl RangeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and group raw rows. Malformed rows are dropped and
    /// recorded in `issues`; the rest still index.
    pub fn from_rows(rows: &[AnnotationRow], issues: &mut Vec<CompositionIssue>) -> Self {
        let mut index = Self::new();
        for (row_idx, row) in rows.iter().enumerate() {
            match Annotation::try_from(row) {
                Ok(annotation) => index.push(annotation),
                Err(e) => {
                    log::warn!(
                        "dropping annotation row {} (id '{}'): {}",
                        row_idx,
                        row.annotation_id,
                        e
                    );
                    issues.push(CompositionIssue::DroppedRecord {
                        row: row_idx,
                        reason: e.to_string(),
                    });
                }
            }
        }
        index
    }

    pub fn from_annotations(annotations: impl IntoIterator<Item = Annotation>) -> Self {
        let mut index = Self::new();
        for annotation in annotations {
            index.push(annotation);
        }
        index
    }

    pub fn push(&mut self, annotation: Annotation) {
        match annotation {
            Annotation::FontColour { range, colour } => {
                self.font_styles.push(StyleRange { range, colour });
            }
            Annotation::Highlight { range, colour } => {
                self.highlight_styles.push(StyleRange { range, colour });
            }
            Annotation::Underline { range, colour } => {
                self.underline_styles.push(StyleRange { range, colour });
            }
            Annotation::Note { anchor, span, note_type, text } => {
                self.notes.push(NoteEntry {
                    position: anchor,
                    kind: MarkerKind::Note,
                    text,
                    note_type,
                });
                self.push_note_span(span);
            }
            Annotation::ShortNote { anchor, span, text } => {
                self.notes.push(NoteEntry {
                    position: anchor,
                    kind: MarkerKind::ShortNote,
                    text,
                    note_type: String::new(),
                });
                self.push_note_span(span);
            }
            Annotation::Parallel(gloss) => self.dual_words.push(gloss),
        }
    }

    fn push_note_span(&mut self, span: Option<CharRange>) {
        if let Some(range) = span {
            self.underline_styles.push(StyleRange {
                range,
                colour: Colour::note_underline(),
            });
        }
    }

    pub fn is_empty(&self) -> bool {
        self.font_styles.is_empty()
            && self.highlight_styles.is_empty()
            && self.underline_styles.is_empty()
            && self.notes.is_empty()
            && self.dual_words.is_empty()
    }
}
