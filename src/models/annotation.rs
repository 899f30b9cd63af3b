//! Annotation records for one ayah's translation text
//!
//! `AnnotationRow` is the loosely-typed row as it comes off the annotation
//! sheet. `Annotation` is the validated form: one variant per kind, each
//! carrying only the fields that kind uses. Conversion happens once, at
//! the edge, and a row that fails it is dropped rather than rendered.

use super::serde_helpers::{cell_index, cell_text, cell_u32};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Underline colour used for the span of a range note
pub const NOTE_UNDERLINE_COLOUR: &str = "007acc";

/// Default top-word size (percent) for a Parallel row without one
pub const DEFAULT_PARALLEL_TOP_SIZE: u32 = 100;

/// Default bottom-word size (percent) for a Parallel row without one
pub const DEFAULT_PARALLEL_BOTTOM_SIZE: u32 = 80;

/// Default spacing (px) for a Parallel row without one
pub const DEFAULT_PARALLEL_SPACING: u32 = 5;

static HEX_COLOUR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[0-9A-Fa-f]{3}|[0-9A-Fa-f]{6}|[0-9A-Fa-f]{8})$").unwrap());

/// Per-record data errors. A row carrying one of these is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnnotationError {
    #[error("unknown annotation type '{0}'")]
    UnknownKind(String),

    #[error("{kind} annotation is missing {field}")]
    MissingField { kind: AnnotationKind, field: &'static str },

    #[error("{kind} annotation has inverted range {start}..={end}")]
    InvertedRange { kind: AnnotationKind, start: usize, end: usize },

    #[error("invalid colour '{0}'")]
    InvalidColour(String),
}

/// The six annotation kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnnotationKind {
    FontColour,
    Highlight,
    Underline,
    Notes,
    ShortNote,
    Parallel,
}

impl AnnotationKind {
    /// The label used in the annotation sheet's `AnnotationType` column
    pub fn sheet_label(&self) -> &'static str {
        match self {
            AnnotationKind::FontColour => "Font colour",
            AnnotationKind::Highlight => "Highlight",
            AnnotationKind::Underline => "Underline",
            AnnotationKind::Notes => "Notes",
            AnnotationKind::ShortNote => "ShortNote",
            AnnotationKind::Parallel => "Parallel",
        }
    }
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sheet_label())
    }
}

impl FromStr for AnnotationKind {
    type Err = AnnotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();

        match folded.as_str() {
            "fontcolour" | "fontcolor" => Ok(AnnotationKind::FontColour),
            "highlight" => Ok(AnnotationKind::Highlight),
            "underline" => Ok(AnnotationKind::Underline),
            "notes" | "note" => Ok(AnnotationKind::Notes),
            "shortnote" | "shortnotes" => Ok(AnnotationKind::ShortNote),
            "parallel" | "dualword" => Ok(AnnotationKind::Parallel),
            _ => Err(AnnotationError::UnknownKind(s.to_string())),
        }
    }
}

/// A hex colour stored without its leading '#'
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Colour(String);

impl Colour {
    /// Parse a sheet colour cell ("ffff00", "#FFFF00", "fc0")
    pub fn parse(raw: &str) -> Result<Self, AnnotationError> {
        let hex = raw.trim().trim_start_matches('#');
        if HEX_COLOUR.is_match(hex) {
            Ok(Colour(hex.to_ascii_lowercase()))
        } else {
            Err(AnnotationError::InvalidColour(raw.to_string()))
        }
    }

    /// The fixed underline colour for range notes
    pub fn note_underline() -> Self {
        Colour(NOTE_UNDERLINE_COLOUR.to_string())
    }

    pub fn hex(&self) -> &str {
        &self.0
    }

    /// CSS form, e.g. `#ffff00`
    pub fn css(&self) -> String {
        format!("#{}", self.0)
    }
}

/// A range whose end comes before its start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("range {start}..={end} ends before it starts")]
pub struct InvertedRange {
    pub start: usize,
    pub end: usize,
}

#[derive(Deserialize)]
struct RangeBounds {
    start: usize,
    end: usize,
}

impl TryFrom<RangeBounds> for CharRange {
    type Error = InvertedRange;

    fn try_from(bounds: RangeBounds) -> Result<Self, Self::Error> {
        CharRange::new(bounds.start, bounds.end)
    }
}

/// Inclusive character range `start..=end`; never inverted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RangeBounds")]
pub struct CharRange {
    start: usize,
    end: usize,
}

impl CharRange {
    pub fn new(start: usize, end: usize) -> Result<Self, InvertedRange> {
        if start > end {
            return Err(InvertedRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn contains(&self, index: usize) -> bool {
        self.start <= index && index <= self.end
    }

    pub fn overlaps(&self, other: &CharRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn indices(&self) -> std::ops::RangeInclusive<usize> {
        self.start..=self.end
    }
}

/// A Parallel (dual-word) gloss: the source run becomes the top word,
/// `bottom_word` is shown beneath it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallelGloss {
    pub range: CharRange,
    pub bottom_word: String,
    pub top_size: u32,
    pub bottom_size: u32,
    pub spacing: u32,
}

/// A validated annotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Annotation {
    FontColour { range: CharRange, colour: Colour },
    Highlight { range: CharRange, colour: Colour },
    Underline { range: CharRange, colour: Colour },
    /// Regular note anchored at `anchor`; `span` is the range underlined
    /// alongside it, when the row gives one
    Note {
        anchor: usize,
        span: Option<CharRange>,
        note_type: String,
        text: String,
    },
    ShortNote {
        anchor: usize,
        span: Option<CharRange>,
        text: String,
    },
    Parallel(ParallelGloss),
}

impl Annotation {
    pub fn kind(&self) -> AnnotationKind {
        match self {
            Annotation::FontColour { .. } => AnnotationKind::FontColour,
            Annotation::Highlight { .. } => AnnotationKind::Highlight,
            Annotation::Underline { .. } => AnnotationKind::Underline,
            Annotation::Note { .. } => AnnotationKind::Notes,
            Annotation::ShortNote { .. } => AnnotationKind::ShortNote,
            Annotation::Parallel(_) => AnnotationKind::Parallel,
        }
    }
}

/// One row of the annotation sheet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AnnotationRow {
    #[serde(rename = "AyatTranslationID", deserialize_with = "cell_text")]
    pub ayat_translation_id: String,
    #[serde(rename = "AnnotationID", deserialize_with = "cell_text")]
    pub annotation_id: String,
    #[serde(deserialize_with = "cell_u32")]
    pub surah_number: Option<u32>,
    #[serde(deserialize_with = "cell_u32")]
    pub ayat_number: Option<u32>,
    #[serde(deserialize_with = "cell_text")]
    pub annotation_type: String,
    #[serde(deserialize_with = "cell_index")]
    pub start_index: Option<usize>,
    #[serde(deserialize_with = "cell_index")]
    pub end_index: Option<usize>,
    #[serde(deserialize_with = "cell_text")]
    pub note_type: String,
    #[serde(rename = "NoteTextHTML", deserialize_with = "cell_text")]
    pub note_text_html: String,
    #[serde(deserialize_with = "cell_text")]
    pub short_note_text: String,
    #[serde(deserialize_with = "cell_text")]
    pub parallel_text: String,
    #[serde(deserialize_with = "cell_text")]
    pub colour: String,
    #[serde(deserialize_with = "cell_u32")]
    pub top_size: Option<u32>,
    #[serde(deserialize_with = "cell_u32")]
    pub bottom_size: Option<u32>,
    #[serde(deserialize_with = "cell_u32")]
    pub spacing: Option<u32>,
    #[serde(deserialize_with = "cell_text")]
    pub tag_name: String,
}

impl AnnotationRow {
    /// Convenience constructor used by callers that build rows by hand
    pub fn new(kind: AnnotationKind, start: usize, end: usize) -> Self {
        Self {
            annotation_type: kind.sheet_label().to_string(),
            start_index: Some(start),
            end_index: Some(end),
            ..Self::default()
        }
    }

    pub fn with_colour(mut self, colour: &str) -> Self {
        self.colour = colour.to_string();
        self
    }

    pub fn with_note(mut self, note_type: &str, text: &str) -> Self {
        self.note_type = note_type.to_string();
        self.note_text_html = text.to_string();
        self
    }

    pub fn with_short_note(mut self, text: &str) -> Self {
        self.short_note_text = text.to_string();
        self
    }

    pub fn with_parallel(mut self, bottom_word: &str) -> Self {
        self.parallel_text = bottom_word.to_string();
        self
    }

    /// End index, falling back to the start index when the cell is blank
    fn effective_end(&self) -> Option<usize> {
        self.end_index.or(self.start_index)
    }

    fn range(&self, kind: AnnotationKind) -> Result<CharRange, AnnotationError> {
        let end = self
            .effective_end()
            .ok_or(AnnotationError::MissingField { kind, field: "EndIndex" })?;
        let start = self.start_index.unwrap_or(0);
        CharRange::new(start, end).map_err(|e| AnnotationError::InvertedRange {
            kind,
            start: e.start,
            end: e.end,
        })
    }

    /// Underlined span for a note row. A zero start reads the same as a
    /// blank cell, so it never produces a span.
    fn note_span(&self, anchor: usize) -> Option<CharRange> {
        match self.start_index {
            Some(start) if start != 0 && start < anchor => CharRange::new(start, anchor).ok(),
            _ => None,
        }
    }

    fn colour(&self, kind: AnnotationKind) -> Result<Colour, AnnotationError> {
        if self.colour.trim().is_empty() {
            return Err(AnnotationError::MissingField { kind, field: "Colour" });
        }
        Colour::parse(&self.colour)
    }

    fn required_text<'a>(
        kind: AnnotationKind,
        value: &'a str,
        field: &'static str,
    ) -> Result<&'a str, AnnotationError> {
        if value.trim().is_empty() {
            Err(AnnotationError::MissingField { kind, field })
        } else {
            Ok(value)
        }
    }
}

impl TryFrom<&AnnotationRow> for Annotation {
    type Error = AnnotationError;

    fn try_from(row: &AnnotationRow) -> Result<Self, Self::Error> {
        let kind: AnnotationKind = row.annotation_type.parse()?;

        match kind {
            AnnotationKind::FontColour => Ok(Annotation::FontColour {
                range: row.range(kind)?,
                colour: row.colour(kind)?,
            }),
            AnnotationKind::Highlight => Ok(Annotation::Highlight {
                range: row.range(kind)?,
                colour: row.colour(kind)?,
            }),
            AnnotationKind::Underline => Ok(Annotation::Underline {
                range: row.range(kind)?,
                colour: row.colour(kind)?,
            }),
            AnnotationKind::Notes => {
                let anchor = row
                    .effective_end()
                    .ok_or(AnnotationError::MissingField { kind, field: "EndIndex" })?;
                let text = AnnotationRow::required_text(kind, &row.note_text_html, "NoteTextHTML")?;
                Ok(Annotation::Note {
                    anchor,
                    span: row.note_span(anchor),
                    note_type: row.note_type.trim().to_string(),
                    text: text.to_string(),
                })
            }
            AnnotationKind::ShortNote => {
                let anchor = row
                    .effective_end()
                    .ok_or(AnnotationError::MissingField { kind, field: "EndIndex" })?;
                let text = AnnotationRow::required_text(kind, &row.short_note_text, "ShortNoteText")?;
                Ok(Annotation::ShortNote {
                    anchor,
                    span: row.note_span(anchor),
                    text: text.to_string(),
                })
            }
            AnnotationKind::Parallel => {
                let range = row.range(kind)?;
                let bottom = AnnotationRow::required_text(kind, &row.parallel_text, "ParallelText")?;
                Ok(Annotation::Parallel(ParallelGloss {
                    range,
                    bottom_word: bottom.to_string(),
                    top_size: row.top_size.unwrap_or(DEFAULT_PARALLEL_TOP_SIZE),
                    bottom_size: row.bottom_size.unwrap_or(DEFAULT_PARALLEL_BOTTOM_SIZE),
                    spacing: row.spacing.unwrap_or(DEFAULT_PARALLEL_SPACING),
                }))
            }
        }
    }
}

impl TryFrom<AnnotationRow> for Annotation {
    type Error = AnnotationError;

    fn try_from(row: AnnotationRow) -> Result<Self, Self::Error> {
        Annotation::try_from(&row)
    }
}
