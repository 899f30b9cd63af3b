//! Reader-level state: the verses on the current page and the session
//! that keeps them in step with the display settings

pub mod session;
pub mod view;

pub use session::ReaderSession;
pub use view::{ReaderView, RenderedVerse, VerseState, NO_TRANSLATION};

use crate::models::AnnotationRow;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to load annotations for {surah}:{ayah}: {message}")]
    Fetch { surah: u32, ayah: u32, message: String },

    #[error("annotation data for {surah}:{ayah} is malformed: {message}")]
    Malformed { surah: u32, ayah: u32, message: String },
}

/// Supplies the annotation rows of one verse
pub trait AnnotationSource {
    fn fetch_annotations(&self, surah: u32, ayah: u32) -> Result<Vec<AnnotationRow>, SourceError>;
}

/// Group a surah's rows by verse number. Rows without one are skipped.
pub fn group_by_ayah(rows: impl IntoIterator<Item = AnnotationRow>) -> BTreeMap<u32, Vec<AnnotationRow>> {
    let mut grouped: BTreeMap<u32, Vec<AnnotationRow>> = BTreeMap::new();
    for row in rows {
        match row.ayat_number {
            Some(ayah) => grouped.entry(ayah).or_default().push(row),
            None => log::warn!("skipping annotation row '{}' with no verse number", row.annotation_id),
        }
    }
    grouped
}

/// A surah's rows, already fetched and grouped
#[derive(Debug, Clone, Default)]
pub struct GroupedAnnotations {
    surah: u32,
    by_ayah: BTreeMap<u32, Vec<AnnotationRow>>,
}

impl GroupedAnnotations {
    pub fn new(surah: u32, rows: impl IntoIterator<Item = AnnotationRow>) -> Self {
        Self {
            surah,
            by_ayah: group_by_ayah(rows),
        }
    }

    pub fn surah(&self) -> u32 {
        self.surah
    }

    pub fn rows(&self, ayah: u32) -> &[AnnotationRow] {
        self.by_ayah.get(&ayah).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl AnnotationSource for GroupedAnnotations {
    /// A verse without rows simply has no annotations
    fn fetch_annotations(&self, surah: u32, ayah: u32) -> Result<Vec<AnnotationRow>, SourceError> {
        if surah != self.surah {
            return Err(SourceError::Fetch {
                surah,
                ayah,
                message: format!("only surah {} is loaded", self.surah),
            });
        }
        Ok(self.rows(ayah).to_vec())
    }
}
