//! The verses currently shown

use crate::compositor::{apply_display_parameters, Composition};
use crate::models::DisplayParameters;
use crate::renderers::html::{escape_html, render_failure, render_html};
use serde::Serialize;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Shown for a verse with no translation text
pub const NO_TRANSLATION: &str = "[No translation found]";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum VerseState {
    Rendered(Composition),
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedVerse {
    pub surah: u32,
    pub ayah: u32,
    pub state: VerseState,
}

impl RenderedVerse {
    pub fn html(&self) -> String {
        match &self.state {
            VerseState::Rendered(c) if c.lattice.char_count() == 0 => escape_html(NO_TRANSLATION),
            VerseState::Rendered(c) => render_html(&c.lattice),
            VerseState::Failed { message } => render_failure(message),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.state, VerseState::Failed { .. })
    }
}

/// Rendered verses keyed by verse number
#[derive(Debug, Clone, Default)]
pub struct ReaderView {
    verses: BTreeMap<u32, RenderedVerse>,
}

impl ReaderView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swap in a new page. Nothing from the previous page survives.
    pub fn replace(&mut self, verses: impl IntoIterator<Item = RenderedVerse>) {
        self.verses = verses.into_iter().map(|v| (v.ayah, v)).collect();
    }

    /// Add or overwrite a single verse
    pub fn push(&mut self, verse: RenderedVerse) -> &RenderedVerse {
        match self.verses.entry(verse.ayah) {
            Entry::Occupied(mut slot) => {
                slot.insert(verse);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(verse),
        }
    }

    pub fn clear(&mut self) {
        self.verses.clear();
    }

    pub fn get(&self, ayah: u32) -> Option<&RenderedVerse> {
        self.verses.get(&ayah)
    }

    pub fn verses(&self) -> impl Iterator<Item = &RenderedVerse> {
        self.verses.values()
    }

    pub fn len(&self) -> usize {
        self.verses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verses.is_empty()
    }

    /// Re-style every rendered verse in place. Failed verses are left alone.
    pub fn apply_display_parameters(&mut self, params: &DisplayParameters) -> usize {
        let mut restyled = 0;
        for verse in self.verses.values_mut() {
            if let VerseState::Rendered(composition) = &mut verse.state {
                apply_display_parameters(&mut composition.lattice, params);
                restyled += 1;
            }
        }
        log::debug!("restyled {} verses", restyled);
        restyled
    }

    pub fn html(&self, ayah: u32) -> Option<String> {
        self.get(ayah).map(RenderedVerse::html)
    }
}
