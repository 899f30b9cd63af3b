//! Settings, lookup and the rendered page behind one handle
//!
//! Every settings change goes through `&mut self`, which updates the store
//! and re-styles the whole view before returning. No caller can observe a
//! parameter value that the rendered verses do not reflect yet.

use super::view::{ReaderView, RenderedVerse, VerseState};
use super::AnnotationSource;
use crate::compositor::{compose_rows, CompositionIssue};
use crate::lookup::TypeLookup;
use crate::models::{AnnotationRow, DisplayParameters, DisplayParametersPatch};
use crate::settings::SettingsStore;

#[derive(Debug)]
pub struct ReaderSession {
    settings: SettingsStore,
    lookup: TypeLookup,
    view: ReaderView,
}

impl ReaderSession {
    pub fn new(settings: SettingsStore) -> Self {
        Self {
            settings,
            lookup: TypeLookup::new(),
            view: ReaderView::new(),
        }
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn params(&self) -> &DisplayParameters {
        self.settings.params()
    }

    pub fn view(&self) -> &ReaderView {
        &self.view
    }

    pub fn lookup(&self) -> &TypeLookup {
        &self.lookup
    }

    /// Takes effect for verses composed from now on
    pub fn set_lookup(&mut self, lookup: TypeLookup) {
        log::debug!("type lookup loaded with {} entries", lookup.len());
        self.lookup = lookup;
    }

    fn compose_verse(&self, surah: u32, ayah: u32, text: &str, rows: &[AnnotationRow]) -> RenderedVerse {
        let composition = compose_rows(text, rows, &self.lookup, self.settings.params());
        for issue in &composition.issues {
            if let CompositionIssue::DroppedRecord { row, reason } = issue {
                log::debug!("{}:{} row {} dropped: {}", surah, ayah, row, reason);
            }
        }
        RenderedVerse {
            surah,
            ayah,
            state: VerseState::Rendered(composition),
        }
    }

    /// Compose one verse with the current parameters and add it to the page
    pub fn load_verse(&mut self, surah: u32, ayah: u32, text: &str, rows: &[AnnotationRow]) -> &RenderedVerse {
        let verse = self.compose_verse(surah, ayah, text, rows);
        self.view.push(verse)
    }

    pub fn fail_verse(&mut self, surah: u32, ayah: u32, message: &str) {
        log::warn!("verse {}:{} failed: {}", surah, ayah, message);
        self.view.push(RenderedVerse {
            surah,
            ayah,
            state: VerseState::Failed { message: message.to_string() },
        });
    }

    /// Build a whole page, replacing the previous one. A verse whose rows
    /// cannot be fetched shows a failure without affecting the others.
    pub fn render_verses<'a>(
        &mut self,
        surah: u32,
        verses: impl IntoIterator<Item = (u32, &'a str)>,
        source: &dyn AnnotationSource,
    ) -> usize {
        let page: Vec<RenderedVerse> = verses
            .into_iter()
            .map(|(ayah, text)| match source.fetch_annotations(surah, ayah) {
                Ok(rows) => self.compose_verse(surah, ayah, text, &rows),
                Err(e) => {
                    log::warn!("{}", e);
                    RenderedVerse {
                        surah,
                        ayah,
                        state: VerseState::Failed { message: e.to_string() },
                    }
                }
            })
            .collect();
        let count = page.len();
        self.view.replace(page);
        count
    }

    pub fn clear(&mut self) {
        self.view.clear();
    }

    /// Merge a patch into the settings and re-style every verse
    pub fn set_display_parameters(&mut self, patch: &DisplayParametersPatch) -> bool {
        let changed = self.settings.update(patch);
        if changed {
            self.view.apply_display_parameters(self.settings.params());
        }
        changed
    }

    pub fn on_viewport_change(&mut self, width: f32) -> bool {
        let changed = self.settings.on_viewport_change(width);
        if changed {
            self.view.apply_display_parameters(self.settings.params());
        }
        changed
    }

    pub fn reset_dual_word(&mut self) {
        self.settings.reset_dual_word();
        self.view.apply_display_parameters(self.settings.params());
    }

    pub fn step_short_note_size(&mut self, delta: i32) -> bool {
        let changed = self.settings.step_short_note_size(delta);
        if changed {
            self.view.apply_display_parameters(self.settings.params());
        }
        changed
    }

    pub fn html(&self, ayah: u32) -> Option<String> {
        self.view.html(ayah)
    }
}
