//! The stateful reader handle used by the page
//!
//! Owns one `ReaderSession`. Settings come from `localStorage` when the
//! browser allows it and from memory otherwise.

use super::compose::lookup_from_js;
use super::helpers::{deserialize, deserialize_rows, serialize};
use crate::models::{AnnotationRow, DisplayParametersPatch};
use crate::reader::ReaderSession;
use crate::settings::{KeyValueStore, MemoryStore, SettingsStore};
#[allow(unused_imports)]
use crate::{wasm_log, wasm_warn};
use wasm_bindgen::prelude::*;

fn open_storage() -> Box<dyn KeyValueStore> {
    #[cfg(target_arch = "wasm32")]
    {
        match crate::settings::LocalStorageStore::open() {
            Ok(store) => return Box::new(store),
            Err(e) => wasm_warn!("{}; settings will not persist", e),
        }
    }
    Box::new(MemoryStore::new())
}

#[wasm_bindgen]
pub struct Reader {
    session: ReaderSession,
    surah: u32,
}

#[wasm_bindgen]
impl Reader {
    #[wasm_bindgen(constructor)]
    pub fn new(viewport_width: f32) -> Reader {
        let settings = SettingsStore::load(open_storage(), viewport_width);
        wasm_log!("Reader created ({:?} profile)", settings.profile());
        Reader {
            session: ReaderSession::new(settings),
            surah: 0,
        }
    }

    /// Surah used for verses loaded without a surah number of their own
    #[wasm_bindgen(js_name = setSurah)]
    pub fn set_surah(&mut self, surah: u32) {
        self.surah = surah;
    }

    /// Compose a verse from its rows and return its markup
    #[wasm_bindgen(js_name = loadVerse)]
    pub fn load_verse(&mut self, ayah: u32, text: &str, rows_js: JsValue) -> Result<String, JsValue> {
        let rows: Vec<AnnotationRow> = deserialize_rows(rows_js, "Invalid annotation rows")?;
        let surah = rows
            .iter()
            .find_map(|r| r.surah_number)
            .unwrap_or(self.surah);
        let verse = self.session.load_verse(surah, ayah, text, &rows);
        if let crate::reader::VerseState::Rendered(c) = &verse.state {
            if !c.issues.is_empty() {
                wasm_warn!("verse {}:{} recovered from {} issues", surah, ayah, c.issues.len());
            }
        }
        Ok(verse.html())
    }

    /// Show a visible failure in place of a verse
    #[wasm_bindgen(js_name = failVerse)]
    pub fn fail_verse(&mut self, ayah: u32, message: &str) -> String {
        self.session.fail_verse(self.surah, ayah, message);
        self.session.html(ayah).unwrap_or_default()
    }

    #[wasm_bindgen(js_name = setLookup)]
    pub fn set_lookup(&mut self, rows_js: JsValue) -> Result<(), JsValue> {
        let lookup = lookup_from_js(rows_js)?;
        self.session.set_lookup(lookup);
        Ok(())
    }

    /// Drop every verse of the current page
    pub fn clear(&mut self) {
        self.session.clear();
    }

    /// Merge a partial parameter update. Every loaded verse is re-styled
    /// before this returns; the result says whether anything changed.
    #[wasm_bindgen(js_name = setDisplayParameters)]
    pub fn set_display_parameters(&mut self, patch_js: JsValue) -> Result<bool, JsValue> {
        let patch: DisplayParametersPatch = deserialize(patch_js, "Invalid display parameters")?;
        Ok(self.session.set_display_parameters(&patch))
    }

    #[wasm_bindgen(js_name = displayParameters)]
    pub fn display_parameters(&self) -> Result<JsValue, JsValue> {
        serialize(self.session.params(), "Failed to serialize display parameters")
    }

    #[wasm_bindgen(js_name = onViewportChange)]
    pub fn on_viewport_change(&mut self, width: f32) -> bool {
        self.session.on_viewport_change(width)
    }

    #[wasm_bindgen(js_name = resetDualWordSettings)]
    pub fn reset_dual_word_settings(&mut self) {
        self.session.reset_dual_word();
    }

    #[wasm_bindgen(js_name = stepShortNoteSize)]
    pub fn step_short_note_size(&mut self, delta: i32) -> bool {
        self.session.step_short_note_size(delta)
    }

    /// Current markup of a loaded verse
    #[wasm_bindgen(js_name = verseHtml)]
    pub fn verse_html(&self, ayah: u32) -> Option<String> {
        self.session.html(ayah)
    }

    #[wasm_bindgen(js_name = verseCount)]
    pub fn verse_count(&self) -> usize {
        self.session.view().len()
    }
}
