//! The display settings store
//!
//! Owns the process-wide `DisplayParameters`: loads them once from a
//! `KeyValueStore`, merges partial updates, persists every change straight
//! away and tells subscribers synchronously. Callers that keep rendered
//! lattices re-style them from the same call (see `ReaderSession`), so a
//! new value is never visible before it has been applied.

use super::storage::KeyValueStore;
use crate::models::{
    clamp_short_note_size, DisplayParameters, DisplayParametersPatch, DualWordSettingsPatch,
    NotesDisplayMode, ViewportProfile,
};
use std::fmt;
use std::str::FromStr;

/// Persisted keys, shared with the page's own settings panel
pub mod keys {
    pub const NOTES_DISPLAY_MODE: &str = "notesDisplayMode";
    pub const NOTE_ICON_SIZE: &str = "noteIconSize";
    pub const NOTE_ICON_SPACING: &str = "noteIconSpacing";
    pub const NOTE_ICON_VERTICAL_SPACING: &str = "noteIconVerticalSpacing";
    pub const SHORT_NOTE_SIZE: &str = "shortnoteSize";
    pub const DUAL_WORD_SETTINGS: &str = "dualWordSettings";
}

pub type Subscriber = Box<dyn FnMut(&DisplayParameters)>;

pub struct SettingsStore {
    storage: Box<dyn KeyValueStore>,
    profile: ViewportProfile,
    params: DisplayParameters,
    dual_word_customized: bool,
    subscribers: Vec<Subscriber>,
}

impl fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsStore")
            .field("profile", &self.profile)
            .field("params", &self.params)
            .field("dual_word_customized", &self.dual_word_customized)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

fn read_raw(storage: &dyn KeyValueStore, key: &str) -> Option<String> {
    match storage.get(key) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("cannot read setting '{}': {}", key, e);
            None
        }
    }
}

fn read_parsed<T: FromStr>(storage: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = read_raw(storage, key)?;
    let value = raw.trim().trim_matches('"');
    match value.parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            log::warn!("ignoring malformed setting '{}' = '{}'", key, raw);
            None
        }
    }
}

fn read_f32(storage: &dyn KeyValueStore, key: &str) -> Option<f32> {
    read_parsed::<f32>(storage, key).filter(|v| v.is_finite())
}

impl SettingsStore {
    /// Load persisted settings, falling back per key to the defaults of
    /// the profile selected by `viewport_width`
    pub fn load(storage: Box<dyn KeyValueStore>, viewport_width: f32) -> Self {
        let profile = ViewportProfile::from_width(viewport_width);
        let mut params = DisplayParameters::for_profile(profile);
        let s = storage.as_ref();

        if let Some(mode) = read_parsed::<NotesDisplayMode>(s, keys::NOTES_DISPLAY_MODE) {
            params.notes_display_mode = mode;
        }
        if let Some(v) = read_f32(s, keys::NOTE_ICON_SIZE) {
            params.note_icon_size = v;
        }
        if let Some(v) = read_f32(s, keys::NOTE_ICON_SPACING) {
            params.note_icon_spacing = v;
        }
        if let Some(v) = read_f32(s, keys::NOTE_ICON_VERTICAL_SPACING) {
            params.note_icon_vertical_spacing = v;
        }
        if let Some(v) = read_f32(s, keys::SHORT_NOTE_SIZE) {
            params.short_note_size = clamp_short_note_size(v);
        }

        if let Some(raw) = read_raw(s, keys::DUAL_WORD_SETTINGS) {
            match serde_json::from_str::<DualWordSettingsPatch>(&raw) {
                Ok(saved) => saved.apply_to(&mut params.dual_word),
                Err(e) => log::warn!("ignoring malformed dual word settings: {}", e),
            }
        }

        // Saved settings equal to some profile's defaults are not a user
        // choice; follow the current viewport instead
        let dual_word_customized = !params.dual_word.matches_any_profile();
        if !dual_word_customized {
            params.dual_word = profile.dual_word_defaults();
        }

        log::debug!(
            "loaded display settings ({:?} profile, customized dual words: {})",
            profile,
            dual_word_customized
        );

        Self {
            storage,
            profile,
            params,
            dual_word_customized,
            subscribers: Vec::new(),
        }
    }

    pub fn params(&self) -> &DisplayParameters {
        &self.params
    }

    pub fn profile(&self) -> ViewportProfile {
        self.profile
    }

    pub fn is_dual_word_customized(&self) -> bool {
        self.dual_word_customized
    }

    /// Called synchronously after every change, in subscription order
    pub fn subscribe(&mut self, subscriber: impl FnMut(&DisplayParameters) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Merge `patch`, persist and notify. Returns false when nothing changed.
    pub fn update(&mut self, patch: &DisplayParametersPatch) -> bool {
        if !self.params.apply_patch(patch) {
            return false;
        }
        if patch.dual_word.is_some() {
            self.dual_word_customized = !self.params.dual_word.matches_any_profile();
        }
        self.persist();
        self.notify();
        true
    }

    /// Step the short-note size by whole pixels within its bounds
    pub fn step_short_note_size(&mut self, delta: i32) -> bool {
        let target = clamp_short_note_size(self.params.short_note_size + delta as f32);
        self.update(&DisplayParametersPatch {
            short_note_size: Some(target),
            ..Default::default()
        })
    }

    /// Back to the current profile's dual-word defaults
    pub fn reset_dual_word(&mut self) {
        self.params.dual_word = self.profile.dual_word_defaults();
        self.dual_word_customized = false;
        if let Err(e) = self.storage.remove(keys::DUAL_WORD_SETTINGS) {
            log::warn!("cannot clear dual word settings: {}", e);
        }
        self.notify();
    }

    /// Track a viewport resize. Crossing the mobile/desktop boundary swaps
    /// in the new profile's dual-word defaults unless the user has
    /// customized them. Returns true when the parameters changed.
    pub fn on_viewport_change(&mut self, width: f32) -> bool {
        let profile = ViewportProfile::from_width(width);
        if profile == self.profile {
            return false;
        }
        self.profile = profile;
        if self.dual_word_customized {
            return false;
        }

        self.params.dual_word = profile.dual_word_defaults();
        self.persist();
        self.notify();
        true
    }

    fn persist(&mut self) {
        let p = &self.params;
        let dual = match serde_json::to_string(&p.dual_word) {
            Ok(json) => Some(json),
            Err(e) => {
                log::warn!("cannot encode dual word settings: {}", e);
                None
            }
        };

        let mut entries = vec![
            (keys::NOTES_DISPLAY_MODE, p.notes_display_mode.as_str().to_string()),
            (keys::NOTE_ICON_SIZE, p.note_icon_size.to_string()),
            (keys::NOTE_ICON_SPACING, p.note_icon_spacing.to_string()),
            (keys::NOTE_ICON_VERTICAL_SPACING, p.note_icon_vertical_spacing.to_string()),
            (keys::SHORT_NOTE_SIZE, p.short_note_size.to_string()),
        ];
        if let Some(json) = dual {
            entries.push((keys::DUAL_WORD_SETTINGS, json));
        }

        for (key, value) in entries {
            if let Err(e) = self.storage.set(key, &value) {
                log::warn!("cannot persist setting '{}': {}", key, e);
            }
        }
    }

    fn notify(&mut self) {
        for subscriber in self.subscribers.iter_mut() {
            subscriber(&self.params);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MemoryStore;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_defaults_when_storage_empty() {
        let store = SettingsStore::load(Box::new(MemoryStore::new()), 1280.0);
        assert_eq!(store.params(), &DisplayParameters::for_profile(ViewportProfile::Desktop));
        assert!(!store.is_dual_word_customized());
    }

    #[test]
    fn test_corrupt_values_fall_back_per_key() {
        let storage = MemoryStore::with_values([
            (keys::NOTES_DISPLAY_MODE, "sideways"),
            (keys::NOTE_ICON_SIZE, "75"),
            (keys::NOTE_ICON_SPACING, "lots"),
            (keys::DUAL_WORD_SETTINGS, "{broken"),
        ]);
        let store = SettingsStore::load(Box::new(storage), 1280.0);
        let p = store.params();

        assert_eq!(p.notes_display_mode, NotesDisplayMode::Superscript);
        assert_eq!(p.note_icon_size, 75.0);
        assert_eq!(p.note_icon_spacing, -3.0);
        assert_eq!(p.dual_word, ViewportProfile::Desktop.dual_word_defaults());
    }

    #[test]
    fn test_saved_profile_defaults_follow_viewport() {
        let mobile_json = serde_json::to_string(&ViewportProfile::Mobile.dual_word_defaults()).unwrap();
        let storage = MemoryStore::with_values([(keys::DUAL_WORD_SETTINGS, mobile_json.as_str())]);
        let store = SettingsStore::load(Box::new(storage), 1280.0);

        assert!(!store.is_dual_word_customized());
        assert_eq!(store.params().dual_word, ViewportProfile::Desktop.dual_word_defaults());
    }

    #[test]
    fn test_update_notifies_subscribers() {
        let mut store = SettingsStore::load(Box::new(MemoryStore::new()), 1280.0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        store.subscribe(move |p| sink.borrow_mut().push(p.notes_display_mode));

        assert!(store.update(&DisplayParametersPatch::notes_mode(NotesDisplayMode::Inline)));
        assert!(!store.update(&DisplayParametersPatch::notes_mode(NotesDisplayMode::Inline)));

        assert_eq!(*seen.borrow(), vec![NotesDisplayMode::Inline]);
    }

    #[test]
    fn test_short_note_stepping_is_bounded() {
        let mut store = SettingsStore::load(Box::new(MemoryStore::new()), 1280.0);
        assert!(store.step_short_note_size(1));
        assert_eq!(store.params().short_note_size, 11.0);

        for _ in 0..40 {
            store.step_short_note_size(-1);
        }
        assert_eq!(store.params().short_note_size, 8.0);
        assert!(!store.step_short_note_size(-1));
    }

    #[test]
    fn test_viewport_change_respects_customization() {
        let mut store = SettingsStore::load(Box::new(MemoryStore::new()), 1280.0);
        assert!(store.on_viewport_change(500.0));
        assert_eq!(store.params().dual_word.bottom_offset, -4.0);
        assert!(!store.on_viewport_change(600.0));

        store.update(&DisplayParametersPatch {
            dual_word: Some(DualWordSettingsPatch {
                top_font_size: Some(1.4),
                ..Default::default()
            }),
            ..Default::default()
        });
        assert!(store.is_dual_word_customized());
        assert!(!store.on_viewport_change(1280.0));
        assert_eq!(store.params().dual_word.top_font_size, 1.4);

        store.reset_dual_word();
        assert_eq!(store.params().dual_word, ViewportProfile::Desktop.dual_word_defaults());
        assert!(!store.is_dual_word_customized());
    }
}
