//! Note type lookup
//!
//! Regular notes carry a `NoteType` that maps to a display icon and title
//! through the type lookup sheet. Lookups never fail: an unknown type, or a
//! lookup that has not been loaded yet, resolves to the default glyph and
//! a title derived from the raw type.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_NOTE_ICON: &str = "📝";
pub const DEFAULT_NOTE_TITLE: &str = "Note";

/// Resolves a note type to its marker icon and dialog title
pub trait NoteTypeResolver {
    fn resolve_icon(&self, note_type: &str) -> String;
    fn resolve_title(&self, note_type: &str) -> String;
}

/// One row of the type lookup sheet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeEntry {
    #[serde(rename = "NoteType", default)]
    pub note_type: String,
    #[serde(rename = "Icon", default)]
    pub icon: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeLookup {
    entries: HashMap<String, TypeEntry>,
    loaded: bool,
}

impl TypeLookup {
    /// An unloaded lookup; every query takes the defaults
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: impl IntoIterator<Item = TypeEntry>) -> Self {
        let entries = entries
            .into_iter()
            .filter(|e| !e.note_type.trim().is_empty())
            .map(|e| (e.note_type.trim().to_string(), e))
            .collect();
        Self { entries, loaded: true }
    }

    /// Build from raw sheet rows in column order. The sheet's first row
    /// holds the real header names; the rest are entries.
    pub fn from_sheet_rows(rows: &[Vec<String>]) -> Self {
        let Some((header, body)) = rows.split_first() else {
            log::warn!("type lookup sheet is empty");
            return Self::from_entries(Vec::new());
        };

        let column = |name: &str| header.iter().position(|h| h.trim() == name);
        let (Some(type_col), icon_col) = (column("NoteType"), column("Icon")) else {
            log::warn!("type lookup sheet has no NoteType column");
            return Self::from_entries(Vec::new());
        };

        let entries = body.iter().map(|row| TypeEntry {
            note_type: row.get(type_col).cloned().unwrap_or_default(),
            icon: icon_col
                .and_then(|c| row.get(c))
                .cloned()
                .unwrap_or_default(),
        });
        Self::from_entries(entries)
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, note_type: &str) -> Option<&TypeEntry> {
        self.entries.get(note_type.trim())
    }
}

impl NoteTypeResolver for TypeLookup {
    fn resolve_icon(&self, note_type: &str) -> String {
        match self.get(note_type) {
            Some(entry) if !entry.icon.trim().is_empty() => entry.icon.trim().to_string(),
            Some(_) => DEFAULT_NOTE_ICON.to_string(),
            None => {
                if self.loaded {
                    log::debug!("no icon for note type '{}'", note_type);
                }
                DEFAULT_NOTE_ICON.to_string()
            }
        }
    }

    fn resolve_title(&self, note_type: &str) -> String {
        let raw = note_type.trim();
        let from_entry = self
            .get(raw)
            .map(|e| e.note_type.trim())
            .filter(|t| !t.is_empty());

        match (from_entry, raw.is_empty()) {
            (Some(title), _) => title.to_string(),
            (None, false) => raw.to_string(),
            (None, true) => DEFAULT_NOTE_TITLE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet() -> Vec<Vec<String>> {
        vec![
            vec!["NoteType".into(), "Icon".into(), "Description".into()],
            vec!["Tafsir".into(), "📖".into(), "Commentary".into()],
            vec!["Grammar".into(), "".into(), "".into()],
        ]
    }

    #[test]
    fn test_header_row_remap() {
        let lookup = TypeLookup::from_sheet_rows(&sheet());
        assert!(lookup.is_loaded());
        assert_eq!(lookup.len(), 2);
        assert_eq!(lookup.resolve_icon("Tafsir"), "📖");
        assert_eq!(lookup.resolve_title("Tafsir"), "Tafsir");
    }

    #[test]
    fn test_entry_without_icon_uses_default_glyph() {
        let lookup = TypeLookup::from_sheet_rows(&sheet());
        assert_eq!(lookup.resolve_icon("Grammar"), DEFAULT_NOTE_ICON);
    }

    #[test]
    fn test_unknown_and_unloaded_lookups_fail_soft() {
        let unloaded = TypeLookup::new();
        assert!(!unloaded.is_loaded());
        assert_eq!(unloaded.resolve_icon("Tafsir"), DEFAULT_NOTE_ICON);
        assert_eq!(unloaded.resolve_title("Tafsir"), "Tafsir");
        assert_eq!(unloaded.resolve_title(""), DEFAULT_NOTE_TITLE);

        let loaded = TypeLookup::from_sheet_rows(&sheet());
        assert_eq!(loaded.resolve_icon("Missing"), DEFAULT_NOTE_ICON);
        assert_eq!(loaded.resolve_title("Missing"), "Missing");
    }

    #[test]
    fn test_sheet_without_type_column() {
        let rows = vec![vec!["Name".to_string()], vec!["x".to_string()]];
        let lookup = TypeLookup::from_sheet_rows(&rows);
        assert!(lookup.is_loaded());
        assert!(lookup.is_empty());
    }
}
