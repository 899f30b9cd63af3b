//! Live-tunable display parameters
//!
//! These are the reader settings that change how already-composited verses
//! look without changing what they contain: note marker size and spacing,
//! notes display mode, short-note size and the dual-word presentation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Viewports at or below this width use the mobile dual-word profile
pub const MOBILE_MAX_WIDTH: f32 = 768.0;

pub const MIN_SHORT_NOTE_SIZE: f32 = 8.0;
pub const MAX_SHORT_NOTE_SIZE: f32 = 28.0;

/// How regular notes are attached to their anchor character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotesDisplayMode {
    #[default]
    Superscript,
    Inline,
}

impl NotesDisplayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotesDisplayMode::Superscript => "superscript",
            NotesDisplayMode::Inline => "inline",
        }
    }
}

impl fmt::Display for NotesDisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotesDisplayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_matches('"') {
            "superscript" => Ok(NotesDisplayMode::Superscript),
            "inline" => Ok(NotesDisplayMode::Inline),
            other => Err(format!("unknown notes display mode '{}'", other)),
        }
    }
}

/// Default profile selection by viewport width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewportProfile {
    Mobile,
    Desktop,
}

impl ViewportProfile {
    pub fn from_width(width: f32) -> Self {
        if width <= MOBILE_MAX_WIDTH {
            ViewportProfile::Mobile
        } else {
            ViewportProfile::Desktop
        }
    }

    pub fn dual_word_defaults(&self) -> DualWordSettings {
        match self {
            ViewportProfile::Mobile => DualWordSettings {
                line_height: 1.0,
                bottom_offset: -4.0,
                ..DualWordSettings::base()
            },
            ViewportProfile::Desktop => DualWordSettings {
                line_height: 0.0,
                bottom_offset: 10.0,
                ..DualWordSettings::base()
            },
        }
    }
}

/// Presentation of dual-word units
///
/// Font sizes are in em, offsets in px (vertical translation of each word).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DualWordSettings {
    pub direction: String,
    pub alignment: String,
    pub margin: f32,
    pub padding: f32,
    pub gap: f32,
    pub top_font_size: f32,
    pub bottom_font_size: f32,
    pub line_height: f32,
    pub letter_spacing: f32,
    pub top_offset: f32,
    pub bottom_offset: f32,
}

impl DualWordSettings {
    fn base() -> Self {
        Self {
            direction: "column".to_string(),
            alignment: "center".to_string(),
            margin: 0.0,
            padding: 0.0,
            gap: 0.0,
            top_font_size: 1.0,
            bottom_font_size: 0.7,
            line_height: 0.0,
            letter_spacing: 0.0,
            top_offset: 5.0,
            bottom_offset: 10.0,
        }
    }

    /// True when these settings equal either profile's defaults
    pub fn matches_any_profile(&self) -> bool {
        *self == ViewportProfile::Mobile.dual_word_defaults()
            || *self == ViewportProfile::Desktop.dual_word_defaults()
    }
}

/// Partial dual-word update; also the shape read back from storage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DualWordSettingsPatch {
    pub direction: Option<String>,
    pub alignment: Option<String>,
    pub margin: Option<f32>,
    pub padding: Option<f32>,
    pub gap: Option<f32>,
    pub top_font_size: Option<f32>,
    pub bottom_font_size: Option<f32>,
    pub line_height: Option<f32>,
    pub letter_spacing: Option<f32>,
    pub top_offset: Option<f32>,
    pub bottom_offset: Option<f32>,
}

impl DualWordSettingsPatch {
    pub fn apply_to(&self, settings: &mut DualWordSettings) {
        if let Some(v) = &self.direction {
            settings.direction = v.clone();
        }
        if let Some(v) = &self.alignment {
            settings.alignment = v.clone();
        }
        merge(&mut settings.margin, self.margin);
        merge(&mut settings.padding, self.padding);
        merge(&mut settings.gap, self.gap);
        merge(&mut settings.top_font_size, self.top_font_size);
        merge(&mut settings.bottom_font_size, self.bottom_font_size);
        merge(&mut settings.line_height, self.line_height);
        merge(&mut settings.letter_spacing, self.letter_spacing);
        merge(&mut settings.top_offset, self.top_offset);
        merge(&mut settings.bottom_offset, self.bottom_offset);
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Ignore non-finite values so a bad slider reading can't poison a setting
fn merge(slot: &mut f32, value: Option<f32>) {
    if let Some(v) = value.filter(|v| v.is_finite()) {
        *slot = v;
    }
}

/// The full set of live display parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayParameters {
    pub notes_display_mode: NotesDisplayMode,
    /// Note icon size, percent of the surrounding font size
    pub note_icon_size: f32,
    /// Horizontal margin around note markers, px
    pub note_icon_spacing: f32,
    /// Vertical margin around note markers, px
    pub note_icon_vertical_spacing: f32,
    /// Short-note font size, px
    pub short_note_size: f32,
    pub dual_word: DualWordSettings,
}

impl DisplayParameters {
    pub fn for_profile(profile: ViewportProfile) -> Self {
        Self {
            notes_display_mode: NotesDisplayMode::Superscript,
            note_icon_size: 60.0,
            note_icon_spacing: -3.0,
            note_icon_vertical_spacing: 0.0,
            short_note_size: 10.0,
            dual_word: profile.dual_word_defaults(),
        }
    }

    pub fn for_viewport(width: f32) -> Self {
        Self::for_profile(ViewportProfile::from_width(width))
    }

    /// Merge a partial update; returns true if anything changed
    pub fn apply_patch(&mut self, patch: &DisplayParametersPatch) -> bool {
        let before = self.clone();

        if let Some(mode) = patch.notes_display_mode {
            self.notes_display_mode = mode;
        }
        merge(&mut self.note_icon_size, patch.note_icon_size);
        merge(&mut self.note_icon_spacing, patch.note_icon_spacing);
        merge(&mut self.note_icon_vertical_spacing, patch.note_icon_vertical_spacing);
        merge(&mut self.short_note_size, patch.short_note_size);
        self.short_note_size = clamp_short_note_size(self.short_note_size);
        if let Some(dual) = &patch.dual_word {
            dual.apply_to(&mut self.dual_word);
        }

        *self != before
    }
}

impl Default for DisplayParameters {
    fn default() -> Self {
        Self::for_profile(ViewportProfile::Desktop)
    }
}

pub fn clamp_short_note_size(size: f32) -> f32 {
    size.clamp(MIN_SHORT_NOTE_SIZE, MAX_SHORT_NOTE_SIZE)
}

/// Partial update of `DisplayParameters`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplayParametersPatch {
    pub notes_display_mode: Option<NotesDisplayMode>,
    pub note_icon_size: Option<f32>,
    pub note_icon_spacing: Option<f32>,
    pub note_icon_vertical_spacing: Option<f32>,
    pub short_note_size: Option<f32>,
    pub dual_word: Option<DualWordSettingsPatch>,
}

impl DisplayParametersPatch {
    pub fn notes_mode(mode: NotesDisplayMode) -> Self {
        Self {
            notes_display_mode: Some(mode),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_by_width() {
        assert_eq!(ViewportProfile::from_width(768.0), ViewportProfile::Mobile);
        assert_eq!(ViewportProfile::from_width(1024.0), ViewportProfile::Desktop);

        let mobile = DisplayParameters::for_viewport(400.0);
        assert_eq!(mobile.dual_word.bottom_offset, -4.0);
        assert_eq!(mobile.dual_word.line_height, 1.0);

        let desktop = DisplayParameters::for_viewport(1400.0);
        assert_eq!(desktop.dual_word.bottom_offset, 10.0);
        assert_eq!(desktop.dual_word.top_font_size, 1.0);
        assert_eq!(desktop.dual_word.bottom_font_size, 0.7);
    }

    #[test]
    fn test_patch_merges_over_current_values() {
        let mut params = DisplayParameters::default();
        let changed = params.apply_patch(&DisplayParametersPatch {
            note_icon_size: Some(80.0),
            dual_word: Some(DualWordSettingsPatch {
                top_offset: Some(2.0),
                ..Default::default()
            }),
            ..Default::default()
        });

        assert!(changed);
        assert_eq!(params.note_icon_size, 80.0);
        assert_eq!(params.note_icon_spacing, -3.0);
        assert_eq!(params.dual_word.top_offset, 2.0);
        assert_eq!(params.dual_word.bottom_offset, 10.0);

        assert!(!params.apply_patch(&DisplayParametersPatch::default()));
    }

    #[test]
    fn test_short_note_size_is_clamped() {
        let mut params = DisplayParameters::default();
        params.apply_patch(&DisplayParametersPatch {
            short_note_size: Some(40.0),
            ..Default::default()
        });
        assert_eq!(params.short_note_size, MAX_SHORT_NOTE_SIZE);
    }

    #[test]
    fn test_non_finite_values_are_ignored() {
        let mut params = DisplayParameters::default();
        params.apply_patch(&DisplayParametersPatch {
            note_icon_spacing: Some(f32::NAN),
            ..Default::default()
        });
        assert_eq!(params.note_icon_spacing, -3.0);
    }

    #[test]
    fn test_customization_detection() {
        let mut dual = ViewportProfile::Mobile.dual_word_defaults();
        assert!(dual.matches_any_profile());
        dual.top_font_size = 1.3;
        assert!(!dual.matches_any_profile());
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let json = serde_json::to_value(DisplayParameters::default()).unwrap();
        assert_eq!(json["notesDisplayMode"], "superscript");
        assert_eq!(json["dualWord"]["topFontSize"], 1.0);
    }
}
