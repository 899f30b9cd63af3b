//! Note attachment
//!
//! Notes attach after every style pass, to the glyph at their anchor. A
//! regular note follows the global display mode; a short note is always
//! superscript text. Switching the mode later moves existing regular
//! markers between placements in place, keeping their content.

use super::range_index::NoteEntry;
use super::CompositionIssue;
use crate::lookup::NoteTypeResolver;
use crate::models::{
    DisplayParameters, FontSize, Lattice, MarkerKind, MarkerPlacement, MarkerStyle, NoteMarker,
    NotesDisplayMode,
};

const SHORT_NOTE_TITLE: &str = "ShortNote";

pub fn placement_for(kind: MarkerKind, mode: NotesDisplayMode) -> MarkerPlacement {
    match (kind, mode) {
        (MarkerKind::ShortNote, _) => MarkerPlacement::Superscript,
        (MarkerKind::Note, NotesDisplayMode::Superscript) => MarkerPlacement::Superscript,
        (MarkerKind::Note, NotesDisplayMode::Inline) => MarkerPlacement::Inline,
    }
}

pub fn marker_style(kind: MarkerKind, params: &DisplayParameters) -> MarkerStyle {
    let font_size = match kind {
        MarkerKind::Note => FontSize::Percent(params.note_icon_size),
        MarkerKind::ShortNote => FontSize::Px(params.short_note_size),
    };
    MarkerStyle {
        font_size,
        margin_x: params.note_icon_spacing,
        margin_y: params.note_icon_vertical_spacing,
    }
}

pub fn build_marker(entry: &NoteEntry, resolver: &dyn NoteTypeResolver, params: &DisplayParameters) -> NoteMarker {
    let (label, title) = match entry.kind {
        MarkerKind::Note => (
            resolver.resolve_icon(&entry.note_type),
            resolver.resolve_title(&entry.note_type),
        ),
        MarkerKind::ShortNote => (entry.text.clone(), SHORT_NOTE_TITLE.to_string()),
    };

    NoteMarker {
        kind: entry.kind,
        placement: placement_for(entry.kind, params.notes_display_mode),
        label,
        note_text: entry.text.clone(),
        title,
        style: marker_style(entry.kind, params),
    }
}

pub fn attach_notes(
    lattice: &mut Lattice,
    notes: &[NoteEntry],
    resolver: &dyn NoteTypeResolver,
    params: &DisplayParameters,
    issues: &mut Vec<CompositionIssue>,
) {
    for entry in notes {
        let marker = build_marker(entry, resolver, params);
        if !lattice.attach_marker(entry.position, marker) {
            log::debug!("note anchor {} is outside the text", entry.position);
            issues.push(CompositionIssue::TargetMiss {
                target: "note",
                start: entry.position,
                end: entry.position,
                missing: 1,
            });
        }
    }
}

/// Move regular markers to the placement for `mode`. Markers already in
/// that placement are left alone, so repeating a switch changes nothing.
/// Returns how many markers moved.
pub fn switch_notes_mode(lattice: &mut Lattice, mode: NotesDisplayMode) -> usize {
    let addrs = lattice.marker_addrs().to_vec();
    let mut moved = 0;
    for addr in addrs {
        if let Some(marker) = lattice.marker_mut(addr) {
            let target = placement_for(marker.kind, mode);
            if marker.placement != target {
                marker.placement = target;
                moved += 1;
            }
        }
    }
    moved
}
