//! Live re-styling of an already built lattice
//!
//! Re-assigns every parameter-driven property from a `DisplayParameters`
//! value: marker placement, size and spacing, short-note margin
//! compensation, and dual-word presentation. Anchors and text are never
//! touched. Work is proportional to the number of markers and dual units,
//! not to the length of the text, and the result depends only on the
//! parameters, so repeated calls converge immediately.

use super::notes::{marker_style, switch_notes_mode};
use crate::models::{DisplayParameters, Lattice, MarkerKind};

/// Font size at which the compensation curve is anchored, px
const BASELINE_SHORT_NOTE_PX: f32 = 14.0;

/// Negative left margin for the glyph after a short note of `label_len`
/// characters at `font_px`, or `None` when under a pixel.
///
/// The superscript gloss is wider than its anchor character, so the next
/// glyph is pulled left by a fraction of the gloss's estimated width. The
/// fraction follows three bands: under 10px, 10-14px, and over 14px.
pub fn short_note_margin(font_px: f32, label_len: usize) -> Option<f32> {
    let ratio = font_px / BASELINE_SHORT_NOTE_PX;
    let char_width = font_px * (0.45 + ratio * 0.05);
    let gloss_width = label_len as f32 * char_width;

    let factor = if font_px < 10.0 {
        0.2 + ratio * 0.3
    } else if font_px < BASELINE_SHORT_NOTE_PX {
        0.5 + (ratio - 0.714) * 0.6
    } else if font_px > BASELINE_SHORT_NOTE_PX {
        0.8 + (ratio - 1.0) * 0.2
    } else {
        0.8
    };

    let margin = -(gloss_width * factor);
    if margin <= -1.0 {
        Some(margin)
    } else {
        None
    }
}

/// Re-apply `params` to `lattice` in place
pub fn apply_display_parameters(lattice: &mut Lattice, params: &DisplayParameters) {
    switch_notes_mode(lattice, params.notes_display_mode);

    let addrs = lattice.marker_addrs().to_vec();
    for addr in addrs {
        let Some(marker) = lattice.marker_mut(addr) else {
            continue;
        };
        marker.style = marker_style(marker.kind, params);

        if marker.kind == MarkerKind::ShortNote {
            let margin = short_note_margin(params.short_note_size, marker.label.chars().count());
            if let Some(slot) = lattice.next_sibling_margin(addr.glyph) {
                *slot = margin;
            }
        }
    }

    lattice.for_each_dual_mut(|dual| {
        if dual.style != params.dual_word {
            dual.style = params.dual_word.clone();
        }
    });
}

/// Pure form: a re-styled copy of `lattice`
pub fn restyle(lattice: &Lattice, params: &DisplayParameters) -> Lattice {
    let mut out = lattice.clone();
    apply_display_parameters(&mut out, params);
    out
}
