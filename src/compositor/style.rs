//! Style passes: font colour, highlight, underline
//!
//! Each pass only ever sets its own property, so the three passes stack on
//! the same glyph and their relative order does not matter. Within a pass a
//! later range overwrites an earlier one's colour.

use super::range_index::{RangeIndex, StyleRange};
use super::CompositionIssue;
use crate::models::{CharStyle, Colour, Lattice};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StylePass {
    FontColour,
    Highlight,
    Underline,
}

impl StylePass {
    pub const ORDER: [StylePass; 3] = [StylePass::FontColour, StylePass::Highlight, StylePass::Underline];

    pub fn label(&self) -> &'static str {
        match self {
            StylePass::FontColour => "font colour",
            StylePass::Highlight => "highlight",
            StylePass::Underline => "underline",
        }
    }

    fn apply(&self, style: &mut CharStyle, colour: &Colour) {
        let slot = match self {
            StylePass::FontColour => &mut style.colour,
            StylePass::Highlight => &mut style.background,
            StylePass::Underline => &mut style.underline,
        };
        *slot = Some(colour.clone());
    }

    fn ranges<'a>(&self, index: &'a RangeIndex) -> &'a [StyleRange] {
        match self {
            StylePass::FontColour => &index.font_styles,
            StylePass::Highlight => &index.highlight_styles,
            StylePass::Underline => &index.underline_styles,
        }
    }
}

/// Run one pass. Indices with no glyph (past the end of the text) are
/// target misses: skipped, and reported once per range.
pub fn apply_style_pass(
    lattice: &mut Lattice,
    pass: StylePass,
    ranges: &[StyleRange],
    issues: &mut Vec<CompositionIssue>,
) {
    for style in ranges {
        let mut missing = 0;
        for i in style.range.indices() {
            match lattice.glyph_mut(i) {
                Some(glyph) => pass.apply(&mut glyph.style, &style.colour),
                None => missing += 1,
            }
        }

        if missing > 0 {
            log::debug!(
                "{} range {}..={} missed {} of {} characters",
                pass.label(),
                style.range.start(),
                style.range.end(),
                missing,
                style.range.len()
            );
            issues.push(CompositionIssue::TargetMiss {
                target: pass.label(),
                start: style.range.start(),
                end: style.range.end(),
                missing,
            });
        }
    }
}

/// All three passes in their fixed order
pub fn apply_styles(lattice: &mut Lattice, index: &RangeIndex, issues: &mut Vec<CompositionIssue>) {
    for pass in StylePass::ORDER {
        apply_style_pass(lattice, pass, pass.ranges(index), issues);
    }
}
