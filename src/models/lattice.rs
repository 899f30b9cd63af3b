//! The character lattice
//!
//! A lattice is the ordered sequence of renderable units for one verse's
//! translation text. Every source character lives in exactly one glyph:
//! either a plain `Char` unit or one of the top-word glyphs of a `Dual`
//! unit. The lattice keeps an index -> glyph address table so styling and
//! note attachment address any character in O(1), plus registries of
//! attached markers and dual units so re-styling only visits those.

use super::annotation::{CharRange, Colour, ParallelGloss};
use super::display::DualWordSettings;
use serde::Serialize;

/// Decorations composited onto one character
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharStyle {
    pub colour: Option<Colour>,
    pub background: Option<Colour>,
    pub underline: Option<Colour>,
}

impl CharStyle {
    pub fn is_plain(&self) -> bool {
        self.colour.is_none() && self.background.is_none() && self.underline.is_none()
    }
}

/// Regular notes show a type icon; short notes show their own text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerKind {
    Note,
    ShortNote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkerPlacement {
    /// In text flow right after the anchor character
    Inline,
    /// Absolutely positioned above the anchor character
    Superscript,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "unit", content = "value", rename_all = "camelCase")]
pub enum FontSize {
    Percent(f32),
    Px(f32),
}

impl FontSize {
    pub fn css(&self) -> String {
        match self {
            FontSize::Percent(v) => format!("{}%", v),
            FontSize::Px(v) => format!("{}px", v),
        }
    }
}

/// Tunable marker properties, all driven by `DisplayParameters`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerStyle {
    pub font_size: FontSize,
    /// Left and right margin, px
    pub margin_x: f32,
    /// Top and bottom margin, px
    pub margin_y: f32,
}

/// A note marker attached to its anchor glyph
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteMarker {
    pub kind: MarkerKind,
    pub placement: MarkerPlacement,
    /// Visible content: the type icon, or the short-note text
    pub label: String,
    /// Full note text (may contain markup; rendered escaped)
    pub note_text: String,
    pub title: String,
    pub style: MarkerStyle,
}

impl NoteMarker {
    pub fn class_name(&self) -> &'static str {
        match (self.kind, self.placement) {
            (MarkerKind::ShortNote, _) => "short-note-superscript",
            (MarkerKind::Note, MarkerPlacement::Superscript) => "note-superscript",
            (MarkerKind::Note, MarkerPlacement::Inline) => "note-icon",
        }
    }
}

/// One addressable source character
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Glyph {
    pub index: usize,
    pub ch: char,
    pub style: CharStyle,
    pub markers: Vec<NoteMarker>,
    /// Left margin pulled in to make room for a short note on the
    /// preceding glyph, px
    pub lead_margin: Option<f32>,
}

impl Glyph {
    pub fn new(index: usize, ch: char) -> Self {
        Self {
            index,
            ch,
            style: CharStyle::default(),
            markers: Vec::new(),
            lead_margin: None,
        }
    }

    pub fn has_superscript(&self) -> bool {
        self.markers
            .iter()
            .any(|m| m.placement == MarkerPlacement::Superscript)
    }
}

/// A consumed run shown as a top word over a bottom gloss
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DualUnit {
    pub range: CharRange,
    pub top: Vec<Glyph>,
    pub bottom_word: String,
    pub top_size: u32,
    pub bottom_size: u32,
    pub spacing: u32,
    pub style: DualWordSettings,
    pub lead_margin: Option<f32>,
}

impl DualUnit {
    pub fn top_text(&self) -> String {
        self.top.iter().map(|g| g.ch).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LatticeUnit {
    Char(Glyph),
    Dual(DualUnit),
}

impl LatticeUnit {
    fn lead_margin_mut(&mut self) -> &mut Option<f32> {
        match self {
            LatticeUnit::Char(glyph) => &mut glyph.lead_margin,
            LatticeUnit::Dual(dual) => &mut dual.lead_margin,
        }
    }
}

/// Where a glyph lives: a unit, and a top-word slot for dual units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphAddr {
    pub unit: usize,
    pub slot: Option<usize>,
}

/// Where a marker lives: its glyph and its position among that glyph's markers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerAddr {
    pub glyph: GlyphAddr,
    pub index: usize,
    pub slot: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lattice {
    units: Vec<LatticeUnit>,
    #[serde(skip)]
    addrs: Vec<Option<GlyphAddr>>,
    #[serde(skip)]
    markers: Vec<MarkerAddr>,
    #[serde(skip)]
    duals: Vec<usize>,
}

impl Lattice {
    pub fn with_capacity(char_count: usize) -> Self {
        Self {
            units: Vec::with_capacity(char_count),
            addrs: vec![None; char_count],
            markers: Vec::new(),
            duals: Vec::new(),
        }
    }

    /// Number of source characters this lattice covers
    pub fn char_count(&self) -> usize {
        self.addrs.len()
    }

    pub fn units(&self) -> &[LatticeUnit] {
        &self.units
    }

    pub(crate) fn push_char(&mut self, index: usize, ch: char) {
        let unit = self.units.len();
        self.units.push(LatticeUnit::Char(Glyph::new(index, ch)));
        if let Some(slot) = self.addrs.get_mut(index) {
            *slot = Some(GlyphAddr { unit, slot: None });
        }
    }

    pub(crate) fn push_dual(&mut self, gloss: &ParallelGloss, chars: &[char], style: &DualWordSettings) {
        let unit = self.units.len();
        let range = gloss.range;
        let top: Vec<Glyph> = range
            .indices()
            .filter_map(|i| chars.get(i).map(|ch| Glyph::new(i, *ch)))
            .collect();

        for (k, glyph) in top.iter().enumerate() {
            if let Some(slot) = self.addrs.get_mut(glyph.index) {
                *slot = Some(GlyphAddr { unit, slot: Some(k) });
            }
        }

        self.units.push(LatticeUnit::Dual(DualUnit {
            range,
            top,
            bottom_word: gloss.bottom_word.clone(),
            top_size: gloss.top_size,
            bottom_size: gloss.bottom_size,
            spacing: gloss.spacing,
            style: style.clone(),
            lead_margin: None,
        }));
        self.duals.push(unit);
    }

    fn glyph_at(&self, addr: GlyphAddr) -> Option<&Glyph> {
        match (self.units.get(addr.unit)?, addr.slot) {
            (LatticeUnit::Char(glyph), None) => Some(glyph),
            (LatticeUnit::Dual(dual), Some(k)) => dual.top.get(k),
            _ => None,
        }
    }

    fn glyph_at_mut(&mut self, addr: GlyphAddr) -> Option<&mut Glyph> {
        match (self.units.get_mut(addr.unit)?, addr.slot) {
            (LatticeUnit::Char(glyph), None) => Some(glyph),
            (LatticeUnit::Dual(dual), Some(k)) => dual.top.get_mut(k),
            _ => None,
        }
    }

    /// The glyph carrying source index `index`
    pub fn glyph(&self, index: usize) -> Option<&Glyph> {
        let addr = (*self.addrs.get(index)?)?;
        self.glyph_at(addr)
    }

    pub fn glyph_mut(&mut self, index: usize) -> Option<&mut Glyph> {
        let addr = (*self.addrs.get(index)?)?;
        self.glyph_at_mut(addr)
    }

    /// Attach a marker to the glyph at `index`; false on a target miss
    pub fn attach_marker(&mut self, index: usize, marker: NoteMarker) -> bool {
        let Some(addr) = self.addrs.get(index).copied().flatten() else {
            return false;
        };
        let Some(glyph) = self.glyph_at_mut(addr) else {
            return false;
        };
        glyph.markers.push(marker);
        let slot = glyph.markers.len() - 1;
        self.markers.push(MarkerAddr { glyph: addr, index, slot });
        true
    }

    pub fn marker_addrs(&self) -> &[MarkerAddr] {
        &self.markers
    }

    pub fn marker(&self, addr: MarkerAddr) -> Option<&NoteMarker> {
        self.glyph_at(addr.glyph)?.markers.get(addr.slot)
    }

    pub fn marker_mut(&mut self, addr: MarkerAddr) -> Option<&mut NoteMarker> {
        self.glyph_at_mut(addr.glyph)?.markers.get_mut(addr.slot)
    }

    /// Attached markers with their anchor indices, in attachment order
    pub fn markers(&self) -> impl Iterator<Item = (usize, &NoteMarker)> + '_ {
        self.markers
            .iter()
            .filter_map(move |addr| self.marker(*addr).map(|m| (addr.index, m)))
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// The lead-margin slot of whatever follows the glyph at `addr`. Inside
    /// a top word that is the next top glyph; after the last one it is the
    /// unit following the dual word. `None` at the end of the lattice.
    pub fn next_sibling_margin(&mut self, addr: GlyphAddr) -> Option<&mut Option<f32>> {
        let next_top = match (self.units.get(addr.unit)?, addr.slot) {
            (LatticeUnit::Dual(dual), Some(k)) => Some(k + 1).filter(|&n| n < dual.top.len()),
            (LatticeUnit::Char(_), None) => None,
            _ => return None,
        };
        match next_top {
            Some(n) => match self.units.get_mut(addr.unit)? {
                LatticeUnit::Dual(dual) => dual.top.get_mut(n).map(|g| &mut g.lead_margin),
                LatticeUnit::Char(_) => None,
            },
            None => self.units.get_mut(addr.unit + 1).map(LatticeUnit::lead_margin_mut),
        }
    }

    pub fn dual_count(&self) -> usize {
        self.duals.len()
    }

    /// Visit each dual unit without walking plain characters
    pub fn for_each_dual_mut(&mut self, mut f: impl FnMut(&mut DualUnit)) {
        for &unit in &self.duals {
            if let Some(LatticeUnit::Dual(dual)) = self.units.get_mut(unit) {
                f(dual);
            }
        }
    }

    /// Source indices in unit order; covers `0..char_count()` exactly once
    pub fn back_references(&self) -> Vec<usize> {
        let mut out = Vec::with_capacity(self.char_count());
        for unit in &self.units {
            match unit {
                LatticeUnit::Char(glyph) => out.push(glyph.index),
                LatticeUnit::Dual(dual) => out.extend(dual.top.iter().map(|g| g.index)),
            }
        }
        out
    }

    /// The source text read back from the glyphs
    pub fn text(&self) -> String {
        let mut out = String::with_capacity(self.char_count());
        for unit in &self.units {
            match unit {
                LatticeUnit::Char(glyph) => out.push(glyph.ch),
                LatticeUnit::Dual(dual) => out.extend(dual.top.iter().map(|g| g.ch)),
            }
        }
        out
    }
}
