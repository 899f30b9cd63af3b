//! Lattice to reader markup
//!
//! Every source character becomes a `span.styled-char` carrying its
//! `data-index`, so the page can address any character directly. Dual
//! units become `span.dual-word > span.top-word + span.bottom-word` with
//! the top word's glyphs still individually addressable. All text and
//! attribute values are escaped; note text that contains markup ends up
//! in `data-notetext` and is decoded by the page when the note is opened.

use crate::models::{DualUnit, Glyph, Lattice, LatticeUnit, MarkerKind, MarkerPlacement, NoteMarker};
use std::fmt::Write;

/// Escape text for use in element content or a quoted attribute
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        push_escaped(&mut out, ch);
    }
    out
}

fn push_escaped(out: &mut String, ch: char) {
    match ch {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        '"' => out.push_str("&quot;"),
        '\'' => out.push_str("&#39;"),
        _ => out.push(ch),
    }
}

/// Inline style declarations in insertion order
#[derive(Default)]
struct Css {
    decls: Vec<(&'static str, String)>,
}

impl Css {
    fn set(&mut self, property: &'static str, value: impl Into<String>) -> &mut Self {
        self.decls.push((property, value.into()));
        self
    }

    fn write_attr(&self, out: &mut String) {
        if self.decls.is_empty() {
            return;
        }
        out.push_str(" style=\"");
        for (property, value) in &self.decls {
            out.push_str(property);
            out.push(':');
            out.push_str(&escape_html(value));
            out.push(';');
        }
        out.push('"');
    }
}

pub fn render_html(lattice: &Lattice) -> String {
    let mut out = String::with_capacity(lattice.char_count() * 48);
    for unit in lattice.units() {
        match unit {
            LatticeUnit::Char(glyph) => write_glyph(&mut out, glyph),
            LatticeUnit::Dual(dual) => write_dual(&mut out, dual),
        }
    }
    out
}

fn write_glyph(out: &mut String, glyph: &Glyph) {
    let mut css = Css::default();
    if let Some(colour) = &glyph.style.colour {
        css.set("color", colour.css());
    }
    if let Some(colour) = &glyph.style.background {
        css.set("background-color", colour.css());
    }
    if let Some(colour) = &glyph.style.underline {
        css.set("text-decoration", "underline")
            .set("text-decoration-color", colour.css());
    }
    if glyph.has_superscript() {
        css.set("position", "relative");
    }
    if let Some(margin) = glyph.lead_margin {
        css.set("margin-left", format!("{}px", margin));
    }

    let _ = write!(out, "<span class=\"styled-char\" data-index=\"{}\"", glyph.index);
    css.write_attr(out);
    out.push('>');
    push_escaped(out, glyph.ch);
    for marker in &glyph.markers {
        write_marker(out, marker);
    }
    out.push_str("</span>");
}

fn write_marker(out: &mut String, marker: &NoteMarker) {
    let style = &marker.style;
    let mut css = Css::default();

    match marker.placement {
        MarkerPlacement::Superscript => {
            css.set("position", "absolute")
                .set("top", "-1.2em")
                .set("left", "0")
                .set("width", "max-content")
                .set("pointer-events", "auto")
                .set("background", "transparent")
                .set("font-size", style.font_size.css());
            if marker.kind == MarkerKind::ShortNote {
                css.set("color", "black").set("font-style", "normal");
            }
            css.set("z-index", "2").set("cursor", "pointer");
        }
        MarkerPlacement::Inline => {
            css.set("font-size", style.font_size.css()).set("top", "-1.2em");
        }
    }
    css.set("margin-left", format!("{}px", style.margin_x))
        .set("margin-right", format!("{}px", style.margin_x))
        .set("margin-top", format!("{}px", style.margin_y))
        .set("margin-bottom", format!("{}px", style.margin_y));

    let _ = write!(
        out,
        "<span class=\"{}\" data-notetext=\"{}\" data-notetype=\"{}\"",
        marker.class_name(),
        escape_html(&marker.note_text),
        escape_html(&marker.title)
    );
    css.write_attr(out);
    out.push('>');
    out.push_str(&escape_html(&marker.label));
    out.push_str("</span>");
}

fn write_dual(out: &mut String, dual: &DualUnit) {
    let s = &dual.style;

    let mut outer = Css::default();
    outer
        .set("flex-direction", s.direction.clone())
        .set("align-items", s.alignment.clone())
        .set("margin", format!("0 {}em", s.margin))
        .set("padding", format!("{}px", s.padding))
        .set("gap", format!("{}em", s.gap));
    if let Some(margin) = dual.lead_margin {
        outer.set("margin-left", format!("{}px", margin));
    }

    let word_css = |font_size: f32, offset: f32| {
        let mut css = Css::default();
        css.set("font-size", format!("{}em", font_size))
            .set("line-height", s.line_height.to_string())
            .set("letter-spacing", format!("{}em", s.letter_spacing))
            .set("transform", format!("translateY({}px)", offset));
        css
    };

    let _ = write!(
        out,
        "<span class=\"dual-word\" data-start=\"{}\" data-end=\"{}\" data-top-size=\"{}\" data-bottom-size=\"{}\" data-spacing=\"{}\"",
        dual.range.start(), dual.range.end(), dual.top_size, dual.bottom_size, dual.spacing
    );
    outer.write_attr(out);
    out.push('>');

    out.push_str("<span class=\"top-word\"");
    word_css(s.top_font_size, s.top_offset).write_attr(out);
    out.push('>');
    for glyph in &dual.top {
        write_glyph(out, glyph);
    }
    out.push_str("</span>");

    out.push_str("<span class=\"bottom-word\"");
    word_css(s.bottom_font_size, s.bottom_offset).write_attr(out);
    out.push('>');
    out.push_str(&escape_html(&dual.bottom_word));
    out.push_str("</span></span>");
}

/// Markup shown in place of a verse that could not be built
pub fn render_failure(message: &str) -> String {
    format!(
        "<i class=\"verse-error\" style=\"color:#9ca3af\">{}</i>",
        escape_html(message)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compositor::compose_rows;
    use crate::lookup::TypeLookup;
    use crate::models::{AnnotationKind, AnnotationRow, DisplayParameters, NotesDisplayMode};

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<b>"a" & 'b'</b>"#), "&lt;b&gt;&quot;a&quot; &amp; &#39;b&#39;&lt;/b&gt;");
    }

    #[test]
    fn test_plain_text_renders_one_span_per_char() {
        let c = compose_rows("a<b", &[], &TypeLookup::new(), &DisplayParameters::default());
        let html = render_html(&c.lattice);
        assert_eq!(
            html,
            "<span class=\"styled-char\" data-index=\"0\">a</span>\
             <span class=\"styled-char\" data-index=\"1\">&lt;</span>\
             <span class=\"styled-char\" data-index=\"2\">b</span>"
        );
    }

    #[test]
    fn test_decorations_and_markers_render() {
        let rows = vec![
            AnnotationRow::new(AnnotationKind::Highlight, 1, 1).with_colour("ffff00"),
            AnnotationRow::new(AnnotationKind::Notes, 1, 1).with_note("Tafsir", "<p>see</p>"),
        ];
        let params = DisplayParameters {
            notes_display_mode: NotesDisplayMode::Inline,
            ..DisplayParameters::default()
        };
        let html = render_html(&compose_rows("abc", &rows, &TypeLookup::new(), &params).lattice);

        assert!(html.contains("data-index=\"1\" style=\"background-color:#ffff00;\""));
        assert!(html.contains("class=\"note-icon\" data-notetext=\"&lt;p&gt;see&lt;/p&gt;\" data-notetype=\"Tafsir\""));
        assert!(html.contains("font-size:60%;top:-1.2em;margin-left:-3px;"));
    }

    #[test]
    fn test_superscript_anchor_is_relative() {
        let rows = vec![AnnotationRow::new(AnnotationKind::ShortNote, 0, 0).with_short_note("lit.")];
        let html = render_html(&compose_rows("ab", &rows, &TypeLookup::new(), &DisplayParameters::default()).lattice);

        assert!(html.starts_with("<span class=\"styled-char\" data-index=\"0\" style=\"position:relative;\">a"));
        assert!(html.contains("class=\"short-note-superscript\""));
        assert!(html.contains("font-size:10px;color:black;font-style:normal;"));
        // the following glyph is pulled left to make room
        assert!(html.contains("data-index=\"1\" style=\"margin-left:-"));
    }

    #[test]
    fn test_dual_word_markup() {
        let rows = vec![AnnotationRow::new(AnnotationKind::Parallel, 0, 1).with_parallel("ق")];
        let html = render_html(&compose_rows("ab c", &rows, &TypeLookup::new(), &DisplayParameters::default()).lattice);

        assert!(html.starts_with("<span class=\"dual-word\" data-start=\"0\" data-end=\"1\""));
        assert!(html.contains("<span class=\"top-word\" style=\"font-size:1em;line-height:0;letter-spacing:0em;transform:translateY(5px);\">"));
        assert!(html.contains("<span class=\"bottom-word\" style=\"font-size:0.7em;line-height:0;letter-spacing:0em;transform:translateY(10px);\">ق</span>"));
        assert!(html.contains("data-index=\"0\">a</span><span class=\"styled-char\" data-index=\"1\">b</span></span>"));
    }

    #[test]
    fn test_failure_markup_is_escaped() {
        assert_eq!(
            render_failure("fetch <failed>"),
            "<i class=\"verse-error\" style=\"color:#9ca3af\">fetch &lt;failed&gt;</i>"
        );
    }
}
