//! End-to-end compositor behaviour on the public API

use ayah_compositor_wasm::compositor::{apply_display_parameters, restyle, CompositionIssue};
use ayah_compositor_wasm::lookup::{TypeEntry, TypeLookup};
use ayah_compositor_wasm::renderers::render_html;
use ayah_compositor_wasm::*;

fn compose_default(text: &str, rows: &[AnnotationRow]) -> Composition {
    compose_rows(text, rows, &TypeLookup::new(), &DisplayParameters::default())
}

fn inline() -> DisplayParameters {
    DisplayParameters {
        notes_display_mode: NotesDisplayMode::Inline,
        ..DisplayParameters::default()
    }
}

#[test]
fn test_coverage_with_dual_words() {
    let text = "the opening of the book";
    let rows = vec![
        AnnotationRow::new(AnnotationKind::Parallel, 4, 10).with_parallel("الفاتحة"),
        AnnotationRow::new(AnnotationKind::Parallel, 19, 22).with_parallel("الكتاب"),
    ];
    let c = compose_default(text, &rows);

    let expected: Vec<usize> = (0..text.chars().count()).collect();
    assert_eq!(c.lattice.back_references(), expected);
    assert_eq!(c.lattice.text(), text);
    assert_eq!(c.lattice.dual_count(), 2);
    assert!(c.issues.is_empty());
}

#[test]
fn test_restyle_is_idempotent() {
    let rows = vec![
        AnnotationRow::new(AnnotationKind::ShortNote, 2, 2).with_short_note("lit. the"),
        AnnotationRow::new(AnnotationKind::Notes, 5, 5).with_note("Tafsir", "x"),
        AnnotationRow::new(AnnotationKind::Parallel, 7, 9).with_parallel("رب"),
    ];
    let c = compose_default("praise be to the lord", &rows);
    let params = DisplayParameters {
        short_note_size: 16.0,
        note_icon_size: 90.0,
        ..inline()
    };

    let once = restyle(&c.lattice, &params);
    let twice = restyle(&once, &params);
    assert_eq!(once, twice);
    assert_eq!(render_html(&once), render_html(&twice));
}

#[test]
fn test_mode_toggle_round_trip_preserves_content() {
    let lookup = TypeLookup::from_entries(vec![TypeEntry {
        note_type: "Tafsir".into(),
        icon: "📖".into(),
    }]);
    let rows = vec![AnnotationRow::new(AnnotationKind::Notes, 3, 3).with_note("Tafsir", "<b>gloss</b>")];
    let mut lattice = compose_rows("abcdef", &rows, &lookup, &inline()).lattice;
    let original = lattice.glyph(3).unwrap().markers[0].clone();
    assert_eq!(original.class_name(), "note-icon");

    apply_display_parameters(&mut lattice, &DisplayParameters::default());
    let sup = &lattice.glyph(3).unwrap().markers[0];
    assert_eq!(sup.class_name(), "note-superscript");
    assert_eq!(sup.label, "📖");

    apply_display_parameters(&mut lattice, &inline());
    assert_eq!(lattice.glyph(3).unwrap().markers[0], original);
}

#[test]
fn test_highlight_and_underline_stack() {
    let rows = vec![
        AnnotationRow::new(AnnotationKind::Highlight, 5, 10).with_colour("ffff00"),
        AnnotationRow::new(AnnotationKind::Underline, 5, 10).with_colour("ff0000"),
    ];
    let c = compose_default("0123456789abcdef", &rows);

    for index in 5..=10 {
        let style = &c.lattice.glyph(index).unwrap().style;
        assert_eq!(style.background.as_ref().map(Colour::hex), Some("ffff00"));
        assert_eq!(style.underline.as_ref().map(Colour::hex), Some("ff0000"));
    }
    assert!(c.lattice.glyph(4).unwrap().style.is_plain());
    assert!(c.lattice.glyph(11).unwrap().style.is_plain());
}

#[test]
fn test_short_note_is_always_superscript() {
    let rows = vec![
        AnnotationRow::new(AnnotationKind::ShortNote, 1, 1).with_short_note("i.e."),
        AnnotationRow::new(AnnotationKind::Notes, 3, 3).with_note("Tafsir", "x"),
    ];
    for (params, note_class) in [(inline(), "note-icon"), (DisplayParameters::default(), "note-superscript")] {
        let c = compose_rows("abcdef", &rows, &TypeLookup::new(), &params);
        assert_eq!(c.lattice.glyph(1).unwrap().markers[0].class_name(), "short-note-superscript");
        assert_eq!(c.lattice.glyph(3).unwrap().markers[0].class_name(), note_class);
    }
}

#[test]
fn test_name_of_allah_scenario() {
    let text = "In the name of Allah";
    let rows = vec![
        AnnotationRow::new(AnnotationKind::Highlight, 3, 6).with_colour("ffff00"),
        AnnotationRow::new(AnnotationKind::Notes, 0, 6).with_note("Tafsir", "see note"),
    ];
    let c = compose_default(text, &rows);
    let len = text.chars().count();

    assert_eq!(c.lattice.back_references(), (0..len).collect::<Vec<_>>());

    let anchor = c.lattice.glyph(6).unwrap();
    assert_eq!(anchor.style.background.as_ref().map(Colour::hex), Some("ffff00"));
    assert_eq!(anchor.markers.len(), 1);
    assert_eq!(anchor.markers[0].note_text, "see note");

    for index in (0..=2).chain(7..len) {
        let glyph = c.lattice.glyph(index).unwrap();
        assert!(glyph.style.is_plain(), "glyph {} decorated", index);
        assert!(glyph.markers.is_empty(), "glyph {} has markers", index);
    }
}

#[test]
fn test_dual_word_consumption_scenario() {
    let rows = vec![AnnotationRow::new(AnnotationKind::Parallel, 0, 4).with_parallel("الله")];
    let c = compose_default("Allah is merciful", &rows);
    let units = c.lattice.units();

    match &units[0] {
        LatticeUnit::Dual(dual) => {
            assert_eq!(dual.range, CharRange::new(0, 4).unwrap());
            assert_eq!(dual.top_text(), "Allah");
            assert_eq!(dual.bottom_word, "الله");
        }
        other => panic!("expected a dual unit, got {:?}", other),
    }
    match &units[1] {
        LatticeUnit::Char(glyph) => {
            assert_eq!(glyph.index, 5);
            assert_eq!(glyph.ch, ' ');
        }
        other => panic!("expected a char unit, got {:?}", other),
    }
}

#[test]
fn test_malformed_record_is_dropped_others_apply() {
    let rows = vec![
        AnnotationRow::new(AnnotationKind::Highlight, 0, 2),
        AnnotationRow::new(AnnotationKind::Underline, 1, 3).with_colour("00ff00"),
        AnnotationRow::new(AnnotationKind::FontColour, 4, 4).with_colour("0000ff"),
    ];
    let c = compose_default("abcdef", &rows);

    assert!(matches!(c.issues.as_slice(), [CompositionIssue::DroppedRecord { row: 0, .. }]));
    assert!(c.lattice.glyph(0).unwrap().style.is_plain());
    assert!(c.lattice.glyph(1).unwrap().style.underline.is_some());
    assert!(c.lattice.glyph(4).unwrap().style.colour.is_some());
}

#[test]
fn test_overlapping_dual_words_are_rejected_together() {
    let rows = vec![
        AnnotationRow::new(AnnotationKind::Parallel, 0, 4).with_parallel("a"),
        AnnotationRow::new(AnnotationKind::Parallel, 3, 7).with_parallel("b"),
        AnnotationRow::new(AnnotationKind::Parallel, 9, 10).with_parallel("c"),
    ];
    let c = compose_default("abcdefghijkl", &rows);

    let rejected = c
        .issues
        .iter()
        .filter(|i| matches!(i, CompositionIssue::RejectedDualWord { .. }))
        .count();
    assert_eq!(rejected, 2);
    assert_eq!(c.lattice.dual_count(), 1);
    assert_eq!(c.lattice.back_references(), (0..12).collect::<Vec<_>>());
}

#[test]
fn test_decoration_inside_dual_word_lands_on_top_glyph() {
    let rows = vec![
        AnnotationRow::new(AnnotationKind::Parallel, 0, 4).with_parallel("الله"),
        AnnotationRow::new(AnnotationKind::FontColour, 2, 2).with_colour("aa0000"),
    ];
    let c = compose_default("Allah is merciful", &rows);

    let glyph = c.lattice.glyph(2).unwrap();
    assert_eq!(glyph.ch, 'l');
    assert_eq!(glyph.style.colour.as_ref().map(Colour::hex), Some("aa0000"));
    assert!(c.issues.is_empty());
}

#[test]
fn test_out_of_bounds_ranges_are_target_misses() {
    let rows = vec![
        AnnotationRow::new(AnnotationKind::Highlight, 2, 8).with_colour("ffff00"),
        AnnotationRow::new(AnnotationKind::Notes, 20, 20).with_note("Tafsir", "x"),
    ];
    let c = compose_default("abcd", &rows);

    assert!(c.lattice.glyph(3).unwrap().style.background.is_some());
    let misses: Vec<_> = c
        .issues
        .iter()
        .filter_map(|i| match i {
            CompositionIssue::TargetMiss { target, missing, .. } => Some((*target, *missing)),
            _ => None,
        })
        .collect();
    assert_eq!(misses, vec![("highlight", 5), ("note", 1)]);
}

#[test]
fn test_indices_count_chars_not_bytes() {
    let rows = vec![AnnotationRow::new(AnnotationKind::Highlight, 1, 1).with_colour("ffff00")];
    let c = compose_default("éàü", &rows);

    assert_eq!(c.lattice.char_count(), 3);
    assert_eq!(c.lattice.glyph(1).unwrap().ch, 'à');
    assert!(c.lattice.glyph(1).unwrap().style.background.is_some());
}

#[test]
fn test_inverted_dual_word_never_reaches_the_lattice() {
    let inverted = r#"{"kind":"parallel","range":{"start":5,"end":3},
        "bottom_word":"رب","top_size":100,"bottom_size":80,"spacing":5}"#;
    assert!(serde_json::from_str::<Annotation>(inverted).is_err());

    let valid = inverted.replace(r#""start":5,"end":3"#, r#""start":3,"end":5"#);
    let annotation: Annotation = serde_json::from_str(&valid).unwrap();
    let c = compose(
        "0123456789",
        vec![annotation],
        &TypeLookup::new(),
        &DisplayParameters::default(),
    );
    assert_eq!(c.lattice.back_references(), (0..10).collect::<Vec<_>>());
    assert_eq!(c.lattice.dual_count(), 1);

    let rows = vec![AnnotationRow::new(AnnotationKind::Parallel, 5, 3).with_parallel("رب")];
    let c = compose_default("0123456789", &rows);
    assert!(matches!(c.issues.as_slice(), [CompositionIssue::DroppedRecord { row: 0, .. }]));
    assert_eq!(c.lattice.dual_count(), 0);
    assert_eq!(c.lattice.back_references(), (0..10).collect::<Vec<_>>());
}

#[test]
fn test_note_inside_dual_word_follows_mode_and_renders_in_top_word() {
    let rows = vec![
        AnnotationRow::new(AnnotationKind::Parallel, 0, 4).with_parallel("الله"),
        AnnotationRow::new(AnnotationKind::Notes, 2, 2).with_note("Tafsir", "the Name"),
    ];
    let mut lattice = compose_default("Allah is merciful", &rows).lattice;
    assert_eq!(lattice.glyph(2).unwrap().markers.len(), 1);
    assert_eq!(lattice.glyph(2).unwrap().markers[0].class_name(), "note-superscript");

    let html = render_html(&lattice);
    let top = html.find("<span class=\"top-word\"").unwrap();
    let anchor = html.find("data-index=\"2\"").unwrap();
    let marker = html.find("class=\"note-superscript\"").unwrap();
    let bottom = html.find("<span class=\"bottom-word\"").unwrap();
    assert!(top < anchor && anchor < marker && marker < bottom);

    apply_display_parameters(&mut lattice, &inline());
    assert_eq!(lattice.glyph(2).unwrap().markers[0].class_name(), "note-icon");
    let html = render_html(&lattice);
    let marker = html.find("class=\"note-icon\"").unwrap();
    assert!(marker < html.find("<span class=\"bottom-word\"").unwrap());
    assert!(!html.contains("note-superscript"));
}

#[test]
fn test_short_note_at_end_of_dual_word_pulls_next_unit() {
    let rows = vec![
        AnnotationRow::new(AnnotationKind::Parallel, 0, 4).with_parallel("الله"),
        AnnotationRow::new(AnnotationKind::ShortNote, 4, 4).with_short_note("lit."),
    ];
    let c = compose_default("Allah is merciful", &rows);

    let after = c.lattice.glyph(5).unwrap();
    assert_eq!(after.ch, ' ');
    assert!(after.lead_margin.is_some());
    assert_eq!(c.lattice.glyph(4).unwrap().lead_margin, None);
}
