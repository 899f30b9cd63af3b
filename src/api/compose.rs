//! Stateless composition entry points

use super::helpers::{deserialize_or_default, deserialize_rows, serialize};
use crate::compositor::{compose_rows, Composition};
use crate::lookup::TypeLookup;
use crate::models::{AnnotationRow, DisplayParameters, DisplayParametersPatch, SheetRow};
use crate::renderers::html::render_html;
use crate::wasm_warn;
use wasm_bindgen::prelude::*;

/// Build a lookup from raw sheet rows; no rows means an unloaded lookup
pub(crate) fn lookup_from_js(lookup_rows_js: JsValue) -> Result<TypeLookup, JsValue> {
    let rows: Vec<SheetRow> = deserialize_rows(lookup_rows_js, "Invalid type lookup rows")?;
    if rows.is_empty() {
        return Ok(TypeLookup::new());
    }
    let rows: Vec<Vec<String>> = rows.into_iter().map(|r| r.0).collect();
    Ok(TypeLookup::from_sheet_rows(&rows))
}

/// Parameters for a one-off composition: whatever the caller gives,
/// merged over the defaults
pub(crate) fn params_over_defaults(patch: &DisplayParametersPatch) -> DisplayParameters {
    let mut params = DisplayParameters::default();
    params.apply_patch(patch);
    params
}

fn compose_from_js(
    text: &str,
    rows_js: JsValue,
    lookup_rows_js: JsValue,
    params_js: JsValue,
) -> Result<Composition, JsValue> {
    let rows: Vec<AnnotationRow> = deserialize_rows(rows_js, "Invalid annotation rows")?;
    let lookup = lookup_from_js(lookup_rows_js)?;
    let patch: DisplayParametersPatch = deserialize_or_default(params_js, "Invalid display parameters")?;
    let params = params_over_defaults(&patch);

    let composition = compose_rows(text, &rows, &lookup, &params);
    if !composition.issues.is_empty() {
        wasm_warn!(
            "composeVerse: {} of {} rows needed recovery",
            composition.issues.len(),
            rows.len()
        );
    }
    Ok(composition)
}

/// Compose one verse and return its markup
#[wasm_bindgen(js_name = composeVerse)]
pub fn compose_verse(
    text: &str,
    rows_js: JsValue,
    lookup_rows_js: JsValue,
    params_js: JsValue,
) -> Result<String, JsValue> {
    let composition = compose_from_js(text, rows_js, lookup_rows_js, params_js)?;
    Ok(render_html(&composition.lattice))
}

/// Compose one verse and return the lattice with its recovery issues
#[wasm_bindgen(js_name = composeVerseLattice)]
pub fn compose_verse_lattice(
    text: &str,
    rows_js: JsValue,
    lookup_rows_js: JsValue,
    params_js: JsValue,
) -> Result<JsValue, JsValue> {
    let composition = compose_from_js(text, rows_js, lookup_rows_js, params_js)?;
    serialize(&composition, "Failed to serialize composition")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NotesDisplayMode;

    #[test]
    fn test_partial_params_fill_from_defaults() {
        let patch: DisplayParametersPatch = serde_json::from_str(r#"{"notesDisplayMode":"inline"}"#).unwrap();
        let params = params_over_defaults(&patch);

        assert_eq!(params.notes_display_mode, NotesDisplayMode::Inline);
        assert_eq!(params.note_icon_size, DisplayParameters::default().note_icon_size);
        assert_eq!(params.dual_word, DisplayParameters::default().dual_word);
    }

    #[test]
    fn test_params_short_note_size_is_clamped() {
        let patch: DisplayParametersPatch = serde_json::from_str(r#"{"shortNoteSize": 90}"#).unwrap();
        assert_eq!(params_over_defaults(&patch).short_note_size, 28.0);
    }
}
