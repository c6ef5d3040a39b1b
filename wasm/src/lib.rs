use poi_overlay::{OverlayOptions, Position, ViewState, load_pois_json};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PoiOverlayOptions {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    fast_text: Option<bool>,
    label_gap: Option<f32>,
    collision_pad: Option<f32>,
    label_positions: Option<Vec<Position>>,
    open: Option<String>,
}

fn build_overlay_options(options: PoiOverlayOptions) -> OverlayOptions {
    let mut overlay = if options.theme.as_deref() == Some("compact") {
        OverlayOptions::compact()
    } else {
        OverlayOptions::default()
    };

    let theme = &mut overlay.config.theme;
    if let Some(font_family) = options.font_family {
        theme.font_family = font_family;
    }
    if let Some(font_size) = options.font_size {
        theme.font_size = font_size;
    }
    // System fonts are not reachable from the browser sandbox.
    theme.fast_text_metrics = options.fast_text.unwrap_or(true);

    let declutter = &mut overlay.config.layout.declutter;
    if let Some(gap) = options.label_gap {
        declutter.label_gap = gap;
    }
    if let Some(pad) = options.collision_pad {
        declutter.collision_pad = pad;
    }
    if let Some(positions) = options.label_positions {
        declutter.label_positions = positions;
    }
    overlay.open = options.open;
    overlay
}

fn layout_json(rows_json: &str, view_json: &str, options_json: Option<&str>) -> Result<String, String> {
    let options = match options_json {
        Some(raw) => serde_json::from_str::<PoiOverlayOptions>(raw).map_err(|error| error.to_string())?,
        None => PoiOverlayOptions::default(),
    };
    let view: ViewState = serde_json::from_str(view_json).map_err(|error| error.to_string())?;
    let report = load_pois_json(rows_json).map_err(|error| error.to_string())?;
    let dump = poi_overlay::layout_overlay(report.pois, &view, &build_overlay_options(options));
    serde_json::to_string(&dump).map_err(|error| error.to_string())
}

/// Lays out POI rows for one view and returns the layout snapshot as JSON.
#[wasm_bindgen]
pub fn layout_overlay(
    rows_json: &str,
    view_json: &str,
    options_json: Option<String>,
) -> Result<String, JsValue> {
    layout_json(rows_json, view_json, options_json.as_deref()).map_err(|error| JsValue::from_str(&error))
}
