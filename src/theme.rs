use serde::{Deserialize, Serialize};

/// Typography and colors for labels and popup cards. Sizes feed straight
/// into natural-size measurement, so changing them changes the layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub line_height: f32,
    pub label_padding_x: f32,
    pub label_padding_y: f32,
    pub label_max_width: f32,
    /// Use the built-in glyph width table instead of system fonts.
    pub fast_text_metrics: bool,
    pub popup_width: f32,
    pub popup_padding: f32,
    pub popup_photo_height: f32,
    pub icon_fill: String,
    pub label_color: String,
    pub label_halo: String,
    pub popup_background: String,
    pub popup_border: String,
    pub background: String,
}

impl Theme {
    pub fn overlay_default() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            line_height: 1.25,
            label_padding_x: 4.0,
            label_padding_y: 2.0,
            label_max_width: 160.0,
            fast_text_metrics: false,
            popup_width: 280.0,
            popup_padding: 12.0,
            popup_photo_height: 140.0,
            icon_fill: "#E53E3E".to_string(),
            label_color: "#1C2430".to_string(),
            label_halo: "#FFFFFF".to_string(),
            popup_background: "#FFFFFF".to_string(),
            popup_border: "#D7E0F0".to_string(),
            background: "#F4F1EA".to_string(),
        }
    }

    pub fn compact() -> Self {
        Self {
            font_size: 11.0,
            line_height: 1.2,
            label_padding_x: 2.0,
            label_padding_y: 1.0,
            label_max_width: 120.0,
            popup_width: 240.0,
            popup_padding: 8.0,
            popup_photo_height: 100.0,
            ..Self::overlay_default()
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::overlay_default()
    }
}
