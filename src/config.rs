use crate::error::Result;
use crate::geometry::{DEFAULT_LABEL_POSITIONS, Position};
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeclutterConfig {
    /// Distance between an icon edge and its label.
    pub label_gap: f32,
    /// Margin added around every rect before collision tests.
    pub collision_pad: f32,
    /// Label slots in the order they are tried.
    pub label_positions: Vec<Position>,
    /// Icon side used when the icon box reports no size.
    pub icon_fallback_size: f32,
    /// Bucket size of the optional ledger grid. `None` scans the ledger.
    pub grid_cell: Option<f32>,
}

impl Default for DeclutterConfig {
    fn default() -> Self {
        Self {
            label_gap: 4.0,
            collision_pad: 5.0,
            label_positions: DEFAULT_LABEL_POSITIONS.to_vec(),
            icon_fallback_size: 24.0,
            grid_cell: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopupConfig {
    /// Inset kept between a popup and the viewport edges.
    pub viewport_margin: f32,
    /// Gap between the icon and the popup above or below it.
    pub anchor_gap: f32,
}

impl Default for PopupConfig {
    fn default() -> Self {
        Self {
            viewport_margin: 8.0,
            anchor_gap: 8.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub declutter: DeclutterConfig,
    pub popup: PopupConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            background: "#FFFFFF".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::overlay_default();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            layout: LayoutConfig::default(),
            render,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
    line_height: Option<f32>,
    label_max_width: Option<f32>,
    fast_text_metrics: Option<bool>,
    popup_width: Option<f32>,
    label_gap: Option<f32>,
    collision_pad: Option<f32>,
    label_positions: Option<Vec<String>>,
    icon_fallback_size: Option<f32>,
    grid_cell: Option<f32>,
    popup_margin: Option<f32>,
    popup_gap: Option<f32>,
    background: Option<String>,
}

/// Reads a JSON/JSON5 config file and merges it onto the defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> Result<Config> {
    let parsed: ConfigFile = json5::from_str(contents)?;
    let mut config = Config::default();

    match parsed.theme.as_deref() {
        Some("compact") => config.theme = Theme::compact(),
        Some("default") | None => {}
        Some(other) => tracing::warn!(theme = other, "unknown theme name, keeping default"),
    }

    if let Some(v) = parsed.font_family {
        config.theme.font_family = v;
    }
    if let Some(v) = parsed.font_size {
        config.theme.font_size = v;
    }
    if let Some(v) = parsed.line_height {
        config.theme.line_height = v;
    }
    if let Some(v) = parsed.label_max_width {
        config.theme.label_max_width = v;
    }
    if let Some(v) = parsed.fast_text_metrics {
        config.theme.fast_text_metrics = v;
    }
    if let Some(v) = parsed.popup_width {
        config.theme.popup_width = v;
    }
    if let Some(v) = parsed.background {
        config.theme.background = v.clone();
        config.render.background = v;
    }

    let declutter = &mut config.layout.declutter;
    if let Some(v) = parsed.label_gap {
        declutter.label_gap = v;
    }
    if let Some(v) = parsed.collision_pad {
        declutter.collision_pad = v;
    }
    if let Some(names) = parsed.label_positions {
        declutter.label_positions = names
            .iter()
            .map(|name| name.parse::<Position>())
            .collect::<Result<Vec<_>>>()?;
    }
    if let Some(v) = parsed.icon_fallback_size {
        declutter.icon_fallback_size = v;
    }
    if let Some(v) = parsed.grid_cell {
        declutter.grid_cell = Some(v);
    }

    let popup = &mut config.layout.popup;
    if let Some(v) = parsed.popup_margin {
        popup.viewport_margin = v;
    }
    if let Some(v) = parsed.popup_gap {
        popup.anchor_gap = v;
    }

    Ok(config)
}
