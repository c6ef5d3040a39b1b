pub mod card;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod ir;
pub mod layout;
pub mod layout_dump;
pub mod parser;
pub mod projection;
pub mod render;
pub mod scheduler;
pub mod surface;
pub mod text_metrics;
pub mod theme;

pub use card::{Card, ContentNode, PlainTextContent, RichContent, build_card};
#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, DeclutterConfig, LayoutConfig, PopupConfig, RenderConfig, load_config};
pub use engine::{Command, Engine, PointerEvent, PointerKind, Propagation};
pub use error::{Error, Result};
pub use geometry::{Point, Position, Rect, Size, TextAlign};
pub use ir::{CardFields, LOWEST_PRIORITY, PoiRecord};
pub use layout::{Entry, EntryBoxes, PassReport, run_layout_pass};
pub use layout_dump::LayoutDump;
pub use parser::{LoadReport, load_pois_csv, load_pois_json, normalize_rows};
pub use projection::{Projection, Unloaded, ViewState};
pub use render::render_svg;
pub use scheduler::LayoutTrigger;
pub use surface::{OverlayBox, SceneBox};
pub use theme::Theme;

/// Everything needed to lay out a POI table without a live viewer.
#[derive(Debug, Clone, Default)]
pub struct OverlayOptions {
    pub config: Config,
    /// Id of the POI whose popup should be open.
    pub open: Option<String>,
}

impl OverlayOptions {
    pub fn compact() -> Self {
        let mut options = Self::default();
        options.config.theme = Theme::compact();
        options
    }
}

/// Loads `pois` into an engine backed by in-memory scene boxes. Icons start
/// unmeasured, so they take the configured fallback size.
pub fn build_engine(pois: Vec<PoiRecord>, options: &OverlayOptions) -> Engine<SceneBox> {
    let theme = &options.config.theme;
    let mut engine = Engine::new(options.config.layout.clone());
    engine.load(pois, |poi| EntryBoxes {
        icon: SceneBox::fixed(Size::default()),
        label: SceneBox::text(&poi.name, theme),
        popup: SceneBox::from_block(build_card(poi, &PlainTextContent).layout(theme)),
    });
    engine
}

/// Runs the initial pass for `view`, opens the requested popup and returns
/// the resulting snapshot.
pub fn layout_overlay(pois: Vec<PoiRecord>, view: &ViewState, options: &OverlayOptions) -> LayoutDump {
    let mut engine = build_engine(pois, options);
    engine.tick(view);
    if let Some(id) = options.open.as_deref() {
        engine.open_popup(id, view);
    }
    LayoutDump::from_engine(&engine, view)
}
