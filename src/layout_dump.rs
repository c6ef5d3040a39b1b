use crate::engine::Engine;
use crate::geometry::{Point, Position, Rect, TextAlign};
use crate::layout::PassReport;
use crate::projection::ViewState;
use crate::surface::SceneBox;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Serializable snapshot of the overlay after a pass, in screen space.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDump {
    pub viewport: Rect,
    pub zoom: f32,
    pub pan: Point,
    pub report: Option<PassReport>,
    pub open_popup: Option<String>,
    pub entries: Vec<EntryDump>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryDump {
    pub id: String,
    pub name: String,
    pub priority: i64,
    pub icon_ref: Option<String>,
    /// Icon center, absent when the anchor could not be projected.
    pub screen: Option<Point>,
    pub icon: Option<Rect>,
    pub label: Option<LabelDump>,
    pub popup: Option<PopupDump>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelDump {
    pub position: Position,
    pub align: TextAlign,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub lines: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupDump {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub photo: Option<String>,
    pub lines: Vec<String>,
}

impl LayoutDump {
    pub fn from_engine(engine: &Engine<SceneBox>, view: &ViewState) -> Self {
        let entries = engine
            .entries()
            .iter()
            .map(|entry| {
                let label = entry.label_placement().map(|placement| LabelDump {
                    position: placement.position,
                    align: placement.align,
                    x: placement.rect.x,
                    y: placement.rect.y,
                    width: placement.rect.w,
                    height: placement.rect.h,
                    lines: entry.label.lines().to_vec(),
                });
                let popup = entry
                    .popup_rect()
                    .filter(|_| entry.popup.is_visible())
                    .map(|rect| PopupDump {
                        x: rect.x,
                        y: rect.y,
                        width: rect.w,
                        height: rect.h,
                        photo: Some(entry.poi.card.photo.trim())
                            .filter(|photo| !photo.is_empty())
                            .map(str::to_string),
                        lines: entry.popup.lines().to_vec(),
                    });
                EntryDump {
                    id: entry.poi.id.clone(),
                    name: entry.poi.name.clone(),
                    priority: entry.poi.priority,
                    icon_ref: entry.poi.icon_ref.clone(),
                    screen: entry.geometry().map(|geometry| geometry.screen),
                    icon: entry.icon_rect(),
                    label,
                    popup,
                }
            })
            .collect();

        LayoutDump {
            viewport: view.viewport,
            zoom: view.zoom,
            pan: view.pan,
            report: engine.last_report(),
            open_popup: engine.open_popup_id().map(str::to_string),
            entries,
        }
    }

    pub fn visible_icons(&self) -> impl Iterator<Item = &EntryDump> {
        self.entries.iter().filter(|entry| entry.icon.is_some())
    }
}

pub fn write_layout_dump(path: &Path, dump: &LayoutDump) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, dump)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::PoiRecord;
    use crate::{OverlayOptions, build_engine};

    #[test]
    fn dump_reports_visible_geometry_only() {
        let mut options = OverlayOptions::default();
        options.config.theme.fast_text_metrics = true;
        let pois = vec![
            PoiRecord::new("a", Point::new(100.0, 100.0)).with_name("Alpha").with_priority(1),
            PoiRecord::new("b", Point::new(104.0, 100.0)).with_name("Beta").with_priority(2),
        ];
        let view = ViewState::identity(400.0, 300.0);
        let mut engine = build_engine(pois, &options);
        engine.tick(&view);
        let dump = LayoutDump::from_engine(&engine, &view);

        assert_eq!(dump.entries.len(), 2);
        assert_eq!(dump.visible_icons().count(), 1);
        let alpha = &dump.entries[0];
        assert_eq!(alpha.label.as_ref().map(|l| l.lines.clone()), Some(vec!["Alpha".to_string()]));
        assert!(dump.entries[1].label.is_none());
        assert!(alpha.popup.is_none());

        let json = serde_json::to_value(&dump).expect("serializes");
        assert_eq!(json["entries"][0]["label"]["position"], "S");
        assert_eq!(json["entries"][0]["label"]["align"], "center");
        assert!(json["openPopup"].is_null());
    }
}
