use serde::Serialize;

use crate::geometry::{Point, Position, Rect, Size, TextAlign};
use crate::ir::PoiRecord;
use crate::surface::OverlayBox;

/// Screen geometry from the latest pass. `None` when that pass could not
/// project the entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EntryGeometry {
    /// Icon center.
    pub screen: Point,
    pub icon: Size,
    pub label: Size,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LabelPlacement {
    pub position: Position,
    pub rect: Rect,
    pub align: TextAlign,
}

/// The three boxes drawn for one POI.
#[derive(Debug, Clone)]
pub struct EntryBoxes<B> {
    pub icon: B,
    pub label: B,
    pub popup: B,
}

/// One POI and its overlay state. Created on load, updated by every pass.
#[derive(Debug)]
pub struct Entry<B> {
    pub poi: PoiRecord,
    pub icon: B,
    pub label: B,
    pub popup: B,
    pub(crate) geometry: Option<EntryGeometry>,
    pub(crate) icon_rect: Option<Rect>,
    pub(crate) label_placement: Option<LabelPlacement>,
    pub(crate) popup_rect: Option<Rect>,
}

impl<B: OverlayBox> Entry<B> {
    pub fn new(poi: PoiRecord, boxes: EntryBoxes<B>) -> Self {
        let EntryBoxes {
            mut icon,
            mut label,
            mut popup,
        } = boxes;
        icon.set_visible(false);
        label.set_visible(false);
        popup.set_visible(false);
        Self {
            poi,
            icon,
            label,
            popup,
            geometry: None,
            icon_rect: None,
            label_placement: None,
            popup_rect: None,
        }
    }

    pub(crate) fn hide_icon(&mut self) {
        self.icon.set_visible(false);
        self.icon_rect = None;
    }

    pub(crate) fn hide_label(&mut self) {
        self.label.set_visible(false);
        self.label_placement = None;
    }

    pub(crate) fn hide_popup(&mut self) {
        self.popup.set_visible(false);
        self.popup_rect = None;
    }
}

impl<B> Entry<B> {
    pub fn id(&self) -> &str {
        &self.poi.id
    }

    pub fn geometry(&self) -> Option<&EntryGeometry> {
        self.geometry.as_ref()
    }

    pub fn is_icon_hidden(&self) -> bool {
        self.icon_rect.is_none()
    }

    /// On-screen icon rect, without collision padding.
    pub fn icon_rect(&self) -> Option<Rect> {
        self.icon_rect
    }

    pub fn label_placement(&self) -> Option<&LabelPlacement> {
        self.label_placement.as_ref()
    }

    pub fn is_label_visible(&self) -> bool {
        self.label_placement.is_some()
    }

    /// Rect of the popup while it is open and placed.
    pub fn popup_rect(&self) -> Option<Rect> {
        self.popup_rect
    }
}

/// Counts from one layout pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PassReport {
    pub icons_placed: usize,
    pub icons_hidden: usize,
    pub labels_placed: usize,
    pub labels_hidden: usize,
    /// Entries the projection could not place this pass.
    pub unprojected: usize,
}
