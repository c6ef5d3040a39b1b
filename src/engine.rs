// Engine context: owns the entries of one loaded dataset, the pending-pass
// trigger and the single open popup. Everything the viewer or the input layer
// wants from the overlay goes through `dispatch`.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::LayoutConfig;
use crate::geometry::{Point, Rect};
use crate::ir::PoiRecord;
use crate::layout::{self, Entry, EntryBoxes, PassReport, position_popup};
use crate::projection::Projection;
use crate::scheduler::LayoutTrigger;
use crate::surface::OverlayBox;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// The viewer transform or the viewport size changed.
    ViewChanged,
    /// Frame boundary; runs the pending pass, if any.
    Tick,
    TogglePopup(String),
    OpenPopup(String),
    ClosePopup(String),
    CloseAll,
    Pointer(PointerEvent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerKind {
    Click,
    Down,
    Wheel,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub position: Point,
}

impl PointerEvent {
    pub fn click(x: f32, y: f32) -> Self {
        Self {
            kind: PointerKind::Click,
            position: Point::new(x, y),
        }
    }
}

/// Whether an input event should still reach the viewer (pan/zoom).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    Continue,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hit {
    Popup,
    Marker(usize),
    Background,
}

#[derive(Debug)]
pub struct Engine<B> {
    config: LayoutConfig,
    entries: Vec<Entry<B>>,
    trigger: LayoutTrigger,
    open: Option<usize>,
    passes: u64,
    last_report: Option<PassReport>,
}

impl<B: OverlayBox> Engine<B> {
    pub fn new(config: LayoutConfig) -> Self {
        Self::with_trigger(config, LayoutTrigger::new())
    }

    /// Uses an existing trigger, e.g. one already wired to viewer events.
    pub fn with_trigger(config: LayoutConfig, trigger: LayoutTrigger) -> Self {
        Self {
            config,
            entries: Vec::new(),
            trigger,
            open: None,
            passes: 0,
            last_report: None,
        }
    }

    /// Replaces every entry with one per POI and schedules the initial pass.
    pub fn load<I, F>(&mut self, pois: I, mut build: F)
    where
        I: IntoIterator<Item = PoiRecord>,
        F: FnMut(&PoiRecord) -> EntryBoxes<B>,
    {
        self.entries = pois
            .into_iter()
            .map(|poi| {
                let boxes = build(&poi);
                Entry::new(poi, boxes)
            })
            .collect();
        self.open = None;
        self.last_report = None;
        info!(entries = self.entries.len(), "POI overlay loaded");
        self.trigger.request();
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Handle for collaborators that report view changes.
    pub fn trigger(&self) -> LayoutTrigger {
        self.trigger.clone()
    }

    pub fn entries(&self) -> &[Entry<B>] {
        &self.entries
    }

    pub fn entry(&self, id: &str) -> Option<&Entry<B>> {
        self.entries.iter().find(|entry| entry.poi.id == id)
    }

    pub fn open_popup_id(&self) -> Option<&str> {
        self.open.map(|idx| self.entries[idx].poi.id.as_str())
    }

    pub fn is_popup_open(&self, id: &str) -> bool {
        self.open_popup_id() == Some(id)
    }

    /// Number of passes that actually ran.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    pub fn last_report(&self) -> Option<PassReport> {
        self.last_report
    }

    pub fn notify_view_changed(&self) -> bool {
        self.trigger.request()
    }

    /// Frame callback: runs the pending pass and re-places the open popup.
    /// A request stays pending until the projection has content.
    pub fn tick(&mut self, projection: &dyn Projection) -> Option<PassReport> {
        if !projection.is_ready() {
            debug!("frame skipped: projection not ready");
            return None;
        }
        if !self.trigger.take() {
            return None;
        }
        let report = self.run_layout_pass(projection);
        self.reposition_open_popup(projection);
        report
    }

    /// Runs a pass immediately, bypassing the trigger. Refuses to nest.
    pub fn run_layout_pass(&mut self, projection: &dyn Projection) -> Option<PassReport> {
        let Some(_guard) = self.trigger.begin_pass() else {
            debug!("layout pass skipped: another pass is running");
            return None;
        };
        let report =
            layout::run_layout_pass(&mut self.entries, projection, &self.config.declutter)?;
        self.passes += 1;
        self.last_report = Some(report);
        Some(report)
    }

    /// Re-places the open popup. While its anchor cannot be projected the
    /// popup stays open but hidden, and comes back on a later placement.
    pub fn reposition_open_popup(&mut self, projection: &dyn Projection) -> Option<Rect> {
        let idx = self.open?;
        let entry = &mut self.entries[idx];
        let Some(viewport) = projection.content_bounds() else {
            entry.hide_popup();
            return None;
        };
        position_popup(entry, viewport, &self.config.popup)
    }

    /// Opens the popup of `id`, closing any other. Returns false for unknown ids.
    pub fn open_popup(&mut self, id: &str, projection: &dyn Projection) -> bool {
        let Some(idx) = self.lookup(id) else {
            return false;
        };
        self.open_at(idx, projection);
        true
    }

    /// Opens the popup of `id`, or closes it if it is the open one. Returns
    /// whether it is open afterwards.
    pub fn toggle_popup(&mut self, id: &str, projection: &dyn Projection) -> bool {
        match self.lookup(id) {
            Some(idx) => self.toggle_at(idx, projection),
            None => false,
        }
    }

    pub fn close_popup(&mut self, id: &str) {
        if let Some(idx) = self.lookup(id)
            && self.open == Some(idx)
        {
            self.close_all();
        }
    }

    pub fn close_all(&mut self) {
        for entry in &mut self.entries {
            entry.hide_popup();
        }
        self.open = None;
    }

    /// Routes a pointer event: clicks on an icon or label toggle its popup,
    /// anything inside the open popup stays there, and a click on empty map
    /// closes popups and passes through.
    pub fn handle_pointer(
        &mut self,
        event: PointerEvent,
        projection: &dyn Projection,
    ) -> Propagation {
        match (self.hit_test(event.position), event.kind) {
            (Hit::Popup, _) => Propagation::Stop,
            (Hit::Marker(idx), PointerKind::Click) => {
                self.toggle_at(idx, projection);
                Propagation::Stop
            }
            (Hit::Background, PointerKind::Click) => {
                self.close_all();
                Propagation::Continue
            }
            (Hit::Marker(_) | Hit::Background, PointerKind::Down | PointerKind::Wheel) => {
                Propagation::Continue
            }
        }
    }

    pub fn dispatch(&mut self, command: Command, projection: &dyn Projection) -> Propagation {
        match command {
            Command::ViewChanged => {
                self.notify_view_changed();
                Propagation::Continue
            }
            Command::Tick => {
                self.tick(projection);
                Propagation::Continue
            }
            Command::TogglePopup(id) => {
                self.toggle_popup(&id, projection);
                Propagation::Stop
            }
            Command::OpenPopup(id) => {
                self.open_popup(&id, projection);
                Propagation::Stop
            }
            Command::ClosePopup(id) => {
                self.close_popup(&id);
                Propagation::Stop
            }
            Command::CloseAll => {
                self.close_all();
                Propagation::Continue
            }
            Command::Pointer(event) => self.handle_pointer(event, projection),
        }
    }

    fn lookup(&self, id: &str) -> Option<usize> {
        let idx = self.entries.iter().position(|entry| entry.poi.id == id);
        if idx.is_none() {
            warn!(id, "no POI with this id");
        }
        idx
    }

    fn open_at(&mut self, idx: usize, projection: &dyn Projection) {
        self.close_all();
        self.open = Some(idx);
        self.reposition_open_popup(projection);
    }

    fn toggle_at(&mut self, idx: usize, projection: &dyn Projection) -> bool {
        if self.open == Some(idx) {
            self.close_all();
            false
        } else {
            self.open_at(idx, projection);
            true
        }
    }

    fn hit_test(&self, point: Point) -> Hit {
        let in_popup = self
            .open
            .and_then(|idx| self.entries[idx].popup_rect)
            .is_some_and(|rect| rect.contains(point));
        if in_popup {
            return Hit::Popup;
        }
        self.entries
            .iter()
            .position(|entry| {
                entry.icon_rect.is_some_and(|rect| rect.contains(point))
                    || entry
                        .label_placement
                        .is_some_and(|placement| placement.rect.contains(point))
            })
            .map_or(Hit::Background, Hit::Marker)
    }
}
