use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect};

/// Image-to-screen conversion supplied by the viewing surface.
pub trait Projection {
    /// Screen position of an image-space point, `None` when it cannot be
    /// projected right now.
    fn to_screen(&self, image_point: Point) -> Option<Point>;

    /// Screen rect of the visible viewport, `None` before content is loaded.
    fn content_bounds(&self) -> Option<Rect>;

    /// Whether a layout pass can run at all.
    fn is_ready(&self) -> bool {
        self.content_bounds().is_some()
    }
}

/// Uniform zoom plus pan, the transform a deep-zoom viewer exposes.
///
/// `screen = viewport.origin + pan + image * zoom`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub zoom: f32,
    #[serde(default)]
    pub pan: Point,
    pub viewport: Rect,
}

impl ViewState {
    pub fn new(zoom: f32, pan: Point, viewport: Rect) -> Self {
        Self {
            zoom,
            pan,
            viewport,
        }
    }

    /// Identity transform over a `width` x `height` viewport at the origin.
    pub fn identity(width: f32, height: f32) -> Self {
        Self::new(1.0, Point::default(), Rect::new(0.0, 0.0, width, height))
    }
}

impl Projection for ViewState {
    fn to_screen(&self, image_point: Point) -> Option<Point> {
        if !(self.zoom.is_finite() && self.zoom > 0.0) {
            return None;
        }
        let screen = Point::new(
            self.viewport.x + self.pan.x + image_point.x * self.zoom,
            self.viewport.y + self.pan.y + image_point.y * self.zoom,
        );
        screen.is_finite().then_some(screen)
    }

    fn content_bounds(&self) -> Option<Rect> {
        (!self.viewport.is_empty() && self.viewport.origin().is_finite()).then_some(self.viewport)
    }
}

/// Stand-in for a viewer with nothing loaded yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unloaded;

impl Projection for Unloaded {
    fn to_screen(&self, _image_point: Point) -> Option<Point> {
        None
    }

    fn content_bounds(&self) -> Option<Rect> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_state_applies_zoom_then_pan() {
        let view = ViewState::new(0.5, Point::new(10.0, -20.0), Rect::new(100.0, 50.0, 800.0, 600.0));
        assert_eq!(view.to_screen(Point::new(200.0, 400.0)), Some(Point::new(210.0, 230.0)));
    }

    #[test]
    fn degenerate_zoom_cannot_project() {
        let view = ViewState::new(0.0, Point::default(), Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(view.to_screen(Point::new(1.0, 1.0)), None);
    }

    #[test]
    fn empty_viewport_is_not_ready() {
        assert!(!ViewState::identity(0.0, 600.0).is_ready());
        assert!(ViewState::identity(800.0, 600.0).is_ready());
        assert!(!Unloaded.is_ready());
    }

    #[test]
    fn view_state_reads_camel_case_json() {
        let view: ViewState = serde_json::from_str(
            r#"{"zoom": 2, "viewport": {"x": 0, "y": 0, "w": 640, "h": 480}}"#,
        )
        .unwrap();
        assert_eq!(view.pan, Point::default());
        assert_eq!(view.zoom, 2.0);
    }
}
