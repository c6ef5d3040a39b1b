// Capability interface between the layout engine and whatever draws the
// overlay, plus the in-memory scene adapter used by the CLI, the WASM
// wrapper and the tests.

use crate::geometry::{Point, Size, TextAlign};
use crate::layout::text::{TextBlock, measure_label};
use crate::theme::Theme;

/// A positioned, hideable box on the overlay surface.
///
/// `measure` must report the natural size of the box no matter whether it is
/// currently visible or where it was last placed, and must not leave any
/// visible trace on the surface.
pub trait OverlayBox {
    fn measure(&self) -> Size;
    /// Top-left corner in screen space.
    fn set_position(&mut self, position: Point);
    fn set_visible(&mut self, visible: bool);
    fn set_text_align(&mut self, _align: TextAlign) {}
}

impl<B: OverlayBox + ?Sized> OverlayBox for Box<B> {
    fn measure(&self) -> Size {
        (**self).measure()
    }

    fn set_position(&mut self, position: Point) {
        (**self).set_position(position);
    }

    fn set_visible(&mut self, visible: bool) {
        (**self).set_visible(visible);
    }

    fn set_text_align(&mut self, align: TextAlign) {
        (**self).set_text_align(align);
    }
}

/// Retained scene node. Its size comes from content (a fixed size or a
/// measured text block), never from its visibility.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneBox {
    natural: Size,
    lines: Vec<String>,
    position: Option<Point>,
    visible: bool,
    text_align: TextAlign,
}

impl SceneBox {
    pub fn fixed(size: Size) -> Self {
        Self {
            natural: size.sanitized(),
            lines: Vec::new(),
            position: None,
            visible: false,
            text_align: TextAlign::default(),
        }
    }

    pub fn text(text: &str, theme: &Theme) -> Self {
        Self::from_block(measure_label(text, theme))
    }

    pub fn from_block(block: TextBlock) -> Self {
        Self {
            lines: block.lines.clone(),
            ..Self::fixed(block.size())
        }
    }

    pub fn position(&self) -> Option<Point> {
        self.position
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn text_align(&self) -> TextAlign {
        self.text_align
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl OverlayBox for SceneBox {
    fn measure(&self) -> Size {
        self.natural
    }

    fn set_position(&mut self, position: Point) {
        self.position = Some(position);
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.text_align = align;
    }
}
