use super::types::Entry;
use crate::config::PopupConfig;
use crate::geometry::{Point, Rect, Size, snap};
use crate::surface::OverlayBox;

/// Where an open popup goes: centered over the icon and above it, flipped
/// below when it would cross the top inset, then pushed inside the viewport
/// inset. When the popup is larger than the inset viewport its left/top edge
/// is pinned to the inset and the overflow goes right/down.
pub fn popup_rect(
    anchor: Point,
    icon_height: f32,
    popup: Size,
    viewport: Rect,
    config: &PopupConfig,
) -> Rect {
    let margin = config.viewport_margin;
    let gap = config.anchor_gap;
    let min_x = viewport.x + margin;
    let max_x = viewport.right() - margin;
    let min_y = viewport.y + margin;
    let max_y = viewport.bottom() - margin;

    let left = snap(anchor.x - popup.width / 2.0);
    let mut top = snap(anchor.y - icon_height / 2.0 - gap - popup.height);
    if top < min_y {
        top = snap(anchor.y + icon_height / 2.0 + gap);
    }

    Rect::new(
        clamp_edge(left, popup.width, min_x, max_x),
        clamp_edge(top, popup.height, min_y, max_y),
        popup.width,
        popup.height,
    )
}

fn clamp_edge(start: f32, len: f32, min: f32, max: f32) -> f32 {
    let start = if start + len > max { max - len } else { start };
    start.max(min)
}

/// Places and shows the popup of `entry` from the latest pass geometry. When
/// the latest pass could not project the entry the popup is hidden and
/// `None` is returned.
pub(crate) fn position_popup<B: OverlayBox>(
    entry: &mut Entry<B>,
    viewport: Rect,
    config: &PopupConfig,
) -> Option<Rect> {
    let Some(geometry) = entry.geometry else {
        entry.hide_popup();
        return None;
    };
    let size = entry.popup.measure().sanitized();
    let rect = popup_rect(geometry.screen, geometry.icon.height, size, viewport, config);
    entry.popup.set_position(rect.origin());
    entry.popup.set_visible(true);
    entry.popup_rect = Some(rect);
    Some(rect)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Rect = Rect::new(0.0, 0.0, 800.0, 600.0);
    const POPUP: Size = Size::new(200.0, 100.0);

    fn place(anchor: Point, popup: Size) -> Rect {
        popup_rect(anchor, 24.0, popup, VIEWPORT, &PopupConfig::default())
    }

    #[test]
    fn default_is_centered_above_icon() {
        let r = place(Point::new(400.0, 300.0), POPUP);
        assert_eq!(r, Rect::new(300.0, 180.0, 200.0, 100.0));
    }

    #[test]
    fn flips_below_when_top_would_cross_inset() {
        let r = place(Point::new(400.0, 100.0), POPUP);
        assert_eq!(r.y, 120.0);
    }

    #[test]
    fn clamps_against_left_and_right_edges() {
        assert_eq!(place(Point::new(20.0, 300.0), POPUP).x, 8.0);
        assert_eq!(place(Point::new(790.0, 300.0), POPUP).x, 592.0);
    }

    #[test]
    fn wide_popup_pins_left_edge_to_inset() {
        let wide = Size::new(VIEWPORT.w - 10.0, 100.0);
        let r = place(Point::new(700.0, 300.0), wide);
        assert_eq!(r.x, VIEWPORT.x + 8.0);
        assert_eq!(r.w, wide.width);
    }

    #[test]
    fn flipped_popup_is_pulled_up_from_bottom() {
        let tall = Size::new(200.0, 300.0);
        // Above does not fit (top < 8), below overflows the bottom inset.
        let r = place(Point::new(400.0, 300.0), tall);
        assert_eq!(r.y, 600.0 - 8.0 - 300.0);
    }

    #[test]
    fn anchor_above_viewport_keeps_popup_inside() {
        let r = place(Point::new(400.0, -200.0), POPUP);
        assert_eq!(r.y, 8.0);
    }

    #[test]
    fn respects_viewport_origin() {
        let viewport = Rect::new(100.0, 50.0, 400.0, 300.0);
        let r = popup_rect(
            Point::new(110.0, 60.0),
            24.0,
            POPUP,
            viewport,
            &PopupConfig::default(),
        );
        assert_eq!(r.x, 108.0);
        assert!(r.y >= 58.0);
    }
}
