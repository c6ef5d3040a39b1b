use crate::config::RenderConfig;
use crate::geometry::{Rect, TextAlign};
use crate::layout_dump::{EntryDump, LayoutDump};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

/// Draws the placed overlay over a flat background, one SVG per viewport.
/// Hidden icons and labels are simply absent.
pub fn render_svg(dump: &LayoutDump, theme: &Theme) -> String {
    let mut svg = String::new();
    let width = dump.viewport.w.max(1.0);
    let height = dump.viewport.h.max(1.0);
    let (ox, oy) = (dump.viewport.x, dump.viewport.y);

    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">",
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));
    svg.push_str(&format!("<g transform=\"translate({:.2} {:.2})\">", -ox, -oy));

    for entry in dump.visible_icons() {
        if let Some(icon) = entry.icon {
            svg.push_str(&icon_svg(entry, icon, theme));
        }
    }

    for entry in &dump.entries {
        let Some(label) = &entry.label else { continue };
        let rect = Rect::new(label.x, label.y, label.width, label.height);
        svg.push_str(&text_block_svg(
            rect,
            &label.lines,
            label.align,
            theme.label_padding_x,
            theme.label_padding_y,
            theme,
            true,
        ));
    }

    // Popups go last so they sit above every marker.
    for entry in &dump.entries {
        let Some(popup) = &entry.popup else { continue };
        svg.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"8\" ry=\"8\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1\"/>",
            popup.x, popup.y, popup.width, popup.height, theme.popup_background, theme.popup_border
        ));
        let mut text_top = popup.y;
        if popup.photo.is_some() {
            svg.push_str(&format!(
                "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\"/>",
                popup.x + 1.0,
                popup.y + 1.0,
                (popup.width - 2.0).max(0.0),
                theme.popup_photo_height,
                theme.popup_border
            ));
            text_top += theme.popup_photo_height;
        }
        let text_rect = Rect::new(popup.x, text_top, popup.width, popup.height - (text_top - popup.y));
        svg.push_str(&text_block_svg(
            text_rect,
            &popup.lines,
            TextAlign::Left,
            theme.popup_padding,
            theme.popup_padding,
            theme,
            false,
        ));
    }

    svg.push_str("</g></svg>");
    svg
}

fn icon_svg(entry: &EntryDump, icon: Rect, theme: &Theme) -> String {
    let cx = icon.x + icon.w / 2.0;
    let cy = icon.y + icon.h / 2.0;
    let r = icon.w.min(icon.h) / 2.0;
    format!(
        "<circle data-id=\"{}\" cx=\"{cx:.2}\" cy=\"{cy:.2}\" r=\"{r:.2}\" fill=\"{}\" stroke=\"#FFFFFF\" stroke-width=\"2\"/>",
        escape_xml(&entry.id),
        theme.icon_fill
    )
}

fn text_block_svg(
    rect: Rect,
    lines: &[String],
    align: TextAlign,
    pad_x: f32,
    pad_y: f32,
    theme: &Theme,
    halo: bool,
) -> String {
    if lines.is_empty() {
        return String::new();
    }
    let (x, anchor) = match align {
        TextAlign::Left => (rect.x + pad_x, "start"),
        TextAlign::Center => (rect.x + rect.w / 2.0, "middle"),
        TextAlign::Right => (rect.right() - pad_x, "end"),
    };
    let line_px = theme.font_size * theme.line_height;
    let start_y = rect.y + pad_y + theme.font_size;
    let halo_attrs = if halo {
        format!(
            " stroke=\"{}\" stroke-width=\"3\" paint-order=\"stroke\" stroke-linejoin=\"round\"",
            theme.label_halo
        )
    } else {
        String::new()
    };

    let mut text = format!(
        "<text x=\"{x:.2}\" y=\"{start_y:.2}\" text-anchor=\"{anchor}\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\"{halo_attrs}>",
        escape_xml(&theme.font_family),
        theme.font_size,
        theme.label_color
    );
    for (idx, line) in lines.iter().enumerate() {
        let dy = if idx == 0 { 0.0 } else { line_px };
        text.push_str(&format!(
            "<tspan x=\"{x:.2}\" dy=\"{dy:.2}\">{}</tspan>",
            escape_xml(line)
        ));
    }
    text.push_str("</text>");
    text
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig, theme: &Theme) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    if let Some(family) = theme.font_family.split(',').map(str::trim).find(|f| !f.is_empty()) {
        opt.font_family = family.to_string();
    }
    if let Some(size) = usvg::Size::from_wh(render_cfg.width, render_cfg.height) {
        opt.default_size = size;
    }

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig, _theme: &Theme) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

pub(crate) fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
