use crate::geometry::Size;
use crate::text_metrics;
use crate::theme::Theme;

/// Wrapped label text and its natural box size, padding included.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub width: f32,
    pub height: f32,
}

impl TextBlock {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Natural size of a label box. Blank text measures as zero so the label
/// is never placed.
pub fn measure_label(text: &str, theme: &Theme) -> TextBlock {
    measure_block(
        text,
        theme,
        theme.label_max_width,
        theme.label_padding_x,
        theme.label_padding_y,
    )
}

pub(crate) fn measure_block(
    text: &str,
    theme: &Theme,
    max_width: f32,
    pad_x: f32,
    pad_y: f32,
) -> TextBlock {
    let inner_max = (max_width - pad_x * 2.0).max(1.0);
    let lines: Vec<String> = split_lines(text)
        .iter()
        .flat_map(|line| wrap_line(line, inner_max, theme))
        .collect();
    if lines.iter().all(|line| line.is_empty()) {
        return TextBlock::default();
    }

    let text_width = lines
        .iter()
        .map(|line| text_width(line, theme))
        .fold(0.0, f32::max);
    let line_px = theme.font_size * theme.line_height;
    TextBlock {
        width: (text_width + pad_x * 2.0).ceil(),
        height: (lines.len() as f32 * line_px + pad_y * 2.0).ceil(),
        lines,
    }
}

pub(crate) fn split_lines(text: &str) -> Vec<String> {
    let normalized = text
        .replace("\r\n", "\n")
        .replace("<br/>", "\n")
        .replace("<br>", "\n");
    let lines: Vec<String> = normalized
        .split('\n')
        .map(|line| line.trim().to_string())
        .collect();
    // Keep inner blank lines, drop leading/trailing ones.
    let first = lines.iter().position(|l| !l.is_empty());
    let last = lines.iter().rposition(|l| !l.is_empty());
    match (first, last) {
        (Some(first), Some(last)) => lines[first..=last].to_vec(),
        _ => Vec::new(),
    }
}

pub(crate) fn wrap_line(line: &str, max_width: f32, theme: &Theme) -> Vec<String> {
    if text_width(line, theme) <= max_width {
        return vec![line.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in line.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if !current.is_empty() && text_width(&candidate, theme) > max_width {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

pub(crate) fn text_width(text: &str, theme: &Theme) -> f32 {
    if theme.fast_text_metrics {
        return fallback_text_width(text, theme.font_size);
    }
    text_metrics::measure_text_width(text, theme.font_size, &theme.font_family)
        .unwrap_or_else(|| fallback_text_width(text, theme.font_size))
}

fn fallback_text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(glyph_width_factor).sum::<f32>() * font_size
}

/// Em-relative advance for a proportional sans face.
fn glyph_width_factor(ch: char) -> f32 {
    match ch {
        ' ' => 0.28,
        'i' | 'j' | 'l' | 'I' | '.' | ',' | ':' | ';' | '\'' | '|' | '!' => 0.26,
        'f' | 't' | 'r' | '(' | ')' | '[' | ']' | '-' => 0.36,
        'm' | 'w' => 0.84,
        'M' | 'W' | '@' | '%' => 0.92,
        'A'..='Z' => 0.66,
        '0'..='9' => 0.58,
        c if c.is_ascii() => 0.55,
        // CJK and other wide scripts
        c if ('\u{2E80}'..='\u{9FFF}').contains(&c) || ('\u{AC00}'..='\u{D7AF}').contains(&c) => 1.0,
        _ => 0.6,
    }
}
