// Popup card content: what the detail popup of a POI shows, built from the
// free-form card fields through a pluggable rich-content renderer.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use url::Url;

use crate::geometry::Size;
use crate::ir::PoiRecord;
use crate::layout::text::{TextBlock, measure_block};
use crate::theme::Theme;

/// Display node produced by a [`RichContent`] renderer. Only these three
/// shapes ever reach the popup surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ContentNode {
    Text { text: String },
    LineBreak,
    Link { href: String, text: String },
}

impl ContentNode {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

/// Turns raw HTML or plain text from the data source into safe display nodes.
pub trait RichContent {
    fn render(&self, raw: &str) -> Vec<ContentNode>;
}

/// Tag-stripping renderer: keeps text, line breaks and links with safe
/// schemes, drops everything else.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextContent;

static SCRIPT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)\s*>").expect("valid regex")
});
static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<(/?)([A-Za-z][A-Za-z0-9]*)\b([^>]*)>").expect("valid regex"));
static HREF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bhref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#).expect("valid regex")
});
static SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

impl RichContent for PlainTextContent {
    fn render(&self, raw: &str) -> Vec<ContentNode> {
        let cleaned = SCRIPT_RE.replace_all(raw, "");
        let mut out = NodeBuilder::default();
        // Open <a>: its sanitized href and the text collected so far.
        let mut link: Option<(Option<String>, String)> = None;
        let mut last = 0;

        for caps in TAG_RE.captures_iter(&cleaned) {
            let Some(whole) = caps.get(0) else { continue };
            let text = &cleaned[last..whole.start()];
            last = whole.end();
            match &mut link {
                Some((_, collected)) => collected.push_str(text),
                None => out.push_text(text),
            }

            let closing = !caps[1].is_empty();
            let tag = caps[2].to_ascii_lowercase();
            match (tag.as_str(), closing) {
                ("br", _) => out.line_break(),
                ("p" | "li" | "div", true) => out.line_break(),
                ("a", false) => {
                    let href = HREF_RE
                        .captures(&caps[3])
                        .and_then(|href| href.get(1).or(href.get(2)).or(href.get(3)))
                        .and_then(|href| to_safe_href(&decode_entities(href.as_str())));
                    link = Some((href, String::new()));
                }
                ("a", true) => {
                    if let Some((href, text)) = link.take() {
                        out.push_link(href, &text);
                    }
                }
                _ => {}
            }
        }

        let tail = &cleaned[last..];
        match link.take() {
            Some((href, mut text)) => {
                text.push_str(tail);
                out.push_link(href, &text);
            }
            None => out.push_text(tail),
        }
        out.finish()
    }
}

#[derive(Default)]
struct NodeBuilder {
    nodes: Vec<ContentNode>,
}

impl NodeBuilder {
    fn push_text(&mut self, raw: &str) {
        let text = collapse_space(&decode_entities(raw));
        if text.is_empty() || (text == " " && self.at_line_start()) {
            return;
        }
        if let Some(ContentNode::Text { text: prev }) = self.nodes.last_mut() {
            prev.push_str(&text);
        } else {
            self.nodes.push(ContentNode::Text { text });
        }
    }

    fn push_link(&mut self, href: Option<String>, raw_text: &str) {
        let text = collapse_space(&decode_entities(raw_text)).trim().to_string();
        match href {
            Some(href) => {
                let text = if text.is_empty() { href.clone() } else { text };
                self.nodes.push(ContentNode::Link { href, text });
            }
            None => self.push_text(&text),
        }
    }

    fn line_break(&mut self) {
        if !self.at_line_start() {
            self.nodes.push(ContentNode::LineBreak);
        }
    }

    fn at_line_start(&self) -> bool {
        matches!(self.nodes.last(), None | Some(ContentNode::LineBreak))
    }

    fn finish(mut self) -> Vec<ContentNode> {
        if self.nodes.last() == Some(&ContentNode::LineBreak) {
            self.nodes.pop();
        }
        let is_break = |node: Option<&ContentNode>| matches!(node, None | Some(ContentNode::LineBreak));
        for idx in 0..self.nodes.len() {
            let starts_line = idx == 0 || is_break(self.nodes.get(idx - 1));
            let ends_line = is_break(self.nodes.get(idx + 1));
            if let ContentNode::Text { text } = &mut self.nodes[idx] {
                if starts_line {
                    *text = text.trim_start().to_string();
                }
                if ends_line {
                    *text = text.trim_end().to_string();
                }
            }
        }
        self.nodes
            .retain(|node| !matches!(node, ContentNode::Text { text } if text.is_empty()));
        self.nodes
    }
}

fn collapse_space(text: &str) -> String {
    SPACE_RE.replace_all(text, " ").into_owned()
}

/// Decodes HTML character references the way a browser does, named
/// (`&laquo;`, `&mdash;`) and numeric alike. Unknown names are left alone.
pub fn decode_entities(text: &str) -> String {
    htmlize::unescape(text).into_owned()
}

/// Returns the trimmed href when it uses a scheme a popup may link to.
pub fn to_safe_href(raw: &str) -> Option<String> {
    let href = raw.trim();
    let lower = href.to_ascii_lowercase();
    let safe = ["http:", "https:", "mailto:", "tel:", "/", "./", "../"]
        .iter()
        .any(|prefix| lower.starts_with(prefix));
    safe.then(|| href.to_string())
}

/// `tel:` target for a free-form phone number: digits and `+` only.
pub fn normalize_tel(raw: &str) -> Option<String> {
    let digits: String = raw
        .chars()
        .filter(|ch| ch.is_ascii_digit() || *ch == '+')
        .collect();
    digits
        .chars()
        .any(|ch| ch.is_ascii_digit())
        .then(|| format!("tel:{digits}"))
}

/// Link target for a website field, defaulting to https when no http(s)
/// scheme is given.
pub fn website_href(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let lower = raw.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Some(raw.to_string())
    } else {
        Some(format!("https://{raw}"))
    }
}

/// Short display form of a URL: host plus path, with a bare `/` path omitted.
pub fn plain_url(href: &str) -> String {
    match Url::parse(href) {
        Ok(url) => {
            let host = url.host_str().unwrap_or_default();
            match url.path() {
                "/" | "" => host.to_string(),
                path => format!("{host}{path}"),
            }
        }
        Err(_) => {
            let lower = href.to_ascii_lowercase();
            let start = ["https://", "http://"]
                .iter()
                .find(|scheme| lower.starts_with(*scheme))
                .map_or(0, |scheme| scheme.len());
            href[start..].trim_end_matches('/').to_string()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Address,
    Phone,
    Website,
    Hours,
}

impl SectionKind {
    pub fn title(self) -> &'static str {
        match self {
            SectionKind::Address => "Address",
            SectionKind::Phone => "Phone",
            SectionKind::Website => "Website",
            SectionKind::Hours => "Hours",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardSection {
    pub kind: SectionKind,
    pub content: Vec<ContentNode>,
}

/// Everything a popup shows for one POI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    pub photo: Option<String>,
    pub title: String,
    pub body: Vec<ContentNode>,
    pub sections: Vec<CardSection>,
}

pub fn build_card(poi: &PoiRecord, content: &dyn RichContent) -> Card {
    let fields = &poi.card;
    let mut sections = Vec::new();

    let address = fields.address.trim();
    if !address.is_empty() {
        sections.push(CardSection {
            kind: SectionKind::Address,
            content: vec![ContentNode::text(address)],
        });
    }

    let phone = fields.phone.trim();
    if !phone.is_empty() {
        let node = match normalize_tel(phone) {
            Some(href) => ContentNode::Link {
                href,
                text: phone.to_string(),
            },
            None => ContentNode::text(phone),
        };
        sections.push(CardSection {
            kind: SectionKind::Phone,
            content: vec![node],
        });
    }

    if let Some(href) = website_href(&fields.website) {
        let text = plain_url(&href);
        sections.push(CardSection {
            kind: SectionKind::Website,
            content: vec![ContentNode::Link { href, text }],
        });
    }

    let hours = content.render(&fields.hours);
    if !hours.is_empty() {
        sections.push(CardSection {
            kind: SectionKind::Hours,
            content: hours,
        });
    }

    let photo = fields.photo.trim();
    Card {
        photo: (!photo.is_empty()).then(|| photo.to_string()),
        title: poi.name.trim().to_string(),
        body: content.render(&fields.desc),
        sections,
    }
}

impl Card {
    /// Text lines in display order, before wrapping.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if !self.title.is_empty() {
            lines.push(self.title.clone());
        }
        lines.extend(node_lines(&self.body));
        for section in &self.sections {
            let mut section_lines = node_lines(&section.content).into_iter();
            let first = section_lines.next().unwrap_or_default();
            lines.push(format!("{}: {first}", section.kind.title()));
            lines.extend(section_lines);
        }
        lines
    }

    /// Wrapped card text and the natural popup size, photo included.
    pub fn layout(&self, theme: &Theme) -> TextBlock {
        let pad = theme.popup_padding;
        let mut block = measure_block(&self.lines().join("\n"), theme, theme.popup_width, pad, pad);
        block.width = theme.popup_width;
        if block.lines.is_empty() {
            block.height = pad * 2.0;
        }
        if self.photo.is_some() {
            block.height += theme.popup_photo_height;
        }
        block
    }

    pub fn measure(&self, theme: &Theme) -> Size {
        self.layout(theme).size()
    }
}

fn node_lines(nodes: &[ContentNode]) -> Vec<String> {
    let mut lines = vec![String::new()];
    for node in nodes {
        match node {
            ContentNode::Text { text } | ContentNode::Link { text, .. } => {
                if let Some(line) = lines.last_mut() {
                    let joined = line.is_empty()
                        || line.ends_with(char::is_whitespace)
                        || text.starts_with(char::is_whitespace);
                    if !joined {
                        line.push(' ');
                    }
                    line.push_str(text);
                }
            }
            ContentNode::LineBreak => lines.push(String::new()),
        }
    }
    lines
        .into_iter()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}
