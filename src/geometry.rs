// Screen-space rectangle math shared by the declutter pass, the popup
// placement and pointer hit testing. Everything here is pure.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True when either side is zero, negative or not a number.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Replaces non-finite or negative sides with zero.
    pub fn sanitized(self) -> Self {
        let clean = |v: f32| if v.is_finite() && v > 0.0 { v } else { 0.0 };
        Self {
            width: clean(self.width),
            height: clean(self.height),
        }
    }
}

/// Axis-aligned rectangle, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.w, self.h)
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    pub fn is_empty(&self) -> bool {
        self.size().is_empty()
    }
}

/// The eight label slots around an icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "S")]
    South,
    #[serde(rename = "N")]
    North,
    #[serde(rename = "E")]
    East,
    #[serde(rename = "W")]
    West,
    #[serde(rename = "SE")]
    SouthEast,
    #[serde(rename = "SW")]
    SouthWest,
    #[serde(rename = "NE")]
    NorthEast,
    #[serde(rename = "NW")]
    NorthWest,
}

/// Candidate order tried by the label pass.
pub const DEFAULT_LABEL_POSITIONS: [Position; 8] = [
    Position::South,
    Position::East,
    Position::West,
    Position::SouthEast,
    Position::SouthWest,
    Position::North,
    Position::NorthEast,
    Position::NorthWest,
];

impl Position {
    pub fn as_str(self) -> &'static str {
        match self {
            Position::South => "S",
            Position::North => "N",
            Position::East => "E",
            Position::West => "W",
            Position::SouthEast => "SE",
            Position::SouthWest => "SW",
            Position::NorthEast => "NE",
            Position::NorthWest => "NW",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Position {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "S" => Ok(Position::South),
            "N" => Ok(Position::North),
            "E" => Ok(Position::East),
            "W" => Ok(Position::West),
            "SE" => Ok(Position::SouthEast),
            "SW" => Ok(Position::SouthWest),
            "NE" => Ok(Position::NorthEast),
            "NW" => Ok(Position::NorthWest),
            _ => Err(Error::InvalidPosition(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

impl TextAlign {
    pub fn as_str(self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
            TextAlign::Right => "right",
        }
    }
}

/// Rounds to the nearest pixel, halves toward +inf. Every derived rect goes
/// through this so overlap tests stay stable from pass to pass.
pub fn snap(value: f32) -> f32 {
    (value + 0.5).floor()
}

pub fn inflate(rect: Rect, pad: f32) -> Rect {
    if pad <= 0.0 {
        return rect;
    }
    Rect::new(
        rect.x - pad,
        rect.y - pad,
        rect.w + pad * 2.0,
        rect.h + pad * 2.0,
    )
}

/// Half-open overlap: rects that only share an edge do not overlap.
pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    !(a.right() <= b.x || b.right() <= a.x || a.bottom() <= b.y || b.bottom() <= a.y)
}

pub fn icon_rect(center: Point, icon: Size) -> Rect {
    Rect::new(
        snap(center.x - icon.width / 2.0),
        snap(center.y - icon.height / 2.0),
        icon.width,
        icon.height,
    )
}

pub fn label_rect(center: Point, icon: Size, label: Size, position: Position, gap: f32) -> Rect {
    let half_w = icon.width / 2.0;
    let half_h = icon.height / 2.0;

    let centered_x = center.x - label.width / 2.0;
    let centered_y = center.y - label.height / 2.0;
    let east_x = center.x + half_w + gap;
    let west_x = center.x - half_w - gap - label.width;
    let south_y = center.y + half_h + gap;
    let north_y = center.y - half_h - gap - label.height;

    let (x, y) = match position {
        Position::South => (centered_x, south_y),
        Position::North => (centered_x, north_y),
        Position::East => (east_x, centered_y),
        Position::West => (west_x, centered_y),
        Position::SouthEast => (east_x, south_y),
        Position::SouthWest => (west_x, south_y),
        Position::NorthEast => (east_x, north_y),
        Position::NorthWest => (west_x, north_y),
    };
    Rect::new(snap(x), snap(y), label.width, label.height)
}

/// Alignment of wrapped text inside the label box; the box rect is unaffected.
pub fn text_align_for(position: Position) -> TextAlign {
    match position {
        Position::East | Position::NorthEast | Position::SouthEast => TextAlign::Left,
        Position::West | Position::NorthWest | Position::SouthWest => TextAlign::Right,
        Position::North | Position::South => TextAlign::Center,
    }
}
