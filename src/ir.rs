use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Priority given to rows without a usable priority; loses to everything.
pub const LOWEST_PRIORITY: i64 = 9999;

/// Free-form popup card fields. Layout never looks at these.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardFields {
    pub photo: String,
    pub desc: String,
    pub address: String,
    pub phone: String,
    pub website: String,
    pub hours: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoiRecord {
    pub id: String,
    /// Anchor in image space. The icon center sits here.
    pub anchor: Point,
    pub name: String,
    pub icon_ref: Option<String>,
    /// Lower wins.
    pub priority: i64,
    pub card: CardFields,
}

impl PoiRecord {
    pub fn new(id: impl Into<String>, anchor: Point) -> Self {
        Self {
            id: id.into(),
            anchor,
            name: String::new(),
            icon_ref: None,
            priority: LOWEST_PRIORITY,
            card: CardFields::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    /// Placement order: priority ascending, then id ascending.
    pub fn precedence_cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| self.id.cmp(&other.id))
    }
}
