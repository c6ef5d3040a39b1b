use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::geometry::{Rect, overlaps};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionKind {
    Icon,
    Label,
}

/// A padded rect committed during the current pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Region {
    pub rect: Rect,
    /// Index of the owning entry.
    pub owner: usize,
    pub kind: RegionKind,
}

/// Occupied regions of one pass, in commit order. Committed rects never
/// overlap each other because callers only commit after `conflicts` says no.
#[derive(Debug, Default)]
pub struct Ledger {
    regions: Vec<Region>,
    grid: Option<ObstacleGrid>,
}

impl Ledger {
    pub fn new(grid_cell: Option<f32>) -> Self {
        Self {
            regions: Vec::new(),
            grid: grid_cell
                .filter(|cell| cell.is_finite() && *cell > 0.0)
                .map(ObstacleGrid::new),
        }
    }

    /// Whether `rect` overlaps any committed region other than `exempt`
    /// (the owner's own region of the given kind).
    pub fn conflicts(&self, rect: &Rect, exempt: Option<(usize, RegionKind)>) -> bool {
        let blocks = |region: &Region| {
            if exempt == Some((region.owner, region.kind)) {
                return false;
            }
            overlaps(rect, &region.rect)
        };
        match &self.grid {
            Some(grid) => grid.query(rect).any(|idx| blocks(&self.regions[idx])),
            None => self.regions.iter().any(blocks),
        }
    }

    pub fn commit(&mut self, region: Region) {
        if let Some(grid) = &mut self.grid {
            grid.insert(self.regions.len(), &region.rect);
        }
        self.regions.push(region);
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// Uniform bucket grid over committed regions.
#[derive(Debug)]
struct ObstacleGrid {
    cell: f32,
    cells: HashMap<(i32, i32), Vec<usize>>,
}

impl ObstacleGrid {
    fn new(cell: f32) -> Self {
        Self {
            cell: cell.max(16.0),
            cells: HashMap::new(),
        }
    }

    fn span(&self, rect: &Rect) -> (i32, i32, i32, i32) {
        (
            (rect.x / self.cell).floor() as i32,
            (rect.y / self.cell).floor() as i32,
            (rect.right() / self.cell).floor() as i32,
            (rect.bottom() / self.cell).floor() as i32,
        )
    }

    fn insert(&mut self, idx: usize, rect: &Rect) {
        let (x0, y0, x1, y1) = self.span(rect);
        for ix in x0..=x1 {
            for iy in y0..=y1 {
                self.cells.entry((ix, iy)).or_default().push(idx);
            }
        }
    }

    /// Indices of regions sharing a bucket with `rect`, each once.
    fn query(&self, rect: &Rect) -> impl Iterator<Item = usize> + '_ {
        let (x0, y0, x1, y1) = self.span(rect);
        let mut seen = HashSet::new();
        (x0..=x1)
            .flat_map(move |ix| (y0..=y1).map(move |iy| (ix, iy)))
            .flat_map(move |key| self.cells.get(&key).into_iter().flatten().copied())
            .filter(move |idx| seen.insert(*idx))
    }
}
