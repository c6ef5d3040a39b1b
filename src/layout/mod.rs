//! Screen-space placement of POI icons, labels and popups.

mod declutter;
pub mod ledger;
mod popup;
pub mod text;
mod types;

pub use declutter::{precedence_order, run_layout_pass};
pub use ledger::{Ledger, Region, RegionKind};
pub(crate) use popup::position_popup;
pub use popup::popup_rect;
pub use text::{TextBlock, measure_label};
pub use types::{Entry, EntryBoxes, EntryGeometry, LabelPlacement, PassReport};
