// The per-frame declutter pass: project, order, place icons, place labels.

use tracing::{debug, debug_span, trace};

use super::ledger::{Ledger, Region, RegionKind};
use super::types::{Entry, EntryGeometry, LabelPlacement, PassReport};
use crate::config::DeclutterConfig;
use crate::geometry::{Size, icon_rect, inflate, label_rect, text_align_for};
use crate::projection::Projection;
use crate::surface::OverlayBox;

/// Runs one full pass over `entries`, updating every box.
///
/// Returns `None` without touching anything when the projection has no
/// content yet. Entries whose anchor cannot be projected are hidden for the
/// pass.
pub fn run_layout_pass<B: OverlayBox>(
    entries: &mut [Entry<B>],
    projection: &dyn Projection,
    config: &DeclutterConfig,
) -> Option<PassReport> {
    if !projection.is_ready() {
        debug!("layout pass skipped: projection not ready");
        return None;
    }
    let span = debug_span!("declutter.pass", entries = entries.len());
    let _enter = span.enter();

    for entry in entries.iter_mut() {
        entry.geometry = project_entry(entry, projection, config);
    }

    let order = precedence_order(entries);
    let mut ledger = Ledger::new(config.grid_cell);
    let mut report = PassReport::default();

    place_icons(entries, &order, &mut ledger, config, &mut report);
    place_labels(entries, &order, &mut ledger, config, &mut report);

    debug!(
        icons_placed = report.icons_placed,
        icons_hidden = report.icons_hidden,
        labels_placed = report.labels_placed,
        labels_hidden = report.labels_hidden,
        unprojected = report.unprojected,
        regions = ledger.len(),
        "layout pass complete"
    );
    Some(report)
}

/// Entry indices sorted by `(priority, id)`. Stable, so duplicate ids keep
/// load order.
pub fn precedence_order<B>(entries: &[Entry<B>]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..entries.len()).collect();
    order.sort_by(|&a, &b| entries[a].poi.precedence_cmp(&entries[b].poi));
    order
}

fn project_entry<B: OverlayBox>(
    entry: &Entry<B>,
    projection: &dyn Projection,
    config: &DeclutterConfig,
) -> Option<EntryGeometry> {
    let screen = projection.to_screen(entry.poi.anchor)?;
    let measured = entry.icon.measure().sanitized();
    let fallback = config.icon_fallback_size.max(0.0);
    let icon = Size::new(
        if measured.width > 0.0 { measured.width } else { fallback },
        if measured.height > 0.0 { measured.height } else { fallback },
    );
    Some(EntryGeometry {
        screen,
        icon,
        label: entry.label.measure().sanitized(),
    })
}

fn place_icons<B: OverlayBox>(
    entries: &mut [Entry<B>],
    order: &[usize],
    ledger: &mut Ledger,
    config: &DeclutterConfig,
    report: &mut PassReport,
) {
    for &idx in order {
        let entry = &mut entries[idx];
        let Some(geometry) = entry.geometry else {
            entry.hide_icon();
            report.unprojected += 1;
            continue;
        };

        let rect = icon_rect(geometry.screen, geometry.icon);
        let padded = inflate(rect, config.collision_pad);
        if ledger.conflicts(&padded, None) {
            trace!(id = %entry.poi.id, "icon hidden");
            entry.hide_icon();
            report.icons_hidden += 1;
            continue;
        }

        entry.icon.set_position(rect.origin());
        entry.icon.set_visible(true);
        entry.icon_rect = Some(rect);
        ledger.commit(Region {
            rect: padded,
            owner: idx,
            kind: RegionKind::Icon,
        });
        report.icons_placed += 1;
    }
}

fn place_labels<B: OverlayBox>(
    entries: &mut [Entry<B>],
    order: &[usize],
    ledger: &mut Ledger,
    config: &DeclutterConfig,
    report: &mut PassReport,
) {
    for &idx in order {
        let entry = &mut entries[idx];
        let geometry = match entry.geometry {
            Some(geometry) if entry.icon_rect.is_some() && !geometry.label.is_empty() => geometry,
            _ => {
                entry.hide_label();
                report.labels_hidden += 1;
                continue;
            }
        };

        let placement = config.label_positions.iter().find_map(|&position| {
            let rect = label_rect(
                geometry.screen,
                geometry.icon,
                geometry.label,
                position,
                config.label_gap,
            );
            let padded = inflate(rect, config.collision_pad);
            // A label may sit flush against its own icon.
            (!ledger.conflicts(&padded, Some((idx, RegionKind::Icon)))).then_some((
                LabelPlacement {
                    position,
                    rect,
                    align: text_align_for(position),
                },
                padded,
            ))
        });

        let Some((placement, padded)) = placement else {
            trace!(id = %entry.poi.id, "label hidden: every slot collides");
            entry.hide_label();
            report.labels_hidden += 1;
            continue;
        };

        entry.label.set_position(placement.rect.origin());
        entry.label.set_text_align(placement.align);
        entry.label.set_visible(true);
        entry.label_placement = Some(placement);
        ledger.commit(Region {
            rect: padded,
            owner: idx,
            kind: RegionKind::Label,
        });
        report.labels_placed += 1;
    }
}
