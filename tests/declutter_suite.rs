use std::path::Path;

use poi_overlay::geometry::{inflate, overlaps};
use poi_overlay::layout::popup_rect;
use poi_overlay::{
    Command, DeclutterConfig, Engine, Entry, EntryBoxes, LayoutConfig, OverlayOptions, Point,
    PoiRecord, PopupConfig, Position, Propagation, Rect, SceneBox, Size, TextAlign, ViewState,
    layout_overlay, load_pois_csv, load_pois_json, run_layout_pass,
};
use proptest::prelude::*;

const ICON: Size = Size::new(24.0, 24.0);
const LABEL: Size = Size::new(48.0, 16.0);

fn fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|err| panic!("{}: {err}", path.display()))
}

fn boxes(label: Size) -> EntryBoxes<SceneBox> {
    EntryBoxes {
        icon: SceneBox::fixed(ICON),
        label: SceneBox::fixed(label),
        popup: SceneBox::fixed(Size::new(220.0, 120.0)),
    }
}

fn entry(id: &str, x: f32, y: f32, priority: i64) -> Entry<SceneBox> {
    Entry::new(
        PoiRecord::new(id, Point::new(x, y)).with_priority(priority),
        boxes(LABEL),
    )
}

fn engine(pois: &[(&str, f32, f32, i64)]) -> Engine<SceneBox> {
    let mut engine = Engine::new(LayoutConfig::default());
    engine.load(
        pois.iter()
            .map(|(id, x, y, p)| PoiRecord::new(*id, Point::new(*x, *y)).with_priority(*p)),
        |_| boxes(LABEL),
    );
    engine
}

fn view() -> ViewState {
    ViewState::identity(1000.0, 800.0)
}

fn by_id<'a>(entries: &'a [Entry<SceneBox>], id: &str) -> &'a Entry<SceneBox> {
    entries
        .iter()
        .find(|entry| entry.id() == id)
        .unwrap_or_else(|| panic!("no entry {id}"))
}

#[test]
fn far_apart_icons_all_show_labels_below() {
    let mut entries = vec![
        entry("a", 100.0, 100.0, 1),
        entry("b", 500.0, 100.0, 2),
        entry("c", 300.0, 500.0, 3),
    ];
    let report = run_layout_pass(&mut entries, &view(), &DeclutterConfig::default())
        .expect("projection is ready");
    assert_eq!(report.icons_placed, 3);
    assert_eq!(report.labels_placed, 3);
    for entry in &entries {
        assert!(entry.icon.is_visible(), "{} icon hidden", entry.id());
        let placement = entry.label_placement().expect("label placed");
        assert_eq!(placement.position, Position::South);
        assert_eq!(entry.label.text_align(), TextAlign::Center);
    }
}

#[test]
fn overlapping_pair_keeps_higher_priority() {
    let mut entries = vec![entry("low", 205.0, 200.0, 2), entry("high", 200.0, 200.0, 1)];
    run_layout_pass(&mut entries, &view(), &DeclutterConfig::default());
    let high = by_id(&entries, "high");
    let low = by_id(&entries, "low");
    assert!(high.icon.is_visible());
    assert!(high.is_label_visible());
    assert!(low.is_icon_hidden());
    assert!(!low.icon.is_visible());
    assert!(!low.label.is_visible());
}

#[test]
fn label_moves_east_when_south_is_blocked() {
    let mut entries = vec![entry("x", 100.0, 100.0, 1), entry("y", 100.0, 150.0, 2)];
    run_layout_pass(&mut entries, &view(), &DeclutterConfig::default());
    let x = by_id(&entries, "x");
    let placement = x.label_placement().expect("label placed");
    assert_eq!(placement.position, Position::East);
    assert_eq!(placement.align, TextAlign::Left);
    assert_eq!(x.label.position(), Some(Point::new(116.0, 92.0)));
}

#[test]
fn equal_priority_tie_goes_to_smaller_id() {
    let mut entries = vec![entry("b", 200.0, 200.0, 5), entry("a", 210.0, 200.0, 5)];
    run_layout_pass(&mut entries, &view(), &DeclutterConfig::default());
    assert!(!by_id(&entries, "a").is_icon_hidden());
    assert!(by_id(&entries, "b").is_icon_hidden());
}

#[test]
fn priority_beats_load_order_and_id() {
    let report = load_pois_json(
        r#"[
            {"id": "a", "x": 100, "y": 100, "priority": "7"},
            {"id": "z", "x": 106, "y": 100, "priority": 1},
            {"id": "m", "x": 112, "y": 100}
        ]"#,
    )
    .expect("valid rows");
    let mut engine = Engine::new(LayoutConfig::default());
    engine.load(report.pois, |_| boxes(LABEL));
    engine.tick(&view());
    let visible: Vec<&str> = engine
        .entries()
        .iter()
        .filter(|entry| !entry.is_icon_hidden())
        .map(|entry| entry.id())
        .collect();
    assert_eq!(visible, vec!["z"]);
}

#[test]
fn opening_one_popup_closes_the_other() {
    let mut engine = engine(&[("x", 200.0, 400.0, 1), ("y", 700.0, 400.0, 1)]);
    engine.dispatch(Command::Tick, &view());
    engine.dispatch(Command::OpenPopup("y".into()), &view());
    engine.dispatch(Command::OpenPopup("x".into()), &view());
    assert_eq!(engine.open_popup_id(), Some("x"));
    let open: Vec<&str> = engine
        .entries()
        .iter()
        .filter(|entry| entry.popup.is_visible())
        .map(|entry| entry.id())
        .collect();
    assert_eq!(open, vec!["x"]);
}

#[test]
fn pointer_flow_through_icon_popup_and_background() {
    let mut engine = engine(&[("x", 500.0, 400.0, 1)]);
    engine.dispatch(Command::Tick, &view());

    let on_icon = Command::Pointer(poi_overlay::PointerEvent::click(500.0, 400.0));
    assert_eq!(engine.dispatch(on_icon.clone(), &view()), Propagation::Stop);
    let popup = engine.entry("x").and_then(|e| e.popup_rect()).expect("popup placed");
    assert_eq!(popup, Rect::new(390.0, 260.0, 220.0, 120.0));

    let inside = Command::Pointer(poi_overlay::PointerEvent::click(400.0, 270.0));
    assert_eq!(engine.dispatch(inside, &view()), Propagation::Stop);
    assert_eq!(engine.open_popup_id(), Some("x"));

    assert_eq!(engine.dispatch(on_icon, &view()), Propagation::Stop);
    assert_eq!(engine.open_popup_id(), None);

    engine.dispatch(Command::OpenPopup("x".into()), &view());
    let outside = Command::Pointer(poi_overlay::PointerEvent::click(20.0, 20.0));
    assert_eq!(engine.dispatch(outside, &view()), Propagation::Continue);
    assert_eq!(engine.open_popup_id(), None);
}

#[test]
fn popup_wider_than_viewport_pins_to_left_inset() {
    let viewport = Rect::new(40.0, 30.0, 300.0, 400.0);
    let popup = Size::new(viewport.w - 10.0, 80.0);
    for anchor_x in [40.0, 190.0, 340.0] {
        let rect = popup_rect(
            Point::new(anchor_x, 300.0),
            24.0,
            popup,
            viewport,
            &PopupConfig::default(),
        );
        assert_eq!(rect.x, viewport.x + 8.0);
        assert_eq!(rect.w, popup.width);
    }
}

#[test]
fn fixture_rows_load_and_lay_out() {
    let report = load_pois_json(&fixture("pois.json")).expect("fixture parses");
    assert_eq!(report.pois.len(), 5);
    assert_eq!(report.dropped.len(), 2);
    assert_eq!(report.pois[4].id, "poi-5");
    assert_eq!(report.pois[1].card.website, "https://trains.example/");
    assert_eq!(report.pois[2].card.hours, "Tue-Sun 10-18");

    let view: ViewState = serde_json::from_str(&fixture("view.json")).expect("view parses");
    let mut options = OverlayOptions::default();
    options.config.theme.fast_text_metrics = true;
    options.open = Some("cathedral".into());
    let dump = layout_overlay(report.pois, &view, &options);

    let get = |id: &str| {
        dump.entries
            .iter()
            .find(|entry| entry.id == id)
            .unwrap_or_else(|| panic!("no entry {id}"))
    };
    let cathedral = get("cathedral");
    assert_eq!(cathedral.screen, Some(Point::new(200.0, 200.0)));
    assert_eq!(cathedral.label.as_ref().map(|l| l.position), Some(Position::South));
    assert!(get("station").icon.is_none());
    assert!(get("bridge").icon.is_some());
    assert!(get("poi-5").icon.is_some());

    assert_eq!(dump.open_popup.as_deref(), Some("cathedral"));
    let popup = cathedral.popup.as_ref().expect("cathedral popup is open");
    assert_eq!(popup.photo.as_deref(), Some("cathedral.jpg"));
    assert!(popup.lines.iter().any(|line| line.starts_with("Phone: +49 221")));
    assert!(popup.lines.iter().any(|line| line == "Website: www.example.org/dom"));
    assert!(popup.x >= view.viewport.x + 8.0);
    assert!(popup.y >= view.viewport.y + 8.0);
}

#[test]
fn csv_fixture_matches_json_fixture() {
    let from_csv = load_pois_csv(&fixture("pois.csv")).expect("csv fixture parses");
    let from_json = load_pois_json(&fixture("pois.json")).expect("json fixture parses");
    assert_eq!(from_csv.pois, from_json.pois);
    assert_eq!(from_csv.dropped, from_json.dropped);

    let view: ViewState = serde_json::from_str(&fixture("view.json")).expect("view parses");
    let mut options = OverlayOptions::default();
    options.config.theme.fast_text_metrics = true;
    options.open = Some("cathedral".into());
    let csv_dump = serde_json::to_value(layout_overlay(from_csv.pois, &view, &options))
        .expect("dump serializes");
    let json_dump = serde_json::to_value(layout_overlay(from_json.pois, &view, &options))
        .expect("dump serializes");
    assert_eq!(csv_dump, json_dump);
}

#[derive(Debug, Clone)]
struct Sample {
    x: f32,
    y: f32,
    priority: i64,
    label: Size,
}

fn sample_strategy() -> impl Strategy<Value = Sample> {
    (0.0f32..600.0, 0.0f32..600.0, 0i64..4, 0.0f32..90.0, 0.0f32..30.0).prop_map(
        |(x, y, priority, w, h)| Sample {
            x,
            y,
            priority,
            label: Size::new(w, h),
        },
    )
}

fn build(samples: &[Sample]) -> Vec<Entry<SceneBox>> {
    samples
        .iter()
        .enumerate()
        .map(|(idx, sample)| {
            Entry::new(
                PoiRecord::new(format!("p{idx:03}"), Point::new(sample.x, sample.y))
                    .with_priority(sample.priority),
                boxes(sample.label),
            )
        })
        .collect()
}

type Outcome = Vec<(String, Option<Rect>, Option<(Position, Rect)>)>;

fn outcome(entries: &[Entry<SceneBox>]) -> Outcome {
    let mut out: Outcome = entries
        .iter()
        .map(|entry| {
            (
                entry.id().to_string(),
                entry.icon_rect(),
                entry.label_placement().map(|p| (p.position, p.rect)),
            )
        })
        .collect();
    out.sort_by(|a, b| a.0.cmp(&b.0));
    out
}

proptest! {
    #[test]
    fn visible_boxes_never_overlap(samples in prop::collection::vec(sample_strategy(), 0..40)) {
        let config = DeclutterConfig::default();
        let mut entries = build(&samples);
        run_layout_pass(&mut entries, &view(), &config);

        let mut placed: Vec<(usize, bool, Rect)> = Vec::new();
        for (idx, entry) in entries.iter().enumerate() {
            if let Some(rect) = entry.icon_rect() {
                placed.push((idx, true, inflate(rect, config.collision_pad)));
            }
            if let Some(placement) = entry.label_placement() {
                placed.push((idx, false, inflate(placement.rect, config.collision_pad)));
            }
        }
        for (i, a) in placed.iter().enumerate() {
            for b in &placed[i + 1..] {
                if a.0 == b.0 {
                    continue;
                }
                prop_assert!(!overlaps(&a.2, &b.2), "{:?} overlaps {:?}", a, b);
            }
        }
    }

    #[test]
    fn labels_only_show_with_their_icon(samples in prop::collection::vec(sample_strategy(), 0..40)) {
        let mut entries = build(&samples);
        run_layout_pass(&mut entries, &view(), &DeclutterConfig::default());
        for entry in &entries {
            if entry.is_label_visible() {
                prop_assert!(!entry.is_icon_hidden());
                prop_assert!(entry.icon.is_visible());
            }
            prop_assert_eq!(entry.label.is_visible(), entry.is_label_visible());
        }
    }

    #[test]
    fn pass_is_deterministic_and_order_free(samples in prop::collection::vec(sample_strategy(), 0..40)) {
        let config = DeclutterConfig::default();
        let mut first = build(&samples);
        run_layout_pass(&mut first, &view(), &config);
        let mut again = build(&samples);
        run_layout_pass(&mut again, &view(), &config);
        prop_assert_eq!(outcome(&first), outcome(&again));

        let mut reversed = build(&samples);
        reversed.reverse();
        run_layout_pass(&mut reversed, &view(), &config);
        prop_assert_eq!(outcome(&first), outcome(&reversed));
    }

    #[test]
    fn grid_ledger_matches_linear_scan(samples in prop::collection::vec(sample_strategy(), 0..40)) {
        let mut linear = build(&samples);
        run_layout_pass(&mut linear, &view(), &DeclutterConfig::default());
        let gridded_config = DeclutterConfig { grid_cell: Some(48.0), ..DeclutterConfig::default() };
        let mut gridded = build(&samples);
        run_layout_pass(&mut gridded, &view(), &gridded_config);
        prop_assert_eq!(outcome(&linear), outcome(&gridded));
    }
}
