// Normalizes tabular POI rows (named fields, string or number cells) into
// `PoiRecord`s. Rows whose anchor is not numeric are dropped and reported.

use std::collections::{BTreeMap, HashSet};

use serde_json::Value;
use tracing::warn;

use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::ir::{CardFields, LOWEST_PRIORITY, PoiRecord};

/// One row of the POI table, keyed by column name.
pub type PoiRow = BTreeMap<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    NonNumericX,
    NonNumericY,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedRow {
    /// Zero-based row index in the source table.
    pub row: usize,
    pub reason: DropReason,
}

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub pois: Vec<PoiRecord>,
    pub dropped: Vec<DroppedRow>,
}

pub fn normalize_rows(rows: &[PoiRow]) -> LoadReport {
    let mut report = LoadReport::default();
    let mut seen_ids: HashSet<String> = HashSet::new();

    for (idx, row) in rows.iter().enumerate() {
        let Some(x) = number_field(row, "x") else {
            warn!(row = idx, "dropping POI row: x is not a finite number");
            report.dropped.push(DroppedRow {
                row: idx,
                reason: DropReason::NonNumericX,
            });
            continue;
        };
        let Some(y) = number_field(row, "y") else {
            warn!(row = idx, "dropping POI row: y is not a finite number");
            report.dropped.push(DroppedRow {
                row: idx,
                reason: DropReason::NonNumericY,
            });
            continue;
        };

        let id = text_field(row, &["id"]).unwrap_or_else(|| format!("poi-{}", idx + 1));
        if !seen_ids.insert(id.clone()) {
            warn!(row = idx, id = %id, "duplicate POI id");
        }

        report.pois.push(PoiRecord {
            id,
            anchor: Point::new(x as f32, y as f32),
            name: text_field(row, &["name"]).unwrap_or_default(),
            icon_ref: text_field(row, &["icon"]),
            priority: priority_field(row),
            card: CardFields {
                photo: text_field(row, &["photo"]).unwrap_or_default(),
                desc: text_field(row, &["desc"]).unwrap_or_default(),
                address: text_field(row, &["address"]).unwrap_or_default(),
                phone: text_field(row, &["phone"]).unwrap_or_default(),
                website: text_field(row, &["website", "site"]).unwrap_or_default(),
                hours: text_field(row, &["hours", "open"]).unwrap_or_default(),
            },
        });
    }

    report
}

/// Parses a JSON array of row objects.
pub fn parse_rows_json(input: &str) -> Result<Vec<PoiRow>> {
    let value: Value = serde_json::from_str(input)?;
    let Value::Array(items) = value else {
        return Err(Error::RowsNotArray);
    };
    items
        .into_iter()
        .map(|item| match item {
            Value::Object(map) => Ok(map.into_iter().collect()),
            _ => Err(Error::RowsNotArray),
        })
        .collect()
}

pub fn load_pois_json(input: &str) -> Result<LoadReport> {
    let rows = parse_rows_json(input)?;
    Ok(normalize_rows(&rows))
}

/// Parses CSV text whose first record names the columns. Blank lines are
/// skipped; a short row leaves its trailing columns absent and extra cells
/// are ignored.
pub fn parse_rows_csv(input: &str) -> Result<Vec<PoiRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input.as_bytes());
    let headers = reader.headers()?.clone();
    reader
        .records()
        .map(|record| {
            let record = record?;
            Ok(headers
                .iter()
                .zip(record.iter())
                .map(|(name, cell)| (name.trim().to_string(), Value::String(cell.to_string())))
                .collect())
        })
        .collect()
}

pub fn load_pois_csv(input: &str) -> Result<LoadReport> {
    let rows = parse_rows_csv(input)?;
    Ok(normalize_rows(&rows))
}

/// First non-empty value among `keys`, trimmed.
fn text_field(row: &PoiRow, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        let text = match row.get(*key)? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => return None,
        };
        (!text.is_empty()).then_some(text)
    })
}

fn number_field(row: &PoiRow, key: &str) -> Option<f64> {
    let value = match row.get(key)? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok()?
        }
        _ => return None,
    };
    value.is_finite().then_some(value)
}

fn priority_field(row: &PoiRow) -> i64 {
    // Fractional priorities truncate toward zero; `as` saturates out-of-range values.
    number_field(row, "priority")
        .map(|p| p.trunc() as i64)
        .unwrap_or(LOWEST_PRIORITY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> PoiRow {
        match value {
            Value::Object(map) => map.into_iter().collect(),
            _ => panic!("row must be an object"),
        }
    }

    #[test]
    fn normalizes_complete_row() {
        let rows = vec![row(json!({
            "id": "cafe",
            "x": "120.5",
            "y": 40,
            "name": " Cafe ",
            "icon": "icons/cafe.png",
            "priority": "2",
            "site": "example.org",
            "open": "9-18"
        }))];
        let report = normalize_rows(&rows);
        assert!(report.dropped.is_empty());
        let poi = &report.pois[0];
        assert_eq!(poi.id, "cafe");
        assert_eq!(poi.anchor, Point::new(120.5, 40.0));
        assert_eq!(poi.name, "Cafe");
        assert_eq!(poi.icon_ref.as_deref(), Some("icons/cafe.png"));
        assert_eq!(poi.priority, 2);
        assert_eq!(poi.card.website, "example.org");
        assert_eq!(poi.card.hours, "9-18");
    }

    #[test]
    fn csv_rows_keep_quoted_cells_and_skip_blank_lines() {
        let input = "id,x,y,name,priority,desc\n\
                     cafe,10,20,\"Cafe, Bar\",2,\"<p>Say \"\"hi\"\"</p>\"\n\
                     \n\
                     ,30,40,Kiosk\n\
                     far,oops,1,Nowhere,1,,extra\n";
        let rows = parse_rows_csv(input).expect("valid csv");
        assert_eq!(rows.len(), 3);
        assert!(!rows[1].contains_key("priority"));

        let report = normalize_rows(&rows);
        assert_eq!(report.pois.len(), 2);
        let cafe = &report.pois[0];
        assert_eq!(cafe.name, "Cafe, Bar");
        assert_eq!(cafe.priority, 2);
        assert_eq!(cafe.card.desc, "<p>Say \"hi\"</p>");
        assert_eq!(report.pois[1].id, "poi-2");
        assert_eq!(report.pois[1].priority, LOWEST_PRIORITY);
        assert_eq!(report.dropped, vec![DroppedRow { row: 2, reason: DropReason::NonNumericX }]);
    }

    #[test]
    fn csv_with_only_a_header_has_no_rows() {
        assert!(load_pois_csv("id,x,y\n").expect("valid csv").pois.is_empty());
    }

    #[test]
    fn synthesizes_one_based_ids() {
        let rows = vec![
            row(json!({"x": 1, "y": 1})),
            row(json!({"id": "", "x": 2, "y": 2})),
        ];
        let report = normalize_rows(&rows);
        assert_eq!(report.pois[0].id, "poi-1");
        assert_eq!(report.pois[1].id, "poi-2");
    }

    #[test]
    fn drops_rows_with_non_numeric_anchor() {
        let rows = vec![
            row(json!({"id": "a", "x": "left", "y": 1})),
            row(json!({"id": "b", "x": 1})),
            row(json!({"id": "c", "x": "", "y": 3})),
            row(json!({"id": "d", "x": 4, "y": 4})),
        ];
        let report = normalize_rows(&rows);
        assert_eq!(report.pois.len(), 1);
        assert_eq!(report.pois[0].id, "d");
        assert_eq!(
            report.dropped,
            vec![
                DroppedRow { row: 0, reason: DropReason::NonNumericX },
                DroppedRow { row: 1, reason: DropReason::NonNumericY },
                DroppedRow { row: 2, reason: DropReason::NonNumericX },
            ]
        );
    }

    #[test]
    fn invalid_priority_falls_back_to_lowest() {
        let rows = vec![
            row(json!({"x": 1, "y": 1, "priority": "high"})),
            row(json!({"x": 1, "y": 1, "priority": ""})),
            row(json!({"x": 1, "y": 1})),
            row(json!({"x": 1, "y": 1, "priority": 3.9})),
        ];
        let report = normalize_rows(&rows);
        let priorities: Vec<i64> = report.pois.iter().map(|p| p.priority).collect();
        assert_eq!(priorities, vec![LOWEST_PRIORITY, LOWEST_PRIORITY, LOWEST_PRIORITY, 3]);
    }

    #[test]
    fn parse_rows_rejects_non_array() {
        assert!(matches!(parse_rows_json("{}"), Err(Error::RowsNotArray)));
        assert!(matches!(parse_rows_json("[1]"), Err(Error::RowsNotArray)));
        assert!(parse_rows_json("not json").is_err());
    }

    #[test]
    fn load_pois_json_round_trips_rows() {
        let report = load_pois_json(r#"[{"id":"a","x":1,"y":2,"name":"A"}]"#).unwrap();
        assert_eq!(report.pois.len(), 1);
        assert_eq!(report.pois[0].name, "A");
    }
}
