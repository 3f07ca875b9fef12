use std::collections::{HashMap, HashSet};
use std::io::Read;

use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use tracing::{debug, warn};

use crate::events::EventName;
use crate::fetch::{PageFetcher, load_text_source};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TournamentContribution {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Tournament")]
    pub tournament: String,
    #[serde(rename = "Type")]
    pub kind: String,
    #[serde(rename = "Points")]
    pub points: f64,
}

#[derive(Debug, Clone)]
struct SheetRow {
    name: String,
    date: String,
    tournament: String,
    kind: String,
    points: HashMap<EventName, f64>,
}

/// One row per (competitor, tournament) with a points column per event.
/// Only event columns actually present in the header are tracked.
#[derive(Debug, Clone, Default)]
pub struct BreakdownSheet {
    rows: Vec<SheetRow>,
    events: HashSet<EventName>,
}

struct Columns {
    name: usize,
    date: usize,
    tournament: usize,
    kind: usize,
    events: Vec<(EventName, usize)>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let find = |wanted: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(wanted))
        };
        let mut missing = Vec::new();
        let mut require = |wanted: &'static str| {
            let idx = find(wanted);
            if idx.is_none() {
                missing.push(wanted);
            }
            idx.unwrap_or_default()
        };
        let name = require("Name");
        let date = require("Date");
        let tournament = require("Tournament");
        let kind = require("Type");
        if !missing.is_empty() {
            return Err(anyhow!("sheet is missing columns: {}", missing.join(", ")));
        }

        let mut events = Vec::new();
        for (idx, header) in headers.iter().enumerate() {
            if let Some(event) = EventName::from_label(header) {
                if !events.iter().any(|(e, _)| *e == event) {
                    events.push((event, idx));
                }
            }
        }
        Ok(Self {
            name,
            date,
            tournament,
            kind,
            events,
        })
    }
}

impl BreakdownSheet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = csv_reader.headers().context("read sheet header")?.clone();
        let columns = Columns::from_headers(&headers)?;

        let mut rows = Vec::new();
        for (line, record) in csv_reader.records().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(err) => {
                    debug!(line = line + 2, "skipping malformed sheet row: {err}");
                    continue;
                }
            };
            let cell = |idx: usize| record.get(idx).unwrap_or_default().to_string();
            let points = columns
                .events
                .iter()
                .map(|(event, idx)| (*event, coerce_points(record.get(*idx).unwrap_or_default())))
                .collect();
            rows.push(SheetRow {
                name: cell(columns.name),
                date: cell(columns.date),
                tournament: cell(columns.tournament),
                kind: cell(columns.kind),
                points,
            });
        }

        Ok(Self {
            rows,
            events: columns.events.iter().map(|(event, _)| *event).collect(),
        })
    }

    /// Load from a path or URL; any failure leaves an empty sheet.
    pub fn load_or_empty(fetcher: &dyn PageFetcher, location: &str) -> Self {
        let Some(raw) = load_text_source(fetcher, location) else {
            return Self::empty();
        };
        match Self::from_reader(raw.as_bytes()) {
            Ok(sheet) => sheet,
            Err(err) => {
                warn!(location, "breakdown sheet unusable: {err:#}");
                Self::empty()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_event(&self, event: EventName) -> bool {
        self.events.contains(&event)
    }
}

/// Tournaments where `name` scored in `event`, in sheet order.
pub fn lookup(name: &str, event: EventName, sheet: &BreakdownSheet) -> Vec<TournamentContribution> {
    if !sheet.has_event(event) {
        return Vec::new();
    }
    let wanted = name.trim().to_lowercase();
    sheet
        .rows
        .iter()
        .filter(|row| row.name.trim().to_lowercase() == wanted)
        .filter_map(|row| {
            let points = row.points.get(&event).copied().unwrap_or(0.0);
            (points > 0.0).then(|| TournamentContribution {
                date: row.date.clone(),
                tournament: row.tournament.clone(),
                kind: row.kind.clone(),
                points,
            })
        })
        .collect()
}

// Non-numeric cells count as zero. Fractions are kept as written.
fn coerce_points(raw: &str) -> f64 {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::coerce_points;

    #[test]
    fn coerce_points_treats_junk_as_zero() {
        assert_eq!(coerce_points("12"), 12.0);
        assert_eq!(coerce_points(" 1,200 "), 1200.0);
        assert_eq!(coerce_points("0.4"), 0.4);
        assert_eq!(coerce_points(""), 0.0);
        assert_eq!(coerce_points("DNP"), 0.0);
        assert_eq!(coerce_points("NaN"), 0.0);
        assert_eq!(coerce_points("inf"), 0.0);
    }
}
