use std::fmt::Write as _;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::breakdown::{BreakdownSheet, TournamentContribution, lookup};
use crate::events::EventName;
use crate::regions::RegionScope;
use crate::standings::{RankedEntry, RankedStandings};

const NO_BREAKDOWN: &str = "No tournament data for this event.";

pub fn no_standings_message(scope: &RegionScope, division_code: &str) -> String {
    match scope {
        RegionScope::Single(region) => format!(
            "There are no standings for {} in division {division_code}.",
            region.name
        ),
        RegionScope::International => {
            format!("There are no standings for International in division {division_code}.")
        }
        _ => "No standings data found for this selection.".to_string(),
    }
}

pub fn render_text(ranked: &RankedStandings, sheet: Option<&BreakdownSheet>) -> String {
    let mut out = String::new();
    for (event, entries) in ranked.iter() {
        if !out.is_empty() {
            out.push('\n');
        }
        render_event(&mut out, event, entries, sheet);
    }
    out
}

fn render_event(
    out: &mut String,
    event: EventName,
    entries: &[RankedEntry],
    sheet: Option<&BreakdownSheet>,
) {
    let name_w = column_width("Name", entries.iter().map(|e| e.name.as_str()));
    let loc_w = column_width("Location", entries.iter().map(|e| e.location.as_str()));

    let _ = writeln!(out, "{event}");
    let _ = writeln!(out, "{}", "=".repeat(event.label().len()));
    let _ = writeln!(
        out,
        "{:>4}  {:<name_w$}  {:>6}  {:<loc_w$}",
        "Rank", "Name", "Points", "Location"
    );
    for entry in entries {
        let _ = writeln!(
            out,
            "{:>4}  {:<name_w$}  {:>6}  {:<loc_w$}",
            entry.rank, entry.name, entry.points, entry.location
        );
        if let Some(sheet) = sheet {
            render_breakdown(out, &lookup(&entry.name, event, sheet));
        }
    }
}

fn render_breakdown(out: &mut String, rows: &[TournamentContribution]) {
    if rows.is_empty() {
        let _ = writeln!(out, "        {NO_BREAKDOWN}");
        return;
    }
    for row in rows {
        let _ = writeln!(
            out,
            "        {}  {}  ({})  {}",
            row.date, row.tournament, row.kind, row.points
        );
    }
}

fn column_width<'a>(title: &str, values: impl Iterator<Item = &'a str>) -> usize {
    values
        .map(|v| v.chars().count())
        .max()
        .unwrap_or(0)
        .max(title.len())
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    #[serde(rename = "Event")]
    event: EventName,
    #[serde(rename = "Entries")]
    entries: Vec<JsonEntry<'a>>,
}

#[derive(Serialize)]
struct JsonEntry<'a> {
    #[serde(flatten)]
    entry: &'a RankedEntry,
    #[serde(rename = "Breakdown", skip_serializing_if = "Option::is_none")]
    breakdown: Option<Vec<TournamentContribution>>,
}

pub fn render_json(ranked: &RankedStandings, sheet: Option<&BreakdownSheet>) -> Result<String> {
    let events: Vec<JsonEvent<'_>> = ranked
        .iter()
        .map(|(event, entries)| JsonEvent {
            event,
            entries: entries
                .iter()
                .map(|entry| JsonEntry {
                    entry,
                    breakdown: sheet.map(|sheet| lookup(&entry.name, event, sheet)),
                })
                .collect(),
        })
        .collect();
    serde_json::to_string_pretty(&events).context("serialize standings")
}
