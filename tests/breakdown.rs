use std::fs;
use std::path::PathBuf;

use ata_standings::breakdown::{BreakdownSheet, lookup};
use ata_standings::events::EventName;
use ata_standings::fetch::PageFetcher;

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn fixture_sheet() -> BreakdownSheet {
    let raw = fs::read_to_string(fixture_path("breakdown.csv")).expect("fixture file should be readable");
    BreakdownSheet::from_reader(raw.as_bytes()).expect("fixture should parse")
}

struct NoNetwork;

impl PageFetcher for NoNetwork {
    fn fetch(&self, _url: &str) -> Option<String> {
        None
    }
}

#[test]
fn lookup_matches_name_case_insensitively() {
    let sheet = BreakdownSheet::from_reader(
        "Name,Date,Tournament,Type,Forms\nJANE DOE,2024-01-01,X,A,12\n".as_bytes(),
    )
    .expect("sheet parses");
    let rows = lookup("jane doe", EventName::Forms, &sheet);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].points, 12.0);
    assert_eq!(rows[0].date, "2024-01-01");
    assert_eq!(rows[0].tournament, "X");
    assert_eq!(rows[0].kind, "A");

    assert!(lookup("jane doe", EventName::Weapons, &sheet).is_empty());
}

#[test]
fn lookup_skips_zero_and_non_numeric_cells() {
    let sheet = fixture_sheet();
    assert_eq!(sheet.len(), 4);

    let forms = lookup(" Jane Doe", EventName::Forms, &sheet);
    let tournaments: Vec<(&str, f64)> = forms
        .iter()
        .map(|row| (row.tournament.as_str(), row.points))
        .collect();
    assert_eq!(tournaments, vec![("X", 12.0), ("Regional Cup", 7.0)]);

    let combat = lookup("jane doe", EventName::CombatWeapons, &sheet);
    assert_eq!(combat.len(), 1);
    assert_eq!(combat[0].tournament, "Spring Open");

    let sparring = lookup("AMY LEE", EventName::Sparring, &sheet);
    assert_eq!(sparring.len(), 1);
    assert_eq!(sparring[0].points, 4.0);

    assert!(lookup("Nobody", EventName::Forms, &sheet).is_empty());
    assert!(!sheet.has_event(EventName::XtremeForms));
}

#[test]
fn breakdown_rows_serialize_with_display_keys() {
    let sheet = fixture_sheet();
    let rows = lookup("amy lee", EventName::Forms, &sheet);
    let json = serde_json::to_value(&rows).expect("serializes");
    assert_eq!(json[0]["Points"], 20.0);
    assert_eq!(json[0]["Type"], "A");
}

#[test]
fn fractional_points_are_kept_as_written() {
    let sheet = BreakdownSheet::from_reader(
        "Name,Date,Tournament,Type,Forms\n\
         Jane,2024-01-01,X,A,0.4\n\
         Jane,2024-02-01,Y,A,2.5\n\
         Jane,2024-03-01,Z,A,-1.5\n"
            .as_bytes(),
    )
    .expect("sheet parses");
    let rows = lookup("jane", EventName::Forms, &sheet);
    let tournaments: Vec<(&str, f64)> = rows
        .iter()
        .map(|row| (row.tournament.as_str(), row.points))
        .collect();
    assert_eq!(tournaments, vec![("X", 0.4), ("Y", 2.5)]);

    let json = serde_json::to_value(&rows).expect("serializes");
    assert_eq!(json[1]["Points"], 2.5);
}

#[test]
fn missing_required_column_fails_load() {
    assert!(BreakdownSheet::from_reader("Name,Forms\nA,1\n".as_bytes()).is_err());
}

#[test]
fn load_failures_become_an_empty_sheet() {
    let missing = BreakdownSheet::load_or_empty(&NoNetwork, "/definitely/not/here.csv");
    assert!(missing.is_empty());
    assert!(lookup("jane doe", EventName::Forms, &missing).is_empty());

    let offline = BreakdownSheet::load_or_empty(&NoNetwork, "https://sheets.test/export.csv");
    assert!(offline.is_empty());

    let from_file = BreakdownSheet::load_or_empty(
        &NoNetwork,
        fixture_path("breakdown.csv").to_str().expect("utf-8 path"),
    );
    assert_eq!(from_file.len(), 4);
}
