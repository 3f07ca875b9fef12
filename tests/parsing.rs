use std::fs;
use std::path::PathBuf;

use scraper::{Html, Selector};

use ata_standings::events::EventName;
use ata_standings::parser::{
    PageSection, SectionExtractor, SiblingTableExtractor, parse_standings, parse_standings_with,
};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn known_event_kept_and_unknown_event_dropped() {
    let parsed = parse_standings(&read_fixture("forms_and_unknown.html"));
    let events: Vec<EventName> = parsed.iter().map(|(event, _)| event).collect();
    assert_eq!(events, vec![EventName::Forms]);

    let forms = parsed.get(EventName::Forms);
    assert_eq!(forms.len(), 2);
    assert_eq!(forms[0].name, "Jane Doe");
    assert_eq!(forms[0].points, 50);
    assert_eq!(forms[0].location, "Atlanta, GA");
    assert_eq!(forms[1].name, "Amy Lee");
    assert_eq!(forms[1].points, 40);
    assert_eq!(forms[1].rank_on_page, 2);

    let leaked = parsed
        .iter()
        .flat_map(|(_, rows)| rows.iter())
        .any(|row| row.name == "Should Not Appear");
    assert!(!leaked);
}

#[test]
fn state_page_handles_wrappers_and_bad_rows() {
    let parsed = parse_standings(&read_fixture("state_ga.html"));

    let forms = parsed.get(EventName::Forms);
    let names: Vec<&str> = forms.iter().map(|row| row.name.as_str()).collect();
    assert_eq!(names, vec!["Jane Doe", "Kim Park", "Lee Ortiz"]);
    assert_eq!(forms[0].points, 1050);

    // Table reached past a non-table sibling; first row is a td header.
    let combat = parsed.get(EventName::CombatWeapons);
    assert_eq!(combat.len(), 1);
    assert_eq!(combat[0].points, 22);

    // Header directly followed by another header has no table of its own.
    assert!(parsed.get(EventName::Sparring).is_empty());

    // Duplicates survive parsing; dedupe happens later.
    assert_eq!(parsed.get(EventName::Weapons).len(), 2);
}

#[test]
fn zero_and_non_numeric_points_never_appear() {
    let parsed = parse_standings(&read_fixture("state_ga.html"));
    for (_, rows) in parsed.iter() {
        for row in rows {
            assert!(row.points > 0);
            assert_ne!(row.name, "Zero Points");
            assert_ne!(row.name, "No Points");
            assert_ne!(row.name, "Short Row");
        }
    }
}

#[test]
fn header_in_wrapper_finds_table_in_next_wrapper() {
    let parsed = parse_standings(&read_fixture("worlds.html"));
    assert_eq!(parsed.get(EventName::Forms).len(), 4);
    assert_eq!(parsed.get(EventName::CreativeForms).len(), 1);
}

#[test]
fn table_ahead_of_next_header_in_shared_wrapper_is_kept() {
    let parsed = parse_standings(&read_fixture("shared_wrapper.html"));

    let forms = parsed.get(EventName::Forms);
    assert_eq!(forms.len(), 1);
    assert_eq!(forms[0].name, "Jane Doe");

    let weapons = parsed.get(EventName::Weapons);
    assert_eq!(weapons.len(), 1);
    assert_eq!(weapons[0].name, "Amy Lee");

    // Trailing header inside the wrapper has nothing after it.
    assert!(parsed.get(EventName::Sparring).is_empty());
}

#[test]
fn labels_match_exactly_after_whitespace_collapse() {
    let html = r#"
<div class="tournament-header"><span class="tournament-name">FORMS</span></div>
<table>
  <tr><th>Rank</th><th>Name</th><th>Points</th><th>Location</th></tr>
  <tr><td>1</td><td>Jane Doe</td><td>50</td><td>Atlanta, GA</td></tr>
</table>
<div class="tournament-header"><span class="tournament-name"> Creative
   Weapons </span></div>
<table>
  <tr><th>Rank</th><th>Name</th><th>Points</th><th>Location</th></tr>
  <tr><td>1</td><td>Amy Lee</td><td>40</td><td>Dallas, TX</td></tr>
</table>"#;
    let parsed = parse_standings(html);
    let events: Vec<EventName> = parsed.iter().map(|(event, _)| event).collect();
    assert_eq!(events, vec![EventName::CreativeWeapons]);
}

#[test]
fn mismatched_headers_and_tables_pair_what_lines_up() {
    let parsed = parse_standings(&read_fixture("mismatched.html"));
    assert_eq!(parsed.get(EventName::Forms).len(), 1);
    assert!(parsed.get(EventName::Weapons).is_empty());
    let sparring = parsed.get(EventName::Sparring);
    assert_eq!(sparring.len(), 1);
    assert_eq!(sparring[0].name, "Stray Table");
}

#[test]
fn page_without_headers_is_empty() {
    assert!(parse_standings("<html><body><table><tr><td>1</td></tr></table></body></html>").is_empty());
    assert!(parse_standings("").is_empty());
}

#[test]
fn custom_selectors_cover_alternate_markup() {
    let html = r#"
<div>
  <h3 class="event"><b>Sparring</b></h3>
  <table>
    <tr><th>#</th><th>Competitor</th><th>Pts</th><th>From</th></tr>
    <tr><td>1</td><td>Ann Ko</td><td>14</td><td>Reno, NV</td></tr>
  </table>
</div>"#;
    let extractor = SiblingTableExtractor::new("h3.event", "b").expect("selectors parse");
    let parsed = parse_standings_with(html, &extractor);
    let sparring = parsed.get(EventName::Sparring);
    assert_eq!(sparring.len(), 1);
    assert_eq!(sparring[0].name, "Ann Ko");
}

#[test]
fn invalid_selector_is_rejected() {
    assert!(SiblingTableExtractor::new("div[", "span").is_err());
}

/// Layout where every list item is an event and its data rows are encoded
/// as pipe-separated text.
struct ListExtractor;

impl SectionExtractor for ListExtractor {
    fn sections(&self, document: &Html) -> Vec<PageSection> {
        let Ok(item) = Selector::parse("li") else {
            return Vec::new();
        };
        document
            .select(&item)
            .filter_map(|li| {
                let label = li.value().attr("data-event")?.to_string();
                let rows: Vec<Vec<String>> = li
                    .text()
                    .collect::<String>()
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(|line| {
                        line.split('|')
                            .map(|c| c.trim().to_string())
                            .collect::<Vec<String>>()
                    })
                    .collect();
                Some(PageSection { label, rows })
            })
            .collect()
    }
}

#[test]
fn pluggable_extractor_feeds_same_row_rules() {
    let html = r#"<ul>
<li data-event="Creative Weapons">
1 | Ann Ko | 14 | Reno, NV
2 | Bad Row | 0 | Reno, NV
</li>
<li data-event="Board Breaking">1 | Nope | 9 | Reno, NV</li>
</ul>"#;
    let parsed = parse_standings_with(html, &ListExtractor);
    let events: Vec<EventName> = parsed.iter().map(|(event, _)| event).collect();
    assert_eq!(events, vec![EventName::CreativeWeapons]);
    assert_eq!(parsed.get(EventName::CreativeWeapons).len(), 1);
}
