//! Standings page extraction.
//!
//! A page is a run of event blocks: a header element carrying the event name
//! in a styled label, followed somewhere among its later siblings by the
//! results table. Each header claims the first table that follows it before
//! the next header starts; a header with no such table yields nothing, so a
//! page with more headers than tables (or the reverse) degrades to the pairs
//! that do line up. A wrapper holding both a table and a later header hands
//! the table to whichever header precedes it in document order.
//!
//! Header labels are compared to the event names after collapsing runs of
//! whitespace, and are otherwise case-sensitive.

use anyhow::{Result, anyhow};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::events::{EventName, normalize_whitespace};
use crate::standings::{CombinedStandings, StandingEntry};

pub const DEFAULT_HEADER_SELECTOR: &str = "div.tournament-header";
pub const DEFAULT_LABEL_SELECTOR: &str = "span.tournament-name, span.text-primary";

/// One event block as found on a page: the raw header label and the text of
/// every data row of its table, header row already dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSection {
    pub label: String,
    pub rows: Vec<Vec<String>>,
}

/// Layout-specific step that turns a document into event blocks. Everything
/// downstream only sees `PageSection`s.
pub trait SectionExtractor: Send + Sync {
    fn sections(&self, document: &Html) -> Vec<PageSection>;
}

pub struct SiblingTableExtractor {
    header: Selector,
    label: Selector,
    table: Selector,
    row: Selector,
    cell: Selector,
}

impl SiblingTableExtractor {
    pub fn new(header_css: &str, label_css: &str) -> Result<Self> {
        Ok(Self {
            header: selector(header_css)?,
            label: selector(label_css)?,
            table: selector("table")?,
            row: selector("tr")?,
            cell: selector("td, th")?,
        })
    }

    pub fn site_default() -> Result<Self> {
        Self::new(DEFAULT_HEADER_SELECTOR, DEFAULT_LABEL_SELECTOR)
    }

    fn label_text(&self, header: ElementRef<'_>) -> String {
        let text = match header.select(&self.label).next() {
            Some(label) => label.text().collect::<String>(),
            None => header.text().collect::<String>(),
        };
        normalize_whitespace(&text)
    }

    /// First table or header inside `element` (itself included), in document
    /// order. `Some(None)` means a header came first.
    fn first_table_or_header<'a>(
        &self,
        element: ElementRef<'a>,
    ) -> Option<Option<ElementRef<'a>>> {
        for node in element.descendants().filter_map(ElementRef::wrap) {
            if self.header.matches(&node) {
                return Some(None);
            }
            if self.table.matches(&node) {
                return Some(Some(node));
            }
        }
        None
    }

    /// Walk the header's following siblings, then its parent's, until a table
    /// turns up. Running into another header first means this one has none.
    fn table_for<'a>(&self, header: ElementRef<'a>) -> Option<ElementRef<'a>> {
        let mut anchor = Some(header);
        for _ in 0..2 {
            let current = anchor?;
            for sibling in current.next_siblings().filter_map(ElementRef::wrap) {
                if let Some(found) = self.first_table_or_header(sibling) {
                    return found;
                }
            }
            anchor = current.parent().and_then(ElementRef::wrap);
        }
        None
    }

    fn table_rows(&self, table: ElementRef<'_>) -> Vec<Vec<String>> {
        table
            .select(&self.row)
            .skip(1)
            .map(|row| {
                row.select(&self.cell)
                    .map(|cell| normalize_whitespace(&cell.text().collect::<String>()))
                    .collect()
            })
            .collect()
    }
}

impl SectionExtractor for SiblingTableExtractor {
    fn sections(&self, document: &Html) -> Vec<PageSection> {
        let mut out = Vec::new();
        for header in document.select(&self.header) {
            let label = self.label_text(header);
            let Some(table) = self.table_for(header) else {
                debug!(label = %label, "event header without a results table");
                continue;
            };
            out.push(PageSection {
                label,
                rows: self.table_rows(table),
            });
        }
        out
    }
}

static SITE_EXTRACTOR: Lazy<Option<SiblingTableExtractor>> =
    Lazy::new(|| match SiblingTableExtractor::site_default() {
        Ok(extractor) => Some(extractor),
        Err(err) => {
            warn!("default standings selectors rejected: {err:#}");
            None
        }
    });

/// Parse a standings page with the site's own layout.
pub fn parse_standings(html: &str) -> CombinedStandings {
    match SITE_EXTRACTOR.as_ref() {
        Some(extractor) => parse_standings_with(html, extractor),
        None => CombinedStandings::new(),
    }
}

pub fn parse_standings_with(html: &str, extractor: &dyn SectionExtractor) -> CombinedStandings {
    let document = Html::parse_document(html);
    let mut out = CombinedStandings::new();
    for section in extractor.sections(&document) {
        let Some(event) = EventName::from_label(&section.label) else {
            debug!(label = %section.label, "skipping unknown event");
            continue;
        };
        let entries = section.rows.iter().filter_map(|cells| {
            let entry = parse_row(cells);
            if entry.is_none() {
                debug!(event = %event, ?cells, "skipping unusable row");
            }
            entry
        });
        out.extend(event, entries);
    }
    out
}

/// Rank, name, points, location, in that order. All four must be present and
/// points must be a positive integer.
pub fn parse_row(cells: &[String]) -> Option<StandingEntry> {
    let [rank, name, points, location] = cells.get(..4)? else {
        return None;
    };
    if [rank, name, points, location]
        .iter()
        .any(|cell| cell.trim().is_empty())
    {
        return None;
    }
    let points = parse_int(points)?;
    if points <= 0 {
        return None;
    }
    Some(StandingEntry {
        rank_on_page: parse_int(rank)?,
        name: normalize_whitespace(name),
        points,
        location: normalize_whitespace(location),
    })
}

fn parse_int(raw: &str) -> Option<i64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    cleaned.trim().parse::<i64>().ok()
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|err| anyhow!("invalid selector {css:?}: {err}"))
}
