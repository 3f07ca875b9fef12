use std::collections::HashSet;

use crate::events::EventName;
use crate::standings::{CombinedStandings, RankedEntry, RankedStandings, StandingEntry};

/// Collapse duplicates and assign competition ranks, event by event.
pub fn dedupe_and_rank(combined: &CombinedStandings) -> RankedStandings {
    let mut out = RankedStandings::default();
    for (event, entries) in combined.iter() {
        let mut unique = dedupe_entries(entries);
        sort_for_ranking(&mut unique);
        out.insert(event, assign_ranks(&unique));
    }
    out
}

/// Two rows are the same competitor result only when lowercase name,
/// location and points all match. First occurrence wins.
///
/// Names and locations arrive whitespace-collapsed from `parse_row`, so
/// "Jane  Doe" and "Jane Doe" scraped from two pages share one key. Rows
/// built by hand are compared exactly as given.
pub fn dedupe_entries(entries: &[StandingEntry]) -> Vec<StandingEntry> {
    let mut seen: HashSet<(String, &str, i64)> = HashSet::new();
    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        let key = (entry.name.to_lowercase(), entry.location.as_str(), entry.points);
        if seen.insert(key) {
            out.push(entry.clone());
        }
    }
    out
}

// Points descending, then name; location only separates exact name ties.
fn sort_for_ranking(entries: &mut [StandingEntry]) {
    entries.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.location.cmp(&b.location))
    });
}

/// Standard competition ranking over an already sorted list: equal points
/// share a rank and the next distinct score takes its 1-based position, so
/// `[50, 40, 40, 30]` ranks as `[1, 2, 2, 4]`.
pub fn assign_ranks(sorted: &[StandingEntry]) -> Vec<RankedEntry> {
    let mut out: Vec<RankedEntry> = Vec::with_capacity(sorted.len());
    for (idx, entry) in sorted.iter().enumerate() {
        let rank = match out.last() {
            Some(prev) if prev.points == entry.points => prev.rank,
            _ => idx as u32 + 1,
        };
        out.push(RankedEntry {
            rank,
            name: entry.name.clone(),
            points: entry.points,
            location: entry.location.clone(),
        });
    }
    out
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayFilter {
    pub event: Option<EventName>,
    pub name: Option<String>,
}

impl DisplayFilter {
    pub fn is_empty(&self) -> bool {
        self.event.is_none() && self.name_query().is_none()
    }

    fn name_query(&self) -> Option<String> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase)
    }
}

/// Narrow ranked standings for display. Ranks were fixed against the full
/// field and are left untouched.
pub fn filter_standings(ranked: &RankedStandings, filter: &DisplayFilter) -> RankedStandings {
    let query = filter.name_query();
    let mut out = RankedStandings::default();
    for (event, entries) in ranked.iter() {
        if filter.event.is_some_and(|wanted| wanted != event) {
            continue;
        }
        let kept: Vec<RankedEntry> = entries
            .iter()
            .filter(|entry| {
                query
                    .as_deref()
                    .is_none_or(|q| entry.name.to_lowercase().contains(q))
            })
            .cloned()
            .collect();
        out.insert(event, kept);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{assign_ranks, sort_for_ranking};
    use crate::standings::StandingEntry;

    fn entry(name: &str, points: i64) -> StandingEntry {
        StandingEntry {
            rank_on_page: 0,
            name: name.to_string(),
            points,
            location: "Austin, TX".to_string(),
        }
    }

    #[test]
    fn ties_share_rank_and_skip_positions() {
        let mut rows = vec![entry("D", 30), entry("C", 40), entry("A", 50), entry("B", 40)];
        sort_for_ranking(&mut rows);
        let ranks: Vec<u32> = assign_ranks(&rows).iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 2, 4]);
    }

    #[test]
    fn leading_tie_then_distinct() {
        let mut rows = vec![entry("A", 10), entry("B", 10), entry("C", 10), entry("D", 5)];
        sort_for_ranking(&mut rows);
        let ranks: Vec<u32> = assign_ranks(&rows).iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 1, 1, 4]);
    }

    #[test]
    fn tie_order_is_by_name() {
        let mut rows = vec![entry("Zoe", 40), entry("Amy", 40)];
        sort_for_ranking(&mut rows);
        assert_eq!(rows[0].name, "Amy");
        assert_eq!(rows[1].name, "Zoe");
    }
}
