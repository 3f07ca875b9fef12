use std::collections::BTreeMap;

use serde::Serialize;

use crate::events::EventName;

/// One scraped row. `rank_on_page` is whatever the page printed and is
/// replaced by the ranker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandingEntry {
    pub rank_on_page: i64,
    pub name: String,
    pub points: i64,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedEntry {
    #[serde(rename = "Rank")]
    pub rank: u32,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Points")]
    pub points: i64,
    #[serde(rename = "Location")]
    pub location: String,
}

/// Per-event entries after merging every fetched page, before dedupe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombinedStandings {
    events: BTreeMap<EventName, Vec<StandingEntry>>,
}

impl CombinedStandings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to an event's list; never replaces what is already there.
    pub fn extend(&mut self, event: EventName, entries: impl IntoIterator<Item = StandingEntry>) {
        let list = self.events.entry(event).or_default();
        list.extend(entries);
        if list.is_empty() {
            self.events.remove(&event);
        }
    }

    pub fn merge(&mut self, other: CombinedStandings) {
        for (event, entries) in other.events {
            self.extend(event, entries);
        }
    }

    pub fn get(&self, event: EventName) -> &[StandingEntry] {
        self.events.get(&event).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (EventName, &[StandingEntry])> {
        self.events.iter().map(|(event, rows)| (*event, rows.as_slice()))
    }

    pub fn into_events(self) -> BTreeMap<EventName, Vec<StandingEntry>> {
        self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.values().all(Vec::is_empty)
    }

    pub fn entry_count(&self) -> usize {
        self.events.values().map(Vec::len).sum()
    }
}

/// Deduplicated, ranked per-event lists. Events iterate in the fixed
/// category order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RankedStandings {
    events: BTreeMap<EventName, Vec<RankedEntry>>,
}

impl RankedStandings {
    pub fn insert(&mut self, event: EventName, entries: Vec<RankedEntry>) {
        if entries.is_empty() {
            self.events.remove(&event);
        } else {
            self.events.insert(event, entries);
        }
    }

    pub fn get(&self, event: EventName) -> &[RankedEntry] {
        self.events.get(&event).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (EventName, &[RankedEntry])> {
        self.events.iter().map(|(event, rows)| (*event, rows.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.events.values().all(Vec::is_empty)
    }

    pub fn entry_count(&self) -> usize {
        self.events.values().map(Vec::len).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StandingsOutcome {
    Found(RankedStandings),
    NoStandings,
}

impl StandingsOutcome {
    pub fn from_ranked(ranked: RankedStandings) -> Self {
        if ranked.is_empty() {
            StandingsOutcome::NoStandings
        } else {
            StandingsOutcome::Found(ranked)
        }
    }
}
