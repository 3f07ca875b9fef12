use std::fmt;

use serde::{Serialize, Serializer};

/// The eight event categories the standings site publishes. Any other header
/// label on a page is ignored by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventName {
    Forms,
    Weapons,
    CombatWeapons,
    Sparring,
    CreativeForms,
    CreativeWeapons,
    XtremeForms,
    XtremeWeapons,
}

pub const EVENT_NAMES: [EventName; 8] = [
    EventName::Forms,
    EventName::Weapons,
    EventName::CombatWeapons,
    EventName::Sparring,
    EventName::CreativeForms,
    EventName::CreativeWeapons,
    EventName::XtremeForms,
    EventName::XtremeWeapons,
];

impl EventName {
    pub fn label(self) -> &'static str {
        match self {
            EventName::Forms => "Forms",
            EventName::Weapons => "Weapons",
            EventName::CombatWeapons => "Combat Weapons",
            EventName::Sparring => "Sparring",
            EventName::CreativeForms => "Creative Forms",
            EventName::CreativeWeapons => "Creative Weapons",
            EventName::XtremeForms => "X-Treme Forms",
            EventName::XtremeWeapons => "X-Treme Weapons",
        }
    }

    /// Match a scraped header label against the closed set. Runs of whitespace
    /// are collapsed first; the label must otherwise match exactly.
    pub fn from_label(raw: &str) -> Option<Self> {
        let normalized = normalize_whitespace(raw);
        EVENT_NAMES
            .iter()
            .copied()
            .find(|event| event.label() == normalized)
    }

    /// Looser match for names typed on the command line: case is ignored.
    pub fn from_user_input(raw: &str) -> Option<Self> {
        let normalized = normalize_whitespace(raw);
        EVENT_NAMES
            .iter()
            .copied()
            .find(|event| event.label().eq_ignore_ascii_case(&normalized))
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for EventName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

pub fn normalize_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
