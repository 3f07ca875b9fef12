use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Country {
    US,
    CA,
}

impl Country {
    pub fn code(self) -> &'static str {
        match self {
            Country::US => "US",
            Country::CA => "CA",
        }
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Region {
    pub name: &'static str,
    pub country: Country,
    pub code: &'static str,
}

const fn us(name: &'static str, code: &'static str) -> Region {
    Region {
        name,
        country: Country::US,
        code,
    }
}

const fn ca(name: &'static str, code: &'static str) -> Region {
    Region {
        name,
        country: Country::CA,
        code,
    }
}

pub const REGIONS: &[Region] = &[
    us("Alabama", "AL"),
    us("Alaska", "AK"),
    us("Arizona", "AZ"),
    us("Arkansas", "AR"),
    us("California", "CA"),
    us("Colorado", "CO"),
    us("Connecticut", "CT"),
    us("Delaware", "DE"),
    us("District of Columbia", "DC"),
    us("Florida", "FL"),
    us("Georgia", "GA"),
    us("Hawaii", "HI"),
    us("Idaho", "ID"),
    us("Illinois", "IL"),
    us("Indiana", "IN"),
    us("Iowa", "IA"),
    us("Kansas", "KS"),
    us("Kentucky", "KY"),
    us("Louisiana", "LA"),
    us("Maine", "ME"),
    us("Maryland", "MD"),
    us("Massachusetts", "MA"),
    us("Michigan", "MI"),
    us("Minnesota", "MN"),
    us("Mississippi", "MS"),
    us("Missouri", "MO"),
    us("Montana", "MT"),
    us("Nebraska", "NE"),
    us("Nevada", "NV"),
    us("New Hampshire", "NH"),
    us("New Jersey", "NJ"),
    us("New Mexico", "NM"),
    us("New York", "NY"),
    us("North Carolina", "NC"),
    us("North Dakota", "ND"),
    us("Ohio", "OH"),
    us("Oklahoma", "OK"),
    us("Oregon", "OR"),
    us("Pennsylvania", "PA"),
    us("Rhode Island", "RI"),
    us("South Carolina", "SC"),
    us("South Dakota", "SD"),
    us("Tennessee", "TN"),
    us("Texas", "TX"),
    us("Utah", "UT"),
    us("Vermont", "VT"),
    us("Virginia", "VA"),
    us("Washington", "WA"),
    us("West Virginia", "WV"),
    us("Wisconsin", "WI"),
    us("Wyoming", "WY"),
    ca("Alberta", "AB"),
    ca("British Columbia", "BC"),
    ca("Manitoba", "MB"),
    ca("New Brunswick", "NB"),
    ca("Newfoundland and Labrador", "NL"),
    ca("Northwest Territories", "NT"),
    ca("Nova Scotia", "NS"),
    ca("Nunavut", "NU"),
    ca("Ontario", "ON"),
    ca("Prince Edward Island", "PE"),
    ca("Quebec", "QC"),
    ca("Saskatchewan", "SK"),
    ca("Yukon", "YT"),
];

/// Resolve a selection token to a region: case-insensitive full name first,
/// then two-letter code. "CA" is California; Canada itself is never a region.
pub fn resolve_region(token: &str) -> Option<&'static Region> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }
    if let Some(region) = REGIONS
        .iter()
        .find(|r| r.name.eq_ignore_ascii_case(token))
    {
        return Some(region);
    }
    if token.len() != 2 {
        return None;
    }
    REGIONS.iter().find(|r| r.code.eq_ignore_ascii_case(token))
}

/// Resolve a delimited list of region tokens. Unknown tokens are dropped and
/// duplicates are kept once, in first-seen order.
pub fn resolve_regions(raw: &str) -> Vec<&'static Region> {
    let mut out: Vec<&'static Region> = Vec::new();
    for token in raw.split([',', ';', '/', '|']) {
        let Some(region) = resolve_region(token) else {
            continue;
        };
        if !out.iter().any(|r| std::ptr::eq(*r, region)) {
            out.push(region);
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionScope {
    Single(&'static Region),
    All,
    International,
    District {
        name: String,
        regions: Vec<&'static Region>,
    },
}

impl RegionScope {
    /// Parse a top-level selection: "All", "International", or a region.
    /// Districts come from a mapping sheet; see `DistrictMap::scope`.
    pub fn parse(selection: &str) -> Option<Self> {
        let trimmed = selection.trim();
        if trimmed.eq_ignore_ascii_case("all") || trimmed.eq_ignore_ascii_case("all regions") {
            return Some(RegionScope::All);
        }
        if trimmed.eq_ignore_ascii_case("international") {
            return Some(RegionScope::International);
        }
        resolve_region(trimmed).map(RegionScope::Single)
    }
}

impl fmt::Display for RegionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionScope::Single(region) => f.write_str(region.name),
            RegionScope::All => f.write_str("All"),
            RegionScope::International => f.write_str("International"),
            RegionScope::District { name, .. } => write!(f, "{name} district"),
        }
    }
}

pub fn state_standings_url(base_url: &str, region: &Region, division_code: &str) -> String {
    format!(
        "{}/state-standings/?country={}&state={}&code={}",
        base_url.trim_end_matches('/'),
        region.country.code(),
        region.code,
        division_code
    )
}

pub fn worlds_standings_url(base_url: &str, division_code: &str) -> String {
    format!(
        "{}/worlds-standings/?code={}",
        base_url.trim_end_matches('/'),
        division_code
    )
}
