use std::io::Read;

use anyhow::{Context, Result, anyhow};
use tracing::warn;

use crate::fetch::{PageFetcher, load_text_source};
use crate::regions::{Region, RegionScope, resolve_regions};

/// District name to member regions, from a sheet with `District` and `State`
/// columns. A district may span several rows and a `State` cell may list
/// several regions.
#[derive(Debug, Clone, Default)]
pub struct DistrictMap {
    districts: Vec<(String, Vec<&'static Region>)>,
}

impl DistrictMap {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = csv_reader.headers().context("read district header")?.clone();
        let position = |wanted: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(wanted))
        };
        let district_col = position("District").ok_or_else(|| anyhow!("missing District column"))?;
        let state_col = position("State")
            .or_else(|| position("States"))
            .or_else(|| position("Region"))
            .ok_or_else(|| anyhow!("missing State column"))?;

        let mut map = DistrictMap::default();
        for record in csv_reader.records() {
            let Ok(record) = record else {
                continue;
            };
            let district = record.get(district_col).unwrap_or_default();
            let states = record.get(state_col).unwrap_or_default();
            if district.is_empty() {
                continue;
            }
            map.add(district, resolve_regions(states));
        }
        Ok(map)
    }

    pub fn load_or_empty(fetcher: &dyn PageFetcher, location: &str) -> Self {
        let Some(raw) = load_text_source(fetcher, location) else {
            return Self::default();
        };
        match Self::from_reader(raw.as_bytes()) {
            Ok(map) => map,
            Err(err) => {
                warn!(location, "district sheet unusable: {err:#}");
                Self::default()
            }
        }
    }

    fn add(&mut self, district: &str, regions: Vec<&'static Region>) {
        let slot = match self
            .districts
            .iter()
            .position(|(name, _)| name.eq_ignore_ascii_case(district))
        {
            Some(idx) => &mut self.districts[idx].1,
            None => {
                self.districts.push((district.to_string(), Vec::new()));
                let last = self.districts.len() - 1;
                &mut self.districts[last].1
            }
        };
        for region in regions {
            if !slot.iter().any(|r| std::ptr::eq(*r, region)) {
                slot.push(region);
            }
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.districts.iter().map(|(name, _)| name.as_str())
    }

    pub fn regions(&self, district: &str) -> &[&'static Region] {
        let district = district.trim();
        self.districts
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(district))
            .map(|(_, regions)| regions.as_slice())
            .unwrap_or(&[])
    }

    /// An unknown district still yields a scope; it just covers no regions.
    pub fn scope(&self, district: &str) -> RegionScope {
        let name = self
            .districts
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(district.trim()))
            .map(|(name, _)| name.clone())
            .unwrap_or_else(|| district.trim().to_string());
        RegionScope::District {
            name,
            regions: self.regions(district).to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DistrictMap;
    use crate::regions::RegionScope;

    const SHEET: &str = "District,State\nSoutheast,GA\nSoutheast,\"Florida, AL\"\nSouthwest,TX\nSoutheast,ga\nNowhere,ZZ\n";

    #[test]
    fn groups_rows_by_district() {
        let map = DistrictMap::from_reader(SHEET.as_bytes()).expect("sheet parses");
        let codes: Vec<&str> = map.regions("southeast").iter().map(|r| r.code).collect();
        assert_eq!(codes, vec!["GA", "FL", "AL"]);
        assert!(map.regions("Nowhere").is_empty());
        assert_eq!(map.names().count(), 3);
    }

    #[test]
    fn unknown_district_scope_is_empty() {
        let map = DistrictMap::from_reader(SHEET.as_bytes()).expect("sheet parses");
        match map.scope("Atlantis") {
            RegionScope::District { name, regions } => {
                assert_eq!(name, "Atlantis");
                assert!(regions.is_empty());
            }
            other => panic!("unexpected scope {other:?}"),
        }
    }

    #[test]
    fn missing_columns_is_an_error() {
        assert!(DistrictMap::from_reader("Name,Code\nA,B\n".as_bytes()).is_err());
    }
}
