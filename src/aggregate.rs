use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;
use tracing::{debug, info};

use crate::fetch::PageFetcher;
use crate::parser::parse_standings;
use crate::ranking::dedupe_and_rank;
use crate::regions::{REGIONS, Region, RegionScope, state_standings_url, worlds_standings_url};
use crate::standings::{CombinedStandings, StandingEntry, StandingsOutcome};

// Domestic World-page rows carry a trailing ", XX" region code.
static REGION_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",\s*[A-Z]{2}$").expect("region suffix pattern is valid"));

const WORLD_LABEL: &str = "World";

#[derive(Debug, Clone, Default)]
pub struct AggregateReport {
    pub standings: CombinedStandings,
    pub pages_fetched: usize,
    /// Sources that produced no page at all.
    pub missing: Vec<String>,
}

impl AggregateReport {
    pub fn is_empty(&self) -> bool {
        self.standings.is_empty()
    }
}

pub struct Aggregator<'a> {
    fetcher: &'a dyn PageFetcher,
    base_url: &'a str,
    parallelism: usize,
}

struct PageJob {
    label: String,
    url: String,
    world: bool,
}

impl<'a> Aggregator<'a> {
    pub fn new(fetcher: &'a dyn PageFetcher, base_url: &'a str) -> Self {
        Self {
            fetcher,
            base_url,
            parallelism: 1,
        }
    }

    pub fn with_parallelism(mut self, threads: usize) -> Self {
        self.parallelism = threads.max(1);
        self
    }

    pub fn aggregate(&self, scope: &RegionScope, division_code: &str) -> AggregateReport {
        let jobs = match scope {
            RegionScope::Single(region) => vec![self.region_job(region, division_code)],
            RegionScope::All => {
                let mut jobs: Vec<PageJob> = REGIONS
                    .iter()
                    .map(|region| self.region_job(region, division_code))
                    .collect();
                jobs.push(self.world_job(division_code));
                jobs
            }
            RegionScope::International => vec![self.world_job(division_code)],
            RegionScope::District { regions, .. } => regions
                .iter()
                .map(|region| self.region_job(region, division_code))
                .collect(),
        };

        info!(scope = %scope, division_code, pages = jobs.len(), "aggregating standings");
        let pages = self.fetch_all(&jobs);

        let mut report = AggregateReport::default();
        for (job, page) in jobs.iter().zip(pages) {
            let Some(parsed) = page else {
                report.missing.push(job.label.clone());
                continue;
            };
            report.pages_fetched += 1;
            if job.world {
                report.standings.merge(international_only(parsed));
            } else {
                report.standings.merge(parsed);
            }
        }
        debug!(
            entries = report.standings.entry_count(),
            missing = report.missing.len(),
            "aggregation finished"
        );
        report
    }

    /// Full pipeline for one selection: fetch, parse, merge, dedupe and rank.
    pub fn standings(&self, scope: &RegionScope, division_code: &str) -> StandingsOutcome {
        let report = self.aggregate(scope, division_code);
        if report.is_empty() {
            return StandingsOutcome::NoStandings;
        }
        StandingsOutcome::from_ranked(dedupe_and_rank(&report.standings))
    }

    fn region_job(&self, region: &Region, division_code: &str) -> PageJob {
        PageJob {
            label: region.name.to_string(),
            url: state_standings_url(self.base_url, region, division_code),
            world: false,
        }
    }

    fn world_job(&self, division_code: &str) -> PageJob {
        PageJob {
            label: WORLD_LABEL.to_string(),
            url: worlds_standings_url(self.base_url, division_code),
            world: true,
        }
    }

    // Results come back in job order whatever order the fetches finish in.
    fn fetch_all(&self, jobs: &[PageJob]) -> Vec<Option<CombinedStandings>> {
        let fetcher = self.fetcher;
        let load = |job: &PageJob| fetcher.fetch(&job.url).map(|html| parse_standings(&html));
        if self.parallelism <= 1 || jobs.len() <= 1 {
            return jobs.iter().map(load).collect();
        }
        with_fetch_pool(self.parallelism, || jobs.par_iter().map(load).collect())
    }
}

/// Heuristic: a location without a trailing two-letter uppercase code is
/// taken to be outside the US and Canada.
pub fn is_international(location: &str) -> bool {
    !REGION_SUFFIX.is_match(location.trim())
}

pub fn international_only(standings: CombinedStandings) -> CombinedStandings {
    let mut out = CombinedStandings::new();
    for (event, entries) in standings.into_events() {
        let kept: Vec<StandingEntry> = entries
            .into_iter()
            .filter(|entry| is_international(&entry.location))
            .collect();
        out.extend(event, kept);
    }
    out
}

fn with_fetch_pool<T>(threads: usize, action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool.install(action),
        Err(_) => action(),
    }
}
