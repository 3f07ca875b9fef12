use anyhow::{Context, Result, anyhow};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use ata_standings::aggregate::Aggregator;
use ata_standings::breakdown::BreakdownSheet;
use ata_standings::config::Settings;
use ata_standings::districts::DistrictMap;
use ata_standings::events::EventName;
use ata_standings::fetch::HttpFetcher;
use ata_standings::http_cache::build_page_cache;
use ata_standings::ranking::{DisplayFilter, filter_standings};
use ata_standings::regions::RegionScope;
use ata_standings::report::{no_standings_message, render_json, render_text};
use ata_standings::standings::StandingsOutcome;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    init_tracing();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if has_flag(&args, "--help") || has_flag(&args, "-h") {
        print_usage();
        return Ok(());
    }

    let settings = Settings::from_env();
    let division_code = arg_value(&args, "--code").unwrap_or_else(|| settings.division_code.clone());
    let event = match arg_value(&args, "--event") {
        Some(raw) => Some(EventName::from_user_input(&raw).ok_or_else(|| anyhow!("unknown event {raw:?}"))?),
        None => None,
    };
    let filter = DisplayFilter {
        event,
        name: arg_value(&args, "--name"),
    };

    let cache = build_page_cache(
        settings.cache_mode,
        settings.cache_ttl,
        settings.cache_max_entries,
    );
    let fetcher = HttpFetcher::new(cache).context("unable to start fetcher")?;

    let scope = match arg_value(&args, "--district") {
        Some(district) => {
            let source = arg_value(&args, "--districts")
                .or_else(|| settings.district_sheet.clone())
                .context("--district needs --districts or DISTRICT_SHEET")?;
            let map = DistrictMap::load_or_empty(&fetcher, &source);
            if map.regions(&district).is_empty() {
                let known = map.names().collect::<Vec<_>>().join(", ");
                warn!(district = %district, known = %known, "district covers no known regions");
            }
            map.scope(&district)
        }
        None => {
            let selection = arg_value(&args, "--region").unwrap_or_else(|| "All".to_string());
            RegionScope::parse(&selection).ok_or_else(|| anyhow!("unknown region {selection:?}"))?
        }
    };

    let aggregator = Aggregator::new(&fetcher, &settings.base_url)
        .with_parallelism(settings.fetch_parallelism);
    let ranked = match aggregator.standings(&scope, &division_code) {
        StandingsOutcome::Found(ranked) => ranked,
        StandingsOutcome::NoStandings => {
            println!("{}", no_standings_message(&scope, &division_code));
            return Ok(());
        }
    };

    let shown = if filter.is_empty() {
        ranked
    } else {
        filter_standings(&ranked, &filter)
    };
    if shown.is_empty() {
        println!("No standings match the given filters.");
        return Ok(());
    }

    let sheet = if has_flag(&args, "--breakdown") {
        let source = arg_value(&args, "--sheet")
            .or_else(|| settings.breakdown_sheet.clone())
            .context("--breakdown needs --sheet or BREAKDOWN_SHEET")?;
        Some(BreakdownSheet::load_or_empty(&fetcher, &source))
    } else {
        None
    };

    if has_flag(&args, "--json") {
        println!("{}", render_json(&shown, sheet.as_ref())?);
    } else {
        print!("{}", render_text(&shown, sheet.as_ref()));
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn arg_value(args: &[String], name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&prefix) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|arg| arg == name)
}

fn print_usage() {
    println!("Usage: ata_standings [--region <name|code|All|International> | --district <name>]");
    println!("                     [--code <division>] [--event <event>] [--name <query>]");
    println!("                     [--districts <path|url>] [--breakdown [--sheet <path|url>]] [--json]");
}
