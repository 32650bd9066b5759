use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use itinerary_planner::cache::{CacheConfig, CachedProvider};
use itinerary_planner::domain::{Clock, Leg, SystemClock, Trip, on_service_day, parse_hhmm_prefix};
use itinerary_planner::planner::{LegResolver, Planner, SearchConfig, SearchError};
use itinerary_planner::ratp::{
    DEFAULT_BASE_URL, FixtureProvider, ProviderError, RatpClient, RatpConfig, ScheduleProvider,
};
use itinerary_planner::request::{RequestError, TripRequest};
use itinerary_planner::variants::{JsonFileStore, StoreError, VariantClassifier};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SearchMode {
    /// Depth-first search over every chain of departures, with cutoff
    General,
    /// One itinerary per first-leg departure, first connection each time
    Linear,
}

/// Plan multi-leg public-transit itineraries from real-time boards.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Trip request file (JSON)
    trip: PathBuf,

    #[arg(long, value_enum, default_value = "general")]
    mode: SearchMode,

    /// Earliest departure, HH:MM (defaults to now)
    #[arg(long)]
    depart: Option<String>,

    /// Cutoff margin in minutes (overrides the request)
    #[arg(long)]
    margin: Option<i64>,

    #[arg(long, default_value_t = 10)]
    max_results: usize,

    /// Serve boards from a fixture file instead of the live API
    #[arg(long)]
    fixtures: Option<PathBuf>,

    #[arg(long, env = "ITINERARY_VARIANT_STORE", default_value = "variant_stations.json")]
    variant_store: PathBuf,

    #[arg(long, env = "RATP_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,
}

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Search(#[from] SearchError),

    #[error("invalid departure time {0:?} (expected HH:MM)")]
    Depart(String),
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    init_logging();
    let args = Args::parse();

    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<ExitCode, AppError> {
    let request = TripRequest::load(&args.trip)?;
    let legs = request.legs()?;

    let margin_mins = args
        .margin
        .or(request.margin_mins)
        .unwrap_or_else(|| SearchConfig::default().margin_mins);
    let config = SearchConfig::new(margin_mins, args.max_results);

    let classifier = VariantClassifier::open(JsonFileStore::new(&args.variant_store))?;

    match &args.fixtures {
        Some(path) => {
            let provider = FixtureProvider::load(path)?;
            info!(boards = provider.board_count(), "Serving boards from fixtures");
            plan(args, &provider, &classifier, &config, &legs)
        }
        None => {
            let ratp = RatpConfig::new()
                .with_base_url(&args.base_url)
                .with_timeout(args.timeout);
            let provider = CachedProvider::new(RatpClient::new(ratp)?, &CacheConfig::default());
            let outcome = plan(args, &provider, &classifier, &config, &legs);
            debug!(boards = provider.cache_entry_count(), "Boards cached");
            outcome
        }
    }
}

fn plan<P: ScheduleProvider>(
    args: &Args,
    provider: &P,
    classifier: &VariantClassifier,
    config: &SearchConfig,
    legs: &[Leg],
) -> Result<ExitCode, AppError> {
    let clock = SystemClock;
    let now = clock.now();
    let start = match &args.depart {
        Some(text) => {
            let time = parse_hhmm_prefix(text).ok_or_else(|| AppError::Depart(text.clone()))?;
            on_service_day(time, now)
        }
        None => now,
    };

    let planner = Planner::new(LegResolver::new(provider, classifier, &clock), config);
    info!(legs = legs.len(), mode = ?args.mode, margin = config.margin_mins, "Planning");

    let (trips, failures): (Vec<Trip>, Vec<String>) = match args.mode {
        SearchMode::General => {
            let mut search = planner.itineraries(legs, start)?;
            let trips = search.by_ref().take(config.max_results).collect();
            let failures = search.failures().iter().map(ToString::to_string).collect();
            (trips, failures)
        }
        SearchMode::Linear => {
            let mut search = planner.linear(legs, start)?;
            let trips = search.by_ref().take(config.max_results).collect();
            let failures = search.failures().iter().map(ToString::to_string).collect();
            (trips, failures)
        }
    };

    for trip in &trips {
        println!("{trip}\n");
    }

    if !trips.is_empty() {
        return Ok(ExitCode::SUCCESS);
    }

    if failures.is_empty() {
        println!("No itineraries found");
        return Ok(ExitCode::SUCCESS);
    }

    warn!(failures = failures.len(), "Search found nothing");
    eprintln!("No itineraries found; some departure boards could not be fetched:");
    for failure in &failures {
        eprintln!("  {failure}");
    }
    Ok(ExitCode::FAILURE)
}
