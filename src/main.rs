use anyhow::{Context, Result};
use clap::Parser;
use georegion::config::Config;
use georegion::location::{
    load_locations, CoordinateStore, FixedDelay, JsonFileCache, LocationResolver, NominatimProvider,
};
use georegion::Survey;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// georegion: which of your places lie inside the region?
///
/// Geocodes every place in the location list, derives an elliptical region
/// from four boundary landmarks, and reports each place as inside or outside.
///
/// Examples:
///   georegion locations.json
///   georegion locations.json --plot plot.json
///   georegion locations.json --config paris.json --offline
#[derive(Parser)]
#[command(name = "georegion", version, about, long_about = None)]
struct Cli {
    /// Location list: JSON array of {searchString, type, label}.
    #[arg(index = 1, default_value = "locations.json")]
    locations: PathBuf,

    /// JSON config file (landmarks, provider, cache, delay).
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Cache file. Defaults to ~/.georegion/cache.json.
    #[arg(long)]
    cache: Option<PathBuf>,

    /// Delay before each provider request, in milliseconds.
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Nominatim base URL.
    #[arg(long)]
    provider_url: Option<String>,

    /// User-Agent sent to the provider.
    #[arg(long)]
    user_agent: Option<String>,

    /// HTTP timeout in seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Offline mode: only use cached coordinates.
    #[arg(long)]
    offline: bool,

    /// Write plot data (places, landmarks, region outline) to this file.
    #[arg(long)]
    plot: Option<PathBuf>,

    /// Skip the text report on stderr.
    #[arg(long)]
    no_text: bool,

    /// Debug logging (overridden by RUST_LOG).
    #[arg(long, short = 'v')]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load_from_file(path)?,
            None => Config::default(),
        };
        if let Some(ref cache) = self.cache {
            config.cache_path = Some(cache.clone());
        }
        if let Some(delay_ms) = self.delay_ms {
            config.delay_ms = delay_ms;
        }
        if let Some(ref url) = self.provider_url {
            config.provider.base_url = url.clone();
        }
        if let Some(ref ua) = self.user_agent {
            config.provider.user_agent = ua.clone();
        }
        if let Some(secs) = self.timeout_secs {
            config.provider.timeout_secs = secs;
        }
        config.offline |= self.offline;
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config()?;
    let locations = load_locations(&cli.locations)?;
    info!("Loaded {} locations from {}", locations.len(), cli.locations.display());

    // ── Resolver ────────────────────────────────────────────────

    let cache_path = config.cache_path();
    let cache = JsonFileCache::load_from(cache_path.clone())
        .with_context(|| format!("Failed to open cache {}", cache_path.display()))?;
    info!("Cache {} holds {} entries", cache_path.display(), cache.len());

    let provider = NominatimProvider::new(
        &config.provider.base_url,
        &config.provider.user_agent,
        config.provider.timeout(),
    );
    let mut resolver = LocationResolver::new(cache, provider, FixedDelay::new(config.delay()));
    resolver.set_offline(config.offline);

    // ── Survey ──────────────────────────────────────────────────

    let outcome = Survey::new(&locations, &config.landmarks)
        .run(&mut resolver)
        .context("Cannot build the region; check the landmark names")?;

    if let Some(ref path) = cli.plot {
        outcome.plot_data().write_to(path)?;
        info!("Plot data written to {}", path.display());
    }

    // Text report to stderr, JSON to stdout
    if !cli.no_text {
        eprint!("{}", outcome.report.render_text());
    }
    println!("{}", serde_json::to_string_pretty(&outcome.report)?);

    Ok(())
}
