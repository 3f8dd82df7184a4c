use std::path::PathBuf;

use busmap_transit::prelude::*;
use clap::{Args, Parser, Subcommand};
use eyre::WrapErr;
use tracing_subscriber::EnvFilter;

/// Query a bus stop dataset from the command line.
#[derive(Parser)]
#[command(name = "busmap", version)]
struct Cli {
    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Fetch the dataset from this URL (overrides config)
    #[arg(long, global = true, conflicts_with = "file")]
    url: Option<String>,

    /// Read the dataset from this file (overrides config)
    #[arg(long, global = true)]
    file: Option<PathBuf>,

    /// SQLite cache file (overrides config)
    #[arg(long, global = true)]
    cache: Option<PathBuf>,

    /// Preferred language for names
    #[arg(long, global = true)]
    lang: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct OperatorArgs {
    /// Restrict to these operators (repeatable); defaults come from config
    #[arg(long = "operator", short = 'o')]
    operators: Vec<String>,

    /// Disable operator filtering
    #[arg(long, conflicts_with = "operators")]
    any_operator: bool,
}

impl OperatorArgs {
    fn resolve(&self, config: &TransitConfig) -> Vec<CompanyCode> {
        if self.any_operator {
            Vec::new()
        } else if self.operators.is_empty() {
            config.default_operators.clone()
        } else {
            self.operators.iter().map(CompanyCode::new).collect()
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Stops around a point, widening the radius if too few are found
    Near {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        /// Search radius in meters
        #[arg(long, default_value_t = 200.0)]
        radius: f64,
        #[arg(long)]
        max: Option<usize>,
        #[arg(long)]
        min: Option<usize>,
        #[command(flatten)]
        operators: OperatorArgs,
    },
    /// The single closest stop
    Nearest {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        /// Give up beyond this many meters
        #[arg(long)]
        radius: Option<f64>,
        #[command(flatten)]
        operators: OperatorArgs,
    },
    /// Routes serving a stop
    Routes {
        stop: String,
        #[command(flatten)]
        operators: OperatorArgs,
    },
    /// Ordered stops of a route, per company
    Stops {
        route: String,
        #[command(flatten)]
        operators: OperatorArgs,
    },
    /// Routes matching a route number or stop name
    Search { text: String },
}

fn load_config(cli: &Cli) -> eyre::Result<TransitConfig> {
    let mut config = match &cli.config {
        Some(path) => TransitConfig::from_json_file(path)?,
        None => TransitConfig::default(),
    };

    if let Some(url) = &cli.url {
        config.source = DatasetSource::Url(url.clone());
    }
    if let Some(file) = &cli.file {
        config.source = DatasetSource::Path(file.clone());
    }
    if let Some(cache) = &cli.cache {
        config.cache_path = Some(cache.clone());
    }
    if let Some(lang) = &cli.lang {
        config.preferred_language = lang.clone();
    }

    config.validate()?;
    Ok(config)
}

fn stop_line(stop: &Stop, chain: &LanguageChain) -> String {
    let name = stop.name.resolve(chain).unwrap_or("?");
    match stop.location {
        Some(p) => format!("{}\t{}\t({:.6}, {:.6})", stop.id, name, p.y(), p.x()),
        None => format!("{}\t{}", stop.id, name),
    }
}

fn route_line(route: &Route, chain: &LanguageChain) -> String {
    format!(
        "{}\t{}\t{} → {}",
        route.id,
        route.number,
        route.origin.resolve(chain).unwrap_or("?"),
        route.destination.resolve(chain).unwrap_or("?"),
    )
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let chain = config.language_chain();

    let loader = config.build_loader()?;
    tracing::info!(source = %loader.source(), cache = ?config.cache_path, "loading dataset");
    let service = TransitService::new();
    service
        .reload(&loader)
        .await
        .wrap_err_with(|| format!("failed to load dataset from {}", loader.source()))?;

    match &cli.command {
        Command::Near { lat, lng, radius, max, min, operators } => {
            let mut query = config
                .nearby_query(*lat, *lng, *radius)
                .with_operators(operators.resolve(&config));
            if let Some(max) = max {
                query = query.with_max_results(*max);
            }
            if let Some(min) = min {
                query = query.with_min_results(*min);
            }
            for hit in service.stops_near(&query) {
                println!("{:>7.1} m\t{}", hit.distance_m, stop_line(&hit.stop, &chain));
            }
        }
        Command::Nearest { lat, lng, radius, operators } => {
            match service.nearest_stop(*lat, *lng, *radius, &operators.resolve(&config)) {
                Some(hit) => println!("{:>7.1} m\t{}", hit.distance_m, stop_line(&hit.stop, &chain)),
                None => eprintln!("no stop found"),
            }
        }
        Command::Routes { stop, operators } => {
            for route in service.routes_by_stop(stop, &operators.resolve(&config)) {
                println!("{}", route_line(&route, &chain));
            }
        }
        Command::Stops { route, operators } => {
            for sequence in service.stops_by_route(route, &operators.resolve(&config)) {
                println!("[{}]", sequence.company);
                for (seq, stop) in sequence.stops.iter().enumerate() {
                    match stop {
                        RouteStop::Known(stop) => println!("{:>3}\t{}", seq + 1, stop_line(stop, &chain)),
                        RouteStop::Missing(id) => println!("{:>3}\t{}\t(unknown stop)", seq + 1, id),
                    }
                }
            }
        }
        Command::Search { text } => {
            for id in service.search_routes(text) {
                match service.route(id.as_str()) {
                    Some(route) => println!("{}", route_line(&route, &chain)),
                    None => println!("{id}"),
                }
            }
        }
    }

    Ok(())
}
