use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;
use takeout_tax::{
    Catalog, Config, CorrelationEngine, FolderScanner, ProductRecord, Reporter, TakeoutExtractor,
    TaxCalculator,
};

#[derive(Parser)]
#[command(name = "takeout-tax")]
#[command(about = "Scan a Google Takeout export and calculate what Google's dead products cost you")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a Takeout export and print the Takeout Tax invoice
    Scan {
        /// Path to the unpacked Takeout folder
        #[arg(short, long, default_value = ".")]
        path: PathBuf,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Your hourly rate in USD
        #[arg(short, long)]
        rate: Option<f64>,

        /// Print the report as JSON instead of the boxed invoice
        #[arg(long)]
        json: bool,
    },
    /// Correlate product shutdowns with your location history
    Journey {
        /// Path to the unpacked Takeout folder
        #[arg(short, long, default_value = ".")]
        path: PathBuf,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Days on either side of a shutdown to search for location data
        #[arg(short, long)]
        window: Option<i64>,
    },
    /// Print your places and product deaths as one chronological timeline
    Timeline {
        /// Path to the unpacked Takeout folder
        #[arg(short, long, default_value = ".")]
        path: PathBuf,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Generate a default configuration file
    Config {
        /// Output path for the config file (defaults to ~/.takeout-tax.toml)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            path,
            config,
            rate,
            json,
        } => run_scan(path, config, rate, json),
        Commands::Journey {
            path,
            config,
            window,
        } => run_journey(path, config, window),
        Commands::Timeline { path, config } => run_timeline(path, config),
        Commands::Config { output } => generate_config(output),
    }
}

fn load_config(config_path: Option<PathBuf>, target: PathBuf) -> anyhow::Result<Config> {
    let mut config = if let Some(config_path) = config_path {
        Config::from_file(&config_path)?
    } else {
        Config::load()?
    };
    config.target_directory = target;
    Ok(config)
}

fn run_scan(
    path: PathBuf,
    config_path: Option<PathBuf>,
    rate: Option<f64>,
    json: bool,
) -> anyhow::Result<()> {
    let mut config = load_config(config_path, path)?;
    if let Some(rate) = rate {
        config.hourly_rate = rate;
    }

    if !json {
        println!("🔍 Scanning Takeout export: {}", config.target_directory.display());
    }
    let start_time = Instant::now();

    let catalog = Catalog::builtin();
    let scanner = FolderScanner::new(catalog, config.ignore_patterns.clone());
    let results = scanner.scan(&config.target_directory)?;
    let report = TaxCalculator::new(config.hourly_rate).calculate(&results);

    let reporter = Reporter::new();
    if json {
        println!("{}", reporter.export_json(&report)?);
        return Ok(());
    }

    println!("{}", reporter.render_tax_report(&report));

    // Raw per-folder lines, for anyone who wants the details.
    println!("--- Raw Scan Results ---");
    for result in &results {
        println!(
            "{:<8} {:<30} {} files",
            format!("{:?}", result.status).to_uppercase(),
            result.folder,
            result.file_count
        );
    }

    println!(
        "\n✅ Scan completed in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}

fn run_journey(
    path: PathBuf,
    config_path: Option<PathBuf>,
    window: Option<i64>,
) -> anyhow::Result<()> {
    let mut config = load_config(config_path, path)?;
    if let Some(window) = window {
        config.window_days = window;
    }

    println!(
        "🪦 Building your journey from: {}",
        config.target_directory.display()
    );

    let extraction = TakeoutExtractor::new().extract(&config.target_directory);
    if extraction.points.is_empty() {
        println!("⚠️  No location data found in this export.");
    } else {
        println!("📍 Found {} location points", extraction.points.len());
    }

    let catalog = Catalog::builtin();
    let products = products_in_scope(&catalog, &extraction.account_created);

    let engine = CorrelationEngine::new(config.window_days);
    let events = engine.build_timeline(&products, &extraction.points);

    println!();
    println!(
        "{}",
        Reporter::new().render_journey(&events, config.window_days)
    );
    Ok(())
}

fn run_timeline(path: PathBuf, config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = load_config(config_path, path)?;

    let extraction = TakeoutExtractor::new().extract(&config.target_directory);
    let catalog = Catalog::builtin();

    println!(
        "{}",
        Reporter::new().render_timeline(&extraction, catalog.products())
    );
    Ok(())
}

/// Deaths that predate the account never show up in a journey. Without a
/// settings file the floor falls back to 2010, early enough for any account
/// that can produce a Takeout export.
fn products_in_scope(
    catalog: &Catalog,
    account_created: &Option<chrono::DateTime<chrono::Utc>>,
) -> Vec<ProductRecord> {
    let floor = account_created
        .map(|t| t.date_naive())
        .or_else(|| NaiveDate::from_ymd_opt(2010, 1, 1))
        .unwrap_or_default();
    catalog
        .products()
        .iter()
        .filter(|p| p.date_close.is_some_and(|close| close >= floor))
        .cloned()
        .collect()
}

fn generate_config(output_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config_path = output_path.unwrap_or_else(|| {
        Config::default_config_path().unwrap_or_else(|_| PathBuf::from("takeout-tax.toml"))
    });

    println!("📝 Generating configuration file: {}", config_path.display());
    std::fs::write(&config_path, Config::create_documented_config())?;

    println!("✅ Configuration file created successfully!");
    println!("💡 Edit the file to set your hourly rate and ignore patterns.");
    Ok(())
}
