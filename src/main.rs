use anyhow::Context;
use api_client::DogCeoClient;
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use configuration::{LogFormat, Settings, load_settings_from};
use core_types::LeaderboardOrder;
use database::{DbRepository, connect, run_migrations};
use indicatif::{ProgressBar, ProgressStyle};
use seeder::{Catalog, SeedSummary, apply, fetch_catalog, reconcile};
use std::path::PathBuf;

mod logging;

/// The main entry point for the RateTheDogs application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables (DATABASE_URL) from a .env file, if present.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let mut settings = load_settings_from(&cli.config)
        .with_context(|| format!("Failed to load settings from {}", cli.config.display()))?;
    if let Some(format) = cli.log_format {
        settings.logging.format = format;
    }
    let _log_guard = logging::init_tracing(&settings.logging)?;

    // Execute the appropriate command
    match cli.command {
        Commands::Serve => web_server::run_server(settings).await,
        Commands::FetchImages(args) => handle_fetch_images(args, &settings).await,
        Commands::Seed(args) => handle_seed(args, &settings).await,
        Commands::Leaderboard(args) => handle_leaderboard(args, &settings).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Rate dog pictures anonymously: the API server and its import tools.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    /// Overrides `logging.format` from the configuration.
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API.
    Serve,
    /// Download the image catalog from Dog CEO into a manifest file.
    FetchImages(FetchImagesArgs),
    /// Import dogs into the database, from a manifest or straight from Dog CEO.
    Seed(SeedArgs),
    /// Print the breed leaderboard.
    Leaderboard(LeaderboardArgs),
}

#[derive(Parser)]
struct FetchImagesArgs {
    /// Where to write the JSON manifest.
    #[arg(long)]
    output: PathBuf,
}

#[derive(Parser)]
struct SeedArgs {
    /// A manifest written by `fetch-images`. Fetches live when omitted.
    #[arg(long)]
    input: Option<PathBuf>,
}

#[derive(Parser)]
struct LeaderboardArgs {
    /// How many breeds to show.
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(i64).range(1..=100))]
    limit: i64,

    /// Show the lowest rated breeds instead of the highest.
    #[arg(long)]
    bottom: bool,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn fetch_with_progress(settings: &Settings) -> anyhow::Result<Catalog> {
    let client = DogCeoClient::new(&settings.dog_ceo)?;

    let progress_bar = ProgressBar::new(0);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
            .progress_chars("#>-"),
    );

    let catalog = fetch_catalog(&client, &settings.dog_ceo, &progress_bar).await?;
    if !catalog.failed_breeds.is_empty() {
        eprintln!(
            "Could not fetch {} breed(s): {}",
            catalog.failed_breeds.len(),
            catalog.failed_breeds.join(", ")
        );
    }
    Ok(catalog)
}

async fn handle_fetch_images(args: FetchImagesArgs, settings: &Settings) -> anyhow::Result<()> {
    let catalog = fetch_with_progress(settings).await?;
    catalog.write_to(&args.output)?;
    println!(
        "Wrote {} images for {} breeds to {}",
        catalog.image_count(),
        catalog.breeds.len(),
        args.output.display()
    );
    Ok(())
}

async fn handle_seed(args: SeedArgs, settings: &Settings) -> anyhow::Result<()> {
    let catalog = match &args.input {
        Some(path) => {
            let catalog = Catalog::read_from(path)?;
            tracing::info!(
                path = %path.display(),
                breeds = catalog.breeds.len(),
                images = catalog.image_count(),
                "Loaded catalog manifest."
            );
            catalog
        }
        None => fetch_with_progress(settings).await?,
    };

    let db_pool = connect(&settings.database).await?;
    run_migrations(&db_pool).await?;
    let db_repo = DbRepository::new(db_pool);

    let existing = db_repo.existing_image_urls().await?;
    let plan = reconcile(&catalog, &existing);
    let summary = apply(&plan, &db_repo).await?;

    println!("{}", summary_table(&summary));
    Ok(())
}

fn summary_table(summary: &SeedSummary) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Seed summary", "Count"]);
    table.add_row(vec!["Breeds upserted".to_string(), summary.breeds_upserted.to_string()]);
    table.add_row(vec!["Dogs inserted".to_string(), summary.dogs_inserted.to_string()]);
    table.add_row(vec![
        "Duplicates skipped".to_string(),
        summary.duplicates_skipped.to_string(),
    ]);
    table.add_row(vec!["Invalid URLs".to_string(), summary.invalid_urls.to_string()]);
    table
}

async fn handle_leaderboard(args: LeaderboardArgs, settings: &Settings) -> anyhow::Result<()> {
    let order = if args.bottom {
        LeaderboardOrder::Bottom
    } else {
        LeaderboardOrder::Top
    };

    let db_pool = connect(&settings.database).await?;
    let db_repo = DbRepository::new(db_pool);
    let standings = db_repo
        .breed_leaderboard(settings.stats.leaderboard_min_ratings, args.limit, order)
        .await?;

    if standings.is_empty() {
        println!(
            "No breed has {} or more ratings yet.",
            settings.stats.leaderboard_min_ratings
        );
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "Breed", "Average", "Ratings", "Dogs rated"]);
    for (rank, standing) in standings.iter().enumerate() {
        table.add_row(vec![
            (rank + 1).to_string(),
            standing.name.clone(),
            standing.average_rating.round_dp(2).to_string(),
            standing.rating_count.to_string(),
            standing.rated_dogs.to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}
