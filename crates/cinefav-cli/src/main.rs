//! cinefav - search OMDb and keep a list of favorite movies.

/// Application configuration (TOML).
mod config;

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use tracing::instrument;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{API_KEY_ENV, AppConfig, AppDirs};
use cinefav_api::omdb::{
    DetailParams, LocalOmdbApi, MediaType, OmdbClient, PlotLength, SearchParams,
};
use cinefav_db::{AddOutcome, FavoritesStore, RemoveOutcome, SqliteKvStore};
use cinefav_tui::run_app;
use cinefav_tui::screens::favorite_from_detail;

/// File name prefix of the log written while the terminal UI owns the screen.
const TUI_LOG_PREFIX: &str = "cinefav";

/// Rolled TUI log files kept in the data directory.
const TUI_LOG_FILES_KEPT: usize = 7;

/// CLI argument parser.
#[derive(Parser)]
#[command(name = "cinefav", about, version)]
struct Cli {
    /// Override config/data directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Search OMDb by title.
    Search(SearchArgs),
    /// Show the full record for one IMDb identifier.
    Details(DetailsArgs),
    /// Manage the favorites list.
    Favorites(FavoritesCommand),
    /// Browse, search, and manage favorites interactively.
    Tui,
    /// Print a shell completion script.
    Completions(CompletionsArgs),
}

/// Record kinds accepted by `--type`.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum MediaTypeArg {
    /// Feature films.
    Movie,
    /// TV series.
    Series,
    /// Single episodes.
    Episode,
    /// Video games.
    Game,
}

impl From<MediaTypeArg> for MediaType {
    fn from(arg: MediaTypeArg) -> Self {
        match arg {
            MediaTypeArg::Movie => Self::Movie,
            MediaTypeArg::Series => Self::Series,
            MediaTypeArg::Episode => Self::Episode,
            MediaTypeArg::Game => Self::Game,
        }
    }
}

/// Arguments for the `search` subcommand.
#[derive(clap::Args)]
struct SearchArgs {
    /// Title to search for.
    #[arg(long, short)]
    query: String,

    /// Restrict to one record kind.
    #[arg(long = "type", value_enum)]
    media_type: Option<MediaTypeArg>,

    /// Restrict to one release year.
    #[arg(long)]
    year: Option<u32>,

    /// Result page (10 results per page).
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=100))]
    page: u32,
}

/// Arguments for the `details` subcommand.
#[derive(clap::Args)]
struct DetailsArgs {
    /// IMDb identifier (e.g. tt0372784).
    #[arg(long)]
    id: String,

    /// Request the short plot instead of the full one.
    #[arg(long)]
    short_plot: bool,
}

/// Arguments for the `favorites` subcommand.
#[derive(clap::Args)]
struct FavoritesCommand {
    /// Favorites subcommand to run.
    #[command(subcommand)]
    command: FavoritesSubcommands,
}

/// Available favorites subcommands.
#[derive(Subcommand)]
enum FavoritesSubcommands {
    /// List saved movies.
    List,
    /// Fetch a record from OMDb and save it.
    Add(FavoriteIdArgs),
    /// Remove a saved movie.
    Remove(FavoriteIdArgs),
}

/// Identifier argument for `favorites add/remove`.
#[derive(clap::Args)]
struct FavoriteIdArgs {
    /// IMDb identifier (e.g. tt0372784).
    #[arg(long)]
    id: String,
}

/// Arguments for the `completions` subcommand.
#[derive(clap::Args)]
struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum)]
    shell: Shell,
}

/// Builds an OMDb client from the environment and the config file.
///
/// # Errors
///
/// Returns an error if no API key is configured, the config cannot be
/// loaded, or the client fails to build.
#[instrument(skip_all)]
fn build_omdb_client(dirs: &AppDirs) -> Result<OmdbClient> {
    let config = AppConfig::load(&dirs.config_file).context("failed to load config")?;
    let api_key = config.omdb.api_key(std::env::var(API_KEY_ENV).ok())?;

    let mut builder = OmdbClient::builder().api_key(api_key).user_agent(concat!(
        env!("CARGO_PKG_NAME"),
        "/",
        env!("CARGO_PKG_VERSION")
    ));
    if let Some(url) = config.omdb.base_url()? {
        builder = builder.base_url(url);
    }
    if let Some(interval) = config.omdb.min_interval() {
        builder = builder.min_interval(interval);
    }
    builder.build().context("failed to build OMDb client")
}

/// Opens the favorites store in the data directory.
///
/// # Errors
///
/// Returns an error if the database cannot be opened.
fn open_favorites(dirs: &AppDirs) -> Result<FavoritesStore<SqliteKvStore>> {
    let store = SqliteKvStore::open(&dirs.data_dir).context("failed to open database")?;
    Ok(FavoritesStore::new(store))
}

/// Runs the `search` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_search(args: &SearchArgs, dirs: &AppDirs) -> Result<()> {
    let client = build_omdb_client(dirs)?;

    let mut params = SearchParams::new(&args.query).page(args.page);
    if let Some(media_type) = args.media_type {
        params = params.media_type(media_type.into());
    }
    if let Some(year) = args.year {
        params = params.year(year);
    }

    let page = client
        .search(&params)
        .await
        .context("OMDb search request failed")?;

    if page.results.is_empty() {
        tracing::info!("No results found.");
        return Ok(());
    }

    tracing::info!("Total results: {}", page.total_results);
    tracing::info!("imdbID\t\tYear\tType\tTitle");
    for movie in &page.results {
        tracing::info!(
            "{}\t{}\t{}\t{}",
            movie.imdb_id,
            movie.year,
            movie.media_type,
            movie.title
        );
    }

    Ok(())
}

/// Runs the `details` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_details(args: &DetailsArgs, dirs: &AppDirs) -> Result<()> {
    let client = build_omdb_client(dirs)?;
    let plot = if args.short_plot {
        PlotLength::Short
    } else {
        PlotLength::Full
    };

    let detail = client
        .details(&DetailParams::new(&args.id).plot(plot))
        .await
        .context("OMDb detail request failed")?;

    tracing::info!("ID: {}", detail.imdb_id);
    tracing::info!("Title: {}", detail.title);
    tracing::info!("Year: {}", detail.year);
    tracing::info!("Type: {}", detail.media_type);
    let fields = [
        ("Rated", &detail.rated),
        ("Released", &detail.released),
        ("Runtime", &detail.runtime),
        ("Genre", &detail.genre),
        ("Director", &detail.director),
        ("Writer", &detail.writer),
        ("Actors", &detail.actors),
        ("Language", &detail.language),
        ("Country", &detail.country),
        ("Awards", &detail.awards),
        ("IMDb Rating", &detail.imdb_rating),
        ("IMDb Votes", &detail.imdb_votes),
        ("Poster", &detail.poster),
        ("Plot", &detail.plot),
    ];
    for (name, value) in fields {
        if let Some(value) = value {
            tracing::info!("{name}: {value}");
        }
    }
    tracing::info!("URL: {}", detail.imdb_url());

    Ok(())
}

/// Runs the `favorites list` subcommand.
///
/// # Errors
///
/// Returns an error if the database cannot be opened.
#[instrument(skip_all)]
async fn run_favorites_list(dirs: &AppDirs) -> Result<()> {
    let favorites = open_favorites(dirs)?;
    let movies = favorites.list().await;

    if movies.is_empty() {
        tracing::info!("No favorites yet.");
        return Ok(());
    }

    for movie in &movies {
        tracing::info!("  {}  {} ({})", movie.imdb_id, movie.title, movie.year);
    }
    tracing::info!("Total: {} favorites", movies.len());

    Ok(())
}

/// Runs the `favorites add` subcommand.
///
/// Fetches the full record first so the saved entry carries the plot.
///
/// # Errors
///
/// Returns an error if the lookup fails or the favorites cannot be written.
#[instrument(skip_all)]
async fn run_favorites_add(args: &FavoriteIdArgs, dirs: &AppDirs) -> Result<()> {
    let client = build_omdb_client(dirs)?;
    let favorites = open_favorites(dirs)?;

    let detail = client
        .details(&DetailParams::new(&args.id))
        .await
        .context("OMDb detail request failed")?;

    let outcome = favorites
        .add(favorite_from_detail(&detail))
        .await
        .context("failed to add favorite")?;

    match outcome {
        AddOutcome::Added => tracing::info!("Added to Favorites: {}", detail.title),
        AddOutcome::AlreadyPresent => tracing::info!("Already in Favorites: {}", detail.title),
    }

    Ok(())
}

/// Runs the `favorites remove` subcommand.
///
/// # Errors
///
/// Returns an error if the favorites cannot be read or written.
#[instrument(skip_all)]
async fn run_favorites_remove(args: &FavoriteIdArgs, dirs: &AppDirs) -> Result<()> {
    let favorites = open_favorites(dirs)?;

    let outcome = favorites
        .remove(&args.id)
        .await
        .context("failed to remove favorite")?;

    match outcome {
        RemoveOutcome::Removed => tracing::info!("Removed from Favorites: {}", args.id),
        RemoveOutcome::NotPresent => tracing::info!("Not in favorites: {}", args.id),
    }

    Ok(())
}

/// Runs the `tui` subcommand.
///
/// # Errors
///
/// Returns an error if the client or database cannot be set up, or the
/// terminal UI fails.
#[instrument(skip_all)]
async fn run_tui(dirs: &AppDirs) -> Result<()> {
    let client = build_omdb_client(dirs)?;
    let favorites = open_favorites(dirs)?;

    run_app(&client, &favorites).await.context("terminal UI failed")
}

/// Runs the `completions` subcommand.
fn run_completions(args: &CompletionsArgs) {
    let mut cmd = Cli::command();
    clap_complete::generate(args.shell, &mut cmd, "cinefav", &mut io::stdout());
}

/// Opens the daily-rolled log used while the terminal UI runs.
///
/// Records are written from a background worker; the returned guard
/// flushes it on drop and must outlive the session.
///
/// # Errors
///
/// Returns an error if the data directory or the log file cannot be created.
fn tui_log_writer(data_dir: &Path) -> Result<(NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create directory {}", data_dir.display()))?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(TUI_LOG_PREFIX)
        .filename_suffix("log")
        .max_log_files(TUI_LOG_FILES_KEPT)
        .build(data_dir)
        .with_context(|| format!("failed to open TUI log in {}", data_dir.display()))?;
    Ok(tracing_appender::non_blocking(appender))
}

/// Installs the global tracing subscriber.
///
/// Writes to stdout, or to the TUI log for the `tui` subcommand. The
/// returned guard keeps the log worker alive.
///
/// # Errors
///
/// Returns an error if the TUI log cannot be opened.
fn init_tracing(command: &Commands, dirs: &AppDirs) -> Result<Option<WorkerGuard>> {
    let (writer, guard) = if matches!(command, Commands::Tui) {
        let (writer, guard) = tui_log_writer(&dirs.data_dir)?;
        (BoxMakeWriter::new(writer), Some(guard))
    } else {
        (BoxMakeWriter::new(io::stdout), None)
    };
    let ansi = guard.is_none();

    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .with_ansi(ansi)
            .with_writer(writer)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_ansi(ansi)
            .with_writer(writer);

        let otel_layer = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .and_then(|_| {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                let tracer = opentelemetry::trace::TracerProvider::tracer(
                    &tracer_provider,
                    env!("CARGO_PKG_NAME"),
                );
                opentelemetry::global::set_tracer_provider(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .init();
    }

    Ok(guard)
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Commands::Completions(args) = &cli.command {
        run_completions(args);
        return Ok(());
    }

    let dirs = AppDirs::resolve(cli.dir.as_deref()).context("failed to resolve directories")?;
    let _log_guard = init_tracing(&cli.command, &dirs)?;

    match cli.command {
        Commands::Search(args) => run_search(&args, &dirs).await,
        Commands::Details(args) => run_details(&args, &dirs).await,
        Commands::Favorites(cmd) => match cmd.command {
            FavoritesSubcommands::List => run_favorites_list(&dirs).await,
            FavoritesSubcommands::Add(args) => run_favorites_add(&args, &dirs).await,
            FavoritesSubcommands::Remove(args) => run_favorites_remove(&args, &dirs).await,
        },
        Commands::Tui => run_tui(&dirs).await,
        Commands::Completions(_) => Ok(()),
    }
}
