//! Command-line interface for the badgesmith binary.
//!
//! The CLI exposes one subcommand per flow: `fetch` downloads the badges
//! referenced by a markdown document and `compose` combines configured groups
//! of downloaded badges into horizontal strips.

use std::{io, path::PathBuf, process, time::Duration};

use badgesmith::{ComposeConfig, Error, HttpFetcher, compose_all, fetch_from_markdown};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Command line interface for fetching and composing badge images.
#[derive(Debug, Parser,)]
#[command(name = "badgesmith", version, about = "Fetch badge images and compose them into strips")]
struct Cli
{
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand,)]
/// Supported commands exposed by the CLI.
enum Command
{
    /// Download every badge referenced by `<img src>` tags in a markdown file.
    Fetch(FetchArgs,),
    /// Combine configured groups of downloaded badges into single SVG files.
    Compose(ComposeArgs,),
}

#[derive(Debug, Args,)]
/// Arguments accepted by the `fetch` subcommand.
struct FetchArgs
{
    /// Markdown document listing the badges.
    #[arg(long = "source", value_name = "PATH", env = "BADGESMITH_SOURCE", default_value = "assets.md")]
    source: PathBuf,

    /// Directory receiving the downloaded badges.
    #[arg(long = "assets", value_name = "DIR", env = "BADGESMITH_ASSETS", default_value = "assets")]
    assets: PathBuf,

    /// Per-request timeout in seconds; requests never time out when omitted.
    #[arg(long = "timeout", value_name = "SECS")]
    timeout: Option<u64,>,

    /// Print the fetch summary as JSON on stdout.
    #[arg(long = "json", action = ArgAction::SetTrue)]
    json: bool,
}

#[derive(Debug, Args,)]
/// Arguments accepted by the `compose` subcommand.
struct ComposeArgs
{
    /// YAML document describing composition groups; the built-in groups are
    /// used when omitted.
    #[arg(long = "config", value_name = "PATH", env = "BADGESMITH_CONFIG")]
    config: Option<PathBuf,>,

    /// Directory containing the downloaded badges.
    #[arg(long = "assets", value_name = "DIR", env = "BADGESMITH_ASSETS", default_value = "assets")]
    assets: PathBuf,

    /// Directory receiving the combined SVG files.
    #[arg(long = "output", value_name = "DIR", env = "BADGESMITH_OUTPUT", default_value = "badges")]
    output: PathBuf,

    /// Restrict the run to the named groups; may be repeated.
    #[arg(long = "group", value_name = "NAME")]
    groups: Vec<String,>,

    /// Print the composition results as JSON on stdout.
    #[arg(long = "json", action = ArgAction::SetTrue)]
    json: bool,
}

/// Entry point that reports errors and sets the appropriate exit status.
#[tokio::main]
async fn main()
{
    init_tracing();

    if let Err(error,) = run(Cli::parse(),).await {
        eprintln!("{}", error.to_display_string());
        process::exit(1,);
    }
}

fn init_tracing()
{
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info",),);
    tracing_subscriber::fmt().with_env_filter(filter,).with_writer(io::stderr,).init();
}

/// Executes the CLI using parsed arguments.
///
/// # Errors
///
/// Propagates fatal errors from the selected flow. Per-badge failures are
/// logged by the flows themselves and do not surface here.
async fn run(cli: Cli,) -> Result<(), Error,>
{
    match cli.command {
        Command::Fetch(args,) => run_fetch(args,).await,
        Command::Compose(args,) => run_compose(args,),
    }
}

async fn run_fetch(args: FetchArgs,) -> Result<(), Error,>
{
    let fetcher = HttpFetcher::new(args.timeout.map(Duration::from_secs,),)?;
    let summary = fetch_from_markdown(&fetcher, &args.source, &args.assets,).await?;

    if args.json {
        write_json(&mut io::stdout().lock(), &summary,)?;
    }

    Ok((),)
}

fn run_compose(args: ComposeArgs,) -> Result<(), Error,>
{
    let document = match args.config.as_deref() {
        Some(path,) => ComposeConfig::load(path,)?,
        None => ComposeConfig::builtin().normalize()?,
    };
    let document = document.select(&args.groups,)?;

    let compositions = compose_all(&document, &args.assets, &args.output,)?;

    if args.json {
        write_json(&mut io::stdout().lock(), &compositions,)?;
    }

    Ok((),)
}

fn write_json<W: io::Write, T: Serialize,>(writer: &mut W, value: &T,) -> Result<(), Error,>
{
    serde_json::to_writer_pretty(writer, value,)?;

    Ok((),)
}
