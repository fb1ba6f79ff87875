use clap::{
    ArgAction, CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tracing_subscriber::EnvFilter;

use spotapi::{cli, config, error, models::SearchType};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    /// Log request pipeline details (same as RUST_LOG=spotapi=debug)
    #[clap(long, short, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify API
    Auth,

    /// Show the profile of the signed in user
    Me,

    /// Show an album and its tracks
    Album(AlbumOptions),

    /// Search the catalogue
    Search(SearchOptions),

    /// List followed artists
    Followed(FollowedOptions),

    /// List saved tracks
    Saved(SavedOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct AlbumOptions {
    /// Spotify ID of the album
    id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct SearchOptions {
    query: String,

    /// Result type(s) to search for; can be repeated
    #[clap(
        long = "type",
        value_parser = clap::value_parser!(SearchTypeArg),
        action = ArgAction::Append,
        num_args = 1
    )]
    types: Vec<SearchTypeArg>,

    /// Results per type (1-50)
    #[clap(long)]
    limit: Option<u32>,
}

#[derive(Parser, Debug, Clone)]
pub struct FollowedOptions {
    /// Only show artists whose name contains this text
    #[clap(long)]
    search: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct SavedOptions {
    /// Only fetch the newest N tracks (max 50)
    #[clap(long)]
    limit: Option<u32>,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy)]
enum SearchTypeArg {
    Album,
    Artist,
    Playlist,
    Track,
}

impl From<SearchTypeArg> for SearchType {
    fn from(arg: SearchTypeArg) -> Self {
        match arg {
            SearchTypeArg::Album => SearchType::Album,
            SearchTypeArg::Artist => SearchType::Artist,
            SearchTypeArg::Playlist => SearchType::Playlist,
            SearchTypeArg::Track => SearchType::Track,
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("spotapi=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let result = match cli.command {
        Command::Auth => cli::auth().await,
        Command::Me => cli::me().await,
        Command::Album(opt) => cli::album(&opt.id).await,
        Command::Search(opt) => {
            let types: Vec<SearchType> = opt.types.into_iter().map(SearchType::from).collect();
            cli::search(&opt.query, &types, opt.limit).await
        }
        Command::Followed(opt) => cli::followed(opt.search).await,
        Command::Saved(opt) => cli::saved(opt.limit).await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        error!("{}", e);
    }
}
