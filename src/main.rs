use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use spotted::{
    cli,
    config::{self, Config, ConfigArgs},
    error, spotify,
};

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
    #[command(flatten)]
    config: ConfigArgs,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Suggest tracks from the discovery playlists
    Discover,

    /// Suggest tracks from the recommendation feed
    Recommend,

    /// Check whether the currently playing track is already tracked
    CheckTrack,

    /// Report gaps in the numbering of tracked playlists
    CheckHoles,

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    // Completions must work without credentials, so they are handled before
    // the full parser requires them.
    if let Some(shell) = completions_shell() {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(shell, &mut cmd, name, &mut std::io::stdout());
        return;
    }

    let cli = Cli::parse();
    let config = match Config::from_args(cli.config) {
        Ok(config) => config,
        Err(e) => error!("{}", e),
    };

    let client = match spotify::auth::connect(&config).await {
        Ok(client) => client,
        Err(e) => error!("Cannot connect to Spotify: {}", e),
    };

    match cli.command {
        Command::Discover => cli::discover(&client, &config).await,
        Command::Recommend => cli::recommend(&client, &config).await,
        Command::CheckTrack => cli::check_track(&client, &config).await,
        Command::CheckHoles => cli::check_holes(&client, &config).await,
        Command::Completions(_) => {}
    }
}

fn completions_shell() -> Option<Shell> {
    let mut args = std::env::args().skip_while(|a| a != "completions");
    args.next()?;
    args.next()?.parse().ok()
}
