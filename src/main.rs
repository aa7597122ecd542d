// Entry point: checks for mpv, loads config, builds the playlist from the
// command line, and runs the TUI.

use clap::Parser;

use rateplay::app::App;
use rateplay::config::Config;
use rateplay::host::MediaKind;
use rateplay::logging;
use rateplay::player::playlist::{Playlist, PlaylistItem};

#[derive(Parser)]
#[command(name = "rateplay", about = "mpv player with a playback-rate selector")]
struct Cli {
    /// Starting playback rate, overriding `default_value` from the config.
    #[arg(long)]
    speed: Option<String>,

    /// Treat every item as this kind instead of guessing from its extension.
    #[arg(long, value_enum)]
    kind: Option<MediaKind>,

    /// Files or URLs to play, in order.
    #[arg(required = true)]
    media: Vec<String>,
}

fn check_dependencies() -> anyhow::Result<()> {
    which::which("mpv")
        .map_err(|_| anyhow::anyhow!("mpv is required but not found in PATH"))?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    check_dependencies()?;

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: ignoring unreadable config ({e}), using defaults.");
            Config::default()
        }
    };
    logging::init()?;

    let playlist = Playlist::new(
        cli.media
            .iter()
            .map(|location| PlaylistItem::new(location.as_str(), cli.kind))
            .collect(),
    );
    let default_rate = cli.speed.as_deref().map(|raw| rateplay::rate::normalize(raw));

    let mut app = App::new(config, playlist, default_rate)?;
    app.run().await?;

    Ok(())
}
