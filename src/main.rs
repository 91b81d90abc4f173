use clap::Parser;
use forky::app::{self, LaunchOptions};
use forky::model::Theme;
use forky::{config, logging};
use std::path::PathBuf;

/// Terminal music player that browses a folder as artists, albums and tracks.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Music folder with one sub-folder per artist
    library: Option<PathBuf>,

    /// Colour theme
    #[arg(long, value_enum)]
    theme: Option<Theme>,

    /// Initial volume in percent
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    volume: Option<u8>,

    /// Play silently without opening an audio device
    #[arg(long)]
    null_audio: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = config::load_settings()?;
    let _log_guard = logging::init(&config::log_dir()?, &settings.log_filter)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting");

    app::run(LaunchOptions {
        library: args.library.or(settings.library),
        theme: args.theme.unwrap_or(settings.theme),
        volume: args
            .volume
            .map_or(settings.volume, |percent| f32::from(percent) / 100.0),
        null_audio: args.null_audio,
    })
}
