use std::path::PathBuf;

use channel_playlist::SortKey;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "playlist-gen",
    about = "Builds extended M3U playlists from remote channel catalogs",
    version
)]
pub struct CliArgs {
    /// Channel order in the playlist
    #[arg(short, long, value_enum)]
    pub sort: Option<SortKey>,

    /// Directory the playlists are written to
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Only generate this source (repeatable)
    #[arg(long = "source", value_name = "NAME")]
    pub sources: Vec<String>,

    /// List available sources and exit
    #[arg(long)]
    pub list_sources: bool,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}
