//! # channel-playlist
//!
//! Turns remote channel catalogs into extended M3U playlists.
//!
//! A run for one source is a straight line: the [`Fetcher`] downloads the
//! gzip compressed JSON catalog, [`Catalog`] reads the channels out of it,
//! [`sort_channels`] orders them, the [`formatter`] renders each channel as an
//! `#EXTINF` line followed by its stream URL, and the [`PlaylistWriter`] stores
//! the result as `<output_dir>/<source>_all.m3u`. [`Generator`] ties the steps
//! together and reports how the run ended without ever failing itself.
//!
//! Sources are plain data ([`SourceConfig`]), so adding one does not need new
//! code.

pub mod catalog;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod formatter;
pub mod generator;
pub mod source;
pub mod writer;

pub use catalog::{Catalog, CatalogEntry, ChannelNumber, ChannelRecord};
pub use config::FetcherConfig;
pub use error::{CatalogError, FetchError, SkipReason, SortError, SourceError, WriteError};
pub use fetcher::{FetchOptions, Fetched, Fetcher, create_client};
pub use generator::{
    GenerationOutcome, Generator, PlaylistDocument, SortKey, build_playlist, sort_channels,
};
pub use source::{SourceConfig, SourceRegistry};
pub use writer::PlaylistWriter;
