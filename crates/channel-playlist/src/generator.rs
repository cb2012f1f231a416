//! Catalog to playlist conversion for a single source.
//!
//! [`Generator::generate`] runs the whole pipeline: fetch the catalog, order
//! the channels, render one `#EXTINF` line and one stream URL per channel and
//! write the result. It never fails; whatever went wrong is logged and
//! reported through [`GenerationOutcome`].

use std::fmt::{self, Display};
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{Instrument, Span, error, info, info_span, warn};

use crate::catalog::{Catalog, CatalogEntry};
use crate::error::{CatalogError, SkipReason, SortError, WriteError};
use crate::fetcher::{FetchOptions, Fetcher};
use crate::formatter::{format_entry, format_header};
use crate::source::SourceConfig;
use crate::writer::PlaylistWriter;

/// Channel number assumed for channels that have none, so they sort last.
pub const MISSING_CHANNEL_NUMBER: i64 = 99999;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Ascending channel number
    Chno,
    /// Case-insensitive display name
    #[default]
    Name,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Chno => "chno",
            SortKey::Name => "name",
        }
    }
}

impl Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chno" => Ok(SortKey::Chno),
            "name" => Ok(SortKey::Name),
            other => Err(format!("unknown sort key: {other}")),
        }
    }
}

fn channel_number_key(entry: &CatalogEntry) -> Result<i64, SortError> {
    match &entry.record.chno {
        None => Ok(MISSING_CHANNEL_NUMBER),
        Some(chno) => chno
            .sort_value()
            .ok_or_else(|| SortError::InvalidChannelNumber {
                id: entry.id.clone(),
                value: chno.to_string(),
            }),
    }
}

/// Order the catalog's channels by `key`. The sort is stable, so channels
/// with equal keys keep their catalog order.
pub fn sort_channels(catalog: &Catalog, key: SortKey) -> Result<Vec<&CatalogEntry>, SortError> {
    match key {
        SortKey::Chno => {
            let mut keyed = catalog
                .entries()
                .iter()
                .map(|entry| channel_number_key(entry).map(|k| (k, entry)))
                .collect::<Result<Vec<_>, _>>()?;
            keyed.sort_by_key(|(k, _)| *k);
            Ok(keyed.into_iter().map(|(_, entry)| entry).collect())
        }
        SortKey::Name => {
            let mut entries: Vec<&CatalogEntry> = catalog.entries().iter().collect();
            entries.sort_by_cached_key(|entry| {
                entry.record.name.as_deref().unwrap_or_default().to_lowercase()
            });
            Ok(entries)
        }
    }
}

/// An M3U playlist held in memory until it is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistDocument {
    lines: Vec<String>,
    channels: usize,
}

impl PlaylistDocument {
    pub fn new(epg_url: &str) -> Self {
        Self {
            lines: vec![format_header(epg_url)],
            channels: 0,
        }
    }

    /// Append the `#EXTINF` line and the stream URL of one channel.
    pub fn push_channel(&mut self, extinf: String, stream_url: &str) {
        self.lines.push(extinf);
        self.lines.push(format!("{stream_url}\n"));
        self.channels += 1;
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn channel_count(&self) -> usize {
        self.channels
    }

    pub fn render(&self) -> String {
        self.lines.concat()
    }
}

/// Render the ordered channels of `source` into a playlist.
pub fn build_playlist<'a>(
    source: &SourceConfig,
    channels: impl IntoIterator<Item = &'a CatalogEntry>,
) -> PlaylistDocument {
    let mut document = PlaylistDocument::new(&source.epg_url);

    for CatalogEntry { id, record } in channels {
        let name = record.display_name();
        let extinf = format_entry(
            id,
            id,
            record.chno.as_ref(),
            name,
            record.logo(),
            &record.group_title(),
            name,
        );
        document.push_channel(extinf, &source.stream_url(id));
    }

    document
}

/// What a generation run ended with.
#[derive(Debug)]
pub enum GenerationOutcome {
    Written { path: PathBuf, channels: usize },
    Skipped(SkipReason),
    WriteFailed(WriteError),
}

impl GenerationOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, GenerationOutcome::Written { .. })
    }
}

/// Builds the playlist of one source.
///
/// Diagnostics are emitted inside the generator's span, which by default is
/// an `info` span named `source` carrying the source name.
pub struct Generator {
    source: SourceConfig,
    fetcher: Fetcher,
    writer: PlaylistWriter,
    span: Span,
}

impl Generator {
    pub fn new(source: SourceConfig, fetcher: Fetcher, writer: PlaylistWriter) -> Self {
        let span = info_span!("source", name = %source.name);
        Self {
            source,
            fetcher,
            writer,
            span,
        }
    }

    /// Replace the span diagnostics are recorded in.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn source(&self) -> &SourceConfig {
        &self.source
    }

    pub async fn generate(&self, sort: SortKey) -> GenerationOutcome {
        self.run(sort).instrument(self.span.clone()).await
    }

    async fn run(&self, sort: SortKey) -> GenerationOutcome {
        info!("--- Generating {} playlist ---", self.source.name);

        let catalog = match self.load_catalog().await {
            Ok(catalog) => catalog,
            Err(reason) => {
                error!(error = %reason, "Failed to fetch or parse {} data", self.source.name);
                return GenerationOutcome::Skipped(reason);
            }
        };
        info!(channels = catalog.len(), sort = %sort, "Catalog loaded");

        let ordered = self.order(&catalog, sort);
        let document = build_playlist(&self.source, ordered);

        match self
            .writer
            .write(&self.source.playlist_filename(), &document.render())
        {
            Ok(path) => GenerationOutcome::Written {
                path,
                channels: document.channel_count(),
            },
            Err(e) => GenerationOutcome::WriteFailed(e),
        }
    }

    async fn load_catalog(&self) -> Result<Catalog, SkipReason> {
        let fetched = self
            .fetcher
            .fetch(&self.source.catalog_url, &FetchOptions::json().gzipped())
            .await?;
        let value = fetched.into_json().ok_or(CatalogError::NotJson)?;
        Ok(Catalog::from_json(value)?)
    }

    fn order<'a>(&self, catalog: &'a Catalog, sort: SortKey) -> Vec<&'a CatalogEntry> {
        sort_channels(catalog, sort).unwrap_or_else(|e| {
            warn!(error = %e, "Sorting failed for {}, using default order", self.source.name);
            catalog.entries().iter().collect()
        })
    }
}
