use channel_playlist::{
    Fetcher, GenerationOutcome, Generator, PlaylistWriter, SortKey, SourceConfig, SourceRegistry,
};
use tracing::{info, warn};

use crate::error::AppError;

/// Sources named on the command line, or every registered source when none is.
pub fn select_sources<'a>(
    registry: &'a SourceRegistry,
    names: &[String],
) -> Result<Vec<&'a SourceConfig>, AppError> {
    if names.is_empty() {
        return Ok(registry.iter().collect());
    }

    names
        .iter()
        .map(|name| {
            registry
                .get(name)
                .ok_or_else(|| AppError::UnknownSource(name.clone()))
        })
        .collect()
}

/// Generate the playlist of each source in turn. Failures are logged and
/// returned, never propagated.
pub async fn run_sources(
    sources: &[&SourceConfig],
    fetcher: &Fetcher,
    writer: &PlaylistWriter,
    sort: SortKey,
) -> Vec<(String, GenerationOutcome)> {
    let mut outcomes = Vec::with_capacity(sources.len());

    for source in sources {
        let generator = Generator::new((*source).clone(), fetcher.clone(), writer.clone());
        let outcome = generator.generate(sort).await;

        match &outcome {
            GenerationOutcome::Written { path, channels } => {
                info!(source = %source.name, channels, path = %path.display(), "Playlist ready");
            }
            GenerationOutcome::Skipped(reason) => {
                warn!(source = %source.name, %reason, "No playlist generated");
            }
            GenerationOutcome::WriteFailed(e) => {
                warn!(source = %source.name, error = %e, "Playlist could not be saved");
            }
        }

        outcomes.push((source.name.clone(), outcome));
    }

    outcomes
}
