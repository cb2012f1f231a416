//! Declarative description of the catalogs a playlist can be built from.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::SourceError;

pub const ID_PLACEHOLDER: &str = "{id}";

/// Everything that differs between two catalog sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Short name, also used for the output file (`<name>_all.m3u`)
    pub name: String,
    /// Gzip compressed JSON catalog
    pub catalog_url: String,
    /// Guide data referenced from the playlist header
    pub epg_url: String,
    /// Stream address, with `{id}` standing for the channel identifier
    pub stream_url_template: String,
}

impl SourceConfig {
    pub fn stirr() -> Self {
        Self {
            name: "stirr".to_string(),
            catalog_url: "https://github.com/matthuisman/i.mjh.nz/raw/refs/heads/master/Stirr/.channels.json.gz".to_string(),
            // refers to `master`, unlike the catalog's `refs/heads/master`
            epg_url: "https://github.com/matthuisman/i.mjh.nz/raw/master/Stirr/all.xml.gz"
                .to_string(),
            stream_url_template: "https://jmp2.uk/str-{id}.m3u8".to_string(),
        }
    }

    pub fn playlist_filename(&self) -> String {
        format!("{}_all.m3u", self.name)
    }

    pub fn stream_url(&self, channel_id: &str) -> String {
        self.stream_url_template.replace(ID_PLACEHOLDER, channel_id)
    }

    pub fn validate(&self) -> Result<(), SourceError> {
        if self.name.trim().is_empty() {
            return Err(SourceError::EmptyName);
        }

        // the name becomes a file name inside the output directory
        if self.name.contains(['/', '\\']) || self.name.contains("..") {
            return Err(SourceError::InvalidName(self.name.clone()));
        }

        for (field, value) in [("catalog_url", &self.catalog_url), ("epg_url", &self.epg_url)] {
            Url::parse(value).map_err(|e| SourceError::InvalidUrl {
                name: self.name.clone(),
                field,
                reason: e.to_string(),
            })?;
        }

        if !self.stream_url_template.contains(ID_PLACEHOLDER) {
            return Err(SourceError::MissingPlaceholder(self.name.clone()));
        }

        Ok(())
    }
}

/// Ordered set of sources, looked up by case-insensitive name.
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    sources: Vec<SourceConfig>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every source this crate knows about.
    pub fn builtin() -> Self {
        Self {
            sources: vec![SourceConfig::stirr()],
        }
    }

    /// Add a source, or replace the one registered under the same name.
    pub fn register(&mut self, source: SourceConfig) -> Result<(), SourceError> {
        source.validate()?;
        match self
            .sources
            .iter_mut()
            .find(|s| s.name.eq_ignore_ascii_case(&source.name))
        {
            Some(existing) => *existing = source,
            None => self.sources.push(source),
        }
        Ok(())
    }

    /// Build a registry from a list that must not repeat names.
    pub fn from_sources(
        sources: impl IntoIterator<Item = SourceConfig>,
    ) -> Result<Self, SourceError> {
        let mut registry = Self::new();
        for source in sources {
            if registry.get(&source.name).is_some() {
                return Err(SourceError::DuplicateName(source.name));
            }
            registry.register(source)?;
        }
        Ok(registry)
    }

    pub fn get(&self, name: &str) -> Option<&SourceConfig> {
        self.sources
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceConfig> {
        self.sources.iter()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
