use std::fmt::{self, Display};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::CatalogError;

pub const UNKNOWN_CHANNEL_NAME: &str = "Unknown Channel";
pub const UNCATEGORIZED_GROUP: &str = "Uncategorized";

/// Channel number exactly as the catalog spells it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChannelNumber {
    Number(serde_json::Number),
    Text(String),
    Other(Value),
}

impl ChannelNumber {
    /// Integer used for ordering. Floats are truncated toward zero and strings
    /// are parsed after trimming; anything else has no numeric value.
    pub fn sort_value(&self) -> Option<i64> {
        match self {
            ChannelNumber::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
            ChannelNumber::Text(s) => s.trim().parse().ok(),
            ChannelNumber::Other(_) => None,
        }
    }

    /// The number as it should appear in `tvg-chno`, if it is made of digits only.
    pub fn digits(&self) -> Option<String> {
        let text = self.to_string();
        if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
            Some(text)
        } else {
            None
        }
    }
}

impl Display for ChannelNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelNumber::Number(n) => write!(f, "{n}"),
            ChannelNumber::Text(s) => f.write_str(s),
            ChannelNumber::Other(v) => write!(f, "{v}"),
        }
    }
}

impl From<u32> for ChannelNumber {
    fn from(value: u32) -> Self {
        ChannelNumber::Number(value.into())
    }
}

impl From<&str> for ChannelNumber {
    fn from(value: &str) -> Self {
        ChannelNumber::Text(value.to_string())
    }
}

/// One channel of a catalog. `null` fields are read as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub chno: Option<ChannelNumber>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub logo: Option<String>,
    #[serde(default)]
    pub groups: Option<Vec<String>>,
}

/// Strings pass through, other scalars keep their JSON spelling.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => Some(text),
        Some(other) => Some(other.to_string()),
    })
}

impl ChannelRecord {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNKNOWN_CHANNEL_NAME)
    }

    pub fn logo(&self) -> &str {
        self.logo.as_deref().unwrap_or_default()
    }

    pub fn groups(&self) -> &[String] {
        self.groups.as_deref().unwrap_or_default()
    }

    pub fn group_title(&self) -> String {
        let groups = self.groups();
        if groups.is_empty() {
            UNCATEGORIZED_GROUP.to_string()
        } else {
            groups.join(", ")
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub id: String,
    pub record: ChannelRecord,
}

/// Channels keyed by identifier, in the order the document lists them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Read the `channels` object of a catalog document.
    pub fn from_json(value: Value) -> Result<Self, CatalogError> {
        let Value::Object(mut document) = value else {
            return Err(CatalogError::MissingChannels);
        };

        let channels = match document.remove("channels") {
            Some(Value::Object(channels)) => channels,
            Some(_) => return Err(CatalogError::ChannelsNotAMap),
            None => return Err(CatalogError::MissingChannels),
        };

        let entries = channels
            .into_iter()
            .map(|(id, value)| match serde_json::from_value(value) {
                Ok(record) => Ok(CatalogEntry { id, record }),
                Err(source) => Err(CatalogError::InvalidChannel { id, source }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ChannelRecord> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| &entry.record)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.id.as_str())
    }
}

impl FromIterator<(String, ChannelRecord)> for Catalog {
    fn from_iter<T: IntoIterator<Item = (String, ChannelRecord)>>(iter: T) -> Self {
        let mut entries: Vec<CatalogEntry> = Vec::new();
        for (id, record) in iter {
            // later entries replace earlier ones, like keys in a JSON object
            match entries.iter_mut().find(|entry| entry.id == id) {
                Some(existing) => existing.record = record,
                None => entries.push(CatalogEntry { id, record }),
            }
        }
        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn keeps_document_order() {
        let catalog = Catalog::from_json(json!({
            "channels": {
                "zeta": { "name": "Zeta" },
                "alpha": { "name": "Alpha" },
                "mid": { "name": "Mid" }
            }
        }))
        .unwrap();

        assert_eq!(catalog.ids().collect::<Vec<_>>(), ["zeta", "alpha", "mid"]);
        assert_eq!(catalog.get("alpha").unwrap().display_name(), "Alpha");
        assert!(catalog.get("missing").is_none());
    }

    #[test]
    fn ignores_unknown_fields() {
        let catalog = Catalog::from_json(json!({
            "version": 3,
            "channels": {
                "a": { "name": "A", "url": "x", "chno": 4, "region": "us" }
            }
        }))
        .unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("a").unwrap().chno, Some(ChannelNumber::from(4u32)));
    }

    #[test]
    fn missing_channels_field() {
        assert!(matches!(
            Catalog::from_json(json!({ "programs": {} })),
            Err(CatalogError::MissingChannels)
        ));
        assert!(matches!(
            Catalog::from_json(json!([1, 2, 3])),
            Err(CatalogError::MissingChannels)
        ));
        assert!(matches!(
            Catalog::from_json(json!({ "channels": null })),
            Err(CatalogError::ChannelsNotAMap)
        ));
    }

    #[test]
    fn invalid_channel_is_reported_by_id() {
        let err = Catalog::from_json(json!({
            "channels": { "ok": {}, "bad": "not an object" }
        }))
        .unwrap_err();
        match err {
            CatalogError::InvalidChannel { id, .. } => assert_eq!(id, "bad"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_string_logo_keeps_the_channel() {
        let catalog = Catalog::from_json(json!({
            "channels": {
                "a": { "name": "A", "logo": 5 },
                "b": { "name": "B" }
            }
        }))
        .unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("a").unwrap().logo(), "5");
        assert_eq!(catalog.get("b").unwrap().logo(), "");
    }

    #[test]
    fn empty_channels_is_valid() {
        let catalog = Catalog::from_json(json!({ "channels": {} })).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn null_fields_read_as_absent() {
        let record: ChannelRecord = serde_json::from_value(json!({
            "name": null, "chno": null, "logo": null, "groups": null
        }))
        .unwrap();
        assert_eq!(record.display_name(), UNKNOWN_CHANNEL_NAME);
        assert_eq!(record.chno, None);
        assert_eq!(record.logo(), "");
        assert_eq!(record.group_title(), UNCATEGORIZED_GROUP);
    }

    #[test]
    fn group_title_joins_groups() {
        let record = ChannelRecord {
            groups: Some(vec!["News".into(), "Local".into()]),
            ..Default::default()
        };
        assert_eq!(record.group_title(), "News, Local");
    }

    #[test]
    fn channel_number_variants() {
        let parse = |v: Value| serde_json::from_value::<ChannelNumber>(v).unwrap();

        let int = parse(json!(42));
        assert_eq!(int.sort_value(), Some(42));
        assert_eq!(int.digits().as_deref(), Some("42"));

        let float = parse(json!(12.7));
        assert_eq!(float.sort_value(), Some(12));
        assert_eq!(float.digits(), None);

        let negative = parse(json!(-3));
        assert_eq!(negative.sort_value(), Some(-3));
        assert_eq!(negative.digits(), None);

        let text = parse(json!(" 007 "));
        assert_eq!(text.sort_value(), Some(7));
        assert_eq!(text.digits(), None);

        let padded = parse(json!("007"));
        assert_eq!(padded.digits().as_deref(), Some("007"));

        let word = parse(json!("abc"));
        assert_eq!(word.sort_value(), None);
        assert_eq!(word.digits(), None);

        let other = parse(json!(true));
        assert!(matches!(other, ChannelNumber::Other(_)));
        assert_eq!(other.sort_value(), None);
        assert_eq!(other.digits(), None);
    }

    #[test]
    fn from_iter_replaces_duplicate_ids() {
        let catalog: Catalog = [
            ("a".to_string(), ChannelRecord::default()),
            (
                "a".to_string(),
                ChannelRecord {
                    name: Some("Second".into()),
                    ..Default::default()
                },
            ),
        ]
        .into_iter()
        .collect();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("a").unwrap().display_name(), "Second");
    }
}
