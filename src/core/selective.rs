use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

const BUNDLED_CATALOG: &str = include_str!("selective_downloads.json");

static CATALOG: Lazy<HashMap<String, Vec<SelectiveDownload>>> = Lazy::new(|| {
    parse_catalog(BUNDLED_CATALOG).unwrap_or_else(|err| {
        tracing::error!("Bundled selective download catalog is invalid: {}", err);
        HashMap::new()
    })
});

/// An optional content group of a title, e.g. a voice pack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectiveDownload {
    pub name: String,
    #[serde(deserialize_with = "one_or_many")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub mandatory: bool,
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Tags {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Tags::deserialize(deserializer)? {
        Tags::One(tag) => vec![tag],
        Tags::Many(tags) => tags,
    })
}

pub fn parse_catalog(json: &str) -> serde_json::Result<HashMap<String, Vec<SelectiveDownload>>> {
    serde_json::from_str(json)
}

/// Selective download entries for `app_name`, empty when the title has none.
pub fn entries_for(app_name: &str) -> &'static [SelectiveDownload] {
    CATALOG.get(app_name).map(Vec::as_slice).unwrap_or(&[])
}

/// Selected tags, in the order they were picked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSelection {
    tags: Vec<String>,
    /// Tags of mandatory entries. They stay selected whatever gets toggled.
    mandatory: Vec<String>,
}

impl TagSelection {
    /// Starts with every tag of every mandatory entry.
    pub fn seeded(entries: &[SelectiveDownload]) -> Self {
        let mut tags: Vec<String> = Vec::new();
        for entry in entries.iter().filter(|e| e.mandatory) {
            for tag in &entry.tags {
                if !tags.contains(tag) {
                    tags.push(tag.clone());
                }
            }
        }
        Self {
            mandatory: tags.clone(),
            tags,
        }
    }

    /// Flip each tag of `entry` on its own: present tags are removed, missing
    /// ones appended. An entry whose tags were partly selected stays partly
    /// selected. Mandatory entries and tags they share are left alone.
    pub fn toggle(&mut self, entry: &SelectiveDownload) {
        if entry.mandatory {
            return;
        }

        for tag in &entry.tags {
            if self.mandatory.contains(tag) {
                continue;
            }
            if let Some(pos) = self.tags.iter().position(|t| t == tag) {
                self.tags.remove(pos);
            } else {
                self.tags.push(tag.clone());
            }
        }
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// True when every tag of `entry` is selected.
    pub fn covers(&self, entry: &SelectiveDownload) -> bool {
        !entry.tags.is_empty() && entry.tags.iter().all(|t| self.contains(t))
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}
