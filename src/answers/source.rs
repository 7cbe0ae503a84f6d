use std::fmt;
use std::path::Path;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// Lowercase a key and strip every non-alphanumeric character. All fuzzy
/// matching happens in this normalized space.
pub fn normalize_key(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

/// Flat personal-profile record used by the keyword heuristics. Read-only for
/// the life of a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// Rendered the way host forms list it, e.g. "United States (+1)".
    #[serde(default)]
    pub phone_country: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

/// One resolved answer value. Numbers in source files load as text; booleans
/// stay booleans for checkbox state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Flag(bool),
    Text(String),
}

impl AnswerValue {
    pub fn text(s: &str) -> Self {
        AnswerValue::Text(s.to_string())
    }

    pub fn as_text(&self) -> String {
        match self {
            AnswerValue::Flag(b) => b.to_string(),
            AnswerValue::Text(t) => t.clone(),
        }
    }

    pub fn as_flag(&self) -> bool {
        match self {
            AnswerValue::Flag(b) => *b,
            AnswerValue::Text(t) => !matches!(
                t.trim().to_lowercase().as_str(),
                "" | "false" | "no" | "unchecked" | "0"
            ),
        }
    }
}

impl<'de> Deserialize<'de> for AnswerValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Int(i64),
            Float(f64),
            Text(String),
        }
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Flag(b) => AnswerValue::Flag(b),
            Raw::Int(n) => AnswerValue::Text(n.to_string()),
            Raw::Float(n) => AnswerValue::Text(n.to_string()),
            Raw::Text(t) => AnswerValue::Text(t),
        })
    }
}

/// Field-key → answer mapping. Keys may be a field id, name, or label.
///
/// Entries keep their insertion (document) order: the resolver's fuzzy pass
/// takes the first matching key, and that tiebreak must be deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnswerMap {
    entries: Vec<(String, AnswerValue)>,
}

impl AnswerMap {
    pub fn new() -> Self {
        AnswerMap::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: AnswerValue) {
        self.entries.push((key.into(), value));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Exact raw-key lookup.
    pub fn get(&self, key: &str) -> Option<&AnswerValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Lookup in normalized-key space.
    pub fn get_normalized(&self, normalized: &str) -> Option<&AnswerValue> {
        if normalized.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|(k, _)| normalize_key(k) == normalized)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AnswerValue)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }
}

impl<'de> Deserialize<'de> for AnswerMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MapVisitor;

        impl<'de> Visitor<'de> for MapVisitor {
            type Value = AnswerMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of field keys to answer values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut map = AnswerMap::new();
                while let Some((key, value)) = access.next_entry::<String, AnswerValue>()? {
                    map.insert(key, value);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(MapVisitor)
    }
}

impl FromIterator<(String, AnswerValue)> for AnswerMap {
    fn from_iter<T: IntoIterator<Item = (String, AnswerValue)>>(iter: T) -> Self {
        AnswerMap {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Profile plus answer map: everything the resolver may draw on. Immutable
/// for the duration of one form session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerSource {
    #[serde(default)]
    pub profile: ProfileRecord,
    #[serde(default)]
    pub answers: AnswerMap,
}

impl AnswerSource {
    pub fn new(profile: ProfileRecord, answers: AnswerMap) -> Self {
        AnswerSource { profile, answers }
    }
}

/// Load a combined answer source (profile + answers) from a YAML file.
pub fn load_answer_source(path: &Path) -> Result<AnswerSource, crate::error::EngineError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::error::EngineError::Config(format!("reading {}: {e}", path.display()))
    })?;
    serde_yaml::from_str(&content).map_err(|e| {
        crate::error::EngineError::Config(format!("parsing {}: {e}", path.display()))
    })
}
