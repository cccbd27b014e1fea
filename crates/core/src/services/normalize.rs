//! Normalization of submitted names, tags and css lines.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// A field that may be submitted as a single value or a list of values.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    /// Flatten into a list.
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

impl Default for OneOrMany {
    fn default() -> Self {
        Self::Many(Vec::new())
    }
}

/// `deserialize_with` helper accepting a string, a list of strings or null.
pub fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<OneOrMany>::deserialize(deserializer)?
        .map(OneOrMany::into_vec)
        .unwrap_or_default())
}

/// Trim every element, drop empty ones and deduplicate keeping first-seen order.
#[must_use]
pub fn normalize_list<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for value in values {
        let value = value.as_ref().trim();
        if value.is_empty() || out.iter().any(|seen| seen == value) {
            continue;
        }
        out.push(value.to_string());
    }
    out
}

/// Normalize the alias list. On create the canonical name is always one of the names.
#[must_use]
pub fn normalize_names(names: &[String], canonical_name: &str, is_create: bool) -> Vec<String> {
    let mut names = normalize_list(names);
    if is_create && !names.iter().any(|n| n == canonical_name) {
        names.push(canonical_name.to_string());
    }
    names
}

/// Parse `prop: value` lines into an ordered property map.
///
/// The last value given for a property wins while the property keeps the
/// position of its first occurrence. A line without a colon yields an empty
/// value; a line with an empty property is dropped.
#[must_use]
pub fn parse_css<I, S>(lines: I) -> Map<String, Value>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut css = Map::new();
    for line in lines {
        let line = line.as_ref();
        if line.trim().is_empty() {
            continue;
        }

        let (property, value) = line.split_once(':').unwrap_or((line, ""));
        let property = property.trim();
        if property.is_empty() {
            continue;
        }

        // `insert` on an existing key keeps its position with preserve_order.
        css.insert(property.to_string(), Value::String(value.trim().to_string()));
    }
    css
}
