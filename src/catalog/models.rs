use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// A single key/value entry of a dataset's extras list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extra {
    pub key: String,
    /// `None` when the source entry had no `value` member at all
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<Value>,
    /// Sibling fields the catalog attaches (state, revision ids, ...)
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

/// Keeps an explicit `null` apart from a missing member
fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl Extra {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value: Some(value),
            other: Map::new(),
        }
    }
}

/// Ordered key/value side-table of a dataset.
///
/// Entries keep their document order. Lookups resolve to the first entry carrying a key;
/// later duplicates are kept as-is so the list round-trips unchanged.
/// `Extras::default()` stands for a document without an `extras` member.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Extra>", into = "Vec<Extra>")]
pub struct Extras {
    entries: Vec<Extra>,
    index: HashMap<String, usize>,
    present: bool,
}

impl Extras {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True for a list that was neither read from the document nor written to
    pub fn is_absent(&self) -> bool {
        !self.present && self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Extra> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.key.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.index
            .get(key)
            .and_then(|&i| self.entries[i].value.as_ref())
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.index
            .get(key)
            .and_then(|&i| self.entries[i].value.as_mut())
    }

    /// Appends an entry. A key already present keeps resolving to its first entry.
    pub fn push(&mut self, extra: Extra) {
        self.index
            .entry(extra.key.clone())
            .or_insert(self.entries.len());
        self.entries.push(extra);
        self.present = true;
    }

    /// Overwrites the value of the first entry with `key` in place, or appends a new
    /// entry at the end. Returns true when an entry was appended.
    pub fn upsert(&mut self, key: &str, value: Value) -> bool {
        match self.index.get(key) {
            Some(&i) => {
                self.entries[i].value = Some(value);
                false
            }
            None => {
                self.push(Extra::new(key, value));
                true
            }
        }
    }

    /// Integer reading of an extra. Catalogs usually echo values back as strings, so
    /// numeric strings and integral floats count; anything else is `None`.
    pub fn integer_value(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(integral))
            }
            _ => None,
        }
    }

}

fn integral(value: f64) -> Option<i64> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

impl From<Vec<Extra>> for Extras {
    fn from(entries: Vec<Extra>) -> Self {
        let mut extras = Extras::new();
        for extra in entries {
            extras.push(extra);
        }
        extras.present = true;
        extras
    }
}

impl From<Extras> for Vec<Extra> {
    fn from(extras: Extras) -> Self {
        extras.entries
    }
}

/// Full metadata document of a catalog dataset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default, skip_serializing_if = "Extras::is_absent")]
    pub extras: Extras,
    /// Every other field of the document, passed back untouched on update
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Dataset {
    pub fn id(&self) -> Option<&str> {
        self.fields.get("id").and_then(Value::as_str)
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn set_field(&mut self, key: &str, value: Value) {
        self.fields.insert(key.to_string(), value);
    }
}
