use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Tag path → value mapping of one record.
///
/// Keys are unique. Lookup is by key; iteration (and serialization) follows
/// first-insertion order so exports are deterministic. Overwriting a key keeps
/// its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl Fields {
    /// An empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `path` to `value`, returning the previous value if any.
    pub fn insert(&mut self, path: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let path = path.into();
        let value = value.into();
        match self.index.get(&path) {
            Some(&i) => Some(std::mem::replace(&mut self.entries[i].1, value)),
            None => {
                self.index.insert(path.clone(), self.entries.len());
                self.entries.push((path, value));
                None
            }
        }
    }

    /// Append `text` to the value at `path`, creating an empty value first if needed.
    pub fn append(&mut self, path: &str, text: &str) {
        match self.index.get(path) {
            Some(&i) => self.entries[i].1.push_str(text),
            None => {
                self.insert(path, text);
            }
        }
    }

    /// Value stored at `path`.
    pub fn get(&self, path: &str) -> Option<&str> {
        self.index.get(path).map(|&i| self.entries[i].1.as_str())
    }

    /// Whether `path` has a value.
    pub fn contains_key(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    /// Number of distinct paths.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no path has been set.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(path, value)` pairs in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Paths in first-insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Fields::new();
        for (k, v) in iter {
            fields.insert(k, v);
        }
        fields
    }
}

impl Serialize for Fields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// One logical entity: a level-0 line and everything nested under it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Record {
    /// Cross-reference identifier (text between the first pair of `@`).
    pub id: String,
    /// Record type following the identifier (e.g. `INDI`, `FAM`); may be empty.
    pub kind: String,
    /// Value after the record type on the level-0 line; usually empty.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub value: String,
    /// 1-based line number of the level-0 line.
    pub line: usize,
    /// Flattened tag paths and their values.
    pub fields: Fields,
}

impl Record {
    /// A record with no fields yet.
    pub fn new(id: impl Into<String>, kind: impl Into<String>, line: usize) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            value: String::new(),
            line,
            fields: Fields::new(),
        }
    }

    /// Shorthand for `self.fields.get(path)`.
    pub fn get(&self, path: &str) -> Option<&str> {
        self.fields.get(path)
    }
}
