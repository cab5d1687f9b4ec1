//! Metadata bound to a logger and rendered as a line prefix.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

/// Key used by the bare scalar shorthand.
pub const SCALAR_KEY: &str = "str";

/// Ordered key/value tags.
///
/// Keys keep their insertion order. Inserting a key that is already present
/// replaces its value without moving it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    entries: Vec<(String, Value)>,
}

impl Metadata {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// The `{str: value}` shorthand for a single bare tag.
    pub fn scalar(value: impl ToString) -> Self {
        Self {
            entries: vec![(SCALAR_KEY.to_string(), Value::String(value.to_string()))],
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Render the tag prefix, including its trailing space.
    ///
    /// Presence is decided by key count, so falsy values (`0`, `false`, `""`)
    /// still produce a prefix.
    pub fn prefix(&self) -> String {
        match self.entries.as_slice() {
            [] => String::new(),
            [(key, value)] if key == SCALAR_KEY => format!("<{}> ", render_value(value)),
            entries => {
                let pairs: Vec<String> = entries
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, render_value(v)))
                    .collect();
                format!("<{}> ", pairs.join(" | "))
            }
        }
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl Serialize for Metadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut meta = Metadata::new();
        for (k, v) in iter {
            meta.insert(k, v);
        }
        meta
    }
}

impl From<serde_json::Map<String, Value>> for Metadata {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        map.into_iter().collect()
    }
}

impl From<&str> for Metadata {
    fn from(tag: &str) -> Self {
        Metadata::scalar(tag)
    }
}

impl From<String> for Metadata {
    fn from(tag: String) -> Self {
        Metadata::scalar(tag)
    }
}

macro_rules! scalar_tags {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Metadata {
                fn from(tag: $ty) -> Self {
                    Metadata::scalar(tag)
                }
            }
        )*
    };
}

scalar_tags!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64, bool);

/// Build a [`Metadata`] from `key => value` pairs.
///
/// ```
/// let meta = request_logger::meta! { "file" => "main.rs", "line" => 42 };
/// assert_eq!(meta.prefix(), "<file=main.rs | line=42> ");
/// ```
#[macro_export]
macro_rules! meta {
    () => {
        $crate::format::Metadata::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        $crate::format::Metadata::new()$(.with($key, $value))+
    };
}
