use serde_json::{Map, Value};
use std::collections::HashMap;

use super::value_text;

/// Flattened style blocks keyed by name, looked up case-insensitively.
///
/// Every source block is registered twice: under its own key and under a
/// title-cased, space-separated variant (`universal_style_block` and
/// `Universal Style Block`), both holding the same flattened text.
#[derive(Debug, Clone, Default)]
pub struct StyleBlockTable {
    entries: Vec<(String, String)>,
    // lowercased key -> position in `entries`; the first registration wins
    index: HashMap<String, usize>,
}

impl StyleBlockTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the table from a project's `core_style` mapping.
    pub fn from_core_style(core_style: &Map<String, Value>) -> Self {
        let mut table = Self::new();
        for (name, content) in core_style {
            table.register(name, &flatten_block(content));
        }
        table
    }

    /// Register a block under its own name and its title-cased variant.
    pub fn register(&mut self, name: &str, flattened: &str) {
        self.insert(name, flattened);
        self.insert(&title_case_key(name), flattened);
    }

    fn insert(&mut self, key: &str, value: &str) {
        if self.entries.iter().any(|(existing, _)| existing == key) {
            return;
        }
        let position = self.entries.len();
        self.entries.push((key.to_string(), value.to_string()));
        self.index.entry(key.to_lowercase()).or_insert(position);
    }

    /// Look up a block by name, ignoring case.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.index
            .get(&key.to_lowercase())
            .map(|&position| self.entries[position].1.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Registered keys in registration order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Flatten a style block into prompt text.
///
/// A mapping becomes `key: value` pairs joined by `, ` in source order;
/// anything else is rendered as its string form.
pub fn flatten_block(content: &Value) -> String {
    match content {
        Value::Object(attributes) => attributes
            .iter()
            .map(|(key, value)| format!("{}: {}", key, value_text(value)))
            .collect::<Vec<_>>()
            .join(", "),
        other => value_text(other),
    }
}

/// `universal_style_block` -> `Universal Style Block`
///
/// Underscores become spaces, then each run of letters is capitalized with
/// the rest of the run lowercased.
pub fn title_case_key(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut previous_is_letter = false;

    for c in name.chars() {
        let c = if c == '_' { ' ' } else { c };
        if c.is_alphabetic() {
            if previous_is_letter {
                result.extend(c.to_lowercase());
            } else {
                result.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            result.push(c);
            previous_is_letter = false;
        }
    }

    result
}
