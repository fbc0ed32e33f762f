use serde_json::{Map, Value};
use std::collections::HashMap;

use super::value_text;

/// Character descriptions keyed by reference name
#[derive(Debug, Clone, Default)]
pub struct CharacterReferenceTable {
    entries: HashMap<String, String>,
}

impl CharacterReferenceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the table from a project's `character_references` mapping.
    pub fn from_map(references: &Map<String, Value>) -> Self {
        Self {
            entries: references
                .iter()
                .map(|(name, text)| (name.clone(), value_text(text)))
                .collect(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.entries.insert(name.into(), text.into());
    }

    /// Resolve a reference name.
    ///
    /// Tries the trimmed name verbatim first, then its snake_case form
    /// (`Old Man Murata` -> `old_man_murata`).
    pub fn resolve(&self, name: &str) -> Option<&str> {
        let name = name.trim();
        if let Some(text) = self.entries.get(name) {
            return Some(text);
        }

        let snake = name.to_lowercase().replace(' ', "_");
        self.entries.get(&snake).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
