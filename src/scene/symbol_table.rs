use std::collections::HashMap;

use crate::parser::token::Position;

#[derive(Debug, Clone, PartialEq)]
pub struct Entry<V> {
    pub name: String,
    pub value: V,
    pub at: Position,
}

/// Write-once name table. Iteration follows declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolTable<V> {
    entries: Vec<Entry<V>>,
    index: HashMap<String, usize>,
}

impl<V> Default for SymbolTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> SymbolTable<V> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Fails with the position of the first declaration if `name` is taken.
    pub fn declare(&mut self, name: &str, value: V, at: Position) -> Result<(), Position> {
        if let Some(existing) = self.index.get(name) {
            return Err(self.entries[*existing].at);
        }

        self.index.insert(name.to_owned(), self.entries.len());
        self.entries.push(Entry { name: name.to_owned(), value, at });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&V> {
        self.index.get(name).map(|i| &self.entries[*i].value)
    }

    pub fn position(&self, name: &str) -> Option<Position> {
        self.index.get(name).map(|i| self.entries[*i].at)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry<V>> {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Closest declared name, if any is similar enough to be a likely typo.
    pub fn suggest(&self, name: &str) -> Option<&str> {
        closest(name, self.names())
    }
}

pub fn closest<'n>(name: &str, candidates: impl IntoIterator<Item = &'n str>) -> Option<&'n str> {
    candidates
        .into_iter()
        .map(|candidate| (candidate, strsim::jaro_winkler(name, candidate)))
        .filter(|(_, score)| *score >= 0.8)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(candidate, _)| candidate)
}
