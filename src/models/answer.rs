use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Question id to recorded answer. Absence of a key means unanswered; an
/// empty string is a recorded answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerMap(BTreeMap<String, String>);

impl AnswerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upserts the answer for `id`, returning the one it replaced.
    pub fn record(&mut self, id: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(id.into(), value.into())
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.0.get(id).map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Copy holding only the entries whose id passes `keep`.
    pub fn filtered<F>(&self, mut keep: F) -> AnswerMap
    where
        F: FnMut(&str) -> bool,
    {
        AnswerMap(
            self.0
                .iter()
                .filter(|(id, _)| keep(id.as_str()))
                .map(|(id, value)| (id.clone(), value.clone()))
                .collect(),
        )
    }
}
