use crate::Value;
use std::collections::BTreeMap;

/// Flat key to value store consulted by `:key` placeholders. It is installed
/// once for the life of an injector and read-only afterwards.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Parameters {
    values: BTreeMap<String, Value>,
}

impl Parameters {
    #[must_use]
    pub fn new() -> Self {
        Parameters::default()
    }

    /// Adds a parameter, replacing an earlier value for the same key. Only
    /// meaningful before the store is installed into an injector.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn insert(&mut self, key: String, value: Value) {
        self.values.insert(key, value);
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Parameters {
            values: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]>
    for Parameters
{
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}
