use indexmap::IndexMap;
use serde::Serialize;

/// The resolved values of a fetch, keyed by field name in input order.
///
/// Immutable once built. Serializes as a map.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResolvedBundle<V> {
    values: IndexMap<String, V>,
}

impl<V> ResolvedBundle<V> {
    pub(crate) fn new(values: IndexMap<String, V>) -> Self {
        Self { values }
    }

    pub fn get(&self, field: &str) -> Option<&V> {
        self.values.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn into_inner(self) -> IndexMap<String, V> {
        self.values
    }
}

impl<V> IntoIterator for ResolvedBundle<V> {
    type Item = (String, V);
    type IntoIter = indexmap::map::IntoIter<String, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}
