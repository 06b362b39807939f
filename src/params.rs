//! Ordered request parameters.

use url::form_urlencoded;

/// An insertion-ordered multimap of request parameters.
///
/// Mirrors how web frameworks expose query strings and form bodies: a key may
/// repeat, lookups see the most recent value, and iteration keeps the order
/// the values arrived in.
///
/// # Examples
///
/// ```
/// use marketplace_canvas::Params;
///
/// let mut params = Params::from_query("a=1&b=2&a=3");
/// assert_eq!(params.get("a"), Some("3"));
/// assert_eq!(params.get_all("a").collect::<Vec<_>>(), vec!["1", "3"]);
///
/// params.append("c", "4");
/// assert_eq!(params.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    pairs: Vec<(String, String)>,
}

impl Params {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an `application/x-www-form-urlencoded` string.
    ///
    /// A leading `?` is tolerated.
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self {
            pairs: form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        }
    }

    /// Appends a value, keeping any existing values for `key`.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Appends every pair from `other`.
    pub fn extend(&mut self, other: &Params) {
        self.pairs.extend(other.pairs.iter().cloned());
    }

    /// Returns the most recently appended value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns every value for `key` in arrival order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns each distinct key once, in first-seen order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        let mut seen: Vec<&str> = Vec::new();
        self.pairs.iter().filter_map(move |(k, _)| {
            if seen.contains(&k.as_str()) {
                None
            } else {
                seen.push(k.as_str());
                Some(k.as_str())
            }
        })
    }

    /// Returns `true` if any value is present for `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// Number of stored pairs, counting repeats.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns `true` when no pairs are stored.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Iterates over all pairs in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_query_decodes_values() {
        let params = Params::from_query("?hubspot.marketplace.user.email=a%40b.com&x=1+2");
        assert_eq!(params.get("hubspot.marketplace.user.email"), Some("a@b.com"));
        assert_eq!(params.get("x"), Some("1 2"));
    }

    #[test]
    fn get_returns_last_value() {
        let mut params = Params::new();
        params.append("k", "first");
        params.append("k", "second");
        assert_eq!(params.get("k"), Some("second"));
    }

    #[test]
    fn get_missing_is_none() {
        assert_eq!(Params::new().get("nope"), None);
    }

    #[test]
    fn keys_are_deduplicated_in_order() {
        let params: Params = vec![("b", "1"), ("a", "2"), ("b", "3")].into_iter().collect();
        assert_eq!(params.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn extend_is_additive() {
        let mut params = Params::from_query("a=1");
        params.extend(&Params::from_query("a=2&b=3"));
        assert_eq!(params.get_all("a").collect::<Vec<_>>(), vec!["1", "2"]);
        assert!(params.contains_key("b"));
    }
}
