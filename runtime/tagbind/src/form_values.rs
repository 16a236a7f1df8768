use indexmap::IndexMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// A string multimap: every key maps to the list of values submitted for it,
/// in submission order.
///
/// It's the input of the form-family walkers and of [`UriBinding`](crate::binding::UriBinding).
///
/// ```rust
/// use tagbind::FormValues;
///
/// let form = FormValues::parse(b"tag=a&tag=b&name=Ada+Lovelace");
/// assert_eq!(form.get("tag"), Some(&["a".to_string(), "b".to_string()][..]));
/// assert_eq!(form.first("name"), Some("Ada Lovelace"));
/// ```
pub struct FormValues(IndexMap<String, Vec<String>>);

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an `application/x-www-form-urlencoded` payload.
    pub fn parse(input: &[u8]) -> Self {
        form_urlencoded::parse(input)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    /// Parse the query string of a request target, if it has one.
    pub fn from_query(target: &http::Uri) -> Self {
        target
            .query()
            .map(|query| Self::parse(query.as_bytes()))
            .unwrap_or_default()
    }

    /// Every value submitted for `key`.
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.0.get(key).map(Vec::as_slice)
    }

    /// The first value submitted for `key`.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.0.get(key)?.first().map(String::as_str)
    }

    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.entry(key.into()).or_default().push(value.into());
    }

    /// Append every value of `other` after the values already stored under the same key.
    pub fn merge(&mut self, other: FormValues) {
        for (key, values) in other.0 {
            self.0.entry(key).or_default().extend(values);
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl<K, V> FromIterator<(K, V)> for FormValues
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = Self::new();
        for (key, value) in iter {
            values.append(key, value);
        }
        values
    }
}

impl From<IndexMap<String, Vec<String>>> for FormValues {
    fn from(map: IndexMap<String, Vec<String>>) -> Self {
        Self(map)
    }
}
