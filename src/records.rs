use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Guaranteed record key: the scraped page's address.
pub const URL_COLUMN: &str = "url";
/// Guaranteed record key for flagged records.
pub const ERROR_COLUMN: &str = "error";

/// Marker recorded when a detail page never produced its content.
pub const ERROR_NO_CONTENT: &str = "no_content_or_captcha_timeout";
/// Marker recorded when navigation to the detail page itself failed.
pub const ERROR_NAVIGATION: &str = "navigation_failed";

/// One scraped detail page: the url, an optional error marker, and an
/// open string-to-string mapping of extracted fields keyed by on-page
/// label. The key set is not fixed in advance; the attribute table
/// contributes whatever labels the listing carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRecord {
    pub url: String,
    pub error: Option<String>,
    fields: BTreeMap<String, String>,
}

impl DetailRecord {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            error: None,
            fields: BTreeMap::new(),
        }
    }

    /// Record for a page that produced nothing: just the url and the
    /// error marker, no field keys.
    pub fn failed(url: &str, marker: &str) -> Self {
        Self {
            url: url.to_string(),
            error: Some(marker.to_string()),
            fields: BTreeMap::new(),
        }
    }

    /// Insert an extracted field. The reserved `url`/`error` keys cannot
    /// be shadowed by on-page labels.
    pub fn insert(&mut self, key: &str, value: String) {
        if key == URL_COLUMN || key == ERROR_COLUMN {
            ::log::debug!("ignoring reserved field key `{}` from page content", key);
            return;
        }
        self.fields.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn field_keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Cell value for a serialization column; absent keys are empty
    /// cells, never an error.
    pub fn value_for_column(&self, column: &str) -> &str {
        match column {
            URL_COLUMN => &self.url,
            ERROR_COLUMN => self.error.as_deref().unwrap_or(""),
            _ => self.get(column).unwrap_or(""),
        }
    }
}

/// Column order for serializing a record set: `url` first, the error
/// marker next when any record carries one, then the sorted union of
/// every field key seen across the records.
pub fn column_union(records: &[DetailRecord]) -> Vec<String> {
    let mut columns = vec![URL_COLUMN.to_string()];

    if records.iter().any(DetailRecord::is_error) {
        columns.push(ERROR_COLUMN.to_string());
    }

    let mut keys = BTreeSet::new();
    for record in records {
        keys.extend(record.field_keys().map(str::to_string));
    }
    columns.extend(keys);

    columns
}

/// Ordered unique set of collected links: first-seen order preserved,
/// duplicates silently dropped.
#[derive(Debug, Default)]
pub struct LinkSet {
    ordered: Vec<String>,
    seen: HashSet<String>,
}

impl LinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the link had not been seen before.
    pub fn insert(&mut self, link: String) -> bool {
        if self.seen.contains(&link) {
            return false;
        }
        self.seen.insert(link.clone());
        self.ordered.push(link);
        true
    }

    /// Insert many links, returning how many were new.
    pub fn extend<I: IntoIterator<Item = String>>(&mut self, links: I) -> usize {
        links.into_iter().filter(|l| self.insert(l.clone())).count()
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ordered.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.ordered
    }
}
