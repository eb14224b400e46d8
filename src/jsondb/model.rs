use crate::error::{DbError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type RecordId = u64;

/// Attribute map. Keys iterate in sorted order, which is the display order too.
pub type Attributes = BTreeMap<String, String>;

/// An ordered set of tags: no duplicates, iteration in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(Vec<String>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tag, returning false if it was already present.
    pub fn insert(&mut self, tag: impl Into<String>) -> bool {
        let tag = tag.into();
        if self.contains(&tag) {
            return false;
        }
        self.0.push(tag);
        true
    }

    /// Removes a tag, returning false if it wasn't there.
    pub fn remove(&mut self, tag: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|t| t != tag);
        self.0.len() != before
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }

    pub fn contains_all<S: AsRef<str>>(&self, tags: &[S]) -> bool {
        tags.iter().all(|t| self.contains(t.as_ref()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn join(&self, sep: &str) -> String {
        self.0.join(sep)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// True if the underlying list holds the same tag twice.
    pub(crate) fn has_duplicates(&self) -> bool {
        self.0
            .iter()
            .enumerate()
            .any(|(i, t)| self.0[..i].contains(t))
    }
}

impl<S: Into<String>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = TagSet::new();
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}

impl<'a> IntoIterator for &'a TagSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub data: String,
    pub tags: TagSet,
    pub attrs: Attributes,
}

impl Record {
    pub fn new(id: RecordId, data: impl Into<String>, tags: TagSet, attrs: Attributes) -> Self {
        Self {
            id,
            data: data.into(),
            tags,
            attrs,
        }
    }
}

/// A partial change to a record. Sub-changes are applied in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordPatch {
    pub data: Option<String>,
    pub add_tags: Vec<String>,
    pub remove_tags: Vec<String>,
    pub set_attrs: Vec<(String, String)>,
    pub unset_attrs: Vec<String>,
}

impl RecordPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn add_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn remove_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.remove_tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn set_attrs<I>(mut self, attrs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.set_attrs.extend(attrs);
        self
    }

    pub fn unset_attrs<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.unset_attrs.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_none()
            && self.add_tags.is_empty()
            && self.remove_tags.is_empty()
            && self.set_attrs.is_empty()
            && self.unset_attrs.is_empty()
    }

    /// Applies the patch to a record in place. Removing absent tags or
    /// unsetting absent keys is a no-op.
    pub(crate) fn apply_to(&self, record: &mut Record) {
        if let Some(data) = &self.data {
            record.data = data.clone();
        }
        for tag in &self.add_tags {
            record.tags.insert(tag.clone());
        }
        for tag in &self.remove_tags {
            record.tags.remove(tag);
        }
        for (key, value) in &self.set_attrs {
            record.attrs.insert(key.clone(), value.clone());
        }
        for key in &self.unset_attrs {
            record.attrs.remove(key);
        }
    }
}

/// Checks an attribute key: non-empty, no whitespace, no colon.
pub fn validate_attr_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(DbError::Validation("attribute key cannot be empty".into()));
    }
    if key.chars().any(|c| c.is_whitespace() || c == ':') {
        return Err(DbError::Validation(format!(
            "invalid attribute key '{}' (no whitespace or ':' allowed)",
            key
        )));
    }
    Ok(())
}

/// Parses `KEY:VALUE`. The key ends at the first colon; the value may be empty
/// or contain further colons.
pub fn parse_attr_pair(entry: &str) -> Result<(String, String)> {
    let (key, value) = entry.split_once(':').ok_or_else(|| {
        DbError::Validation(format!(
            "invalid attribute '{}' (should be of format 'KEY:VALUE')",
            entry
        ))
    })?;
    validate_attr_key(key)?;
    Ok((key.to_string(), value.to_string()))
}

/// Parses every entry. A key may appear only once.
pub fn parse_attr_pairs<S: AsRef<str>>(entries: &[S]) -> Result<Vec<(String, String)>> {
    let mut pairs: Vec<(String, String)> = Vec::with_capacity(entries.len());
    for entry in entries {
        let (key, value) = parse_attr_pair(entry.as_ref())?;
        if pairs.iter().any(|(k, _)| *k == key) {
            return Err(DbError::Validation(format!(
                "attribute '{}' given more than once",
                key
            )));
        }
        pairs.push((key, value));
    }
    Ok(pairs)
}
