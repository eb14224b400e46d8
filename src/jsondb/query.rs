//! Record selection: conjunctive tag filters and data search.

use crate::model::{Record, RecordId};

/// How `find_id` compares the needle against record data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchKind {
    /// The whole data must equal the needle.
    #[default]
    Exact,
    /// The needle must be a substring of the data.
    Contains,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CaseMode {
    #[default]
    Sensitive,
    Insensitive,
}

/// The two independent switches of a data search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindMode {
    pub kind: MatchKind,
    pub case: CaseMode,
}

impl FindMode {
    pub fn new(contains: bool, case_insensitive: bool) -> Self {
        Self {
            kind: if contains {
                MatchKind::Contains
            } else {
                MatchKind::Exact
            },
            case: if case_insensitive {
                CaseMode::Insensitive
            } else {
                CaseMode::Sensitive
            },
        }
    }

    pub fn matches(&self, needle: &str, data: &str) -> bool {
        let (needle, data) = match self.case {
            CaseMode::Sensitive => (needle.to_string(), data.to_string()),
            CaseMode::Insensitive => (needle.to_lowercase(), data.to_lowercase()),
        };
        match self.kind {
            MatchKind::Exact => data == needle,
            MatchKind::Contains => data.contains(&needle),
        }
    }
}

/// Records carrying every tag in `tags`. An empty filter matches everything.
///
/// Output keeps the input order; callers pass records in ascending id order.
pub fn filter<'a, I, S>(records: I, tags: &[S]) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
    S: AsRef<str>,
{
    records
        .into_iter()
        .filter(|r| r.tags.contains_all(tags))
        .collect()
}

/// Ids of the records whose data matches `needle` under `mode`.
pub fn find_id<'a, I>(records: I, needle: &str, mode: FindMode) -> Vec<RecordId>
where
    I: IntoIterator<Item = &'a Record>,
{
    records
        .into_iter()
        .filter(|r| mode.matches(needle, &r.data))
        .map(|r| r.id)
        .collect()
}
