//! Account query modes, option projection and query-string encoding.

use std::fmt;
use std::str::FromStr;

use url::form_urlencoded;

use crate::error::{Error, Result};

pub const MAX_LIMIT: u32 = 1000;
pub const MAX_SORT_TERMS: usize = 3;
pub const MAX_KEYWORDS_LEN: usize = 500;
pub const MAX_SAFE_NAME_LEN: usize = 28;

/// The three mutually exclusive ways of asking for accounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountQuery {
    /// Single account by vault-assigned ID (modern API).
    ById(String),
    /// Filtered, sorted, paginated query against the modern API.
    Modern(ModernQuery),
    /// Keyword search against the legacy API; returns at most one account.
    Legacy(LegacyQuery),
}

/// Options of the modern accounts query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModernQuery {
    pub search: Option<String>,
    pub search_type: Option<SearchType>,
    pub sort: Option<SortSpec>,
    pub offset: Option<u64>,
    pub limit: Option<u32>,
    pub filter: Option<String>,
}

/// Options of the legacy keyword search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LegacyQuery {
    pub keywords: Option<String>,
    pub safe: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchType {
    StartsWith,
    Contains,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::StartsWith => "startswith",
            SearchType::Contains => "contains",
        }
    }
}

impl FromStr for SearchType {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "startswith" => Ok(SearchType::StartsWith),
            "contains" => Ok(SearchType::Contains),
            other => Err(Error::invalid(
                "searchType",
                format!("{other} is not one of startswith, contains"),
            )),
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated sort expression: up to three `field [asc|desc]` terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec(String);

impl SortSpec {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for SortSpec {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        let terms: Vec<&str> = raw.split(',').map(str::trim).collect();
        if terms.len() > MAX_SORT_TERMS {
            return Err(Error::invalid(
                "sort",
                format!("at most {MAX_SORT_TERMS} terms are allowed, got {}", terms.len()),
            ));
        }
        for term in &terms {
            let mut words = term.split_whitespace();
            if words.next().is_none() {
                return Err(Error::invalid("sort", "empty sort term"));
            }
            if let Some(direction) = words.next() {
                if !direction.eq_ignore_ascii_case("asc") && !direction.eq_ignore_ascii_case("desc")
                {
                    return Err(Error::invalid(
                        "sort",
                        format!("direction {direction} must be asc or desc"),
                    ));
                }
            }
            if words.next().is_some() {
                return Err(Error::invalid(
                    "sort",
                    format!("'{term}' is not of the form 'field [asc|desc]'"),
                ));
            }
        }
        Ok(Self(terms.join(",")))
    }
}

impl AccountQuery {
    /// Checks caller input against the documented option constraints.
    pub fn validate(&self) -> Result<()> {
        match self {
            AccountQuery::ById(id) => {
                if id.trim().is_empty() {
                    return Err(Error::invalid("id", "must not be empty"));
                }
            }
            AccountQuery::Modern(query) => {
                if let Some(limit) = query.limit {
                    if !(1..=MAX_LIMIT).contains(&limit) {
                        return Err(Error::invalid(
                            "limit",
                            format!("{limit} is outside 1..={MAX_LIMIT}"),
                        ));
                    }
                }
            }
            AccountQuery::Legacy(query) => {
                check_len("keywords", query.keywords.as_deref(), MAX_KEYWORDS_LEN)?;
                check_len("safe", query.safe.as_deref(), MAX_SAFE_NAME_LEN)?;
            }
        }
        Ok(())
    }

    /// Projects the options of the active mode into ordered query pairs.
    ///
    /// Unset and empty values are dropped. A lookup by ID has no query options.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        match self {
            AccountQuery::ById(_) => {}
            AccountQuery::Modern(query) => {
                push_str(&mut pairs, "search", query.search.as_deref());
                push_str(
                    &mut pairs,
                    "searchType",
                    query.search_type.as_ref().map(SearchType::as_str),
                );
                push_str(&mut pairs, "sort", query.sort.as_ref().map(SortSpec::as_str));
                if let Some(offset) = query.offset {
                    pairs.push(("offset", offset.to_string()));
                }
                if let Some(limit) = query.limit {
                    pairs.push(("limit", limit.to_string()));
                }
                push_str(&mut pairs, "filter", query.filter.as_deref());
            }
            AccountQuery::Legacy(query) => {
                push_str(&mut pairs, "Keywords", query.keywords.as_deref());
                push_str(&mut pairs, "Safe", query.safe.as_deref());
            }
        }
        pairs
    }
}

fn push_str(pairs: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<&str>) {
    if let Some(value) = value.filter(|value| !value.is_empty()) {
        pairs.push((key, value.to_string()));
    }
}

fn check_len(field: &'static str, value: Option<&str>, max: usize) -> Result<()> {
    match value {
        Some(value) if value.chars().count() > max => Err(Error::invalid(
            field,
            format!("must be at most {max} characters"),
        )),
        _ => Ok(()),
    }
}

/// Encodes query pairs as `application/x-www-form-urlencoded`.
///
/// Returns an empty string for no pairs; callers must not append `?` then.
pub fn encode_query<K, V>(pairs: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        serializer.append_pair(key.as_ref(), value.as_ref());
    }
    serializer.finish()
}
