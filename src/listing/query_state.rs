use std::fmt::{Display, Formatter};
use std::str::FromStr;

use indexmap::IndexSet;

use crate::api::types::BlogQuery;

pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// Keys owned by the listing; anything else in the URL is left alone.
pub const FILTER_KEYS: [&str; 5] = ["search", "category", "tags", "sort", "page"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    Popular,
    Trending,
}

impl SortOrder {
    pub const ALL: [SortOrder; 4] = [SortOrder::Newest, SortOrder::Oldest, SortOrder::Popular, SortOrder::Trending];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Newest => "newest",
            SortOrder::Oldest => "oldest",
            SortOrder::Popular => "popular",
            SortOrder::Trending => "trending",
        }
    }
}

impl Display for SortOrder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortOrder::ALL
            .into_iter()
            .find(|sort| sort.as_str() == s)
            .ok_or_else(|| format!("Unknown sort order: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Param {
    key: String,
    value: String,
    raw: String,
}

/// An ordered query string that remembers how each pair was written, so
/// untouched pairs are reproduced byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryString {
    params: Vec<Param>,
}

fn decode_pair(raw: &str) -> (String, String) {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(raw).unwrap_or_else(|_| vec![]);
    pairs
        .into_iter()
        .next()
        .unwrap_or_else(|| (raw.to_string(), String::new()))
}

fn encode_pair(key: &str, value: &str) -> String {
    // A pair of strings always serializes
    serde_urlencoded::to_string([(key, value)]).unwrap_or_default()
}

impl QueryString {
    pub fn from(buf: &str) -> Self {
        let buf = buf.strip_prefix('?').unwrap_or(buf);
        let params = buf
            .split('&')
            .filter(|raw| !raw.is_empty())
            .map(|raw| {
                let (key, value) = decode_pair(raw);
                Param {
                    key,
                    value,
                    raw: raw.to_string(),
                }
            })
            .collect();

        QueryString { params }
    }

    /// First value of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.iter().find(|p| p.key == key).map(|p| p.value.as_str())
    }

    pub fn get_page(&self) -> u32 {
        match self.get("page").and_then(|v| v.parse::<u32>().ok()) {
            Some(page) if page > 0 => page,
            _ => 1,
        }
    }

    /// Sets or removes `key`. An existing pair keeps its position, and its
    /// raw spelling when the value does not change.
    pub fn set(&mut self, key: &str, value: Option<&str>) {
        let Some(value) = value else {
            self.params.retain(|p| p.key != key);
            return;
        };

        match self.params.iter().position(|p| p.key == key) {
            Some(idx) => {
                let param = &mut self.params[idx];
                if param.value != value {
                    param.value = value.to_string();
                    param.raw = encode_pair(key, value);
                }
                let mut seen = false;
                self.params.retain(|p| {
                    if p.key != key {
                        return true;
                    }
                    let keep = !seen;
                    seen = true;
                    keep
                });
            }
            None => self.params.push(Param {
                key: key.to_string(),
                value: value.to_string(),
                raw: encode_pair(key, value),
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn has_filters(&self) -> bool {
        self.params.iter().any(|p| FILTER_KEYS.contains(&p.key.as_str()))
    }
}

impl Display for QueryString {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (idx, param) in self.params.iter().enumerate() {
            if idx > 0 {
                f.write_str("&")?;
            }
            f.write_str(&param.raw)?;
        }
        Ok(())
    }
}

/// Filter, sort, search and pagination of a listing view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    pub page: u32,
    pub page_size: u32,
    pub search: String,
    pub category: Option<String>,
    pub tags: IndexSet<String>,
    pub sort: SortOrder,
}

impl Default for QueryState {
    fn default() -> Self {
        QueryState {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            search: String::new(),
            category: None,
            tags: IndexSet::new(),
            sort: SortOrder::Newest,
        }
    }
}

/// A picker value of "all" (or nothing) means no category.
pub fn normalize_category(category: Option<&str>) -> Option<String> {
    match category.map(str::trim) {
        None | Some("") => None,
        Some(c) if c.eq_ignore_ascii_case("all") => None,
        Some(c) => Some(c.to_string()),
    }
}

pub fn parse_tags(tags: &str) -> IndexSet<String> {
    tags.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

impl QueryState {
    pub fn with_page_size(page_size: u32) -> Self {
        QueryState {
            page_size: page_size.max(1),
            ..Default::default()
        }
    }

    /// Reads the state from a URL query. Missing or invalid values fall back
    /// to their defaults.
    pub fn decode(query: &QueryString, page_size: u32) -> Self {
        QueryState {
            page: query.get_page(),
            page_size: page_size.max(1),
            search: query.get("search").unwrap_or_default().to_string(),
            category: normalize_category(query.get("category")),
            tags: query.get("tags").map(parse_tags).unwrap_or_default(),
            sort: query.get("sort").and_then(|s| s.parse().ok()).unwrap_or_default(),
        }
    }

    /// Writes the state into `query`, leaving out every default value.
    pub fn encode_into(&self, query: &mut QueryString) {
        let tags = self.tags.iter().map(String::as_str).collect::<Vec<_>>().join(",");
        let page = self.page.to_string();

        query.set("search", Some(self.search.as_str()).filter(|s| !s.is_empty()));
        query.set("category", self.category.as_deref().filter(|c| !c.is_empty()));
        query.set("tags", Some(tags.as_str()).filter(|t| !t.is_empty()));
        query.set("sort", Some(self.sort.as_str()).filter(|_| self.sort != SortOrder::Newest));
        query.set("page", Some(page.as_str()).filter(|_| self.page > 1));
    }

    pub fn encode(&self) -> QueryString {
        let mut query = QueryString::default();
        self.encode_into(&mut query);
        query
    }

    pub fn active_filter_count(&self) -> usize {
        [
            !self.search.trim().is_empty(),
            self.category.is_some(),
            !self.tags.is_empty(),
            self.sort != SortOrder::Newest,
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }

    pub fn has_filters(&self) -> bool {
        self.active_filter_count() > 0
    }

    /// Adds the tag, or removes it when already selected.
    pub fn toggle_tag(&mut self, tag: &str) {
        let tag = tag.trim();
        if tag.is_empty() {
            return;
        }
        if !self.tags.shift_remove(tag) {
            self.tags.insert(tag.to_string());
        }
    }

    pub fn to_blog_query(&self) -> BlogQuery {
        let search = self.search.trim();
        BlogQuery {
            page: self.page,
            limit: self.page_size,
            category: self.category.clone(),
            tags: if self.tags.is_empty() {
                None
            } else {
                Some(self.tags.iter().map(String::as_str).collect::<Vec<_>>().join(","))
            },
            search: if search.is_empty() { None } else { Some(search.to_string()) },
            sort: self.sort.as_str(),
        }
    }
}
