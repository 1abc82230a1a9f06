use std::fmt;
use std::fs;
use std::io;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use spdlog::{debug, warn};

use crate::api::types::{CreateBlogRequest, DraftState};
use crate::text_utils::{excerpt, read_time_minutes, slugify, word_count};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Technology,
    Development,
    Design,
    #[serde(rename = "AI & Machine Learning")]
    AiMachineLearning,
    DevOps,
    Mobile,
    Web,
    General,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Technology,
        Category::Development,
        Category::Design,
        Category::AiMachineLearning,
        Category::DevOps,
        Category::Mobile,
        Category::Web,
        Category::General,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Technology => "Technology",
            Category::Development => "Development",
            Category::Design => "Design",
            Category::AiMachineLearning => "AI & Machine Learning",
            Category::DevOps => "DevOps",
            Category::Mobile => "Mobile",
            Category::Web => "Web",
            Category::General => "General",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.display_name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Unknown category: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftStatus {
    #[default]
    Draft,
    PendingReview,
}

impl From<DraftStatus> for DraftState {
    fn from(value: DraftStatus) -> Self {
        match value {
            DraftStatus::Draft => DraftState::Draft,
            DraftStatus::PendingReview => DraftState::Pending,
        }
    }
}

/// Tags of a post: unique, kept in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(IndexSet<String>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tag, trimmed and lowercased. Returns false for blanks and duplicates.
    pub fn insert(&mut self, tag: &str) -> bool {
        let tag = tag.trim().to_lowercase();
        if tag.is_empty() {
            return false;
        }
        self.0.insert(tag)
    }

    pub fn remove(&mut self, tag: &str) -> bool {
        self.0.shift_remove(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

impl<'a> FromIterator<&'a str> for TagSet {
    fn from_iter<T: IntoIterator<Item = &'a str>>(iter: T) -> Self {
        let mut tags = TagSet::new();
        for tag in iter {
            tags.insert(tag);
        }
        tags
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentStats {
    pub characters: usize,
    pub words: usize,
    pub read_time_minutes: usize,
}

/// The post being written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentDocument {
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub tags: TagSet,
    pub category: Option<Category>,
    #[serde(default)]
    pub status: DraftStatus,
}

impl ContentDocument {
    pub fn new(title: &str, body: &str) -> Self {
        Self {
            title: title.to_string(),
            body: body.to_string(),
            ..Default::default()
        }
    }

    pub fn stats(&self) -> DocumentStats {
        DocumentStats {
            characters: self.body.chars().count(),
            words: word_count(&self.body),
            read_time_minutes: read_time_minutes(&self.body),
        }
    }

    pub fn excerpt(&self) -> String {
        excerpt(&self.body)
    }

    pub fn slug(&self) -> String {
        slugify(&self.title)
    }

    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty() && self.body.trim().is_empty() && self.tags.is_empty()
    }

    pub fn to_request(&self, status: DraftStatus) -> CreateBlogRequest {
        CreateBlogRequest {
            title: self.title.trim().to_string(),
            content: self.body.trim().to_string(),
            category: self.category.unwrap_or(Category::General).display_name().to_string(),
            tags: self.tags.to_vec(),
            excerpt: self.excerpt(),
            cover_image: None,
            status: status.into(),
        }
    }
}

/// Local cache of the document in progress, one JSON file per data dir.
pub struct DraftStore {
    path: PathBuf,
}

impl DraftStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join("drafts").join("current.json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self, doc: &ContentDocument) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(doc)
            .map_err(|e| io::Error::new(ErrorKind::InvalidData, format!("Error serializing draft: {}", e)))?;
        fs::write(&self.path, json)?;
        debug!("Draft saved to {}", self.path.display());
        Ok(())
    }

    /// Returns the cached document. A missing or unreadable cache is `None`.
    pub fn load(&self) -> io::Result<Option<ContentDocument>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };

        match serde_json::from_str(&content) {
            Ok(doc) => Ok(Some(doc)),
            Err(e) => {
                warn!("Ignoring corrupt draft {}: {}", self.path.display(), e);
                Ok(None)
            }
        }
    }

    pub fn clear(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_set_keeps_insertion_order() {
        let mut tags = TagSet::new();
        assert!(tags.insert(" Rust "));
        assert!(tags.insert("web"));
        assert!(!tags.insert("rust"));
        assert!(!tags.insert("   "));
        assert!(tags.insert("async"));
        assert_eq!(tags.to_vec(), vec!["rust", "web", "async"]);

        assert!(tags.remove("web"));
        assert_eq!(tags.iter().collect::<Vec<_>>(), vec!["rust", "async"]);
    }

    #[test]
    fn test_category_names() {
        assert_eq!("ai & machine learning".parse::<Category>(), Ok(Category::AiMachineLearning));
        assert_eq!("DevOps".parse::<Category>(), Ok(Category::DevOps));
        assert!("Cooking".parse::<Category>().is_err());
        assert_eq!(serde_json::to_string(&Category::AiMachineLearning).unwrap(), "\"AI & Machine Learning\"");
    }

    #[test]
    fn test_to_request() {
        let mut doc = ContentDocument::new("  My post ", "Body text");
        doc.tags = ["rust", "web"].into_iter().collect();
        let req = doc.to_request(DraftStatus::Draft);
        assert_eq!(req.title, "My post");
        assert_eq!(req.category, "General");
        assert_eq!(req.tags, vec!["rust", "web"]);
        assert_eq!(req.excerpt, "Body text");
        assert_eq!(req.status, DraftState::Draft);

        doc.category = Some(Category::Web);
        assert_eq!(doc.to_request(DraftStatus::PendingReview).category, "Web");
    }

    #[test]
    fn test_stats() {
        let doc = ContentDocument::new("t", "héllo wide world");
        let stats = doc.stats();
        assert_eq!(stats.characters, 16);
        assert_eq!(stats.words, 3);
        assert_eq!(stats.read_time_minutes, 1);
        assert_eq!(ContentDocument::new("Héllo Wörld", "").slug(), "hello-world");
    }

    #[test]
    fn test_draft_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = DraftStore::new(dir.path());
        assert_eq!(store.load().unwrap(), None);

        let mut doc = ContentDocument::new("Title", "# Heading");
        doc.tags.insert("rust");
        doc.category = Some(Category::Design);
        store.save(&doc).unwrap();
        assert!(store.path().ends_with("drafts/current.json"));
        assert_eq!(store.load().unwrap(), Some(doc));

        store.clear().unwrap();
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_corrupt_draft_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = DraftStore::new(dir.path());
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{not json").unwrap();
        assert_eq!(store.load().unwrap(), None);
    }
}
