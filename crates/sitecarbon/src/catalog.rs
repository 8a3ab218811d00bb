//! The static, ordered catalog of sites used for bulk ranking.

use crate::analyzer::validate_url;
use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// A known site. Identity is the URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub url: String,
    /// Group tag, e.g. `"SKIN"`.
    pub category: String,
}

impl CatalogEntry {
    pub fn new(name: &str, url: &str, category: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            category: category.to_string(),
        }
    }
}

/// Validated catalog: declaration order is preserved and URLs are unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Result<Self> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if entry.name.trim().is_empty() {
                return Err(EngineError::InvalidInput(format!(
                    "catalog entry {} has an empty name",
                    entry.url
                )));
            }
            if entry.category.trim().is_empty() {
                return Err(EngineError::InvalidInput(format!(
                    "catalog entry {} has an empty category",
                    entry.url
                )));
            }
            validate_url(&entry.url)?;
            if !seen.insert(entry.url.as_str()) {
                return Err(EngineError::DuplicateEntry(format!("catalog url {}", entry.url)));
            }
        }
        Ok(Self { entries })
    }

    /// The built-in beauty-brand catalog.
    pub fn builtin() -> Self {
        let entries = vec![
            CatalogEntry::new("ELF Cosmetics", "https://www.elfcosmetics.com/", "SKIN"),
            CatalogEntry::new("Biotherm", "https://www.biotherm.ca/", "SKIN"),
            CatalogEntry::new("IT Cosmetics", "https://itcosmetics.ca", "SKIN"),
            CatalogEntry::new("Kérastase", "https://www.kerastase.ca/", "HAIR"),
            CatalogEntry::new("Pantene", "https://pantene.ca/en-ca", "HAIR"),
            CatalogEntry::new("Garnier", "https://www.garnier.ca/", "HAIR"),
            CatalogEntry::new("Herbal Essences", "https://herbalessences.com/en-us/", "HAIR"),
        ];
        Self { entries }
    }

    /// Parse a JSON array of `{name, url, category}` objects.
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: Vec<CatalogEntry> = serde_json::from_str(json)
            .map_err(|e| EngineError::InvalidInput(format!("malformed catalog: {e}")))?;
        Self::new(entries)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            EngineError::InvalidInput(format!("cannot read catalog {}: {e}", path.display()))
        })?;
        Self::from_json(&json)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Category tags in first-declaration order.
    pub fn categories(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !tags.contains(&entry.category.as_str()) {
                tags.push(&entry.category);
            }
        }
        tags
    }

    pub fn in_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a CatalogEntry> {
        self.entries.iter().filter(move |e| e.category == category)
    }

    pub fn get(&self, url: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.url == url)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl AsRef<[CatalogEntry]> for Catalog {
    fn as_ref(&self) -> &[CatalogEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_is_valid() {
        let builtin = Catalog::builtin();
        let revalidated = Catalog::new(builtin.entries().to_vec()).unwrap();
        assert_eq!(revalidated.len(), 7);
        assert_eq!(builtin.categories(), vec!["SKIN", "HAIR"]);
        assert_eq!(builtin.in_category("SKIN").count(), 3);
        assert_eq!(builtin.in_category("HAIR").count(), 4);
    }

    #[test]
    fn test_rejects_duplicate_urls() {
        let entries = vec![
            CatalogEntry::new("One", "https://a.example/", "X"),
            CatalogEntry::new("Two", "https://a.example/", "Y"),
        ];
        assert!(matches!(
            Catalog::new(entries),
            Err(EngineError::DuplicateEntry(_))
        ));
    }

    #[test]
    fn test_rejects_bad_urls_and_names() {
        let bad_url = vec![CatalogEntry::new("One", "ftp://a.example/", "X")];
        assert!(matches!(Catalog::new(bad_url), Err(EngineError::InvalidInput(_))));
        let blank = vec![CatalogEntry::new("  ", "https://a.example/", "X")];
        assert!(Catalog::new(blank).is_err());
    }

    #[test]
    fn test_empty_catalog_is_valid() {
        let catalog = Catalog::new(Vec::new()).unwrap();
        assert!(catalog.is_empty());
        assert!(catalog.categories().is_empty());
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"name": "Alpha", "url": "https://alpha.example/", "category": "TOOLS"}},
                {{"name": "Beta", "url": "http://beta.example/", "category": "TOOLS"}}
            ]"#
        )
        .unwrap();

        let catalog = Catalog::from_path(file.path()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.entries()[1].name, "Beta");
        assert!(catalog.get("https://alpha.example/").is_some());
    }

    #[test]
    fn test_from_json_malformed() {
        assert!(matches!(
            Catalog::from_json("{not json"),
            Err(EngineError::InvalidInput(_))
        ));
    }
}
