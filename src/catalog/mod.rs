//! Immutable wine registry, loaded once at startup.

mod entry;
mod stories;

pub use entry::CatalogEntry;
pub use stories::StoryLibrary;

use std::{collections::HashSet, fs, path::Path};

use anyhow::{bail, Context, Result};

/// Ordered set of catalog entries. Order matters: the matcher breaks score
/// ties in favour of the earlier entry.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Result<Self> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if entry.identifier.trim().is_empty() {
                bail!("catalog entry '{}' has an empty identifier", entry.name);
            }
            if !seen.insert(entry.identifier.as_str()) {
                bail!("duplicate catalog identifier '{}'", entry.identifier);
            }
        }
        Ok(Self { entries })
    }

    /// The reference registry shipped with the crate.
    pub fn builtin() -> Self {
        Self {
            entries: vec![
                CatalogEntry::new(
                    "chateau_margaux",
                    "Château Margaux",
                    "Château Margaux",
                    "Bordeaux, France",
                    "2015",
                )
                .with_varietal("Cabernet Sauvignon Blend")
                .with_description(
                    "First Growth Bordeaux with exceptional complexity and elegance.",
                ),
                CatalogEntry::new(
                    "opus_one",
                    "Opus One",
                    "Opus One Winery",
                    "Napa Valley, USA",
                    "2018",
                )
                .with_varietal("Cabernet Sauvignon Blend")
                .with_description(
                    "Premium Napa Valley wine, collaboration between Robert Mondavi and Baron Philippe de Rothschild.",
                ),
            ],
        }
    }

    /// Load a JSON array of entries.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog from {}", path.display()))?;
        let entries: Vec<CatalogEntry> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse catalog {}", path.display()))?;
        Self::new(entries)
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn get(&self, identifier: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.identifier == identifier)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn builtin_has_reference_wines_in_order() {
        let catalog = Catalog::builtin();
        let ids: Vec<_> = catalog.entries().iter().map(|e| e.identifier.as_str()).collect();
        assert_eq!(ids, vec!["chateau_margaux", "opus_one"]);
        assert_eq!(catalog.get("opus_one").map(|e| e.vintage.as_str()), Some("2018"));
    }

    #[test]
    fn rejects_duplicate_identifiers() {
        let a = CatalogEntry::new("dup", "A", "P", "R", "2000");
        let b = CatalogEntry::new("dup", "B", "P", "R", "2001");
        assert!(Catalog::new(vec![a, b]).is_err());
    }

    #[test]
    fn loads_registry_file_with_missing_optional_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"[{"identifier":"grange","name":"Grange","producer":"Penfolds","region":"South Australia"}]"#,
        )
        .unwrap();

        let catalog = Catalog::from_json_file(&path).unwrap();
        let entry = catalog.get("grange").unwrap();
        assert_eq!(entry.vintage, "");
        assert_eq!(entry.producer, "Penfolds");
    }
}
