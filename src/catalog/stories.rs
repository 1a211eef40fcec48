use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

use super::CatalogEntry;

const STORY_FILES: [&str; 2] = ["story.txt", "story.md"];

/// Narrative content for matched wines.
///
/// Stories live at `<root>/<identifier>/story.txt` (or `story.md`). Entries
/// without a story file fall back to their catalog description.
pub struct StoryLibrary {
    root: Option<PathBuf>,
    /// Identifier -> file contents, or None once we know there's no file.
    cache: RwLock<HashMap<String, Option<String>>>,
}

impl StoryLibrary {
    pub fn new(root: Option<PathBuf>) -> Self {
        Self {
            root,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Library that only serves catalog descriptions.
    pub fn descriptions_only() -> Self {
        Self::new(None)
    }

    pub fn story_for(&self, entry: &CatalogEntry) -> Option<String> {
        if let Some(story) = self.cached_or_load(&entry.identifier) {
            return Some(story);
        }

        let description = entry.description.trim();
        if description.is_empty() {
            None
        } else {
            Some(description.to_string())
        }
    }

    fn cached_or_load(&self, identifier: &str) -> Option<String> {
        let root = self.root.as_ref()?;

        {
            let cache = match self.cache.read() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if let Some(hit) = cache.get(identifier) {
                return hit.clone();
            }
        }

        let folder = root.join(identifier);
        let loaded = STORY_FILES.iter().find_map(|file| {
            let path = folder.join(file);
            match fs::read_to_string(&path) {
                Ok(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
                Ok(_) => None,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
                Err(err) => {
                    log::warn!("Failed to read story {}: {err}", path.display());
                    None
                }
            }
        });

        let mut cache = match self.cache.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        cache.insert(identifier.to_string(), loaded.clone());
        loaded
    }
}
