use serde::{Deserialize, Serialize};

/// Reference metadata for one known wine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    /// Stable key; doubles as the history partition and story folder name.
    pub identifier: String,
    pub name: String,
    pub producer: String,
    pub region: String,
    #[serde(default)]
    pub vintage: String,
    #[serde(default)]
    pub varietal: String,
    #[serde(default)]
    pub description: String,
}

impl CatalogEntry {
    pub fn new(
        identifier: impl Into<String>,
        name: impl Into<String>,
        producer: impl Into<String>,
        region: impl Into<String>,
        vintage: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
            producer: producer.into(),
            region: region.into(),
            vintage: vintage.into(),
            varietal: String::new(),
            description: String::new(),
        }
    }

    pub fn with_varietal(mut self, varietal: impl Into<String>) -> Self {
        self.varietal = varietal.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}
