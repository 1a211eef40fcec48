pub mod analysis;
pub mod catalog;
pub mod consistency;
pub mod error;
pub mod history;
pub mod matching;
pub mod sensing;
pub mod settings;
pub mod utils;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

pub use analysis::{AnalysisResponse, WineAnalyzer};
pub use catalog::{Catalog, CatalogEntry, StoryLibrary};
pub use consistency::{ConsistencyEvaluator, ConsistencyMap, ConsistencyReport, IdealRange, Parameter};
pub use error::{WineError, WineResult};
pub use history::{EnvironmentHistoryStore, EnvironmentRecord, SensorSnapshot};
pub use matching::{find_best_match, normalize, WineMatcher};
pub use sensing::{LabelScanner, ScanOutcome, ScanStatus, ScanTimeouts, SensorProbe, TextExtractor};
pub use settings::{HistoryBackendKind, Settings, SettingsStore};
pub use utils::init_logging;

use history::{HistoryBackend, JsonFileBackend, SqliteBackend};

const SETTINGS_FILE: &str = "settings.json";
const SQLITE_FILE: &str = "history.sqlite3";

/// Process-wide state: settings plus the analyzer built from them.
pub struct WineLens {
    data_dir: PathBuf,
    settings: SettingsStore,
    analyzer: Arc<WineAnalyzer>,
}

impl WineLens {
    /// Load `<data_dir>/settings.json` (defaults when absent), the catalog,
    /// and open the configured history backend.
    pub fn bootstrap(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

        let settings = SettingsStore::new(data_dir.join(SETTINGS_FILE))?;
        let analyzer = Arc::new(build_analyzer(&data_dir, &settings.settings())?);

        log::info!(
            "WineLens ready: {} catalog entries, data in {}",
            analyzer.catalog().len(),
            data_dir.display()
        );

        Ok(Self {
            data_dir,
            settings,
            analyzer,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn analyzer(&self) -> Arc<WineAnalyzer> {
        Arc::clone(&self.analyzer)
    }

    pub fn handle_analysis(
        &self,
        raw_detected_text: Option<&str>,
        snapshot: Option<SensorSnapshot>,
    ) -> AnalysisResponse {
        self.analyzer.handle_analysis(raw_detected_text, snapshot)
    }

    /// Scanner wired to this instance's analyzer and configured timeouts.
    pub fn scanner(
        &self,
        extractor: Arc<dyn TextExtractor>,
        probe: Option<Arc<dyn SensorProbe>>,
    ) -> LabelScanner {
        let timeouts = ScanTimeouts::from(&self.settings.settings().timeouts);
        LabelScanner::new(self.analyzer(), extractor, probe, timeouts)
    }
}

fn build_analyzer(data_dir: &Path, settings: &Settings) -> Result<WineAnalyzer> {
    let catalog = match &settings.catalog_path {
        Some(path) => Catalog::from_json_file(&settings.resolve(data_dir, path))?,
        None => Catalog::builtin(),
    };

    let stories = StoryLibrary::new(
        settings
            .stories_dir
            .as_ref()
            .map(|dir| settings.resolve(data_dir, dir)),
    );

    let history_dir = settings.resolve(data_dir, &settings.history.dir);
    let backend: Box<dyn HistoryBackend> = match settings.history.backend {
        HistoryBackendKind::Json => Box::new(JsonFileBackend::new(history_dir)?),
        HistoryBackendKind::Sqlite => Box::new(SqliteBackend::open(&history_dir.join(SQLITE_FILE))?),
    };

    Ok(WineAnalyzer::new(
        Arc::new(catalog),
        WineMatcher::new(settings.matching.clone()),
        stories,
        EnvironmentHistoryStore::with_capacity(backend, settings.history.capacity),
        ConsistencyEvaluator::new(settings.ideal_ranges.clone()),
    ))
}
