use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tokio::time::{timeout, Duration, Instant};

use super::{SensorProbe, TextExtractor};
use crate::analysis::{AnalysisResponse, WineAnalyzer};
use crate::history::SensorSnapshot;
use crate::settings::TimeoutSettings;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

#[derive(Debug, Clone, Copy)]
pub struct ScanTimeouts {
    pub ocr: Duration,
    pub sensor: Duration,
}

impl Default for ScanTimeouts {
    fn default() -> Self {
        Self::from(&TimeoutSettings::default())
    }
}

impl From<&TimeoutSettings> for ScanTimeouts {
    fn from(settings: &TimeoutSettings) -> Self {
        Self {
            ocr: Duration::from_secs(settings.ocr_secs),
            sensor: Duration::from_secs(settings.sensor_secs),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ScanStatus {
    Success,
    NoTextDetected,
    OcrFailed,
    OcrTimedOut,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanOutcome {
    pub status: ScanStatus,
    pub detected_text: Option<String>,
    pub analysis: AnalysisResponse,
}

/// Image in, analysis out: OCR and the sensor read run concurrently, then the
/// analyzer does the rest.
pub struct LabelScanner {
    analyzer: Arc<WineAnalyzer>,
    extractor: Arc<dyn TextExtractor>,
    probe: Option<Arc<dyn SensorProbe>>,
    timeouts: ScanTimeouts,
}

impl LabelScanner {
    pub fn new(
        analyzer: Arc<WineAnalyzer>,
        extractor: Arc<dyn TextExtractor>,
        probe: Option<Arc<dyn SensorProbe>>,
        timeouts: ScanTimeouts,
    ) -> Self {
        Self {
            analyzer,
            extractor,
            probe,
            timeouts,
        }
    }

    pub async fn scan(&self, image: Vec<u8>) -> ScanOutcome {
        let scan_start = Instant::now();
        let (ocr, snapshot) = tokio::join!(self.detect_text(image), self.read_sensors());

        let (status, detected_text) = match ocr {
            Ok(Some(text)) if !text.trim().is_empty() => (ScanStatus::Success, Some(text)),
            Ok(_) => {
                log_info!("No text detected in image");
                (ScanStatus::NoTextDetected, None)
            }
            Err(OcrError::TimedOut) => {
                log_warn!("OCR timed out (> {:?})", self.timeouts.ocr);
                (ScanStatus::OcrTimedOut, None)
            }
            Err(OcrError::Failed(err)) => {
                log_error!("OCR failed: {err:#}");
                (ScanStatus::OcrFailed, None)
            }
        };

        let analysis = match &detected_text {
            Some(text) => self.analyze(text.clone(), snapshot).await,
            None => AnalysisResponse::default(),
        };

        log_info!(
            "Scan finished in {}ms with status {:?} (matched: {})",
            scan_start.elapsed().as_millis(),
            status,
            analysis.is_match()
        );

        ScanOutcome {
            status,
            detected_text,
            analysis,
        }
    }

    async fn detect_text(&self, image: Vec<u8>) -> std::result::Result<Option<String>, OcrError> {
        let extractor = Arc::clone(&self.extractor);
        let task = tokio::task::spawn_blocking(move || extractor.extract_text(&image));

        match timeout(self.timeouts.ocr, task).await {
            Ok(joined) => joined
                .context("ocr worker join failed")
                .and_then(|result| result)
                .map_err(OcrError::Failed),
            Err(_) => Err(OcrError::TimedOut),
        }
    }

    /// Sensor failures degrade to "no snapshot"; they never block the scan.
    async fn read_sensors(&self) -> Option<SensorSnapshot> {
        let probe = Arc::clone(self.probe.as_ref()?);
        let task = tokio::task::spawn_blocking(move || probe.read_snapshot());

        match timeout(self.timeouts.sensor, task).await {
            Ok(Ok(Ok(snapshot))) => Some(snapshot),
            Ok(Ok(Err(err))) => {
                log_warn!("sensor read failed: {err:#}");
                None
            }
            Ok(Err(join_err)) => {
                log_error!("sensor worker join failed: {join_err}");
                None
            }
            Err(_) => {
                log_warn!("sensor read timed out (> {:?})", self.timeouts.sensor);
                None
            }
        }
    }

    async fn analyze(&self, text: String, snapshot: Option<SensorSnapshot>) -> AnalysisResponse {
        let analyzer = Arc::clone(&self.analyzer);
        let result: Result<AnalysisResponse> = tokio::task::spawn_blocking(move || {
            analyzer.handle_analysis(Some(&text), snapshot)
        })
        .await
        .context("analysis worker join failed");

        result.unwrap_or_else(|err| {
            log_error!("{err:#}");
            AnalysisResponse::default()
        })
    }
}

enum OcrError {
    TimedOut,
    Failed(anyhow::Error),
}
