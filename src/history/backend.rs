use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::models::EnvironmentRecord;

/// Durable storage for per-wine histories. One partition per identifier.
///
/// Callers serialize access (the store holds a single lock around every
/// read-modify-write), so implementations need no locking of their own.
pub trait HistoryBackend: Send {
    /// `Ok(None)` when nothing has been stored for `id` yet.
    fn read(&mut self, id: &str) -> Result<Option<Vec<EnvironmentRecord>>>;

    /// Replace the stored partition for `id` with `records`.
    fn write(&mut self, id: &str, records: &[EnvironmentRecord]) -> Result<()>;
}

/// One pretty-printed JSON array per identifier under `dir`.
pub struct JsonFileBackend {
    dir: PathBuf,
}

impl JsonFileBackend {
    pub fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create history directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(id)))
    }
}

impl HistoryBackend for JsonFileBackend {
    fn read(&mut self, id: &str) -> Result<Option<Vec<EnvironmentRecord>>> {
        let path = self.path_for(id);
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("failed to read history {}", path.display()))?;
        let records: Vec<EnvironmentRecord> = serde_json::from_str(&contents)
            .with_context(|| format!("corrupt history file {}", path.display()))?;
        Ok(Some(records))
    }

    fn write(&mut self, id: &str, records: &[EnvironmentRecord]) -> Result<()> {
        let path = self.path_for(id);
        let tmp_path = path.with_extension("json.tmp");
        let serialized =
            serde_json::to_string_pretty(records).context("failed to serialize history")?;

        fs::write(&tmp_path, serialized)
            .with_context(|| format!("failed to write history to {}", tmp_path.display()))?;
        if let Err(err) = fs::rename(&tmp_path, &path) {
            if let Err(cleanup_err) = fs::remove_file(&tmp_path) {
                log::warn!("Failed to remove {}: {cleanup_err}", tmp_path.display());
            }
            return Err(err).with_context(|| {
                format!("failed to move history into place at {}", path.display())
            });
        }
        Ok(())
    }
}

/// Identifiers become file names. `[a-z0-9_-]` is kept as is and every other
/// byte is written as `%XX`, so two identifiers never share a file, even on
/// case-insensitive filesystems. The empty identifier maps to `%`.
fn file_stem(id: &str) -> String {
    if id.is_empty() {
        return "%".to_string();
    }

    let mut stem = String::with_capacity(id.len());
    for byte in id.bytes() {
        match byte {
            b'a'..=b'z' | b'0'..=b'9' | b'_' | b'-' => stem.push(char::from(byte)),
            _ => {
                let _ = write!(stem, "%{byte:02X}");
            }
        }
    }
    stem
}
