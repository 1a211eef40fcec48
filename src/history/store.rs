use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use super::backend::HistoryBackend;
use super::models::{EnvironmentRecord, SensorSnapshot};
use crate::error::{WineError, WineResult};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_warn};

pub const DEFAULT_CAPACITY: usize = 30;

/// Bounded, append-only environment history per catalog identifier.
///
/// Every read-modify-write runs under one store-wide lock. Writes go through
/// to the backend; a failed write is logged and the in-memory history keeps
/// the new record.
pub struct EnvironmentHistoryStore {
    capacity: usize,
    inner: Mutex<StoreInner>,
}

struct StoreInner {
    backend: Box<dyn HistoryBackend>,
    histories: HashMap<String, VecDeque<EnvironmentRecord>>,
}

impl EnvironmentHistoryStore {
    pub fn new(backend: Box<dyn HistoryBackend>) -> Self {
        Self::with_capacity(backend, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(backend: Box<dyn HistoryBackend>, capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(StoreInner {
                backend,
                histories: HashMap::new(),
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current history for `id`, oldest first. Unreadable storage yields an
    /// empty history.
    pub fn load(&self, id: &str) -> Vec<EnvironmentRecord> {
        let mut inner = self.lock();
        if let Some(history) = inner.histories.get(id) {
            return history.iter().cloned().collect();
        }

        match self.read_through(&mut inner, id) {
            Ok(history) => {
                let records = history.iter().cloned().collect();
                inner.histories.insert(id.to_string(), history);
                records
            }
            Err(err) => {
                log_warn!("Treating history as empty: {err:#}");
                Vec::new()
            }
        }
    }

    /// Record `snapshot` for `id`, stamped with the current time.
    pub fn append(&self, id: &str, snapshot: &SensorSnapshot) {
        self.append_record(id, EnvironmentRecord::from_snapshot(snapshot, Utc::now()));
    }

    /// Append an already stamped record, evicting the oldest entries past
    /// capacity, then persist the whole history.
    pub fn append_record(&self, id: &str, record: EnvironmentRecord) {
        let mut inner = self.lock();

        if !inner.histories.contains_key(id) {
            let history = self.read_through(&mut inner, id).unwrap_or_else(|err| {
                log_warn!("Starting fresh history: {err:#}");
                VecDeque::new()
            });
            inner.histories.insert(id.to_string(), history);
        }

        let StoreInner { backend, histories } = &mut *inner;
        let Some(history) = histories.get_mut(id) else {
            return;
        };

        history.push_back(record);
        while history.len() > self.capacity {
            history.pop_front();
        }

        let records: Vec<EnvironmentRecord> = history.iter().cloned().collect();
        match backend.write(id, &records) {
            Ok(()) => log_debug!("Persisted {} records for {}", records.len(), id),
            Err(err) => {
                let err = WineError::storage(id, err);
                log_error!("{err:#}; keeping in-memory history only");
            }
        }
    }

    fn read_through(
        &self,
        inner: &mut StoreInner,
        id: &str,
    ) -> WineResult<VecDeque<EnvironmentRecord>> {
        let stored = inner
            .backend
            .read(id)
            .map_err(|err| WineError::storage(id, err))?;

        let mut history: VecDeque<EnvironmentRecord> = stored.unwrap_or_default().into();
        while history.len() > self.capacity {
            history.pop_front();
        }
        Ok(history)
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::backend::JsonFileBackend;
    use anyhow::{anyhow, Result};
    use chrono::Duration;
    use std::sync::{Arc, Mutex as StdMutex};
    use tempfile::tempdir;

    /// Backend that remembers writes and can be told to fail.
    #[derive(Clone, Default)]
    struct MemoryBackend {
        data: Arc<StdMutex<HashMap<String, Vec<EnvironmentRecord>>>>,
        fail_reads: bool,
        fail_writes: bool,
    }

    impl HistoryBackend for MemoryBackend {
        fn read(&mut self, id: &str) -> Result<Option<Vec<EnvironmentRecord>>> {
            if self.fail_reads {
                return Err(anyhow!("disk on fire"));
            }
            Ok(self.data.lock().unwrap().get(id).cloned())
        }

        fn write(&mut self, id: &str, records: &[EnvironmentRecord]) -> Result<()> {
            if self.fail_writes {
                return Err(anyhow!("read-only filesystem"));
            }
            self.data
                .lock()
                .unwrap()
                .insert(id.to_string(), records.to_vec());
            Ok(())
        }
    }

    fn temperature(value: f64) -> SensorSnapshot {
        SensorSnapshot::new(Some(value), None, None, None)
    }

    #[test]
    fn empty_store_loads_empty_history() {
        let store = EnvironmentHistoryStore::new(Box::new(MemoryBackend::default()));
        assert!(store.load("opus_one").is_empty());
    }

    #[test]
    fn thirty_five_appends_keep_the_newest_thirty() {
        let backend = MemoryBackend::default();
        let store = EnvironmentHistoryStore::new(Box::new(backend.clone()));

        for i in 1..=35 {
            store.append("opus_one", &temperature(i as f64));
        }

        let history = store.load("opus_one");
        assert_eq!(history.len(), 30);
        let temps: Vec<f64> = history.iter().filter_map(|r| r.temperature).collect();
        let expected: Vec<f64> = (6..=35).map(|i| i as f64).collect();
        assert_eq!(temps, expected);

        let persisted = backend.data.lock().unwrap().get("opus_one").cloned().unwrap();
        assert_eq!(persisted, history);
    }

    #[test]
    fn histories_are_keyed_by_identifier() {
        let store = EnvironmentHistoryStore::new(Box::new(MemoryBackend::default()));
        store.append("opus_one", &temperature(12.0));
        store.append("chateau_margaux", &temperature(14.0));
        store.append("chateau_margaux", &temperature(15.0));

        assert_eq!(store.load("opus_one").len(), 1);
        assert_eq!(store.load("chateau_margaux").len(), 2);
    }

    #[test]
    fn partial_snapshot_is_still_recorded() {
        let store = EnvironmentHistoryStore::new(Box::new(MemoryBackend::default()));
        store.append("opus_one", &SensorSnapshot::new(None, Some(66.0), None, Some(800.0)));

        let history = store.load("opus_one");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].temperature, None);
        assert_eq!(history[0].humidity, Some(66.0));
        assert_eq!(history[0].co2, Some(800.0));
    }

    #[test]
    fn failed_write_keeps_in_memory_history() {
        let backend = MemoryBackend {
            fail_writes: true,
            ..MemoryBackend::default()
        };
        let store = EnvironmentHistoryStore::new(Box::new(backend.clone()));

        store.append("opus_one", &temperature(12.0));
        store.append("opus_one", &temperature(13.0));

        assert_eq!(store.load("opus_one").len(), 2);
        assert!(backend.data.lock().unwrap().is_empty());
    }

    #[test]
    fn unreadable_storage_degrades_to_empty() {
        let backend = MemoryBackend {
            fail_reads: true,
            ..MemoryBackend::default()
        };
        let store = EnvironmentHistoryStore::new(Box::new(backend));
        assert!(store.load("opus_one").is_empty());

        store.append("opus_one", &temperature(12.0));
        assert_eq!(store.load("opus_one").len(), 1);
    }

    #[test]
    fn corrupt_file_loads_empty_and_is_overwritten() {
        let dir = tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path().to_path_buf()).unwrap();
        let path = backend.path_for("opus_one");
        std::fs::write(&path, "[{\"timestamp\": 42").unwrap();

        let store = EnvironmentHistoryStore::new(Box::new(backend));
        assert!(store.load("opus_one").is_empty());

        store.append("opus_one", &temperature(12.0));
        let reloaded: Vec<EnvironmentRecord> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(reloaded.len(), 1);
    }

    #[test]
    fn persisted_history_round_trips_through_a_new_store() {
        let dir = tempdir().unwrap();
        let base = Utc::now();
        let records: Vec<EnvironmentRecord> = (0..5)
            .map(|i| EnvironmentRecord {
                timestamp: base + Duration::milliseconds(i * 1_501),
                temperature: if i % 2 == 0 { Some(11.0 + i as f64 * 0.5) } else { None },
                humidity: Some(62.5),
                lux: None,
                co2: if i == 3 { Some(905.0) } else { None },
            })
            .collect();

        {
            let store = EnvironmentHistoryStore::new(Box::new(
                JsonFileBackend::new(dir.path().to_path_buf()).unwrap(),
            ));
            for record in &records {
                store.append_record("chateau_margaux", record.clone());
            }
        }

        let reopened = EnvironmentHistoryStore::new(Box::new(
            JsonFileBackend::new(dir.path().to_path_buf()).unwrap(),
        ));
        assert_eq!(reopened.load("chateau_margaux"), records);
    }

    #[test]
    fn lookalike_identifiers_keep_separate_histories_on_disk() {
        let dir = tempdir().unwrap();
        {
            let store = EnvironmentHistoryStore::new(Box::new(
                JsonFileBackend::new(dir.path().to_path_buf()).unwrap(),
            ));
            store.append("opus.one", &temperature(11.0));
            store.append("opus_one", &temperature(12.0));
            store.append("opus_one", &temperature(13.0));
        }

        let reopened = EnvironmentHistoryStore::new(Box::new(
            JsonFileBackend::new(dir.path().to_path_buf()).unwrap(),
        ));
        let dotted: Vec<f64> = reopened
            .load("opus.one")
            .iter()
            .filter_map(|r| r.temperature)
            .collect();
        let underscored: Vec<f64> = reopened
            .load("opus_one")
            .iter()
            .filter_map(|r| r.temperature)
            .collect();
        assert_eq!(dotted, vec![11.0]);
        assert_eq!(underscored, vec![12.0, 13.0]);
    }

    #[test]
    fn full_precision_history_reloads_bit_for_bit() {
        let dir = tempdir().unwrap();
        let base = Utc::now();
        let records: Vec<EnvironmentRecord> = [1.3992047284012665, 28.926758544961622, 12.345678901234567]
            .iter()
            .enumerate()
            .map(|(i, &value)| EnvironmentRecord {
                timestamp: base + Duration::seconds(i as i64),
                temperature: Some(value),
                humidity: Some(100.0 - value),
                lux: None,
                co2: Some(value * 41.0),
            })
            .collect();

        {
            let store = EnvironmentHistoryStore::new(Box::new(
                JsonFileBackend::new(dir.path().to_path_buf()).unwrap(),
            ));
            for record in &records {
                store.append_record("opus_one", record.clone());
            }
        }

        let reopened = EnvironmentHistoryStore::new(Box::new(
            JsonFileBackend::new(dir.path().to_path_buf()).unwrap(),
        ));
        assert_eq!(reopened.load("opus_one"), records);
    }

    #[test]
    fn oversized_stored_history_is_trimmed_on_load() {
        let backend = MemoryBackend::default();
        let records: Vec<EnvironmentRecord> = (0..5)
            .map(|i| EnvironmentRecord::from_snapshot(&temperature(i as f64), Utc::now()))
            .collect();
        backend
            .data
            .lock()
            .unwrap()
            .insert("opus_one".into(), records);

        let store = EnvironmentHistoryStore::with_capacity(Box::new(backend), 3);
        let temps: Vec<f64> = store
            .load("opus_one")
            .iter()
            .filter_map(|r| r.temperature)
            .collect();
        assert_eq!(temps, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn concurrent_appends_are_serialized() {
        let backend = MemoryBackend::default();
        let store = Arc::new(EnvironmentHistoryStore::new(Box::new(backend.clone())));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..10 {
                        store.append("opus_one", &temperature((t * 10 + i) as f64));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.load("opus_one").len(), 30);
        assert_eq!(backend.data.lock().unwrap()["opus_one"].len(), 30);
    }
}
