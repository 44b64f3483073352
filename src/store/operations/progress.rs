use crate::engine::{ProgressData, ProgressSink, StudyRecord};
use crate::store::keys;
use crate::store::{Store, StoreError};

impl Store {
    /// Loads the progress blob. A blob that cannot be parsed is logged and
    /// replaced by an empty default; only storage failures are errors.
    pub fn load_progress(&self) -> Result<ProgressData, StoreError> {
        let Some(raw) = self.progress.get(keys::PROGRESS_KEY.as_bytes())? else {
            return Ok(ProgressData::default());
        };

        match ProgressData::from_json(&raw) {
            Ok(progress) => Ok(progress),
            Err(e) => {
                tracing::warn!(error = %e, bytes = raw.len(), "Progress blob is malformed, starting fresh");
                Ok(ProgressData::default())
            }
        }
    }

    pub fn save_progress(&self, progress: &ProgressData) -> Result<(), StoreError> {
        self.progress
            .insert(keys::PROGRESS_KEY.as_bytes(), Self::serialize(progress)?)?;
        Ok(())
    }

    /// Stores a blob exactly as given, e.g. one exported by an older client.
    pub fn put_raw_progress(&self, raw: &[u8]) -> Result<(), StoreError> {
        self.progress.insert(keys::PROGRESS_KEY.as_bytes(), raw)?;
        Ok(())
    }
}

impl ProgressSink for Store {
    fn save_progress(&self, progress: &ProgressData) -> Result<(), StoreError> {
        Store::save_progress(self, progress)
    }

    fn save_study_record(&self, record: &StudyRecord) -> Result<(), StoreError> {
        Store::save_study_record(self, record)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use tempfile::tempdir;

    use super::*;
    use crate::engine::MasteryStore;

    #[test]
    fn missing_blob_loads_as_default() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db").to_str().unwrap()).unwrap();
        assert_eq!(store.load_progress().unwrap(), ProgressData::default());
    }

    #[test]
    fn saved_progress_reloads() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db").to_str().unwrap()).unwrap();

        let mut mastery = MasteryStore::new();
        mastery.record_outcome("dog", false, Utc::now());
        let progress = ProgressData {
            total_sessions: 3,
            mastery: mastery.records().clone(),
            weakness_list: mastery.weakness_list().to_vec(),
            history: Vec::new(),
        };
        store.save_progress(&progress).unwrap();

        assert_eq!(store.load_progress().unwrap(), progress);
    }

    #[test]
    fn malformed_blob_resets_to_default() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db").to_str().unwrap()).unwrap();
        store.put_raw_progress(b"{\"wordMastery\": [1, 2").unwrap();
        assert_eq!(store.load_progress().unwrap(), ProgressData::default());
    }
}
