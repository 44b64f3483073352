use crate::engine::StudyRecord;
use crate::store::keys;
use crate::store::{Store, StoreError};

impl Store {
    pub fn load_study_record(&self) -> Result<StudyRecord, StoreError> {
        let Some(raw) = self.study_record.get(keys::STUDY_RECORD_KEY.as_bytes())? else {
            return Ok(StudyRecord::default());
        };

        match Self::deserialize::<StudyRecord>(&raw) {
            Ok(record) => Ok(record),
            Err(e) => {
                tracing::warn!(error = %e, "Study record is malformed, starting fresh");
                Ok(StudyRecord::default())
            }
        }
    }

    pub fn save_study_record(&self, record: &StudyRecord) -> Result<(), StoreError> {
        self.study_record
            .insert(keys::STUDY_RECORD_KEY.as_bytes(), Self::serialize(record)?)?;
        Ok(())
    }
}
