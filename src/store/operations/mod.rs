pub mod progress;
pub mod study_record;
pub mod words;
