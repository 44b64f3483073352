pub const PROGRESS: &str = "progress";
pub const STUDY_RECORD: &str = "study_record";
pub const WORDS: &str = "words";
pub const META: &str = "meta";
