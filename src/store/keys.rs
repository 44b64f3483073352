/// 唯一学习者的进度数据
pub const PROGRESS_KEY: &str = "progress";
pub const STUDY_RECORD_KEY: &str = "study_record";
pub const VERSION_KEY: &str = "_meta:version";

pub fn word_key(term: &str) -> String {
    term.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_key_trims_but_keeps_case() {
        assert_eq!(word_key("  Issue "), "Issue");
        assert_ne!(word_key("issue"), word_key("Issue"));
    }
}
