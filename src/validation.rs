//! 单词与文件夹输入验证，供单词管理和导入路由共用。
use crate::constants::{MAX_FOLDER_CHARS, MAX_SESSION_WORDS, MAX_WORD_FIELD_CHARS};
use crate::engine::WordItem;

/// 验证单词条目：term 与 translation 必填，各字段按字符数限制长度
pub fn validate_word_item(item: &WordItem) -> Result<(), String> {
    if item.term.trim().is_empty() {
        return Err("term must not be empty".to_string());
    }
    if item.translation.trim().is_empty() {
        return Err("translation must not be empty".to_string());
    }

    let fields = [
        ("term", &item.term),
        ("partOfSpeech", &item.part_of_speech),
        ("translation", &item.translation),
        ("example", &item.example),
        ("idioms", &item.idioms),
    ];
    for (name, value) in fields {
        if value.chars().count() > MAX_WORD_FIELD_CHARS {
            return Err(format!("{name} exceeds {MAX_WORD_FIELD_CHARS} characters"));
        }
    }
    Ok(())
}

/// 去掉首尾空白后的字段副本
pub fn trimmed(item: &WordItem) -> WordItem {
    WordItem {
        term: item.term.trim().to_string(),
        part_of_speech: item.part_of_speech.trim().to_string(),
        translation: item.translation.trim().to_string(),
        example: item.example.trim().to_string(),
        idioms: item.idioms.trim().to_string(),
    }
}

/// 文件夹名：非空、不含 '/'、最多 64 字符
pub fn validate_folder(folder: &str) -> Result<(), String> {
    let folder = folder.trim();
    if folder.is_empty() {
        return Err("folder must not be empty".to_string());
    }
    if folder.contains('/') {
        return Err("folder must not contain '/'".to_string());
    }
    if folder.chars().count() > MAX_FOLDER_CHARS {
        return Err(format!("folder exceeds {MAX_FOLDER_CHARS} characters"));
    }
    Ok(())
}

pub fn validate_session_size(count: usize) -> Result<(), String> {
    if count == 0 || count > MAX_SESSION_WORDS {
        return Err(format!("count must be between 1 and {MAX_SESSION_WORDS}"));
    }
    Ok(())
}
