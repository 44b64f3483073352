/// 列表接口默认分页大小
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// 列表接口最大分页大小
pub const MAX_PAGE_SIZE: u64 = 100;

/// 单次测验 / 闪卡允许的最大单词数
pub const MAX_SESSION_WORDS: usize = 200;

/// 复习列表默认返回数量
pub const DEFAULT_REVIEW_LIMIT: usize = 20;

/// 单个单词字段最大字符数
pub const MAX_WORD_FIELD_CHARS: usize = 500;

/// 文件夹名最大字符数
pub const MAX_FOLDER_CHARS: usize = 64;

/// CSV 导入请求体上限：4 MiB
pub const MAX_IMPORT_BYTES: usize = 4 * 1024 * 1024;
