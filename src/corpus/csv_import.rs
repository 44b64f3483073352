use std::io::Read;

use thiserror::Error;

use crate::engine::WordItem;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv must have a '{0}' column")]
    MissingColumn(&'static str),
}

#[derive(Debug, Default)]
struct ColumnMap {
    term: Option<usize>,
    part_of_speech: Option<usize>,
    translation: Option<usize>,
    example: Option<usize>,
    idioms: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, ImportError> {
        let mut map = Self::default();

        for (i, header) in headers.iter().enumerate() {
            match header.trim_start_matches('\u{feff}').to_lowercase().as_str() {
                "term" | "word" => map.term = Some(i),
                "partofspeech" | "part_of_speech" | "pos" => map.part_of_speech = Some(i),
                "translation" | "meaning" | "日本語訳" => map.translation = Some(i),
                "example" | "テキストで使われている文章 (例)" => map.example = Some(i),
                "idioms" | "単語を使った代表的な熟語など" => map.idioms = Some(i),
                _ => {}
            }
        }

        if map.term.is_none() {
            return Err(ImportError::MissingColumn("term"));
        }
        if map.translation.is_none() {
            return Err(ImportError::MissingColumn("translation"));
        }
        Ok(map)
    }
}

#[derive(Debug, Default)]
pub struct ParsedWords {
    pub words: Vec<WordItem>,
    /// Rows without a term or a translation.
    pub skipped: usize,
}

/// Parses a word list with a header row. Unknown columns are ignored and
/// rows may have fewer fields than the header.
pub fn parse_words<R: Read>(reader: R) -> Result<ParsedWords, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let map = ColumnMap::from_headers(&headers)?;
    let mut parsed = ParsedWords::default();

    for record in reader.records() {
        let record = record?;
        let field = |idx: Option<usize>| -> String {
            idx.and_then(|i| record.get(i))
                .map(str::trim)
                .unwrap_or_default()
                .to_string()
        };

        let term = field(map.term);
        let translation = field(map.translation);
        if term.is_empty() || translation.is_empty() {
            parsed.skipped += 1;
            continue;
        }

        parsed.words.push(WordItem {
            term,
            part_of_speech: field(map.part_of_speech),
            translation,
            example: field(map.example),
            idioms: field(map.idioms),
        });
    }

    Ok(parsed)
}
