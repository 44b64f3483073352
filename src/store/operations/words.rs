use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::WordItem;
use crate::store::keys;
use crate::store::{Store, StoreError};

/// A corpus word with its insertion position and folder tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusEntry {
    #[serde(flatten)]
    pub item: WordItem,
    pub position: u64,
    #[serde(default)]
    pub folders: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Store {
    /// Inserts or replaces a word. An existing word keeps its position and
    /// creation time; folder tags are merged.
    pub fn upsert_word(&self, item: &WordItem, folders: &[String]) -> Result<CorpusEntry, StoreError> {
        let key = keys::word_key(&item.term);
        if key.is_empty() {
            return Err(StoreError::Validation("word term must not be empty".to_string()));
        }

        let entry = match self.get_word(&key)? {
            Some(mut existing) => {
                existing.item = item.clone();
                existing.folders.extend(folders.iter().cloned());
                existing.folders.sort();
                existing.folders.dedup();
                existing
            }
            None => {
                let mut folders = folders.to_vec();
                folders.sort();
                folders.dedup();
                CorpusEntry {
                    item: item.clone(),
                    position: self.next_id()?,
                    folders,
                    created_at: Utc::now(),
                }
            }
        };

        self.words.insert(key.as_bytes(), Self::serialize(&entry)?)?;
        Ok(entry)
    }

    pub fn get_word(&self, term: &str) -> Result<Option<CorpusEntry>, StoreError> {
        let key = keys::word_key(term);
        match self.words.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn delete_word(&self, term: &str) -> Result<bool, StoreError> {
        let key = keys::word_key(term);
        Ok(self.words.remove(key.as_bytes())?.is_some())
    }

    /// Every entry in insertion order.
    pub fn corpus_entries(&self) -> Result<Vec<CorpusEntry>, StoreError> {
        let mut entries = Vec::with_capacity(self.words.len());
        for item in self.words.iter() {
            let (_, value) = item?;
            entries.push(Self::deserialize::<CorpusEntry>(&value)?);
        }
        entries.sort_by_key(|e| e.position);
        Ok(entries)
    }

    pub fn corpus_items(&self) -> Result<Vec<WordItem>, StoreError> {
        Ok(self.corpus_entries()?.into_iter().map(|e| e.item).collect())
    }

    pub fn count_words(&self) -> usize {
        self.words.len()
    }

    /// Page of entries in insertion order, optionally limited to one folder.
    /// Returns the page and the total number of matching entries.
    pub fn list_words(
        &self,
        folder: Option<&str>,
        limit: usize,
        offset: usize,
    ) -> Result<(Vec<CorpusEntry>, usize), StoreError> {
        let matching: Vec<CorpusEntry> = self
            .corpus_entries()?
            .into_iter()
            .filter(|e| folder.map_or(true, |f| e.folders.iter().any(|x| x == f)))
            .collect();
        let total = matching.len();
        Ok((matching.into_iter().skip(offset).take(limit).collect(), total))
    }

    pub fn folder_counts(&self) -> Result<BTreeMap<String, usize>, StoreError> {
        let mut counts = BTreeMap::new();
        for entry in self.corpus_entries()? {
            for folder in entry.folders {
                *counts.entry(folder).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }

    /// Upserts every item, tagging each with `folder` when given.
    pub fn import_words(&self, items: &[WordItem], folder: Option<&str>) -> Result<usize, StoreError> {
        let folders: Vec<String> = folder.map(|f| vec![f.to_string()]).unwrap_or_default();
        for item in items {
            self.upsert_word(item, &folders)?;
        }
        Ok(items.len())
    }
}
