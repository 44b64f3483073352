use crate::engine::WordItem;
use crate::store::{Store, StoreError};

pub const DEMO_FOLDER: &str = "demo";

// term, part of speech, translation, example, idioms
const DEMO_WORDS: &[(&str, &str, &str, &str, &str)] = &[
    ("issue", "n", "問題、論点", "Climate change is a pressing issue for our generation.", "environmental issues, social issues, raise an issue"),
    ("affect", "v", "影響を与える", "Pollution can seriously affect human health.", "deeply affect, affect change, affect a person"),
    ("solve", "v", "解決する", "Scientists are trying to solve the problem of food waste.", "solve a problem, solve a puzzle, solve a crime"),
    ("impact", "n", "影響、衝撃", "The new technology had a significant impact on daily life.", "positive impact, negative impact, have an impact on"),
    ("global", "adj", "世界的な、地球規模の", "Global warming is a serious threat to our planet.", "global warming, global market, global economy"),
    ("develop", "v", "発展させる、開発する", "Researchers are working to develop new energy sources.", "develop a skill, develop a plan, develop a new product"),
    ("reduce", "v", "減らす、削減する", "We should try to reduce our use of plastic bags.", "reduce waste, reduce costs, reduce risk"),
    ("protect", "v", "保護する、守る", "It is important to protect endangered species.", "protect from, protect against, protect the environment"),
    ("resource", "n", "資源", "Water is a vital resource for all living things.", "natural resources, human resources, allocate resources"),
    ("community", "n", "地域社会、共同体", "Volunteering helps build a stronger community.", "local community, online community, community spirit"),
];

pub fn demo_words() -> Vec<WordItem> {
    DEMO_WORDS
        .iter()
        .map(|(term, pos, translation, example, idioms)| WordItem {
            term: term.to_string(),
            part_of_speech: pos.to_string(),
            translation: translation.to_string(),
            example: example.to_string(),
            idioms: idioms.to_string(),
        })
        .collect()
}

/// Imports the demo list into an empty corpus. Returns the number of words added.
pub fn seed_if_empty(store: &Store) -> Result<usize, StoreError> {
    if store.count_words() > 0 {
        return Ok(0);
    }
    let added = store.import_words(&demo_words(), Some(DEMO_FOLDER))?;
    tracing::info!(added, folder = DEMO_FOLDER, "Seeded demo words into empty corpus");
    Ok(added)
}
