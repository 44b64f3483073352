use vocab_trainer::engine::WordItem;
use vocab_trainer::store::Store;

const PARTS_OF_SPEECH: [&str; 4] = ["n", "v", "adj", "adv"];

pub fn word(idx: usize) -> WordItem {
    WordItem {
        term: format!("word-{idx}"),
        part_of_speech: PARTS_OF_SPEECH[idx % PARTS_OF_SPEECH.len()].to_string(),
        translation: format!("訳-{idx}"),
        example: format!("This sentence uses word-{idx}."),
        idioms: String::new(),
    }
}

pub fn seed_words(store: &Store, count: usize, folder: Option<&str>) -> Vec<WordItem> {
    let items: Vec<WordItem> = (0..count).map(word).collect();
    store.import_words(&items, folder).expect("import seed words");
    items
}
