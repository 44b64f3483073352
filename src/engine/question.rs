use rand::seq::{IteratorRandom, SliceRandom};
use rand::Rng;
use serde::Serialize;

use crate::engine::types::{EngineError, QuestionType, WordItem};

pub const OPTION_COUNT: usize = 4;
pub const PARTS_OF_SPEECH: [&str; 6] = ["n", "v", "adj", "adv", "prep", "conj"];

/// Display label for a part-of-speech code. Unknown codes pass through.
pub fn part_of_speech_label(code: &str) -> String {
    match code {
        "n" => "名詞 (noun)".to_string(),
        "v" => "動詞 (verb)".to_string(),
        "adj" => "形容詞 (adj)".to_string(),
        "adv" => "副詞 (adv)".to_string(),
        "prep" => "前置詞 (prep)".to_string(),
        "conj" => "接続詞 (conj)".to_string(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOption {
    pub text: String,
    #[serde(skip_serializing)]
    pub correct: bool,
}

/// One rendered multiple-choice question. `direction` is never `Mixed`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub index: usize,
    pub total: usize,
    pub direction: QuestionType,
    pub prompt: String,
    pub hint: String,
    pub options: Vec<AnswerOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_cue: Option<String>,
}

impl Question {
    pub fn is_correct(&self, choice: usize) -> Result<bool, EngineError> {
        self.options
            .get(choice)
            .map(|o| o.correct)
            .ok_or(EngineError::OptionOutOfRange {
                index: choice,
                len: self.options.len(),
            })
    }

    pub fn correct_text(&self) -> Option<&str> {
        self.options.iter().find(|o| o.correct).map(|o| o.text.as_str())
    }
}

pub fn resolve_direction<R: Rng + ?Sized>(question_type: QuestionType, rng: &mut R) -> QuestionType {
    match question_type {
        QuestionType::Mixed => {
            if rng.gen_bool(0.5) {
                QuestionType::TermToTranslation
            } else {
                QuestionType::TranslationToTerm
            }
        }
        other => other,
    }
}

/// Renders `word` as question `index` of `total`.
///
/// Distractors come from `corpus`; missing ones are filled with numbered
/// placeholders so every question carries four options.
pub fn build_question<R: Rng + ?Sized>(
    word: &WordItem,
    index: usize,
    total: usize,
    question_type: QuestionType,
    corpus: &[WordItem],
    enable_sound: bool,
    rng: &mut R,
) -> Question {
    let direction = resolve_direction(question_type, rng);
    let hint = format!("[{}]", part_of_speech_label(&word.part_of_speech));

    let (prompt, hint, options) = match direction {
        QuestionType::TranslationToTerm => (
            word.translation.clone(),
            hint,
            field_options(word, corpus, |w| w.term.as_str(), rng),
        ),
        QuestionType::PartOfSpeech => (
            word.term.clone(),
            "品詞は？".to_string(),
            part_of_speech_options(&word.part_of_speech, rng),
        ),
        _ => (
            word.term.clone(),
            hint,
            field_options(word, corpus, |w| w.translation.as_str(), rng),
        ),
    };

    let speech_cue = (enable_sound && direction != QuestionType::TranslationToTerm).then(|| word.term.clone());

    Question {
        index,
        total,
        direction,
        prompt,
        hint,
        options,
        speech_cue,
    }
}

fn field_options<R, F>(word: &WordItem, corpus: &[WordItem], field: F, rng: &mut R) -> Vec<AnswerOption>
where
    R: Rng + ?Sized,
    F: Fn(&WordItem) -> &str,
{
    let correct = field(word);

    let mut distinct: Vec<&str> = Vec::new();
    for value in corpus.iter().map(&field) {
        if !value.is_empty() && value != correct && !distinct.contains(&value) {
            distinct.push(value);
        }
    }

    let mut distractors: Vec<String> = distinct
        .into_iter()
        .choose_multiple(rng, OPTION_COUNT - 1)
        .into_iter()
        .map(str::to_string)
        .collect();
    while distractors.len() < OPTION_COUNT - 1 {
        distractors.push(format!("選択肢 {}", distractors.len() + 1));
    }

    shuffled_options(correct.to_string(), distractors, rng)
}

fn part_of_speech_options<R: Rng + ?Sized>(correct: &str, rng: &mut R) -> Vec<AnswerOption> {
    let distractors = PARTS_OF_SPEECH
        .iter()
        .filter(|code| **code != correct)
        .take(OPTION_COUNT - 1)
        .map(|code| part_of_speech_label(code))
        .collect();

    shuffled_options(part_of_speech_label(correct), distractors, rng)
}

fn shuffled_options<R: Rng + ?Sized>(correct: String, distractors: Vec<String>, rng: &mut R) -> Vec<AnswerOption> {
    let mut options = Vec::with_capacity(distractors.len() + 1);
    options.push(AnswerOption {
        text: correct,
        correct: true,
    });
    options.extend(distractors.into_iter().map(|text| AnswerOption { text, correct: false }));
    options.shuffle(rng);
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn corpus() -> Vec<WordItem> {
        vec![
            WordItem::new("dog", "n", "犬"),
            WordItem::new("cat", "n", "猫"),
            WordItem::new("run", "v", "走る"),
            WordItem::new("big", "adj", "大きい"),
            WordItem::new("fast", "adv", "速く"),
        ]
    }

    #[test]
    fn term_question_has_one_correct_translation() {
        let mut rng = StdRng::seed_from_u64(3);
        let words = corpus();
        let q = build_question(&words[0], 0, 5, QuestionType::TermToTranslation, &words, true, &mut rng);

        assert_eq!(q.prompt, "dog");
        assert_eq!(q.hint, "[名詞 (noun)]");
        assert_eq!(q.options.len(), OPTION_COUNT);
        assert_eq!(q.options.iter().filter(|o| o.correct).count(), 1);
        assert_eq!(q.correct_text(), Some("犬"));
        assert_eq!(q.speech_cue.as_deref(), Some("dog"));
    }

    #[test]
    fn small_corpus_is_padded_with_placeholders() {
        let mut rng = StdRng::seed_from_u64(3);
        let words = vec![WordItem::new("dog", "n", "犬"), WordItem::new("cat", "n", "猫")];
        let q = build_question(&words[0], 0, 2, QuestionType::TranslationToTerm, &words, false, &mut rng);

        assert_eq!(q.prompt, "犬");
        assert_eq!(q.options.len(), OPTION_COUNT);
        assert!(q.options.iter().any(|o| o.text == "選択肢 2"));
        assert!(q.speech_cue.is_none());
    }

    #[test]
    fn part_of_speech_question_uses_fixed_labels() {
        let mut rng = StdRng::seed_from_u64(9);
        let words = corpus();
        let q = build_question(&words[2], 0, 1, QuestionType::PartOfSpeech, &words, false, &mut rng);

        assert_eq!(q.hint, "品詞は？");
        assert_eq!(q.correct_text(), Some("動詞 (verb)"));
        let mut texts: Vec<&str> = q.options.iter().map(|o| o.text.as_str()).collect();
        texts.sort();
        let mut expected = vec!["名詞 (noun)", "動詞 (verb)", "形容詞 (adj)", "副詞 (adv)"];
        expected.sort();
        assert_eq!(texts, expected);
    }

    #[test]
    fn mixed_resolves_to_a_concrete_direction() {
        let mut rng = StdRng::seed_from_u64(11);
        let words = corpus();
        for _ in 0..20 {
            let q = build_question(&words[1], 0, 1, QuestionType::Mixed, &words, false, &mut rng);
            assert!(matches!(
                q.direction,
                QuestionType::TermToTranslation | QuestionType::TranslationToTerm
            ));
        }
    }

    #[test]
    fn out_of_range_choice_is_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        let words = corpus();
        let q = build_question(&words[0], 0, 1, QuestionType::TermToTranslation, &words, false, &mut rng);
        assert_eq!(
            q.is_correct(7),
            Err(EngineError::OptionOutOfRange { index: 7, len: 4 })
        );
    }

    #[test]
    fn correct_flag_is_not_serialized() {
        let mut rng = StdRng::seed_from_u64(1);
        let words = corpus();
        let q = build_question(&words[0], 0, 1, QuestionType::TermToTranslation, &words, false, &mut rng);
        let json = serde_json::to_value(&q).unwrap();
        assert!(json["options"][0].get("correct").is_none());
        assert_eq!(json["direction"], "term_to_translation");
    }
}
