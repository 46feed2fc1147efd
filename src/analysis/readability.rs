//! Flesch readability metrics

use serde::Serialize;

use super::text;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingLevel {
    VeryEasy,
    Easy,
    FairlyEasy,
    Standard,
    FairlyDifficult,
    Difficult,
    VeryDifficult,
}

impl ReadingLevel {
    fn from_flesch(score: f64) -> Self {
        match score {
            s if s >= 90.0 => ReadingLevel::VeryEasy,
            s if s >= 80.0 => ReadingLevel::Easy,
            s if s >= 70.0 => ReadingLevel::FairlyEasy,
            s if s >= 60.0 => ReadingLevel::Standard,
            s if s >= 50.0 => ReadingLevel::FairlyDifficult,
            s if s >= 30.0 => ReadingLevel::Difficult,
            _ => ReadingLevel::VeryDifficult,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadabilityReport {
    /// Flesch reading ease, clamped to [0, 100]
    pub flesch_reading_ease: f64,
    /// Flesch-Kincaid grade, floored at 0
    pub flesch_kincaid_grade: f64,
    pub average_sentence_length: f64,
    pub average_syllables_per_word: f64,
    pub polysyllabic_words: usize,
    pub reading_level: ReadingLevel,
}

pub fn calculate(content: &str) -> ReadabilityReport {
    let words = text::words(content);
    let sentence_count = text::sentences(content).len().max(1);

    if words.is_empty() {
        return ReadabilityReport {
            flesch_reading_ease: 100.0,
            flesch_kincaid_grade: 0.0,
            average_sentence_length: 0.0,
            average_syllables_per_word: 0.0,
            polysyllabic_words: 0,
            reading_level: ReadingLevel::VeryEasy,
        };
    }

    let syllable_counts: Vec<usize> = words.iter().map(|w| text::count_syllables(w)).collect();
    let syllables: usize = syllable_counts.iter().sum();
    let polysyllabic_words = syllable_counts.iter().filter(|&&s| s >= 3).count();

    let asl = words.len() as f64 / sentence_count as f64;
    let asw = syllables as f64 / words.len() as f64;

    let ease = 206.835 - 1.015 * asl - 84.6 * asw;
    let grade = 0.39 * asl + 11.8 * asw - 15.59;

    ReadabilityReport {
        flesch_reading_ease: ease.clamp(0.0, 100.0),
        flesch_kincaid_grade: grade.max(0.0),
        average_sentence_length: asl,
        average_syllables_per_word: asw,
        polysyllabic_words,
        reading_level: ReadingLevel::from_flesch(ease),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_text_is_low_grade() {
        let report = calculate("The cat sat. The dog ran. We like to play.");
        assert!(report.flesch_kincaid_grade < 3.0);
        assert!(report.flesch_reading_ease > 80.0);
    }

    #[test]
    fn test_dense_text_is_high_grade() {
        let report = calculate(
            "Photosynthesis fundamentally transforms electromagnetic radiation into chemical \
             potential energy through sophisticated biochemical mechanisms operating within \
             specialized chloroplast organelles.",
        );
        assert!(report.flesch_kincaid_grade > 12.0);
        assert_eq!(report.reading_level, ReadingLevel::VeryDifficult);
    }

    #[test]
    fn test_empty_text() {
        let report = calculate("");
        assert_eq!(report.flesch_kincaid_grade, 0.0);
    }
}
