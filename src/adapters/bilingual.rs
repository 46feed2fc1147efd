//! Bilingual support adapter

use serde::Serialize;

use crate::models::AdaptationParams;

/// Supported native languages as (name, ISO code, right-to-left)
const LANGUAGES: &[(&str, &str, bool)] = &[
    ("Spanish", "es", false),
    ("French", "fr", false),
    ("Arabic", "ar", true),
    ("Chinese", "zh", false),
    ("Vietnamese", "vi", false),
    ("Portuguese", "pt", false),
    ("Russian", "ru", false),
    ("Korean", "ko", false),
    ("Japanese", "ja", false),
    ("German", "de", false),
    ("Hebrew", "he", true),
    ("Urdu", "ur", true),
    ("Persian", "fa", true),
];

const SPANISH_COGNATES: &[(&str, &str)] = &[
    ("animal", "animal"),
    ("family", "familia"),
    ("natural", "natural"),
    ("problem", "problema"),
    ("information", "información"),
    ("important", "importante"),
    ("different", "diferente"),
    ("example", "ejemplo"),
];

const FRENCH_COGNATES: &[(&str, &str)] = &[
    ("animal", "animal"),
    ("family", "famille"),
    ("natural", "naturel"),
    ("problem", "problème"),
    ("information", "information"),
    ("important", "important"),
    ("different", "différent"),
    ("example", "exemple"),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cognate {
    pub english: String,
    pub native: String,
    pub similarity: &'static str,
}

pub fn language_code(language: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|(name, _, _)| name.eq_ignore_ascii_case(language.trim()))
        .map(|(_, code, _)| *code)
}

pub fn is_rtl(language: &str) -> bool {
    LANGUAGES
        .iter()
        .any(|(name, _, rtl)| *rtl && name.eq_ignore_ascii_case(language.trim()))
}

/// Prompt block for bilingual support. Empty when no native language is set.
pub fn build_instructions(params: &AdaptationParams) -> String {
    let language = match params
        .native_language
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
    {
        Some(language) => language,
        None => return String::new(),
    };

    let mut out = format!(
        "\n\n**BILINGUAL SUPPORT REQUIREMENTS (Native Language: {}):**\n",
        language
    );
    out.push_str(&format!(
        "- For each term in the 'Key Vocabulary' section, provide translation in {lang}. Format: **term**: definition (*{lang} translation*)\n",
        lang = language
    ));

    if params.translate_summary {
        out.push_str(&format!(
            "- At the very top of the worksheet, provide a 1-2 sentence summary in {} explaining what students will learn.\n",
            language
        ));
    }
    if params.translate_instructions {
        out.push_str(&format!(
            "- For every 'Directions:' or instruction line, add the {} translation on the next line in italics.\n",
            language
        ));
    }
    if params.list_cognates {
        out.push_str(&format!(
            "- In the teacher guide, create a 'Cognates to Highlight' section with English/{} word pairs that share similar roots.\n",
            language
        ));
    }
    if is_rtl(language) {
        out.push_str(&format!(
            "- Note: {} is a right-to-left language. Consider text direction in layout.\n",
            language
        ));
    }

    out
}

/// Known cognates among the given English terms
pub fn generate_cognates(english_terms: &[&str], native_language: &str) -> Vec<Cognate> {
    let table: &[(&str, &str)] = match language_code(native_language) {
        Some("es") => SPANISH_COGNATES,
        Some("fr") => FRENCH_COGNATES,
        _ => &[],
    };

    english_terms
        .iter()
        .filter_map(|term| {
            let lower = term.to_lowercase();
            table
                .iter()
                .find(|(en, _)| *en == lower)
                .map(|(_, native)| Cognate {
                    english: term.to_string(),
                    native: native.to_string(),
                    similarity: "high",
                })
        })
        .collect()
}

/// Cognates found in `content`, as a line for the bilingual block.
/// Empty unless cognate listing is requested and something matched.
pub fn build_cognate_hint(params: &AdaptationParams) -> String {
    let language = match params.native_language.as_deref() {
        Some(language) if params.list_cognates => language,
        _ => return String::new(),
    };

    let mut words: Vec<&str> = Vec::new();
    for word in params.content.split(|c: char| !c.is_alphabetic()) {
        if !word.is_empty() && !words.iter().any(|w| w.eq_ignore_ascii_case(word)) {
            words.push(word);
        }
    }

    let cognates = generate_cognates(&words, language);
    if cognates.is_empty() {
        return String::new();
    }
    let pairs: Vec<String> = cognates
        .iter()
        .map(|c| format!("{} / {}", c.english, c.native))
        .collect();
    format!("- Known cognates in this material: {}\n", pairs.join(", "))
}
