//! Lemma extraction from raw text

use crate::analyzer::morphology::{is_cyrillic, Language, Morphology};
use crate::analyzer::IdentityMorphology;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Minimum length (in characters) for a token or lemma to be indexed
const MIN_LEMMA_LENGTH: usize = 3;

/// Part-of-speech tags excluded from indexing for Russian
const RUSSIAN_STOP_TAGS: &[&str] = &["МЕЖД", "ПРЕДЛ", "СОЮЗ", "ЧАСТ", "МС"];

/// Part-of-speech tags excluded from indexing for English
const ENGLISH_STOP_TAGS: &[&str] = &["CONJ", "PREP", "ARTICLE", "PART", "INT"];

/// Reduces text to a lemma → occurrence count map
///
/// Words are lowercased, stripped of non-letter characters, filtered by
/// length and by excluded part-of-speech classes, and collapsed to the
/// first base form their language's morphology backend reports.
pub struct LemmaAnalyzer {
    russian: Option<Arc<dyn Morphology>>,
    english: Option<Arc<dyn Morphology>>,
    russian_stop_tags: HashSet<String>,
    english_stop_tags: HashSet<String>,
}

impl LemmaAnalyzer {
    /// Creates an analyzer with explicit backends and default stop tags
    pub fn new(
        russian: Option<Arc<dyn Morphology>>,
        english: Option<Arc<dyn Morphology>>,
    ) -> Self {
        Self {
            russian,
            english,
            russian_stop_tags: RUSSIAN_STOP_TAGS.iter().map(|t| t.to_string()).collect(),
            english_stop_tags: ENGLISH_STOP_TAGS.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Creates an analyzer backed by [`IdentityMorphology`] for both languages
    pub fn with_default_backends() -> Self {
        Self::new(
            Some(Arc::new(IdentityMorphology)),
            Some(Arc::new(IdentityMorphology)),
        )
    }

    /// Creates an analyzer with no backends; `collect_lemmas` returns empty maps
    pub fn disabled() -> Self {
        Self::new(None, None)
    }

    /// Replaces the excluded part-of-speech tags for one language
    pub fn with_stop_tags(mut self, language: Language, tags: &[&str]) -> Self {
        let set = tags.iter().map(|t| t.to_string()).collect();
        match language {
            Language::Russian => self.russian_stop_tags = set,
            Language::English => self.english_stop_tags = set,
        }
        self
    }

    /// Extracts lemmas and their occurrence counts from a text blob
    ///
    /// Backend failures on individual tokens are swallowed (the token is
    /// skipped); no error escapes this function. With no configured
    /// backends the result is empty, which callers treat as "no
    /// significant terms".
    pub fn collect_lemmas(&self, text: &str) -> HashMap<String, u32> {
        let mut counts = HashMap::new();

        if self.russian.is_none() && self.english.is_none() {
            tracing::error!("no morphology backend configured, skipping analysis");
            return counts;
        }

        if text.trim().is_empty() {
            return counts;
        }

        let cleaned = squash_to_letters(text);
        for word in cleaned.split_whitespace() {
            if word.chars().count() < MIN_LEMMA_LENGTH {
                continue;
            }
            self.process_word(word, &mut counts);
        }

        counts
    }

    fn process_word(&self, word: &str, counts: &mut HashMap<String, u32>) {
        let Some(language) = Language::detect(word) else {
            return;
        };
        let Some(backend) = self.backend(language) else {
            return;
        };

        let forms = match backend.normal_forms(word) {
            Ok(forms) => forms,
            Err(e) => {
                tracing::debug!("normal_forms failed for '{}': {}", word, e);
                return;
            }
        };
        let Some(lemma) = forms.into_iter().next() else {
            return;
        };
        if lemma.chars().count() < MIN_LEMMA_LENGTH {
            return;
        }

        let info = match backend.morph_info(word) {
            Ok(info) => info,
            Err(e) => {
                tracing::debug!("morph_info failed for '{}': {}", word, e);
                return;
            }
        };
        let stop_tags = self.stop_tags(language);
        if info
            .iter()
            .any(|descriptor| stop_tags.iter().any(|tag| descriptor.contains(tag.as_str())))
        {
            return;
        }

        *counts.entry(lemma).or_insert(0) += 1;
    }

    fn backend(&self, language: Language) -> Option<&Arc<dyn Morphology>> {
        match language {
            Language::Russian => self.russian.as_ref(),
            Language::English => self.english.as_ref(),
        }
    }

    fn stop_tags(&self, language: Language) -> &HashSet<String> {
        match language {
            Language::Russian => &self.russian_stop_tags,
            Language::English => &self.english_stop_tags,
        }
    }
}

/// Lowercases text and replaces every non-letter run with a single space
///
/// Only latin and cyrillic letters survive; everything else (digits,
/// punctuation, markup remnants) becomes a token boundary.
fn squash_to_letters(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        if c.is_ascii_alphabetic() || is_cyrillic(c) {
            cleaned.push(c);
        } else {
            cleaned.push(' ');
        }
    }
    cleaned
}
