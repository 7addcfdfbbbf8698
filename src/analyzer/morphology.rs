//! Morphology backend interface
//!
//! A backend maps a surface word to its dictionary base forms and to
//! raw morphological descriptor strings (which embed the part-of-speech
//! tag). Backends are external to this crate; [`IdentityMorphology`] is
//! the built-in fallback that treats every word as its own base form.

use thiserror::Error;

/// Failure inside a morphology backend for a single word
///
/// These never escape the analyzer: the offending token is skipped.
#[derive(Debug, Error)]
#[error("morphology backend failure: {0}")]
pub struct MorphologyError(pub String);

/// A morphological dictionary for one language
pub trait Morphology: Send + Sync {
    /// Dictionary base forms of a word, most common first
    fn normal_forms(&self, word: &str) -> Result<Vec<String>, MorphologyError>;

    /// Raw morphological descriptors of a word, e.g. `"собака|С жр,ед,им"`
    ///
    /// The part-of-speech tag is matched by substring against the
    /// analyzer's excluded-tag sets.
    fn morph_info(&self, word: &str) -> Result<Vec<String>, MorphologyError>;
}

/// Language of a token, decided by its script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Russian,
    English,
}

impl Language {
    /// Detects the language of an already-lowercased token
    ///
    /// Tokens containing any cyrillic letter are Russian (mixed-script
    /// tokens resolve to Russian); otherwise any latin letter makes the
    /// token English. Tokens with neither have no language.
    pub fn detect(word: &str) -> Option<Language> {
        let has_cyrillic = word.chars().any(is_cyrillic);
        if has_cyrillic {
            return Some(Language::Russian);
        }
        if word.chars().any(|c| c.is_ascii_alphabetic()) {
            return Some(Language::English);
        }
        None
    }
}

pub(crate) fn is_cyrillic(c: char) -> bool {
    ('а'..='я').contains(&c) || ('А'..='Я').contains(&c) || c == 'ё' || c == 'Ё'
}

/// Fallback backend: a word is its own base form
///
/// Produces no descriptors, so stop-tag filtering never rejects a
/// token. Useful wherever real dictionaries are not wired in; inflected
/// forms are then indexed as distinct lemmas.
#[derive(Debug, Default)]
pub struct IdentityMorphology;

impl Morphology for IdentityMorphology {
    fn normal_forms(&self, word: &str) -> Result<Vec<String>, MorphologyError> {
        Ok(vec![word.to_string()])
    }

    fn morph_info(&self, _word: &str) -> Result<Vec<String>, MorphologyError> {
        Ok(Vec::new())
    }
}
