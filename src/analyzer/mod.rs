//! Text analysis module
//!
//! Reduces raw text to a map from lemma (canonical base form) to
//! occurrence count. The morphological dictionaries themselves live
//! behind the [`Morphology`] trait; this module owns tokenization,
//! language detection, and stop part-of-speech filtering.

mod lemmatizer;
mod morphology;

pub use lemmatizer::LemmaAnalyzer;
pub use morphology::{IdentityMorphology, Language, Morphology, MorphologyError};
