//! Text sanitization boundary.
//!
//! Everything a user typed goes through [`prepare_text`] before it
//! reaches the censor or either synthesis stage: URLs become a spoken
//! per-language phrase, `#` becomes the word "hashtag", and stray
//! leading/trailing punctuation is trimmed.  The synthesis back ends
//! are invoked with argument vectors, so no shell escaping happens (or
//! is needed) here.
//!
//! [`BannedWords`] lives here too: a word-level full-match predicate
//! the moderation layer runs over incoming messages.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ChanvoxError, Result};

/// Matches a URL up to (but not including) trailing sentence punctuation.
static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://[^ ]*[^.,?! :]").unwrap());

/// Characters stripped from both ends of the text.
const TRIMMED: &[char] = &[' ', '-', '"', '\'', '`', '$', '(', ')', ';', ':', '.'];

/// Spoken replacement for a URL, per language.
fn link_phrase(lang: &str) -> &'static str {
    match lang {
        "en" => "Click it mate",
        "de" => "Klick drauf!",
        "es" => "Clico JAJAJA",
        // fr, and the default for unknown languages
        _ => "cliquez mes petits chatons",
    }
}

/// Clean `text` for synthesis.  Must run before any censor rewriting or
/// `text_to_audio`/`text_to_phonemes` call.
pub fn prepare_text(text: &str, lang: &str) -> String {
    let text = URL_RE.replace_all(text, link_phrase(lang));
    let text = text.replace('#', "hashtag ");
    text.trim_matches(TRIMMED).to_string()
}

// ─────────────────────────────────────────────────────────────────────────────
// Banned words
// ─────────────────────────────────────────────────────────────────────────────

/// Word-level ban list: each entry is a regex pattern, and a word is
/// banned when any pattern matches it in full.  Anchoring is applied
/// here so `chat` bans "chat" but not "chatons".
#[derive(Debug, Clone)]
pub struct BannedWords {
    patterns: Vec<Regex>,
}

impl BannedWords {
    /// Compile the ban list.  An invalid pattern fails the whole list.
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                Regex::new(&format!("^(?:{})$", p.as_ref()))
                    .map_err(ChanvoxError::from)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// True iff any pattern matches `word` in full.
    pub fn is_banned(&self, word: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(word))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
