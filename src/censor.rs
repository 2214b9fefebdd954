//! Spoiler beeping.
//!
//! Text spans tagged `**like this**` keep their spoken duration but are
//! rendered as a beep.  The trick: each tagged span is wrapped in two
//! ordinary words ("king" / "gink") whose phonemic signatures are
//! unlikely to occur in normal speech, the whole text goes through the
//! articulation stage once, and a two-state scan over the resulting
//! phoneme sequence swaps everything between the two signatures for a
//! synthetic beep of identical total duration.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::Result;
use crate::params::VoiceParameters;
use crate::phonem::{Phonem, PhonemList};
use crate::renderer::AudioRenderer;
use crate::synth::Synthesizer;

/// A maximal non-overlapping `**…**` span on a single line.
static SPOILER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*.+?\*\*").unwrap());

/// Flat pitch of the beep vowel.
const BEEP_PITCH: u16 = 103 * 3;
/// Fixed durations of the stop consonants framing the beep.
const BEEP_ATTACK_MS: u32 = 103;
const BEEP_RELEASE_MS: u32 = 228;

/// Phonemic signatures of the opening "king" (3 phonemes) and closing
/// "gink" (4 phonemes) tag words, per language.  Unknown languages use
/// the French entry, matching the renderer's voice fallback.
fn tag_signatures(lang: &str) -> (&'static str, &'static str) {
    match lang {
        "en" => ("k_hIN", "dZINk"),
        "de" => ("kIN", "gINk"),
        "es" => ("kin", "xink"),
        _ => ("kiN", "ZiNk"),
    }
}

/// What the censor hands back: untouched text when nothing was tagged,
/// otherwise the rewritten phoneme sequence.  Callers dispatch to
/// `text_to_audio` or `phonemes_to_audio` accordingly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CensoredSpeech {
    Text(String),
    Phonemes(PhonemList),
}

/// The spoiler-beep processor, bound to one user's voice parameters.
pub struct SpoilerBeep<'a, S> {
    renderer: &'a AudioRenderer<S>,
    params: VoiceParameters,
}

impl<'a, S: Synthesizer> SpoilerBeep<'a, S> {
    pub fn new(renderer: &'a AudioRenderer<S>, params: VoiceParameters) -> Self {
        Self { renderer, params }
    }

    /// Beep out every `**…**` span of `text`.
    ///
    /// Without any tagged span the original text comes back untouched
    /// and no synthesis call is made.
    pub async fn process(&self, text: &str, lang: &str) -> Result<CensoredSpeech> {
        if !SPOILER_RE.is_match(text) {
            return Ok(CensoredSpeech::Text(text.to_string()));
        }

        // "**secret**" → " king secret gink "
        let rewritten = SPOILER_RE.replace_all(text, |caps: &Captures| {
            format!(" king {} gink ", caps[0].trim_matches('*'))
        });

        let phonems = self.renderer.text_to_phonemes(&rewritten, lang, &self.params).await?;
        Ok(CensoredSpeech::Phonemes(beep_tagged_spans(&phonems, lang)))
    }
}

/// Two-state scan over the phoneme sequence: copy in NORMAL, accumulate
/// in IN_BEEP, and emit one beep of the accumulated duration when the
/// closing signature is found.  An opening signature that never finds
/// its closing one silently drops whatever was buffered.
fn beep_tagged_spans(phonems: &PhonemList, lang: &str) -> PhonemList {
    let (prefix, suffix) = tag_signatures(lang);
    let input = phonems.as_slice();

    let mut output = PhonemList::new();
    let mut buffer = PhonemList::new();
    let mut in_beep = false;
    let mut i = 0;

    while i < input.len() {
        if !in_beep && signature_matches(&input[i..], prefix, 3) {
            in_beep = true;
            buffer.clear();
            i += 3;
        } else if in_beep && signature_matches(&input[i..], suffix, 4) {
            in_beep = false;
            if !buffer.is_empty() {
                output.extend(gen_beep(buffer.total_duration_ms(), lang));
            }
            i += 4;
        } else if in_beep {
            buffer.push(input[i].clone());
            i += 1;
        } else {
            output.push(input[i].clone());
            i += 1;
        }
    }

    output
}

/// Do the next `n` phonemes' concatenated symbols spell `signature`?
fn signature_matches(rest: &[Phonem], signature: &str, n: usize) -> bool {
    if rest.len() < n {
        return false;
    }
    let concat: String = rest[..n].iter().map(Phonem::symbol).collect();
    concat == signature
}

/// A beep spanning `duration_ms`: stop consonant, sustained vowel with
/// a flat contour, stop consonant.  German uses its long-vowel symbol.
fn gen_beep(duration_ms: u32, lang: &str) -> PhonemList {
    let vowel = if lang == "de" { "i:" } else { "i" };
    PhonemList::from(vec![
        Phonem::new("b", BEEP_ATTACK_MS),
        Phonem::with_pitch(
            vowel,
            duration_ms,
            vec![(0, BEEP_PITCH), (80, BEEP_PITCH), (100, BEEP_PITCH)],
        ),
        Phonem::new("p", BEEP_RELEASE_MS),
    ])
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
