//! # chanvox
//!
//! Signal- and symbol-processing core of a chat-bot voice feature:
//! turns user text into spoken audio through an external
//! espeak → mbrola pipeline, derives each user's voice and cosmetic
//! identity deterministically from an identity fingerprint, beeps out
//! `**spoiler**` spans at matching duration, and rate-limits
//! message floods.
//!
//! ## Quick start
//!
//! ```no_run
//! use chanvox::{
//!     AudioRenderer, CensoredSpeech, EspeakMbrola, SpoilerBeep,
//!     VoiceParameters, prepare_text,
//! };
//!
//! # async fn speak(fingerprint: &[u8]) -> anyhow::Result<Vec<u8>> {
//! let params = VoiceParameters::from_fingerprint(fingerprint);
//! let renderer = AudioRenderer::new(EspeakMbrola::default());
//!
//! let text = prepare_text("my **secret** plan", "en");
//! let wav = match SpoilerBeep::new(&renderer, params).process(&text, "en").await? {
//!     CensoredSpeech::Text(text) => renderer.text_to_audio(&text, "en", &params).await?,
//!     CensoredSpeech::Phonemes(pho) => renderer.phonemes_to_audio(&pho, "en", &params).await?,
//! };
//! # Ok(wav)
//! # }
//! ```
//!
//! ## Pipeline
//! 1. **Sanitization** — URLs, hashtags and stray punctuation cleaned
//!    ([`prepare_text`]), before anything reaches a synthesis stage.
//! 2. **Censorship** — tagged spans wrapped in phonemic markers, one
//!    articulation pass, marker-delimited phonemes swapped for a beep.
//! 3. **Synthesis** — espeak (text → phonemes) and mbrola (phonemes →
//!    WAV) invoked as external processes with argument vectors.
//! 4. **Post-processing** — WAV chunk sizes repaired, samples
//!    normalized to 16 kHz f32 for downstream effects.
//!
//! Flood detection ([`FloodController`]) and per-user effect slots
//! ([`EffectSlots`]) ride along on every inbound message, independent
//! of synthesis.

pub mod censor;
pub mod config;
pub mod effects;
pub mod error;
pub mod flood;
pub mod params;
pub mod phonem;
pub mod renderer;
pub mod sanitize;
pub mod synth;
pub mod user;

// ─── Re-exports for convenience ─────────────────────────────────────────────

pub use censor::{CensoredSpeech, SpoilerBeep};
pub use config::{FloodConfig, SynthConfig};
pub use effects::{Effect, EffectCategory, EffectInsert, EffectSlots};
pub use error::{ChanvoxError, Result};
pub use flood::FloodController;
pub use params::{PokeParameters, VoiceParameters, DEFAULT_POKEMON_COUNT};
pub use phonem::{Phonem, PhonemList};
pub use renderer::{denormalize, fix_wav_header, AudioRenderer, CANONICAL_RATE};
pub use sanitize::{prepare_text, BannedWords};
pub use synth::{EngineRequest, EspeakMbrola, Synthesizer};
pub use user::UserState;
