//! Bridges symbolic voice parameters to concrete engine addressing and
//! normalizes the audio that comes back.
//!
//! The renderer owns two fixed tables: which mbrola voice databases a
//! chat language maps to, and the per-voice volume calibration measured
//! for the shipped databases.  On the output side it repairs the chunk
//! sizes mbrola leaves wrong when streaming WAV to a pipe, and converts
//! between raw WAV bytes and the canonical processing format
//! (16 kHz, f32 samples in [-1, 1]).

use std::io::Cursor;

use crate::error::{ChanvoxError, Result};
use crate::params::VoiceParameters;
use crate::phonem::PhonemList;
use crate::synth::{EngineRequest, Synthesizer};

/// Canonical sample rate every waveform is normalized to.
pub const CANONICAL_RATE: u32 = 16_000;

// ─────────────────────────────────────────────────────────────────────────────
// Voice tables
// ─────────────────────────────────────────────────────────────────────────────

/// Chat language → (engine language, installed voice databases).
/// Unknown languages fall back to the French entry.
fn lang_voices(lang: &str) -> (&'static str, &'static [u8]) {
    match lang {
        "en" => ("us", &[1, 2, 3]),
        "es" => ("es", &[1, 2]),
        "de" => ("de", &[4, 5, 6, 7]),
        _ => ("fr", &[1, 2, 3, 4, 5, 6, 7]),
    }
}

/// Loudness calibration for each installed voice database.  Measured
/// values; a missing entry means the database was never calibrated.
fn volume_preset(lang: &str, voice: u8) -> Option<f64> {
    Some(match (lang, voice) {
        ("fr", 1) => 1.17138,
        ("fr", 2) => 1.60851,
        ("fr", 3) => 1.01283,
        ("fr", 4) => 1.0964,
        ("fr", 5) => 2.64384,
        ("fr", 6) => 1.35412,
        ("fr", 7) => 1.96092,
        ("us", 1) => 1.658,
        ("us", 2) => 1.7486,
        ("us", 3) => 3.48104,
        ("es", 1) => 3.26885,
        ("es", 2) => 1.84053,
        _ => return None,
    })
}

/// Resolve a chat language and derived voice parameters into the full
/// engine addressing for one invocation.
pub fn resolve_voice_config(lang: &str, params: &VoiceParameters) -> EngineRequest {
    let (engine_lang, voices) = lang_voices(lang);
    let voice = voices[params.voice_id as usize % voices.len()];

    // The French espeak variants are voiced differently from the mbrola
    // databases; 2 and 4 are the female ones.
    let sex = if engine_lang == "fr" {
        if voice == 2 || voice == 4 {
            4
        } else {
            1
        }
    } else {
        voice
    };

    let volume = if engine_lang == "de" {
        1.0
    } else {
        volume_preset(engine_lang, voice).map(|v| v * 0.5).unwrap_or(1.0)
    };

    EngineRequest {
        lang: engine_lang,
        voice,
        sex,
        volume,
        speed: params.speed,
        pitch: params.pitch,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// WAV byte surgery
// ─────────────────────────────────────────────────────────────────────────────

/// Rewrite the RIFF chunk size (bytes 4..8, total − 8) and the data
/// subchunk size (bytes 40..44, total − 44); every other byte is left
/// untouched.  mbrola writes placeholder sizes when its output is a
/// pipe instead of a seekable file.
///
/// Assumes the canonical 44-byte header layout (RIFF/WAVE/fmt/data, PCM,
/// no extra chunks).  Inputs shorter than a header are returned as-is.
pub fn fix_wav_header(mut wav: Vec<u8>) -> Vec<u8> {
    if wav.len() < 44 {
        return wav;
    }
    let total = wav.len() as u32;
    wav[4..8].copy_from_slice(&(total - 8).to_le_bytes());
    wav[40..44].copy_from_slice(&(total - 44).to_le_bytes());
    wav
}

// ─────────────────────────────────────────────────────────────────────────────
// Resampler seam
// ─────────────────────────────────────────────────────────────────────────────

/// External sample-rate converter.
pub trait Resampler: Send + Sync {
    fn resample(&self, samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>>;
}

/// FFT-based converter backed by `rubato`, processing fixed-size input
/// chunks (the tail chunk is zero-padded).
#[derive(Debug, Clone, Copy, Default)]
pub struct FftResampler;

impl Resampler for FftResampler {
    fn resample(&self, samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
        if from_rate == to_rate {
            return Ok(samples.to_vec());
        }

        use rubato::{FftFixedIn, Resampler as _};

        const CHUNK: usize = 1024;
        const SUB_CHUNKS: usize = 2;
        let mut resampler =
            FftFixedIn::<f32>::new(from_rate as usize, to_rate as usize, CHUNK, SUB_CHUNKS, 1)
                .map_err(|e| ChanvoxError::Resample(e.to_string()))?;

        let expected = (samples.len() as f64 * to_rate as f64 / from_rate as f64).ceil() as usize;
        let mut out = Vec::with_capacity(expected + CHUNK);

        let mut pos = 0;
        while pos < samples.len() {
            let end = (pos + CHUNK).min(samples.len());
            let mut chunk = vec![0.0; CHUNK];
            chunk[..end - pos].copy_from_slice(&samples[pos..end]);

            let frames = resampler
                .process(&[chunk], None)
                .map_err(|e| ChanvoxError::Resample(e.to_string()))?;
            out.extend_from_slice(&frames[0]);

            pos = end;
        }

        Ok(out)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// AudioRenderer
// ─────────────────────────────────────────────────────────────────────────────

/// Orchestrates the synthesis stages and post-processes their output.
pub struct AudioRenderer<S> {
    synth: S,
    resampler: Box<dyn Resampler>,
}

impl<S: Synthesizer> AudioRenderer<S> {
    pub fn new(synth: S) -> Self {
        Self { synth, resampler: Box::new(FftResampler) }
    }

    /// Swap in a different sample-rate converter.
    pub fn with_resampler(synth: S, resampler: Box<dyn Resampler>) -> Self {
        Self { synth, resampler }
    }

    /// Full pipeline: text → repaired WAV bytes.
    pub async fn text_to_audio(
        &self,
        text: &str,
        lang: &str,
        params: &VoiceParameters,
    ) -> Result<Vec<u8>> {
        let req = resolve_voice_config(lang, params);
        let wav = self.synth.text_to_wav(text, &req).await?;
        Ok(fix_wav_header(wav))
    }

    /// Audio stage only: a (possibly rewritten) phoneme sequence →
    /// repaired WAV bytes.
    pub async fn phonemes_to_audio(
        &self,
        phonemes: &PhonemList,
        lang: &str,
        params: &VoiceParameters,
    ) -> Result<Vec<u8>> {
        let req = resolve_voice_config(lang, params);
        let wav = self.synth.phonemes_to_wav(&phonemes.to_string(), &req).await?;
        Ok(fix_wav_header(wav))
    }

    /// Articulation stage only: text → parsed phoneme sequence.
    pub async fn text_to_phonemes(
        &self,
        text: &str,
        lang: &str,
        params: &VoiceParameters,
    ) -> Result<PhonemList> {
        let req = resolve_voice_config(lang, params);
        let pho = self.synth.text_to_phonemes(text, &req).await?;
        pho.trim().parse()
    }

    /// Decode WAV bytes to the canonical format: 16 kHz, f32 samples
    /// scaled to [-1, 1].  Resamples when the source rate differs.
    pub fn normalize(&self, wav: &[u8]) -> Result<(u32, Vec<f32>)> {
        let mut reader = hound::WavReader::new(Cursor::new(wav))?;
        let source_rate = reader.spec().sample_rate;

        let samples: Vec<f32> = reader
            .samples::<i16>()
            .map(|s| s.map(|v| v as f32 / 32768.0))
            .collect::<std::result::Result<_, _>>()?;

        if source_rate == CANONICAL_RATE {
            return Ok((CANONICAL_RATE, samples));
        }
        let resampled = self.resampler.resample(&samples, source_rate, CANONICAL_RATE)?;
        Ok((CANONICAL_RATE, resampled))
    }
}

/// Encode canonical-format samples back into a 16-bit PCM WAV at
/// `rate`.  Inverse of [`AudioRenderer::normalize`] up to quantization.
pub fn denormalize(samples: &[f32], rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for &s in samples {
            writer.write_sample((s * 32768.0) as i16)?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::EngineRequest;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn params(voice_id: u8) -> VoiceParameters {
        VoiceParameters { speed: 120, pitch: 50, voice_id }
    }

    // ── Voice resolution ────────────────────────────────────────────────────

    #[test]
    fn unknown_language_defaults_to_french() {
        let req = resolve_voice_config("zz", &params(0));
        assert_eq!(req.lang, "fr");
        assert_eq!(req.voice, 1);
    }

    #[test]
    fn voice_id_wraps_around_the_table() {
        // en has 3 voices; id 7 → index 1 → voice 2
        let req = resolve_voice_config("en", &params(7));
        assert_eq!(req.lang, "us");
        assert_eq!(req.voice, 2);
    }

    #[test]
    fn french_sex_rule() {
        // fr voices 2 and 4 use espeak variant 4, the rest variant 1
        assert_eq!(resolve_voice_config("fr", &params(1)).sex, 4); // voice 2
        assert_eq!(resolve_voice_config("fr", &params(3)).sex, 4); // voice 4
        assert_eq!(resolve_voice_config("fr", &params(0)).sex, 1); // voice 1
        assert_eq!(resolve_voice_config("fr", &params(4)).sex, 1); // voice 5
        // Other languages: sex mirrors the voice number.
        assert_eq!(resolve_voice_config("de", &params(2)).sex, 6);
    }

    #[test]
    fn german_volume_is_unity() {
        assert_eq!(resolve_voice_config("de", &params(0)).volume, 1.0);
    }

    #[test]
    fn calibrated_volumes_are_halved() {
        let req = resolve_voice_config("en", &params(0)); // us1
        assert!((req.volume - 1.658 * 0.5).abs() < 1e-9);
    }

    #[test]
    fn speed_and_pitch_pass_through() {
        let req = resolve_voice_config("es", &params(1));
        assert_eq!(req.speed, 120);
        assert_eq!(req.pitch, 50);
    }

    // ── WAV header fix ──────────────────────────────────────────────────────

    fn bogus_wav(data_len: usize) -> Vec<u8> {
        // 44-byte canonical header with wrong size fields, then `data_len`
        // bytes of PCM.
        let mut wav = Vec::with_capacity(44 + data_len);
        wav.extend_from_slice(b"RIFF");
        wav.extend_from_slice(&0xFFFF_FFFFu32.to_le_bytes());
        wav.extend_from_slice(b"WAVE");
        wav.extend_from_slice(b"fmt ");
        wav.extend_from_slice(&16u32.to_le_bytes());
        wav.extend_from_slice(&[0u8; 16]);
        wav.extend_from_slice(b"data");
        wav.extend_from_slice(&0u32.to_le_bytes());
        wav.extend_from_slice(&vec![0u8; data_len]);
        wav
    }

    #[test]
    fn header_sizes_are_rewritten() {
        let fixed = fix_wav_header(bogus_wav(100));
        let total = fixed.len() as u32;
        assert_eq!(&fixed[4..8], &(total - 8).to_le_bytes());
        assert_eq!(&fixed[40..44], &(total - 44).to_le_bytes());
        // Everything else untouched.
        assert_eq!(&fixed[0..4], b"RIFF");
        assert_eq!(&fixed[8..12], b"WAVE");
        assert_eq!(&fixed[44..], &bogus_wav(100)[44..]);
    }

    #[test]
    fn header_fix_is_idempotent() {
        let once = fix_wav_header(bogus_wav(64));
        let twice = fix_wav_header(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn undersized_input_is_out_of_contract_and_unchanged() {
        let stub = vec![1u8, 2, 3];
        assert_eq!(fix_wav_header(stub.clone()), stub);
    }

    // ── normalize / denormalize ─────────────────────────────────────────────

    struct NoopResampler;
    impl Resampler for NoopResampler {
        fn resample(&self, samples: &[f32], _: u32, _: u32) -> Result<Vec<f32>> {
            Ok(samples.to_vec())
        }
    }

    /// Records calls; answers every stage with fixed canned output.
    #[derive(Default)]
    struct ScriptedSynth {
        calls: AtomicUsize,
        pho: String,
        wav: Vec<u8>,
    }

    impl Synthesizer for ScriptedSynth {
        async fn text_to_phonemes(&self, _: &str, _: &EngineRequest) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.pho.clone())
        }
        async fn phonemes_to_wav(&self, _: &str, _: &EngineRequest) -> Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.wav.clone())
        }
        async fn text_to_wav(&self, _: &str, _: &EngineRequest) -> Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.wav.clone())
        }
    }

    #[test]
    fn roundtrip_preserves_rate_and_shape() {
        let samples: Vec<f32> = (0..1600).map(|i| (i as f32 / 1600.0) * 0.5).collect();
        let wav = denormalize(&samples, CANONICAL_RATE).unwrap();

        let renderer = AudioRenderer::with_resampler(
            ScriptedSynth::default(),
            Box::new(NoopResampler),
        );
        let (rate, decoded) = renderer.normalize(&wav).unwrap();
        assert_eq!(rate, CANONICAL_RATE);
        assert_eq!(decoded.len(), samples.len());
        // Quantization is lossy but monotonic scaling is preserved.
        for (a, b) in samples.iter().zip(&decoded) {
            assert!((a - b).abs() < 1.0 / 32768.0 + 1e-6, "{} vs {}", a, b);
        }
    }

    #[test]
    fn non_canonical_rate_goes_through_the_resampler() {
        struct MarkerResampler;
        impl Resampler for MarkerResampler {
            fn resample(&self, _: &[f32], from: u32, to: u32) -> Result<Vec<f32>> {
                assert_eq!(from, 8000);
                assert_eq!(to, CANONICAL_RATE);
                Ok(vec![0.25; 7])
            }
        }

        let wav = denormalize(&[0.0; 100], 8000).unwrap();
        let renderer = AudioRenderer::with_resampler(
            ScriptedSynth::default(),
            Box::new(MarkerResampler),
        );
        let (rate, samples) = renderer.normalize(&wav).unwrap();
        assert_eq!(rate, CANONICAL_RATE);
        assert_eq!(samples, vec![0.25; 7]);
    }

    // ── Pipeline orchestration ──────────────────────────────────────────────

    #[tokio::test]
    async fn text_to_audio_repairs_the_header() {
        let synth = ScriptedSynth { wav: bogus_wav(32), ..Default::default() };
        let renderer = AudioRenderer::new(synth);
        let out = renderer.text_to_audio("hello", "en", &params(0)).await.unwrap();
        let total = out.len() as u32;
        assert_eq!(&out[4..8], &(total - 8).to_le_bytes());
        assert_eq!(&out[40..44], &(total - 44).to_le_bytes());
    }

    #[tokio::test]
    async fn text_to_phonemes_parses_the_listing() {
        let synth = ScriptedSynth {
            pho: "b 103\ni 450 0 309 100 309\n".to_string(),
            ..Default::default()
        };
        let renderer = AudioRenderer::new(synth);
        let list = renderer.text_to_phonemes("beep", "en", &params(0)).await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.total_duration_ms(), 553);
    }
}
