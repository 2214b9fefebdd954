//! The external synthesis engine, behind a trait seam.
//!
//! The engine is a pair of black-box processes: `espeak` turns text
//! into mbrola phoneme syntax (articulation stage), `mbrola` turns
//! phoneme syntax into raw PCM WAV bytes (audio stage).  One subprocess
//! is in flight per call; awaiting its completion is the suspension
//! point.  Failures surface unchanged — retry policy belongs to the
//! caller.
//!
//! Both binaries are invoked with argument vectors, never through a
//! shell, so user text is passed as a single inert argument.

use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::config::SynthConfig;
use crate::error::{ChanvoxError, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Engine addressing
// ─────────────────────────────────────────────────────────────────────────────

/// Fully resolved addressing for one synthesis invocation: which voice
/// database, which espeak variant, and how loud.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineRequest {
    /// Engine language code (`fr`, `us`, `es`, `de`).
    pub lang: &'static str,
    /// mbrola voice database number.
    pub voice: u8,
    /// espeak voice variant selector.
    pub sex: u8,
    /// mbrola volume multiplier.
    pub volume: f64,
    /// Speaking rate, words per minute.
    pub speed: u8,
    /// Base pitch, 0..=99.
    pub pitch: u8,
}

// ─────────────────────────────────────────────────────────────────────────────
// Synthesizer trait
// ─────────────────────────────────────────────────────────────────────────────

/// The external synthesis collaborator.  Implemented by
/// [`EspeakMbrola`] in production and by scripted stand-ins in tests.
#[allow(async_fn_in_trait)]
pub trait Synthesizer {
    /// Articulation stage: text → textual mbrola phoneme listing.
    async fn text_to_phonemes(&self, text: &str, req: &EngineRequest) -> Result<String>;

    /// Audio stage: phoneme listing → raw WAV bytes.
    async fn phonemes_to_wav(&self, pho: &str, req: &EngineRequest) -> Result<Vec<u8>>;

    /// Both stages chained: text → raw WAV bytes.
    async fn text_to_wav(&self, text: &str, req: &EngineRequest) -> Result<Vec<u8>>;
}

// ─────────────────────────────────────────────────────────────────────────────
// espeak | mbrola pipeline
// ─────────────────────────────────────────────────────────────────────────────

/// Production synthesizer driving the espeak and mbrola binaries.
#[derive(Debug, Clone, Default)]
pub struct EspeakMbrola {
    config: SynthConfig,
}

impl EspeakMbrola {
    pub fn new(config: SynthConfig) -> Self {
        Self { config }
    }

    /// espeak argument vector for the articulation stage.
    fn espeak_args(req: &EngineRequest, text: &str) -> Vec<String> {
        vec![
            "-s".into(),
            req.speed.to_string(),
            "-p".into(),
            req.pitch.to_string(),
            "--pho".into(),
            "-q".into(),
            "-v".into(),
            format!("mb/mb-{}{}", req.lang, req.sex),
            text.to_string(),
        ]
    }

    /// mbrola argument vector for the audio stage; reads phonemes from
    /// stdin and writes WAV to stdout.
    fn mbrola_args(&self, req: &EngineRequest) -> Vec<String> {
        let db = format!("{}{}", req.lang, req.voice);
        let voice_path = self.config.voices_dir.join(&db).join(&db);
        vec![
            "-v".into(),
            req.volume.to_string(),
            "-e".into(),
            voice_path.to_string_lossy().into_owned(),
            "-".into(),
            "-.wav".into(),
        ]
    }

    async fn run_espeak(&self, text: &str, req: &EngineRequest) -> Result<String> {
        let args = Self::espeak_args(req, text);
        debug!(voice = %format!("mb-{}{}", req.lang, req.sex), "running espeak");
        let output = Command::new(&self.config.espeak_bin)
            .args(&args)
            .env("MALLOC_CHECK_", "0")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;
        let stdout = check_output("espeak", output)?;
        // SAMPA output is ASCII; anything else is replaced, not fatal.
        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }

    async fn run_mbrola(&self, pho: &str, req: &EngineRequest) -> Result<Vec<u8>> {
        let args = self.mbrola_args(req);
        debug!(db = %format!("{}{}", req.lang, req.voice), volume = req.volume, "running mbrola");
        let mut child = Command::new(&self.config.mbrola_bin)
            .args(&args)
            .env("MALLOC_CHECK_", "0")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(pho.as_bytes()).await?;
        }

        let output = child.wait_with_output().await?;
        check_output("mbrola", output)
    }
}

/// Surface a non-zero exit or empty stdout as a synthesis failure.
fn check_output(program: &'static str, output: std::process::Output) -> Result<Vec<u8>> {
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        warn!(program, status = %output.status, "synthesis process failed");
        return Err(ChanvoxError::SynthesisFailed { program, status: output.status, stderr });
    }
    if output.stdout.is_empty() {
        return Err(ChanvoxError::EmptySynthOutput { program });
    }
    Ok(output.stdout)
}

impl Synthesizer for EspeakMbrola {
    async fn text_to_phonemes(&self, text: &str, req: &EngineRequest) -> Result<String> {
        self.run_espeak(text, req).await
    }

    async fn phonemes_to_wav(&self, pho: &str, req: &EngineRequest) -> Result<Vec<u8>> {
        self.run_mbrola(pho, req).await
    }

    async fn text_to_wav(&self, text: &str, req: &EngineRequest) -> Result<Vec<u8>> {
        let pho = self.run_espeak(text, req).await?;
        self.run_mbrola(&pho, req).await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> EngineRequest {
        EngineRequest { lang: "fr", voice: 2, sex: 4, volume: 0.804255, speed: 120, pitch: 42 }
    }

    #[test]
    fn espeak_args_address_the_mbrola_variant() {
        let args = EspeakMbrola::espeak_args(&request(), "bonjour tout le monde");
        assert_eq!(
            args,
            [
                "-s", "120", "-p", "42", "--pho", "-q", "-v", "mb/mb-fr4",
                "bonjour tout le monde"
            ]
        );
    }

    #[test]
    fn text_is_a_single_inert_argument() {
        // Shell metacharacters stay inside one argv entry.
        let args = EspeakMbrola::espeak_args(&request(), "hello; rm -rf $(oops)");
        assert_eq!(args.last().unwrap(), "hello; rm -rf $(oops)");
    }

    #[test]
    fn mbrola_args_point_at_the_voice_database() {
        let synth = EspeakMbrola::default();
        let args = synth.mbrola_args(&request());
        assert_eq!(
            args,
            ["-v", "0.804255", "-e", "/usr/share/mbrola/fr2/fr2", "-", "-.wav"]
        );
    }
}
