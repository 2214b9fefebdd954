//! Crate-wide error taxonomy.
//!
//! Only the paths that touch the outside world can fail: spawning the
//! synthesis processes, decoding their WAV output and resampling it, and
//! parsing the articulation stage's phoneme listing.  Parameter
//! derivation, flood tracking and effect-slot management are total
//! functions and have no variants here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChanvoxError {
    /// An external synthesis process exited abnormally.
    #[error("{program} exited with {status}: {stderr}")]
    SynthesisFailed {
        program: &'static str,
        status: std::process::ExitStatus,
        stderr: String,
    },

    /// The synthesis process succeeded but wrote nothing usable.
    #[error("{program} produced empty output")]
    EmptySynthOutput { program: &'static str },

    /// Spawning or talking to a subprocess failed.
    #[error("synthesis I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// WAV decode/encode failure in format normalization.
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    /// A line of mbrola phoneme syntax could not be parsed.
    #[error("malformed phoneme line: {line:?}")]
    PhonemParse { line: String },

    /// The sample-rate converter rejected the input.
    #[error("resampling failed: {0}")]
    Resample(String),

    /// A banned-word pattern failed to compile.
    #[error("invalid banned-word pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// A configuration file failed to parse.
    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ChanvoxError>;
