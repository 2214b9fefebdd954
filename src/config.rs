//! Runtime configuration.
//!
//! Both structs deserialize from JSON and carry deployment defaults, so
//! a bare `Default::default()` works out of the box on a machine with
//! the distro espeak/mbrola packages installed.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::Result;

/// Read and parse one JSON config file.
fn from_json_file<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

// ─────────────────────────────────────────────────────────────────────────────
// Flood detection
// ─────────────────────────────────────────────────────────────────────────────

/// Tuning for the per-user flood detector.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct FloodConfig {
    /// Width of the sliding detection window, in seconds.
    pub detection_window_secs: u64,
    /// Sustained rate above which a user is flooding.
    pub msgs_per_sec: u32,
    /// How long the "has been warned" flag stays set, in seconds.
    pub warning_timeout_secs: u64,
}

impl Default for FloodConfig {
    fn default() -> Self {
        Self { detection_window_secs: 10, msgs_per_sec: 2, warning_timeout_secs: 30 }
    }
}

impl FloodConfig {
    /// Load from a JSON file; absent fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        from_json_file(path)
    }

    pub fn detection_window(&self) -> Duration {
        Duration::from_secs(self.detection_window_secs)
    }

    pub fn warning_timeout(&self) -> Duration {
        Duration::from_secs(self.warning_timeout_secs)
    }

    /// Message count above which the window is considered a flood.
    pub fn max_messages_in_window(&self) -> usize {
        (self.msgs_per_sec as u64 * self.detection_window_secs) as usize
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Synthesis back ends
// ─────────────────────────────────────────────────────────────────────────────

/// Locations of the external synthesis binaries and voice databases.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    /// Path to the espeak binary (articulation stage).
    pub espeak_bin: PathBuf,
    /// Path to the mbrola binary (audio stage).
    pub mbrola_bin: PathBuf,
    /// Directory holding the mbrola voice databases
    /// (`<voices_dir>/fr1/fr1`, …).
    pub voices_dir: PathBuf,
}

impl SynthConfig {
    /// Load from a JSON file; absent fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        from_json_file(path)
    }
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            espeak_bin: PathBuf::from("espeak"),
            mbrola_bin: PathBuf::from("mbrola"),
            voices_dir: PathBuf::from("/usr/share/mbrola"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flood_defaults_parse_from_empty_json() {
        let cfg: FloodConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.detection_window_secs, 10);
        assert_eq!(cfg.max_messages_in_window(), 20);
    }

    #[test]
    fn flood_overrides() {
        let cfg: FloodConfig =
            serde_json::from_str(r#"{"msgs_per_sec": 3, "detection_window_secs": 5}"#).unwrap();
        assert_eq!(cfg.max_messages_in_window(), 15);
        assert_eq!(cfg.warning_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn synth_defaults() {
        let cfg = SynthConfig::default();
        assert_eq!(cfg.espeak_bin, PathBuf::from("espeak"));
        assert_eq!(cfg.voices_dir, PathBuf::from("/usr/share/mbrola"));
    }

    #[test]
    fn flood_config_loads_from_a_json_file() {
        let path = std::env::temp_dir().join("chanvox_flood_config_test.json");
        fs::write(&path, r#"{"warning_timeout_secs": 60}"#).unwrap();

        let cfg = FloodConfig::from_json_file(&path).unwrap();
        assert_eq!(cfg.warning_timeout(), Duration::from_secs(60));
        // Unset fields fall back to defaults.
        assert_eq!(cfg.detection_window_secs, 10);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_config_file_is_an_io_error() {
        let err = SynthConfig::from_json_file(Path::new("/nonexistent/chanvox.json"))
            .unwrap_err();
        assert!(matches!(err, crate::error::ChanvoxError::Io(_)));
    }
}
