//! Phoneme data model and mbrola `.pho` (de)serialization.
//!
//! The articulation stage of the synthesis engine emits one phoneme per
//! line in mbrola syntax:
//!
//! ```text
//! symbol duration [pct pitch pct pitch ...]
//! ```
//!
//! where `duration` is in milliseconds and each optional `(pct, pitch)`
//! pair is a pitch-contour breakpoint at `pct` percent through the
//! phoneme.  [`PhonemList`] parses that listing and renders it back,
//! so a rewritten sequence can be fed straight into the audio stage.

use std::fmt;
use std::ops::{Index, Range};
use std::str::FromStr;

use crate::error::ChanvoxError;

// ─────────────────────────────────────────────────────────────────────────────
// Phonem
// ─────────────────────────────────────────────────────────────────────────────

/// A single articulation unit: symbol, duration and an optional pitch
/// contour.  Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phonem {
    symbol: String,
    duration_ms: u32,
    /// Breakpoints `(percent_through_phonem, pitch)`, percent in 0..=100.
    pitch_mods: Vec<(u8, u16)>,
}

impl Phonem {
    /// A phoneme with no pitch contour.
    pub fn new(symbol: impl Into<String>, duration_ms: u32) -> Self {
        Self { symbol: symbol.into(), duration_ms, pitch_mods: Vec::new() }
    }

    /// A phoneme with explicit pitch breakpoints.
    pub fn with_pitch(
        symbol: impl Into<String>,
        duration_ms: u32,
        pitch_mods: Vec<(u8, u16)>,
    ) -> Self {
        debug_assert!(pitch_mods.iter().all(|&(pct, _)| pct <= 100));
        Self { symbol: symbol.into(), duration_ms, pitch_mods }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    pub fn pitch_mods(&self) -> &[(u8, u16)] {
        &self.pitch_mods
    }
}

impl fmt::Display for Phonem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.symbol, self.duration_ms)?;
        for (pct, pitch) in &self.pitch_mods {
            write!(f, " {} {}", pct, pitch)?;
        }
        Ok(())
    }
}

impl FromStr for Phonem {
    type Err = ChanvoxError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let malformed = || ChanvoxError::PhonemParse { line: line.to_string() };

        let mut fields = line.split_whitespace();
        let symbol = fields.next().ok_or_else(malformed)?.to_string();
        let duration_ms: u32 =
            fields.next().ok_or_else(malformed)?.parse().map_err(|_| malformed())?;

        let rest: Vec<&str> = fields.collect();
        if rest.len() % 2 != 0 {
            return Err(malformed());
        }
        let mut pitch_mods = Vec::with_capacity(rest.len() / 2);
        for pair in rest.chunks_exact(2) {
            let pct: u8 = pair[0].parse().map_err(|_| malformed())?;
            let pitch: u16 = pair[1].parse().map_err(|_| malformed())?;
            if pct > 100 {
                return Err(malformed());
            }
            pitch_mods.push((pct, pitch));
        }

        Ok(Self { symbol, duration_ms, pitch_mods })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PhonemList
// ─────────────────────────────────────────────────────────────────────────────

/// Ordered sequence of [`Phonem`].
///
/// Appending preserves order; `Display`/`FromStr` round-trip the mbrola
/// line syntax.  A beep substituted for a span of this list keeps the
/// span's total spoken duration (see `censor`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhonemList(Vec<Phonem>);

impl PhonemList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, phonem: Phonem) {
        self.0.push(phonem);
    }

    pub fn extend(&mut self, other: PhonemList) {
        self.0.extend(other.0);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Phonem> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Phonem] {
        &self.0
    }

    /// All symbols concatenated with no separator — the form tag
    /// signatures are matched against.
    pub fn symbols_concat(&self) -> String {
        self.0.iter().map(|p| p.symbol.as_str()).collect()
    }

    /// Summed duration of every phoneme, in milliseconds.
    pub fn total_duration_ms(&self) -> u32 {
        self.0.iter().map(|p| p.duration_ms).sum()
    }
}

impl From<Vec<Phonem>> for PhonemList {
    fn from(phonems: Vec<Phonem>) -> Self {
        Self(phonems)
    }
}

impl FromIterator<Phonem> for PhonemList {
    fn from_iter<I: IntoIterator<Item = Phonem>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for PhonemList {
    type Item = Phonem;
    type IntoIter = std::vec::IntoIter<Phonem>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl Index<usize> for PhonemList {
    type Output = Phonem;

    fn index(&self, i: usize) -> &Phonem {
        &self.0[i]
    }
}

impl Index<Range<usize>> for PhonemList {
    type Output = [Phonem];

    fn index(&self, r: Range<usize>) -> &[Phonem] {
        &self.0[r]
    }
}

impl fmt::Display for PhonemList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for phonem in &self.0 {
            writeln!(f, "{}", phonem)?;
        }
        Ok(())
    }
}

impl FromStr for PhonemList {
    type Err = ChanvoxError;

    /// Parse an mbrola listing.  Blank lines and `;` comment lines are
    /// skipped; anything else must be a valid phoneme line.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with(';'))
            .map(Phonem::from_str)
            .collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
