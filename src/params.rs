//! Deterministic parameter derivation from an identity fingerprint.
//!
//! Every connected user carries an opaque identity fingerprint (a hash
//! of their session cookie).  A handful of its bytes deterministically
//! pick the user's synthesis voice and their cosmetic identity — same
//! fingerprint, same voice, every session.  Pure functions, no stored
//! state, no randomness.

/// Number of entries in the external display-name table the default
/// deployment ships with.  Callers with a different table pass their
/// own count to [`PokeParameters::from_fingerprint`].
pub const DEFAULT_POKEMON_COUNT: u16 = 721;

/// Opaque per-identity byte sequence.  At least 6 bytes; only the
/// positions consumed below are interpreted.
pub type Fingerprint = [u8];

// ─────────────────────────────────────────────────────────────────────────────
// Voice parameters
// ─────────────────────────────────────────────────────────────────────────────

/// Synthesis-engine addressing derived once per identity and reused for
/// every subsequent call in the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceParameters {
    /// Speaking rate, words per minute. Always in 90..=169.
    pub speed: u8,
    /// Base pitch. Always in 0..=99.
    pub pitch: u8,
    /// Raw voice selector; reduced modulo the per-language voice table.
    pub voice_id: u8,
}

impl VoiceParameters {
    pub fn from_fingerprint(fingerprint: &Fingerprint) -> Self {
        Self {
            speed: (fingerprint[5] % 80) + 90,
            pitch: fingerprint[0] % 100,
            voice_id: fingerprint[1],
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Poke parameters
// ─────────────────────────────────────────────────────────────────────────────

/// Cosmetic identity: a display color and a 1-based index into the
/// external name table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PokeParameters {
    /// Lowercase `#rrggbb`.
    pub color: String,
    /// 1-based index, always in `1..=pokemon_count`.
    pub poke_id: u16,
}

impl PokeParameters {
    pub fn from_fingerprint(fingerprint: &Fingerprint, pokemon_count: u16) -> Self {
        let (r, g, b) = hsv_to_rgb(fingerprint[4] as f64 / 255.0, 0.8, 0.9);
        let id = (fingerprint[2] as u16) | ((fingerprint[3] as u16) << 8);
        Self {
            color: format!("#{:02x}{:02x}{:02x}", r, g, b),
            poke_id: id % pokemon_count + 1,
        }
    }
}

/// HSV → RGB with h, s, v in [0, 1], channels scaled to 0..=255.
fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (u8, u8, u8) {
    let i = (h * 6.0).floor();
    let f = h * 6.0 - i;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    let (r, g, b) = match (i as i64).rem_euclid(6) {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };

    ((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voice_derivation_is_deterministic() {
        let fp = [17u8, 42, 3, 200, 128, 77];
        assert_eq!(
            VoiceParameters::from_fingerprint(&fp),
            VoiceParameters::from_fingerprint(&fp)
        );
    }

    #[test]
    fn voice_fields_match_formulas() {
        let fp = [17u8, 42, 3, 200, 128, 77];
        let v = VoiceParameters::from_fingerprint(&fp);
        assert_eq!(v.speed, (77 % 80) + 90);
        assert_eq!(v.pitch, 17 % 100);
        assert_eq!(v.voice_id, 42);
    }

    #[test]
    fn voice_bounds_hold_for_all_byte_values() {
        for b in 0..=255u8 {
            let fp = [b, b, b, b, b, b];
            let v = VoiceParameters::from_fingerprint(&fp);
            assert!((90..=169).contains(&v.speed), "speed {} for byte {}", v.speed, b);
            assert!(v.pitch <= 99, "pitch {} for byte {}", v.pitch, b);
        }
    }

    #[test]
    fn poke_id_is_one_based_and_bounded() {
        for &(b2, b3) in &[(0u8, 0u8), (255, 255), (1, 0), (0, 1), (208, 2)] {
            let fp = [0u8, 0, b2, b3, 0, 0];
            let p = PokeParameters::from_fingerprint(&fp, DEFAULT_POKEMON_COUNT);
            assert!(
                (1..=DEFAULT_POKEMON_COUNT).contains(&p.poke_id),
                "poke_id {} out of range for bytes ({}, {})",
                p.poke_id,
                b2,
                b3
            );
        }
        // byte 2 is the low byte, byte 3 the high byte
        let fp = [0u8, 0, 5, 1, 0, 0];
        let p = PokeParameters::from_fingerprint(&fp, DEFAULT_POKEMON_COUNT);
        assert_eq!(p.poke_id, (5 + 256) % DEFAULT_POKEMON_COUNT + 1);
    }

    #[test]
    fn color_is_lowercase_hex() {
        let fp = [0u8, 0, 0, 0, 128, 0];
        let p = PokeParameters::from_fingerprint(&fp, DEFAULT_POKEMON_COUNT);
        assert_eq!(p.color.len(), 7);
        assert!(p.color.starts_with('#'));
        assert!(p.color[1..].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn hsv_red_corner() {
        // h = 0, s = 0.8, v = 0.9 → r = 0.9, g = b = 0.9 * 0.2
        let (r, g, b) = hsv_to_rgb(0.0, 0.8, 0.9);
        assert_eq!(r, 229);
        assert_eq!(g, 45);
        assert_eq!(b, 45);
    }
}
