//! Categorized, bounded storage for a user's active effects.
//!
//! Effects are opaque to this core — their behavior (pitch shifting,
//! text mangling, …) lives with the chat layer.  What the core owns is
//! the classification into five mutually exclusive capability
//! categories and the bounded FIFO per category: at most five active
//! effects of one kind, oldest evicted first.

use std::collections::VecDeque;

/// Active effects retained per capability category.
pub const MAX_EFFECTS_PER_CATEGORY: usize = 5;

// ─────────────────────────────────────────────────────────────────────────────
// Effect sum type
// ─────────────────────────────────────────────────────────────────────────────

/// The five mutually exclusive capability categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectCategory {
    /// Alters the rendered audio samples.
    Audio,
    /// Rewrites the text without the user seeing it.
    HiddenText,
    /// Rewrites the text visibly.
    ExplicitText,
    /// Rewrites the phoneme sequence.
    Phonemic,
    /// Alters the voice addressing itself.
    Voice,
}

impl EffectCategory {
    pub const ALL: [EffectCategory; 5] = [
        EffectCategory::Audio,
        EffectCategory::HiddenText,
        EffectCategory::ExplicitText,
        EffectCategory::Phonemic,
        EffectCategory::Voice,
    ];

    fn slot_index(self) -> usize {
        match self {
            EffectCategory::Audio => 0,
            EffectCategory::HiddenText => 1,
            EffectCategory::ExplicitText => 2,
            EffectCategory::Phonemic => 3,
            EffectCategory::Voice => 4,
        }
    }
}

/// An active effect: an opaque handle tagged with exactly one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Audio(String),
    HiddenText(String),
    ExplicitText(String),
    Phonemic(String),
    Voice(String),
}

impl Effect {
    pub fn category(&self) -> EffectCategory {
        match self {
            Effect::Audio(_) => EffectCategory::Audio,
            Effect::HiddenText(_) => EffectCategory::HiddenText,
            Effect::ExplicitText(_) => EffectCategory::ExplicitText,
            Effect::Phonemic(_) => EffectCategory::Phonemic,
            Effect::Voice(_) => EffectCategory::Voice,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Effect::Audio(n)
            | Effect::HiddenText(n)
            | Effect::ExplicitText(n)
            | Effect::Phonemic(n)
            | Effect::Voice(n) => n,
        }
    }
}

/// What gets handed to [`EffectSlots::add`]: a single effect, or a
/// composite group that is flattened into its constituents first.
#[derive(Debug, Clone)]
pub enum EffectInsert {
    Single(Effect),
    Group(Vec<Effect>),
}

impl EffectInsert {
    fn flatten(self) -> Vec<Effect> {
        match self {
            EffectInsert::Single(effect) => vec![effect],
            EffectInsert::Group(effects) => effects,
        }
    }
}

impl From<Effect> for EffectInsert {
    fn from(effect: Effect) -> Self {
        EffectInsert::Single(effect)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// EffectSlots
// ─────────────────────────────────────────────────────────────────────────────

/// Bounded per-category effect storage, insertion order = recency.
#[derive(Debug, Clone, Default)]
pub struct EffectSlots {
    slots: [VecDeque<Effect>; 5],
}

impl EffectSlots {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one effect or a flattened group.  A full category drops
    /// its oldest entry before taking the new one.
    pub fn add(&mut self, insert: impl Into<EffectInsert>) {
        for effect in insert.into().flatten() {
            let slot = &mut self.slots[effect.category().slot_index()];
            if slot.len() == MAX_EFFECTS_PER_CATEGORY {
                slot.pop_front();
            }
            slot.push_back(effect);
        }
    }

    /// Active effects of one category, oldest first.
    pub fn active(&self, category: EffectCategory) -> impl Iterator<Item = &Effect> {
        self.slots[category.slot_index()].iter()
    }

    pub fn count(&self, category: EffectCategory) -> usize {
        self.slots[category.slot_index()].len()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
