use std::collections::HashMap;
use std::ops::BitOr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Voice-handling discipline of one polyphony group.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayMode {
    /// Full polyphony up to the group's voice limit.
    #[default]
    PolyVoices,
    /// One sounding note per group; a new note silences the previous one.
    MonoNotes,
}

/// Which voice loses when a group needs room.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StealingPriority {
    /// Steal the voice allocated longest ago.
    #[default]
    Oldest,
    /// Steal the highest key.
    Highest,
    /// Steal the lowest key.
    Lowest,
}

/// Bitset of monophonic-mode behaviors.
///
/// At most one of the `ON_RELEASE_TO_*` bits should be set; `NONE` disables
/// the retrigger entirely, so a mono release behaves as a plain stop.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MonoFeatures(u64);

impl MonoFeatures {
    pub const NONE: Self = Self(0);
    /// After a release, fall back to the most recently pressed held key.
    pub const ON_RELEASE_TO_LATEST: Self = Self(1);
    /// After a release, fall back to the highest held key.
    pub const ON_RELEASE_TO_HIGHEST: Self = Self(1 << 1);
    /// After a release, fall back to the lowest held key.
    pub const ON_RELEASE_TO_LOWEST: Self = Self(1 << 2);

    pub fn contains(self, flag: Self) -> bool {
        self.0 & flag.0 != 0
    }
}

impl BitOr for MonoFeatures {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Per-group configuration plus the live used-voice count.
#[derive(Debug, Clone, Copy)]
pub(crate) struct GroupState {
    pub voice_limit: usize,
    pub used_voices: usize,
    pub play_mode: PlayMode,
    pub mono_features: MonoFeatures,
    pub stealing_priority: StealingPriority,
}

impl GroupState {
    fn new(voice_limit: usize) -> Self {
        Self {
            voice_limit,
            used_voices: 0,
            play_mode: PlayMode::default(),
            mono_features: MonoFeatures::NONE,
            stealing_priority: StealingPriority::default(),
        }
    }
}

/// Registry of polyphony groups, created lazily on first reference with
/// default configuration. Group 0 exists from construction, and the map is
/// pre-sized so touching a new group during performance does not reallocate
/// in the common case.
pub(crate) struct GroupRegistry {
    groups: HashMap<u64, GroupState>,
    max_voices: usize,
    total_used: usize,
}

impl GroupRegistry {
    pub fn new(max_voices: usize) -> Self {
        let mut groups = HashMap::with_capacity(16);
        groups.insert(0, GroupState::new(max_voices));
        Self {
            groups,
            max_voices,
            total_used: 0,
        }
    }

    pub fn guarantee(&mut self, id: u64) {
        let limit = self.max_voices;
        self.groups.entry(id).or_insert_with(|| GroupState::new(limit));
    }

    fn state_mut(&mut self, id: u64) -> &mut GroupState {
        let limit = self.max_voices;
        self.groups.entry(id).or_insert_with(|| GroupState::new(limit))
    }

    pub fn play_mode(&mut self, id: u64) -> PlayMode {
        self.state_mut(id).play_mode
    }

    pub fn mono_features(&mut self, id: u64) -> MonoFeatures {
        self.state_mut(id).mono_features
    }

    pub fn stealing_priority(&mut self, id: u64) -> StealingPriority {
        self.state_mut(id).stealing_priority
    }

    pub fn voice_limit(&mut self, id: u64) -> usize {
        self.state_mut(id).voice_limit
    }

    pub fn used_voices(&mut self, id: u64) -> usize {
        self.state_mut(id).used_voices
    }

    pub fn total_used(&self) -> usize {
        self.total_used
    }

    pub fn set_voice_limit(&mut self, id: u64, limit: usize) {
        // Reducing the limit below used_voices is legal; nothing is
        // terminated until the next allocation needs the room.
        self.state_mut(id).voice_limit = limit;
    }

    pub fn set_play_mode(&mut self, id: u64, mode: PlayMode, features: MonoFeatures) {
        let state = self.state_mut(id);
        state.play_mode = mode;
        state.mono_features = features;
    }

    pub fn set_stealing_priority(&mut self, id: u64, priority: StealingPriority) {
        self.state_mut(id).stealing_priority = priority;
    }

    pub fn note_voice_started(&mut self, id: u64) {
        self.state_mut(id).used_voices += 1;
        self.total_used += 1;
    }

    pub fn note_voice_ended(&mut self, id: u64) {
        debug_assert!(self.total_used > 0);
        let state = self.state_mut(id);
        debug_assert!(state.used_voices > 0, "voice ended in empty group {id}");
        state.used_voices = state.used_voices.saturating_sub(1);
        self.total_used = self.total_used.saturating_sub(1);
    }
}
