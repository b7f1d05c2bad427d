pub mod io;
pub mod manager;
pub mod responder;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How a note-on for a key that is already sounding behaves.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepeatedKeyMode {
    /// Every note-on launches fresh voices, stacking with the old ones.
    #[default]
    MultiVoice,
    /// A repeated key retriggers the voices already sounding on it,
    /// piano style, instead of stacking.
    Piano,
}

/// Which MIDI 1.0 flavor drives the continuous-controller router.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Midi1Dialect {
    #[default]
    Midi1,
    Midi1Mpe,
}

/// Runtime configuration for a [`manager::VoiceManager`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Size of the voice slot table. Every scratch buffer is sized to this
    /// at construction so the event path never allocates.
    pub max_voices: usize,
    pub repeated_key_mode: RepeatedKeyMode,
    pub dialect: Midi1Dialect,
    /// The MPE global channel; only consulted when `dialect` is
    /// [`Midi1Dialect::Midi1Mpe`].
    pub mpe_global_channel: i16,
    /// The CC number carrying MPE timbre, conventionally 74.
    pub mpe_timbre_cc: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_voices: 64,
            repeated_key_mode: RepeatedKeyMode::default(),
            dialect: Midi1Dialect::default(),
            mpe_global_channel: 0,
            mpe_timbre_cc: 74,
        }
    }
}
