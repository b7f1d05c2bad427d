#[cfg(feature = "rtrb")]
use rtrb::Consumer;

/// One musical event, fully addressed.
///
/// `port`, `channel`, and `key` follow the MIDI convention; `note_id` is a
/// host-assigned serial for per-note addressing, with `-1` meaning "no
/// specific id" (a plain MIDI1-style event). A `-1` in any coordinate of a
/// note-off or modulation event acts as a wildcard.
#[derive(Debug, Clone, Copy)]
pub enum VoiceEvent {
    NoteOn {
        port: i16,
        channel: i16,
        key: i16,
        note_id: i32,
        velocity: f32,
        retune: f32,
    },
    NoteOff {
        port: i16,
        channel: i16,
        key: i16,
        note_id: i32,
        velocity: f32,
    },
    SustainPedal {
        port: i16,
        channel: i16,
        level: u8,
    },
    PitchBend {
        port: i16,
        channel: i16,
        /// Raw 14-bit value, 8192 = center.
        value: u16,
    },
    ChannelPressure {
        port: i16,
        channel: i16,
        value: u8,
    },
    ControlChange {
        port: i16,
        channel: i16,
        cc: u8,
        value: u8,
    },
    PolyphonicAftertouch {
        port: i16,
        channel: i16,
        key: i16,
        value: u8,
    },
    NoteExpression {
        port: i16,
        channel: i16,
        key: i16,
        note_id: i32,
        expression: i32,
        value: f64,
    },
    PolyphonicModulation {
        port: i16,
        channel: i16,
        key: i16,
        note_id: i32,
        parameter: u32,
        value: f64,
    },
}

/// Source of events for [`VoiceManager::drain_events`].
///
/// [`VoiceManager::drain_events`]: crate::manager::VoiceManager::drain_events
pub trait EventReceiver {
    fn pop(&mut self) -> Option<VoiceEvent>;
}

#[cfg(feature = "rtrb")]
impl EventReceiver for Consumer<VoiceEvent> {
    fn pop(&mut self) -> Option<VoiceEvent> {
        Consumer::pop(self).ok()
    }
}
