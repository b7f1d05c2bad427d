/// One cell of the fixed voice table.
///
/// `voice` is the ground truth of liveness: `None` means every other field
/// is leftovers from the previous occupant and must not be read.
#[derive(Debug, Clone, Copy)]
pub(crate) struct VoiceSlot<V> {
    pub voice: Option<V>,
    pub port: i16,
    pub channel: i16,
    pub key: i16,
    pub note_id: i32,
    pub poly_group: u64,
    /// Allocation serial; smaller means older.
    pub voice_counter: u64,
    /// Creation batch serial; voices launched by one note-on share it.
    pub transaction_id: u64,
    /// Physical key currently down.
    pub gated: bool,
    /// Physical key released, pedal holding the voice. Never true together
    /// with `gated`.
    pub gated_due_to_sustain: bool,
}

impl<V> VoiceSlot<V> {
    pub fn empty() -> Self {
        Self {
            voice: None,
            port: 0,
            channel: 0,
            key: 0,
            note_id: -1,
            poly_group: 0,
            voice_counter: 0,
            transaction_id: 0,
            gated: false,
            gated_due_to_sustain: false,
        }
    }

    /// Wildcard match against event coordinates: `-1` on either side matches
    /// anything in that position. Empty slots never match.
    pub fn matches(&self, port: i16, channel: i16, key: i16, note_id: i32) -> bool {
        self.voice.is_some()
            && (port == -1 || self.port == -1 || port == self.port)
            && (channel == -1 || self.channel == -1 || channel == self.channel)
            && (key == -1 || self.key == -1 || key == self.key)
            && (note_id == -1 || self.note_id == -1 || note_id == self.note_id)
    }

    /// Held either physically or by the sustain pedal.
    pub fn held(&self) -> bool {
        self.gated || self.gated_due_to_sustain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(port: i16, channel: i16, key: i16, note_id: i32) -> VoiceSlot<u32> {
        VoiceSlot {
            voice: Some(1),
            port,
            channel,
            key,
            note_id,
            ..VoiceSlot::empty()
        }
    }

    #[test]
    fn empty_slot_never_matches() {
        let s: VoiceSlot<u32> = VoiceSlot::empty();
        assert!(!s.matches(-1, -1, -1, -1));
    }

    #[test]
    fn exact_coordinates_match() {
        let s = slot(0, 1, 60, 173);
        assert!(s.matches(0, 1, 60, 173));
        assert!(!s.matches(0, 1, 61, 173));
        assert!(!s.matches(0, 2, 60, 173));
        assert!(!s.matches(0, 1, 60, 174));
    }

    #[test]
    fn wildcard_on_either_side_matches() {
        let s = slot(0, 1, 60, 173);
        assert!(s.matches(0, 1, 60, -1));
        assert!(s.matches(-1, -1, -1, -1));

        let unaddressed = slot(0, 1, 60, -1);
        assert!(unaddressed.matches(0, 1, 60, 99));
    }

    #[test]
    fn held_covers_both_gate_flavors() {
        let mut s = slot(0, 1, 60, -1);
        assert!(!s.held());
        s.gated = true;
        assert!(s.held());
        s.gated = false;
        s.gated_due_to_sustain = true;
        assert!(s.held());
    }
}
