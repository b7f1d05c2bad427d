// Purpose: the seam between the voice manager and the tone generator.
// The manager never touches audio; it instructs a Responder which voices to
// create, retrigger, release, or kill, and pushes channel-wide controller
// state through a MonoResponder.

/// One entry of the begin-transaction working buffer. The responder fills
/// one of these per voice it wants to launch for a note-on, declaring the
/// polyphony group the voice will live in.
#[derive(Debug, Clone, Copy, Default)]
pub struct VoiceBeginEntry {
    pub poly_group: u64,
}

/// Per-entry instruction for [`Responder::initialize_multiple_voices`].
///
/// The manager forces `Skip` on entries outside the target group when it
/// relaunches a monophonic group after a release; everything else starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VoiceInitInstruction {
    #[default]
    Start,
    Skip,
}

/// One entry of the init working buffer; the responder writes the handle of
/// each voice it actually launched, leaving skipped or failed entries empty.
#[derive(Debug, Clone, Copy)]
pub struct VoiceInitEntry<V> {
    pub voice: Option<V>,
}

impl<V> Default for VoiceInitEntry<V> {
    fn default() -> Self {
        Self { voice: None }
    }
}

/// Per-voice operations a tone generator implements.
///
/// Every method is invoked from inside a manager operation on the event
/// thread. A responder must not call back into the
/// [`VoiceManager`](crate::manager::VoiceManager) from any of these methods;
/// natural voice completion is reported afterwards through
/// [`VoiceManager::voice_ended`](crate::manager::VoiceManager::voice_ended).
pub trait Responder {
    /// Opaque identity of one voice. The manager stores handles, compares
    /// them, and passes them back; it never looks inside.
    type Voice: Copy + PartialEq;

    /// Announce a note-on and ask how many voices it should create.
    ///
    /// The responder fills `entries[..n]` with the polyphony group of each
    /// voice it wants (voice stacking: one note-on may create several, e.g.
    /// across layers) and returns `n`. Returning 0 is a successful no-op.
    fn begin_voice_creation_transaction(
        &mut self,
        entries: &mut [VoiceBeginEntry],
        port: i16,
        channel: i16,
        key: i16,
        note_id: i32,
        velocity: f32,
    ) -> usize;

    /// Launch the voices declared by the matching begin call, honoring
    /// `Skip` instructions. For every voice actually started, the responder
    /// writes its handle into `out`; the return value is how many started.
    #[allow(clippy::too_many_arguments)]
    fn initialize_multiple_voices(
        &mut self,
        count: usize,
        instructions: &[VoiceInitInstruction],
        out: &mut [VoiceInitEntry<Self::Voice>],
        port: i16,
        channel: i16,
        key: i16,
        note_id: i32,
        velocity: f32,
        retune: f32,
    ) -> usize;

    /// Close the transaction opened by `begin_voice_creation_transaction`.
    fn end_voice_creation_transaction(
        &mut self,
        port: i16,
        channel: i16,
        key: i16,
        note_id: i32,
        velocity: f32,
    );

    /// Piano-mode retrigger of a still-sounding voice under a new note id.
    fn retrigger_voice_with_new_note_id(&mut self, voice: Self::Voice, note_id: i32, velocity: f32);

    /// Legato hook: migrate a sounding voice to a new key without
    /// retriggering its envelopes. The manager does not drive this yet.
    fn move_voice(&mut self, voice: Self::Voice, port: i16, channel: i16, key: i16, velocity: f32);

    /// Legato hook: migrate a sounding voice and retrigger it. The manager
    /// does not drive this yet.
    fn move_and_retrigger_voice(
        &mut self,
        voice: Self::Voice,
        port: i16,
        channel: i16,
        key: i16,
        velocity: f32,
    );

    /// Hard-stop a voice. The voice is dead when this returns; the manager
    /// reclaims its slot immediately after the call.
    fn terminate_voice(&mut self, voice: Self::Voice);

    /// Enter the release envelope. The voice keeps sounding (and keeps its
    /// slot) until the host reports completion via `voice_ended`.
    fn release_voice(&mut self, voice: Self::Voice, velocity: f32);

    fn set_note_expression(&mut self, voice: Self::Voice, expression: i32, value: f64);

    fn set_voice_polyphonic_parameter_modulation(
        &mut self,
        voice: Self::Voice,
        parameter: u32,
        value: f64,
    );

    /// Required hook for hosts with channel-wide parameter modulation; the
    /// manager does not route to it yet.
    fn set_voice_monophonic_parameter_modulation(
        &mut self,
        voice: Self::Voice,
        parameter: u32,
        value: f64,
    );

    fn set_polyphonic_aftertouch(&mut self, voice: Self::Voice, value: u8);

    fn set_voice_midi_mpe_channel_pitch_bend(&mut self, voice: Self::Voice, pb14: u16);
    fn set_voice_midi_mpe_channel_pressure(&mut self, voice: Self::Voice, value: u8);
    fn set_voice_midi_mpe_timbre(&mut self, voice: Self::Voice, value: u8);
}

/// Channel-wide broadcast operations for plain MIDI1 controller state.
///
/// A channel of `-1` means "no specific channel" (MPE global bend routes
/// this way).
pub trait MonoResponder {
    fn set_midi_pitch_bend(&mut self, channel: i16, pb14: u16);
    fn set_midi_channel_pressure(&mut self, channel: i16, value: u8);
    fn set_midi_1_cc(&mut self, channel: i16, cc: u8, value: u8);
}
