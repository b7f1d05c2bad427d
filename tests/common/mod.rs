#![allow(dead_code)] // each test binary uses a different slice of this

//! Shared scripted tone generator for the integration tests.
//!
//! `TestSynth` stands in for a real voice engine: it hands out integer voice
//! ids, records every call the manager makes, and lets a test decide how
//! many voices (and in which polyphony groups) each note-on creates.

use voicepool::manager::VoiceManager;
use voicepool::responder::{
    MonoResponder, Responder, VoiceBeginEntry, VoiceInitEntry, VoiceInitInstruction,
};
use voicepool::Config;

pub type VoiceId = u32;

/// A launched voice, with the coordinates it was created at.
#[derive(Debug, Clone, Copy)]
pub struct LaunchedVoice {
    pub id: VoiceId,
    pub port: i16,
    pub channel: i16,
    pub key: i16,
    pub note_id: i32,
    pub velocity: f32,
}

#[derive(Default)]
pub struct TestSynth {
    next_voice: VoiceId,
    /// Polyphony groups declared per note-on; one voice per entry.
    pub plan: Vec<u64>,
    pub launched: Vec<LaunchedVoice>,
    pub terminated: Vec<VoiceId>,
    pub released: Vec<(VoiceId, f32)>,
    pub retriggered: Vec<(VoiceId, i32, f32)>,
    pub open_transactions: usize,
    pub expressions: Vec<(VoiceId, i32, f64)>,
    pub poly_mods: Vec<(VoiceId, u32, f64)>,
    pub aftertouch: Vec<(VoiceId, u8)>,
    pub mpe_bends: Vec<(VoiceId, u16)>,
    pub mpe_pressures: Vec<(VoiceId, u8)>,
    pub mpe_timbres: Vec<(VoiceId, u8)>,
}

impl TestSynth {
    pub fn new() -> Self {
        Self {
            plan: vec![0],
            ..Self::default()
        }
    }

    /// Ids of every voice launched at `key`, oldest first.
    pub fn voices_at_key(&self, key: i16) -> Vec<VoiceId> {
        self.launched
            .iter()
            .filter(|v| v.key == key)
            .map(|v| v.id)
            .collect()
    }

    pub fn voice_with_note_id(&self, note_id: i32) -> Option<LaunchedVoice> {
        self.launched.iter().copied().find(|v| v.note_id == note_id)
    }
}

impl Responder for TestSynth {
    type Voice = VoiceId;

    fn begin_voice_creation_transaction(
        &mut self,
        entries: &mut [VoiceBeginEntry],
        _port: i16,
        _channel: i16,
        _key: i16,
        _note_id: i32,
        _velocity: f32,
    ) -> usize {
        self.open_transactions += 1;
        let count = self.plan.len().min(entries.len());
        for (entry, group) in entries.iter_mut().zip(&self.plan) {
            entry.poly_group = *group;
        }
        count
    }

    fn initialize_multiple_voices(
        &mut self,
        count: usize,
        instructions: &[VoiceInitInstruction],
        out: &mut [VoiceInitEntry<VoiceId>],
        port: i16,
        channel: i16,
        key: i16,
        note_id: i32,
        velocity: f32,
        _retune: f32,
    ) -> usize {
        let mut started = 0;
        for i in 0..count {
            if instructions[i] == VoiceInitInstruction::Skip {
                out[i].voice = None;
                continue;
            }
            self.next_voice += 1;
            let id = self.next_voice;
            out[i].voice = Some(id);
            self.launched.push(LaunchedVoice {
                id,
                port,
                channel,
                key,
                note_id,
                velocity,
            });
            started += 1;
        }
        started
    }

    fn end_voice_creation_transaction(
        &mut self,
        _port: i16,
        _channel: i16,
        _key: i16,
        _note_id: i32,
        _velocity: f32,
    ) {
        assert!(self.open_transactions > 0, "end without begin");
        self.open_transactions -= 1;
    }

    fn retrigger_voice_with_new_note_id(&mut self, voice: VoiceId, note_id: i32, velocity: f32) {
        self.retriggered.push((voice, note_id, velocity));
    }

    fn move_voice(&mut self, _voice: VoiceId, _port: i16, _channel: i16, _key: i16, _velocity: f32) {
    }

    fn move_and_retrigger_voice(
        &mut self,
        _voice: VoiceId,
        _port: i16,
        _channel: i16,
        _key: i16,
        _velocity: f32,
    ) {
    }

    fn terminate_voice(&mut self, voice: VoiceId) {
        self.terminated.push(voice);
    }

    fn release_voice(&mut self, voice: VoiceId, velocity: f32) {
        self.released.push((voice, velocity));
    }

    fn set_note_expression(&mut self, voice: VoiceId, expression: i32, value: f64) {
        self.expressions.push((voice, expression, value));
    }

    fn set_voice_polyphonic_parameter_modulation(
        &mut self,
        voice: VoiceId,
        parameter: u32,
        value: f64,
    ) {
        self.poly_mods.push((voice, parameter, value));
    }

    fn set_voice_monophonic_parameter_modulation(
        &mut self,
        _voice: VoiceId,
        _parameter: u32,
        _value: f64,
    ) {
    }

    fn set_polyphonic_aftertouch(&mut self, voice: VoiceId, value: u8) {
        self.aftertouch.push((voice, value));
    }

    fn set_voice_midi_mpe_channel_pitch_bend(&mut self, voice: VoiceId, pb14: u16) {
        self.mpe_bends.push((voice, pb14));
    }

    fn set_voice_midi_mpe_channel_pressure(&mut self, voice: VoiceId, value: u8) {
        self.mpe_pressures.push((voice, value));
    }

    fn set_voice_midi_mpe_timbre(&mut self, voice: VoiceId, value: u8) {
        self.mpe_timbres.push((voice, value));
    }
}

/// Records every channel-wide broadcast.
#[derive(Default)]
pub struct ChannelLog {
    pub pitch_bends: Vec<(i16, u16)>,
    pub pressures: Vec<(i16, u8)>,
    pub ccs: Vec<(i16, u8, u8)>,
}

impl MonoResponder for ChannelLog {
    fn set_midi_pitch_bend(&mut self, channel: i16, pb14: u16) {
        self.pitch_bends.push((channel, pb14));
    }

    fn set_midi_channel_pressure(&mut self, channel: i16, value: u8) {
        self.pressures.push((channel, value));
    }

    fn set_midi_1_cc(&mut self, channel: i16, cc: u8, value: u8) {
        self.ccs.push((channel, cc, value));
    }
}

pub type TestManager = VoiceManager<TestSynth, ChannelLog>;

pub fn manager(max_voices: usize) -> TestManager {
    let config = Config {
        max_voices,
        ..Config::default()
    };
    VoiceManager::new(config, TestSynth::new(), ChannelLog::default())
}

/// Simulate the release tails ending: every voice the synth has released is
/// reported back as finished.
pub fn finish_released(vm: &mut TestManager) {
    let ended: Vec<VoiceId> = vm.responder_mut().released.drain(..).map(|(v, _)| v).collect();
    for voice in ended {
        vm.voice_ended(voice);
    }
}
