// Purpose: the voice-allocation and lifecycle state machine. Decides, per
// incoming event, which voices to create, retrigger, release, or kill,
// subject to per-group polyphony limits, play modes, stealing priorities,
// and sustain-pedal semantics. Audio itself is the Responder's problem.

pub mod groups;
mod keystate;
mod slots;
mod steal;

pub use self::groups::{MonoFeatures, PlayMode, StealingPriority};

use self::groups::GroupRegistry;
use self::keystate::KeyStateTable;
use self::slots::VoiceSlot;
use crate::io::events::{EventReceiver, VoiceEvent};
use crate::responder::{
    MonoResponder, Responder, VoiceBeginEntry, VoiceInitEntry, VoiceInitInstruction,
};
use crate::{Config, Midi1Dialect, RepeatedKeyMode};

const CHANNELS: usize = 16;
const CCS: usize = 128;

fn channel_index(channel: i16) -> Option<usize> {
    (0..CHANNELS as i16).contains(&channel).then_some(channel as usize)
}

/// The voice manager.
///
/// Sits between a stream of musical events and a bank of tone-generating
/// voices, owning the slot table, key-state table, and group registry. All
/// processing is synchronous and run-to-completion on the caller's thread;
/// the manager never spawns work, never blocks, and never allocates on the
/// event path (scratch buffers are sized to `max_voices` up front).
///
/// The responders are owned for the manager's lifetime and reachable through
/// [`responder`](Self::responder) / [`responder_mut`](Self::responder_mut).
pub struct VoiceManager<R: Responder, M: MonoResponder> {
    responder: R,
    mono_responder: M,
    config: Config,

    slots: Vec<VoiceSlot<R::Voice>>,
    groups: GroupRegistry,
    key_state: KeyStateTable,

    most_recent_voice_counter: u64,
    most_recent_transaction_id: u64,

    // Per-event scratch, fixed-size after construction.
    begin_buffer: Vec<VoiceBeginEntry>,
    init_buffer: Vec<VoiceInitEntry<R::Voice>>,
    instruction_buffer: Vec<VoiceInitInstruction>,
    created_by_group: Vec<(u64, usize)>,
    mono_groups: Vec<u64>,
    retrigger_groups: Vec<u64>,

    cc_cache: [[u8; CCS]; CHANNELS],
    /// Signed offset from bend center (raw value minus 8192).
    last_pb_by_channel: [i16; CHANNELS],
    sustain_on: bool,
}

impl<R: Responder, M: MonoResponder> VoiceManager<R, M> {
    pub fn new(config: Config, responder: R, mono_responder: M) -> Self {
        let n = config.max_voices;
        Self {
            responder,
            mono_responder,
            config,
            slots: (0..n).map(|_| VoiceSlot::empty()).collect(),
            groups: GroupRegistry::new(n),
            key_state: KeyStateTable::new(),
            most_recent_voice_counter: 1,
            most_recent_transaction_id: 1,
            begin_buffer: vec![VoiceBeginEntry::default(); n],
            init_buffer: (0..n).map(|_| VoiceInitEntry::default()).collect(),
            instruction_buffer: vec![VoiceInitInstruction::Start; n],
            created_by_group: Vec::with_capacity(n),
            mono_groups: Vec::with_capacity(n),
            retrigger_groups: Vec::with_capacity(n),
            cc_cache: [[0; CCS]; CHANNELS],
            last_pb_by_channel: [0; CHANNELS],
            sustain_on: false,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn responder(&self) -> &R {
        &self.responder
    }

    pub fn responder_mut(&mut self) -> &mut R {
        &mut self.responder
    }

    pub fn mono_responder(&self) -> &M {
        &self.mono_responder
    }

    pub fn mono_responder_mut(&mut self) -> &mut M {
        &mut self.mono_responder
    }

    /// Active voices, whether gated or fading out.
    pub fn voice_count(&self) -> usize {
        self.slots.iter().filter(|s| s.voice.is_some()).count()
    }

    /// Voices whose note is musically held, physically or by the pedal.
    pub fn gated_voice_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| s.voice.is_some() && s.held())
            .count()
    }

    // ---- configuration surface ----

    pub fn guarantee_group(&mut self, group: u64) {
        self.groups.guarantee(group);
    }

    pub fn set_polyphony_group_voice_limit(&mut self, group: u64, limit: usize) {
        self.groups.set_voice_limit(group, limit);
    }

    pub fn set_play_mode(&mut self, group: u64, mode: PlayMode, features: MonoFeatures) {
        self.groups.set_play_mode(group, mode, features);
    }

    pub fn set_stealing_priority_mode(&mut self, group: u64, priority: StealingPriority) {
        self.groups.set_stealing_priority(group, priority);
    }

    pub fn set_repeated_key_mode(&mut self, mode: RepeatedKeyMode) {
        self.config.repeated_key_mode = mode;
    }

    pub fn set_dialect(&mut self, dialect: Midi1Dialect) {
        self.config.dialect = dialect;
    }

    pub fn set_mpe_global_channel(&mut self, channel: i16) {
        self.config.mpe_global_channel = channel;
    }

    pub fn set_mpe_timbre_cc(&mut self, cc: u8) {
        self.config.mpe_timbre_cc = cc;
    }

    // ---- event ingestion ----

    /// Dispatch one event to the matching operation.
    pub fn handle_event(&mut self, event: VoiceEvent) {
        match event {
            VoiceEvent::NoteOn {
                port,
                channel,
                key,
                note_id,
                velocity,
                retune,
            } => {
                self.process_note_on(port, channel, key, note_id, velocity, retune);
            }
            VoiceEvent::NoteOff {
                port,
                channel,
                key,
                note_id,
                velocity,
            } => self.process_note_off(port, channel, key, note_id, velocity),
            VoiceEvent::SustainPedal {
                port,
                channel,
                level,
            } => self.update_sustain_pedal(port, channel, level),
            VoiceEvent::PitchBend {
                port,
                channel,
                value,
            } => self.route_midi_pitch_bend(port, channel, value),
            VoiceEvent::ChannelPressure {
                port,
                channel,
                value,
            } => self.route_channel_pressure(port, channel, value),
            VoiceEvent::ControlChange {
                port,
                channel,
                cc,
                value,
            } => self.route_midi1_cc(port, channel, cc, value),
            VoiceEvent::PolyphonicAftertouch {
                port,
                channel,
                key,
                value,
            } => self.route_polyphonic_aftertouch(port, channel, key, value),
            VoiceEvent::NoteExpression {
                port,
                channel,
                key,
                note_id,
                expression,
                value,
            } => self.route_note_expression(port, channel, key, note_id, expression, value),
            VoiceEvent::PolyphonicModulation {
                port,
                channel,
                key,
                note_id,
                parameter,
                value,
            } => {
                self.route_polyphonic_parameter_modulation(
                    port, channel, key, note_id, parameter, value,
                );
            }
        }
    }

    /// Pop and handle every queued event, in order.
    pub fn drain_events(&mut self, receiver: &mut impl EventReceiver) {
        while let Some(event) = receiver.pop() {
            self.handle_event(event);
        }
    }

    // ---- note on ----

    /// Run the note-on protocol. Returns whether the note sounded: at least
    /// one voice placed, a piano-mode retrigger, or a deliberately empty
    /// transaction.
    pub fn process_note_on(
        &mut self,
        port: i16,
        channel: i16,
        key: i16,
        note_id: i32,
        velocity: f32,
        retune: f32,
    ) -> bool {
        if self.config.repeated_key_mode == RepeatedKeyMode::Piano {
            // A repeated key retriggers whatever is sounding there, under
            // the incoming note id, rather than stacking a new voice.
            let mut any_retriggered = false;
            self.most_recent_transaction_id += 1;
            for slot in self.slots.iter_mut() {
                if !slot.matches(port, channel, key, -1) {
                    continue;
                }
                let Some(voice) = slot.voice else { continue };
                self.responder
                    .retrigger_voice_with_new_note_id(voice, note_id, velocity);
                slot.gated = true;
                slot.gated_due_to_sustain = false;
                self.most_recent_voice_counter += 1;
                slot.voice_counter = self.most_recent_voice_counter;
                slot.transaction_id = self.most_recent_transaction_id;
                any_retriggered = true;
            }
            if any_retriggered {
                return true;
            }
        }

        let to_launch = self.responder.begin_voice_creation_transaction(
            &mut self.begin_buffer,
            port,
            channel,
            key,
            note_id,
            velocity,
        );
        debug_assert!(to_launch <= self.slots.len());
        let to_launch = to_launch.min(self.slots.len());

        if to_launch == 0 {
            self.responder
                .end_voice_creation_transaction(port, channel, key, note_id, velocity);
            return true;
        }

        // Tally the batch per group and note which groups are monophonic.
        self.created_by_group.clear();
        self.mono_groups.clear();
        for i in 0..to_launch {
            let group = self.begin_buffer[i].poly_group;
            self.groups.guarantee(group);
            match self.created_by_group.iter_mut().find(|(g, _)| *g == group) {
                Some((_, count)) => *count += 1,
                None => self.created_by_group.push((group, 1)),
            }
            if self.groups.play_mode(group) == PlayMode::MonoNotes
                && !self.mono_groups.contains(&group)
            {
                self.mono_groups.push(group);
            }
        }

        // Poly stealing, one pass per batch entry.
        for i in 0..to_launch {
            let group = self.begin_buffer[i].poly_group;
            if self.groups.play_mode(group) == PlayMode::MonoNotes {
                continue;
            }

            let group_free = self
                .groups
                .voice_limit(group)
                .saturating_sub(self.groups.used_voices(group));
            let global_free = self.slots.len() - self.groups.total_used();
            let voices_free = group_free.min(global_free);
            let creating = self
                .created_by_group
                .iter()
                .find(|(g, _)| *g == group)
                .map(|(_, count)| *count)
                .unwrap_or(0);
            let mut to_steal = creating.saturating_sub(voices_free);
            // The group has budget but the table is full: allowed to take
            // from other groups.
            let cross_group = group_free > 0 && global_free == 0;

            let mut last_to_steal = to_steal + 1;
            while to_steal > 0 && to_steal != last_to_steal {
                last_to_steal = to_steal;
                let priority = self.groups.stealing_priority(group);
                let Some(victim_index) =
                    steal::find_stealable_slot(&self.slots, group, priority, cross_group)
                else {
                    continue;
                };
                let Some(victim_voice) = self.slots[victim_index].voice else {
                    continue;
                };
                let victim_tx = self.slots[victim_index].transaction_id;
                self.responder.terminate_voice(victim_voice);
                self.retire_voice(victim_voice);
                to_steal = to_steal.saturating_sub(1);

                // Voices launched by the same event are reaped together.
                for sibling in 0..self.slots.len() {
                    if self.slots[sibling].transaction_id != victim_tx {
                        continue;
                    }
                    let Some(sibling_voice) = self.slots[sibling].voice else {
                        continue;
                    };
                    self.responder.terminate_voice(sibling_voice);
                    self.retire_voice(sibling_voice);
                    to_steal = to_steal.saturating_sub(1);
                }
            }
        }

        // Mono stealing: a new note in a mono group silences the group.
        // TODO: drive move_voice here instead once legato semantics land.
        for gi in 0..self.mono_groups.len() {
            let group = self.mono_groups[gi];
            for index in 0..self.slots.len() {
                if self.slots[index].poly_group != group {
                    continue;
                }
                let Some(voice) = self.slots[index].voice else {
                    continue;
                };
                self.responder.terminate_voice(voice);
                self.retire_voice(voice);
            }
        }

        // New voices inherit the channel's controller snapshot.
        if let Some(ch) = channel_index(channel) {
            if self.last_pb_by_channel[ch] != 0 {
                self.mono_responder
                    .set_midi_pitch_bend(channel, (self.last_pb_by_channel[ch] + 8192) as u16);
            }
            for cc in 0..CCS {
                let value = self.cc_cache[ch][cc];
                if value != 0 {
                    self.mono_responder.set_midi_1_cc(channel, cc as u8, value);
                }
            }
        }

        for instruction in self.instruction_buffer[..to_launch].iter_mut() {
            *instruction = VoiceInitInstruction::Start;
        }
        for entry in self.init_buffer[..to_launch].iter_mut() {
            entry.voice = None;
        }
        let launched = self.responder.initialize_multiple_voices(
            to_launch,
            &self.instruction_buffer[..to_launch],
            &mut self.init_buffer[..to_launch],
            port,
            channel,
            key,
            note_id,
            velocity,
            retune,
        );

        if launched == 0 {
            // Not an error; the note just didn't sound.
            self.responder
                .end_voice_creation_transaction(port, channel, key, note_id, velocity);
            return false;
        }

        self.most_recent_transaction_id += 1;
        let mut voices_left = launched;
        let mut entry_index = to_launch;
        for slot_index in 0..self.slots.len() {
            if voices_left == 0 {
                break;
            }
            if self.slots[slot_index].voice.is_some() {
                continue;
            }
            // Claim launched entries newest-first.
            while entry_index > 0 && self.init_buffer[entry_index - 1].voice.is_none() {
                entry_index -= 1;
            }
            if entry_index == 0 {
                break;
            }
            entry_index -= 1;

            let voice = self.init_buffer[entry_index].voice;
            let group = self.begin_buffer[entry_index].poly_group;
            let slot = &mut self.slots[slot_index];
            slot.voice = voice;
            slot.port = port;
            slot.channel = channel;
            slot.key = key;
            slot.note_id = note_id;
            slot.poly_group = group;
            slot.voice_counter = self.most_recent_voice_counter;
            slot.transaction_id = self.most_recent_transaction_id;
            slot.gated = true;
            slot.gated_due_to_sustain = false;
            self.most_recent_voice_counter += 1;

            self.key_state.press(
                port,
                channel,
                key,
                group,
                self.most_recent_transaction_id,
                velocity,
            );
            self.groups.note_voice_started(group);
            voices_left -= 1;
        }

        self.responder
            .end_voice_creation_transaction(port, channel, key, note_id, velocity);
        voices_left == 0
    }

    // ---- note off ----

    /// Run the release protocol. A `-1` in any coordinate is a wildcard;
    /// a note-off that matches no slot is musically fine and ignored.
    pub fn process_note_off(
        &mut self,
        port: i16,
        channel: i16,
        key: i16,
        note_id: i32,
        velocity: f32,
    ) {
        self.retrigger_groups.clear();

        for index in 0..self.slots.len() {
            if !self.slots[index].matches(port, channel, key, note_id) {
                continue;
            }
            let Some(voice) = self.slots[index].voice else {
                continue;
            };
            let group = self.slots[index].poly_group;

            match self.groups.play_mode(group) {
                PlayMode::MonoNotes => {
                    if self.sustain_on {
                        // Another physically-held key means we fall back to
                        // it now rather than parking this voice on the pedal.
                        if self.key_state.any_key_held_for(port, group, channel, key, false) {
                            self.queue_retrigger(group);
                            self.responder.terminate_voice(voice);
                            self.retire_voice(voice);
                        } else {
                            let slot = &mut self.slots[index];
                            slot.gated = false;
                            slot.gated_due_to_sustain = true;
                        }
                    } else if self.slots[index].gated {
                        if self.key_state.any_key_held_for(port, group, channel, key, false) {
                            self.responder.terminate_voice(voice);
                            self.retire_voice(voice);
                            self.queue_retrigger(group);
                        } else {
                            self.responder.release_voice(voice, velocity);
                            self.slots[index].gated = false;
                        }
                    }
                }
                PlayMode::PolyVoices => {
                    if self.sustain_on {
                        let slot = &mut self.slots[index];
                        slot.gated = false;
                        slot.gated_due_to_sustain = true;
                    } else if self.slots[index].gated {
                        self.responder.release_voice(voice, velocity);
                        self.slots[index].gated = false;
                    }
                }
            }
        }

        if self.sustain_on {
            self.key_state.mark_sustained(port, channel, key);
        } else {
            self.key_state.clear_key(port, channel, key);
        }

        for gi in 0..self.retrigger_groups.len() {
            let group = self.retrigger_groups[gi];
            self.mono_retrigger(port, group);
        }
    }

    fn queue_retrigger(&mut self, group: u64) {
        if !self.retrigger_groups.contains(&group) {
            self.retrigger_groups.push(group);
        }
    }

    // ---- sustain pedal ----

    /// `level > 64` is "down". Releasing the pedal releases (poly) or
    /// retriggers (mono) every voice it was holding; pressing it has no
    /// immediate effect beyond capturing future note-offs.
    pub fn update_sustain_pedal(&mut self, port: i16, channel: i16, level: u8) {
        let was_on = self.sustain_on;
        self.sustain_on = level > 64;
        if was_on == self.sustain_on || self.sustain_on {
            return;
        }

        self.retrigger_groups.clear();
        for index in 0..self.slots.len() {
            if !self.slots[index].gated_due_to_sustain
                || !self.slots[index].matches(port, channel, -1, -1)
            {
                continue;
            }
            let Some(voice) = self.slots[index].voice else {
                continue;
            };
            let group = self.slots[index].poly_group;
            let (slot_port, slot_channel, slot_key) = (
                self.slots[index].port,
                self.slots[index].channel,
                self.slots[index].key,
            );

            if self.groups.play_mode(group) == PlayMode::MonoNotes {
                self.queue_retrigger(group);
                self.responder.terminate_voice(voice);
                self.retire_voice(voice);
            } else {
                self.responder.release_voice(voice, 0.0);
                let slot = &mut self.slots[index];
                slot.gated = false;
                slot.gated_due_to_sustain = false;
            }
            self.key_state.clear_key(slot_port, slot_channel, slot_key);
        }

        for gi in 0..self.retrigger_groups.len() {
            let group = self.retrigger_groups[gi];
            // Keys the pedal was holding are gone now; only keys still
            // physically down can win the retrigger.
            self.key_state.purge_sustained(port, group);
            self.mono_retrigger(port, group);
        }
    }

    // ---- mono retrigger ----

    /// After a mono-group release, relaunch the best remaining held key.
    /// The transaction is restricted to `group`: entries the responder
    /// declares for other groups are force-skipped.
    fn mono_retrigger(&mut self, port: i16, group: u64) {
        let features = self.groups.mono_features(group);
        let Some((channel, key, velocity)) = self.key_state.best_remaining_key(port, group, features)
        else {
            return;
        };
        let note_id = -1;

        let to_launch = self.responder.begin_voice_creation_transaction(
            &mut self.begin_buffer,
            port,
            channel,
            key,
            note_id,
            velocity,
        );
        let to_launch = to_launch.min(self.slots.len());
        for i in 0..to_launch {
            self.instruction_buffer[i] = if self.begin_buffer[i].poly_group != group {
                VoiceInitInstruction::Skip
            } else {
                VoiceInitInstruction::Start
            };
            self.init_buffer[i].voice = None;
        }
        let launched = self.responder.initialize_multiple_voices(
            to_launch,
            &self.instruction_buffer[..to_launch],
            &mut self.init_buffer[..to_launch],
            port,
            channel,
            key,
            note_id,
            velocity,
            0.0,
        );

        let mut voices_left = launched;
        let mut entry_index = 0;
        for slot_index in 0..self.slots.len() {
            if voices_left == 0 {
                break;
            }
            if self.slots[slot_index].voice.is_some() {
                continue;
            }
            while entry_index < to_launch && self.init_buffer[entry_index].voice.is_none() {
                entry_index += 1;
            }
            if entry_index >= to_launch {
                break;
            }

            let voice = self.init_buffer[entry_index].voice;
            let entry_group = self.begin_buffer[entry_index].poly_group;
            let slot = &mut self.slots[slot_index];
            slot.voice = voice;
            slot.port = port;
            slot.channel = channel;
            slot.key = key;
            slot.note_id = note_id;
            slot.poly_group = entry_group;
            slot.voice_counter = self.most_recent_voice_counter;
            slot.transaction_id = self.most_recent_transaction_id;
            slot.gated = true;
            slot.gated_due_to_sustain = false;
            self.most_recent_voice_counter += 1;

            self.key_state.press(
                port,
                channel,
                key,
                entry_group,
                self.most_recent_transaction_id,
                velocity,
            );
            self.groups.note_voice_started(entry_group);
            voices_left -= 1;
            entry_index += 1;
        }

        self.responder
            .end_voice_creation_transaction(port, channel, key, note_id, velocity);
    }

    // ---- voice end ----

    /// Report that a voice finished on its own: its release envelope ran
    /// out, or the tone generator completed a termination. Reporting a
    /// handle the manager no longer tracks is a no-op, so a voice's end is
    /// accounted exactly once.
    pub fn voice_ended(&mut self, voice: R::Voice) {
        self.retire_voice(voice);
    }

    /// End-of-life bookkeeping for every slot holding `voice`.
    fn retire_voice(&mut self, voice: R::Voice) {
        for slot in self.slots.iter_mut() {
            if slot.voice == Some(voice) {
                self.groups.note_voice_ended(slot.poly_group);
                slot.voice = None;
            }
        }
    }

    // ---- continuous-controller routing ----

    pub fn route_midi_pitch_bend(&mut self, port: i16, channel: i16, pb14: u16) {
        match self.config.dialect {
            Midi1Dialect::Midi1 => self.mono_pitch_bend(channel, pb14),
            Midi1Dialect::Midi1Mpe => {
                if channel == self.config.mpe_global_channel {
                    // Global bend is channel-wide; it bypasses the
                    // per-channel cache.
                    self.mono_pitch_bend(-1, pb14);
                } else {
                    for index in 0..self.slots.len() {
                        if !self.slots[index].matches(port, channel, -1, -1)
                            || !self.slots[index].gated
                        {
                            continue;
                        }
                        let Some(voice) = self.slots[index].voice else {
                            continue;
                        };
                        self.responder.set_voice_midi_mpe_channel_pitch_bend(voice, pb14);
                    }
                }
            }
        }
    }

    fn mono_pitch_bend(&mut self, channel: i16, pb14: u16) {
        if let Some(ch) = channel_index(channel) {
            self.last_pb_by_channel[ch] = pb14 as i16 - 8192;
        }
        self.mono_responder.set_midi_pitch_bend(channel, pb14);
    }

    pub fn route_channel_pressure(&mut self, port: i16, channel: i16, value: u8) {
        match self.config.dialect {
            Midi1Dialect::Midi1 => self.mono_responder.set_midi_channel_pressure(channel, value),
            Midi1Dialect::Midi1Mpe => {
                if channel == self.config.mpe_global_channel {
                    self.mono_responder.set_midi_channel_pressure(channel, value);
                } else {
                    for index in 0..self.slots.len() {
                        let slot = &self.slots[index];
                        if slot.port != port || slot.channel != channel || !slot.gated {
                            continue;
                        }
                        let Some(voice) = slot.voice else { continue };
                        self.responder.set_voice_midi_mpe_channel_pressure(voice, value);
                    }
                }
            }
        }
    }

    pub fn route_midi1_cc(&mut self, port: i16, channel: i16, cc: u8, value: u8) {
        if self.config.dialect == Midi1Dialect::Midi1Mpe
            && channel != self.config.mpe_global_channel
            && cc == self.config.mpe_timbre_cc
        {
            for index in 0..self.slots.len() {
                let slot = &self.slots[index];
                if slot.port != port || slot.channel != channel || !slot.gated {
                    continue;
                }
                let Some(voice) = slot.voice else { continue };
                self.responder.set_voice_midi_mpe_timbre(voice, value);
            }
        } else {
            if let Some(ch) = channel_index(channel) {
                if (cc as usize) < CCS {
                    self.cc_cache[ch][cc as usize] = value;
                }
            }
            self.mono_responder.set_midi_1_cc(channel, cc, value);
        }
    }

    pub fn route_note_expression(
        &mut self,
        port: i16,
        channel: i16,
        key: i16,
        note_id: i32,
        expression: i32,
        value: f64,
    ) {
        for index in 0..self.slots.len() {
            if !self.slots[index].matches(port, channel, key, note_id) {
                continue;
            }
            let Some(voice) = self.slots[index].voice else {
                continue;
            };
            self.responder.set_note_expression(voice, expression, value);
        }
    }

    pub fn route_polyphonic_parameter_modulation(
        &mut self,
        port: i16,
        channel: i16,
        key: i16,
        note_id: i32,
        parameter: u32,
        value: f64,
    ) {
        for index in 0..self.slots.len() {
            if !self.slots[index].matches(port, channel, key, note_id) {
                continue;
            }
            let Some(voice) = self.slots[index].voice else {
                continue;
            };
            self.responder
                .set_voice_polyphonic_parameter_modulation(voice, parameter, value);
        }
    }

    pub fn route_polyphonic_aftertouch(&mut self, port: i16, channel: i16, key: i16, value: u8) {
        for index in 0..self.slots.len() {
            if !self.slots[index].matches(port, channel, key, -1) {
                continue;
            }
            let Some(voice) = self.slots[index].voice else {
                continue;
            };
            self.responder.set_polyphonic_aftertouch(voice, value);
        }
    }

    // ---- bulk operations ----

    /// Hard-stop everything immediately.
    pub fn all_sounds_off(&mut self) {
        for index in 0..self.slots.len() {
            let Some(voice) = self.slots[index].voice else {
                continue;
            };
            self.responder.terminate_voice(voice);
            self.retire_voice(voice);
        }
    }

    /// Release everything; voices keep their slots until their tails end.
    pub fn all_notes_off(&mut self) {
        for index in 0..self.slots.len() {
            let Some(voice) = self.slots[index].voice else {
                continue;
            };
            self.responder.release_voice(voice, 0.0);
            self.slots[index].gated = false;
        }
    }
}
