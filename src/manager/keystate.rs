use std::collections::HashMap;

use super::groups::MonoFeatures;

/// Most recent physical press of one (port, channel, key, group).
#[derive(Debug, Clone, Copy)]
pub(crate) struct KeyStateEntry {
    pub transaction_id: u64,
    pub inception_velocity: f32,
    /// The physical key came up while the pedal was down.
    pub held_by_sustain: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct KeyStateKey {
    port: i16,
    channel: i16,
    key: i16,
    group: u64,
}

/// Which keys are down (or pedal-held) right now, per polyphony group.
///
/// Stored as one flat map over packed (port, channel, key, group) rather
/// than nested per-port tables; a port holds at most 16 x 128 cells, so the
/// full scans in the mono retrigger chooser stay cheap. The map is pre-sized
/// so steady-state presses do not allocate.
pub(crate) struct KeyStateTable {
    entries: HashMap<KeyStateKey, KeyStateEntry>,
}

impl KeyStateTable {
    pub fn new() -> Self {
        Self {
            entries: HashMap::with_capacity(1024),
        }
    }

    pub fn press(
        &mut self,
        port: i16,
        channel: i16,
        key: i16,
        group: u64,
        transaction_id: u64,
        velocity: f32,
    ) {
        self.entries.insert(
            KeyStateKey {
                port,
                channel,
                key,
                group,
            },
            KeyStateEntry {
                transaction_id,
                inception_velocity: velocity,
                held_by_sustain: false,
            },
        );
    }

    /// Flag every group's entry at (port, channel, key) as pedal-held.
    pub fn mark_sustained(&mut self, port: i16, channel: i16, key: i16) {
        for (k, entry) in self.entries.iter_mut() {
            if k.port == port && k.channel == channel && k.key == key {
                entry.held_by_sustain = true;
            }
        }
    }

    /// Erase every group's entry at (port, channel, key).
    pub fn clear_key(&mut self, port: i16, channel: i16, key: i16) {
        self.entries
            .retain(|k, _| !(k.port == port && k.channel == channel && k.key == key));
    }

    /// Erase every pedal-held entry of `group` under `port`.
    pub fn purge_sustained(&mut self, port: i16, group: u64) {
        self.entries
            .retain(|k, entry| !(k.port == port && k.group == group && entry.held_by_sustain));
    }

    /// Is any key of `group` under `port` down, other than the one at
    /// (except_channel, except_key)? Pedal-held keys only count when
    /// `include_sustained` is set.
    pub fn any_key_held_for(
        &self,
        port: i16,
        group: u64,
        except_channel: i16,
        except_key: i16,
        include_sustained: bool,
    ) -> bool {
        self.entries.iter().any(|(k, entry)| {
            k.port == port
                && k.group == group
                && (include_sustained || !entry.held_by_sustain)
                && !(k.channel == except_channel && k.key == except_key)
        })
    }

    /// Pick the key a mono group should fall back to after a release.
    ///
    /// Two passes: physically-held keys first, pedal-held keys only when no
    /// physical key remains. Within a pass the group's features decide the
    /// winner; ties (the same key on two channels, or equal transactions)
    /// resolve to the lowest channel so the choice never depends on map
    /// iteration order.
    pub fn best_remaining_key(
        &self,
        port: i16,
        group: u64,
        features: MonoFeatures,
    ) -> Option<(i16, i16, f32)> {
        for sustained_pass in [false, true] {
            let mut best: Option<(i16, i16, f32, u64)> = None;
            for (k, entry) in self.entries.iter() {
                if k.port != port || k.group != group || entry.held_by_sustain != sustained_pass {
                    continue;
                }
                let better = if features.contains(MonoFeatures::ON_RELEASE_TO_LATEST) {
                    match &best {
                        None => true,
                        Some(b) => {
                            entry.transaction_id > b.3
                                || (entry.transaction_id == b.3 && (k.channel, k.key) < (b.0, b.1))
                        }
                    }
                } else if features.contains(MonoFeatures::ON_RELEASE_TO_HIGHEST) {
                    match &best {
                        None => true,
                        Some(b) => k.key > b.1 || (k.key == b.1 && k.channel < b.0),
                    }
                } else if features.contains(MonoFeatures::ON_RELEASE_TO_LOWEST) {
                    match &best {
                        None => true,
                        Some(b) => k.key < b.1 || (k.key == b.1 && k.channel < b.0),
                    }
                } else {
                    false
                };
                if better {
                    best = Some((
                        k.channel,
                        k.key,
                        entry.inception_velocity,
                        entry.transaction_id,
                    ));
                }
            }
            if let Some((channel, key, velocity, _)) = best {
                return Some((channel, key, velocity));
            }
        }
        None
    }

    #[cfg(test)]
    fn get(&self, port: i16, channel: i16, key: i16, group: u64) -> Option<KeyStateEntry> {
        self.entries
            .get(&KeyStateKey {
                port,
                channel,
                key,
                group,
            })
            .copied()
    }
}
