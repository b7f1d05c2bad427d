use super::groups::StealingPriority;
use super::slots::VoiceSlot;

/// Pick the victim for one steal, or `None` when nothing can be taken.
///
/// Candidates are split into held voices (gated either way) and free ones
/// already fading out; a fading voice is always preferred over cutting off a
/// note someone is holding. Within each class the priority mode ranks the
/// winner. `cross_group` widens the search to every group, used when the
/// group still has budget but the global table is full.
pub(crate) fn find_stealable_slot<V: Copy + PartialEq>(
    slots: &[VoiceSlot<V>],
    group: u64,
    priority: StealingPriority,
    cross_group: bool,
) -> Option<usize> {
    let mut best_held: Option<(usize, i64)> = None;
    let mut best_free: Option<(usize, i64)> = None;

    for (index, slot) in slots.iter().enumerate() {
        if slot.voice.is_none() {
            continue;
        }
        if slot.poly_group != group && !cross_group {
            continue;
        }

        let rank = match priority {
            StealingPriority::Oldest => slot.voice_counter as i64,
            StealingPriority::Highest | StealingPriority::Lowest => slot.key as i64,
        };
        let bucket = if slot.held() {
            &mut best_held
        } else {
            &mut best_free
        };
        let improves = match bucket {
            None => true,
            Some((_, best_rank)) => match priority {
                StealingPriority::Oldest | StealingPriority::Lowest => rank < *best_rank,
                StealingPriority::Highest => rank > *best_rank,
            },
        };
        if improves {
            *bucket = Some((index, rank));
        }
    }

    best_free.or(best_held).map(|(index, _)| index)
}
