//! Batch planner — how many winners the next round draws

use ld_core::Award;

/// Slots to fill in the upcoming round of `award`
///
/// The final round absorbs the remainder whenever what is left is at most
/// one and a half batches, so 10 winners in batches of 3 draw 3, 3, 4 rather
/// than 3, 3, 3, 1.
pub fn slots_for_round(award: &Award) -> u32 {
    slots_for(award.target_count, award.effective_batch(), award.winners.len() as u32)
}

/// Same rule on raw numbers
pub fn slots_for(target_count: u32, batch_size: Option<u32>, already_won: u32) -> u32 {
    let remaining = target_count.saturating_sub(already_won);
    match batch_size {
        None | Some(0) => remaining,
        // remaining <= batch * 1.5, kept in integers
        Some(batch) if u64::from(remaining) * 2 <= u64::from(batch) * 3 => remaining,
        Some(batch) => batch,
    }
}

/// Every round size still ahead for an award, in order
pub fn round_schedule(target_count: u32, batch_size: Option<u32>, already_won: u32) -> Vec<u32> {
    let mut rounds = Vec::new();
    let mut won = already_won;
    loop {
        let slots = slots_for(target_count, batch_size, won);
        if slots == 0 {
            break;
        }
        rounds.push(slots);
        won += slots;
    }
    rounds
}
