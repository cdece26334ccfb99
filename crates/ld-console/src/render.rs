//! Terminal rendering of events, status and the winner board

use ld_ceremony::{CeremonyEvent, CeremonySnapshot, Stage};
use ld_core::Participant;
use ld_draw::AwardStanding;

fn names(participants: &[Participant]) -> String {
    participants.iter().map(Participant::label).collect::<Vec<_>>().join(", ")
}

/// One line per event; `None` for events not shown in text mode
pub fn event_line(event: &CeremonyEvent, show_preview: bool) -> Option<String> {
    let line = match &event.stage {
        Stage::CeremonyEntered { award_index } => format!("== ceremony open (award #{})", award_index + 1),
        Stage::CeremonyExited => "== back to setup".to_string(),
        Stage::AwardSelected { award_id, index } => format!("-> award #{} [{}]", index + 1, award_id),
        Stage::RoundStarted { award_id, slots } => format!(">> drawing {} for [{}]", slots, award_id),
        Stage::RoundSkipped { award_id, reason } => format!("-- [{}] skipped: {:?}", award_id, reason),
        Stage::PreviewTick { participants, .. } if show_preview => format!("   ~ {}", names(participants)),
        Stage::RoundCommitted {
            award_name, winners, ..
        } => format!("** {}: {}", award_name, names(winners)),
        Stage::RoundEmpty { award_id } => format!("-- [{}] nothing committed", award_id),
        Stage::ResultConfirmed => "-- result confirmed".to_string(),
        Stage::WinnerRemoved {
            participant_id,
            award_id,
        } => format!("-- {} removed from [{}]", participant_id, award_id),
        Stage::AwardCleared { award_id, released } => format!("-- [{}] cleared ({} released)", award_id, released),
        Stage::LedgerCleared { released } => format!("-- all awards cleared ({} released)", released),
        Stage::PreviewTick { .. } | Stage::Media { .. } | Stage::Ambient { .. } => return None,
    };
    Some(line)
}

pub fn status(snapshot: &CeremonySnapshot) -> String {
    let award = match &snapshot.active_award {
        Some(a) => format!("{} [{}] {}/{}", a.name, a.id, a.won, a.target),
        None => "-".to_string(),
    };
    format!(
        "{} | state: {} | award: {} | this round: {} | available: {}/{}",
        if snapshot.title.is_empty() { "Lucky draw" } else { snapshot.title.as_str() },
        snapshot.state,
        award,
        snapshot.slots_this_round,
        snapshot.available,
        snapshot.roster_size,
    )
}

pub fn board(standings: &[AwardStanding]) -> String {
    let width = standings.iter().map(|s| s.name.chars().count()).max().unwrap_or(0);
    standings
        .iter()
        .map(|s| {
            format!(
                "{:<width$}  [{}]  {:>3}/{:<3}  next round: {}",
                s.name,
                s.id,
                s.won,
                s.target,
                s.next_round,
                width = width
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
