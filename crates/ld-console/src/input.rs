//! Operator input — one console line → one action

use anyhow::{Result, bail};

use ld_ceremony::CeremonyCommand;
use ld_core::{AwardId, ParticipantId};

/// Parsed console line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Forward to the ceremony
    Command(CeremonyCommand),
    Status,
    Board,
    Help,
    Quit,
}

pub const HELP: &str = "\
commands:
  enter              leave setup and open the ceremony
  exit               back to setup
  start              start rolling names for the active award
  stop               stop and commit the names on screen
  confirm            dismiss the result screen
  next | prev        switch award
  remove <id>        return a winner to the pool
  clear <award-id>   clear one award's winners
  clear-all          clear every award
  status             ceremony status
  board              winner board
  quit";

/// Parse one line; `Ok(None)` for blank lines
pub fn parse_line(line: &str) -> Result<Option<Input>> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let arg = words.next();
    if words.next().is_some() {
        bail!("too many arguments for '{}'", verb);
    }

    let input = match (verb.to_ascii_lowercase().as_str(), arg) {
        ("enter", None) => Input::Command(CeremonyCommand::Enter),
        ("exit", None) => Input::Command(CeremonyCommand::Exit),
        ("start", None) => Input::Command(CeremonyCommand::StartRound),
        ("stop", None) => Input::Command(CeremonyCommand::StopRound { snapshot: None }),
        ("confirm", None) => Input::Command(CeremonyCommand::ConfirmResult),
        ("next", None) => Input::Command(CeremonyCommand::NextAward),
        ("prev", None) => Input::Command(CeremonyCommand::PrevAward),
        ("remove", Some(id)) => Input::Command(CeremonyCommand::RemoveWinner {
            participant_id: ParticipantId::new(id),
        }),
        ("clear", Some(id)) => Input::Command(CeremonyCommand::ClearAward {
            award_id: AwardId::new(id),
        }),
        ("clear-all", None) => Input::Command(CeremonyCommand::ClearAll),
        ("status", None) => Input::Status,
        ("board", None) => Input::Board,
        ("help" | "?", None) => Input::Help,
        ("quit" | "q", None) => Input::Quit,
        ("remove" | "clear", None) => bail!("'{}' needs an id", verb),
        (_, Some(_)) if is_known(verb) => bail!("'{}' takes no arguments", verb),
        _ => bail!("unknown command '{}' (try 'help')", verb),
    };
    Ok(Some(input))
}

fn is_known(verb: &str) -> bool {
    matches!(
        verb.to_ascii_lowercase().as_str(),
        "enter" | "exit" | "start" | "stop" | "confirm" | "next" | "prev" | "clear-all" | "status" | "board" | "help"
            | "?" | "quit" | "q"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_simple_verbs() {
        assert_eq!(
            parse_line("start").unwrap(),
            Some(Input::Command(CeremonyCommand::StartRound))
        );
        assert_eq!(
            parse_line("  STOP ").unwrap(),
            Some(Input::Command(CeremonyCommand::StopRound { snapshot: None }))
        );
        assert_eq!(parse_line("board").unwrap(), Some(Input::Board));
        assert_eq!(parse_line("q").unwrap(), Some(Input::Quit));
        assert_eq!(parse_line("   ").unwrap(), None);
    }

    #[test]
    fn test_parses_id_arguments() {
        assert_eq!(
            parse_line("remove p-0007").unwrap(),
            Some(Input::Command(CeremonyCommand::RemoveWinner {
                participant_id: ParticipantId::new("p-0007"),
            }))
        );
        assert_eq!(
            parse_line("clear 3").unwrap(),
            Some(Input::Command(CeremonyCommand::ClearAward {
                award_id: AwardId::new("3"),
            }))
        );
    }

    #[test]
    fn test_rejects_malformed_lines() {
        assert!(parse_line("remove").is_err());
        assert!(parse_line("start now").is_err());
        assert!(parse_line("clear 1 2").is_err());
        assert!(parse_line("shuffle").is_err());
    }
}
