//! Text scripts of player commands, one per line, as replayed by the CLI.
//!
//! ```text
//! # comments and blank lines are skipped
//! draw
//! PLAYER_MOVE:0>4:hearts9
//! tick
//! undo
//! ```

use crate::engine::Engine;
use crate::move_::{Move, MoveKind, PileId};
use crate::observer::Observer;

use anyhow::{Context, Result, bail};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Move(Move),
    Undo,
    Tick,
}

pub fn parse_script(text: &str) -> Result<Vec<Command>> {
    let mut commands = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let command = match line {
            "draw" => Command::Move(Move::stock()),
            "undo" => Command::Undo,
            "tick" => Command::Tick,
            _ => Command::Move(
                line.parse::<Move>()
                    .with_context(|| format!("Invalid command at line {}", i + 1))?,
            ),
        };
        commands.push(command);
    }
    Ok(commands)
}

/// Checks a move typed by the player against the table before it is applied.
pub fn check_move<O: Observer>(engine: &Engine<O>, mv: &Move) -> Result<()> {
    match mv.kind {
        MoveKind::Stock => Ok(()),
        MoveKind::Flip => match mv.to {
            PileId::Lane(lane) if engine.lane(lane).needs_flip() => Ok(()),
            _ => bail!("Nothing to flip for '{mv}'"),
        },
        MoveKind::PlayerMove => {
            let Some(lead) = mv.card() else {
                bail!("Move '{mv}' carries no cards");
            };
            let held = match mv.from {
                PileId::Lane(lane) => engine.cascade_run(lane, mv.cascade.len()) == mv.cascade.as_slice(),
                PileId::Waste => mv.cascade.len() == 1 && engine.waste_card(0) == Some(lead),
                PileId::Foundation(slot) => {
                    mv.cascade.len() == 1 && engine.foundation_card(slot) == Some(lead)
                }
            };
            if !held {
                bail!("Source pile does not hold the cards of '{mv}'");
            }
            let accepted = match mv.to {
                PileId::Foundation(slot) => engine.accepts_foundation_drop(slot, &mv.cascade),
                PileId::Lane(lane) if engine.lane(lane).is_empty() => {
                    engine.accepts_lane_drop(lane, lead)
                }
                PileId::Lane(lane) => engine.accepts_cascade_drop(lane, lead),
                PileId::Waste => false,
            };
            if !accepted || mv.from == mv.to {
                bail!("Illegal move '{mv}'");
            }
            Ok(())
        }
        kind => bail!("{} moves are made by the engine, not the player", kind.name()),
    }
}

/// Runs `commands` in order, stopping at the first illegal move.
pub fn run_script<O: Observer>(engine: &mut Engine<O>, commands: &[Command]) -> Result<()> {
    for command in commands {
        match command {
            Command::Move(mv) => {
                check_move(engine, mv)?;
                engine.make_move(mv.clone());
            }
            Command::Undo => engine.undo(),
            Command::Tick => engine.tick(),
        }
    }
    Ok(())
}
