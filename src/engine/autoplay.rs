use super::{Engine, LaneLocks};
use crate::board::{Board, TOTAL_FOUNDATIONS, TOTAL_LANES};
use crate::card::Card;
use crate::config::{AutoPlayMode, Config};
use crate::move_::{Move, PileId};
use crate::observer::Observer;

fn foundation_for(board: &Board, card: Card) -> Option<usize> {
    (1..=TOTAL_FOUNDATIONS).find(|&slot| board.accepts_foundation_drop(slot, &[card]))
}

/// Moves the top card of `lane` to the first foundation slot that takes it.
pub fn lane_to_foundation(board: &Board, lane: usize) -> Option<Move> {
    let card = board.lane(lane).top()?;
    let slot = foundation_for(board, card)?;
    Some(Move::auto_play(PileId::Lane(lane), PileId::Foundation(slot), card))
}

pub fn waste_to_foundation(board: &Board) -> Option<Move> {
    let card = board.waste.peek_top()?;
    let slot = foundation_for(board, card)?;
    Some(Move::auto_play(PileId::Waste, PileId::Foundation(slot), card))
}

/// Nothing is hidden and at most one card is left to draw from.
fn is_trivially_won(board: &Board) -> bool {
    board.stock.is_empty()
        && board.waste.len() <= 1
        && board.lanes.iter().all(|lane| lane.stack.is_empty())
}

/// The next move the engine makes on its own, if any.
///
/// Flips come first, then lanes left to right, then the waste. Locked lanes
/// are skipped for both.
pub fn next_auto_move(board: &Board, locks: LaneLocks, config: &Config) -> Option<Move> {
    let unlocked = || (1..=TOTAL_LANES).filter(move |&lane| !locks.is_locked(lane));

    if config.auto_flip {
        if let Some(lane) = unlocked().find(|&lane| board.lane(lane).needs_flip()) {
            return Some(Move::flip(lane));
        }
    }

    match config.auto_play {
        AutoPlayMode::Never => return None,
        AutoPlayMode::Won if !is_trivially_won(board) => return None,
        _ => {}
    }

    unlocked()
        .find_map(|lane| lane_to_foundation(board, lane))
        .or_else(|| waste_to_foundation(board))
}

impl<O: Observer> Engine<O> {
    /// Takes one auto-play step. Further steps follow once it settles.
    pub(super) fn auto_play(&mut self) {
        if !self.session.in_progress {
            return;
        }
        if let Some(mv) = next_auto_move(&self.board, self.session.locks, &self.config) {
            self.apply(mv);
        }
    }
}
