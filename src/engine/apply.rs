use super::{Engine, Task};
use crate::card::Card;
use crate::move_::{Move, MoveKind, PileId};
use crate::observer::Observer;

use log::{debug, warn};

impl<O: Observer> Engine<O> {
    pub(super) fn apply(&mut self, mv: Move) {
        debug!("Applying {mv}");
        match mv.kind {
            MoveKind::Stock => self.apply_stock(),
            MoveKind::UndoStock => self.apply_undo_stock(&mv.cascade),
            MoveKind::Flip => self.apply_flip(mv),
            MoveKind::UndoFlip => self.apply_undo_flip(mv.to),
            MoveKind::PlayerMove | MoveKind::AutoPlay | MoveKind::Undo => self.apply_transfer(mv),
        }
    }

    /// Draws from the stock, or turns the waste over when the stock ran out.
    fn apply_stock(&mut self) {
        let recorded = if self.board.stock.is_empty() {
            self.board.recycle_waste();
            Move::stock()
        } else {
            let drawn = self.board.draw();
            Move::stock_with(MoveKind::Stock, drawn.into_iter().collect())
        };
        self.push_history(recorded);
        self.observer.update_waste();
        self.observer.update_stock();
        self.move_started(true);
        self.tasks.push_back(Task::Settle);
    }

    fn apply_undo_stock(&mut self, drawn: &[Card]) {
        // A recycle leaves the waste empty, a draw never does.
        if self.board.waste.is_empty() {
            self.board.unrecycle_waste();
        } else {
            self.board.undraw(drawn);
        }
        self.observer.update_waste();
        self.observer.update_stock();
    }

    fn apply_flip(&mut self, mv: Move) {
        let PileId::Lane(lane) = mv.to else {
            warn!("Ignoring flip of {:?}", mv.to);
            return;
        };
        let Some(card) = self.board.flip(lane) else {
            warn!("Lane{lane} has no card to flip");
            return;
        };
        self.push_history(mv);
        self.observer.flip_lane_top_card(lane, card);
        self.session.locks.clear();
        self.tasks.push_back(Task::AutoPlay);
    }

    fn apply_undo_flip(&mut self, to: PileId) {
        let PileId::Lane(lane) = to else {
            return;
        };
        if self.board.unflip(lane).is_some() {
            let lane_ref = self.board.lane(lane);
            self.observer.render_lane_stack_size(lane, lane_ref.stack.len());
            self.observer.render_lane_cascade(lane, &lane_ref.cascade);
        }
    }

    fn apply_transfer(&mut self, mv: Move) {
        self.board.take(mv.from, &mv.cascade);
        self.board.put(mv.to, &mv.cascade);
        if !mv.kind.is_undo() {
            self.push_history(mv.clone());
        }
        self.notify_pile(mv.from);

        match mv.kind {
            MoveKind::AutoPlay => {
                self.move_started(true);
                if self.config.animate_auto_play {
                    self.pending += 1;
                    self.observer.request_animated_move(&mv);
                } else {
                    self.notify_pile(mv.to);
                    self.tasks.push_back(Task::Settle);
                }
            }
            MoveKind::Undo => {
                if self.config.animate_undo {
                    self.observer.request_animated_move(&mv);
                } else {
                    self.notify_pile(mv.to);
                }
            }
            _ => {
                // A card pulled back from a foundation must not bounce straight back.
                let from_foundation = matches!(mv.from, PileId::Foundation(_));
                let mut reset_locks = true;
                if let PileId::Lane(lane) = mv.to {
                    if from_foundation {
                        self.session.locks.lock(lane);
                        reset_locks = false;
                    }
                }
                self.notify_pile(mv.to);
                self.move_started(reset_locks);
                self.tasks.push_back(Task::Settle);
            }
        }
    }

    fn move_started(&mut self, reset_locks: bool) {
        self.session.move_count += 1;
        self.observer.update_move_count(self.session.move_count);
        if self.session.move_count == 1 {
            self.observer.game_started();
            self.resume();
        }
        if reset_locks {
            self.session.locks.clear();
        }
    }

    fn push_history(&mut self, mv: Move) {
        self.history.push(mv);
        if self.history.len() == 1 {
            self.observer.undo_availability_changed(true);
        }
    }
}
