//! The move engine: owns the table, applies moves, keeps the undo history and
//! drives auto-play and win detection.

mod apply;
mod autoplay;

pub use self::autoplay::{lane_to_foundation, next_auto_move, waste_to_foundation};

use crate::board::{Board, Lane, TOTAL_LANES};
use crate::card::Card;
use crate::config::Config;
use crate::move_::{Move, PileId};
use crate::observer::{NullObserver, Observer};
use crate::snapshot::{SavedGame, Snapshot};

use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::collections::VecDeque;

/// Lanes excluded from auto-play, one bit per lane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaneLocks(u16);

impl LaneLocks {
    pub fn is_locked(self, lane: usize) -> bool {
        self.0 & (1u16 << (lane - 1)) != 0
    }

    pub fn lock(&mut self, lane: usize) {
        self.0 |= 1u16 << (lane - 1);
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    pub fn to_flags(self) -> [bool; TOTAL_LANES] {
        std::array::from_fn(|i| self.is_locked(i + 1))
    }

    pub fn from_flags(flags: &[bool]) -> Self {
        let mut locks = Self::default();
        for (i, _) in flags.iter().enumerate().filter(|(_, locked)| **locked) {
            locks.lock(i + 1);
        }
        locks
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Identifier the host's game store assigned to this game, if any.
    pub game_id: Option<i64>,
    pub elapsed_seconds: u32,
    pub move_count: u32,
    pub in_progress: bool,
    pub locks: LaneLocks,
    /// Latched once the win was signalled.
    pub won: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    /// Check for a win, then look for the next auto-play step.
    Settle,
    AutoPlay,
}

pub struct Engine<O: Observer = NullObserver> {
    board: Board,
    session: Session,
    history: Vec<Move>,
    /// Auto-play moves handed to the observer for animation and not yet acknowledged.
    pending: u32,
    tasks: VecDeque<Task>,
    config: Config,
    observer: O,
}

impl Engine {
    pub fn with_defaults() -> Self {
        Self::new(Config::default(), NullObserver)
    }
}

impl<O: Observer> Engine<O> {
    /// Creates an engine holding a freshly shuffled deal.
    pub fn new(config: Config, observer: O) -> Self {
        Self::with_board(Board::new_from_seed(rand::random()), config, observer)
    }

    /// Creates an engine around an arbitrary board, e.g. one parsed from text.
    pub fn with_board(board: Board, config: Config, observer: O) -> Self {
        Self {
            board,
            session: Session::default(),
            history: Vec::new(),
            pending: 0,
            tasks: VecDeque::new(),
            config,
            observer,
        }
    }

    pub fn new_game(&mut self) {
        self.new_game_with_seed(rand::random());
    }

    pub fn new_game_with_seed(&mut self, seed: u64) {
        info!("Dealing new game from seed {seed}");
        self.board = Board::new_from_seed(seed);
        self.session = Session::default();
        self.history.clear();
        self.pending = 0;
        self.tasks.clear();
        self.refresh_observer();
    }

    /// Applies a move. The move must be legal: callers check the `accepts_*`
    /// probes first, the engine does not validate again.
    pub fn make_move(&mut self, mv: Move) {
        self.apply(mv);
        self.run_tasks();
    }

    pub fn undo(&mut self) {
        let Some(last) = self.history.pop() else {
            return;
        };
        self.apply(last.invert());
        if self.history.is_empty() {
            self.observer.undo_availability_changed(false);
        }
        self.run_tasks();
    }

    /// One second of play time passed.
    pub fn tick(&mut self) {
        if self.session.move_count == 0 || !self.session.in_progress {
            return;
        }
        self.session.elapsed_seconds += 1;
        self.observer.update_elapsed_time(self.session.elapsed_seconds);
    }

    pub fn pause(&mut self) {
        self.session.in_progress = false;
    }

    /// Resumes the clock; a game only counts as in progress after its first move.
    pub fn resume(&mut self) {
        self.session.in_progress = self.session.move_count > 0 && !self.session.won;
    }

    /// Acknowledges one animation requested for an `AUTO_PLAY` move.
    pub fn animation_completed(&mut self) {
        if self.pending == 0 {
            warn!("Animation completed with no pending moves");
            return;
        }
        self.pending -= 1;
        self.tasks.push_back(Task::Settle);
        self.run_tasks();
    }

    /// Plays the top card of `lane` to the first foundation that takes it.
    pub fn try_auto_play_lane(&mut self, lane: usize) -> bool {
        match lane_to_foundation(&self.board, lane) {
            Some(mv) => {
                self.make_move(mv);
                true
            }
            None => false,
        }
    }

    /// Plays the top waste card to the first foundation that takes it.
    pub fn try_auto_play_waste(&mut self) -> bool {
        match waste_to_foundation(&self.board) {
            Some(mv) => {
                self.make_move(mv);
                true
            }
            None => false,
        }
    }

    pub fn accepts_foundation_drop(&self, slot: usize, cards: &[Card]) -> bool {
        let accepted = self.board.accepts_foundation_drop(slot, cards);
        if accepted {
            debug!("Drag -> Foundation{slot}: acceptable drop of {}", cards[0]);
        }
        accepted
    }

    pub fn accepts_cascade_drop(&self, lane: usize, bottom_card: Card) -> bool {
        let accepted = self.board.accepts_cascade_drop(lane, bottom_card);
        if accepted {
            debug!("Drag -> Lane{lane}: acceptable drop of {bottom_card}");
        }
        accepted
    }

    pub fn accepts_lane_drop(&self, lane: usize, lead_card: Card) -> bool {
        let accepted = self.board.accepts_lane_drop(lane, lead_card);
        if accepted {
            debug!("Drag -> Lane{lane}: acceptable drop of {lead_card} onto empty lane");
        }
        accepted
    }

    pub fn save_snapshot(&self) -> Snapshot {
        SavedGame {
            board: self.board.clone(),
            session: self.session.clone(),
            history: self.history.clone(),
        }
        .encode()
    }

    /// Replaces the whole game with a saved one. Nothing changes on error.
    pub fn restore_snapshot(&mut self, snapshot: &Snapshot) -> Result<()> {
        let SavedGame {
            board,
            session,
            history,
        } = SavedGame::decode(snapshot).context("Failed to restore snapshot")?;
        info!(
            "Restored game with {} moves after {}s",
            session.move_count, session.elapsed_seconds
        );
        self.board = board;
        self.session = Session {
            in_progress: false,
            won: false,
            ..session
        };
        self.history = history;
        self.pending = 0;
        self.tasks.clear();
        self.refresh_observer();
        self.check_for_win();
        Ok(())
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn lane(&self, lane: usize) -> &Lane {
        self.board.lane(lane)
    }

    pub fn foundation_card(&self, slot: usize) -> Option<Card> {
        self.board.foundation(slot)
    }

    pub fn waste_card(&self, index: usize) -> Option<Card> {
        self.board.waste.get(index)
    }

    pub fn is_stock_empty(&self) -> bool {
        self.board.stock.is_empty()
    }

    pub fn is_waste_empty(&self) -> bool {
        self.board.waste.is_empty()
    }

    /// The top `count` cards of a lane's cascade, bottom card first.
    pub fn cascade_run(&self, lane: usize, count: usize) -> &[Card] {
        let cascade = &self.board.lane(lane).cascade;
        &cascade[cascade.len().saturating_sub(count)..]
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn history(&self) -> &[Move] {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn move_count(&self) -> u32 {
        self.session.move_count
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.session.elapsed_seconds
    }

    pub fn is_in_progress(&self) -> bool {
        self.session.in_progress
    }

    pub fn is_won(&self) -> bool {
        self.session.won
    }

    pub fn pending_moves(&self) -> u32 {
        self.pending
    }

    pub fn game_id(&self) -> Option<i64> {
        self.session.game_id
    }

    pub fn set_game_id(&mut self, game_id: i64) {
        self.session.game_id = Some(game_id);
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn set_config(&mut self, config: Config) {
        self.config = config;
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Runs queued settlements until auto-play has nothing more to do.
    fn run_tasks(&mut self) {
        while let Some(task) = self.tasks.pop_front() {
            if task == Task::Settle {
                self.check_for_win();
            }
            if self.pending == 0 {
                self.auto_play();
            }
        }
    }

    fn check_for_win(&mut self) {
        if self.session.won || !self.board.is_won() {
            return;
        }
        info!(
            "Game won in {} moves, {}s",
            self.session.move_count, self.session.elapsed_seconds
        );
        self.session.won = true;
        self.pause();
        self.observer
            .signal_win(self.session.elapsed_seconds, self.session.move_count);
    }

    fn refresh_observer(&mut self) {
        self.observer.update_elapsed_time(self.session.elapsed_seconds);
        self.observer.update_move_count(self.session.move_count);
        self.observer.undo_availability_changed(self.can_undo());
        self.observer.update_stock();
        self.observer.update_waste();
        for slot in 1..=self.board.foundations.len() {
            self.observer.update_foundation(slot);
        }
        for (i, lane) in self.board.lanes.iter().enumerate() {
            self.observer.render_lane_stack_size(i + 1, lane.stack.len());
            self.observer.render_lane_cascade(i + 1, &lane.cascade);
        }
    }

    fn notify_pile(&mut self, pile: PileId) {
        match pile {
            PileId::Foundation(slot) => self.observer.update_foundation(slot),
            PileId::Waste => self.observer.update_waste(),
            PileId::Lane(lane) => {
                let cascade = &self.board.lane(lane).cascade;
                self.observer.render_lane_cascade(lane, cascade);
            }
        }
    }
}

#[cfg(test)]
mod tests;
