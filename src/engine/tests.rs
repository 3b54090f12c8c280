use super::*;
use crate::card::{Suit, TOTAL_CARDS};
use crate::config::AutoPlayMode;
use crate::move_::MoveKind;

#[derive(Debug, Default)]
struct Recorder {
    wins: Vec<(u32, u32)>,
    animated: Vec<Move>,
    undo_available: Option<bool>,
    started: u32,
    elapsed: u32,
    lane_renders: Vec<usize>,
}

impl Observer for Recorder {
    fn update_elapsed_time(&mut self, seconds: u32) {
        self.elapsed = seconds;
    }

    fn undo_availability_changed(&mut self, available: bool) {
        self.undo_available = Some(available);
    }

    fn render_lane_cascade(&mut self, lane: usize, _cards: &[Card]) {
        self.lane_renders.push(lane);
    }

    fn request_animated_move(&mut self, mv: &Move) {
        self.animated.push(mv.clone());
    }

    fn game_started(&mut self) {
        self.started += 1;
    }

    fn signal_win(&mut self, elapsed_seconds: u32, move_count: u32) {
        self.wins.push((elapsed_seconds, move_count));
    }
}

fn card(name: &str) -> Card {
    name.parse().unwrap()
}

fn config(auto_play: AutoPlayMode, auto_flip: bool) -> Config {
    Config {
        auto_flip,
        auto_play,
        ..Default::default()
    }
}

fn engine(board: &str, config: Config) -> Engine<Recorder> {
    Engine::with_board(Board::parse(board).unwrap(), config, Recorder::default())
}

/// Every foundation holds a king except the last, which waits for `spades13`.
fn almost_won() -> Board {
    let mut board = Board::default();
    for (i, slot) in board.foundations.iter_mut().enumerate() {
        *slot = Some(Card::new(Suit::ALL[i % 4], 13));
    }
    board.foundations[11] = Some(Card::new(Suit::Spades, 11));
    board.lanes[0].cascade.push(Card::new(Suit::Spades, 13));
    board.lanes[1].cascade.push(Card::new(Suit::Spades, 12));
    board
}

#[test]
fn test_stock_and_player_move_undo() {
    let mut engine = engine(
        "Stock: clubs1 diamonds2 clubs3 hearts4\nLane1: | spades10\nLane2: | hearts9",
        config(AutoPlayMode::Never, false),
    );
    let before = engine.board().clone();

    engine.make_move(Move::stock());
    assert_eq!(engine.board().stock, [card("clubs1")]);
    assert_eq!(engine.waste_card(0), Some(card("diamonds2")));
    assert_eq!(engine.observer().undo_available, Some(true));
    assert_eq!(engine.observer().started, 1);
    assert!(engine.is_in_progress());

    let hearts9 = card("hearts9");
    assert!(engine.accepts_cascade_drop(1, hearts9));
    assert!(!engine.accepts_cascade_drop(14, hearts9));
    assert!(!engine.accepts_foundation_drop(0, &[hearts9]));
    engine.make_move(Move::player(PileId::Lane(2), PileId::Lane(1), &[hearts9]));
    assert_eq!(engine.cascade_run(1, 2), &[card("spades10"), hearts9]);
    assert!(engine.lane(2).is_empty());
    assert_eq!(engine.move_count(), 2);
    assert_eq!(engine.history().len(), 2);

    engine.undo();
    engine.undo();
    assert_eq!(engine.board(), &before);
    assert!(!engine.can_undo());
    assert_eq!(engine.observer().undo_available, Some(false));

    // Nothing left to undo.
    engine.undo();
    assert_eq!(engine.board(), &before);
}

#[test]
fn test_recycle_and_undo() {
    let mut engine = engine(
        "Stock: clubs1\nWaste: clubs2 clubs3",
        config(AutoPlayMode::Never, false),
    );
    let before = engine.board().clone();

    engine.make_move(Move::stock());
    assert!(engine.is_stock_empty());
    engine.make_move(Move::stock());
    assert!(engine.is_waste_empty());
    assert_eq!(engine.board().stock.last(), Some(&card("clubs3")));
    assert_eq!(engine.history().last(), Some(&Move::stock()));

    engine.undo();
    assert_eq!(engine.waste_card(0), Some(card("clubs1")));
    engine.undo();
    assert_eq!(engine.board(), &before);
}

#[test]
fn test_auto_flip_and_undo() {
    let mut engine = engine(
        "Lane1: | hearts4\nLane2: diamonds8 | spades3",
        config(AutoPlayMode::Never, true),
    );
    let before = engine.board().clone();

    engine.make_move(Move::player(
        PileId::Lane(2),
        PileId::Lane(1),
        &[card("spades3")],
    ));
    assert_eq!(engine.lane(2).top(), Some(card("diamonds8")));
    assert_eq!(engine.history().last().map(|mv| mv.kind), Some(MoveKind::Flip));
    // Flips do not count as moves.
    assert_eq!(engine.move_count(), 1);

    engine.undo();
    assert!(engine.lane(2).needs_flip());
    engine.undo();
    assert_eq!(engine.board(), &before);
}

#[test]
fn test_win_signalled_once() {
    let board = almost_won();
    assert!(board.is_valid());
    let mut engine = Engine::with_board(board, Config::default(), Recorder::default());

    let spades12 = card("spades12");
    assert!(engine.accepts_foundation_drop(12, &[spades12]));
    engine.make_move(Move::player(
        PileId::Lane(2),
        PileId::Foundation(12),
        &[spades12],
    ));

    // The last king follows on its own.
    assert!(engine.board().is_won());
    assert_eq!(engine.history().last().map(|mv| mv.kind), Some(MoveKind::AutoPlay));
    assert_eq!(engine.observer().wins, [(0, 2)]);
    assert!(engine.is_won());
    assert!(!engine.is_in_progress());

    engine.resume();
    assert!(!engine.is_in_progress());

    engine.undo();
    engine.make_move(Move::player(
        PileId::Lane(1),
        PileId::Foundation(12),
        &[card("spades13")],
    ));
    assert_eq!(engine.observer().wins.len(), 1);
}

#[test]
fn test_animated_auto_play_waits() {
    let mut engine = engine(
        "Stock: clubs9\nLane1: | hearts1\nLane2: | diamonds1",
        Config {
            animate_auto_play: true,
            ..config(AutoPlayMode::Always, true)
        },
    );

    engine.make_move(Move::stock());
    assert_eq!(engine.pending_moves(), 1);
    assert_eq!(engine.foundation_card(1), Some(card("hearts1")));
    assert_eq!(engine.lane(2).top(), Some(card("diamonds1")));

    engine.animation_completed();
    assert_eq!(engine.pending_moves(), 1);
    assert_eq!(engine.foundation_card(2), Some(card("diamonds1")));

    engine.animation_completed();
    assert_eq!(engine.pending_moves(), 0);
    assert_eq!(engine.observer().animated.len(), 2);
    assert_eq!(engine.move_count(), 3);

    // A stray acknowledgment changes nothing.
    engine.animation_completed();
    assert_eq!(engine.pending_moves(), 0);
    assert_eq!(engine.move_count(), 3);
}

#[test]
fn test_animated_undo() {
    let mut engine = engine(
        "Lane1: | spades10\nLane2: | hearts9",
        Config {
            animate_undo: true,
            ..config(AutoPlayMode::Never, false)
        },
    );
    engine.make_move(Move::player(
        PileId::Lane(2),
        PileId::Lane(1),
        &[card("hearts9")],
    ));
    assert!(engine.observer().animated.is_empty());
    engine.observer_mut().lane_renders.clear();

    engine.undo();
    let animated: Vec<String> = engine.observer().animated.iter().map(Move::to_string).collect();
    assert_eq!(animated, ["UNDO:1>2:hearts9"]);
    // Only the source lane is redrawn; the animation delivers the card.
    assert_eq!(engine.observer().lane_renders, [1]);
    assert_eq!(engine.pending_moves(), 0);
    assert_eq!(engine.lane(2).top(), Some(card("hearts9")));

    // Undo animations are not acknowledged through the pending counter.
    engine.animation_completed();
    assert_eq!(engine.pending_moves(), 0);
    assert_eq!(engine.move_count(), 1);
    assert_eq!(engine.lane(1).top(), Some(card("spades10")));
}

#[test]
fn test_foundation_to_lane_locks_lane() {
    let mut engine = engine(
        "Stock: clubs9\nFoundation1: hearts5\nLane1: | spades6",
        config(AutoPlayMode::Always, true),
    );

    engine.make_move(Move::player(
        PileId::Foundation(1),
        PileId::Lane(1),
        &[card("hearts5")],
    ));
    assert_eq!(engine.lane(1).top(), Some(card("hearts5")));
    assert_eq!(engine.foundation_card(1), Some(card("hearts4")));
    assert!(engine.session().locks.is_locked(1));

    // Any other move releases the lock.
    engine.make_move(Move::stock());
    assert_eq!(engine.foundation_card(1), Some(card("hearts5")));
    assert_eq!(engine.lane(1).top(), Some(card("spades6")));
    assert_eq!(engine.session().locks, LaneLocks::default());
    assert_eq!(engine.move_count(), 3);
}

#[test]
fn test_try_auto_play_ignores_mode() {
    let mut engine = engine(
        "Waste: clubs1\nLane1: | hearts1\nLane2: | hearts2",
        config(AutoPlayMode::Never, false),
    );
    assert!(!engine.try_auto_play_lane(2));
    assert!(engine.try_auto_play_lane(1));
    assert!(engine.try_auto_play_lane(2));
    assert_eq!(engine.foundation_card(1), Some(card("hearts2")));
    assert!(engine.try_auto_play_waste());
    assert_eq!(engine.foundation_card(2), Some(card("clubs1")));
    assert!(!engine.try_auto_play_waste());
}

#[test]
fn test_clock() {
    let mut engine = engine("Stock: clubs1", config(AutoPlayMode::Never, false));
    engine.resume();
    engine.tick();
    assert_eq!(engine.elapsed_seconds(), 0);

    engine.make_move(Move::stock());
    engine.tick();
    engine.tick();
    assert_eq!(engine.elapsed_seconds(), 2);
    assert_eq!(engine.observer().elapsed, 2);

    engine.pause();
    engine.tick();
    assert_eq!(engine.elapsed_seconds(), 2);
    engine.resume();
    engine.tick();
    assert_eq!(engine.elapsed_seconds(), 3);
}

#[test]
fn test_undo_restores_dealt_game() {
    let mut engine = Engine::new(config(AutoPlayMode::Always, true), Recorder::default());
    engine.new_game_with_seed(2024);
    let dealt = engine.board().clone();

    for _ in 0..40 {
        engine.make_move(Move::stock());
        assert!(engine.board().is_valid());
    }
    assert!(engine.history().len() >= 40);

    while engine.can_undo() {
        engine.undo();
        assert_eq!(engine.board().card_count(), TOTAL_CARDS);
    }
    assert_eq!(engine.board(), &dealt);
}

#[test]
fn test_new_game_resets_session() {
    let mut engine = Engine::new(Config::default(), Recorder::default());
    engine.set_game_id(7);
    engine.make_move(Move::stock());
    engine.new_game_with_seed(1);
    assert_eq!(engine.board(), &Board::new_from_seed(1));
    assert_eq!(engine.session(), &Session::default());
    assert!(!engine.can_undo());
    assert_eq!(engine.game_id(), None);
}
