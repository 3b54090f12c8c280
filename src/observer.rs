use crate::card::Card;
use crate::move_::Move;

/// Receiver of the engine's UI notifications.
///
/// Lane and foundation numbers are 1-based. Every method defaults to doing
/// nothing, so a host only implements what it displays.
pub trait Observer {
    fn update_foundation(&mut self, _slot: usize) {}

    fn update_waste(&mut self) {}

    fn update_stock(&mut self) {}

    fn update_move_count(&mut self, _count: u32) {}

    fn update_elapsed_time(&mut self, _seconds: u32) {}

    /// Called when the undo history becomes empty or stops being empty.
    fn undo_availability_changed(&mut self, _available: bool) {}

    fn render_lane_stack_size(&mut self, _lane: usize, _size: usize) {}

    /// `cards` is the lane's whole cascade after the change.
    fn render_lane_cascade(&mut self, _lane: usize, _cards: &[Card]) {}

    fn flip_lane_top_card(&mut self, _lane: usize, _card: Card) {}

    /// Asks the host to animate `mv` to its destination.
    ///
    /// For an `AUTO_PLAY` move the host must call `Engine::animation_completed`
    /// exactly once when done; undo animations need no acknowledgment.
    fn request_animated_move(&mut self, _mv: &Move) {}

    /// The first move of a game was made.
    fn game_started(&mut self) {}

    fn signal_win(&mut self, _elapsed_seconds: u32, _move_count: u32) {}
}

/// An observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl Observer for NullObserver {}
