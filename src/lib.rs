pub mod board;
pub mod card;
pub mod config;
pub mod engine;
pub mod move_;
pub mod observer;
pub mod script;
pub mod snapshot;

pub use board::Board;
pub use card::{Card, Suit};
pub use config::{AutoPlayMode, Config};
pub use engine::Engine;
pub use move_::{Move, MoveKind, PileId};
pub use observer::{NullObserver, Observer};
pub use snapshot::Snapshot;
