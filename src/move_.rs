use crate::board::{TOTAL_FOUNDATIONS, TOTAL_LANES};
use crate::card::Card;

use anyhow::{Context, Result, anyhow, bail};
use smallvec::SmallVec;
use std::{fmt, str::FromStr};

/// Cards carried by a move, bottom card first.
pub type Cascade = SmallVec<[Card; 4]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKind {
    /// A card played to a foundation by the engine itself.
    AutoPlay,
    /// Turning over the top stack card of a lane.
    Flip,
    /// A drag and drop made by the player.
    PlayerMove,
    /// A click on the stock: draw up to three cards, or recycle the waste.
    Stock,
    Undo,
    UndoFlip,
    UndoStock,
}

impl MoveKind {
    const ALL: [MoveKind; 7] = [
        MoveKind::AutoPlay,
        MoveKind::Flip,
        MoveKind::PlayerMove,
        MoveKind::Stock,
        MoveKind::Undo,
        MoveKind::UndoFlip,
        MoveKind::UndoStock,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MoveKind::AutoPlay => "AUTO_PLAY",
            MoveKind::Flip => "FLIP",
            MoveKind::PlayerMove => "PLAYER_MOVE",
            MoveKind::Stock => "STOCK",
            MoveKind::Undo => "UNDO",
            MoveKind::UndoFlip => "UNDO_FLIP",
            MoveKind::UndoStock => "UNDO_STOCK",
        }
    }

    pub fn is_undo(self) -> bool {
        matches!(
            self,
            MoveKind::Undo | MoveKind::UndoFlip | MoveKind::UndoStock
        )
    }
}

impl FromStr for MoveKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        MoveKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .with_context(|| format!("Unknown move type '{s}'"))
    }
}

/// A location on the table. Lanes and foundations are numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PileId {
    Waste,
    Lane(usize),
    Foundation(usize),
}

impl PileId {
    /// Signed index used by the move text encoding: lanes `1..=13`, waste `0`,
    /// foundations `-1..=-12`.
    pub fn index(self) -> i32 {
        match self {
            PileId::Waste => 0,
            PileId::Lane(n) => n as i32,
            PileId::Foundation(n) => -(n as i32),
        }
    }

    pub fn from_index(index: i32) -> Result<Self> {
        let pile = if index == 0 {
            PileId::Waste
        } else if index > 0 {
            PileId::Lane(index as usize)
        } else {
            PileId::Foundation(index.unsigned_abs() as usize)
        };
        match pile {
            PileId::Lane(n) if n > TOTAL_LANES => bail!("Lane index {index} out of range"),
            PileId::Foundation(n) if n > TOTAL_FOUNDATIONS => {
                bail!("Foundation index {index} out of range")
            }
            _ => Ok(pile),
        }
    }
}

/// One transition of the game, as applied by the engine and kept for undo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    pub kind: MoveKind,
    pub from: PileId,
    pub to: PileId,
    pub cascade: Cascade,
}

impl Move {
    /// A stock click before it is applied; the engine records what was drawn.
    pub fn stock() -> Self {
        Self::stock_with(MoveKind::Stock, Cascade::new())
    }

    pub fn flip(lane: usize) -> Self {
        Self {
            kind: MoveKind::Flip,
            from: PileId::Waste,
            to: PileId::Lane(lane),
            cascade: Cascade::new(),
        }
    }

    pub fn player(from: PileId, to: PileId, cards: &[Card]) -> Self {
        Self {
            kind: MoveKind::PlayerMove,
            from,
            to,
            cascade: cards.iter().copied().collect(),
        }
    }

    pub fn auto_play(from: PileId, to: PileId, card: Card) -> Self {
        Self {
            kind: MoveKind::AutoPlay,
            from,
            to,
            cascade: smallvec::smallvec![card],
        }
    }

    pub(crate) fn stock_with(kind: MoveKind, cascade: Cascade) -> Self {
        Self {
            kind,
            from: PileId::Waste,
            to: PileId::Waste,
            cascade,
        }
    }

    /// The single card moved, or the bottom card of a moved run.
    pub fn card(&self) -> Option<Card> {
        self.cascade.first().copied()
    }

    /// The move that exactly reverses this one.
    pub fn invert(&self) -> Move {
        match self.kind {
            MoveKind::Flip => Move {
                kind: MoveKind::UndoFlip,
                ..self.clone()
            },
            MoveKind::Stock => Self::stock_with(MoveKind::UndoStock, self.cascade.clone()),
            _ => Move {
                kind: MoveKind::Undo,
                from: self.to,
                to: self.from,
                cascade: self.cascade.clone(),
            },
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}>{}:",
            self.kind.name(),
            self.from.index(),
            self.to.index()
        )?;
        for (i, card) in self.cascade.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{card}")?;
        }
        Ok(())
    }
}

impl FromStr for Move {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let move_context = || format!("Failed to parse move '{s}'");
        let mut parts = s.splitn(3, ':');
        let kind = parts
            .next()
            .unwrap_or_default()
            .parse::<MoveKind>()
            .with_context(move_context)?;
        let route = parts
            .next()
            .ok_or_else(|| anyhow!("Missing route"))
            .with_context(move_context)?;
        let (from, to) = route
            .split_once('>')
            .ok_or_else(|| anyhow!("Route '{route}' has no '>'"))
            .with_context(move_context)?;
        let parse_pile = |value: &str| -> Result<PileId> {
            let index = value
                .parse::<i32>()
                .with_context(|| format!("Invalid pile index '{value}'"))?;
            PileId::from_index(index)
        };
        let from = parse_pile(from).with_context(move_context)?;
        let to = parse_pile(to).with_context(move_context)?;
        let cascade = match parts.next() {
            None | Some("") => Cascade::new(),
            Some(cards) => cards
                .split(';')
                .map(|card| card.parse::<Card>())
                .collect::<Result<Cascade>>()
                .with_context(move_context)?,
        };
        Ok(Move {
            kind,
            from,
            to,
            cascade,
        })
    }
}
