//! Flat key/value encoding of a whole game, for suspending and resuming play.

use crate::board::{Board, Lane, TOTAL_FOUNDATIONS, TOTAL_LANES};
use crate::card::{Card, TOTAL_CARDS, parse_cards};
use crate::engine::{LaneLocks, Session};
use crate::move_::Move;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const GAME_ID: &str = "game_id";
const ELAPSED_SECONDS: &str = "elapsed_seconds";
const MOVE_COUNT: &str = "move_count";
const LANE_LOCKS: &str = "autoplay_lane_locked";
const MOVES: &str = "moves";
const STOCK: &str = "stock";
const WASTE: &str = "waste";
const FOUNDATION: &str = "foundation";

fn lane_stack_key(i: usize) -> String {
    format!("lane_stack_{i}")
}

fn lane_cascade_key(i: usize) -> String {
    format!("lane_cascade_{i}")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    Int(i64),
    Flags(Vec<bool>),
    /// Cards or moves in their text form.
    List(Vec<String>),
    /// One entry per foundation slot, `None` for an empty slot.
    Slots(Vec<Option<String>>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    entries: BTreeMap<String, Value>,
}

impl Snapshot {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.entries.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize snapshot")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse snapshot")
    }

    fn value(&self, key: &str) -> Result<&Value> {
        self.get(key)
            .with_context(|| format!("Missing snapshot key '{key}'"))
    }

    fn int(&self, key: &str) -> Result<i64> {
        match self.value(key)? {
            Value::Int(n) => Ok(*n),
            other => bail!("Snapshot key '{key}' holds {other:?}, expected an integer"),
        }
    }

    fn count(&self, key: &str) -> Result<u32> {
        let n = self.int(key)?;
        u32::try_from(n).with_context(|| format!("Snapshot key '{key}' out of range: {n}"))
    }

    fn flags(&self, key: &str) -> Result<&[bool]> {
        match self.value(key)? {
            Value::Flags(flags) => Ok(flags),
            other => bail!("Snapshot key '{key}' holds {other:?}, expected flags"),
        }
    }

    fn list(&self, key: &str) -> Result<&[String]> {
        match self.value(key)? {
            Value::List(items) => Ok(items),
            other => bail!("Snapshot key '{key}' holds {other:?}, expected a list"),
        }
    }

    fn cards(&self, key: &str) -> Result<Vec<Card>> {
        parse_cards(self.list(key)?.iter().map(String::as_str))
            .with_context(|| format!("Invalid cards under snapshot key '{key}'"))
    }

    fn slots(&self, key: &str) -> Result<&[Option<String>]> {
        match self.value(key)? {
            Value::Slots(slots) => Ok(slots),
            other => bail!("Snapshot key '{key}' holds {other:?}, expected slots"),
        }
    }
}

fn card_list<'a>(cards: impl IntoIterator<Item = &'a Card>) -> Value {
    Value::List(cards.into_iter().map(Card::to_string).collect())
}

/// Everything needed to resume a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedGame {
    pub board: Board,
    pub session: Session,
    pub history: Vec<Move>,
}

impl SavedGame {
    pub fn encode(&self) -> Snapshot {
        let mut snapshot = Snapshot::default();
        let session = &self.session;
        snapshot.insert(GAME_ID, Value::Int(session.game_id.unwrap_or(-1)));
        snapshot.insert(ELAPSED_SECONDS, Value::Int(session.elapsed_seconds.into()));
        snapshot.insert(MOVE_COUNT, Value::Int(session.move_count.into()));
        snapshot.insert(LANE_LOCKS, Value::Flags(session.locks.to_flags().to_vec()));
        snapshot.insert(
            MOVES,
            Value::List(self.history.iter().map(Move::to_string).collect()),
        );

        let board = &self.board;
        snapshot.insert(STOCK, card_list(&board.stock));
        snapshot.insert(WASTE, card_list(&board.waste.cards));
        snapshot.insert(
            FOUNDATION,
            Value::Slots(
                board
                    .foundations
                    .iter()
                    .map(|slot| slot.map(|card| card.to_string()))
                    .collect(),
            ),
        );
        for (i, lane) in board.lanes.iter().enumerate() {
            snapshot.insert(lane_stack_key(i), card_list(&lane.stack));
            snapshot.insert(lane_cascade_key(i), card_list(&lane.cascade));
        }
        snapshot
    }

    /// Decodes and checks a snapshot. The table must hold all 156 cards.
    pub fn decode(snapshot: &Snapshot) -> Result<Self> {
        let game_id = snapshot.int(GAME_ID)?;
        let locks = snapshot.flags(LANE_LOCKS)?;
        if locks.len() != TOTAL_LANES {
            bail!("Expected {TOTAL_LANES} lane locks, found {}", locks.len());
        }
        let session = Session {
            game_id: (game_id >= 0).then_some(game_id),
            elapsed_seconds: snapshot.count(ELAPSED_SECONDS)?,
            move_count: snapshot.count(MOVE_COUNT)?,
            locks: LaneLocks::from_flags(locks),
            ..Default::default()
        };

        let history = snapshot
            .list(MOVES)?
            .iter()
            .map(|mv| mv.parse::<Move>())
            .collect::<Result<Vec<_>>>()?;

        let mut board = Board {
            stock: snapshot.cards(STOCK)?,
            ..Default::default()
        };
        board.waste.cards = snapshot.cards(WASTE)?.into();

        let slots = snapshot.slots(FOUNDATION)?;
        if slots.len() != TOTAL_FOUNDATIONS {
            bail!("Expected {TOTAL_FOUNDATIONS} foundations, found {}", slots.len());
        }
        for (slot, value) in board.foundations.iter_mut().zip(slots) {
            *slot = value
                .as_deref()
                .map(str::parse::<Card>)
                .transpose()
                .context("Invalid foundation card")?;
        }

        for (i, lane) in board.lanes.iter_mut().enumerate() {
            *lane = Lane {
                stack: snapshot.cards(&lane_stack_key(i))?.into(),
                cascade: snapshot.cards(&lane_cascade_key(i))?.into(),
            };
        }

        if !board.is_valid() {
            bail!(
                "Snapshot does not hold the three decks: {} of {TOTAL_CARDS} cards",
                board.card_count()
            );
        }

        Ok(Self {
            board,
            session,
            history,
        })
    }
}
