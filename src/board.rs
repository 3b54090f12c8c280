use crate::card::{Card, MAX_RANK, MAX_SUIT, TOTAL_CARDS, parse_cards, triple_deck};
use crate::move_::PileId;

use anyhow::{Context, Result, bail};
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use smallvec::SmallVec;
use std::collections::VecDeque;

pub const TOTAL_LANES: usize = 13;
pub const TOTAL_FOUNDATIONS: usize = 12;
pub const STOCK_SIZE: usize = 65;
pub const DRAW_COUNT: usize = 3;
pub const VISIBLE_WASTE: usize = 3;

const LANE_SIZE: usize = 13;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    /// Undealt cards, top of the pile last.
    pub stock: Vec<Card>,
    pub waste: WastePile,
    /// Highest card placed on each foundation slot.
    pub foundations: [Option<Card>; TOTAL_FOUNDATIONS],
    pub lanes: [Lane; TOTAL_LANES],
}

impl Board {
    pub fn new_from_seed(seed: u64) -> Self {
        let mut deck = triple_deck();
        deck.shuffle(&mut StdRng::seed_from_u64(seed));
        Self::deal(&deck)
    }

    /// Deals a full deck: the first 65 cards form the stock, then lane `i`
    /// (0-based) receives `i` face-down cards and one face-up card.
    pub fn deal(deck: &[Card; TOTAL_CARDS]) -> Self {
        let mut board = Board {
            stock: deck[..STOCK_SIZE].to_vec(),
            ..Default::default()
        };
        let mut m = STOCK_SIZE;
        for (i, lane) in board.lanes.iter_mut().enumerate() {
            lane.stack.extend_from_slice(&deck[m..m + i]);
            m += i;
            lane.cascade.push(deck[m]);
            m += 1;
        }
        board
    }

    /// # Panics
    ///
    /// Panics unless `lane` is in `1..=13`.
    pub fn lane(&self, lane: usize) -> &Lane {
        &self.lanes[lane - 1]
    }

    /// # Panics
    ///
    /// Panics unless `slot` is in `1..=12`.
    pub fn foundation(&self, slot: usize) -> Option<Card> {
        self.foundations[slot - 1]
    }

    fn get_lane(&self, lane: usize) -> Option<&Lane> {
        self.lanes.get(lane.checked_sub(1)?)
    }

    pub fn card_count(&self) -> usize {
        let foundation_count: usize = self
            .foundations
            .iter()
            .flatten()
            .map(|card| card.rank() as usize)
            .sum();
        let lane_count: usize = self.lanes.iter().map(Lane::len).sum();
        self.stock.len() + self.waste.len() + foundation_count + lane_count
    }

    /// Whether every card of the three decks is on the table exactly once.
    pub fn is_valid(&self) -> bool {
        let mut seen = [0_usize; (MAX_SUIT * MAX_RANK) as usize];
        let mut count = |cards: &mut dyn Iterator<Item = Card>| {
            for card in cards {
                seen[card.id() as usize] += 1;
            }
        };
        count(&mut self.stock.iter().copied());
        count(&mut self.waste.cards.iter().copied());
        for top in self.foundations.iter().flatten() {
            count(&mut std::iter::successors(Some(*top), Card::prev_in_suit));
        }
        for lane in &self.lanes {
            count(&mut lane.stack.iter().chain(&lane.cascade).copied());
        }
        let expected = TOTAL_CARDS / seen.len();
        seen.iter().all(|&n| n == expected)
    }

    pub fn is_won(&self) -> bool {
        self.foundations
            .iter()
            .all(|card| card.is_some_and(|card| card.is_king()))
    }

    /// Drop probes answer `false` for lane and slot numbers off the table.
    pub fn accepts_foundation_drop(&self, slot: usize, cards: &[Card]) -> bool {
        let [card] = cards else {
            return false;
        };
        let Some(top) = slot.checked_sub(1).and_then(|i| self.foundations.get(i)) else {
            return false;
        };
        match top {
            None => card.is_ace(),
            Some(top) => top.next_in_suit() == Some(*card),
        }
    }

    pub fn accepts_cascade_drop(&self, lane: usize, bottom_card: Card) -> bool {
        match self.get_lane(lane).and_then(Lane::top) {
            Some(top) => bottom_card.rank() + 1 == top.rank() && bottom_card.color() != top.color(),
            None => false,
        }
    }

    pub fn accepts_lane_drop(&self, lane: usize, lead_card: Card) -> bool {
        self.get_lane(lane).is_some_and(Lane::is_empty) && lead_card.is_king()
    }

    /// Draws up to three cards onto the waste and returns them in draw order.
    pub fn draw(&mut self) -> SmallVec<[Card; DRAW_COUNT]> {
        let num = DRAW_COUNT.min(self.stock.len());
        let drawn: SmallVec<[Card; DRAW_COUNT]> =
            self.stock.drain(self.stock.len() - num..).rev().collect();
        for &card in &drawn {
            self.waste.cards.push_front(card);
        }
        drawn
    }

    /// Puts drawn cards back, `drawn` being in the order `draw` returned them.
    pub fn undraw(&mut self, drawn: &[Card]) {
        for &card in drawn.iter().rev() {
            self.waste.cards.pop_front();
            self.stock.push(card);
        }
    }

    /// Turns the whole waste over into the stock, oldest card on top.
    pub fn recycle_waste(&mut self) {
        self.stock.extend(self.waste.cards.drain(..));
    }

    pub fn unrecycle_waste(&mut self) {
        self.waste.cards.extend(self.stock.drain(..));
    }

    pub fn flip(&mut self, lane: usize) -> Option<Card> {
        let lane = &mut self.lanes[lane - 1];
        let card = lane.stack.pop()?;
        lane.cascade.push(card);
        Some(card)
    }

    pub fn unflip(&mut self, lane: usize) -> Option<Card> {
        let lane = &mut self.lanes[lane - 1];
        if lane.cascade.is_empty() {
            return None;
        }
        let card = lane.cascade.remove(0);
        lane.stack.push(card);
        Some(card)
    }

    /// Removes `cards` from the top of `pile`. The caller guarantees they are there.
    pub fn take(&mut self, pile: PileId, cards: &[Card]) {
        match pile {
            PileId::Foundation(slot) => {
                self.foundations[slot - 1] = cards.first().and_then(Card::prev_in_suit);
            }
            PileId::Waste => {
                self.waste.cards.pop_front();
            }
            PileId::Lane(lane) => {
                let cascade = &mut self.lanes[lane - 1].cascade;
                cascade.truncate(cascade.len().saturating_sub(cards.len()));
            }
        }
    }

    pub fn put(&mut self, pile: PileId, cards: &[Card]) {
        let Some(&card) = cards.first() else {
            return;
        };
        match pile {
            PileId::Foundation(slot) => self.foundations[slot - 1] = Some(card),
            PileId::Waste => self.waste.cards.push_front(card),
            PileId::Lane(lane) => self.lanes[lane - 1].cascade.extend_from_slice(cards),
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut board: Self = Default::default();

        for line in content
            .split('\n')
            .map(|v| v.trim())
            .filter(|l| !l.is_empty())
        {
            let line_context = || format!("Failed to parse at '{line}'");
            if let Some(rest) = line.strip_prefix("Stock:") {
                board.stock = parse_cards(rest.split_whitespace()).with_context(line_context)?;
            } else if let Some(rest) = line.strip_prefix("Waste:") {
                let cards = parse_cards(rest.split_whitespace()).with_context(line_context)?;
                board.waste.cards = cards.into();
            } else if let Some(rest) = line.strip_prefix("Foundation") {
                let (idx, cards) = Self::parse_numbered(rest, TOTAL_FOUNDATIONS)
                    .context("Invalid foundation index")
                    .with_context(line_context)?;
                let cards = parse_cards(cards.split_whitespace()).with_context(line_context)?;
                board.foundations[idx - 1] = cards.last().copied();
            } else if let Some(rest) = line.strip_prefix("Lane") {
                let (idx, cards_str) = Self::parse_numbered(rest, TOTAL_LANES)
                    .context("Invalid lane index")
                    .with_context(line_context)?;
                let (before, after) = cards_str.split_once('|').unwrap_or(("", cards_str));
                let lane = &mut board.lanes[idx - 1];
                lane.stack = parse_cards(before.split_whitespace())
                    .with_context(line_context)?
                    .into();
                lane.cascade = parse_cards(after.split_whitespace())
                    .with_context(line_context)?
                    .into();
            } else {
                bail!("Unknown line '{line}'");
            }
        }

        Ok(board)
    }

    fn parse_numbered(rest: &str, max: usize) -> Result<(usize, &str)> {
        let (idx, cards) = rest.split_once(':').context("Missing ':'")?;
        let idx = idx.trim().parse::<usize>()?;
        if !(1..=max).contains(&idx) {
            bail!("Index {idx} out of range");
        }
        Ok((idx, cards))
    }

    pub fn pretty_print(&self) -> String {
        let mut output = String::new();

        if !self.stock.is_empty() {
            output.push_str(&format!("Stock: {}\n", join_cards(&self.stock)));
        }

        if !self.waste.is_empty() {
            output.push_str(&format!("Waste: {}\n", join_cards(&self.waste.cards)));
        }

        for (i, card) in self.foundations.iter().enumerate() {
            if let Some(card) = card {
                output.push_str(&format!("Foundation{}: {card}\n", i + 1));
            }
        }

        for (i, lane) in self.lanes.iter().enumerate() {
            if lane.is_empty() {
                continue;
            }
            output.push_str(&format!("Lane{}:", i + 1));
            if !lane.stack.is_empty() {
                output.push(' ');
                output.push_str(&join_cards(&lane.stack));
            }
            output.push_str(" |");
            if !lane.cascade.is_empty() {
                output.push(' ');
                output.push_str(&join_cards(&lane.cascade));
            }
            output.push('\n');
        }

        output.trim_end().to_string()
    }
}

fn join_cards<'a>(cards: impl IntoIterator<Item = &'a Card>) -> String {
    cards
        .into_iter()
        .map(Card::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Drawn cards, most recent first. Only the first three are visible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WastePile {
    pub cards: VecDeque<Card>,
}

impl WastePile {
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn peek_top(&self) -> Option<Card> {
        self.cards.front().copied()
    }

    pub fn get(&self, index: usize) -> Option<Card> {
        self.cards.get(index).copied()
    }

    pub fn visible(&self) -> impl Iterator<Item = Card> + '_ {
        self.cards.iter().take(VISIBLE_WASTE).copied()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lane {
    /// Face-down cards, top of the stack last.
    pub stack: SmallVec<[Card; LANE_SIZE]>,
    /// Face-up run, top (uncovered) card last.
    pub cascade: SmallVec<[Card; LANE_SIZE]>,
}

impl Lane {
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty() && self.cascade.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stack.len() + self.cascade.len()
    }

    pub fn top(&self) -> Option<Card> {
        self.cascade.last().copied()
    }

    /// Whether the top stack card is waiting to be turned over.
    pub fn needs_flip(&self) -> bool {
        self.cascade.is_empty() && !self.stack.is_empty()
    }
}
