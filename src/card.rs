use anyhow::{Context, Result, bail};
use std::{fmt, str::FromStr};

pub const MAX_RANK: u8 = 13;
pub const MAX_SUIT: u8 = 4;
pub const DECK_COUNT: usize = 3;
pub const TOTAL_CARDS: usize = DECK_COUNT * (MAX_SUIT * MAX_RANK) as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];

    pub fn name(self) -> &'static str {
        match self {
            Suit::Clubs => "clubs",
            Suit::Diamonds => "diamonds",
            Suit::Hearts => "hearts",
            Suit::Spades => "spades",
        }
    }

    pub fn color(self) -> Color {
        match self {
            Suit::Clubs | Suit::Spades => Color::Dark,
            Suit::Diamonds | Suit::Hearts => Color::Light,
        }
    }
}

impl FromStr for Suit {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Suit::ALL
            .into_iter()
            .find(|suit| suit.name() == s)
            .with_context(|| format!("Invalid suit '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Dark,
    Light,
}

/// A single card; the three decks share identities, so two `hearts7` compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Card(u8);

impl Card {
    /// `rank` runs from 1 (ace) to 13 (king).
    pub fn new(suit: Suit, rank: u8) -> Self {
        debug_assert!((1..=MAX_RANK).contains(&rank));
        Self(suit as u8 * MAX_RANK + rank - 1)
    }

    pub fn id(&self) -> u8 {
        self.0
    }

    pub fn rank(&self) -> u8 {
        self.0 % MAX_RANK + 1
    }

    pub fn suit(&self) -> Suit {
        Suit::ALL[(self.0 / MAX_RANK) as usize]
    }

    pub fn color(&self) -> Color {
        self.suit().color()
    }

    pub fn is_ace(&self) -> bool {
        self.rank() == 1
    }

    pub fn is_king(&self) -> bool {
        self.rank() == MAX_RANK
    }

    pub fn next_in_suit(&self) -> Option<Card> {
        if self.is_king() {
            None
        } else {
            Some(Card(self.0 + 1))
        }
    }

    /// The card underneath this one on a foundation; `None` for an ace.
    pub fn prev_in_suit(&self) -> Option<Card> {
        if self.is_ace() {
            None
        } else {
            Some(Card(self.0 - 1))
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.suit().name(), self.rank())
    }
}

impl FromStr for Card {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let split = s
            .find(|c: char| c.is_ascii_digit())
            .with_context(|| format!("Missing rank in card '{s}'"))?;
        let (suit, rank) = s.split_at(split);
        let suit = suit.parse::<Suit>().with_context(|| format!("Invalid card '{s}'"))?;
        let rank = rank
            .parse::<u8>()
            .with_context(|| format!("Invalid rank in card '{s}'"))?;
        if !(1..=MAX_RANK).contains(&rank) {
            bail!("Rank out of range in card '{s}'");
        }
        Ok(Card::new(suit, rank))
    }
}

/// All 156 cards, deck by deck, in suit then rank order.
pub fn triple_deck() -> [Card; TOTAL_CARDS] {
    const DECK_SIZE: usize = (MAX_SUIT * MAX_RANK) as usize;
    std::array::from_fn(|i| {
        let n = i % DECK_SIZE;
        let rank = (n % MAX_RANK as usize) as u8 + 1;
        Card::new(Suit::ALL[n / MAX_RANK as usize], rank)
    })
}

pub fn parse_cards<'a>(tokens: impl IntoIterator<Item = &'a str>) -> Result<Vec<Card>> {
    tokens.into_iter().map(|t| t.parse::<Card>()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_card() {
        let card: Card = "hearts12".parse().unwrap();
        assert_eq!(card.suit(), Suit::Hearts);
        assert_eq!(card.rank(), 12);
        assert_eq!(card.to_string(), "hearts12");

        assert!("hearts".parse::<Card>().is_err());
        assert!("hearts0".parse::<Card>().is_err());
        assert!("hearts14".parse::<Card>().is_err());
        assert!("stars3".parse::<Card>().is_err());
        assert!("3".parse::<Card>().is_err());
    }

    #[test]
    fn test_in_suit_neighbours() {
        let ace = Card::new(Suit::Spades, 1);
        let king = Card::new(Suit::Clubs, 13);
        assert_eq!(ace.prev_in_suit(), None);
        assert_eq!(ace.next_in_suit(), Some(Card::new(Suit::Spades, 2)));
        assert_eq!(king.next_in_suit(), None);
        assert_eq!(king.prev_in_suit(), Some(Card::new(Suit::Clubs, 12)));
    }

    #[test]
    fn test_colors() {
        assert_eq!(Card::new(Suit::Clubs, 4).color(), Color::Dark);
        assert_eq!(Card::new(Suit::Spades, 4).color(), Color::Dark);
        assert_eq!(Card::new(Suit::Hearts, 4).color(), Color::Light);
        assert_eq!(Card::new(Suit::Diamonds, 4).color(), Color::Light);
    }

    #[test]
    fn test_triple_deck() {
        let deck = triple_deck();
        assert_eq!(deck.len(), TOTAL_CARDS);
        let mut counts = [0; (MAX_SUIT * MAX_RANK) as usize];
        for card in &deck {
            counts[card.id() as usize] += 1;
        }
        assert!(counts.iter().all(|&n| n == DECK_COUNT));
    }
}
