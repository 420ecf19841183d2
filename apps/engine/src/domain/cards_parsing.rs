//! Card parsing from string tokens (e.g., "AS", "TH", "SJ", "BJ")

use std::fmt;
use std::str::FromStr;

use super::cards_types::{Card, JokerRank, Rank, Suit};
use crate::errors::domain::{DomainError, ValidationKind};

impl FromStr for Card {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SJ" => return Ok(Card::SMALL_JOKER),
            "BJ" => return Ok(Card::BIG_JOKER),
            _ => {}
        }
        if s.len() != 2 {
            return Err(DomainError::validation(
                ValidationKind::ParseCard,
                format!("Parse card: {s}"),
            ));
        }
        let mut chars = s.chars();
        let rank_ch = chars.next().ok_or_else(|| {
            DomainError::validation(ValidationKind::ParseCard, format!("Parse card: {s}"))
        })?;
        let suit_ch = chars.next().ok_or_else(|| {
            DomainError::validation(ValidationKind::ParseCard, format!("Parse card: {s}"))
        })?;
        let rank = match rank_ch {
            '2' => Rank::Two,
            '3' => Rank::Three,
            '4' => Rank::Four,
            '5' => Rank::Five,
            '6' => Rank::Six,
            '7' => Rank::Seven,
            '8' => Rank::Eight,
            '9' => Rank::Nine,
            'T' => Rank::Ten,
            'J' => Rank::Jack,
            'Q' => Rank::Queen,
            'K' => Rank::King,
            'A' => Rank::Ace,
            _ => {
                return Err(DomainError::validation(
                    ValidationKind::ParseCard,
                    format!("Parse card: {s}"),
                ))
            }
        };
        let suit = match suit_ch {
            'C' => Suit::Clubs,
            'D' => Suit::Diamonds,
            'H' => Suit::Hearts,
            'S' => Suit::Spades,
            _ => {
                return Err(DomainError::validation(
                    ValidationKind::ParseCard,
                    format!("Parse card: {s}"),
                ))
            }
        };
        Ok(Card::Suited { suit, rank })
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Card::Joker(JokerRank::Small) => f.write_str("SJ"),
            Card::Joker(JokerRank::Big) => f.write_str("BJ"),
            Card::Suited { suit, rank } => {
                let r = match rank {
                    Rank::Two => '2',
                    Rank::Three => '3',
                    Rank::Four => '4',
                    Rank::Five => '5',
                    Rank::Six => '6',
                    Rank::Seven => '7',
                    Rank::Eight => '8',
                    Rank::Nine => '9',
                    Rank::Ten => 'T',
                    Rank::Jack => 'J',
                    Rank::Queen => 'Q',
                    Rank::King => 'K',
                    Rank::Ace => 'A',
                };
                let s = match suit {
                    Suit::Clubs => 'C',
                    Suit::Diamonds => 'D',
                    Suit::Hearts => 'H',
                    Suit::Spades => 'S',
                };
                write!(f, "{r}{s}")
            }
        }
    }
}

/// Non-panicking helper to parse card tokens into Card instances.
pub fn try_parse_cards<I, S>(tokens: I) -> Result<Vec<Card>, DomainError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tokens
        .into_iter()
        .map(|t| t.as_ref().parse::<Card>())
        .collect()
}
