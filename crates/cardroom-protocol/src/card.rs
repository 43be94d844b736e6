//! The card model as it travels on the wire.
//!
//! Cards serialize as `{"id": 17, "rank": "draw-two", "color": "green"}`.
//! Wild ranks carry `"color": null`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// Unique identity of one physical card.
///
/// Ids are handed out by the engine from a counter that is never rewound,
/// so an id seen in one deal never reappears in a later one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub u64);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// One of the four concrete card colors.
///
/// There is no "black" variant: colorless cards have `color: None`, and
/// the active color of a table is always one of these four.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Red,
    Yellow,
    Green,
    Blue,
}

impl Color {
    /// All colors in deck-building order.
    pub const ALL: [Color; 4] = [Color::Red, Color::Yellow, Color::Green, Color::Blue];
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Color::Red => "red",
            Color::Yellow => "yellow",
            Color::Green => "green",
            Color::Blue => "blue",
        })
    }
}

impl FromStr for Color {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "red" => Ok(Color::Red),
            "yellow" => Ok(Color::Yellow),
            "green" => Ok(Color::Green),
            "blue" => Ok(Color::Blue),
            other => Err(ProtocolError::InvalidMessage(format!(
                "unknown color {other:?}"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Rank
// ---------------------------------------------------------------------------

/// What is printed on a card.
///
/// On the wire a rank is a single string: `"0"`..`"9"`, `"skip"`,
/// `"reverse"`, `"draw-two"`, `"wild"` or `"wild-draw-four"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Rank {
    /// A numeral card, 0 through 9.
    Number(u8),
    Skip,
    Reverse,
    DrawTwo,
    Wild,
    WildDrawFour,
}

impl Rank {
    /// Returns `true` for the two colorless ranks.
    pub fn is_wild(self) -> bool {
        matches!(self, Rank::Wild | Rank::WildDrawFour)
    }

    /// Returns `true` for numeral ranks.
    pub fn is_number(self) -> bool {
        matches!(self, Rank::Number(_))
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rank::Number(n) => write!(f, "{n}"),
            Rank::Skip => f.write_str("skip"),
            Rank::Reverse => f.write_str("reverse"),
            Rank::DrawTwo => f.write_str("draw-two"),
            Rank::Wild => f.write_str("wild"),
            Rank::WildDrawFour => f.write_str("wild-draw-four"),
        }
    }
}

impl FromStr for Rank {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "skip" => Ok(Rank::Skip),
            "reverse" => Ok(Rank::Reverse),
            "draw-two" => Ok(Rank::DrawTwo),
            "wild" => Ok(Rank::Wild),
            "wild-draw-four" => Ok(Rank::WildDrawFour),
            digit => match digit.parse::<u8>() {
                Ok(n) if n <= 9 => Ok(Rank::Number(n)),
                _ => Err(ProtocolError::InvalidMessage(format!(
                    "unknown rank {digit:?}"
                ))),
            },
        }
    }
}

impl TryFrom<String> for Rank {
    type Error = ProtocolError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Rank> for String {
    fn from(rank: Rank) -> Self {
        rank.to_string()
    }
}

// ---------------------------------------------------------------------------
// Card
// ---------------------------------------------------------------------------

/// A single card. Immutable once created.
///
/// The constructors enforce the one structural rule of the deck: wild
/// ranks are colorless and every other rank has a color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "WireCard")]
pub struct Card {
    id: CardId,
    rank: Rank,
    color: Option<Color>,
}

/// Unchecked wire shape of a [`Card`]; decoding goes through the
/// constructors.
#[derive(Deserialize)]
struct WireCard {
    id: CardId,
    rank: Rank,
    #[serde(default)]
    color: Option<Color>,
}

impl TryFrom<WireCard> for Card {
    type Error = ProtocolError;

    fn try_from(wire: WireCard) -> Result<Self, Self::Error> {
        let card = match wire.color {
            Some(color) => Card::colored(wire.id, wire.rank, color),
            None => Card::wild(wire.id, wire.rank),
        };
        card.ok_or_else(|| {
            let color = wire.color.map_or_else(|| "no".to_string(), |c| c.to_string());
            ProtocolError::InvalidMessage(format!("{} card with {color} color", wire.rank))
        })
    }
}

impl Card {
    /// Builds a colored card. Returns `None` for wild ranks and for
    /// numerals above 9.
    pub fn colored(id: CardId, rank: Rank, color: Color) -> Option<Self> {
        match rank {
            Rank::Wild | Rank::WildDrawFour => None,
            Rank::Number(n) if n > 9 => None,
            _ => Some(Self { id, rank, color: Some(color) }),
        }
    }

    /// Builds a colorless card. Returns `None` unless `rank` is wild.
    pub fn wild(id: CardId, rank: Rank) -> Option<Self> {
        rank.is_wild().then_some(Self { id, rank, color: None })
    }

    pub fn id(&self) -> CardId {
        self.id
    }

    pub fn rank(&self) -> Rank {
        self.rank
    }

    /// The card's color, `None` for wild ranks.
    pub fn color(&self) -> Option<Color> {
        self.color
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.color {
            Some(color) => write!(f, "{color} {}", self.rank),
            None => write!(f, "{}", self.rank),
        }
    }
}
