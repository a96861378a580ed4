//! Tile values and their glyph representation.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use ahash::AHashMap;

use crate::error::{HandError, Result};

/// Number of distinct tiles (9 + 9 + 9 + 7).
pub const TILE_KINDS: usize = 34;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Suit {
    Characters,
    Circles,
    Bamboo,
    /// Winds and dragons, ranks 1..=7 (東南西北白發中).
    Honors,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Characters, Suit::Circles, Suit::Bamboo, Suit::Honors];

    #[inline]
    pub fn is_honor(self) -> bool {
        self == Suit::Honors
    }

    #[inline]
    pub fn max_rank(self) -> u8 {
        if self.is_honor() {
            7
        } else {
            9
        }
    }

    fn offset(self) -> usize {
        match self {
            Suit::Characters => 0,
            Suit::Circles => 9,
            Suit::Bamboo => 18,
            Suit::Honors => 27,
        }
    }

    fn glyphs(self) -> &'static [char] {
        match self {
            Suit::Characters => &['一', '二', '三', '四', '五', '六', '七', '八', '九'],
            Suit::Circles => &['①', '②', '③', '④', '⑤', '⑥', '⑦', '⑧', '⑨'],
            Suit::Bamboo => &['1', '2', '3', '4', '5', '6', '7', '8', '9'],
            Suit::Honors => &['東', '南', '西', '北', '白', '發', '中'],
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Suit::Characters => "萬",
            Suit::Circles => "筒",
            Suit::Bamboo => "索",
            Suit::Honors => "字",
        };
        f.write_str(s)
    }
}

/// A tile, identified purely by suit and rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tile {
    suit: Suit,
    rank: u8,
}

static LOOKUP: LazyLock<AHashMap<char, Tile>> = LazyLock::new(|| {
    let mut table = AHashMap::with_capacity(TILE_KINDS);
    for suit in Suit::ALL {
        for (i, &c) in suit.glyphs().iter().enumerate() {
            table.insert(c, Tile { suit, rank: i as u8 + 1 });
        }
    }
    table
});

/// Characters skipped while tokenizing a tile string.
#[inline]
fn is_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, ',' | '、' | '/' | '|')
}

impl Tile {
    /// `None` when `rank` is outside the suit's range.
    #[must_use]
    pub fn new(suit: Suit, rank: u8) -> Option<Self> {
        (1..=suit.max_rank())
            .contains(&rank)
            .then_some(Tile { suit, rank })
    }

    #[inline]
    pub fn suit(self) -> Suit {
        self.suit
    }

    #[inline]
    pub fn rank(self) -> u8 {
        self.rank
    }

    /// 0..33 (1m..9m, 1p..9p, 1s..9s, 東..中)
    #[inline]
    pub fn index(self) -> usize {
        self.suit.offset() + self.rank as usize - 1
    }

    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        let (suit, base) = match index {
            0..=8 => (Suit::Characters, 0),
            9..=17 => (Suit::Circles, 9),
            18..=26 => (Suit::Bamboo, 18),
            27..=33 => (Suit::Honors, 27),
            _ => return None,
        };
        Some(Tile {
            suit,
            rank: (index - base) as u8 + 1,
        })
    }

    /// Terminals (1, 9) and every honor.
    #[inline]
    pub fn is_terminal_or_honor(self) -> bool {
        self.suit.is_honor() || self.rank == 1 || self.rank == 9
    }

    pub fn parse(glyph: char) -> Result<Self> {
        LOOKUP
            .get(&glyph)
            .copied()
            .ok_or(HandError::InvalidTile(glyph))
    }

    pub fn glyph(self) -> char {
        self.suit.glyphs()[self.rank as usize - 1]
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.glyph())
    }
}

impl FromStr for Tile {
    type Err = HandError;

    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.chars().filter(|&c| !is_separator(c));
        match (chars.next(), chars.next()) {
            (Some(c), None) => Tile::parse(c),
            (Some(_), Some(c)) => Err(HandError::InvalidTile(c)),
            (None, _) => Err(HandError::InvalidTile(' ')),
        }
    }
}

/// Parse a glyph string such as `"一二三 ①①"` into tiles, in input order.
/// Fails on the first unrecognized character.
pub fn parse_tiles(s: &str) -> Result<Vec<Tile>> {
    s.chars()
        .filter(|&c| !is_separator(c))
        .map(Tile::parse)
        .collect()
}

/// Count table indexed by [`Tile::index`].
#[must_use]
pub fn count_tiles(tiles: &[Tile]) -> [u8; TILE_KINDS] {
    let mut counts = [0; TILE_KINDS];
    for t in tiles {
        counts[t.index()] += 1;
    }
    counts
}

#[must_use]
pub fn tiles_to_string(tiles: &[Tile]) -> String {
    tiles.iter().map(|t| t.glyph()).collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_glyphs() {
        let tiles = parse_tiles("一九 ①⑨, 19、東中").unwrap();
        let expected: Vec<_> = [
            (Suit::Characters, 1),
            (Suit::Characters, 9),
            (Suit::Circles, 1),
            (Suit::Circles, 9),
            (Suit::Bamboo, 1),
            (Suit::Bamboo, 9),
            (Suit::Honors, 1),
            (Suit::Honors, 7),
        ]
        .into_iter()
        .map(|(s, r)| Tile::new(s, r).unwrap())
        .collect();
        assert_eq!(tiles, expected);
        assert_eq!(tiles_to_string(&tiles), "一九①⑨19東中");
    }

    #[test]
    fn reject_unknown() {
        assert_eq!(parse_tiles("一二x"), Err(HandError::InvalidTile('x')));
        assert_eq!("0".parse::<Tile>(), Err(HandError::InvalidTile('0')));
        assert_eq!("東".parse::<Tile>().unwrap().rank(), 1);
    }

    #[test]
    fn index_roundtrip() {
        for i in 0..TILE_KINDS {
            let t = Tile::from_index(i).unwrap();
            assert_eq!(t.index(), i);
            assert_eq!(Tile::parse(t.glyph()).unwrap(), t);
        }
        assert!(Tile::from_index(TILE_KINDS).is_none());
        assert!(Tile::new(Suit::Honors, 8).is_none());
        assert!(Tile::new(Suit::Bamboo, 0).is_none());
    }
}
