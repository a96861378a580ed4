//! Classified clusters of same-suit tiles.

use std::fmt;

use crate::error::{HandError, Result};
use crate::tile::{parse_tiles, tiles_to_string, Suit, Tile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    Triplet,
    Run,
    Quad,
    Pair,
    /// Two consecutive ranks, e.g. 4-5.
    ProtoRun,
    /// Two ranks with one gap, e.g. 4-6.
    Kanchan,
    Isolated,
}

impl Kind {
    #[inline]
    pub fn is_complete(self) -> bool {
        matches!(self, Kind::Triplet | Kind::Run | Kind::Quad)
    }

    #[inline]
    pub fn is_partial(self) -> bool {
        matches!(self, Kind::Pair | Kind::ProtoRun | Kind::Kanchan)
    }

    /// Rank offsets covered by this kind, relative to the anchor.
    pub fn offsets(self) -> &'static [u8] {
        match self {
            Kind::Triplet => &[0, 0, 0],
            Kind::Run => &[0, 1, 2],
            Kind::Quad => &[0, 0, 0, 0],
            Kind::Pair => &[0, 0],
            Kind::ProtoRun => &[0, 1],
            Kind::Kanchan => &[0, 2],
            Kind::Isolated => &[0],
        }
    }

    /// Display glyph; never used as a discriminant.
    pub fn glyph(self) -> char {
        match self {
            Kind::Triplet => '刻',
            Kind::Run => '順',
            Kind::Quad => '槓',
            Kind::Pair => '対',
            Kind::ProtoRun => '塔',
            Kind::Kanchan => '嵌',
            Kind::Isolated => '単',
        }
    }
}

/// Where a group's tiles sit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Origin {
    /// Part of the concealed hand, including a declared concealed quad.
    #[default]
    Concealed,
    /// Claimed from another player and exposed.
    Called,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Group {
    pub suit: Suit,
    pub kind: Kind,
    /// Smallest rank in the group.
    pub rank: u8,
    /// Set on the single pair serving as the hand's head.
    pub head: bool,
    pub origin: Origin,
}

impl Group {
    #[must_use]
    pub fn new(suit: Suit, kind: Kind, rank: u8) -> Self {
        Group {
            suit,
            kind,
            rank,
            head: false,
            origin: Origin::Concealed,
        }
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.kind.is_complete()
    }

    #[inline]
    pub fn is_called(&self) -> bool {
        self.origin == Origin::Called
    }

    pub fn tiles(&self) -> Vec<Tile> {
        self.kind
            .offsets()
            .iter()
            .filter_map(|&o| Tile::new(self.suit, self.rank + o))
            .collect()
    }

    /// Tiles that turn this partial group into a complete one.
    /// Empty for complete groups and isolated tiles.
    pub fn waits(&self) -> Vec<Tile> {
        match self.kind {
            Kind::Pair => Tile::new(self.suit, self.rank).into_iter().collect(),
            Kind::ProtoRun => {
                let mut waits = vec![];
                if self.rank > 1 {
                    waits.extend(Tile::new(self.suit, self.rank - 1));
                }
                waits.extend(Tile::new(self.suit, self.rank + 2));
                waits
            }
            Kind::Kanchan => Tile::new(self.suit, self.rank + 1).into_iter().collect(),
            _ => vec![],
        }
    }

    /// Classify 2-4 tiles into one group. Partial shapes are only accepted
    /// with `allow_partial`, quads only with `allow_quad`.
    pub fn from_tiles(tiles: &[Tile], allow_partial: bool, allow_quad: bool) -> Option<Self> {
        let first = tiles.first()?;
        let suit = first.suit();
        if tiles.iter().any(|t| t.suit() != suit) {
            return None;
        }

        let n = tiles.len();
        if !((2..=3).contains(&n) || (n == 4 && allow_quad)) {
            return None;
        }

        let mut ranks: Vec<u8> = tiles.iter().map(|t| t.rank()).collect();
        ranks.sort_unstable();
        let low = ranks[0];

        let kind = if ranks.iter().all(|&r| r == low) {
            match n {
                4 => Kind::Quad,
                3 => Kind::Triplet,
                _ => Kind::Pair,
            }
        } else {
            if suit.is_honor() || n == 4 {
                return None;
            }
            if ranks.windows(2).all(|w| w[0] + 1 == w[1]) {
                if n == 3 {
                    Kind::Run
                } else {
                    Kind::ProtoRun
                }
            } else if n == 2 && low + 2 == ranks[1] {
                Kind::Kanchan
            } else {
                return None;
            }
        };

        if kind.is_partial() && !allow_partial {
            return None;
        }
        Some(Group::new(suit, kind, low))
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = tiles_to_string(&self.tiles());
        if self.is_called() {
            write!(f, "({body})")
        } else {
            f.write_str(&body)
        }
    }
}

/// Marker after a quad's glyphs flagging it as concealed.
pub const CONCEALED_QUAD_MARK: char = '*';

/// Parse one declared meld such as `"①②③"`, `"東東東"` or `"九九九九*"`.
///
/// A trailing `*` is only valid on a quad and marks it as concealed; every
/// other declared meld is treated as called.
pub fn parse_meld(text: &str) -> Result<Group> {
    let invalid = |reason| HandError::InvalidMeld {
        text: text.to_owned(),
        reason,
    };

    let trimmed = text.trim_end();
    let (body, concealed) = match trimmed.strip_suffix(CONCEALED_QUAD_MARK) {
        Some(body) => (body, true),
        None => (trimmed, false),
    };

    let tiles = parse_tiles(body)?;
    if tiles.is_empty() {
        return Err(invalid("no tiles"));
    }
    if tiles.iter().any(|t| t.suit() != tiles[0].suit()) {
        return Err(invalid("mixed suits"));
    }

    let mut group =
        Group::from_tiles(&tiles, false, true).ok_or_else(|| invalid("not a complete meld"))?;
    if concealed && group.kind != Kind::Quad {
        return Err(invalid("concealed marker on a non-quad"));
    }
    group.origin = if concealed {
        Origin::Concealed
    } else {
        Origin::Called
    };
    Ok(group)
}
