//! Direct matchers for the two whole-hand patterns that ignore meld
//! structure. Both take a fully concealed hand as a count table.

use crate::combine::{Decomposition, Pattern};
use crate::group::{Group, Kind};
use crate::tile::{Tile, TILE_KINDS};

// 1m, 9m, 1p, 9p, 1s, 9s, 東南西北白發中
const TERMINAL_INDICES: [usize; 13] = [0, 8, 9, 17, 18, 26, 27, 28, 29, 30, 31, 32, 33];

/// `(index, tile, count)` for every tile held.
fn held(counts: &[u8; TILE_KINDS]) -> impl Iterator<Item = (usize, Tile, u8)> + '_ {
    counts
        .iter()
        .enumerate()
        .filter(|&(_, &c)| c > 0)
        .filter_map(|(i, &c)| Some((i, Tile::from_index(i)?, c)))
}

#[must_use]
pub fn calc_chiitoi(counts: &[u8; TILE_KINDS]) -> i8 {
    let mut pairs = 0;
    let mut kinds = 0;
    counts.iter().filter(|&&c| c > 0).for_each(|&c| {
        kinds += 1;
        if c >= 2 {
            pairs += 1;
        }
    });

    // a quad is still a single pair
    let redunct = 7_u8.saturating_sub(kinds) as i8;
    6 - pairs + redunct
}

#[must_use]
pub fn calc_kokushi(counts: &[u8; TILE_KINDS]) -> i8 {
    let mut pairs = 0;
    let mut kinds = 0;

    for &i in TERMINAL_INDICES.iter() {
        let c = counts[i];
        if c > 0 {
            kinds += 1;
            if c >= 2 {
                pairs += 1;
            }
        }
    }

    let redunct = (pairs > 0) as i8;
    13 - kinds - redunct
}

/// Seven pairs: every pair found, everything else isolated.
#[must_use]
pub fn seven_pairs(counts: &[u8; TILE_KINDS]) -> Decomposition {
    let mut partials = vec![];
    let mut isolated = vec![];
    for (_, tile, c) in held(counts) {
        let mut left = c;
        if c >= 2 {
            partials.push(Group::new(tile.suit(), Kind::Pair, tile.rank()));
            left -= 2;
        }
        isolated.extend(std::iter::repeat(tile).take(left as usize));
    }

    Decomposition {
        pattern: Pattern::SevenPairs,
        melds: vec![],
        partials,
        isolated,
        shanten: calc_chiitoi(counts),
    }
}

/// Thirteen orphans: the first duplicated terminal/honor becomes the head,
/// every other tile is isolated.
#[must_use]
pub fn thirteen_orphans(counts: &[u8; TILE_KINDS]) -> Decomposition {
    let head_index = TERMINAL_INDICES.iter().copied().find(|&i| counts[i] >= 2);

    let mut partials = vec![];
    let mut isolated = vec![];
    for (i, tile, c) in held(counts) {
        let mut left = c;
        if Some(i) == head_index {
            let mut head = Group::new(tile.suit(), Kind::Pair, tile.rank());
            head.head = true;
            partials.push(head);
            left -= 2;
        }
        isolated.extend(std::iter::repeat(tile).take(left as usize));
    }

    Decomposition {
        pattern: Pattern::ThirteenOrphans,
        melds: vec![],
        partials,
        isolated,
        shanten: calc_kokushi(counts),
    }
}
