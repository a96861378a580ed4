//! Whole-hand decompositions assembled from per-suit tallies.

use std::fmt;

use crate::group::{Group, Kind};
use crate::tally::{shanten_of, Tally};
use crate::tile::{Suit, Tile};

/// Which strategy produced a decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pattern {
    /// Melds plus one head.
    Standard,
    /// Seven distinct pairs.
    SevenPairs,
    /// One of each terminal and honor plus a duplicate.
    ThirteenOrphans,
}

/// A whole hand split into groups, declared melds included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decomposition {
    pub pattern: Pattern,
    pub melds: Vec<Group>,
    pub partials: Vec<Group>,
    pub isolated: Vec<Tile>,
    pub shanten: i8,
}

impl Decomposition {
    /// The pair serving as the hand's head, if any.
    pub fn head(&self) -> Option<&Group> {
        self.partials.iter().find(|g| g.head)
    }

    /// Melds, partials, then each isolated tile as its own group.
    pub fn groups(&self) -> impl Iterator<Item = Group> + '_ {
        self.melds
            .iter()
            .chain(&self.partials)
            .copied()
            .chain(
                self.isolated
                    .iter()
                    .map(|t| Group::new(t.suit(), Kind::Isolated, t.rank())),
            )
    }

    pub fn is_complete(&self) -> bool {
        self.shanten == -1
    }
}

impl fmt::Display for Decomposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.groups().map(|g| g.to_string()).collect();
        write!(f, "{} [{:?}, shanten {}]", parts.join(" "), self.pattern, self.shanten)
    }
}

/// Every way to pick one element from each inner list, in odometer order
/// with the last list varying fastest. An empty outer list yields a single
/// empty pick.
pub fn cartesian_product<T, V: AsRef<[T]>>(vv: &[V]) -> Vec<Vec<&T>> {
    if vv.iter().any(|v| v.as_ref().is_empty()) {
        return vec![];
    }

    let mut idxs = vec![0; vv.len()];
    let mut res = vec![];
    loop {
        res.push(idxs.iter().enumerate().map(|(i1, &i2)| &vv[i1].as_ref()[i2]).collect());

        // increment idxs
        let mut i = idxs.len();
        loop {
            if i == 0 {
                return res;
            }
            i -= 1;
            if idxs[i] + 1 < vv[i].as_ref().len() {
                idxs[i] += 1;
                break;
            }
            idxs[i] = 0;
        }
    }
}

/// Merge one tally per suit with the declared melds into a standard-pattern
/// decomposition scored against `max_melds` meld slots.
///
/// Only the first head met, in suit order, keeps its head flag.
pub fn merge(picks: &[(Suit, &Tally)], declared: &[Group], max_melds: usize) -> Decomposition {
    let mut melds = vec![];
    let mut partials = vec![];
    let mut isolated = vec![];
    let mut head_taken = false;

    for &(suit, tally) in picks {
        let head_rank = tally.head_rank();
        melds.extend(tally.melds.iter().map(|b| Group::new(suit, b.kind, b.rank)));
        for b in &tally.partials {
            let mut g = Group::new(suit, b.kind, b.rank);
            if !head_taken && b.kind == Kind::Pair && Some(b.rank) == head_rank {
                g.head = true;
                head_taken = true;
            }
            partials.push(g);
        }
        isolated.extend(tally.isolated.iter().filter_map(|&r| Tile::new(suit, r)));
    }
    melds.extend_from_slice(declared);

    let shanten = shanten_of(melds.len(), partials.len(), head_taken, max_melds);
    Decomposition {
        pattern: Pattern::Standard,
        melds,
        partials,
        isolated,
        shanten,
    }
}

/// Cross product of per-suit candidates, each merged with the declared
/// melds. No cross-suit dedup is needed: groups of different suits never
/// coincide.
pub fn combine(
    per_suit: &[(Suit, Vec<Tally>)],
    declared: &[Group],
    max_melds: usize,
) -> Vec<Decomposition> {
    let candidates: Vec<&[Tally]> = per_suit.iter().map(|(_, v)| v.as_slice()).collect();
    cartesian_product(&candidates)
        .into_iter()
        .map(|pick| {
            let picks: Vec<(Suit, &Tally)> = per_suit
                .iter()
                .map(|(suit, _)| *suit)
                .zip(pick)
                .collect();
            merge(&picks, declared, max_melds)
        })
        .collect()
}
