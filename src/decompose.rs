//! Recursive search partitioning one suit's ranks into groups.
//!
//! Number suits and honors share the same search; they only differ in the
//! set of [`Formation`]s tried on the smallest remaining rank and in whether
//! gap pruning applies.

use std::cmp::Reverse;

use ahash::AHashSet;
use log::{debug, trace};

use crate::cache::DecompCache;
use crate::group::Kind;
use crate::tally::{Block, Tally};
use crate::tile::Suit;

/// Shapes that may be cut from the smallest remaining rank, tried in this
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Formation {
    Triplet,
    Run,
    Pair,
    ProtoRun,
    Kanchan,
}

impl Formation {
    #[inline]
    pub fn kind(self) -> Kind {
        match self {
            Formation::Triplet => Kind::Triplet,
            Formation::Run => Kind::Run,
            Formation::Pair => Kind::Pair,
            Formation::ProtoRun => Kind::ProtoRun,
            Formation::Kanchan => Kind::Kanchan,
        }
    }
}

const NUMBER_FORMATIONS: &[Formation] = &[
    Formation::Triplet,
    Formation::Run,
    Formation::Pair,
    Formation::ProtoRun,
    Formation::Kanchan,
];

const HONOR_FORMATIONS: &[Formation] = &[Formation::Triplet, Formation::Pair];

/// Which formation set a suit uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuitClass {
    Number,
    Honor,
}

impl SuitClass {
    #[inline]
    pub fn of(suit: Suit) -> Self {
        if suit.is_honor() {
            SuitClass::Honor
        } else {
            SuitClass::Number
        }
    }

    pub fn formations(self) -> &'static [Formation] {
        match self {
            SuitClass::Number => NUMBER_FORMATIONS,
            SuitClass::Honor => HONOR_FORMATIONS,
        }
    }

    #[inline]
    fn prunes_gaps(self) -> bool {
        self == SuitClass::Number
    }

    pub fn max_rank(self) -> u8 {
        match self {
            SuitClass::Number => 9,
            SuitClass::Honor => 7,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// One best tally; cheap, cache-assisted.
    #[default]
    SingleBest,
    /// Every structurally distinct tally tied for the best score.
    Exhaustive,
}

/// Ordering used to pick a single tally: lower shanten, then more melds,
/// then fewer isolated tiles.
fn preference(t: &Tally) -> (i8, Reverse<usize>, usize) {
    (t.shanten(), Reverse(t.melds.len()), t.isolated.len())
}

/// Collects search leaves.
///
/// `Best` and `Ties` score a suit as a hand of its own. `Frontier` and
/// `Distinct` feed whole-hand combination, where a suit's worth depends on
/// the other suits and only its [`Profile`](crate::tally::Profile) can be
/// compared.
enum Sink {
    Best(Option<Tally>),
    Ties {
        best: i8,
        seen: AHashSet<Vec<Block>>,
        tallies: Vec<Tally>,
    },
    /// First tally reaching each undominated profile.
    Frontier(Vec<Tally>),
    /// Every structurally distinct tally.
    Distinct {
        seen: AHashSet<Vec<Block>>,
        tallies: Vec<Tally>,
    },
}

impl Sink {
    fn standalone(mode: Mode) -> Self {
        match mode {
            Mode::SingleBest => Sink::Best(None),
            Mode::Exhaustive => Sink::Ties {
                best: i8::MAX,
                seen: AHashSet::new(),
                tallies: vec![],
            },
        }
    }

    fn candidates(mode: Mode) -> Self {
        match mode {
            Mode::SingleBest => Sink::Frontier(vec![]),
            Mode::Exhaustive => Sink::Distinct {
                seen: AHashSet::new(),
                tallies: vec![],
            },
        }
    }

    fn offer(&mut self, tally: Tally) {
        match self {
            Sink::Best(slot) => {
                // the first tally reached keeps ties, so branch order decides
                let better = slot
                    .as_ref()
                    .map_or(true, |cur| preference(&tally) < preference(cur));
                if better {
                    *slot = Some(tally);
                }
            }
            Sink::Ties {
                best,
                seen,
                tallies,
            } => {
                let sht = tally.shanten();
                if sht > *best {
                    return;
                }
                if sht < *best {
                    *best = sht;
                    seen.clear();
                    tallies.clear();
                }
                if seen.insert(tally.shape_key()) {
                    tallies.push(tally);
                }
            }
            Sink::Frontier(kept) => {
                let p = tally.profile();
                if kept.iter().any(|k| k.profile().dominates(p)) {
                    return;
                }
                kept.retain(|k| !p.dominates(k.profile()));
                kept.push(tally);
            }
            Sink::Distinct { seen, tallies } => {
                if seen.insert(tally.shape_key()) {
                    tallies.push(tally);
                }
            }
        }
    }

    fn finish(self) -> Vec<Tally> {
        match self {
            Sink::Best(slot) => slot.into_iter().collect(),
            Sink::Ties { tallies, .. }
            | Sink::Frontier(tallies)
            | Sink::Distinct { tallies, .. } => tallies,
        }
    }
}

/// Remove `first + o` for every offset, by value. `None` if a rank is
/// missing.
fn take(rest: &[u8], first: u8, offsets: &[u8]) -> Option<Vec<u8>> {
    let mut remaining = rest.to_vec();
    for &o in offsets {
        let pos = remaining.iter().position(|&r| r == first + o)?;
        remaining.remove(pos);
    }
    Some(remaining)
}

fn search(rest: &[u8], tally: Tally, class: SuitClass, sink: &mut Sink, leaves: &mut usize) {
    let Some(&first) = rest.first() else {
        *leaves += 1;
        sink.offer(tally);
        return;
    };

    if rest.len() == 1 {
        search(&[], tally.with_isolated(first), class, sink, leaves);
        return;
    }

    // no group spans a gap wider than 2
    if class.prunes_gaps() && rest[1] > first + 2 {
        search(&rest[1..], tally.with_isolated(first), class, sink, leaves);
        return;
    }

    for &f in class.formations() {
        let kind = f.kind();
        if let Some(remaining) = take(rest, first, kind.offsets()) {
            search(&remaining, tally.with(Block::new(kind, first)), class, sink, leaves);
        }
    }

    // leaving `first` alone can beat forcing it into a weak partial
    search(&rest[1..], tally.with_isolated(first), class, sink, leaves);
}

fn run(class: SuitClass, ranks: &[u8], mut sink: Sink) -> Vec<Tally> {
    let mut sorted = ranks.to_vec();
    sorted.sort_unstable();
    debug_assert!(sorted.iter().all(|&r| (1..=class.max_rank()).contains(&r)));

    let mut leaves = 0;
    search(&sorted, Tally::default(), class, &mut sink, &mut leaves);
    trace!("{class:?} {sorted:?}: {leaves} leaves");

    let ret = sink.finish();
    assert!(!ret.is_empty(), "search produced no tally for {sorted:?}");
    ret
}

/// Decompose one suit's ranks as a hand of its own, without consulting any
/// cache.
///
/// Always returns at least one tally; in [`Mode::SingleBest`] exactly one.
#[must_use]
pub fn decompose(class: SuitClass, ranks: &[u8], mode: Mode) -> Vec<Tally> {
    run(class, ranks, Sink::standalone(mode))
}

/// Tallies of one suit worth crossing with other suits.
///
/// [`Mode::SingleBest`] keeps one tally per undominated profile, which is
/// enough to reach the whole-hand minimum. [`Mode::Exhaustive`] keeps every
/// structurally distinct tally, since a dominated one can still tie once
/// the whole hand's slots are full.
#[must_use]
pub fn candidates(class: SuitClass, ranks: &[u8], mode: Mode) -> Vec<Tally> {
    run(class, ranks, Sink::candidates(mode))
}

/// Candidate search bound to a result mode and an optional, already built
/// cache.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decomposer<'a> {
    pub mode: Mode,
    /// Read only in [`Mode::SingleBest`].
    pub cache: Option<&'a DecompCache>,
}

impl<'a> Decomposer<'a> {
    pub fn new(mode: Mode, cache: Option<&'a DecompCache>) -> Self {
        Decomposer { mode, cache }
    }

    pub fn candidates(&self, class: SuitClass, ranks: &[u8]) -> Vec<Tally> {
        if self.mode == Mode::SingleBest {
            if let Some(hit) = self.cache.and_then(|c| c.get(class, ranks)) {
                debug!("cache hit {class:?} {ranks:?}");
                return hit.to_vec();
            }
            if self.cache.is_some() {
                debug!("cache miss {class:?} {ranks:?}");
            }
        }
        candidates(class, ranks, self.mode)
    }
}
