//! Accumulated decomposition state of a single suit.

use std::ops::Add;

use crate::group::Kind;

/// A group shape without its suit; the suit is implied by the sequence the
/// tally was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Block {
    pub kind: Kind,
    pub rank: u8,
}

impl Block {
    #[inline]
    pub const fn new(kind: Kind, rank: u8) -> Self {
        Block { kind, rank }
    }
}

/// Shanten of `melds` complete groups, `partials` partial groups (head pair
/// included) and an optional head, out of `max_melds` usable meld slots.
///
/// With `max_melds = 4` this is the usual
/// `8 - 2*melds - min(4 - melds, partials - head) - head`.
#[inline]
#[must_use]
pub fn shanten_of(melds: usize, partials: usize, head: bool, max_melds: usize) -> i8 {
    debug_assert!(melds <= max_melds, "{melds} melds exceed {max_melds} slots");
    let (m, p, h, max) = (melds as i8, partials as i8, head as i8, max_melds as i8);
    debug_assert!(p >= h);
    2 * max - 2 * m - (max - m).min(p - h) - h
}

/// Group counts that decide what a tally is worth once suits are merged.
///
/// Written with `groups = melds + partials`, shanten is
/// `2*max - melds - head - min(max, groups - head)`, which never rises when
/// `melds`, `groups` or `head` grows. A tally whose profile is dominated on
/// all three can therefore be dropped before suits are crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Profile {
    pub melds: usize,
    pub partials: usize,
    pub head: bool,
}

impl Profile {
    #[inline]
    pub fn groups(self) -> usize {
        self.melds + self.partials
    }

    #[inline]
    pub fn dominates(self, other: Profile) -> bool {
        self.melds >= other.melds && self.groups() >= other.groups() && self.head >= other.head
    }

    #[inline]
    #[must_use]
    pub fn shanten(self, max_melds: usize) -> i8 {
        shanten_of(self.melds, self.partials, self.head, max_melds)
    }
}

impl Add for Profile {
    type Output = Profile;

    fn add(self, rhs: Profile) -> Profile {
        Profile {
            melds: self.melds + rhs.melds,
            partials: self.partials + rhs.partials,
            head: self.head || rhs.head,
        }
    }
}

/// Profiles no other profile dominates, in first-seen order. Equal profiles
/// collapse to one.
pub fn pareto(profiles: impl IntoIterator<Item = Profile>) -> Vec<Profile> {
    let mut front: Vec<Profile> = vec![];
    for p in profiles {
        if front.iter().any(|f| f.dominates(p)) {
            continue;
        }
        front.retain(|f| !p.dominates(*f));
        front.push(p);
    }
    front
}

/// Every input rank sits in exactly one of `melds`, `partials` or
/// `isolated`. Extending a tally yields a new value; the parent is left
/// untouched, so sibling branches of the search never see each other's
/// groups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    pub melds: Vec<Block>,
    pub partials: Vec<Block>,
    pub isolated: Vec<u8>,
    pub has_head: bool,
}

impl Tally {
    #[must_use]
    pub fn with(&self, block: Block) -> Self {
        let mut next = self.clone();
        match block.kind {
            k if k.is_complete() => next.melds.push(block),
            Kind::Isolated => next.isolated.push(block.rank),
            k => {
                if k == Kind::Pair {
                    next.has_head = true;
                }
                next.partials.push(block);
            }
        }
        next
    }

    #[must_use]
    pub fn with_isolated(&self, rank: u8) -> Self {
        self.with(Block::new(Kind::Isolated, rank))
    }

    /// Number of tiles covered.
    pub fn len(&self) -> usize {
        self.melds
            .iter()
            .chain(&self.partials)
            .map(|b| b.kind.offsets().len())
            .sum::<usize>()
            + self.isolated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rank of the pair acting as head: the first pair recorded.
    pub fn head_rank(&self) -> Option<u8> {
        if !self.has_head {
            return None;
        }
        self.partials
            .iter()
            .find(|b| b.kind == Kind::Pair)
            .map(|b| b.rank)
    }

    pub fn profile(&self) -> Profile {
        Profile {
            melds: self.melds.len(),
            partials: self.partials.len(),
            head: self.has_head,
        }
    }

    /// Shanten of this tally viewed as a hand on its own, against
    /// `len / 3` meld slots.
    pub fn shanten(&self) -> i8 {
        self.profile().shanten(self.len() / 3)
    }

    /// Order-independent structural identity: the sorted multiset of
    /// `(kind, rank)` over melds and partials.
    pub fn shape_key(&self) -> Vec<Block> {
        let mut key: Vec<Block> = self.melds.iter().chain(&self.partials).copied().collect();
        key.sort_unstable();
        key
    }

    /// All ranks covered, sorted.
    pub fn ranks(&self) -> Vec<u8> {
        let mut ranks: Vec<u8> = self
            .melds
            .iter()
            .chain(&self.partials)
            .flat_map(|b| b.kind.offsets().iter().map(move |o| b.rank + o))
            .chain(self.isolated.iter().copied())
            .collect();
        ranks.sort_unstable();
        ranks
    }
}
