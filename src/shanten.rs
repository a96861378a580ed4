//! Whole-hand shanten: the standard decomposition plus the seven-pairs and
//! thirteen-orphans detectors, reduced to their minimum.

use std::cmp::Reverse;

use log::debug;

use crate::cache::DecompCache;
use crate::combine::{cartesian_product, combine, Decomposition};
use crate::decompose::{Decomposer, Mode, SuitClass};
use crate::error::{HandError, Result};
use crate::group::{parse_meld, Group};
use crate::special::{seven_pairs, thirteen_orphans};
use crate::tally::{pareto, Profile, Tally};
use crate::tile::{count_tiles, parse_tiles, Suit, Tile, TILE_KINDS};

/// Meld slots of a legal hand.
pub const HAND_MELDS: usize = 4;

/// Result of one evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShantenReport {
    /// Minimum over every strategy that ran.
    pub shanten: i8,
    /// Decompositions of the strategies reaching `shanten`. One entry in
    /// [`Mode::SingleBest`].
    pub decompositions: Vec<Decomposition>,
    pub standard: i8,
    /// `None` when the detector did not run (declared melds present).
    pub seven_pairs: Option<i8>,
    pub thirteen_orphans: Option<i8>,
}

/// `concealed / 3 + declared` must be 4 and the concealed part must leave
/// room for exactly one head.
pub fn check_tile_count(concealed: usize, declared: usize) -> Result<()> {
    if concealed / 3 + declared == HAND_MELDS && concealed % 3 != 0 {
        Ok(())
    } else {
        Err(HandError::WrongTileCount {
            concealed,
            declared,
        })
    }
}

fn check_declared(declared: &[Group]) -> Result<()> {
    match declared.iter().find(|g| !g.is_complete()) {
        Some(g) => Err(HandError::InvalidMeld {
            text: g.to_string(),
            reason: "declared group is not a complete meld",
        }),
        None => Ok(()),
    }
}

/// Sorted ranks of each suit present, in suit order.
fn split_by_suit(concealed: &[Tile]) -> Vec<(Suit, Vec<u8>)> {
    Suit::ALL
        .iter()
        .filter_map(|&suit| {
            let mut ranks: Vec<u8> = concealed
                .iter()
                .filter(|t| t.suit() == suit)
                .map(|t| t.rank())
                .collect();
            ranks.sort_unstable();
            (!ranks.is_empty()).then_some((suit, ranks))
        })
        .collect()
}

/// Lowest shanten over every pick of one profile per suit.
fn best_shanten(fronts: &[Vec<Profile>], base: Profile, max_melds: usize) -> i8 {
    cartesian_product(fronts)
        .into_iter()
        .map(|pick| pick.into_iter().fold(base, |acc, &p| acc + p).shanten(max_melds))
        .min()
        .unwrap_or(i8::MAX)
}

/// Evaluation options. Plain fields; `Default` gives a single-best,
/// uncached calculator that also runs the special-pattern detectors.
#[derive(Debug, Clone, Copy)]
pub struct ShantenCalculator<'a> {
    pub mode: Mode,
    /// Consulted only in [`Mode::SingleBest`].
    pub cache: Option<&'a DecompCache>,
    /// Run the seven-pairs and thirteen-orphans detectors on fully
    /// concealed hands.
    pub special_patterns: bool,
}

impl Default for ShantenCalculator<'_> {
    fn default() -> Self {
        ShantenCalculator {
            mode: Mode::SingleBest,
            cache: None,
            special_patterns: true,
        }
    }
}

impl<'a> ShantenCalculator<'a> {
    pub fn new(mode: Mode) -> Self {
        ShantenCalculator {
            mode,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_cache(mut self, cache: &'a DecompCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Standard decomposition only, without hand-size validation.
    /// Returns the best shanten and the decompositions reaching it.
    ///
    /// Suits are scored together against the whole hand's meld slots: the
    /// minimum comes from crossing each suit's undominated profiles, then
    /// only tallies that can take part in that minimum are crossed into
    /// decompositions.
    pub fn calc_standard(&self, concealed: &[Tile], declared: &[Group]) -> (i8, Vec<Decomposition>) {
        let decomposer = Decomposer::new(self.mode, self.cache);
        let mut per_suit: Vec<(Suit, Vec<Tally>)> = split_by_suit(concealed)
            .into_iter()
            .map(|(suit, ranks)| (suit, decomposer.candidates(SuitClass::of(suit), &ranks)))
            .collect();

        let max_melds = concealed.len() / 3 + declared.len();
        let base = Profile {
            melds: declared.len(),
            ..Default::default()
        };
        let fronts: Vec<Vec<Profile>> = per_suit
            .iter()
            .map(|(_, tallies)| pareto(tallies.iter().map(Tally::profile)))
            .collect();
        let best = best_shanten(&fronts, base, max_melds);

        for (i, (_, tallies)) in per_suit.iter_mut().enumerate() {
            let mut fixed = fronts.clone();
            tallies.retain(|t| {
                fixed[i] = vec![t.profile()];
                best_shanten(&fixed, base, max_melds) == best
            });
        }

        let mut all = combine(&per_suit, declared, max_melds);
        all.retain(|d| d.shanten == best);
        all.sort_by_key(|d| (Reverse(d.melds.len()), d.isolated.len()));
        if self.mode == Mode::SingleBest {
            all.truncate(1);
        }
        (best, all)
    }

    pub fn calc(&self, concealed: &[Tile], declared: &[Group]) -> Result<ShantenReport> {
        check_tile_count(concealed.len(), declared.len())?;
        check_declared(declared)?;

        let (standard, mut decompositions) = self.calc_standard(concealed, declared);
        debug!("standard shanten {standard} ({} decompositions)", decompositions.len());

        let mut report = ShantenReport {
            shanten: standard,
            decompositions: vec![],
            standard,
            seven_pairs: None,
            thirteen_orphans: None,
        };

        let mut candidates = vec![];
        if declared.is_empty() && self.special_patterns {
            let counts = count_tiles(concealed);
            let chiitoi = seven_pairs(&counts);
            let kokushi = thirteen_orphans(&counts);
            debug!("seven pairs {}, thirteen orphans {}", chiitoi.shanten, kokushi.shanten);

            report.seven_pairs = Some(chiitoi.shanten);
            report.thirteen_orphans = Some(kokushi.shanten);
            report.shanten = standard.min(chiitoi.shanten).min(kokushi.shanten);
            candidates.push(chiitoi);
            candidates.push(kokushi);
        }

        decompositions.retain(|d| d.shanten == report.shanten);
        decompositions.extend(candidates.into_iter().filter(|d| d.shanten == report.shanten));
        if self.mode == Mode::SingleBest {
            decompositions.truncate(1);
        }
        report.decompositions = decompositions;
        Ok(report)
    }

    /// Shanten after discarding each distinct tile of a hand holding one
    /// tile more than a waiting hand, in tile order.
    pub fn eval_discards(&self, concealed: &[Tile], declared: &[Group]) -> Result<Vec<(Tile, i8)>> {
        if concealed.len() % 3 != 2 {
            return Err(HandError::WrongTileCount {
                concealed: concealed.len(),
                declared: declared.len(),
            });
        }

        let counts = count_tiles(concealed);
        let mut result = Vec::new();
        for (i, _) in counts.iter().enumerate().filter(|&(_, &c)| c > 0) {
            let Some(tile) = Tile::from_index(i) else {
                continue;
            };
            // i 번 타일을 1장 버린다고 가정
            let mut rest = concealed.to_vec();
            if let Some(pos) = rest.iter().position(|&t| t == tile) {
                rest.remove(pos);
            }
            result.push((tile, self.calc(&rest, declared)?.shanten));
        }
        Ok(result)
    }

    /// Tiles whose draw lowers the shanten of a waiting-size hand. Tiles
    /// whose four copies are all in the hand, declared melds included, are
    /// skipped.
    pub fn accepting_tiles(&self, concealed: &[Tile], declared: &[Group]) -> Result<Vec<Tile>> {
        if concealed.len() % 3 != 1 {
            return Err(HandError::WrongTileCount {
                concealed: concealed.len(),
                declared: declared.len(),
            });
        }
        let current = self.calc(concealed, declared)?.shanten;

        let mut counts = count_tiles(concealed);
        for t in declared.iter().flat_map(Group::tiles) {
            counts[t.index()] += 1;
        }
        let mut accepted = vec![];
        for i in (0..TILE_KINDS).filter(|&i| counts[i] < 4) {
            let Some(tile) = Tile::from_index(i) else {
                continue;
            };
            let mut drawn = concealed.to_vec();
            drawn.push(tile);
            if self.calc(&drawn, declared)?.shanten < current {
                accepted.push(tile);
            }
        }
        Ok(accepted)
    }
}

/// Evaluate a hand with default options in the given mode.
pub fn compute_shanten(concealed: &[Tile], declared: &[Group], mode: Mode) -> Result<ShantenReport> {
    ShantenCalculator::new(mode).calc(concealed, declared)
}

/// Glyph-string front end: `concealed` is a tile string, each `declared`
/// entry one meld in the declared-meld grammar.
pub fn compute_shanten_str(concealed: &str, declared: &[&str], mode: Mode) -> Result<ShantenReport> {
    let tiles = parse_tiles(concealed)?;
    let melds = declared
        .iter()
        .map(|m| parse_meld(m))
        .collect::<Result<Vec<_>>>()?;
    compute_shanten(&tiles, &melds, mode)
}
