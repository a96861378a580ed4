use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use std::ops::Range;

use shanten_search::tile::count_tiles;
use shanten_search::{
    candidates, compute_shanten, compute_shanten_str, decompose, parse_tiles, tiles_to_string,
    DecompCache, Kind, Mode, Pattern, ShantenCalculator, SuitClass, Tally, Tile,
};

fn tiles(s: &str) -> Vec<Tile> {
    parse_tiles(s).unwrap()
}

/// Sorted rank sequence, no rank more than four times.
fn random_ranks(rng: &mut StdRng, class: SuitClass, len: usize) -> Vec<u8> {
    let mut counts = [0u8; 9];
    let mut ranks = vec![];
    while ranks.len() < len {
        let r = rng.gen_range(1..=class.max_rank());
        if counts[r as usize - 1] < 4 {
            counts[r as usize - 1] += 1;
            ranks.push(r);
        }
    }
    ranks.sort_unstable();
    ranks
}

/// Random hand drawn from the tile indices in `pool`, at most four copies
/// of each tile.
fn random_hand(rng: &mut StdRng, len: usize, pool: Range<usize>) -> Vec<Tile> {
    let mut hand = vec![];
    while hand.len() < len {
        let t = Tile::from_index(rng.gen_range(pool.clone())).unwrap();
        if hand.iter().filter(|&&h| h == t).count() < 4 {
            hand.push(t);
        }
    }
    hand
}

// (offsets, meld, pair)
const SHAPES: [(&[usize], bool, bool); 5] = [
    (&[0, 0, 0], true, false),
    (&[0, 1, 2], true, false),
    (&[0, 0], false, true),
    (&[0, 1], false, false),
    (&[0, 2], false, false),
];

/// Standard shanten of a whole count table, searched directly without
/// splitting by suit.
fn reference_standard(counts: &mut [u8; 34], from: usize, m: i8, p: i8, head: bool, max: i8) -> i8 {
    let Some(i) = (from..34).find(|&i| counts[i] > 0) else {
        let h = head as i8;
        return 2 * max - 2 * m - (max - m).min(p - h) - h;
    };

    counts[i] -= 1;
    let mut best = reference_standard(counts, i, m, p, head, max);
    counts[i] += 1;

    for (offsets, meld, pair) in SHAPES {
        let last = offsets[offsets.len() - 1];
        if last > 0 && (i >= 27 || i % 9 + last > 8) {
            continue;
        }
        let mut need = [0u8; 3];
        for &o in offsets {
            need[o] += 1;
        }
        if (0..3).any(|o| need[o] > 0 && counts[i + o] < need[o]) {
            continue;
        }

        for &o in offsets {
            counts[i + o] -= 1;
        }
        let sht = if meld {
            reference_standard(counts, i, m + 1, p, head, max)
        } else {
            reference_standard(counts, i, m, p + 1, head || pair, max)
        };
        best = best.min(sht);
        for &o in offsets {
            counts[i + o] += 1;
        }
    }
    best
}

#[test]
fn nine_gates_waits_on_every_rank() {
    let hand = tiles("一一一二三四五六七八九九九");
    let report = compute_shanten(&hand, &[], Mode::Exhaustive).unwrap();
    assert_eq!(report.shanten, 0);
    assert!(report.decompositions.iter().any(|d| {
        d.melds.len() == 3 && d.head().is_some() && d.partials.len() == 2
    }));

    let calc = ShantenCalculator::default();
    assert_eq!(
        calc.accepting_tiles(&hand, &[]).unwrap(),
        tiles("一二三四五六七八九")
    );

    for extra in tiles("一二三四五六七八九") {
        let mut full = hand.clone();
        full.push(extra);
        let report = compute_shanten(&full, &[], Mode::SingleBest).unwrap();
        assert_eq!(report.shanten, -1, "drawing {extra}");
        let d = &report.decompositions[0];
        assert_eq!(d.pattern, Pattern::Standard);
        assert_eq!(d.melds.len(), 4);
        assert_eq!(d.head().map(|g| g.kind), Some(Kind::Pair));
    }
}

#[test]
fn seven_pairs_beats_standard_shape() {
    let hand = tiles("一一二二四四五五七七八八九九");
    for mode in [Mode::SingleBest, Mode::Exhaustive] {
        let report = compute_shanten(&hand, &[], mode).unwrap();
        assert!(report.standard >= 0);
        assert_eq!(report.seven_pairs, Some(-1));
        assert_eq!(report.shanten, -1);
        assert_eq!(report.decompositions.len(), 1);
        let d = &report.decompositions[0];
        assert_eq!(d.pattern, Pattern::SevenPairs);
        assert_eq!(d.partials.len(), 7);
        assert!(d.isolated.is_empty());
    }
}

#[test]
fn standard_and_seven_pairs_tie() {
    // 123 123 456 456 77 or seven pairs
    let hand = tiles("一一二二三三四四五五六六七七");
    let report = compute_shanten(&hand, &[], Mode::Exhaustive).unwrap();
    assert_eq!(report.shanten, -1);
    assert_eq!(report.standard, -1);
    assert_eq!(report.seven_pairs, Some(-1));
    assert_eq!(report.decompositions[0].pattern, Pattern::Standard);
    assert_eq!(
        report.decompositions.last().map(|d| d.pattern),
        Some(Pattern::SevenPairs)
    );

    let single = compute_shanten(&hand, &[], Mode::SingleBest).unwrap();
    assert_eq!(single.decompositions.len(), 1);
    assert_eq!(single.decompositions[0].pattern, Pattern::Standard);
}

#[test]
fn only_the_lowest_pattern_survives() {
    let hand = tiles("一一二二三三①①⑤⑤99東東");
    let report = compute_shanten(&hand, &[], Mode::Exhaustive).unwrap();
    assert_eq!(report.shanten, -1);
    assert_eq!(report.standard, 1);
    assert!(report
        .decompositions
        .iter()
        .all(|d| d.pattern == Pattern::SevenPairs));

    let hand = tiles("一一二二三三④⑤⑥⑦⑧⑨東東");
    let report = compute_shanten(&hand, &[], Mode::Exhaustive).unwrap();
    assert_eq!(report.shanten, -1);
    assert_eq!(report.standard, -1);
    assert_eq!(report.seven_pairs, Some(2));
    assert!(report
        .decompositions
        .iter()
        .all(|d| d.pattern == Pattern::Standard));
}

#[test]
fn thirteen_orphans_near_miss() {
    let base = tiles("一九①⑨19東南西北白發中");
    assert_eq!(compute_shanten(&base, &[], Mode::SingleBest).unwrap().shanten, 0);

    for i in 0..34 {
        let extra = Tile::from_index(i).unwrap();
        let mut hand = base.clone();
        hand.push(extra);
        let report = compute_shanten(&hand, &[], Mode::SingleBest).unwrap();
        if extra.is_terminal_or_honor() {
            assert_eq!(report.shanten, -1, "drawing {extra}");
            let d = &report.decompositions[0];
            assert_eq!(d.pattern, Pattern::ThirteenOrphans);
            assert_eq!(d.head().unwrap().tiles(), vec![extra, extra]);
        } else {
            assert_eq!(report.shanten, 0, "drawing {extra}");
            assert_eq!(report.thirteen_orphans, Some(0));
        }
    }
}

#[test]
fn five_tile_run_tie_break() {
    let all = decompose(SuitClass::Number, &[1, 2, 3, 4, 5], Mode::Exhaustive);
    assert!(all.len() >= 2);
    let score = all[0].shanten();
    assert!(all.iter().all(|t| t.shanten() == score));
    let mut isolated: Vec<usize> = all.iter().map(|t| t.isolated.len()).collect();
    isolated.sort_unstable();
    isolated.dedup();
    assert_eq!(isolated, vec![0, 2]);

    let best = decompose(SuitClass::Number, &[1, 2, 3, 4, 5], Mode::SingleBest);
    assert_eq!(best.len(), 1);
    assert_eq!(best[0].shanten(), score);
    assert!(best[0].isolated.is_empty());
    assert_eq!(best, decompose(SuitClass::Number, &[1, 2, 3, 4, 5], Mode::SingleBest));
}

#[test]
fn no_tile_lost_or_duplicated() {
    let mut rng = StdRng::seed_from_u64(7);
    for class in [SuitClass::Number, SuitClass::Honor] {
        for len in 0..=14 {
            let ranks = random_ranks(&mut rng, class, len);
            let mode = if len <= 10 {
                Mode::Exhaustive
            } else {
                Mode::SingleBest
            };
            let found = decompose(class, &ranks, mode);
            assert!(!found.is_empty());
            for t in found {
                assert_eq!(t.ranks(), ranks, "{class:?} {ranks:?}");
            }
        }
    }
}

#[test]
fn drawing_a_tile_gains_at_most_one_step() {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..40 {
        let len = [1, 4, 7, 10][rng.gen_range(0..4)];
        let ranks = random_ranks(&mut rng, SuitClass::Number, len);
        let before = decompose(SuitClass::Number, &ranks, Mode::SingleBest)[0].shanten();
        assert!(before >= 0, "{ranks:?}");

        for extra in 1..=9 {
            if ranks.iter().filter(|&&r| r == extra).count() == 4 {
                continue;
            }
            let mut drawn = ranks.clone();
            drawn.push(extra);
            let after = decompose(SuitClass::Number, &drawn, Mode::SingleBest)[0].shanten();
            assert!(after >= before - 1, "{ranks:?} + {extra}");
        }
    }
}

#[test]
fn exhaustive_is_stable() {
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..20 {
        let len = rng.gen_range(2..=9);
        let ranks = random_ranks(&mut rng, SuitClass::Number, len);
        let keys = |v: Vec<Tally>| {
            let mut k: Vec<_> = v.iter().map(Tally::shape_key).collect();
            k.sort();
            k
        };
        let a = keys(decompose(SuitClass::Number, &ranks, Mode::Exhaustive));
        let b = keys(decompose(SuitClass::Number, &ranks, Mode::Exhaustive));
        let mut dedup = a.clone();
        dedup.dedup();
        assert_eq!(a, dedup, "duplicate shapes for {ranks:?}");
        assert_eq!(a, b);
    }
}

#[test]
fn cache_is_a_pure_memo() {
    let cache = DecompCache::precompute(6);
    assert!(!cache.is_empty());
    for (class, entry) in cache.iter() {
        let ranks = entry[0].ranks();
        assert!(entry.iter().all(|t| t.ranks() == ranks));
        assert_eq!(candidates(class, &ranks, Mode::SingleBest), entry.to_vec());
    }

    let mut bytes = vec![];
    cache.write_snapshot(&mut bytes).unwrap();
    let loaded = DecompCache::read_snapshot(bytes.as_slice()).unwrap();

    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..30 {
        let hand = random_hand(&mut rng, 14, 0..34);
        let plain = ShantenCalculator::default().calc(&hand, &[]).unwrap();
        let cached = ShantenCalculator::default()
            .with_cache(&loaded)
            .calc(&hand, &[])
            .unwrap();
        assert_eq!(plain, cached);
    }
}

#[test]
fn standard_shanten_matches_whole_hand_search() {
    let mut rng = StdRng::seed_from_u64(17);
    let pools = [0..34, 0..18, 9..27, 18..34];
    for round in 0..80 {
        let len = if (round / 4) % 2 == 0 { 13 } else { 14 };
        let hand = random_hand(&mut rng, len, pools[round % 4].clone());
        let text = tiles_to_string(&hand);

        let mut counts = count_tiles(&hand);
        let expected = reference_standard(&mut counts, 0, 0, 0, false, (len / 3) as i8);

        let single = compute_shanten(&hand, &[], Mode::SingleBest).unwrap();
        let all = compute_shanten(&hand, &[], Mode::Exhaustive).unwrap();
        assert_eq!(single.standard, expected, "{text}");
        assert_eq!(all.standard, expected, "{text}");
        assert!(all
            .decompositions
            .iter()
            .filter(|d| d.pattern == Pattern::Standard)
            .all(|d| d.shanten == expected && d.groups().flat_map(|g| g.tiles()).count() == len));
    }
}

#[test]
fn string_front_end() {
    let report = compute_shanten_str(
        "②③④ 東東",
        &["五五五五", "1 2 3", "白白白"],
        Mode::Exhaustive,
    )
    .unwrap();
    assert_eq!(report.shanten, -1);
    assert_eq!(report.seven_pairs, None);
    let d = &report.decompositions[0];
    assert_eq!(d.melds.iter().filter(|g| g.is_called()).count(), 3);
    assert_eq!(d.to_string().matches('(').count(), 3);

    assert!(compute_shanten_str("②③④ x", &[], Mode::SingleBest).is_err());
}
