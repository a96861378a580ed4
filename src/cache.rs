//! Memo of single-best candidate tallies keyed by canonical rank multisets.
//!
//! Built once (precompute or warm), then shared read-only. Number suits and
//! honors are kept in separate tables since their formation sets differ.

use std::io::{Read, Write};

use ahash::AHashMap;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::info;

use crate::decompose::{candidates, Mode, SuitClass};
use crate::error::SnapshotError;
use crate::group::Kind;
use crate::tally::{Block, Tally};

/// Longest rank sequence enumerated by default.
pub const DEFAULT_CACHE_LEN: usize = 8;

const MAGIC: &[u8; 4] = b"DCMP";
const VERSION: u8 = 2;

/// Base-5 fold of per-rank counts, rank 1 most significant.
/// `None` when some rank appears more than four times.
#[must_use]
pub fn rank_key(class: SuitClass, ranks: &[u8]) -> Option<u32> {
    let max = class.max_rank();
    let mut counts = [0u8; 9];
    for &r in ranks {
        if r == 0 || r > max {
            return None;
        }
        counts[r as usize - 1] += 1;
    }
    let counts = &counts[..max as usize];
    if counts.iter().any(|&c| c > 4) {
        return None;
    }
    Some(counts.iter().fold(0, |acc, &x| acc * 5 + x as u32))
}

#[derive(Debug, Clone, Default)]
pub struct DecompCache {
    number: AHashMap<u32, Vec<Tally>>,
    honor: AHashMap<u32, Vec<Tally>>,
}

impl DecompCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enumerate every rank multiset (at most four copies per rank) of
    /// length `1..=max_len` for both suit classes.
    #[must_use]
    pub fn precompute(max_len: usize) -> Self {
        info!("precomputing decomposition cache up to {max_len} tiles");
        let mut cache = Self::new();
        for class in [SuitClass::Number, SuitClass::Honor] {
            let mut ranks = vec![];
            enumerate(class, 1, max_len, &mut ranks, &mut |ranks: &[u8]| {
                cache.warm(class, ranks);
            });
        }
        info!(
            "decomposition cache ready: {} number, {} honor entries",
            cache.number.len(),
            cache.honor.len()
        );
        cache
    }

    fn table(&self, class: SuitClass) -> &AHashMap<u32, Vec<Tally>> {
        match class {
            SuitClass::Number => &self.number,
            SuitClass::Honor => &self.honor,
        }
    }

    fn table_mut(&mut self, class: SuitClass) -> &mut AHashMap<u32, Vec<Tally>> {
        match class {
            SuitClass::Number => &mut self.number,
            SuitClass::Honor => &mut self.honor,
        }
    }

    pub fn get(&self, class: SuitClass, ranks: &[u8]) -> Option<&[Tally]> {
        self.table(class)
            .get(&rank_key(class, ranks)?)
            .map(Vec::as_slice)
    }

    /// Compute and store the single-best candidates for `ranks` if absent.
    /// Returns `None` for sequences that have no canonical key.
    pub fn warm(&mut self, class: SuitClass, ranks: &[u8]) -> Option<&[Tally]> {
        let key = rank_key(class, ranks)?;
        let entry = self
            .table_mut(class)
            .entry(key)
            .or_insert_with(|| candidates(class, ranks, Mode::SingleBest));
        Some(entry.as_slice())
    }

    /// Every stored candidate list with its suit class, in no particular
    /// order.
    pub fn iter(&self) -> impl Iterator<Item = (SuitClass, &[Tally])> + '_ {
        self.number
            .values()
            .map(|v| (SuitClass::Number, v.as_slice()))
            .chain(self.honor.values().map(|v| (SuitClass::Honor, v.as_slice())))
    }

    pub fn len(&self) -> usize {
        self.number.len() + self.honor.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write a gzip-compressed snapshot.
    pub fn write_snapshot<W: Write>(&self, writer: W) -> std::io::Result<()> {
        let mut gz = GzEncoder::new(writer, Compression::default());
        gz.write_all(MAGIC)?;
        gz.write_all(&[VERSION])?;
        gz.write_all(&(self.len() as u32).to_le_bytes())?;

        for class in [SuitClass::Number, SuitClass::Honor] {
            let table = self.table(class);
            let mut keys: Vec<u32> = table.keys().copied().collect();
            keys.sort_unstable();
            for key in keys {
                let tallies = &table[&key];
                let mut entry = vec![class_byte(class)];
                entry.extend_from_slice(&key.to_le_bytes());
                entry.push(tallies.len() as u8);
                for tally in tallies {
                    let blocks: Vec<&Block> = tally.melds.iter().chain(&tally.partials).collect();
                    entry.push(blocks.len() as u8);
                    for b in blocks {
                        entry.push(kind_byte(b.kind));
                        entry.push(b.rank);
                    }
                    entry.push(tally.isolated.len() as u8);
                    entry.extend_from_slice(&tally.isolated);
                }
                gz.write_all(&entry)?;
            }
        }

        gz.finish()?;
        info!("wrote decomposition cache snapshot: {} entries", self.len());
        Ok(())
    }

    /// Load a snapshot written by [`DecompCache::write_snapshot`]. Every
    /// entry is checked against its key.
    pub fn read_snapshot<R: Read>(reader: R) -> Result<Self, SnapshotError> {
        let mut gz = GzDecoder::new(reader);
        let mut raw = vec![];
        gz.read_to_end(&mut raw)?;

        let mut cur = Cursor { raw: &raw, pos: 0 };
        if cur.take(4)? != MAGIC {
            return Err(SnapshotError::Corrupt("bad magic".to_owned()));
        }
        let version = cur.byte()?;
        if version != VERSION {
            return Err(SnapshotError::Corrupt(format!("unsupported version {version}")));
        }
        let count = u32::from_le_bytes(cur.array()?);

        let mut cache = Self::new();
        for _ in 0..count {
            let class = match cur.byte()? {
                0 => SuitClass::Number,
                1 => SuitClass::Honor,
                b => return Err(SnapshotError::Corrupt(format!("bad suit class {b}"))),
            };
            let key = u32::from_le_bytes(cur.array()?);

            let n = cur.byte()?;
            if n == 0 {
                return Err(SnapshotError::Corrupt(format!("entry {key} is empty")));
            }
            let mut tallies = Vec::with_capacity(n as usize);
            for _ in 0..n {
                let tally = read_tally(&mut cur)?;
                if rank_key(class, &tally.ranks()) != Some(key) {
                    return Err(SnapshotError::Corrupt(format!("entry {key} does not match its key")));
                }
                tallies.push(tally);
            }
            cache.table_mut(class).insert(key, tallies);
        }

        if cur.pos != raw.len() {
            return Err(SnapshotError::Corrupt("trailing bytes".to_owned()));
        }
        info!("loaded decomposition cache snapshot: {} entries", cache.len());
        Ok(cache)
    }
}

fn read_tally(cur: &mut Cursor<'_>) -> Result<Tally, SnapshotError> {
    let mut tally = Tally::default();
    for _ in 0..cur.byte()? {
        let kind = byte_kind(cur.byte()?)?;
        let rank = cur.byte()?;
        if kind == Kind::Isolated || kind == Kind::Quad {
            return Err(SnapshotError::Corrupt(format!("unexpected {kind:?}")));
        }
        tally = tally.with(Block::new(kind, rank));
    }
    let isolated = cur.byte()? as usize;
    for &rank in cur.take(isolated)? {
        tally = tally.with_isolated(rank);
    }
    Ok(tally)
}

/// Calls `f` for every non-empty sorted rank sequence starting at `rank`.
fn enumerate(
    class: SuitClass,
    rank: u8,
    left: usize,
    ranks: &mut Vec<u8>,
    f: &mut impl FnMut(&[u8]),
) {
    if rank > class.max_rank() {
        if !ranks.is_empty() {
            f(ranks);
        }
        return;
    }
    for n in 0..=left.min(4) {
        ranks.resize(ranks.len() + n, rank);
        enumerate(class, rank + 1, left - n, ranks, &mut *f);
        ranks.truncate(ranks.len() - n);
    }
}

struct Cursor<'a> {
    raw: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], SnapshotError> {
        let end = self.pos + n;
        let slice = self
            .raw
            .get(self.pos..end)
            .ok_or_else(|| SnapshotError::Corrupt("unexpected end of data".to_owned()))?;
        self.pos = end;
        Ok(slice)
    }

    fn byte(&mut self) -> Result<u8, SnapshotError> {
        Ok(self.take(1)?[0])
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], SnapshotError> {
        let mut out = [0; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }
}

fn class_byte(class: SuitClass) -> u8 {
    match class {
        SuitClass::Number => 0,
        SuitClass::Honor => 1,
    }
}

fn kind_byte(kind: Kind) -> u8 {
    match kind {
        Kind::Triplet => 0,
        Kind::Run => 1,
        Kind::Quad => 2,
        Kind::Pair => 3,
        Kind::ProtoRun => 4,
        Kind::Kanchan => 5,
        Kind::Isolated => 6,
    }
}

fn byte_kind(b: u8) -> Result<Kind, SnapshotError> {
    Ok(match b {
        0 => Kind::Triplet,
        1 => Kind::Run,
        2 => Kind::Quad,
        3 => Kind::Pair,
        4 => Kind::ProtoRun,
        5 => Kind::Kanchan,
        6 => Kind::Isolated,
        _ => return Err(SnapshotError::Corrupt(format!("bad kind {b}"))),
    })
}
