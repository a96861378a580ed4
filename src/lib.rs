//! Shanten calculation by exhaustive group decomposition.
//!
//! Concealed tiles are split by suit, each suit's ranks are decomposed into
//! melds, partial groups and isolated tiles, and the per-suit results are
//! crossed into whole-hand decompositions. Seven pairs and thirteen orphans
//! are matched directly and the lowest shanten wins.

pub mod cache;
pub mod combine;
pub mod decompose;
pub mod error;
pub mod group;
pub mod shanten;
pub mod special;
pub mod tally;
pub mod tile;

#[cfg(feature = "python")]
mod python;

pub use cache::{DecompCache, DEFAULT_CACHE_LEN};
pub use combine::{Decomposition, Pattern};
pub use decompose::{candidates, decompose, Decomposer, Mode, SuitClass};
pub use error::{HandError, Result, SnapshotError};
pub use group::{parse_meld, Group, Kind, Origin};
pub use shanten::{compute_shanten, compute_shanten_str, ShantenCalculator, ShantenReport};
pub use tally::{pareto, Block, Profile, Tally};
pub use tile::{parse_tiles, tiles_to_string, Suit, Tile};
