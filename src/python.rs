use pyo3::prelude::*;

use crate::cache::{DecompCache, DEFAULT_CACHE_LEN};
use crate::decompose::Mode;
use crate::error::HandError;
use crate::group::{parse_meld, Group};
use crate::shanten::{ShantenCalculator, ShantenReport};
use crate::tile::parse_tiles;

/// (suit, kind, rank, head, concealed)
type PyGroup = (String, String, u8, bool, bool);

fn value_error(e: HandError) -> PyErr {
    pyo3::exceptions::PyValueError::new_err(e.to_string())
}

fn to_py(g: Group) -> PyGroup {
    (
        g.suit.to_string(),
        g.kind.glyph().to_string(),
        g.rank,
        g.head,
        !g.is_called(),
    )
}

fn parse_declared(declared: &[String]) -> PyResult<Vec<Group>> {
    declared
        .iter()
        .map(|m| parse_meld(m).map_err(value_error))
        .collect()
}

fn mode_of(exhaustive: bool) -> Mode {
    if exhaustive {
        Mode::Exhaustive
    } else {
        Mode::SingleBest
    }
}

fn report_to_py(report: ShantenReport) -> (i8, Vec<Vec<PyGroup>>) {
    let decompositions = report
        .decompositions
        .iter()
        .map(|d| d.groups().map(to_py).collect())
        .collect();
    (report.shanten, decompositions)
}

fn shanten(
    calc: ShantenCalculator<'_>,
    concealed: &str,
    declared: &[String],
) -> PyResult<(i8, Vec<Vec<PyGroup>>)> {
    let tiles = parse_tiles(concealed).map_err(value_error)?;
    let melds = parse_declared(declared)?;
    let report = calc.calc(&tiles, &melds).map_err(value_error)?;
    Ok(report_to_py(report))
}

fn discards(
    calc: ShantenCalculator<'_>,
    concealed: &str,
    declared: &[String],
) -> PyResult<Vec<(String, i8)>> {
    let tiles = parse_tiles(concealed).map_err(value_error)?;
    let melds = parse_declared(declared)?;
    let dm = calc.eval_discards(&tiles, &melds).map_err(value_error)?;
    Ok(dm.into_iter().map(|(t, s)| (t.to_string(), s)).collect())
}

/// Python에서 손 샹텐 평가 (캐시 없음)
///
/// Returns:
///   (shanten, [ [ (suit, kind, rank, head, concealed), ... ], ... ])
#[pyfunction]
fn compute_shanten_py(
    concealed: &str,
    declared: Vec<String>,
    exhaustive: bool,
) -> PyResult<(i8, Vec<Vec<PyGroup>>)> {
    shanten(ShantenCalculator::new(mode_of(exhaustive)), concealed, &declared)
}

/// Python에서 버림 후보 평가 (캐시 없음)
///
/// Returns:
///   List[ (tile_glyph, shanten_after_discard) ]
#[pyfunction]
fn eval_discards_py(concealed: &str, declared: Vec<String>) -> PyResult<Vec<(String, i8)>> {
    discards(ShantenCalculator::default(), concealed, &declared)
}

/// 캐시를 가진 평가기. 생성할 때 한 번 precompute 하고 이후 읽기만 한다.
#[pyclass]
struct Evaluator {
    cache: DecompCache,
}

#[pymethods]
impl Evaluator {
    #[new]
    #[pyo3(signature = (cache_len = DEFAULT_CACHE_LEN))]
    fn new(cache_len: usize) -> Self {
        Evaluator {
            cache: DecompCache::precompute(cache_len),
        }
    }

    fn cache_len(&self) -> usize {
        self.cache.len()
    }

    #[pyo3(signature = (concealed, declared, exhaustive = false))]
    fn compute_shanten(
        &self,
        concealed: &str,
        declared: Vec<String>,
        exhaustive: bool,
    ) -> PyResult<(i8, Vec<Vec<PyGroup>>)> {
        let calc = ShantenCalculator::new(mode_of(exhaustive)).with_cache(&self.cache);
        shanten(calc, concealed, &declared)
    }

    fn eval_discards(&self, concealed: &str, declared: Vec<String>) -> PyResult<Vec<(String, i8)>> {
        discards(ShantenCalculator::default().with_cache(&self.cache), concealed, &declared)
    }
}

#[pymodule]
fn shanten_search(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<Evaluator>()?;
    m.add_function(wrap_pyfunction!(compute_shanten_py, m)?)?;
    m.add_function(wrap_pyfunction!(eval_discards_py, m)?)?;
    Ok(())
}
