//! Distance oracles.
//!
//! The planner treats distances as a pure function of two cities. Any
//! `Fn(CityId, CityId) -> f64` closure is an oracle; [`DistanceMatrix`] and
//! [`DistanceTable`] cover the dense and sparse precomputed cases.

use super::types::CityId;
use fxhash::FxHashMap;

/// Pure, side-effect-free distance lookup.
///
/// Implementations must return non-negative values and should be O(1);
/// the annealer calls this on every cost refresh.
pub trait DistanceOracle: Send + Sync {
    /// Distance travelled from `from` to `to`.
    fn distance(&self, from: CityId, to: CityId) -> f64;
}

impl<F> DistanceOracle for F
where
    F: Fn(CityId, CityId) -> f64 + Send + Sync,
{
    fn distance(&self, from: CityId, to: CityId) -> f64 {
        self(from, to)
    }
}

/// Dense distance matrix indexed by `CityId.0`.
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    n: usize,
    values: Vec<f64>,
}

impl DistanceMatrix {
    /// Builds a matrix from square rows.
    ///
    /// Fails if the rows are not square or contain a negative or NaN entry.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, String> {
        let n = rows.len();
        let mut values = Vec::with_capacity(n * n);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n {
                return Err(format!("row {i} has {} entries, expected {n}", row.len()));
            }
            if let Some(bad) = row.iter().find(|d| d.is_nan() || **d < 0.0) {
                return Err(format!("row {i} contains invalid distance {bad}"));
            }
            values.extend(row);
        }
        Ok(Self { n, values })
    }

    /// Euclidean distances between planar points; city `i` is `points[i]`.
    pub fn euclidean(points: &[(f64, f64)]) -> Self {
        let n = points.len();
        let mut values = Vec::with_capacity(n * n);
        for &(ax, ay) in points {
            for &(bx, by) in points {
                values.push(((ax - bx).powi(2) + (ay - by).powi(2)).sqrt());
            }
        }
        Self { n, values }
    }

    /// Number of cities covered.
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }
}

impl DistanceOracle for DistanceMatrix {
    /// # Panics
    ///
    /// Panics if either city lies outside the matrix.
    fn distance(&self, from: CityId, to: CityId) -> f64 {
        let (i, j) = (from.0 as usize, to.0 as usize);
        assert!(
            i < self.n && j < self.n,
            "{from} -> {to} outside {}x{} distance matrix",
            self.n,
            self.n
        );
        self.values[i * self.n + j]
    }
}

/// Ordered `(from, to)` city pair used as a cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CityPair {
    pub from: CityId,
    pub to: CityId,
}

impl CityPair {
    pub fn new(from: CityId, to: CityId) -> Self {
        Self { from, to }
    }

    /// The same pair travelled backwards.
    pub fn reversed(self) -> Self {
        Self {
            from: self.to,
            to: self.from,
        }
    }
}

/// Sparse distance cache keyed by [`CityPair`].
///
/// Built once from an arbitrary (possibly expensive) distance function,
/// typically a shortest-path query against the topology, then queried in
/// O(1) during annealing.
#[derive(Debug, Clone, Default)]
pub struct DistanceTable {
    entries: FxHashMap<CityPair, f64>,
}

impl DistanceTable {
    /// Precomputes `f(a, b)` for every ordered pair of distinct `cities`.
    pub fn build<F>(cities: &[CityId], mut f: F) -> Self
    where
        F: FnMut(CityId, CityId) -> f64,
    {
        let mut entries = FxHashMap::default();
        entries.reserve(cities.len() * cities.len().saturating_sub(1));
        for &a in cities {
            for &b in cities {
                if a != b {
                    entries.insert(CityPair::new(a, b), f(a, b));
                }
            }
        }
        Self { entries }
    }

    /// Records one distance, replacing any previous value.
    pub fn insert(&mut self, pair: CityPair, distance: f64) {
        self.entries.insert(pair, distance);
    }

    /// Cached distance; same-city lookups are always `Some(0.0)`.
    pub fn get(&self, from: CityId, to: CityId) -> Option<f64> {
        if from == to {
            return Some(0.0);
        }
        self.entries.get(&CityPair::new(from, to)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DistanceOracle for DistanceTable {
    /// Unknown pairs are unreachable and cost `f64::INFINITY`.
    fn distance(&self, from: CityId, to: CityId) -> f64 {
        self.get(from, to).unwrap_or(f64::INFINITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_rejects_ragged_rows() {
        let err = DistanceMatrix::from_rows(vec![vec![0.0, 1.0], vec![1.0]]).unwrap_err();
        assert!(err.contains("row 1"));
    }

    #[test]
    fn test_matrix_rejects_negative() {
        assert!(DistanceMatrix::from_rows(vec![vec![0.0, -1.0], vec![1.0, 0.0]]).is_err());
    }

    #[test]
    fn test_matrix_lookup_is_directed() {
        let m = DistanceMatrix::from_rows(vec![vec![0.0, 2.0], vec![3.0, 0.0]]).unwrap();
        assert_eq!(m.distance(CityId(0), CityId(1)), 2.0);
        assert_eq!(m.distance(CityId(1), CityId(0)), 3.0);
    }

    #[test]
    fn test_euclidean() {
        let m = DistanceMatrix::euclidean(&[(0.0, 0.0), (3.0, 4.0)]);
        assert!((m.distance(CityId(0), CityId(1)) - 5.0).abs() < 1e-12);
        assert_eq!(m.distance(CityId(1), CityId(1)), 0.0);
    }

    #[test]
    fn test_table_build_and_lookup() {
        let cities = [CityId(1), CityId(5), CityId(9)];
        let table = DistanceTable::build(&cities, |a, b| (a.0 as f64 - b.0 as f64).abs());
        assert_eq!(table.len(), 6);
        assert_eq!(table.distance(CityId(1), CityId(9)), 8.0);
        assert_eq!(table.distance(CityId(5), CityId(5)), 0.0);
        assert_eq!(table.distance(CityId(1), CityId(2)), f64::INFINITY);
    }

    #[test]
    fn test_pair_is_ordered() {
        let p = CityPair::new(CityId(1), CityId(2));
        assert_ne!(p, p.reversed());
        assert_eq!(p, p.reversed().reversed());
    }

    #[test]
    fn test_closure_oracle() {
        let oracle = |a: CityId, b: CityId| if a == b { 0.0 } else { 1.5 };
        assert_eq!(oracle.distance(CityId(0), CityId(3)), 1.5);
    }
}
