//! Problem instances: random Euclidean points and their integer cost matrix.
//!
//! Costs are truncated Euclidean distances. The diagonal carries a sentinel
//! larger than any real edge so a self-loop is never chosen. The matrix is
//! built once and only read afterwards.

use crate::error::{TspError, TspResult};
use crate::rng::ParkMiller;
use serde::{Deserialize, Serialize};

/// Coordinates are drawn from `[0, COORD_MAX)`.
pub const COORD_MAX: i32 = 1000;

/// Diagonal value of generated matrices, strictly above any real edge
/// (at most `sqrt(2) * COORD_MAX`).
pub const SELF_LOOP_COST: u32 = (COORD_MAX * COORD_MAX) as u32;

/// A point of the plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }

    /// Truncated Euclidean distance.
    pub fn distance_to(&self, other: &Point) -> u32 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        (dx * dx + dy * dy).sqrt() as u32
    }
}

/// Dense row-major `n × n` matrix of edge costs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostMatrix {
    n: usize,
    data: Vec<u32>,
}

impl CostMatrix {
    /// Build from rows, checking shape and symmetry.
    pub fn from_rows(rows: &[Vec<u32>]) -> TspResult<Self> {
        let n = rows.len();
        if n == 0 {
            return Err(TspError::InvalidCostMatrix("matrix is empty".to_string()));
        }
        let mut data = Vec::with_capacity(n * n);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(TspError::InvalidCostMatrix(format!(
                    "row {} has {} entries, expected {}",
                    i,
                    row.len(),
                    n
                )));
            }
            data.extend_from_slice(row);
        }
        let matrix = CostMatrix { n, data };
        for i in 0..n {
            for j in i + 1..n {
                if matrix.get(i, j) != matrix.get(j, i) {
                    return Err(TspError::InvalidCostMatrix(format!(
                        "cost[{}][{}] = {} differs from cost[{}][{}] = {}",
                        i,
                        j,
                        matrix.get(i, j),
                        j,
                        i,
                        matrix.get(j, i)
                    )));
                }
            }
        }
        Ok(matrix)
    }

    /// Euclidean matrix over `points`, filled once per unordered pair.
    pub fn euclidean(points: &[Point]) -> Self {
        let n = points.len();
        let mut data = vec![0u32; n * n];
        for i in 0..n {
            data[i * n + i] = SELF_LOOP_COST;
            for j in i + 1..n {
                let d = points[i].distance_to(&points[j]);
                data[i * n + j] = d;
                data[j * n + i] = d;
            }
        }
        CostMatrix { n, data }
    }

    /// Number of vertices.
    #[inline]
    pub fn size(&self) -> usize {
        self.n
    }

    /// Cost of edge `(i, j)`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> u32 {
        debug_assert!(i < self.n && j < self.n);
        self.data[i * self.n + j]
    }
}

/// A complete TSP instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TspInstance {
    /// Name of the instance
    pub name: String,
    /// Number of vertices (including the depot 0)
    pub dimension: usize,
    /// Coordinates, empty for instances built from an explicit matrix
    pub points: Vec<Point>,
    /// Edge costs
    pub costs: CostMatrix,
}

impl TspInstance {
    /// Draw `n` random points in `[0, 1000)²` from `rng` (x then y per
    /// vertex) and derive the cost matrix.
    pub fn generate(n: usize, rng: &mut ParkMiller) -> Self {
        let points: Vec<Point> = (0..n)
            .map(|_| {
                let x = rng.next_below(COORD_MAX as usize) as i32;
                let y = rng.next_below(COORD_MAX as usize) as i32;
                Point::new(x, y)
            })
            .collect();
        log::debug!("generated {} random points", n);
        Self::from_points(&format!("random-{}", n), points)
    }

    pub fn from_points(name: &str, points: Vec<Point>) -> Self {
        let costs = CostMatrix::euclidean(&points);
        TspInstance {
            name: name.to_string(),
            dimension: points.len(),
            points,
            costs,
        }
    }

    /// Instance over an explicit symmetric matrix, without coordinates.
    pub fn from_cost_matrix(name: &str, rows: &[Vec<u32>]) -> TspResult<Self> {
        let costs = CostMatrix::from_rows(rows)?;
        Ok(TspInstance {
            name: name.to_string(),
            dimension: costs.size(),
            points: Vec::new(),
            costs,
        })
    }

    pub fn has_coordinates(&self) -> bool {
        self.points.len() == self.dimension
    }

    /// Get the cost between two vertices
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> u64 {
        self.costs.get(i, j) as u64
    }

    /// Length of the closed tour visiting `tour` in order and returning to
    /// its first vertex. Tours with fewer than two vertices have length 0.
    pub fn tour_length(&self, tour: &[usize]) -> u64 {
        if tour.len() < 2 {
            return 0;
        }
        let path: u64 = tour.windows(2).map(|w| self.distance(w[0], w[1])).sum();
        path + self.distance(tour[tour.len() - 1], tour[0])
    }

    /// Get statistics about the instance
    pub fn statistics(&self) -> InstanceStatistics {
        let mut edges: Vec<u32> = Vec::new();
        for i in 0..self.dimension {
            for j in i + 1..self.dimension {
                edges.push(self.costs.get(i, j));
            }
        }
        let avg_edge = if edges.is_empty() {
            0.0
        } else {
            edges.iter().map(|&e| e as f64).sum::<f64>() / edges.len() as f64
        };

        InstanceStatistics {
            name: self.name.clone(),
            dimension: self.dimension,
            num_edges: edges.len(),
            min_edge: edges.iter().copied().min().unwrap_or(0),
            max_edge: edges.iter().copied().max().unwrap_or(0),
            avg_edge,
        }
    }
}

/// Statistics about a TSP instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceStatistics {
    pub name: String,
    pub dimension: usize,
    pub num_edges: usize,
    pub min_edge: u32,
    pub max_edge: u32,
    pub avg_edge: f64,
}

impl std::fmt::Display for InstanceStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Instance: {}", self.name)?;
        writeln!(f, "  Vertices: {} (depot + {})", self.dimension, self.dimension.saturating_sub(1))?;
        writeln!(f, "  Edges: {}", self.num_edges)?;
        writeln!(f, "  Min edge: {}", self.min_edge)?;
        writeln!(f, "  Max edge: {}", self.max_edge)?;
        writeln!(f, "  Avg edge: {:.2}", self.avg_edge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_truncates() {
        let a = Point::new(0, 0);
        assert_eq!(a.distance_to(&Point::new(3, 4)), 5);
        // sqrt(2) = 1.414.. truncates to 1
        assert_eq!(a.distance_to(&Point::new(1, 1)), 1);
        assert_eq!(a.distance_to(&Point::new(999, 999)), 1412);
    }

    #[test]
    fn test_generated_matrix_is_symmetric() {
        let mut rng = ParkMiller::new(1);
        let instance = TspInstance::generate(12, &mut rng);
        assert!(instance.has_coordinates());
        for i in 0..12 {
            assert_eq!(instance.costs.get(i, i), SELF_LOOP_COST);
            for j in 0..12 {
                assert_eq!(instance.costs.get(i, j), instance.costs.get(j, i));
                if i != j {
                    assert!(instance.costs.get(i, j) < SELF_LOOP_COST);
                }
            }
        }
    }

    #[test]
    fn test_generation_consumes_stream_in_order() {
        let mut rng = ParkMiller::new(1);
        let instance = TspInstance::generate(2, &mut rng);
        // 16807 % 1000, 282475249 % 1000, 1622650073 % 1000, 984943658 % 1000
        assert_eq!(instance.points[0], Point::new(807, 249));
        assert_eq!(instance.points[1], Point::new(73, 658));
    }

    #[test]
    fn test_tour_length_closes_cycle() {
        let points = vec![
            Point::new(0, 0),
            Point::new(3, 0),
            Point::new(3, 4),
        ];
        let instance = TspInstance::from_points("triangle", points);
        assert_eq!(instance.tour_length(&[0, 1, 2]), 3 + 4 + 5);
        assert_eq!(instance.tour_length(&[2, 0, 1]), 12);
        assert_eq!(instance.tour_length(&[1]), 0);
    }

    #[test]
    fn test_from_cost_matrix_rejects_asymmetry() {
        let rows = vec![vec![0, 1], vec![2, 0]];
        assert!(matches!(
            TspInstance::from_cost_matrix("bad", &rows),
            Err(TspError::InvalidCostMatrix(_))
        ));
        let ragged = vec![vec![0, 1], vec![1]];
        assert!(TspInstance::from_cost_matrix("ragged", &ragged).is_err());
    }

    #[test]
    fn test_statistics() {
        let rows = vec![vec![9, 2, 4], vec![2, 9, 6], vec![4, 6, 9]];
        let instance = TspInstance::from_cost_matrix("small", &rows).unwrap();
        assert!(!instance.has_coordinates());
        let stats = instance.statistics();
        assert_eq!(stats.num_edges, 3);
        assert_eq!(stats.min_edge, 2);
        assert_eq!(stats.max_edge, 6);
        assert!((stats.avg_edge - 4.0).abs() < 1e-9);
    }
}
