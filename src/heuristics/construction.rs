use crate::instance::TspInstance;
use crate::rng::ParkMiller;
use crate::solution::Solution;

pub trait ConstructionHeuristic {
    fn construct(&self, instance: &TspInstance, rng: &mut ParkMiller) -> Solution;
    fn name(&self) -> &str;
}

/// Uniformly random tour.
///
/// Candidates are kept in an array; each step draws an index among the
/// remaining ones and overwrites it with the last remaining candidate.
/// The first vertex is either drawn too or pinned to the depot.
pub struct RandomTour {
    pub pin_depot: bool,
}

impl RandomTour {
    pub fn new() -> Self {
        RandomTour { pin_depot: false }
    }

    pub fn from_depot() -> Self {
        RandomTour { pin_depot: true }
    }
}

impl Default for RandomTour {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstructionHeuristic for RandomTour {
    fn construct(&self, instance: &TspInstance, rng: &mut ParkMiller) -> Solution {
        let n = instance.dimension;
        if n == 0 {
            return Solution::from_tour(instance, Vec::new(), self.name());
        }

        let mut candidates: Vec<usize> = (0..n).collect();
        let mut tour = Vec::with_capacity(n);
        let first = if self.pin_depot { 0 } else { rng.next_below(n) };
        tour.push(first);
        candidates[first] = n - 1;
        let mut remaining = n - 1;

        let mut length = 0u64;
        for _ in 1..n {
            let j = rng.next_below(remaining);
            let next = candidates[j];
            length += instance.distance(tour[tour.len() - 1], next);
            tour.push(next);
            remaining -= 1;
            candidates[j] = candidates[remaining];
        }
        if n > 1 {
            length += instance.distance(tour[n - 1], tour[0]);
        }

        let solution = Solution {
            tour,
            length,
            algorithm: self.name().to_string(),
            computation_time: 0.0,
            iterations: None,
        };
        debug_assert_eq!(solution.length, instance.tour_length(&solution.tour));
        solution
    }

    fn name(&self) -> &str {
        "RandomTour"
    }
}
