//! Local search improvement heuristics for the TSP.
//!
//! - 2-opt greedy descent: remove crossing edge pairs, first improvement,
//!   until a full scan finds none
//! - Iterated local search: random swap perturbations around the descent,
//!   keeping only strict improvements
//! - Multi-start: independent random tours, each descended

use crate::heuristics::construction::{ConstructionHeuristic, RandomTour};
use crate::instance::TspInstance;
use crate::rng::ParkMiller;
use crate::solution::Solution;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Trait for local search improvement methods
pub trait LocalSearch {
    fn improve(&self, instance: &TspInstance, solution: &mut Solution) -> bool;
    fn name(&self) -> &str;
}

/// True iff replacing edges `(a, b)` and `(c, d)` by `(a, c)` and `(b, d)`
/// strictly shortens the tour. Ties are not crossings, so the descent can
/// never cycle on equal-cost exchanges.
#[inline]
pub fn is_crossing(instance: &TspInstance, a: usize, b: usize, c: usize, d: usize) -> bool {
    instance.distance(a, c) + instance.distance(b, d)
        < instance.distance(a, b) + instance.distance(c, d)
}

/// Counters of one descent run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescentStats {
    /// Crossings repaired
    pub repairs: usize,
    /// Full or partial scans performed, the last one finding nothing
    pub scans: usize,
}

/// 2-Opt greedy descent.
///
/// Scans `i` over `0..n-2` and `j` over `i+2..n`, the edge after position
/// `n-1` wrapping to position 0. The first crossing found is repaired by
/// reversing positions `i+1..=j` and the scan restarts. Every repair
/// strictly lowers an integer length, so the loop terminates.
#[derive(Debug, Clone, Default)]
pub struct TwoOptDescent;

impl TwoOptDescent {
    pub fn new() -> Self {
        TwoOptDescent
    }

    /// First crossing pair `(i, j)` in scan order, if any.
    pub fn find_crossing(&self, instance: &TspInstance, tour: &[usize]) -> Option<(usize, usize)> {
        let n = tour.len();
        if n < 4 {
            return None;
        }
        for i in 0..n - 2 {
            for j in i + 2..n {
                if i == 0 && j == n - 1 {
                    continue; // edges share tour[0]
                }
                let next_j = if j == n - 1 { 0 } else { j + 1 };
                if is_crossing(instance, tour[i], tour[i + 1], tour[j], tour[next_j]) {
                    return Some((i, j));
                }
            }
        }
        None
    }

    /// Repair the first crossing, keeping `solution.length` in sync.
    /// Returns the repaired pair, or `None` at a local optimum.
    pub fn repair_step(&self, instance: &TspInstance, solution: &mut Solution) -> Option<(usize, usize)> {
        let (i, j) = self.find_crossing(instance, &solution.tour)?;
        let n = solution.tour.len();
        let t = &solution.tour;
        let (a, b, c, d) = (t[i], t[i + 1], t[j], t[(j + 1) % n]);
        let removed = instance.distance(a, b) + instance.distance(c, d);
        let added = instance.distance(a, c) + instance.distance(b, d);
        solution.apply_two_opt(i, j);
        solution.length = solution.length - removed + added;
        Some((i, j))
    }

    /// Repeat [`repair_step`](Self::repair_step) until no crossing remains.
    pub fn descend(&self, instance: &TspInstance, solution: &mut Solution) -> DescentStats {
        let mut stats = DescentStats::default();
        loop {
            stats.scans += 1;
            match self.repair_step(instance, solution) {
                Some((i, j)) => {
                    stats.repairs += 1;
                    log::trace!("2-opt repair ({}, {}) -> length {}", i, j, solution.length);
                }
                None => break,
            }
        }
        debug_assert_eq!(solution.length, instance.tour_length(&solution.tour));
        stats
    }
}

impl LocalSearch for TwoOptDescent {
    fn improve(&self, instance: &TspInstance, solution: &mut Solution) -> bool {
        self.descend(instance, solution).repairs > 0
    }

    fn name(&self) -> &str {
        "2-Opt-FI"
    }
}

/// Iterated local search parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IlsConfig {
    /// Perturb-and-descend rounds after the first descent
    pub iterations: usize,
    /// Random position swaps per perturbation
    pub perturbations: usize,
    /// Keep the depot at position 0 of every tour
    pub pin_depot: bool,
}

impl Default for IlsConfig {
    fn default() -> Self {
        IlsConfig {
            iterations: 100,
            perturbations: 3,
            pin_depot: false,
        }
    }
}

impl IlsConfig {
    pub fn with_params(iterations: usize, perturbations: usize) -> Self {
        IlsConfig {
            iterations,
            perturbations,
            ..Default::default()
        }
    }
}

/// What an observer sees after each descent of the iterated search.
#[derive(Debug)]
pub struct IterationReport<'a> {
    /// 0 for the descent of the initial random tour
    pub iteration: usize,
    /// The tour just produced by the descent
    pub candidate: &'a Solution,
    /// Incumbent length after the comparison
    pub best_length: u64,
    /// Whether the candidate replaced the incumbent
    pub improved: bool,
}

/// Result of an iterated search.
#[derive(Debug, Clone)]
pub struct IlsOutcome {
    /// Best tour found
    pub best: Solution,
    /// Incumbent length after iteration 0, 1, ..., `iterations`
    pub history: Vec<u64>,
}

/// Iterated Local Search
///
/// Descend from a random tour, then repeatedly copy the incumbent, apply
/// random swaps, descend again and keep the copy only if it is strictly
/// shorter.
pub struct IteratedLocalSearch<L: LocalSearch = TwoOptDescent> {
    pub config: IlsConfig,
    pub local_search: L,
}

impl IteratedLocalSearch<TwoOptDescent> {
    pub fn new(config: IlsConfig) -> Self {
        IteratedLocalSearch {
            config,
            local_search: TwoOptDescent::new(),
        }
    }
}

impl Default for IteratedLocalSearch<TwoOptDescent> {
    fn default() -> Self {
        Self::new(IlsConfig::default())
    }
}

impl<L: LocalSearch> IteratedLocalSearch<L> {
    /// Swap `perturbations` random pairs of distinct positions. Returns the
    /// number of swaps applied: 0 when fewer than two positions can move.
    pub fn perturb(&self, tour: &mut [usize], rng: &mut ParkMiller) -> usize {
        let first = usize::from(self.config.pin_depot);
        let movable = tour.len().saturating_sub(first);
        if movable < 2 {
            if self.config.perturbations > 0 {
                log::warn!("tour has {} movable position(s); perturbation skipped", movable);
            }
            return 0;
        }
        for _ in 0..self.config.perturbations {
            let i = first + rng.next_below(movable);
            let mut j = first + rng.next_below(movable);
            while j == i {
                j = first + rng.next_below(movable);
            }
            tour.swap(i, j);
        }
        self.config.perturbations
    }

    /// Run from a fresh random tour drawn from `rng`.
    pub fn run(&self, instance: &TspInstance, rng: &mut ParkMiller) -> IlsOutcome {
        self.run_with_observer(instance, rng, |_| {})
    }

    /// Run from a fresh random tour, reporting every descent to `observer`.
    pub fn run_with_observer<F>(&self, instance: &TspInstance, rng: &mut ParkMiller, observer: F) -> IlsOutcome
    where
        F: FnMut(&IterationReport<'_>),
    {
        let construction = RandomTour { pin_depot: self.config.pin_depot };
        let initial = construction.construct(instance, rng);
        self.search_from(instance, initial, rng, observer)
    }

    /// Run from a given starting tour.
    pub fn search_from<F>(
        &self,
        instance: &TspInstance,
        initial: Solution,
        rng: &mut ParkMiller,
        mut observer: F,
    ) -> IlsOutcome
    where
        F: FnMut(&IterationReport<'_>),
    {
        let start = Instant::now();
        let mut incumbent = initial;
        log::debug!("initial tour length {}", incumbent.length);
        self.local_search.improve(instance, &mut incumbent);
        observer(&IterationReport {
            iteration: 0,
            candidate: &incumbent,
            best_length: incumbent.length,
            improved: true,
        });

        let mut history = Vec::with_capacity(self.config.iterations + 1);
        history.push(incumbent.length);

        for iteration in 1..=self.config.iterations {
            let mut candidate = incumbent.clone();
            self.perturb(&mut candidate.tour, rng);
            candidate.validate(instance);
            self.local_search.improve(instance, &mut candidate);

            let improved = candidate.length < incumbent.length;
            let best_length = if improved { candidate.length } else { incumbent.length };
            log::debug!(
                "iteration {}: candidate {} best {}{}",
                iteration,
                candidate.length,
                best_length,
                if improved { " (improved)" } else { "" }
            );
            observer(&IterationReport {
                iteration,
                candidate: &candidate,
                best_length,
                improved,
            });
            if improved {
                incumbent = candidate;
            }
            history.push(incumbent.length);
        }

        incumbent.algorithm = "ILS".to_string();
        incumbent.iterations = Some(self.config.iterations);
        incumbent.computation_time = start.elapsed().as_secs_f64();
        log::info!(
            "ILS finished: best length {} after {} iterations",
            incumbent.length,
            self.config.iterations
        );

        IlsOutcome { best: incumbent, history }
    }
}

/// One independent trial of [`MultiStartSearch`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialRecord {
    pub trial: usize,
    pub initial_length: u64,
    pub final_length: u64,
    pub repairs: usize,
    pub cpu_time: f64,
}

/// Result of a multi-start run.
#[derive(Debug, Clone)]
pub struct MultiStartOutcome {
    pub best: Solution,
    pub trials: Vec<TrialRecord>,
}

/// Random restarts: each trial draws a random tour and descends it.
pub struct MultiStartSearch {
    pub trials: usize,
    pub pin_depot: bool,
    descent: TwoOptDescent,
}

impl MultiStartSearch {
    pub fn new(trials: usize) -> Self {
        MultiStartSearch {
            trials,
            pin_depot: false,
            descent: TwoOptDescent::new(),
        }
    }

    /// Run every trial, reporting each record and descended tour to `observer`.
    /// Returns `None` when `trials` is 0.
    pub fn run_with_observer<F>(
        &self,
        instance: &TspInstance,
        rng: &mut ParkMiller,
        mut observer: F,
    ) -> Option<MultiStartOutcome>
    where
        F: FnMut(&TrialRecord, &Solution),
    {
        let construction = RandomTour { pin_depot: self.pin_depot };
        let mut best: Option<Solution> = None;
        let mut records = Vec::with_capacity(self.trials);

        for trial in 0..self.trials {
            let mut solution = construction.construct(instance, rng);
            let initial_length = solution.length;
            let start = Instant::now();
            let stats = self.descent.descend(instance, &mut solution);
            let cpu_time = start.elapsed().as_secs_f64();
            solution.computation_time = cpu_time;
            solution.algorithm = "MultiStart".to_string();

            let record = TrialRecord {
                trial,
                initial_length,
                final_length: solution.length,
                repairs: stats.repairs,
                cpu_time,
            };
            observer(&record, &solution);
            records.push(record);

            if best.as_ref().map_or(true, |b| solution.length < b.length) {
                best = Some(solution);
            }
        }

        best.map(|mut best| {
            best.iterations = Some(self.trials);
            MultiStartOutcome { best, trials: records }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::Point;

    fn square() -> TspInstance {
        TspInstance::from_points(
            "square",
            vec![
                Point::new(0, 0),
                Point::new(10, 0),
                Point::new(10, 10),
                Point::new(0, 10),
            ],
        )
    }

    #[test]
    fn test_is_crossing_strict() {
        let instance = square();
        // diagonals 0-2 and 1-3 cross
        assert!(is_crossing(&instance, 0, 2, 1, 3));
        // sides 0-1 and 2-3 do not
        assert!(!is_crossing(&instance, 0, 1, 2, 3));
        // equal-cost exchange is not a crossing
        let line = TspInstance::from_points(
            "line",
            vec![Point::new(0, 0), Point::new(1, 0), Point::new(2, 0), Point::new(3, 0)],
        );
        assert!(!is_crossing(&line, 0, 1, 2, 3));
    }

    #[test]
    fn test_single_crossing_repaired_in_one_step() {
        let instance = square();
        let mut sol = Solution::from_tour(&instance, vec![0, 2, 1, 3], "test");
        assert_eq!(sol.length, 48);
        let descent = TwoOptDescent::new();
        let stats = descent.descend(&instance, &mut sol);
        assert_eq!(sol.tour, vec![0, 1, 2, 3]);
        assert_eq!(sol.length, 40);
        assert_eq!(stats, DescentStats { repairs: 1, scans: 2 });
        assert!(descent.find_crossing(&instance, &sol.tour).is_none());
    }

    #[test]
    fn test_wraparound_crossing() {
        let instance = square();
        // edges (1,2) and (3,0) via the closing edge; crossing only through wrap
        let mut sol = Solution::from_tour(&instance, vec![1, 0, 2, 3], "test");
        let descent = TwoOptDescent::new();
        assert!(descent.find_crossing(&instance, &sol.tour).is_some());
        descent.descend(&instance, &mut sol);
        assert_eq!(sol.length, 40);
    }

    #[test]
    fn test_small_tours_have_no_crossing() {
        let instance = TspInstance::generate(3, &mut ParkMiller::new(1));
        let mut sol = Solution::from_tour(&instance, vec![0, 1, 2], "t");
        let stats = TwoOptDescent::new().descend(&instance, &mut sol);
        assert_eq!(stats.repairs, 0);
        assert_eq!(stats.scans, 1);
    }

    #[test]
    fn test_descent_is_idempotent() {
        let mut rng = ParkMiller::new(5);
        let instance = TspInstance::generate(40, &mut rng);
        let mut sol = RandomTour::new().construct(&instance, &mut rng);
        let descent = TwoOptDescent::new();
        descent.descend(&instance, &mut sol);
        let tour = sol.tour.clone();
        let length = sol.length;
        assert!(!descent.improve(&instance, &mut sol));
        assert_eq!(sol.tour, tour);
        assert_eq!(sol.length, length);
    }

    #[test]
    fn test_perturb_swaps_distinct_positions() {
        let ils = IteratedLocalSearch::new(IlsConfig::with_params(1, 1));
        let mut rng = ParkMiller::new(1);
        let mut tour: Vec<usize> = (0..10).collect();
        assert_eq!(ils.perturb(&mut tour, &mut rng), 1);
        let moved = tour.iter().enumerate().filter(|&(i, &v)| i != v).count();
        assert_eq!(moved, 2);
    }

    #[test]
    fn test_perturb_degenerate_tours() {
        let ils = IteratedLocalSearch::new(IlsConfig::with_params(1, 5));
        let mut rng = ParkMiller::new(1);
        let mut one = vec![0];
        assert_eq!(ils.perturb(&mut one, &mut rng), 0);

        let pinned = IteratedLocalSearch::new(IlsConfig {
            pin_depot: true,
            ..IlsConfig::with_params(1, 5)
        });
        let mut two = vec![0, 1];
        assert_eq!(pinned.perturb(&mut two, &mut rng), 0);
        let mut five: Vec<usize> = (0..5).collect();
        pinned.perturb(&mut five, &mut rng);
        assert_eq!(five[0], 0);
    }

    #[test]
    fn test_ils_history_is_monotone() {
        let mut rng = ParkMiller::new(1);
        let instance = TspInstance::generate(30, &mut rng);
        let ils = IteratedLocalSearch::new(IlsConfig::with_params(25, 3));
        let mut reports = 0;
        let outcome = ils.run_with_observer(&instance, &mut rng, |_| reports += 1);
        assert_eq!(reports, 26);
        assert_eq!(outcome.history.len(), 26);
        assert!(outcome.history.windows(2).all(|w| w[1] <= w[0]));
        assert_eq!(outcome.best.length, *outcome.history.last().unwrap());
        assert!(outcome.best.is_complete(&instance));
        assert_eq!(outcome.best.length, instance.tour_length(&outcome.best.tour));
    }

    #[test]
    fn test_ils_single_vertex_terminates() {
        let mut rng = ParkMiller::new(1);
        let instance = TspInstance::generate(1, &mut rng);
        let outcome = IteratedLocalSearch::new(IlsConfig::with_params(5, 2)).run(&instance, &mut rng);
        assert_eq!(outcome.best.tour, vec![0]);
        assert_eq!(outcome.best.length, 0);
    }

    #[test]
    fn test_multi_start_keeps_best() {
        let mut rng = ParkMiller::new(1);
        let instance = TspInstance::generate(20, &mut rng);
        let outcome = MultiStartSearch::new(6)
            .run_with_observer(&instance, &mut rng, |record, sol| {
                assert_eq!(record.final_length, sol.length);
                assert!(record.final_length <= record.initial_length);
            })
            .unwrap();
        assert_eq!(outcome.trials.len(), 6);
        let min = outcome.trials.iter().map(|t| t.final_length).min().unwrap();
        assert_eq!(outcome.best.length, min);
        assert!(MultiStartSearch::new(0).run_with_observer(&instance, &mut rng, |_, _| {}).is_none());
    }
}
