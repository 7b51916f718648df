//! Benchmarking and experimentation module.
//!
//! Two studies:
//! - growth: how the three Held-Karp evaluations scale with `n`, measured
//!   against closed-form predictions
//! - trials: summary statistics over independent random-restart descents

use crate::error::{TspError, TspResult};
use crate::exact::{HeldKarpConfig, HeldKarpSolver, MemoizedRecursion, NaiveRecursion};
use crate::heuristics::local_search::TrialRecord;
use crate::instance::TspInstance;
use crate::rng::ParkMiller;

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::fs::File;
use std::path::Path;
use std::time::Instant;

/// Predicted number of calls made by the unmemoised recursion for
/// `D(0, full)`: `1 + Σ_{k=0}^{n-2} (n-1)!/k!`. `None` on overflow.
pub fn naive_call_count(n: usize) -> Option<u64> {
    if n == 0 {
        return Some(0);
    }
    let mut sum: u64 = 1;
    let mut term: u64 = 1;
    // term = (n-1)!/k!, built from k = n-2 down to 0
    for k in (0..n - 1).rev() {
        term = term.checked_mul(k as u64 + 1)?;
        sum = sum.checked_add(term)?;
    }
    Some(sum)
}

/// Predicted number of calls made by the memoised recursion:
/// `1 + m + m(m-1)·2^(m-2)` with `m = n - 1`.
pub fn memo_call_count(n: usize) -> u64 {
    if n <= 1 {
        return n as u64;
    }
    let m = (n - 1) as u64;
    let shared = if m >= 2 { (m * (m - 1)) << (m - 2) } else { 0 };
    1 + m + shared
}

/// Predicted number of states filled by the bottom-up table: `m·2^(m-1) − m`.
pub fn table_state_count(n: usize) -> u64 {
    if n <= 1 {
        return 0;
    }
    let m = (n - 1) as u64;
    (m << (m - 1)) - m
}

/// Numeric value of the full subset `{1, ..., n-1}`: `2^(n-1) − 1`.
pub fn full_set_bits(n: usize) -> u64 {
    if n == 0 {
        return 0;
    }
    (1u64 << (n - 1)) - 1
}

/// Benchmark configuration
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Largest instance of the growth study
    pub max_vertices: usize,
    /// Largest instance the unmemoised recursion is run on
    pub naive_limit: usize,
    /// Memory limit for the memo and the bottom-up tables
    pub max_table_bytes: u128,
    /// Seed of the instance generator
    pub seed: i32,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            max_vertices: 16,
            naive_limit: 10,
            max_table_bytes: HeldKarpConfig::default().max_table_bytes,
            seed: 1,
        }
    }
}

/// Measured and predicted counts for one instance size
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthRecord {
    pub vertices: usize,
    pub full_set_bits: u64,
    pub naive_calls: Option<u64>,
    pub naive_predicted: Option<u64>,
    pub memo_calls: u64,
    pub memo_predicted: u64,
    pub table_states: u64,
    pub table_predicted: u64,
    pub optimum: u64,
    /// Seconds
    pub naive_time: Option<f64>,
    pub memo_time: f64,
    pub alloc_time: f64,
    pub table_time: f64,
}

impl GrowthRecord {
    /// Whether every measured count equals its prediction.
    pub fn matches_predictions(&self) -> bool {
        let naive_ok = self.naive_calls.map_or(true, |c| Some(c) == self.naive_predicted);
        naive_ok
            && self.memo_calls == self.memo_predicted
            && self.table_states == self.table_predicted
    }
}

/// Run the three evaluations on random instances of size `1..=max_vertices`.
/// The instances are drawn one after another from a single generator.
///
/// The study stops at the first size whose tables exceed
/// `max_table_bytes` and returns the records measured so far.
pub fn run_growth(config: &BenchmarkConfig) -> TspResult<Vec<GrowthRecord>> {
    let mut rng = ParkMiller::new(config.seed);
    let solver = HeldKarpSolver::new(HeldKarpConfig {
        max_table_bytes: config.max_table_bytes,
    });
    let mut records = Vec::with_capacity(config.max_vertices);

    for n in 1..=config.max_vertices {
        let instance = TspInstance::generate(n, &mut rng);
        let record = match measure(&instance, config, &solver) {
            Ok(record) => record,
            Err(TspError::TableTooLarge {
                required_bytes,
                limit_bytes,
                ..
            }) => {
                log::warn!(
                    "n={}: tables need {} bytes, limit is {} bytes; growth study stops at n={}",
                    n,
                    required_bytes,
                    limit_bytes,
                    n - 1
                );
                break;
            }
            Err(e) => return Err(e),
        };
        log::info!(
            "n={}: memo calls {} (predicted {}), table states {} (predicted {})",
            n,
            record.memo_calls,
            record.memo_predicted,
            record.table_states,
            record.table_predicted
        );
        records.push(record);
    }
    Ok(records)
}

fn measure(instance: &TspInstance, config: &BenchmarkConfig, solver: &HeldKarpSolver) -> TspResult<GrowthRecord> {
    let n = instance.dimension;

    let (naive_calls, naive_time) = if n <= config.naive_limit {
        let start = Instant::now();
        let mut naive = NaiveRecursion::new(instance)?;
        naive.solve();
        (Some(naive.calls()), Some(start.elapsed().as_secs_f64()))
    } else {
        (None, None)
    };

    let start = Instant::now();
    let mut memo = MemoizedRecursion::new(instance, config.max_table_bytes)?;
    let memo_optimum = memo.solve();
    let memo_time = start.elapsed().as_secs_f64();

    let exact = solver.solve(instance)?;
    if exact.solution.length != memo_optimum {
        log::warn!(
            "n={}: table optimum {} differs from memoised optimum {}",
            n,
            exact.solution.length,
            memo_optimum
        );
    }

    Ok(GrowthRecord {
        vertices: n,
        full_set_bits: full_set_bits(n),
        naive_calls,
        naive_predicted: naive_call_count(n),
        memo_calls: memo.calls(),
        memo_predicted: memo_call_count(n),
        table_states: exact.states,
        table_predicted: table_state_count(n),
        optimum: exact.solution.length,
        naive_time,
        memo_time,
        alloc_time: exact.alloc_time.as_secs_f64(),
        table_time: exact.solve_time.as_secs_f64(),
    })
}

/// Summary of a random-restart run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialSummary {
    pub trials: usize,
    pub best_length: u64,
    pub worst_length: u64,
    pub mean_initial: f64,
    pub mean_final: f64,
    /// Sample standard deviation; 0 for a single trial
    pub std_final: f64,
    pub mean_repairs: f64,
    pub total_time: f64,
}

impl TrialSummary {
    /// Summarise `records`; `None` if empty.
    pub fn from_records(records: &[TrialRecord]) -> Option<Self> {
        if records.is_empty() {
            return None;
        }
        let finals: Vec<f64> = records.iter().map(|r| r.final_length as f64).collect();
        let initials: Vec<f64> = records.iter().map(|r| r.initial_length as f64).collect();
        let repairs: Vec<f64> = records.iter().map(|r| r.repairs as f64).collect();

        let std_final = if finals.len() > 1 { finals.iter().std_dev() } else { 0.0 };

        Some(TrialSummary {
            trials: records.len(),
            best_length: records.iter().map(|r| r.final_length).fold(u64::MAX, u64::min),
            worst_length: records.iter().map(|r| r.final_length).fold(0, u64::max),
            mean_initial: initials.iter().mean(),
            mean_final: finals.iter().mean(),
            std_final,
            mean_repairs: repairs.iter().mean(),
            total_time: records.iter().map(|r| r.cpu_time).sum(),
        })
    }
}

impl std::fmt::Display for TrialSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Trials:          {}", self.trials)?;
        writeln!(f, "Best length:     {}", self.best_length)?;
        writeln!(f, "Worst length:    {}", self.worst_length)?;
        writeln!(f, "Mean initial:    {:.2}", self.mean_initial)?;
        writeln!(f, "Mean final:      {:.2} (std {:.2})", self.mean_final, self.std_final)?;
        writeln!(f, "Mean repairs:    {:.2}", self.mean_repairs)?;
        write!(f, "Total CPU time:  {:.3}s", self.total_time)
    }
}

/// Export serialisable rows to CSV, one row per record
pub fn export_to_csv<T: Serialize, P: AsRef<Path>>(records: &[T], path: P) -> TspResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);

    for record in records {
        writer.serialize(record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Generate the growth study report
pub fn generate_growth_report(records: &[GrowthRecord]) -> String {
    let mut report = String::new();

    report.push_str("========================================\n");
    report.push_str("       Held-Karp Growth Report\n");
    report.push_str("========================================\n");
    report.push_str(&format!(
        "Generated: {}\n\n",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    ));

    report.push_str(&format!(
        "{:>3} {:>12} {:>20} {:>14} {:>14} {:>10} {:>10}\n",
        "n", "full bits", "naive calls", "memo calls", "table states", "memo s", "table s"
    ));
    report.push_str("-".repeat(89).as_str());
    report.push('\n');

    for r in records {
        let naive = r
            .naive_calls
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());
        report.push_str(&format!(
            "{:>3} {:>12} {:>20} {:>14} {:>14} {:>10.4} {:>10.4}{}\n",
            r.vertices,
            r.full_set_bits,
            naive,
            r.memo_calls,
            r.table_states,
            r.memo_time,
            r.table_time,
            if r.matches_predictions() { "" } else { "  (prediction mismatch)" }
        ));
    }

    report.push_str("-".repeat(89).as_str());
    report.push('\n');
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_forms() {
        let naive: Vec<u64> = (1..=5).map(|n| naive_call_count(n).unwrap()).collect();
        assert_eq!(naive, vec![1, 2, 5, 16, 65]);
        let memo: Vec<u64> = (1..=5).map(memo_call_count).collect();
        assert_eq!(memo, vec![1, 2, 5, 16, 53]);
        assert_eq!(table_state_count(4), 9);
        assert_eq!(table_state_count(1), 0);
        assert_eq!(table_state_count(2), 0);
        assert_eq!(full_set_bits(4), 7);
        // {1, ..., 31}: vertex v sits at bit v - 1
        assert_eq!(full_set_bits(32), (1u64 << 31) - 1);
    }

    #[test]
    fn test_naive_prediction_overflows_gracefully() {
        assert!(naive_call_count(21).is_some());
        assert!(naive_call_count(32).is_none());
    }

    #[test]
    fn test_growth_matches_predictions() {
        let config = BenchmarkConfig {
            max_vertices: 9,
            naive_limit: 8,
            ..Default::default()
        };
        let records = run_growth(&config).unwrap();
        assert_eq!(records.len(), 9);
        for r in &records {
            assert!(r.matches_predictions(), "n = {}: {:?}", r.vertices, r);
        }
        assert!(records[8].naive_calls.is_none());
        let report = generate_growth_report(&records);
        assert!(report.contains("Growth Report"));
        assert!(!report.contains("mismatch"));
    }

    #[test]
    fn test_growth_keeps_records_below_memory_limit() {
        // n = 6 needs 6 * 32 * 8 = 1536 bytes of memo
        let config = BenchmarkConfig {
            max_vertices: 8,
            max_table_bytes: 1024,
            ..Default::default()
        };
        let records = run_growth(&config).unwrap();
        let sizes: Vec<usize> = records.iter().map(|r| r.vertices).collect();
        assert_eq!(sizes, vec![1, 2, 3, 4, 5]);
        assert!(records.iter().all(|r| r.matches_predictions()));
    }

    #[test]
    fn test_trial_summary() {
        let records: Vec<TrialRecord> = [(100, 60), (90, 40), (80, 50)]
            .iter()
            .enumerate()
            .map(|(trial, &(initial_length, final_length))| TrialRecord {
                trial,
                initial_length,
                final_length,
                repairs: 2,
                cpu_time: 0.5,
            })
            .collect();
        let summary = TrialSummary::from_records(&records).unwrap();
        assert_eq!(summary.best_length, 40);
        assert_eq!(summary.worst_length, 60);
        assert!((summary.mean_final - 50.0).abs() < 1e-9);
        assert!((summary.std_final - 10.0).abs() < 1e-9);
        assert!((summary.mean_initial - 90.0).abs() < 1e-9);
        assert!((summary.total_time - 1.5).abs() < 1e-9);
        assert!(TrialSummary::from_records(&[]).is_none());
    }

    #[test]
    fn test_export_csv() {
        let config = BenchmarkConfig {
            max_vertices: 4,
            ..Default::default()
        };
        let records = run_growth(&config).unwrap();
        let path = std::env::temp_dir().join(format!("tsp-growth-{}.csv", std::process::id()));
        export_to_csv(&records, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("vertices,full_set_bits,naive_calls"));
        assert_eq!(lines.count(), 4);
    }
}
