//! Held-Karp - exact shortest Hamiltonian circuit on random points.

use clap::Parser;
use tsp_solver::benchmark::{export_to_csv, generate_growth_report, run_growth, BenchmarkConfig};
use tsp_solver::cli::{exit_code, init_logging, read_or_prompt, write_json};
use tsp_solver::exact::{check_vertex_count, HeldKarpConfig, HeldKarpSolver, MemoizedRecursion, NaiveRecursion};
use tsp_solver::instance::TspInstance;
use tsp_solver::rng::ParkMiller;
use tsp_solver::subset::VertexSubset;
use tsp_solver::TspResult;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "held-karp")]
#[command(version = "1.0")]
#[command(about = "Exact TSP by dynamic programming over vertex subsets")]
struct Cli {
    /// Number of vertices, in [1, 32]; asked on stdin when omitted
    vertices: Option<usize>,

    /// Seed of the point generator
    #[arg(short, long, default_value = "1")]
    seed: i32,

    /// Also run the unmemoised recursion
    #[arg(long)]
    naive: bool,

    /// Memory limit for the tables, in MiB
    #[arg(long, default_value = "2048")]
    max_table_mib: u64,

    /// Write the optimal solution as JSON
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Run the growth study for n = 1..=N instead of a single solve
    #[arg(long, value_name = "N")]
    growth: Option<usize>,

    /// Largest n the growth study runs the unmemoised recursion on
    #[arg(long, default_value = "10")]
    naive_limit: usize,

    /// CSV file for the growth study records
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.growth {
        Some(max_vertices) => growth_study(&cli, max_vertices),
        None => solve(&cli),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            exit_code(&e)
        }
    }
}

fn solve(cli: &Cli) -> TspResult<()> {
    let stdin = io::stdin();
    let n: usize = read_or_prompt(cli.vertices, "Number of vertices: ", &mut stdin.lock(), &mut io::stdout())?;
    check_vertex_count(n)?;

    let mut rng = ParkMiller::new(cli.seed);
    let instance = TspInstance::generate(n, &mut rng);
    let config = HeldKarpConfig::with_limit_mib(cli.max_table_mib);
    if cli.verbose {
        println!("{}", instance.statistics());
    }

    if cli.naive {
        let start = Instant::now();
        let mut naive = NaiveRecursion::new(&instance)?;
        let length = naive.solve();
        println!(
            "Length of the smallest hamiltonian circuit (naive recursion) = {}; CPU time = {:.3}s",
            length,
            start.elapsed().as_secs_f64()
        );
        println!("    - Number of calls to D = {}", naive.calls());
    }

    let start = Instant::now();
    let mut memo = MemoizedRecursion::new(&instance, config.max_table_bytes)?;
    let length = memo.solve();
    println!(
        "Length of the smallest hamiltonian circuit (with memoisation) = {}; CPU time = {:.3}s",
        length,
        start.elapsed().as_secs_f64()
    );
    println!("    - Number of calls to D = {}", memo.calls());
    drop(memo);

    let result = HeldKarpSolver::new(config).solve(&instance)?;
    println!("Alloc time = {:.3}s", result.alloc_time.as_secs_f64());
    println!(
        "Length of the smallest hamiltonian circuit (iterative) = {}; CPU time = {:.3}s",
        result.solution.length,
        result.solve_time.as_secs_f64()
    );
    println!("    - Number of table states = {}", result.states);
    println!("    - Largest subset index = {}", VertexSubset::full(n).bits());
    println!("Circuit : {}", result.solution.circuit_string());

    if let Some(path) = &cli.output {
        write_json(&result.solution, path)?;
        println!("Solution saved to {:?}", path);
    }
    Ok(())
}

fn growth_study(cli: &Cli, max_vertices: usize) -> TspResult<()> {
    check_vertex_count(max_vertices)?;
    let config = BenchmarkConfig {
        max_vertices,
        naive_limit: cli.naive_limit,
        max_table_bytes: HeldKarpConfig::with_limit_mib(cli.max_table_mib).max_table_bytes,
        seed: cli.seed,
    };

    let records = run_growth(&config)?;
    print!("{}", generate_growth_report(&records));

    if let Some(path) = &cli.csv {
        export_to_csv(&records, path)?;
        println!("Growth records saved to {:?}", path);
    }
    Ok(())
}
