//! Greedy LS - 2-opt descent and iterated local search on random points.

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tsp_solver::benchmark::{export_to_csv, TrialSummary};
use tsp_solver::cli::{exit_code, init_logging, read_or_prompt, write_json};
use tsp_solver::heuristics::{IlsConfig, IteratedLocalSearch, MultiStartSearch};
use tsp_solver::instance::TspInstance;
use tsp_solver::rng::ParkMiller;
use tsp_solver::solution::Solution;
use tsp_solver::visualization::{TurtleScript, Visualizer};
use tsp_solver::{TspError, TspResult};

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "greedy-ls")]
#[command(version = "1.0")]
#[command(about = "2-opt descent and iterated local search for the Euclidean TSP")]
struct Cli {
    /// Number of vertices; asked on stdin when omitted
    vertices: Option<usize>,

    /// Perturb-and-descend rounds; asked on stdin when omitted
    iterations: Option<usize>,

    /// Random swaps per perturbation; asked on stdin when omitted
    perturbations: Option<usize>,

    /// Seed of the point and tour generator
    #[arg(short, long, default_value = "1")]
    seed: i32,

    /// Python turtle script showing every tour
    #[arg(long, default_value = "script.py")]
    script: PathBuf,

    /// Do not wait for the return key between tours in the script
    #[arg(long)]
    no_pause: bool,

    /// Keep vertex 0 first in every tour
    #[arg(long)]
    pin_depot: bool,

    /// Run K independent random-restart descents instead of the iterated search
    #[arg(long, value_name = "K")]
    restarts: Option<usize>,

    /// CSV file for the random-restart records
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Generate SVG visualization of the best tour
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Generate PNG visualization of the best tour
    #[arg(long)]
    png: Option<PathBuf>,

    /// Output solution to file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            exit_code(&e)
        }
    }
}

fn run(cli: &Cli) -> TspResult<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    let n: usize = read_or_prompt(cli.vertices, "Number of vertices: ", &mut input, &mut output)?;
    if n == 0 {
        return Err(TspError::InvalidInput("the number of vertices must be positive".to_string()));
    }

    let mut rng = ParkMiller::new(cli.seed);
    let instance = TspInstance::generate(n, &mut rng);
    if cli.verbose {
        println!("{}", instance.statistics());
    }

    let mut script = TurtleScript::create(&instance, &cli.script)?;
    script.pause = !cli.no_pause;

    let best = match cli.restarts {
        Some(trials) => restarts(cli, &instance, trials, &mut rng, &mut script)?,
        None => {
            let iterations: usize = read_or_prompt(cli.iterations, "Number of iterations: ", &mut input, &mut output)?;
            let perturbations: usize =
                read_or_prompt(cli.perturbations, "Number of perturbations: ", &mut input, &mut output)?;
            iterated(cli, &instance, iterations, perturbations, &mut rng, &mut script)?
        }
    };

    println!("Best length = {}", best.length);
    println!("Circuit : {}", best.circuit_string());

    let tours = script.tours();
    script.finish()?;
    println!("Script with {} tour(s) saved to {:?}", tours, cli.script);

    if cli.svg.is_some() || cli.png.is_some() {
        let viz = Visualizer::new();
        let svg = viz.generate_svg(&instance, &best)?;
        if let Some(path) = &cli.svg {
            viz.save_svg(&svg, path)?;
            println!("SVG saved to {:?}", path);
        }
        if let Some(path) = &cli.png {
            viz.save_png(&svg, path)?;
            println!("PNG saved to {:?}", path);
        }
    }

    if let Some(path) = &cli.output {
        write_json(&best, path)?;
        println!("Solution saved to {:?}", path);
    }
    Ok(())
}

fn iterated(
    cli: &Cli,
    instance: &TspInstance,
    iterations: usize,
    perturbations: usize,
    rng: &mut ParkMiller,
    script: &mut TurtleScript,
) -> TspResult<Solution> {
    let config = IlsConfig {
        iterations,
        perturbations,
        pin_depot: cli.pin_depot,
    };
    let ils = IteratedLocalSearch::new(config);

    // per-iteration debug logs replace the bar
    let pb = if cli.verbose {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(iterations as u64)
    };
    let style = ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}").unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);

    let mut emit_error = None;
    let outcome = ils.run_with_observer(instance, rng, |report| {
        if emit_error.is_none() {
            emit_error = script.push_tour(report.candidate).err();
        }
        if report.iteration == 0 {
            pb.println(format!("Length after first descent = {}", report.candidate.length));
        } else {
            pb.inc(1);
        }
        pb.set_message(format!("best {}", report.best_length));
    });
    pb.finish_and_clear();

    match emit_error {
        Some(e) => Err(e),
        None => Ok(outcome.best),
    }
}

fn restarts(
    cli: &Cli,
    instance: &TspInstance,
    trials: usize,
    rng: &mut ParkMiller,
    script: &mut TurtleScript,
) -> TspResult<Solution> {
    let mut search = MultiStartSearch::new(trials);
    search.pin_depot = cli.pin_depot;

    let mut emit_error = None;
    let outcome = search
        .run_with_observer(instance, rng, |record, solution| {
            println!(
                "Trial {}: {} -> {} ({} repairs, {:.3}s)",
                record.trial, record.initial_length, record.final_length, record.repairs, record.cpu_time
            );
            if emit_error.is_none() {
                emit_error = script.push_tour(solution).err();
            }
        })
        .ok_or_else(|| TspError::InvalidInput("the number of restarts must be positive".to_string()))?;
    if let Some(e) = emit_error {
        return Err(e);
    }

    if let Some(summary) = TrialSummary::from_records(&outcome.trials) {
        println!("{}", summary);
    }
    if let Some(path) = &cli.csv {
        export_to_csv(&outcome.trials, path)?;
        println!("Trial records saved to {:?}", path);
    }
    Ok(outcome.best)
}
