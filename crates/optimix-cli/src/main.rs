use clap::{Parser, Subcommand};
use std::path::PathBuf;

use optimix_solver::{Group, Model, Options, SolutionStatus, Solver};

#[derive(Parser)]
#[command(name = "optimix")]
#[command(about = "A mixed integer linear programming solver", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a JSON model file and print the optimal assignment
    Solve {
        /// The file containing the model
        file: PathBuf,
        /// Output format (json, pretty)
        #[arg(short, long, default_value = "pretty")]
        format: String,
        /// Also report variables whose value is zero
        #[arg(long)]
        include_zeros: bool,
        /// Wall-clock budget in milliseconds for the integer search
        #[arg(long)]
        timeout: Option<f64>,
        /// Relative gap at which a near-optimal answer is accepted early
        #[arg(long)]
        tolerance: Option<f64>,
        /// Iteration budget for the integer search
        #[arg(long)]
        max_iterations: Option<usize>,
    },
    /// Check a JSON model file for errors
    Check {
        /// The file to check
        file: PathBuf,
    },
}

fn read_model(file: &PathBuf) -> Model {
    let source = match std::fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            std::process::exit(1);
        }
    };
    match serde_json::from_str(&source) {
        Ok(model) => model,
        Err(e) => {
            eprintln!("Model error: {}", e);
            std::process::exit(1);
        }
    }
}

fn group_size(group: &Group, total: usize) -> usize {
    match group {
        Group::All => total,
        Group::Named(names) => names.len(),
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            file,
            format,
            include_zeros,
            timeout,
            tolerance,
            max_iterations,
        } => {
            let model = read_model(&file);

            let mut options = Options {
                include_zero_variables: include_zeros,
                ..Options::default()
            };
            if let Some(timeout) = timeout {
                options.timeout = timeout;
            }
            if let Some(tolerance) = tolerance {
                options.tolerance = tolerance;
            }
            if let Some(max_iterations) = max_iterations {
                options.max_iterations = max_iterations;
            }

            let solution = Solver::with_options(options).solve(&model);

            if format == "json" {
                match serde_json::to_string_pretty(&solution) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Error encoding solution: {}", e);
                        std::process::exit(1);
                    }
                }
                return;
            }

            match solution.status {
                SolutionStatus::Optimal | SolutionStatus::TimedOut
                    if !solution.result.is_nan() =>
                {
                    if solution.status == SolutionStatus::TimedOut {
                        println!("Status: TIMED OUT (best answer so far, not proven optimal)");
                    } else {
                        println!("Status: OPTIMAL");
                    }
                    println!("Objective: {:.4}", solution.result);
                    println!();
                    println!("Variables:");
                    for (name, value) in &solution.variables {
                        println!("  {:24} {:12.4}", name, value);
                    }
                }
                SolutionStatus::Unbounded => {
                    println!("Status: UNBOUNDED");
                    if let Some((name, _)) = solution.variables.first() {
                        println!("{} can improve the objective without limit.", name);
                    } else {
                        println!("The problem has no finite optimal solution.");
                    }
                    std::process::exit(1);
                }
                SolutionStatus::Infeasible => {
                    println!("Status: INFEASIBLE");
                    println!("No assignment satisfies all constraints.");
                    std::process::exit(1);
                }
                SolutionStatus::Cycled => {
                    println!("Status: CYCLED");
                    println!("The pivot budget ran out before a solution was proven.");
                    std::process::exit(1);
                }
                _ => {
                    println!("Status: TIMED OUT");
                    println!("The search budget ran out before any integer solution was found.");
                    std::process::exit(1);
                }
            }
        }
        Commands::Check { file } => {
            let model = read_model(&file);
            if let Err(e) = model.validate() {
                eprintln!("✗ {} has errors:", file.display());
                eprintln!("  {}", e);
                std::process::exit(1);
            }

            println!("✓ {} is valid", file.display());
            println!("  objective: {}", model.objective);
            println!("  {} variables", model.variables.len());
            println!("  {} constraints", model.constraints.len());
            println!(
                "  {} integer, {} binary",
                group_size(&model.integers, model.variables.len()),
                group_size(&model.binaries, model.variables.len())
            );
        }
    }
}
