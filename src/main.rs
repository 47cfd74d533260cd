use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use matsynth::matrix::ConcreteMatrix;
use matsynth::search::config::{ConstantConfig, DEFAULT_MAX_NODES, Grammar, SearchConfig};
use matsynth::search::result::SearchStatistics;
use matsynth::search::{EnumerativeSynthesizer, ExampleSet, Synthesizer, enumerate_with};
use matsynth::{Expr, parse_expr};

// --- Command Line Arguments ---

#[derive(Parser)]
#[command(name = "matsynth")]
#[command(about = "matsynth - Matrix Program Synthesizer")]
#[command(version)]
#[command(subcommand_required = true)]
#[command(arg_required_else_help = true)]
struct Args {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize a program from a JSON file of input/output examples
    Synth {
        /// JSON list of {"inputs": [matrix, ...], "output": matrix} objects
        examples: PathBuf,

        // --- Structural search options ---
        /// Timeout in seconds for structural search
        #[arg(long, default_value = "5")]
        timeout: u64,
        /// Search until the depth limit, however long it takes
        #[arg(long, conflicts_with = "timeout")]
        no_timeout: bool,
        /// Deepest level to enumerate
        #[arg(long)]
        max_depth: Option<usize>,
        /// Most search nodes to cache across depths (0 = unbounded)
        #[arg(long, default_value_t = DEFAULT_MAX_NODES)]
        max_nodes: usize,
        /// Comma-separated operations (e.g. "transpose,add,scale:2,pow:3")
        #[arg(long, default_value = "transpose,negate,add,multiply")]
        grammar: Grammar,
        /// Number of worker threads per depth (0 = one per CPU)
        #[arg(long, short = 'j', default_value = "1")]
        workers: usize,

        // --- Constant solving options ---
        /// Disable the SMT constant-solving fallback
        #[arg(long)]
        no_constants: bool,
        /// Depth of the trees constant skeletons are built around
        #[arg(long, default_value = "1")]
        skeleton_depth: usize,
        /// Budget in seconds for the whole constant-solving phase
        #[arg(long, default_value = "5")]
        constant_budget: u64,
        /// Timeout in seconds for each SMT query
        #[arg(long, default_value = "2")]
        solver_timeout: u64,
    },
    /// List every program up to a depth, in enumeration order
    Enumerate {
        /// Maximum tree depth
        #[arg(long, default_value = "1")]
        depth: usize,
        /// Number of input variables
        #[arg(long, default_value = "1")]
        vars: usize,
        /// Comma-separated operations
        #[arg(long, default_value = "transpose,negate,add,multiply")]
        grammar: Grammar,
        /// Print every program instead of only the count
        #[arg(long)]
        list: bool,
    },
    /// Evaluate a program on a JSON list of matrices
    Eval {
        /// Program text, e.g. "var0.multiply(var1.transpose())"
        program: String,
        /// JSON list of matrices bound to var0, var1, ...
        bindings: PathBuf,
    },
}

/// Options for the synthesis process
struct SynthOptions {
    timeout: Option<Duration>,
    max_depth: Option<usize>,
    max_nodes: Option<usize>,
    grammar: Grammar,
    workers: usize,
    constants: ConstantConfig,
    verbose: bool,
}

// --- Logging ---

fn init_logging(verbose: bool) {
    let default_level = if verbose { "matsynth=debug" } else { "matsynth=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

// --- Synthesis ---

fn load_examples(path: &Path) -> Result<ExampleSet, Box<dyn std::error::Error>> {
    let json = fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    let examples = ExampleSet::from_json(&json)
        .map_err(|e| format!("invalid examples in {}: {}", path.display(), e))?;
    info!(
        examples = examples.len(),
        variables = examples.num_variables(),
        "loaded examples"
    );
    Ok(examples)
}

fn run_synthesis(path: &Path, options: SynthOptions) -> Result<(), Box<dyn std::error::Error>> {
    let examples = load_examples(path)?;

    let config = SearchConfig::default()
        .with_timeout_option(options.timeout)
        .with_max_depth_option(options.max_depth)
        .with_max_nodes_option(options.max_nodes)
        .with_grammar(options.grammar)
        .with_workers(options.workers)
        .with_constants(options.constants)
        .with_verbose(options.verbose);
    debug!(grammar = %config.grammar, workers = config.workers, "search configuration");

    let mut synthesizer = EnumerativeSynthesizer::new(config);
    let result = synthesizer.synthesize(&examples);

    if options.verbose {
        print_search_statistics(&synthesizer.statistics());
    }

    let program = result?;
    println!("{}", program);
    Ok(())
}

/// Print search statistics
fn print_search_statistics(stats: &SearchStatistics) {
    eprintln!("\nSearch Statistics:");
    for line in stats.format_summary().lines() {
        eprintln!("  {}", line);
    }
}

// --- Enumeration ---

fn run_enumeration(depth: usize, vars: usize, grammar: &Grammar, list: bool) {
    let programs = enumerate_with(grammar, depth, vars);
    if list {
        for program in &programs {
            println!("{}", program);
        }
    } else {
        println!("{}", programs.len());
    }
}

// --- Evaluation ---

fn run_evaluation(program: &str, bindings: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let expr: Expr = parse_expr(program)?;
    let json = fs::read_to_string(bindings)
        .map_err(|e| format!("cannot read {}: {}", bindings.display(), e))?;
    let bindings: Vec<ConcreteMatrix> = serde_json::from_str(&json)?;

    let value = expr.evaluate::<ConcreteMatrix>(&bindings)?;
    println!("{}", serde_json::to_string(&value)?);
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    match args.command {
        Commands::Synth {
            examples,
            timeout,
            no_timeout,
            max_depth,
            max_nodes,
            grammar,
            workers,
            no_constants,
            skeleton_depth,
            constant_budget,
            solver_timeout,
        } => {
            let options = SynthOptions {
                timeout: (!no_timeout).then(|| Duration::from_secs(timeout)),
                max_depth,
                max_nodes: (max_nodes > 0).then_some(max_nodes),
                grammar,
                workers: if workers == 0 { num_cpus::get() } else { workers },
                constants: ConstantConfig::default()
                    .with_enabled(!no_constants)
                    .with_skeleton_depth(skeleton_depth)
                    .with_time_budget(Duration::from_secs(constant_budget))
                    .with_solver_timeout(Duration::from_secs(solver_timeout)),
                verbose: args.verbose,
            };

            if let Err(e) = run_synthesis(&examples, options) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Enumerate {
            depth,
            vars,
            grammar,
            list,
        } => run_enumeration(depth, vars, &grammar, list),
        Commands::Eval { program, bindings } => {
            if let Err(e) = run_evaluation(&program, &bindings) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }
}
