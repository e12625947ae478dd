use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use weft::commands::{gates, graph, run, validate};
use weft::config::ConfigOverrides;
use weft::GateSource;

#[derive(Parser)]
#[command(name = "weft")]
#[command(
    about = "Run declarative plans: dependency-ordered tasks followed by quality gates",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// Increase diagnostic output (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and validate a plan without running it
    Validate {
        /// Path to the plan file
        plan_path: PathBuf,
    },

    /// Execute a plan's tasks in dependency order, then its quality gates
    Run {
        /// Path to the plan file
        plan_path: PathBuf,

        #[command(flatten)]
        engine: EngineArgs,

        /// Keep running independent tasks after a task fails
        #[arg(long)]
        continue_on_error: bool,

        /// Maximum number of tasks running at once
        #[arg(short = 'p', long)]
        max_parallel: Option<usize>,

        /// Timeout in seconds for tasks that do not declare one
        #[arg(long)]
        timeout: Option<f64>,

        /// Print the execution report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run only the quality gates of a plan
    Gates {
        /// Path to the plan file
        plan_path: PathBuf,

        #[command(flatten)]
        engine: EngineArgs,

        /// List gates in execution order without running them
        #[arg(long)]
        list: bool,

        /// Print gate results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the task dependency graph as parallel layers
    Graph {
        /// Path to the plan file
        plan_path: PathBuf,
    },
}

#[derive(Args)]
struct EngineArgs {
    /// Engine config file (default: weft.toml next to the plan)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Simulate execution without spawning any process
    #[arg(long)]
    dry_run: bool,

    /// Where quality gates come from
    #[arg(long, value_enum)]
    gates: Option<GateSource>,
}

impl EngineArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            dry_run: self.dry_run,
            gates: self.gates,
            ..ConfigOverrides::default()
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    weft::logging::init(cli.verbose);

    match cli.command {
        Commands::Validate { plan_path } => validate::execute(&plan_path),
        Commands::Run {
            plan_path,
            engine,
            continue_on_error,
            max_parallel,
            timeout,
            json,
        } => {
            let overrides = ConfigOverrides {
                max_parallel,
                continue_on_error,
                default_timeout_secs: timeout,
                ..engine.overrides()
            };
            let cancel = weft::commands::install_interrupt_handler()?;
            run::execute(
                run::RunOptions {
                    plan_path,
                    config_path: engine.config,
                    overrides,
                    json,
                },
                cancel,
            )
        }
        Commands::Gates {
            plan_path,
            engine,
            list,
            json,
        } => {
            let cancel = weft::commands::install_interrupt_handler()?;
            gates::execute(
                gates::GatesOptions {
                    plan_path,
                    overrides: engine.overrides(),
                    config_path: engine.config,
                    list,
                    json,
                },
                cancel,
            )
        }
        Commands::Graph { plan_path } => graph::execute(&plan_path),
    }
}
