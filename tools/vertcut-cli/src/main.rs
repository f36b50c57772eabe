//! vertcut CLI: cut vertical short-form clips out of horizontal recordings.
//!
//! Usage:
//!   vertcut clip [INPUT]       Render one fragment
//!   vertcut batch [INPUT]      Render N random clips
//!   vertcut full [INPUT]       Render the whole source
//!   vertcut info [INPUT]       Show media information and bounds check
//!   vertcut validate           Validate a layout file
//!   vertcut check              Check ffmpeg/ffprobe availability
//!   vertcut init               Write default config and layout files

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

mod commands;

#[derive(Parser)]
#[command(
    name = "vertcut",
    about = "Recompose horizontal recordings into vertical clips",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Application config file (defaults to the standard location)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Layout file describing regions and placements
    #[arg(long, global = true)]
    layout: Option<PathBuf>,

    /// Seed for reproducible fragment sampling
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Also append log output to this file (processing.log if no path is given)
    #[arg(
        long,
        global = true,
        num_args = 0..=1,
        default_missing_value = "processing.log"
    )]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Fixed,
    Centered,
    Random,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a single fragment
    Clip {
        /// Source video (defaults to the latest file in the input directory)
        input: Option<PathBuf>,

        /// How the fragment start is chosen
        #[arg(long, value_enum, default_value = "random")]
        strategy: StrategyArg,

        /// Start offset in seconds (fixed strategy)
        #[arg(long, default_value = "0")]
        start: f64,

        /// Fragment duration in seconds
        #[arg(short, long)]
        duration: Option<f64>,
    },

    /// Render a batch of random clips
    Batch {
        /// Source video (defaults to the latest file in the input directory)
        input: Option<PathBuf>,

        /// Number of clips
        #[arg(short, long)]
        count: Option<usize>,

        /// Clip duration in seconds
        #[arg(short, long)]
        duration: Option<f64>,
    },

    /// Render the whole source
    Full {
        /// Source video (defaults to the latest file in the input directory)
        input: Option<PathBuf>,
    },

    /// Show media information
    Info {
        /// Source video (defaults to the latest file in the input directory)
        input: Option<PathBuf>,
    },

    /// Validate the layout given with --layout
    Validate,

    /// Check external tool availability
    Check,

    /// Write default config and layout files
    Init {
        /// Directory for the layout file
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let ctx = commands::Context::load(
        cli.config.as_deref(),
        cli.layout.as_deref(),
        cli.seed,
    )?;

    let mut logging = ctx.app.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    if cli.log_file.is_some() {
        logging.file = cli.log_file.clone();
    }
    vertcut_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Clip {
            input,
            strategy,
            start,
            duration,
        } => commands::clip::run(&ctx, input, strategy.into(), start, duration),
        Commands::Batch {
            input,
            count,
            duration,
        } => commands::batch::run(&ctx, input, count, duration),
        Commands::Full { input } => commands::full::run(&ctx, input),
        Commands::Info { input } => commands::info::run(&ctx, input),
        Commands::Validate => commands::validate::run(cli.layout),
        Commands::Check => commands::check::run(&ctx),
        Commands::Init { output, force } => {
            commands::init::run(&ctx, cli.config, output, force)
        }
    }
}

impl From<StrategyArg> for vertcut_layout_model::fragment::StartStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Fixed => Self::Fixed,
            StrategyArg::Centered => Self::Centered,
            StrategyArg::Random => Self::UniformRandom,
        }
    }
}
