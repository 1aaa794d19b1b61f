//! OxiGIF CLI - inspect, validate and re-encode GIF files
//!
//! A Pure Rust GIF utility built on the permissive OxiGIF decoder.

mod commands;
mod utils;

use clap::{Parser, Subcommand, ValueEnum};
use oxigif::{ColourTableStrategy, QuantizerType};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "oxigif")]
#[command(author, version, about = "Pure Rust GIF inspector and encoder")]
#[command(long_about = "
OxiGIF reads GIF files permissively: damaged streams are decoded as far as
possible and every problem found is reported as a set of error flags.

Examples:
  oxigif info animation.gif
  oxigif info animation.gif --json
  oxigif test 'images/*.gif'
  oxigif recode input.gif output.gif --quantizer octree --repeat 0
  oxigif recode input.gif output.gif --palette web.act
  oxigif palette extract input.gif colours.act
  oxigif palette show colours.act
")]
struct Cli {
    /// Print debug logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the structure of a GIF file
    #[command(alias = "i")]
    Info {
        /// GIF file to inspect
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decode GIF files and report their error state
    #[command(alias = "t")]
    Test {
        /// Files or glob patterns
        #[arg(required = true)]
        patterns: Vec<String>,
    },

    /// Decode a GIF and encode its frames again
    #[command(alias = "r")]
    Recode {
        /// Input GIF file
        input: PathBuf,

        /// Output GIF file
        output: PathBuf,

        /// Colour table layout
        #[arg(short, long, value_enum, default_value = "global")]
        strategy: StrategyArg,

        /// Colour quantizer
        #[arg(short = 'z', long, value_enum, default_value = "neuquant")]
        quantizer: QuantizerArg,

        /// NeuQuant sampling factor (1 = best, 30 = fastest)
        #[arg(short, long, default_value = "10")]
        quality: usize,

        /// Loop count (0 = forever, -1 = no looping block); defaults to the input's
        #[arg(short, long, allow_hyphen_values = true)]
        repeat: Option<i32>,

        /// Transparent colour as RRGGBB
        #[arg(short, long)]
        transparent: Option<String>,

        /// ACT palette to map every frame onto
        #[arg(short, long)]
        palette: Option<PathBuf>,

        /// Show a progress bar
        #[arg(long)]
        progress: bool,
    },

    /// Work with Adobe Colour Table (.act) palettes
    #[command(subcommand)]
    Palette(PaletteCommands),
}

#[derive(Subcommand)]
enum PaletteCommands {
    /// Print the colours of an ACT file
    Show {
        /// ACT file
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Save the global colour table of a GIF as an ACT file
    Extract {
        /// Input GIF file
        input: PathBuf,

        /// Output ACT file
        output: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StrategyArg {
    /// One table shared by all frames
    Global,
    /// One table per frame
    Local,
}

impl From<StrategyArg> for ColourTableStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Global => ColourTableStrategy::UseGlobal,
            StrategyArg::Local => ColourTableStrategy::UseLocal,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum QuantizerArg {
    /// Kohonen neural network, 256 colours
    Neuquant,
    /// Octree reduction, 255 colours plus transparency
    Octree,
}

impl From<QuantizerArg> for QuantizerType {
    fn from(value: QuantizerArg) -> Self {
        match value {
            QuantizerArg::Neuquant => QuantizerType::NeuQuant,
            QuantizerArg::Octree => QuantizerType::Octree,
        }
    }
}

fn init_logging(verbose: bool) {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Info { file, json } => commands::cmd_info(&file, json),
        Commands::Test { patterns } => commands::cmd_test(&patterns, cli.verbose),
        Commands::Recode {
            input,
            output,
            strategy,
            quantizer,
            quality,
            repeat,
            transparent,
            palette,
            progress,
        } => commands::cmd_recode(commands::RecodeOptions {
            input,
            output,
            strategy: strategy.into(),
            quantizer: quantizer.into(),
            quality,
            repeat,
            transparent,
            palette,
            progress,
        }),
        Commands::Palette(PaletteCommands::Show { file, json }) => {
            commands::cmd_palette_show(&file, json)
        }
        Commands::Palette(PaletteCommands::Extract { input, output }) => {
            commands::cmd_palette_extract(&input, &output)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
