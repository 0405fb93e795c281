use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "visual-stim",
    version,
    about = "Exploratory analysis of visual-stimulus ePhys recordings",
    long_about = "Summarise, slice and plot electrode recordings from a visual-stimulus \
                  experiment. Reads a trace table (.parquet, .json, .csv) or, without \
                  --input, generates a mock dataset."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub data: DataArgs,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Args)]
pub struct DataArgs {
    /// Trace table to load; a mock dataset is generated when omitted
    #[arg(long, global = true)]
    pub input: Option<PathBuf>,

    /// Seed for the mock dataset
    #[arg(long, default_value_t = 0, global = true)]
    pub seed: u64,

    /// JSON file with stimulus window bounds, e.g. {"lower": 1.0, "upper": 1.1}
    #[arg(long, global = true)]
    pub windows: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print dataset shape and per-experimenter statistics
    Summary(SummaryArgs),
    /// Plot electrode traces of one subject and repetition
    PlotElectrode(PlotElectrodeArgs),
    /// Bar chart of recording statistics per experimenter
    ExperimenterBias(BiasArgs),
}

#[derive(Args)]
pub struct SummaryArgs {
    /// Also report statistics for each stimulus window
    #[arg(long)]
    pub windows_stats: bool,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct PlotElectrodeArgs {
    /// Subject id
    #[arg(long)]
    pub subject: u32,

    /// Repetition index
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub repetition: i64,

    /// Electrode ids
    #[arg(long, default_values_t = vec![0], num_args = 1..)]
    pub electrodes: Vec<u32>,

    /// Output image (.png or .svg)
    #[arg(long, default_value = "electrodes.png")]
    pub out: PathBuf,
}

#[derive(Args)]
pub struct BiasArgs {
    /// Output image (.png or .svg)
    #[arg(long, default_value = "experimenter_bias.png")]
    pub out: PathBuf,

    /// Also write the statistics table to this CSV file
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Restrict to one stimulus window
    #[arg(long, value_enum)]
    pub window: Option<WindowArg>,
}

#[derive(Clone, Copy, clap::ValueEnum)]
pub enum WindowArg {
    Pre,
    During,
    Post,
}

impl From<WindowArg> for visual_stim::StimulusWindow {
    fn from(arg: WindowArg) -> Self {
        match arg {
            WindowArg::Pre => Self::Pre,
            WindowArg::During => Self::During,
            WindowArg::Post => Self::Post,
        }
    }
}
