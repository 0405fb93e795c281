use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use visual_stim::{mock_stim_data, save_file, MockConfig, WindowConfig};

/// Write a mock visual-stimulus dataset as a trace table.
#[derive(Parser)]
#[command(name = "generate-mock", version)]
struct Args {
    /// Output file (.parquet, .json or .csv)
    #[arg(default_value = "mock_stim_data.parquet")]
    out: PathBuf,

    /// RNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Minimum number of subjects
    #[arg(long, default_value_t = 10)]
    min_subjects: usize,

    /// Maximum number of subjects
    #[arg(long, default_value_t = 20)]
    max_subjects: usize,

    /// Samples per trace over the 0–2 s grid
    #[arg(long, default_value_t = 10_000)]
    time_points: usize,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.min_subjects > args.max_subjects {
        bail!(
            "--min-subjects ({}) exceeds --max-subjects ({})",
            args.min_subjects,
            args.max_subjects
        );
    }

    let cfg = MockConfig {
        subjects: args.min_subjects..=args.max_subjects,
        num_time_points: args.time_points,
        ..MockConfig::default()
    };
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let dataset = mock_stim_data(&cfg, WindowConfig::default(), &mut rng)?;
    save_file(&dataset, &args.out)?;

    println!(
        "Wrote {} subjects × {} electrodes × {} repetitions ({} time points each) to {}",
        dataset.num_subjects(),
        cfg.num_electrodes,
        dataset.num_repetitions(),
        dataset.time().len(),
        args.out.display()
    );
    Ok(())
}
