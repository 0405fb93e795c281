mod cli;

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use cli::{BiasArgs, Cli, Command, DataArgs, PlotElectrodeArgs, SummaryArgs};
use visual_stim::{
    load_file, mock_stim_data, plot, MockConfig, StimulusDataset, Summary, WindowConfig,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .parse_default_env()
        .format_timestamp(None)
        .init();

    let dataset = open_dataset(&cli.data)?;

    match cli.command {
        Command::Summary(args) => summary(&dataset, &args),
        Command::PlotElectrode(args) => plot_electrode(&dataset, &args),
        Command::ExperimenterBias(args) => experimenter_bias(&dataset, &args),
    }
}

fn open_dataset(args: &DataArgs) -> Result<StimulusDataset> {
    let windows = match &args.windows {
        Some(path) => WindowConfig::from_json_file(path)?,
        None => WindowConfig::default(),
    };

    match &args.input {
        Some(path) => load_file(path, windows)
            .with_context(|| format!("loading dataset from {}", path.display())),
        None => {
            info!("no --input given, generating mock data (seed {})", args.seed);
            let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
            Ok(mock_stim_data(&MockConfig::default(), windows, &mut rng)?)
        }
    }
}

fn print_table(stats: &BTreeMap<String, Summary>) {
    println!("  {:<16} {:>12} {:>12} {:>12}", "experimenter", "mean", "std", "median");
    for (name, s) in stats {
        println!("  {name:<16} {:>12.6} {:>12.6} {:>12.6}", s.mean, s.std, s.median);
    }
}

fn summary(dataset: &StimulusDataset, args: &SummaryArgs) -> Result<()> {
    let stats = dataset.experimenter_statistics()?;
    let window_stats = if args.windows_stats {
        Some(dataset.window_statistics()?)
    } else {
        None
    };

    if args.json {
        let report = serde_json::json!({
            "subjects": dataset.num_subjects(),
            "repetitions": dataset.num_repetitions(),
            "time_points": dataset.time().len(),
            "windows": dataset.window_config(),
            "experimenters": stats,
            "window_statistics": window_stats,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("subjects:     {}", dataset.num_subjects());
    println!("repetitions:  {}", dataset.num_repetitions());
    println!("time points:  {}", dataset.time().len());
    println!(
        "experimenters: {}",
        dataset.experimenters().collect::<Vec<_>>().join(", ")
    );
    println!();
    println!("all samples");
    print_table(&stats);

    for (window, stats) in window_stats.iter().flatten() {
        println!();
        println!("{window}");
        print_table(stats);
    }
    Ok(())
}

fn plot_electrode(dataset: &StimulusDataset, args: &PlotElectrodeArgs) -> Result<()> {
    plot::plot_electrode(
        dataset,
        args.subject,
        args.repetition,
        &args.electrodes,
        &args.out,
    )
}

fn experimenter_bias(dataset: &StimulusDataset, args: &BiasArgs) -> Result<()> {
    let stats = match args.window {
        Some(window) => dataset.window(window.into()).experimenter_statistics()?,
        None => dataset.experimenter_statistics()?,
    };
    plot::plot_experimenter_bias(&stats, &args.out)?;
    if let Some(csv) = &args.csv {
        plot::write_bias_csv(&stats, csv)?;
    }
    Ok(())
}
