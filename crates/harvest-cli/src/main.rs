use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use harvest_lib::{
    batch::{process_folder, summarize_drops, LogObserver, SkipReason},
    config::{read_config, AnalysisConfig, Experiment},
    detectors::{
        cycles::{find_cycles, Cycle},
        drops::detect_series_drops,
    },
    io::{datalogger, summary as summary_io},
    metrics::{discharge::analyze_discharge, recharge::FileSummary},
    plot::{figure_first_charge, figure_from_series, figure_mean_recharge, PlotBackend},
    signal::{DropEvents, MeasurementSeries},
};
use log::{info, warn};
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

mod render;

use render::PngBackend;

#[derive(Parser)]
#[command(
    name = "harvest",
    version,
    about = "Charge/recharge cycle analysis of RF energy-harvesting voltage logs"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ExperimentArg {
    #[value(name = "unitary")]
    Unitary,
    #[value(name = "array")]
    Array,
}

impl From<ExperimentArg> for Experiment {
    fn from(arg: ExperimentArg) -> Self {
        match arg {
            ExperimentArg::Unitary => Experiment::Unitary,
            ExperimentArg::Array => Experiment::Array,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize every log of a folder into the per-power charge/recharge table
    SummarizeFolder {
        #[arg(long)]
        folder: PathBuf,
        #[arg(long, default_value = "unitary")]
        experiment: ExperimentArg,
        /// Free-form experiment label, replaces the preset one
        #[arg(long)]
        label: Option<String>,
        #[arg(long)]
        threshold: Option<f64>,
        #[arg(long)]
        header_lines: Option<usize>,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value = "save_data")]
        out_dir: PathBuf,
        #[arg(long)]
        no_plots: bool,
    },
    /// Print the drop indices of one log
    DetectDrops {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        threshold: Option<f64>,
        #[arg(long)]
        header_lines: Option<usize>,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print drops, cycles and summary of one log
    AnalyzeFile {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        threshold: Option<f64>,
        #[arg(long)]
        header_lines: Option<usize>,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Time the single discharge captured in a high-rate log
    Discharge {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        header_lines: Option<usize>,
    },
    /// Render voltage against time for one or more logs
    PlotRaw {
        #[arg(long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,
        #[arg(long)]
        out: PathBuf,
        #[arg(long)]
        header_lines: Option<usize>,
        #[arg(long, default_value_t = 20_000)]
        max_points: usize,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    match cli.command {
        Commands::SummarizeFolder {
            folder,
            experiment,
            label,
            threshold,
            header_lines,
            config,
            out_dir,
            no_plots,
        } => {
            let cfg = load_config(config.as_deref(), threshold, header_lines)?;
            let label = label.unwrap_or_else(|| Experiment::from(experiment).label().to_string());
            cmd_summarize_folder(&folder, &label, &cfg, &out_dir, !no_plots)?
        }
        Commands::DetectDrops {
            input,
            threshold,
            header_lines,
            config,
        } => {
            let cfg = load_config(config.as_deref(), threshold, header_lines)?;
            cmd_detect_drops(&input, &cfg)?
        }
        Commands::AnalyzeFile {
            input,
            threshold,
            header_lines,
            config,
        } => {
            let cfg = load_config(config.as_deref(), threshold, header_lines)?;
            cmd_analyze_file(&input, &cfg)?
        }
        Commands::Discharge {
            input,
            header_lines,
        } => {
            let cfg = load_config(None, None, header_lines)?;
            cmd_discharge(&input, &cfg)?
        }
        Commands::PlotRaw {
            input,
            out,
            header_lines,
            max_points,
        } => {
            let cfg = load_config(None, None, header_lines)?;
            cmd_plot_raw(&input, &out, &cfg, max_points)?
        }
    }
    Ok(())
}

fn load_config(
    path: Option<&Path>,
    threshold: Option<f64>,
    header_lines: Option<usize>,
) -> Result<AnalysisConfig> {
    let mut cfg = match path {
        Some(path) => read_config(path)?,
        None => AnalysisConfig::default(),
    };
    if let Some(threshold) = threshold {
        anyhow::ensure!(
            threshold.is_finite() && threshold >= 0.0,
            "--threshold must be a non-negative number"
        );
        cfg.drop_threshold_v = threshold;
    }
    if let Some(lines) = header_lines {
        cfg.header_lines = lines;
    }
    Ok(cfg)
}

fn read_log(path: &Path, cfg: &AnalysisConfig) -> Result<MeasurementSeries> {
    datalogger::read_measurement_log(path, cfg.header_lines)
        .with_context(|| format!("loading {}", path.display()))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn cmd_summarize_folder(
    folder: &Path,
    label: &str,
    cfg: &AnalysisConfig,
    out_dir: &Path,
    plots: bool,
) -> Result<()> {
    let summary = process_folder(folder, label, cfg, &mut LogObserver)
        .with_context(|| format!("scanning {}", folder.display()))?;
    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;

    let csv_path = out_dir.join(summary_io::summary_file_name(label));
    let file = fs::File::create(&csv_path)
        .with_context(|| format!("creating {}", csv_path.display()))?;
    summary_io::write_summary_csv(file, &summary)
        .with_context(|| format!("writing {}", csv_path.display()))?;
    info!("{} row(s) written to {}", summary.len(), csv_path.display());

    if plots {
        let figures = [
            (format!("FirstCharge_vs_Power_{}.png", label), figure_first_charge(&summary)),
            (format!("MeanRecharge_vs_Power_{}.png", label), figure_mean_recharge(&summary)),
        ];
        for (name, fig) in figures {
            if fig.bounds().is_none() {
                warn!("{}: nothing to plot", name);
                continue;
            }
            PngBackend::new(out_dir.join(&name)).draw(&fig)?;
        }
    }

    println!("{}", serde_json::to_string(&summary)?);
    Ok(())
}

fn cmd_detect_drops(input: &Path, cfg: &AnalysisConfig) -> Result<()> {
    let series = read_log(input, cfg)?;
    let drops = detect_series_drops(&series, cfg.drop_threshold_v);
    println!("{}", serde_json::to_string(&drops)?);
    Ok(())
}

#[derive(Serialize)]
struct FileReport {
    source: String,
    sample_interval_s: f64,
    sample_count: usize,
    drops: DropEvents,
    cycles: Vec<Cycle>,
    summary: Option<FileSummary>,
    skipped: Option<SkipReason>,
}

fn cmd_analyze_file(input: &Path, cfg: &AnalysisConfig) -> Result<()> {
    let series = read_log(input, cfg)?;
    let source = file_name(input);
    let drops = detect_series_drops(&series, cfg.drop_threshold_v);
    let cycles = find_cycles(&series, &drops);
    let (summary, skipped) = match summarize_drops(&source, &series, &drops) {
        Ok(summary) => (Some(summary), None),
        Err(reason) => (None, Some(reason)),
    };
    let report = FileReport {
        source,
        sample_interval_s: series.sample_interval_s,
        sample_count: series.len(),
        drops,
        cycles,
        summary,
        skipped,
    };
    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}

fn cmd_discharge(input: &Path, cfg: &AnalysisConfig) -> Result<()> {
    let series = read_log(input, cfg)?;
    let analysis = analyze_discharge(&series)
        .with_context(|| format!("{} is too short for a discharge", input.display()))?;
    println!("{}", serde_json::to_string(&analysis)?);
    Ok(())
}

fn cmd_plot_raw(inputs: &[PathBuf], out: &Path, cfg: &AnalysisConfig, max_points: usize) -> Result<()> {
    let mut logs = Vec::with_capacity(inputs.len());
    for path in inputs {
        logs.push((file_name(path), read_log(path, cfg)?));
    }
    let fig = figure_from_series("Combined: Time vs Voltage for All Files", &logs, max_points);
    PngBackend::new(out.to_path_buf()).draw(&fig)?;
    info!("{} log(s) plotted to {}", logs.len(), out.display());
    Ok(())
}
