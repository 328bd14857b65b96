//! Broadcast experiment analysis CLI.
//!
//! Aggregates trial metrics by technique and induced delay, and
//! reconstructs message propagation graphs from node snapshot logs.

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, WrapErr};

use broadcast_analyzer::analysis::{
    aggregate, ingest, report,
    ordering::{BaselinePlacement, TechniqueOrder, DEFAULT_BASELINE},
    types::{AnalysisMetadata, GraphReport, MetricUnit, SummaryReport, TrialRecord},
    PropagationGraph,
};

#[derive(Parser)]
#[command(name = "broadcast-analyzer")]
#[command(about = "Log analysis for p2p broadcast experiments")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the experiment log (newline-delimited JSON)
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory for reports
    #[arg(short, long, default_value = "analysis_output")]
    output: PathBuf,

    /// Baseline technique label
    #[arg(long, default_value = DEFAULT_BASELINE)]
    baseline: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Number of parallel workers (0 = auto-detect)
    #[arg(short = 'j', long, default_value = "0")]
    threads: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare duplicate and receiving rates per technique
    Duplicates {
        /// Unit of the duplicate metric in this log
        #[arg(long, value_enum, default_value_t = UnitArg::Rate)]
        unit: UnitArg,

        /// Baseline position in the technique order
        #[arg(long, value_enum, default_value_t = PlacementArg::First)]
        baseline_position: PlacementArg,
    },

    /// Compare techniques within each induced delay
    DelaySweep {
        /// Unit of the duplicate metric in this log
        #[arg(long, value_enum, default_value_t = UnitArg::Count)]
        unit: UnitArg,

        /// Baseline position in the technique order
        #[arg(long, value_enum, default_value_t = PlacementArg::Last)]
        baseline_position: PlacementArg,
    },

    /// Reconstruct the propagation graph for one message
    Propagation {
        /// Message identifier to reconstruct
        #[arg(long, default_value = "1")]
        msg_id: String,
    },

    /// Show summary statistics for a trial metrics log
    Summary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum UnitArg {
    Count,
    Rate,
}

impl From<UnitArg> for MetricUnit {
    fn from(unit: UnitArg) -> Self {
        match unit {
            UnitArg::Count => MetricUnit::Count,
            UnitArg::Rate => MetricUnit::Rate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PlacementArg {
    First,
    Last,
}

impl From<PlacementArg> for BaselinePlacement {
    fn from(placement: PlacementArg) -> Self {
        match placement {
            PlacementArg::First => BaselinePlacement::First,
            PlacementArg::Last => BaselinePlacement::Last,
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    // Set thread pool size
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    match cli.command {
        Commands::Duplicates {
            unit,
            baseline_position,
        } => run_summary(&cli, unit.into(), baseline_position.into(), false),
        Commands::DelaySweep {
            unit,
            baseline_position,
        } => run_summary(&cli, unit.into(), baseline_position.into(), true),
        Commands::Propagation { ref msg_id } => run_propagation(&cli, msg_id),
        Commands::Summary => run_data_summary(&cli),
    }
}

fn load_trial_records(cli: &Cli) -> Result<Vec<TrialRecord>> {
    log::info!("Reading trial records from {}", cli.input.display());
    let records = ingest::read_trial_records(&cli.input)
        .wrap_err_with(|| format!("Failed to load trial records from {}", cli.input.display()))?;
    log::info!("Loaded {} trial records", records.len());
    Ok(records)
}

fn run_summary(
    cli: &Cli,
    unit: MetricUnit,
    placement: BaselinePlacement,
    by_delay: bool,
) -> Result<()> {
    let records = load_trial_records(cli)?;
    if records.is_empty() {
        log::warn!(
            "No usable trial records in {}; nothing to aggregate",
            cli.input.display()
        );
        return Ok(());
    }

    let order = TechniqueOrder::new(cli.baseline.clone(), placement);
    let mut aggregates = aggregate::aggregate_parallel(&records).finalize(&order);
    if !by_delay {
        aggregates.by_delay.clear();
    } else {
        log::info!("Found {} distinct delay values", aggregates.by_delay.len());
    }

    let report = SummaryReport {
        metadata: create_metadata(cli, records.len(), 0),
        duplicate_unit: unit,
        aggregates,
    };

    fs::create_dir_all(&cli.output)
        .with_context(|| format!("Failed to create output directory: {}", cli.output.display()))?;

    report::generate_json_report(&report, &cli.output.join("summary_report.json"))?;
    report::generate_summary_text(&report, &cli.output.join("summary_report.txt"))?;
    report::print_summary(&report);

    Ok(())
}

fn run_propagation(cli: &Cli, msg_id: &str) -> Result<()> {
    log::info!("Reading node records from {}", cli.input.display());
    let batch = ingest::read_node_records(&cli.input)
        .wrap_err_with(|| format!("Failed to load node records from {}", cli.input.display()))?;

    if batch.skipped_lines > 0 {
        log::warn!("Skipped {} malformed lines", batch.skipped_lines);
    }
    if batch.records.is_empty() {
        log::warn!("No usable node records in {}", cli.input.display());
        return Ok(());
    }
    log::info!("Loaded {} node records", batch.records.len());

    let graph = PropagationGraph::build(&batch.records, msg_id);
    let summary = graph.summary();
    log::info!(
        "Message {}: {} nodes, {} edges, {} deliveries",
        msg_id,
        summary.node_count,
        summary.edge_count,
        summary.delivery_count
    );

    if summary.node_count == 0 {
        log::warn!(
            "No deliveries recorded for message {} in {}",
            msg_id,
            cli.input.display()
        );
        return Ok(());
    }

    let report = GraphReport {
        metadata: create_metadata(cli, batch.records.len(), batch.skipped_lines),
        edges: graph.edges(),
        summary,
    };

    fs::create_dir_all(&cli.output)
        .with_context(|| format!("Failed to create output directory: {}", cli.output.display()))?;

    report::generate_json_report(&report, &cli.output.join("propagation_report.json"))?;
    report::generate_graph_text(&report, &cli.output.join("propagation_report.txt"))?;

    let dot_path = cli.output.join(format!("propagation_{}.dot", msg_id));
    fs::write(&dot_path, graph.to_dot())
        .with_context(|| format!("Failed to write DOT graph to {}", dot_path.display()))?;
    log::info!("DOT graph written to {}", dot_path.display());

    report::print_graph_summary(&report);

    Ok(())
}

fn run_data_summary(cli: &Cli) -> Result<()> {
    let records = load_trial_records(cli)?;
    if records.is_empty() {
        log::warn!("No usable trial records in {}", cli.input.display());
        return Ok(());
    }

    let techniques: BTreeSet<&str> = records.iter().map(|r| r.technique.as_str()).collect();
    let mut delays: Vec<f64> = records.iter().map(|r| r.delay).collect();
    delays.sort_by(f64::total_cmp);
    delays.dedup();

    println!("\n=== BROADCAST LOG SUMMARY ===\n");
    println!("Input file: {}", cli.input.display());
    println!("Trials: {}", records.len());
    println!();
    println!("Techniques: {}", techniques.len());
    for technique in &techniques {
        let count = records.iter().filter(|r| r.technique == *technique).count();
        println!("  {}: {} trials", technique, count);
    }
    println!();
    let delay_labels: Vec<String> = delays.iter().map(|d| d.to_string()).collect();
    println!("Delay values: {}", delay_labels.join(", "));

    let node_counts: Vec<u64> = records.iter().filter_map(|r| r.node_count).collect();
    if let (Some(min), Some(max)) = (node_counts.iter().min(), node_counts.iter().max()) {
        println!("Network sizes: {} to {} nodes", min, max);
    }
    let degrees: Vec<f64> = records.iter().filter_map(|r| r.avg_degree).collect();
    if !degrees.is_empty() {
        let mean = degrees.iter().sum::<f64>() / degrees.len() as f64;
        println!("Average degree: {:.1}", mean);
    }
    println!();

    Ok(())
}

fn create_metadata(cli: &Cli, total_records: usize, skipped_lines: usize) -> AnalysisMetadata {
    AnalysisMetadata {
        analysis_timestamp: chrono::Utc::now().to_rfc3339(),
        input_file: cli.input.display().to_string(),
        total_records,
        skipped_lines,
    }
}
