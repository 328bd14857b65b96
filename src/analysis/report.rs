//! Report generation for broadcast experiment analysis.
//!
//! Generates JSON and human-readable text reports plus a short stdout
//! summary for each analysis mode.

use std::fs;
use std::path::Path;

use color_eyre::eyre::{Context, Result};
use serde::Serialize;

use super::types::{GraphReport, MetricUnit, SummaryReport, TechniqueStats};

/// Generate JSON report
pub fn generate_json_report<T: Serialize>(report: &T, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)
        .context("Failed to serialize report to JSON")?;

    fs::write(output_path, json)
        .with_context(|| format!("Failed to write JSON report to {}", output_path.display()))?;

    log::info!("JSON report written to {}", output_path.display());
    Ok(())
}

fn format_duplicate(mean: f64, unit: MetricUnit) -> String {
    match unit {
        MetricUnit::Rate => format!("{:.4}%", mean),
        MetricUnit::Count => format!("{:.2}", mean),
    }
}

fn stats_line(stats: &TechniqueStats, unit: MetricUnit) -> String {
    format!(
        "  {:<18} duplicates: {:>10}   receiving: {:>8.4}%   ({} trials)",
        stats.technique,
        format_duplicate(stats.mean_duplicate_metric, unit),
        stats.mean_receiving_rate * 100.0,
        stats.samples
    )
}

/// Generate human-readable text report for aggregated trial metrics
pub fn generate_summary_text(report: &SummaryReport, output_path: &Path) -> Result<()> {
    let unit = report.duplicate_unit;
    let mut lines: Vec<String> = Vec::new();

    lines.push("=".repeat(80));
    lines.push("                     BROADCAST TECHNIQUE COMPARISON".to_string());
    lines.push("=".repeat(80));
    lines.push(String::new());

    lines.push(format!("Analysis Date: {}", report.metadata.analysis_timestamp));
    lines.push(format!("Input File: {}", report.metadata.input_file));
    lines.push(format!("Trials Analyzed: {}", report.metadata.total_records));
    lines.push(format!("Duplicate Metric Unit: {}", unit));
    lines.push(String::new());

    lines.push("Per-Technique Averages:".to_string());
    for stats in &report.aggregates.by_technique {
        lines.push(stats_line(stats, unit));
    }
    lines.push(String::new());

    if !report.aggregates.by_delay.is_empty() {
        lines.push("=".repeat(80));
        lines.push("                        BREAKDOWN BY INDUCED DELAY".to_string());
        lines.push("=".repeat(80));
        lines.push(String::new());

        for slice in &report.aggregates.by_delay {
            lines.push(format!("Delay {}ms:", slice.delay));
            for stats in &slice.techniques {
                lines.push(stats_line(stats, unit));
            }
            lines.push(String::new());
        }
    }

    lines.push("=".repeat(80));

    let content = lines.join("\n");
    fs::write(output_path, content)
        .with_context(|| format!("Failed to write text report to {}", output_path.display()))?;

    log::info!("Text report written to {}", output_path.display());
    Ok(())
}

/// Generate human-readable text report for a propagation graph
pub fn generate_graph_text(report: &GraphReport, output_path: &Path) -> Result<()> {
    let summary = &report.summary;
    let mut lines: Vec<String> = Vec::new();

    lines.push("=".repeat(80));
    lines.push("                          MESSAGE PROPAGATION".to_string());
    lines.push("=".repeat(80));
    lines.push(String::new());

    lines.push(format!("Analysis Date: {}", report.metadata.analysis_timestamp));
    lines.push(format!("Input File: {}", report.metadata.input_file));
    lines.push(format!("Node Records: {}", report.metadata.total_records));
    if report.metadata.skipped_lines > 0 {
        lines.push(format!("Skipped Lines: {}", report.metadata.skipped_lines));
    }
    lines.push(String::new());

    lines.push(format!("Message ID: {}", summary.message_id));
    lines.push(format!("  Nodes: {}", summary.node_count));
    lines.push(format!("  Edges: {}", summary.edge_count));
    lines.push(format!("  Deliveries: {}", summary.delivery_count));
    lines.push(format!(
        "  Duplicate deliveries: {} across {} nodes",
        summary.duplicate_deliveries, summary.nodes_with_duplicates
    ));
    if summary.self_loops_skipped > 0 {
        lines.push(format!(
            "  Self-loop deliveries dropped: {}",
            summary.self_loops_skipped
        ));
    }
    lines.push(String::new());

    let duplicated: Vec<_> = report.edges.iter().filter(|e| e.deliveries > 1).collect();
    if !duplicated.is_empty() {
        lines.push("Most Redundant Paths:".to_string());
        let mut duplicated = duplicated;
        duplicated.sort_by(|a, b| b.deliveries.cmp(&a.deliveries));
        for edge in duplicated.iter().take(10) {
            lines.push(format!(
                "  {} -> {} observed {} times",
                edge.from, edge.to, edge.deliveries
            ));
        }
        lines.push(String::new());
    }

    lines.push("=".repeat(80));

    let content = lines.join("\n");
    fs::write(output_path, content)
        .with_context(|| format!("Failed to write text report to {}", output_path.display()))?;

    log::info!("Text report written to {}", output_path.display());
    Ok(())
}

/// Print an aggregated-metrics summary to stdout
pub fn print_summary(report: &SummaryReport) {
    println!("\n=== BROADCAST TECHNIQUE COMPARISON ===\n");
    println!("Trials: {}", report.metadata.total_records);
    println!("Duplicate metric unit: {}", report.duplicate_unit);
    println!();

    for stats in &report.aggregates.by_technique {
        println!("{}", stats_line(stats, report.duplicate_unit).trim_start());
    }

    if !report.aggregates.by_delay.is_empty() {
        let delays: Vec<String> = report
            .aggregates
            .by_delay
            .iter()
            .map(|s| s.delay.to_string())
            .collect();
        println!();
        println!(
            "Delay values: {} ({}ms)",
            report.aggregates.by_delay.len(),
            delays.join("ms, ")
        );
    }

    println!();
}

/// Print a propagation-graph summary to stdout
pub fn print_graph_summary(report: &GraphReport) {
    let summary = &report.summary;

    println!("\n=== MESSAGE PROPAGATION SUMMARY ===\n");
    println!("Message ID: {}", summary.message_id);
    println!("Total nodes: {}, edges: {}", summary.node_count, summary.edge_count);
    println!(
        "Deliveries: {} ({} duplicates across {} nodes)",
        summary.delivery_count, summary.duplicate_deliveries, summary.nodes_with_duplicates
    );
    println!();
}
