//! Core data types for broadcast experiment analysis.

use std::collections::HashMap;
use serde::{Deserialize, Serialize};

/// Induced network delay for a trial, in the units the simulator recorded
/// (milliseconds in practice).
pub type DelayMs = f64;

/// One trial observation from the experiment log.
///
/// The simulator writes one line per run. The `duplicate_rate` field holds a
/// reception count in some logs and a percent-like rate in others, so every
/// consumer carries a [`MetricUnit`] tag instead of guessing from the values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialRecord {
    /// Broadcast technique label, e.g. "BasicPublish" or "WavePublish-20"
    #[serde(rename = "broadcast")]
    pub technique: String,
    /// Induced node processing delay for this trial
    pub delay: DelayMs,
    /// Duplicate deliveries observed, as a count or a rate per [`MetricUnit`]
    #[serde(rename = "duplicate_rate")]
    pub duplicate_metric: f64,
    /// Fraction of nodes (0.0 to 1.0) that received the message at least once
    pub receiving_rate: f64,
    /// Network size for this trial, when the simulator recorded it
    #[serde(default)]
    pub node_count: Option<u64>,
    /// Average node degree for this trial, when recorded
    #[serde(default)]
    pub avg_degree: Option<f64>,
}

/// Unit of the duplicate metric for one aggregation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricUnit {
    /// Absolute number of duplicate receptions per trial
    Count,
    /// Percent-like duplicate reception rate
    Rate,
}

impl std::fmt::Display for MetricUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricUnit::Count => write!(f, "count"),
            MetricUnit::Rate => write!(f, "rate"),
        }
    }
}

/// One node snapshot from the propagation log: for each message identifier,
/// the senders this node observed a delivery from. Two or more senders under
/// the same message identifier mean the node received duplicates.
#[derive(Debug, Clone, Default)]
pub struct NodeReceiveRecord {
    pub node_id: String,
    pub receive_map: HashMap<String, Vec<String>>,
}

/// Node snapshots plus the number of lines dropped by lenient parsing.
#[derive(Debug, Default)]
pub struct NodeRecordBatch {
    pub records: Vec<NodeReceiveRecord>,
    pub skipped_lines: usize,
}

/// Mean metrics over every trial mapped into one technique bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechniqueStats {
    pub technique: String,
    pub mean_duplicate_metric: f64,
    pub mean_receiving_rate: f64,
    /// Number of trials that populated this bucket
    pub samples: usize,
}

/// Aggregates for one delay value. Only techniques observed under that delay
/// appear; a missing combination is "no data point", never zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelaySlice {
    pub delay: DelayMs,
    pub techniques: Vec<TechniqueStats>,
}

/// Both aggregate views, already in display order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryAggregates {
    /// Per-technique means across all delays
    pub by_technique: Vec<TechniqueStats>,
    /// Per-technique means within each delay, ascending by delay
    pub by_delay: Vec<DelaySlice>,
}

impl SummaryAggregates {
    pub fn is_empty(&self) -> bool {
        self.by_technique.is_empty() && self.by_delay.is_empty()
    }
}

/// Derived counts for a reconstructed propagation graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphSummary {
    pub message_id: String,
    /// Distinct nodes that sent or received the message
    pub node_count: usize,
    /// Distinct sender -> receiver pairs
    pub edge_count: usize,
    /// Total observed deliveries, duplicates included
    pub delivery_count: u64,
    /// Deliveries beyond the first per destination node
    pub duplicate_deliveries: u64,
    /// Destinations that heard the message from more than one sender
    pub nodes_with_duplicates: usize,
    /// Self-loop deliveries dropped as malformed input
    pub self_loops_skipped: usize,
}

/// A directed delivery relation with its observed multiplicity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub from: String,
    pub to: String,
    pub deliveries: u32,
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    pub analysis_timestamp: String,
    pub input_file: String,
    pub total_records: usize,
    pub skipped_lines: usize,
}

/// Aggregated trial metrics ready for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryReport {
    pub metadata: AnalysisMetadata,
    pub duplicate_unit: MetricUnit,
    pub aggregates: SummaryAggregates,
}

/// Reconstructed propagation graph ready for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphReport {
    pub metadata: AnalysisMetadata,
    pub summary: GraphSummary,
    pub edges: Vec<EdgeRecord>,
}
