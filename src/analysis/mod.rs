//! Aggregation and graph reconstruction for broadcast experiment logs.
//!
//! This module groups per-trial metrics by technique and by
//! (delay, technique), and rebuilds directed propagation graphs from
//! per-node receive maps.

pub mod types;
pub mod ingest;
pub mod ordering;
pub mod aggregate;
pub mod graph;
pub mod report;

pub use types::*;
pub use ingest::{read_node_records, read_trial_records, IngestError};
pub use ordering::{BaselinePlacement, TechniqueOrder};
pub use aggregate::{aggregate, aggregate_parallel};
pub use graph::PropagationGraph;
pub use report::{generate_json_report, print_graph_summary, print_summary};
