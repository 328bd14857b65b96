//! # broadcast-analyzer - Log analysis for p2p broadcast experiments
//!
//! This library analyzes the newline-delimited JSON logs written by a p2p
//! broadcast tester that compares dissemination techniques (a flooding
//! baseline against a parametrized wave family) across induced network
//! delays.
//!
//! ## Overview
//!
//! Two log kinds are supported:
//!
//! - **Trial metrics**: one line per experiment run with the technique
//!   label, induced delay, duplicate metric and receiving rate. These are
//!   grouped into per-technique and per-(delay, technique) means.
//! - **Node snapshots**: one line per node listing, for each message
//!   identifier, the senders the node heard that message from. These are
//!   folded into a directed propagation graph whose edge weights keep the
//!   duplicate-delivery multiplicity.
//!
//! ## Architecture
//!
//! Everything lives under the `analysis` module:
//!
//! - `analysis::types`: record and report data structures
//! - `analysis::ingest`: strict and lenient NDJSON readers
//! - `analysis::ordering`: baseline-aware technique display order
//! - `analysis::aggregate`: (sum, count) bucket accumulation and means
//! - `analysis::graph`: propagation graph reconstruction
//! - `analysis::report`: JSON/text reports and stdout summaries
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use broadcast_analyzer::analysis::{aggregate, ingest};
//! use broadcast_analyzer::analysis::ordering::{BaselinePlacement, TechniqueOrder};
//!
//! let records = ingest::read_trial_records(Path::new("results/network_metric.jsonl"))?;
//! let order = TechniqueOrder::new("BasicPublish", BaselinePlacement::First);
//! let aggregates = aggregate::aggregate(&records).finalize(&order);
//!
//! for stats in &aggregates.by_technique {
//!     println!("{}: {:.2}", stats.technique, stats.mean_duplicate_metric);
//! }
//! # Ok::<(), broadcast_analyzer::analysis::IngestError>(())
//! ```
//!
//! ## Error Handling
//!
//! Ingestion returns a typed [`analysis::IngestError`]; everything above it
//! uses `color_eyre` results with context, so CLI failures carry the full
//! cause chain.

pub mod analysis;
