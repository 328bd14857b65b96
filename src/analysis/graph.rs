//! Propagation graph reconstruction from node snapshot records.
//!
//! Each snapshot lists, per message, the senders a node heard that message
//! from. Folding those lists over all nodes gives a directed delivery graph
//! for one message identifier. Edge weights keep the observed multiplicity;
//! a destination whose incoming weights sum past one received duplicates,
//! which is exactly the signal the duplicate-rate analysis is built on.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use super::types::{EdgeRecord, GraphSummary, NodeReceiveRecord};

/// Directed delivery graph for one message identifier.
#[derive(Debug, Clone)]
pub struct PropagationGraph {
    message_id: String,
    graph: DiGraph<String, u32>,
    indices: HashMap<String, NodeIndex>,
    self_loops_skipped: usize,
}

impl PropagationGraph {
    /// Build the graph for `message_id` from node snapshots.
    ///
    /// A record without an entry for the message contributes nothing, which
    /// is not an error. Repeated records for the same node are additive. A
    /// sender equal to the destination is malformed input; that delivery is
    /// dropped and counted, the rest of the record still applies.
    pub fn build(records: &[NodeReceiveRecord], message_id: &str) -> Self {
        let mut built = Self {
            message_id: message_id.to_string(),
            graph: DiGraph::new(),
            indices: HashMap::new(),
            self_loops_skipped: 0,
        };

        for record in records {
            let Some(senders) = record.receive_map.get(message_id) else {
                continue;
            };
            for sender in senders {
                if sender == &record.node_id {
                    built.self_loops_skipped += 1;
                    log::debug!("dropping self-loop delivery at node {}", record.node_id);
                    continue;
                }
                built.add_delivery(sender, &record.node_id);
            }
        }

        built
    }

    fn node(&mut self, id: &str) -> NodeIndex {
        if let Some(&idx) = self.indices.get(id) {
            return idx;
        }
        let idx = self.graph.add_node(id.to_string());
        self.indices.insert(id.to_string(), idx);
        idx
    }

    fn add_delivery(&mut self, from: &str, to: &str) {
        let from = self.node(from);
        let to = self.node(to);
        match self.graph.find_edge(from, to) {
            Some(edge) => self.graph[edge] += 1,
            None => {
                self.graph.add_edge(from, to, 1);
            }
        }
    }

    pub fn message_id(&self) -> &str {
        &self.message_id
    }

    /// Distinct nodes that sent or received the message
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Distinct sender -> receiver pairs
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Total observed deliveries, duplicates included
    pub fn delivery_count(&self) -> u64 {
        self.graph.edge_weights().map(|&w| u64::from(w)).sum()
    }

    /// Edges with multiplicity, sorted by (from, to) for stable reporting.
    pub fn edges(&self) -> Vec<EdgeRecord> {
        let mut edges: Vec<EdgeRecord> = self
            .graph
            .edge_references()
            .map(|edge| EdgeRecord {
                from: self.graph[edge.source()].clone(),
                to: self.graph[edge.target()].clone(),
                deliveries: *edge.weight(),
            })
            .collect();
        edges.sort_by(|a, b| a.from.cmp(&b.from).then_with(|| a.to.cmp(&b.to)));
        edges
    }

    /// Derived counts, reported to the caller before any rendering.
    pub fn summary(&self) -> GraphSummary {
        let mut duplicate_deliveries = 0u64;
        let mut nodes_with_duplicates = 0usize;

        for node in self.graph.node_indices() {
            let incoming: u64 = self
                .graph
                .edges_directed(node, Direction::Incoming)
                .map(|edge| u64::from(*edge.weight()))
                .sum();
            if incoming > 1 {
                duplicate_deliveries += incoming - 1;
                nodes_with_duplicates += 1;
            }
        }

        GraphSummary {
            message_id: self.message_id.clone(),
            node_count: self.node_count(),
            edge_count: self.edge_count(),
            delivery_count: self.delivery_count(),
            duplicate_deliveries,
            nodes_with_duplicates,
            self_loops_skipped: self.self_loops_skipped,
        }
    }

    /// GraphViz DOT export for external rendering. Edges observed more than
    /// once carry their multiplicity and are highlighted.
    pub fn to_dot(&self) -> String {
        let mut dot = String::new();
        dot.push_str("digraph propagation {\n");
        dot.push_str("    rankdir=LR;\n");
        dot.push_str("    node [shape=circle, fontsize=10];\n");
        dot.push_str(&format!(
            "    label=\"Propagation of message {}\";\n",
            self.message_id
        ));
        dot.push_str("    labelloc=t;\n\n");

        for edge in self.edges() {
            if edge.deliveries > 1 {
                dot.push_str(&format!(
                    "    \"{}\" -> \"{}\" [label=\"x{}\", color=red];\n",
                    edge.from, edge.to, edge.deliveries
                ));
            } else {
                dot.push_str(&format!("    \"{}\" -> \"{}\";\n", edge.from, edge.to));
            }
        }

        dot.push_str("}\n");
        dot
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(node_id: &str, entries: &[(&str, &[&str])]) -> NodeReceiveRecord {
        let mut receive_map = HashMap::new();
        for (message_id, senders) in entries {
            receive_map.insert(
                message_id.to_string(),
                senders.iter().map(|s| s.to_string()).collect(),
            );
        }
        NodeReceiveRecord {
            node_id: node_id.to_string(),
            receive_map,
        }
    }

    #[test]
    fn test_reconstruction_example() {
        let records = vec![
            record("A", &[("1", &["B", "C"])]),
            record("B", &[("1", &["C"])]),
        ];

        let graph = PropagationGraph::build(&records, "1");
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 3);

        let edges = graph.edges();
        let pairs: Vec<(&str, &str)> = edges
            .iter()
            .map(|e| (e.from.as_str(), e.to.as_str()))
            .collect();
        assert_eq!(pairs, vec![("B", "A"), ("C", "A"), ("C", "B")]);
    }

    #[test]
    fn test_two_senders_mean_two_edges_into_destination() {
        let records = vec![record("A", &[("1", &["B", "C"])])];

        let graph = PropagationGraph::build(&records, "1");
        assert_eq!(graph.edge_count(), 2);

        let summary = graph.summary();
        assert_eq!(summary.duplicate_deliveries, 1);
        assert_eq!(summary.nodes_with_duplicates, 1);
    }

    #[test]
    fn test_absent_message_contributes_nothing() {
        let records = vec![
            record("A", &[("2", &["B"])]),
            record("B", &[]),
        ];

        let graph = PropagationGraph::build(&records, "1");
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.delivery_count(), 0);
    }

    #[test]
    fn test_repeated_pair_increments_multiplicity() {
        let records = vec![
            record("A", &[("1", &["B"])]),
            record("A", &[("1", &["B"])]),
        ];

        let graph = PropagationGraph::build(&records, "1");
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.delivery_count(), 2);
        assert_eq!(graph.edges()[0].deliveries, 2);
        assert_eq!(graph.summary().duplicate_deliveries, 1);
    }

    #[test]
    fn test_repeated_node_records_are_additive() {
        let records = vec![
            record("A", &[("1", &["B"])]),
            record("A", &[("1", &["C"])]),
        ];

        let graph = PropagationGraph::build(&records, "1");
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.summary().nodes_with_duplicates, 1);
    }

    #[test]
    fn test_self_loop_is_dropped() {
        let records = vec![record("A", &[("1", &["A", "B"])])];

        let graph = PropagationGraph::build(&records, "1");
        assert_eq!(graph.edge_count(), 1);
        let summary = graph.summary();
        assert_eq!(summary.self_loops_skipped, 1);
        assert_eq!(summary.delivery_count, 1);
    }

    #[test]
    fn test_duplicate_counts_across_nodes() {
        // A hears from B, C and D; B hears from C. Four deliveries total,
        // two of them redundant at A.
        let records = vec![
            record("A", &[("1", &["B", "C", "D"])]),
            record("B", &[("1", &["C"])]),
        ];

        let summary = PropagationGraph::build(&records, "1").summary();
        assert_eq!(summary.node_count, 4);
        assert_eq!(summary.edge_count, 4);
        assert_eq!(summary.delivery_count, 4);
        assert_eq!(summary.duplicate_deliveries, 2);
        assert_eq!(summary.nodes_with_duplicates, 1);
    }

    #[test]
    fn test_dot_export() {
        let records = vec![
            record("A", &[("1", &["B", "B"])]),
            record("B", &[("1", &["C"])]),
        ];

        let graph = PropagationGraph::build(&records, "1");
        let dot = graph.to_dot();
        assert!(dot.starts_with("digraph propagation {"));
        assert!(dot.contains("\"B\" -> \"A\" [label=\"x2\", color=red];"));
        assert!(dot.contains("\"C\" -> \"B\";"));
        assert!(dot.ends_with("}\n"));
    }
}
