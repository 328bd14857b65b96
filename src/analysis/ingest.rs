//! Newline-delimited JSON ingestion for experiment logs.
//!
//! Trial metric logs parse strictly: a malformed line fails the whole run.
//! Node snapshot logs parse leniently: a malformed line is dropped and
//! counted, and the run continues with whatever was usable.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde_json::Value;

use super::types::{NodeReceiveRecord, NodeRecordBatch, TrialRecord};

/// Errors raised while reading an experiment log.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to open {path}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {path}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}: malformed trial record")]
    Malformed {
        path: String,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

fn open_reader(path: &Path) -> Result<BufReader<File>, IngestError> {
    let file = File::open(path).map_err(|source| IngestError::Open {
        path: path.display().to_string(),
        source,
    })?;
    Ok(BufReader::with_capacity(64 * 1024, file))
}

/// Read trial metric records, strictly.
///
/// Blank lines are skipped; any other line that is not a valid record aborts
/// the run with the offending 1-based line number. No partial results.
pub fn read_trial_records(path: &Path) -> Result<Vec<TrialRecord>, IngestError> {
    let reader = open_reader(path)?;

    let mut records = Vec::new();
    for (idx, line_result) in reader.lines().enumerate() {
        let line = line_result.map_err(|source| IngestError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let record: TrialRecord =
            serde_json::from_str(trimmed).map_err(|source| IngestError::Malformed {
                path: path.display().to_string(),
                line: idx + 1,
                source,
            })?;
        records.push(record);
    }

    Ok(records)
}

/// Read node snapshot records, leniently.
///
/// A non-blank line that is not a JSON object with a usable `id` is dropped
/// and counted, never retried. Missing `receive_map` is fine; such a record
/// simply contributes no deliveries.
pub fn read_node_records(path: &Path) -> Result<NodeRecordBatch, IngestError> {
    let reader = open_reader(path)?;

    let mut batch = NodeRecordBatch::default();
    for (idx, line_result) in reader.lines().enumerate() {
        let line = line_result.map_err(|source| IngestError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match parse_node_record(trimmed) {
            Some(record) => batch.records.push(record),
            None => {
                batch.skipped_lines += 1;
                log::debug!(
                    "{}:{}: skipping malformed node record",
                    path.display(),
                    idx + 1
                );
            }
        }
    }

    Ok(batch)
}

/// The simulator writes node ids as integers; other captures use strings.
/// Both normalize to the decimal/string form.
fn node_id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_node_record(line: &str) -> Option<NodeReceiveRecord> {
    let value: Value = serde_json::from_str(line).ok()?;
    let node_id = node_id_string(value.get("id")?)?;

    let mut record = NodeReceiveRecord {
        node_id,
        ..Default::default()
    };

    // Snapshot lines also carry delay, connections and relay_map; only the
    // receive map matters for graph reconstruction.
    if let Some(map) = value.get("receive_map").and_then(Value::as_object) {
        for (message_id, senders) in map {
            let Some(senders) = senders.as_array() else {
                continue;
            };
            let senders: Vec<String> = senders.iter().filter_map(node_id_string).collect();
            record.receive_map.insert(message_id.clone(), senders);
        }
    }

    Some(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn fixture(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_trial_records_skip_blank_lines() {
        let file = fixture(&[
            r#"{"broadcast":"BasicPublish","delay":50,"duplicate_rate":3,"receiving_rate":0.98}"#,
            "",
            "   ",
            r#"{"broadcast":"WavePublish-5","delay":100,"duplicate_rate":1.5,"receiving_rate":1.0,"node_count":1000,"avg_degree":40.2}"#,
        ]);

        let records = read_trial_records(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].technique, "BasicPublish");
        assert_eq!(records[0].delay, 50.0);
        assert_eq!(records[1].node_count, Some(1000));
        assert_eq!(records[1].avg_degree, Some(40.2));
    }

    #[test]
    fn test_trial_records_fail_on_malformed_line() {
        let file = fixture(&[
            r#"{"broadcast":"BasicPublish","delay":50,"duplicate_rate":3,"receiving_rate":0.98}"#,
            "not json at all",
        ]);

        let err = read_trial_records(file.path()).unwrap_err();
        assert!(matches!(err, IngestError::Malformed { line: 2, .. }));
    }

    #[test]
    fn test_trial_records_fail_on_missing_field() {
        let file = fixture(&[r#"{"broadcast":"BasicPublish","delay":50}"#]);

        let err = read_trial_records(file.path()).unwrap_err();
        assert!(matches!(err, IngestError::Malformed { line: 1, .. }));
    }

    #[test]
    fn test_missing_input_file() {
        let err = read_trial_records(Path::new("/nonexistent/metrics.jsonl")).unwrap_err();
        assert!(matches!(err, IngestError::Open { .. }));
    }

    #[test]
    fn test_node_records_drop_malformed_lines() {
        let file = fixture(&[
            r#"{"id":0,"receive_map":{"1":[3,7]}}"#,
            "garbage",
            r#"{"no_id_here":true}"#,
            r#"{"id":1}"#,
        ]);

        let batch = read_node_records(file.path()).unwrap();
        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.skipped_lines, 2);
        assert!(batch.records[1].receive_map.is_empty());
    }

    #[test]
    fn test_node_ids_normalize_to_strings() {
        let file = fixture(&[
            r#"{"id":42,"delay":7,"connections":{"5":2},"receive_map":{"1":[3,"peer-9"]}}"#,
        ]);

        let batch = read_node_records(file.path()).unwrap();
        let record = &batch.records[0];
        assert_eq!(record.node_id, "42");
        assert_eq!(record.receive_map["1"], vec!["3", "peer-9"]);
    }

    #[test]
    fn test_empty_file_is_not_an_error() {
        let file = fixture(&[]);
        assert!(read_trial_records(file.path()).unwrap().is_empty());
        let batch = read_node_records(file.path()).unwrap();
        assert!(batch.records.is_empty());
        assert_eq!(batch.skipped_lines, 0);
    }
}
