//! JSON Lines logging backend.

use super::MetricLogger;
use crate::Result;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Logger that appends one JSON object per call to a file.
///
/// Each record carries the `step` it was logged at plus the metric values.
pub struct JsonLinesLogger {
    writer: Mutex<BufWriter<File>>,
}

impl JsonLinesLogger {
    /// Create (or truncate) the output file
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path.as_ref())?;
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    /// Lock the writer, recovering it if a previous holder panicked
    fn writer(&self) -> MutexGuard<'_, BufWriter<File>> {
        self.writer.lock().unwrap_or_else(|poisoned| {
            tracing::warn!("Metrics writer lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write_record(&self, record: Value) {
        let mut writer = self.writer();
        if let Err(e) = serde_json::to_writer(&mut *writer, &record)
            .map_err(std::io::Error::from)
            .and_then(|_| writer.write_all(b"\n"))
        {
            tracing::warn!(error = %e, "Failed to write metrics record");
        }
    }
}

impl MetricLogger for JsonLinesLogger {
    fn log_scalar(&self, name: &str, value: f64, step: u64) {
        self.write_record(json!({ "step": step, name: value }));
    }

    fn log_metrics(&self, metrics: &BTreeMap<String, f64>, step: u64) {
        let mut record = serde_json::Map::new();
        record.insert("step".to_string(), json!(step));
        for (name, value) in metrics {
            record.insert(name.clone(), json!(value));
        }
        self.write_record(Value::Object(record));
    }

    fn close(&self) {
        if let Err(e) = self.writer().flush() {
            tracing::warn!(error = %e, "Failed to flush metrics file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_jsonl_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("metrics.jsonl");
        let logger = JsonLinesLogger::create(&path).unwrap();

        let mut metrics = BTreeMap::new();
        metrics.insert("episode_return".to_string(), 9.5);
        metrics.insert("solved".to_string(), 1.0);
        logger.log_metrics(&metrics, 0);
        logger.log_scalar("distance", 3.0, 1);
        logger.close();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["step"], 0);
        assert_eq!(lines[0]["episode_return"], 9.5);
        assert_eq!(lines[0]["solved"], 1.0);
        assert_eq!(lines[1]["distance"], 3.0);
    }

    #[test]
    fn test_jsonl_survives_poisoned_lock() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("metrics.jsonl");
        let logger = std::sync::Arc::new(JsonLinesLogger::create(&path).unwrap());

        let holder = std::sync::Arc::clone(&logger);
        let _ = std::thread::spawn(move || {
            let _guard = holder.writer.lock().unwrap();
            panic!("writer holder panicked");
        })
        .join();
        assert!(logger.writer.is_poisoned());

        logger.log_scalar("episode_return", 2.5, 7);
        logger.close();

        let content = std::fs::read_to_string(&path).unwrap();
        let record: Value = serde_json::from_str(content.trim()).unwrap();
        assert_eq!(record["step"], 7);
        assert_eq!(record["episode_return"], 2.5);
    }
}
