use serde::Serialize;
use std::sync::Mutex;

/// Process-wide analysis counters, safe to share across request workers.
pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub analyses_completed: usize,
    pub analyses_rejected: usize,
    pub records_ingested: usize,
    pub files_dropped: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_completed(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.analyses_completed += 1;
        }
    }

    pub fn record_rejected(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.analyses_rejected += 1;
        }
    }

    pub fn record_ingest(&self, records: usize, dropped_files: usize) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.records_ingested += records;
            metrics.files_dropped += dropped_files;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.inner
            .lock()
            .map(|metrics| *metrics)
            .unwrap_or_default()
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let metrics = MetricsRecorder::new();
        metrics.record_completed();
        metrics.record_rejected();
        metrics.record_ingest(40, 1);
        metrics.record_ingest(2, 0);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.analyses_completed, 1);
        assert_eq!(snapshot.analyses_rejected, 1);
        assert_eq!(snapshot.records_ingested, 42);
        assert_eq!(snapshot.files_dropped, 1);
    }

    #[test]
    fn snapshot_serializes_flat() {
        let json = serde_json::to_value(MetricsRecorder::new().snapshot()).unwrap();
        assert_eq!(json["analyses_completed"], 0);
        assert_eq!(json["files_dropped"], 0);
    }
}
