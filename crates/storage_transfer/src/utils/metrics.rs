//! Prometheus metrics collection

use prometheus::{
    register_counter, register_counter_vec, register_histogram, Counter, CounterVec, Histogram,
};
use std::sync::OnceLock;

use crate::models::types::TransferOutcome;

static METRICS: OnceLock<Metrics> = OnceLock::new();

pub struct Metrics {
    pub transfers_total: CounterVec,
    pub bytes_uploaded: Counter,
    pub sweep_duration: Histogram,
    pub errors_total: CounterVec,
}

impl Metrics {
    pub fn init() -> &'static Self {
        METRICS.get_or_init(|| Metrics {
            transfers_total: register_counter_vec!(
                "transfer_items_total",
                "Total number of items processed, by outcome",
                &["outcome"]
            )
            .unwrap(),
            bytes_uploaded: register_counter!(
                "transfer_bytes_uploaded_total",
                "Total bytes uploaded to the destination bucket"
            )
            .unwrap(),
            sweep_duration: register_histogram!(
                "transfer_sweep_duration_seconds",
                "Duration of scheduled-container sweeps in seconds",
                vec![0.1, 0.5, 1.0, 5.0, 10.0, 30.0, 60.0, 300.0]
            )
            .unwrap(),
            errors_total: register_counter_vec!(
                "transfer_errors_total",
                "Total number of errors, by kind",
                &["kind"]
            )
            .unwrap(),
        })
    }

    pub fn record_outcome(&self, outcome: &TransferOutcome) {
        self.transfers_total
            .with_label_values(&[outcome.label()])
            .inc();
        if let TransferOutcome::PartialFailure { stage, .. } = outcome {
            self.errors_total.with_label_values(&[stage.as_str()]).inc();
        }
    }

    pub fn record_error(&self, error_kind: &str) {
        self.errors_total.with_label_values(&[error_kind]).inc();
    }
}
