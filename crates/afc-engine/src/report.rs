use std::collections::BTreeMap;
use std::time::Duration;

use afc_core::errors::{AfcError, ErrorInfo};
use serde::Serialize;

/// Summary returned to callers after one event's dispatch completes.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Ensemble multiplicity the dispatcher saw.
    pub multiplicity: u32,
    /// True when the minimum-multiplicity gate stopped the event.
    pub gated: bool,
    /// Wall time spent in each method that ran, for diagnostics only.
    pub timings: BTreeMap<String, Duration>,
    /// Failures recorded by individual methods; a failing method never
    /// blocks its siblings.
    pub failures: Vec<ErrorInfo>,
}

impl RunReport {
    pub(crate) fn gated(multiplicity: u32) -> Self {
        Self {
            multiplicity,
            gated: true,
            timings: BTreeMap::new(),
            failures: Vec::new(),
        }
    }

    pub(crate) fn passed(multiplicity: u32) -> Self {
        Self {
            multiplicity,
            gated: false,
            timings: BTreeMap::new(),
            failures: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, method: &str, elapsed: Duration, outcome: Result<(), AfcError>) {
        self.timings.insert(method.to_string(), elapsed);
        if let Err(err) = outcome {
            self.failures.push(err.info().clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_serializes_for_diagnostics() {
        let mut report = RunReport::passed(12);
        report.record("qc", Duration::from_micros(250), Ok(()));
        let json = serde_json::to_string(&report).expect("encode");
        assert!(json.contains("\"multiplicity\":12"));
        assert!(json.contains("qc"));
    }

    #[test]
    fn failures_accumulate_without_blocking() {
        let mut report = RunReport::passed(8);
        report.record(
            "nl4",
            Duration::ZERO,
            Err(AfcError::Store(ErrorInfo::new("unknown-accumulator", "missing"))),
        );
        report.record("nl3", Duration::ZERO, Ok(()));
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.timings.len(), 2);
    }
}
